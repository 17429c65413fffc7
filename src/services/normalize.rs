use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{CONVERTIBLE_EXTENSIONS, JPEG_QUALITY, MAX_IMAGE_WIDTH, MAX_OCR_FILE_BYTES};

/// Outcome of normalization: the path to feed into OCR plus any derived
/// temporary files written along the way (0-2 of them).
pub struct NormalizedFile {
    pub path: PathBuf,
    pub derived: Vec<PathBuf>,
}

/// Converts non-JPEG uploads to JPEG and downsamples oversized files before OCR.
/// The original upload is never mutated in place.
#[derive(Clone)]
pub struct Normalizer {
    work_dir: PathBuf,
    max_bytes: u64,
    max_width: u32,
    jpeg_quality: u8,
}

impl Normalizer {
    pub fn new(work_dir: PathBuf) -> Self {
        Self {
            work_dir,
            max_bytes: MAX_OCR_FILE_BYTES,
            max_width: MAX_IMAGE_WIDTH,
            jpeg_quality: JPEG_QUALITY,
        }
    }

    /// Same normalizer with custom thresholds.
    pub fn with_limits(work_dir: PathBuf, max_bytes: u64, max_width: u32) -> Self {
        Self {
            work_dir,
            max_bytes,
            max_width,
            jpeg_quality: JPEG_QUALITY,
        }
    }

    pub fn normalize(&self, path: &Path) -> Result<NormalizedFile> {
        let mut derived = Vec::new();
        let mut current = path.to_path_buf();

        if needs_conversion(&current) {
            let converted = self.convert_to_jpeg(&current)?;
            info!("Converted {:?} -> {:?}", current, converted);
            derived.push(converted.clone());
            current = converted;
        }

        let size = fs::metadata(&current)
            .with_context(|| format!("failed to stat {:?}", current))?
            .len();
        if size > self.max_bytes {
            let resized = self.downsample(&current)?;
            info!("Downsampled {:?} ({} bytes) -> {:?}", current, size, resized);
            derived.push(resized.clone());
            current = resized;
        }

        Ok(NormalizedFile {
            path: current,
            derived,
        })
    }

    fn convert_to_jpeg(&self, path: &Path) -> Result<PathBuf> {
        let img = open_image(path)?;
        let out = self.work_dir.join(format!("{}.jpg", file_stem(path)));
        self.write_jpeg(&img, &out)?;
        Ok(out)
    }

    fn downsample(&self, path: &Path) -> Result<PathBuf> {
        let img = open_image(path)?;
        let img = if img.width() > self.max_width {
            img.resize(self.max_width, u32::MAX, FilterType::Lanczos3)
        } else {
            img
        };
        let out = self
            .work_dir
            .join(format!("{}_w{}.jpg", file_stem(path), self.max_width));
        self.write_jpeg(&img, &out)?;
        Ok(out)
    }

    fn write_jpeg(&self, img: &DynamicImage, out: &Path) -> Result<()> {
        fs::create_dir_all(&self.work_dir)
            .with_context(|| format!("failed to create work dir {:?}", self.work_dir))?;
        let mut file = fs::File::create(out)
            .with_context(|| format!("failed to create {:?}", out))?;
        let encoder = JpegEncoder::new_with_quality(&mut file, self.jpeg_quality);
        // JPEG has no alpha channel
        img.to_rgb8()
            .write_with_encoder(encoder)
            .with_context(|| format!("failed to encode JPEG {:?}", out))?;
        Ok(())
    }
}

fn needs_conversion(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| CONVERTIBLE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn open_image(path: &Path) -> Result<DynamicImage> {
    ImageReader::open(path)
        .with_context(|| format!("failed to open {:?}", path))?
        .with_guessed_format()
        .with_context(|| format!("failed to probe format of {:?}", path))?
        .decode()
        .with_context(|| format!("failed to decode {:?}", path))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("upload")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use uuid::Uuid;

    fn temp_work_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("docuscan_norm_{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).expect("create work dir");
        dir
    }

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        let img = RgbImage::from_pixel(width, height, Rgb([120, 80, 40]));
        img.save(&path).expect("save png");
        path
    }

    #[test]
    fn converts_png_to_jpeg() {
        let dir = temp_work_dir();
        let png = write_png(&dir, "scan.png", 40, 30);

        let normalizer = Normalizer::new(dir.clone());
        let result = normalizer.normalize(&png).expect("normalize");

        assert_eq!(result.path.extension().and_then(|e| e.to_str()), Some("jpg"));
        assert_eq!(result.derived, vec![result.path.clone()]);
        assert!(png.exists(), "original upload must not be touched");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn jpeg_input_passes_through_unchanged() {
        let dir = temp_work_dir();
        let jpg = dir.join("photo.jpg");
        let img = RgbImage::from_pixel(40, 30, Rgb([10, 20, 30]));
        img.save(&jpg).expect("save jpg");

        let normalizer = Normalizer::new(dir.clone());
        let result = normalizer.normalize(&jpg).expect("normalize");

        assert_eq!(result.path, jpg);
        assert!(result.derived.is_empty());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn oversized_file_is_downsampled_to_max_width() {
        let dir = temp_work_dir();
        let jpg = dir.join("big.jpg");
        let img = RgbImage::from_pixel(200, 80, Rgb([200, 100, 50]));
        img.save(&jpg).expect("save jpg");

        // Threshold of 1 byte forces the resize branch
        let normalizer = Normalizer::with_limits(dir.clone(), 1, 50);
        let result = normalizer.normalize(&jpg).expect("normalize");

        assert_ne!(result.path, jpg);
        let (width, _) = image::image_dimensions(&result.path).expect("dimensions");
        assert!(width <= 50, "width {} exceeds limit", width);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn small_converted_file_is_not_downsampled() {
        let dir = temp_work_dir();
        let png = write_png(&dir, "small.png", 30, 30);

        let normalizer = Normalizer::new(dir.clone());
        let result = normalizer.normalize(&png).expect("normalize");

        // One derived file from conversion, none from resizing
        assert_eq!(result.derived.len(), 1);

        let _ = fs::remove_dir_all(&dir);
    }
}
