use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Writes incoming uploads into the temporary upload directory.
#[derive(Clone)]
pub struct UploadService {
    upload_dir: PathBuf,
}

impl UploadService {
    pub fn new(upload_dir: PathBuf) -> Self {
        Self { upload_dir }
    }

    /// Save raw upload bytes under a uuid-prefixed copy of the client filename.
    /// The extension is preserved so the normalizer can inspect it.
    pub fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let safe_name = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload");

        fs::create_dir_all(&self.upload_dir)
            .with_context(|| format!("failed to create upload dir {:?}", self.upload_dir))?;

        let path = self
            .upload_dir
            .join(format!("{}_{}", Uuid::new_v4(), safe_name));
        fs::write(&path, bytes).with_context(|| format!("failed to write upload {:?}", path))?;

        Ok(path)
    }
}

/// Scoped cleanup for per-request temporary artifacts: every registered path is
/// removed when the guard drops, on success and failure alike.
#[derive(Default)]
pub struct TempFiles {
    paths: Vec<PathBuf>,
}

impl TempFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: PathBuf) {
        self.paths.push(path);
    }
}

impl Drop for TempFiles {
    fn drop(&mut self) {
        for path in &self.paths {
            if let Err(e) = fs::remove_file(path) {
                if path.exists() {
                    log::warn!("Failed to remove temp file {:?}: {}", path, e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_preserves_extension_and_strips_directories() {
        let dir = std::env::temp_dir().join(format!("docuscan_upload_{}", Uuid::new_v4()));
        let service = UploadService::new(dir.clone());

        let path = service.save("../../etc/passwd.png", b"png bytes").expect("save");
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
        assert!(path.starts_with(&dir));
        assert_eq!(fs::read(&path).expect("read back"), b"png bytes");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn temp_files_removes_registered_paths_on_drop() {
        let path = std::env::temp_dir().join(format!("docuscan_tmp_{}", Uuid::new_v4()));
        fs::write(&path, b"x").expect("write");

        {
            let mut temp = TempFiles::new();
            temp.push(path.clone());
        }

        assert!(!path.exists());
    }
}
