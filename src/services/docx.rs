use anyhow::{anyhow, Result};
use docx_rs::{AlignmentType, Docx, LineSpacing, Paragraph, Run};
use std::io::Cursor;

use crate::constants::{BOLD_LANGUAGE_CONFIDENCE, FONT_SIZE_HALF_POINTS, PARAGRAPH_SPACING_AFTER};
use crate::models::OcrOutcome;

/// Intermediate paragraph form, kept separate from docx-rs types so the
/// run-construction rules can be inspected directly.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltParagraph {
    pub runs: Vec<BuiltRun>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuiltRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

/// Renders an OCR outcome into a single-section word-processor document:
/// one output paragraph per source paragraph, in page-then-paragraph order.
#[derive(Clone)]
pub struct DocxBuilder {
    bold_confidence: f64,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self {
            bold_confidence: BOLD_LANGUAGE_CONFIDENCE,
        }
    }

    /// Walk pages -> paragraphs -> segments, slicing the full text by each
    /// segment's character offsets (missing offsets default to 0) and adding a
    /// trailing space per run.
    ///
    /// Styling is a fixed heuristic preserved from the source system: bold when
    /// the paragraph's first detected-language confidence exceeds 0.9, italic
    /// when the sliced text contains an underscore.
    pub fn paragraphs(&self, ocr: &OcrOutcome) -> Vec<BuiltParagraph> {
        let mut out = Vec::new();

        for page in &ocr.pages {
            for paragraph in &page.paragraphs {
                let bold = paragraph
                    .language_confidence
                    .map(|c| c > self.bold_confidence)
                    .unwrap_or(false);

                let runs = paragraph
                    .segments
                    .iter()
                    .map(|segment| {
                        let mut text = slice_chars(&ocr.text, segment.start, segment.end);
                        text.push(' ');
                        let italic = text.contains('_');
                        BuiltRun { text, bold, italic }
                    })
                    .collect();

                out.push(BuiltParagraph { runs });
            }
        }

        out
    }

    /// Serialize the document to a `.docx` byte buffer.
    pub fn build(&self, ocr: &OcrOutcome) -> Result<Vec<u8>> {
        let mut docx = Docx::new();

        for paragraph in self.paragraphs(ocr) {
            let mut p = Paragraph::new()
                .align(AlignmentType::Center)
                .line_spacing(LineSpacing::new().after(PARAGRAPH_SPACING_AFTER));

            for run in paragraph.runs {
                let mut r = Run::new().add_text(run.text).size(FONT_SIZE_HALF_POINTS);
                if run.bold {
                    r = r.bold();
                }
                if run.italic {
                    r = r.italic();
                }
                p = p.add_run(r);
            }

            docx = docx.add_paragraph(p);
        }

        let mut buffer = Cursor::new(Vec::new());
        docx.build()
            .pack(&mut buffer)
            .map_err(|e| anyhow!("Failed to pack docx: {}", e))?;

        Ok(buffer.into_inner())
    }
}

impl Default for DocxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// Offsets are character positions; clamp instead of panicking on short text.
fn slice_chars(text: &str, start: usize, end: usize) -> String {
    text.chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect()
}
