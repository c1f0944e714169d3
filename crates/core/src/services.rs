//! Interfaces to the external engines the pipeline delegates to.
//!
//! Backends are plain values constructed by the caller and borrowed by the
//! extractor and pipeline for the length of a run.

use crate::Result;
use std::path::Path;

/// Recognizes text in an image file.
pub trait OcrEngine {
    /// Run OCR on the image stored at `image_path`.
    ///
    /// Returns the raw recognized text, possibly empty. Failures should be
    /// reported as [`crate::Error::Ocr`].
    fn recognize(&self, image_path: &Path) -> Result<String>;
}

/// Length bounds for a summary, in the backend's native unit (tokens).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryLength {
    pub min: u32,
    pub max: u32,
}

impl Default for SummaryLength {
    fn default() -> Self {
        Self { min: 30, max: 40 }
    }
}

/// Reduces a slide's text to a short summary.
pub trait Summarizer {
    /// Failures should be reported as [`crate::Error::Summarization`].
    fn summarize(&self, text: &str, length: SummaryLength) -> Result<String>;
}

/// Produces quiz questions from slide summaries.
pub trait QuestionGenerator {
    /// Returns one entry per response line, in order. Failures should be
    /// reported as [`crate::Error::QuestionGeneration`].
    fn generate_questions(&self, summaries: &[String]) -> Result<Vec<String>>;
}
