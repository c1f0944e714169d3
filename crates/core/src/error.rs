//! Error types for slide extraction and quiz generation.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while turning a presentation into a quiz.
#[derive(Error, Debug)]
pub enum Error {
    /// The input is missing, unreadable, or not a valid presentation container.
    #[error("Failed to open presentation: {0}")]
    DocumentOpen(String),

    /// A picture shape could not be written, decoded, or recognized.
    #[error("Failed to process picture on slide {slide}: {reason}")]
    ShapeProcessing {
        /// 1-based slide index.
        slide: usize,
        reason: String,
    },

    /// The OCR engine failed on an image.
    #[error("OCR error: {0}")]
    Ocr(String),

    /// The summarization backend rejected or failed on a slide's text.
    #[error("Summarization error: {0}")]
    Summarization(String),

    /// The remote question generator failed or answered with garbage.
    #[error("Question generation error: {0}")]
    QuestionGeneration(String),

    /// Filesystem failure outside of a single shape.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build a [`Error::ShapeProcessing`] for the given 1-based slide.
    pub fn shape(slide: usize, reason: impl Into<String>) -> Self {
        Self::ShapeProcessing {
            slide,
            reason: reason.into(),
        }
    }
}
