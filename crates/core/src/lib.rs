//! Core domain types, slide text extraction, and the summarize/quiz
//! pipeline for turning presentations into quiz questions.

pub mod error;
pub mod extractor;
pub mod normalize;
pub mod pipeline;
pub mod prompt;
pub mod services;
pub mod types;

pub use error::{Error, Result};
pub use extractor::{ExtractorOptions, ImageNaming, ShapeErrorPolicy, SlideExtractor, OCR_MARKER};
pub use pipeline::{EmptySlidePolicy, PipelineOptions, QuizPipeline};
pub use prompt::{build_quiz_prompt, split_questions, BlankLinePolicy, SYSTEM_INSTRUCTION};
pub use services::{OcrEngine, QuestionGenerator, Summarizer, SummaryLength};
pub use types::{PictureShape, Presentation, QuizReport, Shape, Slide};
