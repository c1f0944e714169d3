//! PPTX (Office Open XML) reader for slide text and picture extraction.
//!
//! Parses .pptx files which are ZIP archives containing XML documents.

pub mod parser;
pub mod rels;
pub mod shapes;

pub use parser::PptxParser;

use quiz_core::{Result, SlideExtractor};
use std::path::Path;

/// Open the presentation at `document_path` and extract one text block per
/// slide, saving pictures under `image_output_dir`.
///
/// The document is opened before the output directory is touched, so an
/// unreadable input fails with [`quiz_core::Error::DocumentOpen`] without
/// side effects.
pub fn extract_slides(
    document_path: &Path,
    image_output_dir: &Path,
    extractor: &SlideExtractor<'_>,
) -> Result<Vec<String>> {
    let presentation = PptxParser::new().open(document_path)?;
    extractor.extract(&presentation, image_output_dir)
}
