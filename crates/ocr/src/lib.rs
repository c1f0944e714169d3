//! OCR backends for recognizing text in slide pictures.

pub mod tesseract;

pub use tesseract::TesseractEngine;
