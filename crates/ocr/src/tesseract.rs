//! Tesseract OCR through its command-line binary.
//!
//! Each image is recognized with `tesseract <image> stdout -l <lang>`; the
//! recognized text is read from standard output. The binary location is a
//! deployment concern and is passed in by the caller.

use quiz_core::{Error, OcrEngine, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Default binary name, resolved through `PATH`.
pub const DEFAULT_COMMAND: &str = "tesseract";

/// Default recognition language.
pub const DEFAULT_LANGUAGE: &str = "eng";

/// OCR engine backed by the `tesseract` executable.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    command: PathBuf,
    language: String,
    page_segmentation: Option<u32>,
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self {
            command: PathBuf::from(DEFAULT_COMMAND),
            language: DEFAULT_LANGUAGE.to_string(),
            page_segmentation: None,
        }
    }
}

impl TesseractEngine {
    /// Create an engine using `tesseract` from `PATH` and English.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific tesseract binary.
    pub fn with_command(mut self, command: impl Into<PathBuf>) -> Self {
        self.command = command.into();
        self
    }

    /// Set the recognition language (`-l`), e.g. `eng` or `eng+deu`.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the page segmentation mode (`--psm`).
    pub fn with_page_segmentation(mut self, mode: u32) -> Self {
        self.page_segmentation = Some(mode);
        self
    }

    pub fn command(&self) -> &Path {
        &self.command
    }

    /// Check whether the configured binary can be executed.
    pub fn is_available(&self) -> bool {
        let available = Command::new(&self.command).arg("--version").output().is_ok();
        if !available {
            log::debug!(
                "{} not found - install tesseract-ocr or point TESSERACT_CMD at it",
                self.command.display()
            );
        }
        available
    }

    fn build_command(&self, image_path: &Path) -> Command {
        let mut command = Command::new(&self.command);
        command.arg(image_path).arg("stdout").arg("-l").arg(&self.language);
        if let Some(psm) = self.page_segmentation {
            command.arg("--psm").arg(psm.to_string());
        }
        command
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image_path: &Path) -> Result<String> {
        log::debug!("Running OCR on {}", image_path.display());

        let output = self.build_command(image_path).output().map_err(|e| {
            Error::Ocr(format!("Failed to run {}: {}", self.command.display(), e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Ocr(format!(
                "{} failed on {} ({}): {}",
                self.command.display(),
                image_path.display(),
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
