//! Text normalization for OCR output and summarizer input.

use regex::Regex;
use std::sync::LazyLock;

/// Regex matching Windows and old Mac line endings.
static LINE_ENDING_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r\n?").unwrap());

/// Normalize text returned by an OCR engine.
///
/// - Converts `\r\n` and `\r` to `\n`
/// - Trims leading/trailing whitespace, including the form feed
///   Tesseract appends after each page
///
/// Interior text is left untouched.
pub fn normalize_ocr_text(text: &str) -> String {
    LINE_ENDING_REGEX.replace_all(text, "\n").trim().to_string()
}

/// Check whether a slide's text is empty or whitespace only.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Word-wrap `text` into chunks of at most `width` characters.
///
/// Any whitespace run separates words and is collapsed to a single space
/// inside a chunk, so chunks never start or end with whitespace. Words
/// longer than `width` are split. A `width` of zero is treated as one.
pub fn chunk_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        // Fits on the current line (with a separating space)?
        let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
        if needed <= width {
            if current_len > 0 {
                current.push(' ');
            }
            current.extend(word.iter());
            current_len = needed;
            continue;
        }

        if current_len > 0 {
            chunks.push(std::mem::take(&mut current));
        }

        while word.len() > width {
            let rest = word.split_off(width);
            chunks.push(word.into_iter().collect());
            word = rest;
        }

        current.extend(word.iter());
        current_len = word.len();
    }

    if current_len > 0 {
        chunks.push(current);
    }

    chunks
}
