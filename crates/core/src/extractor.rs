//! Slide text extraction: text frames plus OCR of embedded pictures.
//!
//! For every slide the extractor produces one string. Its ordering contract:
//!
//! 1. the text of every text-bearing shape, in shape order (empty frames
//!    included),
//! 2. then one `"Image OCR: <text>"` fragment per picture shape, in shape
//!    order,
//!
//! all joined by single spaces. Pictures never interleave with text even
//! when they precede it on the slide.
//!
//! Each picture is written to the image output directory before OCR runs on
//! it. With the default [`ImageNaming::PerSlide`] scheme every picture of a
//! slide targets the same `slide_{N}_image.png`, so later pictures overwrite
//! earlier ones.

use crate::normalize::normalize_ocr_text;
use crate::services::OcrEngine;
use crate::{Error, PictureShape, Presentation, Result, Slide};
use std::fs;
use std::path::Path;

/// Prefix of every OCR fragment.
pub const OCR_MARKER: &str = "Image OCR: ";

/// How saved picture files are named.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageNaming {
    /// `slide_{N}_image.png`. Pictures on the same slide overwrite each other.
    #[default]
    PerSlide,
    /// `slide_{N}_image_{M}.png`, M being the 1-based picture index on the slide.
    PerPicture,
}

impl ImageNaming {
    /// File name for picture `picture` (1-based) on slide `slide` (1-based).
    pub fn file_name(&self, slide: usize, picture: usize) -> String {
        match self {
            Self::PerSlide => format!("slide_{}_image.png", slide),
            Self::PerPicture => format!("slide_{}_image_{}.png", slide, picture),
        }
    }
}

/// What to do when a picture cannot be saved, decoded, or recognized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShapeErrorPolicy {
    /// Abort the whole extraction with [`Error::ShapeProcessing`].
    #[default]
    Abort,
    /// Log a warning and leave the picture's fragment out.
    Skip,
}

/// Extractor settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractorOptions {
    pub image_naming: ImageNaming,
    pub shape_errors: ShapeErrorPolicy,
}

/// Turns a [`Presentation`] into one text block per slide.
pub struct SlideExtractor<'a> {
    ocr: &'a dyn OcrEngine,
    options: ExtractorOptions,
}

impl<'a> SlideExtractor<'a> {
    /// Create an extractor with default options.
    pub fn new(ocr: &'a dyn OcrEngine) -> Self {
        Self {
            ocr,
            options: ExtractorOptions::default(),
        }
    }

    /// Replace the extractor options.
    pub fn with_options(mut self, options: ExtractorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ExtractorOptions {
        &self.options
    }

    /// Extract every slide of `presentation`, in slide order.
    ///
    /// `image_output_dir` is created (with parents) if missing, even when the
    /// presentation holds no pictures.
    pub fn extract(&self, presentation: &Presentation, image_output_dir: &Path) -> Result<Vec<String>> {
        fs::create_dir_all(image_output_dir)?;

        log::debug!(
            "Extracting {} slides from {} into {}",
            presentation.slides.len(),
            presentation.filename,
            image_output_dir.display()
        );

        presentation
            .slides
            .iter()
            .enumerate()
            .map(|(idx, slide)| self.extract_slide(idx + 1, slide, image_output_dir))
            .collect()
    }

    /// Build the text block of a single slide.
    fn extract_slide(&self, index: usize, slide: &Slide, image_output_dir: &Path) -> Result<String> {
        let mut fragments: Vec<String> = slide.texts().map(str::to_string).collect();

        for (pic_idx, picture) in slide.pictures().enumerate() {
            match self.process_picture(index, pic_idx + 1, picture, image_output_dir) {
                Ok(text) => fragments.push(format!("{}{}", OCR_MARKER, text)),
                Err(e) if self.options.shape_errors == ShapeErrorPolicy::Skip => {
                    log::warn!("Skipping picture '{}': {}", picture.name, e);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(fragments.join(" "))
    }

    /// Save, decode, and OCR one picture. Returns the normalized OCR text.
    fn process_picture(
        &self,
        slide: usize,
        picture_index: usize,
        picture: &PictureShape,
        image_output_dir: &Path,
    ) -> Result<String> {
        let data = picture.data.as_deref().ok_or_else(|| {
            Error::shape(
                slide,
                format!("picture '{}' has no embedded image data", picture.name),
            )
        })?;

        let image_path = image_output_dir.join(self.options.image_naming.file_name(slide, picture_index));
        fs::write(&image_path, data).map_err(|e| {
            Error::shape(slide, format!("failed to write {}: {}", image_path.display(), e))
        })?;
        log::debug!("Wrote {} bytes to {}", data.len(), image_path.display());

        let written = fs::read(&image_path).map_err(|e| {
            Error::shape(slide, format!("failed to read back {}: {}", image_path.display(), e))
        })?;
        image::load_from_memory(&written).map_err(|e| {
            Error::shape(slide, format!("failed to decode {}: {}", image_path.display(), e))
        })?;

        let text = self
            .ocr
            .recognize(&image_path)
            .map_err(|e| Error::shape(slide, e.to_string()))?;

        Ok(normalize_ocr_text(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Shape;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::path::PathBuf;

    /// OCR fake keyed on the image bytes, recording every path it sees.
    #[derive(Default)]
    struct FakeOcr {
        answers: HashMap<Vec<u8>, String>,
        seen: RefCell<Vec<PathBuf>>,
        fail: bool,
    }

    impl FakeOcr {
        fn answering(pairs: &[(&[u8], &str)]) -> Self {
            Self {
                answers: pairs.iter().map(|(k, v)| (k.to_vec(), v.to_string())).collect(),
                ..Default::default()
            }
        }
    }

    impl OcrEngine for FakeOcr {
        fn recognize(&self, image_path: &Path) -> Result<String> {
            self.seen.borrow_mut().push(image_path.to_path_buf());
            if self.fail {
                return Err(Error::Ocr("engine crashed".to_string()));
            }
            let bytes = fs::read(image_path)?;
            Ok(self.answers.get(&bytes).cloned().unwrap_or_default())
        }
    }

    fn png(width: u32, height: u32, shade: u8) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([shade, shade, shade]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn picture(data: Vec<u8>) -> Shape {
        Shape::Picture(PictureShape::new("Picture", data))
    }

    fn presentation(slides: Vec<Vec<Shape>>) -> Presentation {
        let mut presentation = Presentation::new("deck.pptx");
        for (idx, shapes) in slides.into_iter().enumerate() {
            let mut slide = Slide::new(idx + 1);
            for shape in shapes {
                slide.add_shape(shape);
            }
            presentation.add_slide(slide);
        }
        presentation
    }

    #[test]
    fn test_image_naming() {
        assert_eq!(ImageNaming::PerSlide.file_name(3, 2), "slide_3_image.png");
        assert_eq!(ImageNaming::PerPicture.file_name(3, 2), "slide_3_image_2.png");
    }

    #[test]
    fn test_zero_slides_creates_dir_only() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("nested").join("images");
        let ocr = FakeOcr::default();

        let texts = SlideExtractor::new(&ocr).extract(&presentation(vec![]), &out).unwrap();

        assert!(texts.is_empty());
        assert!(out.is_dir());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn test_existing_dir_is_fine() {
        let tmp = tempfile::tempdir().unwrap();
        let ocr = FakeOcr::default();
        let texts = SlideExtractor::new(&ocr)
            .extract(&presentation(vec![vec![Shape::Text("x".into())]]), tmp.path())
            .unwrap();
        assert_eq!(texts, vec!["x"]);
    }

    #[test]
    fn test_text_before_pictures() {
        let tmp = tempfile::tempdir().unwrap();
        let a = png(2, 2, 0);
        let b = png(3, 3, 0);
        let ocr = FakeOcr::answering(&[(&a, "first"), (&b, "second")]);

        let deck = presentation(vec![vec![
            picture(a.clone()),
            Shape::Text("Title".into()),
            Shape::Other,
            Shape::Text(String::new()),
            picture(b.clone()),
            Shape::Text("Body".into()),
        ]]);

        let options = ExtractorOptions {
            image_naming: ImageNaming::PerPicture,
            ..Default::default()
        };
        let texts = SlideExtractor::new(&ocr)
            .with_options(options)
            .extract(&deck, tmp.path())
            .unwrap();

        // Three text fragments (one empty) then two OCR fragments.
        assert_eq!(texts, vec!["Title  Body Image OCR: first Image OCR: second"]);
    }

    #[test]
    fn test_blank_picture_yields_bare_marker() {
        let tmp = tempfile::tempdir().unwrap();
        let ocr = FakeOcr::default();
        let deck = presentation(vec![vec![picture(png(1, 1, 255))]]);

        let texts = SlideExtractor::new(&ocr).extract(&deck, tmp.path()).unwrap();

        assert_eq!(texts, vec!["Image OCR: "]);
    }

    #[test]
    fn test_ocr_text_is_trimmed() {
        let tmp = tempfile::tempdir().unwrap();
        let img = png(1, 1, 10);
        let ocr = FakeOcr::answering(&[(&img, "Hello\n\x0c")]);
        let deck = presentation(vec![vec![Shape::Text("Intro".into())], vec![picture(img)]]);

        let texts = SlideExtractor::new(&ocr).extract(&deck, tmp.path()).unwrap();

        assert_eq!(texts, vec!["Intro", "Image OCR: Hello"]);
        assert!(tmp.path().join("slide_2_image.png").is_file());
        assert!(!tmp.path().join("slide_1_image.png").exists());
    }

    #[test]
    fn test_same_slide_pictures_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        let first = png(1, 1, 1);
        let second = png(1, 1, 2);
        let ocr = FakeOcr::default();

        let mut slides = vec![vec![]; 5];
        slides[2] = vec![picture(first), picture(second.clone())];
        let texts = SlideExtractor::new(&ocr)
            .extract(&presentation(slides), tmp.path())
            .unwrap();

        assert_eq!(texts[2], "Image OCR:  Image OCR: ");
        let seen = ocr.seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], seen[1]);
        assert_eq!(fs::read(tmp.path().join("slide_3_image.png")).unwrap(), second);
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_idempotent_runs() {
        let img = png(4, 4, 128);
        let ocr = FakeOcr::answering(&[(&img, "Same")]);
        let deck = presentation(vec![vec![Shape::Text("A".into()), picture(img)]]);

        let first_dir = tempfile::tempdir().unwrap();
        let second_dir = tempfile::tempdir().unwrap();
        let extractor = SlideExtractor::new(&ocr);
        let first = extractor.extract(&deck, first_dir.path()).unwrap();
        let second = extractor.extract(&deck, second_dir.path()).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            fs::read(first_dir.path().join("slide_1_image.png")).unwrap(),
            fs::read(second_dir.path().join("slide_1_image.png")).unwrap()
        );
    }

    #[test]
    fn test_undecodable_picture_aborts() {
        let tmp = tempfile::tempdir().unwrap();
        let ocr = FakeOcr::default();
        let deck = presentation(vec![vec![], vec![picture(b"not an image".to_vec())]]);

        let err = SlideExtractor::new(&ocr).extract(&deck, tmp.path()).unwrap_err();

        assert!(matches!(err, Error::ShapeProcessing { slide: 2, .. }));
        // The bytes were still written before decoding failed.
        assert_eq!(
            fs::read(tmp.path().join("slide_2_image.png")).unwrap(),
            b"not an image"
        );
        assert!(ocr.seen.borrow().is_empty());
    }

    #[test]
    fn test_missing_picture_data_aborts() {
        let tmp = tempfile::tempdir().unwrap();
        let ocr = FakeOcr::default();
        let linked = Shape::Picture(PictureShape {
            name: "Linked".into(),
            part: None,
            data: None,
        });

        let err = SlideExtractor::new(&ocr)
            .extract(&presentation(vec![vec![linked]]), tmp.path())
            .unwrap_err();

        assert!(matches!(err, Error::ShapeProcessing { slide: 1, .. }));
    }

    #[test]
    fn test_ocr_failure_aborts() {
        let tmp = tempfile::tempdir().unwrap();
        let ocr = FakeOcr {
            fail: true,
            ..Default::default()
        };
        let deck = presentation(vec![vec![picture(png(1, 1, 0))]]);

        let err = SlideExtractor::new(&ocr).extract(&deck, tmp.path()).unwrap_err();

        match err {
            Error::ShapeProcessing { slide, reason } => {
                assert_eq!(slide, 1);
                assert!(reason.contains("engine crashed"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_skip_policy_continues() {
        let tmp = tempfile::tempdir().unwrap();
        let good = png(1, 1, 0);
        let ocr = FakeOcr::answering(&[(&good, "ok")]);
        let deck = presentation(vec![vec![
            Shape::Text("T".into()),
            picture(b"junk".to_vec()),
            picture(good),
        ]]);

        let options = ExtractorOptions {
            image_naming: ImageNaming::PerPicture,
            shape_errors: ShapeErrorPolicy::Skip,
        };
        let texts = SlideExtractor::new(&ocr)
            .with_options(options)
            .extract(&deck, tmp.path())
            .unwrap();

        assert_eq!(texts, vec!["T Image OCR: ok"]);
    }
}
