//! Domain types for representing presentation content and quiz output.

use serde::{Deserialize, Serialize};

/// Represents an entire presentation as an ordered list of slides.
#[derive(Debug, Clone, Default)]
pub struct Presentation {
    /// Original filename (without path).
    pub filename: String,

    /// Slides in presentation order.
    pub slides: Vec<Slide>,
}

impl Presentation {
    /// Create an empty presentation with the given filename.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            slides: Vec::new(),
        }
    }

    /// Add a slide to the presentation.
    pub fn add_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    /// Total number of picture shapes across all slides.
    pub fn picture_count(&self) -> usize {
        self.slides.iter().map(|s| s.pictures().count()).sum()
    }
}

/// A single slide.
#[derive(Debug, Clone)]
pub struct Slide {
    /// 1-based slide number.
    pub number: usize,

    /// Shapes in document (z-) order.
    pub shapes: Vec<Shape>,
}

impl Slide {
    /// Create a new slide with the given number.
    pub fn new(number: usize) -> Self {
        Self {
            number,
            shapes: Vec::new(),
        }
    }

    /// Add a shape to this slide.
    pub fn add_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    /// Text of every text-bearing shape, in shape order. Empty frames included.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.shapes.iter().filter_map(|s| match s {
            Shape::Text(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Every picture shape, in shape order.
    pub fn pictures(&self) -> impl Iterator<Item = &PictureShape> {
        self.shapes.iter().filter_map(|s| match s {
            Shape::Picture(picture) => Some(picture),
            _ => None,
        })
    }
}

/// A visual element on a slide.
#[derive(Debug, Clone)]
pub enum Shape {
    /// A shape with a text frame. Paragraphs are separated by `\n`.
    Text(String),
    /// An embedded picture.
    Picture(PictureShape),
    /// Group shapes, tables, charts, connectors. Contribute no text.
    Other,
}

/// A picture shape and its raw encoded image.
#[derive(Debug, Clone, Default)]
pub struct PictureShape {
    /// Shape name from the document, if any.
    pub name: String,

    /// Container part the image was read from, for diagnostics.
    pub part: Option<String>,

    /// Raw encoded image bytes. `None` for linked or missing images.
    pub data: Option<Vec<u8>>,
}

impl PictureShape {
    /// Create a picture carrying the given bytes.
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            part: None,
            data: Some(data),
        }
    }
}

/// Everything a run prints: slide text, summaries, questions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizReport {
    /// Extracted text, one entry per slide.
    pub slides: Vec<String>,

    /// Summaries, one entry per slide.
    pub summaries: Vec<String>,

    /// Generated quiz questions, one entry per response line.
    pub questions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_slide() -> Slide {
        let mut slide = Slide::new(1);
        slide.add_shape(Shape::Picture(PictureShape::new("Picture 1", vec![1])));
        slide.add_shape(Shape::Text("Title".to_string()));
        slide.add_shape(Shape::Other);
        slide.add_shape(Shape::Text(String::new()));
        slide.add_shape(Shape::Picture(PictureShape::new("Picture 2", vec![2])));
        slide
    }

    #[test]
    fn test_texts_keep_order_and_empty_frames() {
        let slide = sample_slide();
        assert_eq!(slide.texts().collect::<Vec<_>>(), vec!["Title", ""]);
    }

    #[test]
    fn test_pictures_keep_order() {
        let slide = sample_slide();
        let names: Vec<_> = slide.pictures().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Picture 1", "Picture 2"]);
    }

    #[test]
    fn test_picture_count() {
        let mut presentation = Presentation::new("deck.pptx");
        presentation.add_slide(sample_slide());
        presentation.add_slide(Slide::new(2));
        assert_eq!(presentation.picture_count(), 2);
    }
}
