//! Shape tree reader for slide XML (`<p:cSld>/<p:spTree>`).
//!
//! Only the direct children of the slide's shape tree are shapes; content of
//! group shapes is not descended into.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use quiz_core::{Error, Result};

/// Shape as it appears in slide XML, before picture data is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawShape {
    /// `<p:sp>`; empty when the shape has no text body.
    Text(String),
    /// `<p:pic>`; `embed` is the relationship id of its `<a:blip>`.
    Picture { name: String, embed: Option<String> },
    /// Anything else in the shape tree.
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShapeKind {
    Sp,
    Pic,
    Other,
}

impl ShapeKind {
    /// Kind of a shape-tree child element, `None` for non-shape children.
    fn from_element(local_name: &[u8]) -> Option<Self> {
        match local_name {
            b"sp" => Some(Self::Sp),
            b"pic" => Some(Self::Pic),
            b"grpSp" | b"graphicFrame" | b"cxnSp" | b"contentPart" => Some(Self::Other),
            _ => None,
        }
    }
}

/// State of the shape currently being read.
#[derive(Debug)]
struct ShapeState {
    kind: ShapeKind,
    name: String,
    embed: Option<String>,
    in_text_body: bool,
    in_text: bool,
    paragraphs: usize,
    text: String,
}

impl ShapeState {
    fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            name: String::new(),
            embed: None,
            in_text_body: false,
            in_text: false,
            paragraphs: 0,
            text: String::new(),
        }
    }

    /// Handle a start or empty element inside the shape.
    fn open(&mut self, e: &BytesStart, empty: bool) {
        let name = e.name();
        match local_name(name.as_ref()) {
            b"cNvPr" if self.name.is_empty() => {
                if let Some(value) = attribute(e, b"name") {
                    self.name = value;
                }
            }
            b"blip" if self.kind == ShapeKind::Pic && self.embed.is_none() => {
                self.embed = attribute(e, b"embed");
            }
            b"txBody" if self.kind == ShapeKind::Sp => {
                self.in_text_body = !empty;
            }
            b"p" if self.in_text_body => {
                if self.paragraphs > 0 {
                    self.text.push('\n');
                }
                self.paragraphs += 1;
            }
            b"br" if self.in_text_body => {
                self.text.push('\u{b}');
            }
            b"t" if self.in_text_body => {
                self.in_text = !empty;
            }
            _ => {}
        }
    }

    fn close(&mut self, local: &[u8]) {
        match local {
            b"t" => self.in_text = false,
            b"txBody" => self.in_text_body = false,
            _ => {}
        }
    }

    fn finish(self) -> RawShape {
        match self.kind {
            ShapeKind::Sp => RawShape::Text(self.text),
            ShapeKind::Pic => RawShape::Picture {
                name: self.name,
                embed: self.embed,
            },
            _ => RawShape::Other,
        }
    }
}

/// Extract the top-level shapes of a slide, in document order.
pub fn extract_shapes_from_xml(xml_content: &str) -> Result<Vec<RawShape>> {
    let mut shapes = Vec::new();
    let mut reader = Reader::from_str(xml_content);

    let mut depth = 0usize;
    let mut tree_depth: Option<usize> = None;
    let mut current: Option<ShapeState> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                let name = e.name();
                let local = local_name(name.as_ref());

                if let Some(shape) = current.as_mut() {
                    shape.open(e, false);
                } else if let Some(td) = tree_depth {
                    if depth == td + 1 {
                        current = ShapeKind::from_element(local).map(ShapeState::new);
                    }
                } else if local == b"spTree" {
                    tree_depth = Some(depth);
                }
            }
            Ok(Event::Empty(ref e)) => {
                if let Some(shape) = current.as_mut() {
                    shape.open(e, true);
                } else if let Some(td) = tree_depth {
                    // A childless shape element still counts as a shape.
                    let name = e.name();
                    if depth == td {
                        if let Some(kind) = ShapeKind::from_element(local_name(name.as_ref())) {
                            shapes.push(ShapeState::new(kind).finish());
                        }
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(shape) = current.as_mut().filter(|s| s.in_text) {
                    let text = e
                        .unescape()
                        .map_err(|e| Error::DocumentOpen(format!("Invalid slide text: {}", e)))?;
                    shape.text.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());

                match tree_depth {
                    Some(td) if depth == td + 1 => {
                        if let Some(shape) = current.take() {
                            shapes.push(shape.finish());
                        }
                    }
                    // Only the slide's own shape tree matters.
                    Some(td) if depth == td => break,
                    _ => {
                        if let Some(shape) = current.as_mut() {
                            shape.close(local);
                        }
                    }
                }

                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::DocumentOpen(format!(
                    "Malformed slide XML at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(shapes)
}

/// Unescaped value of the attribute with the given local name.
fn attribute(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == key)
        .map(|attr| {
            attr.unescape_value()
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).to_string())
        })
}

/// Extract the local name from a potentially namespaced XML element name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}
