//! PPTX file parser implementation.

use crate::rels::{self, Relationship, SLIDE_REL_SUFFIX};
use crate::shapes::{self, RawShape};
use quick_xml::events::Event;
use quick_xml::Reader;
use quiz_core::{Error, PictureShape, Presentation, Result, Shape, Slide};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

const PRESENTATION_PART: &str = "ppt/presentation.xml";

/// Parser for PPTX (Office Open XML) files.
pub struct PptxParser;

impl PptxParser {
    /// Create a new PPTX parser.
    pub fn new() -> Self {
        Self
    }

    /// Open and fully load the presentation at `path`.
    ///
    /// Any failure to open or read the container is reported as
    /// [`Error::DocumentOpen`].
    pub fn open(&self, path: &Path) -> Result<Presentation> {
        let file = File::open(path)
            .map_err(|e| Error::DocumentOpen(format!("{}: {}", path.display(), e)))?;

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");

        log::debug!("Parsing {} as PPTX", path.display());
        self.parse(BufReader::new(file), filename)
    }

    /// Parse a PPTX file from a reader.
    pub fn parse<R: Read + Seek>(&self, reader: R, filename: &str) -> Result<Presentation> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::DocumentOpen(format!("{} is not a valid PPTX container: {}", filename, e)))?;

        let mut presentation = Presentation::new(filename);

        let slide_order = self.get_slide_order(&mut archive)?;
        log::debug!("Found {} slides in {}", slide_order.len(), filename);

        for (idx, slide_path) in slide_order.iter().enumerate() {
            let slide = self.parse_slide(&mut archive, slide_path, idx + 1)?;
            presentation.add_slide(slide);
        }

        Ok(presentation)
    }

    /// Get the ordered list of slide part paths.
    ///
    /// Order comes from `<p:sldIdLst>` in `presentation.xml`. If that list is
    /// absent, slide relationships are sorted by the number in their id or
    /// target.
    fn get_slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let presentation_xml = read_string(archive, PRESENTATION_PART)?;
        let rels_content = read_string(archive, &rels::rels_path_for(PRESENTATION_PART))?;

        let slide_rels: Vec<Relationship> = rels::parse_relationships(&rels_content)?
            .into_iter()
            .filter(|r| r.rel_type.ends_with(SLIDE_REL_SUFFIX) && !r.external)
            .collect();

        let base_dir = rels::part_dir(PRESENTATION_PART);
        let by_id: HashMap<&str, &Relationship> = slide_rels.iter().map(|r| (r.id.as_str(), r)).collect();

        let listed = slide_id_list(&presentation_xml)?;
        if !listed.is_empty() {
            let mut slides = Vec::with_capacity(listed.len());
            for rel_id in &listed {
                match by_id.get(rel_id.as_str()) {
                    Some(rel) => slides.push(rels::resolve_target(base_dir, &rel.target)),
                    None => {
                        return Err(Error::DocumentOpen(format!(
                            "slide id list references unknown relationship '{}'",
                            rel_id
                        )));
                    }
                }
            }
            return Ok(slides);
        }

        let mut slides: Vec<(String, Option<usize>)> = slide_rels
            .iter()
            .map(|rel| {
                let order_num = extract_slide_number(&rel.target).or_else(|| extract_slide_number(&rel.id));
                (rels::resolve_target(base_dir, &rel.target), order_num)
            })
            .collect();

        // Sort slides by their number
        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }

    /// Parse a single slide from the archive.
    fn parse_slide<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
        slide_number: usize,
    ) -> Result<Slide> {
        let content = read_string(archive, slide_path)?;
        let raw_shapes = shapes::extract_shapes_from_xml(&content)
            .map_err(|e| Error::DocumentOpen(format!("{}: {}", slide_path, e)))?;

        // A slide without pictures may have no relationships worth reading.
        let needs_rels = raw_shapes.iter().any(|s| matches!(s, RawShape::Picture { .. }));
        let slide_rels: HashMap<String, Relationship> = if needs_rels {
            match read_string(archive, &rels::rels_path_for(slide_path)) {
                Ok(xml) => rels::parse_relationships(&xml)?
                    .into_iter()
                    .map(|r| (r.id.clone(), r))
                    .collect(),
                Err(_) => {
                    log::warn!("{} has pictures but no relationships part", slide_path);
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        let mut slide = Slide::new(slide_number);
        for raw in raw_shapes {
            let shape = match raw {
                RawShape::Text(text) => Shape::Text(text),
                RawShape::Other => Shape::Other,
                RawShape::Picture { name, embed } => {
                    let rel = embed.as_deref().and_then(|id| slide_rels.get(id));
                    Shape::Picture(self.load_picture(archive, slide_path, name, rel))
                }
            };
            slide.add_shape(shape);
        }

        Ok(slide)
    }

    /// Resolve a picture's image part and read its bytes.
    fn load_picture<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
        name: String,
        rel: Option<&Relationship>,
    ) -> PictureShape {
        let mut picture = PictureShape {
            name,
            part: None,
            data: None,
        };

        match rel {
            None => {
                log::warn!("Picture '{}' on {} has no image relationship", picture.name, slide_path);
            }
            Some(rel) if rel.external => {
                log::warn!("Picture '{}' on {} is linked to {}", picture.name, slide_path, rel.target);
            }
            Some(rel) => {
                let part = rels::resolve_target(rels::part_dir(slide_path), &rel.target);
                match read_bytes(archive, &part) {
                    Ok(data) => picture.data = Some(data),
                    Err(e) => log::warn!("Picture '{}' on {}: {}", picture.name, slide_path, e),
                }
                picture.part = Some(part);
            }
        }

        picture
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Relationship ids listed in `<p:sldIdLst>`, in presentation order.
fn slide_id_list(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut ids = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"sldId" => {
                // `r:id` is the relationship id; the plain `id` is a numeric slide id.
                let rel_id = e
                    .attributes()
                    .flatten()
                    .find(|attr| attr.key.prefix().is_some() && attr.key.local_name().as_ref() == b"id")
                    .map(|attr| String::from_utf8_lossy(&attr.value).to_string());

                if let Some(id) = rel_id {
                    ids.push(id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::DocumentOpen(format!("Error parsing presentation.xml: {}", e)));
            }
            _ => {}
        }
    }

    Ok(ids)
}

/// Read a file from the ZIP archive.
fn read_bytes<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<Vec<u8>> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| Error::DocumentOpen(format!("File not found in archive '{}': {}", path, e)))?;

    let mut content = Vec::new();
    file.read_to_end(&mut content)
        .map_err(|e| Error::DocumentOpen(format!("Failed to read '{}': {}", path, e)))?;

    Ok(content)
}

/// Read a UTF-8 file from the ZIP archive.
fn read_string<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let bytes = read_bytes(archive, path)?;
    String::from_utf8(bytes).map_err(|e| Error::DocumentOpen(format!("'{}' is not valid UTF-8: {}", path, e)))
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    // Remove common extensions first
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    // Try to find digits at the end
    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_slide_number() {
        assert_eq!(extract_slide_number("rId1"), Some(1));
        assert_eq!(extract_slide_number("rId12"), Some(12));
        assert_eq!(extract_slide_number("slides/slide1.xml"), Some(1));
        assert_eq!(extract_slide_number("slide123.xml"), Some(123));
        assert_eq!(extract_slide_number("nodigits"), None);
    }

    #[test]
    fn test_slide_id_list() {
        let xml = r#"<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>
  <p:sldIdLst><p:sldId id="257" r:id="rId3"/><p:sldId id="256" r:id="rId2"/></p:sldIdLst>
</p:presentation>"#;

        assert_eq!(slide_id_list(xml).unwrap(), vec!["rId3", "rId2"]);
    }

    #[test]
    fn test_slide_id_list_missing() {
        let xml = r#"<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"/>"#;
        assert!(slide_id_list(xml).unwrap().is_empty());
    }

    #[test]
    fn test_not_a_zip() {
        let err = PptxParser::new()
            .parse(std::io::Cursor::new(b"plain text, not a container".to_vec()), "notes.txt")
            .unwrap_err();
        assert!(matches!(err, Error::DocumentOpen(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = PptxParser::new()
            .open(Path::new("/definitely/not/here.pptx"))
            .unwrap_err();
        assert!(matches!(err, Error::DocumentOpen(_)));
    }
}
