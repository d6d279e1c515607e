//! Loaded document handle
//!
//! Validates PDF bytes and exposes the small surface the highlighter needs:
//! page count, page text, page boxes and the original bytes for export.

use crate::coords::{box_to_view_box, PageBox};
use crate::error::HighlightError;
use lopdf::{Document, Object, ObjectId};
use serde::Serialize;
use tracing::warn;

/// US Letter as `[x0, y0, x1, y1]`, used when a page carries no usable `/MediaBox`
pub const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Maximum `/Parent` hops followed when resolving inherited page attributes
const MAX_INHERITANCE_DEPTH: usize = 32;

/// What the highlighter needs from a loaded document
pub trait DocumentHandle {
    /// Display name (usually the uploaded file name)
    fn name(&self) -> &str;

    fn page_count(&self) -> u32;

    /// Plain text of a 1-based page; empty when extraction fails
    fn page_text(&self, page_number: u32) -> String;

    /// Visible box and rotation of a 1-based page
    fn page_box(&self, page_number: u32) -> Option<PageBox>;

    /// Original file bytes
    fn bytes(&self) -> &[u8];
}

/// PDF file information extracted during validation
#[derive(Debug, Clone, Serialize, Default)]
pub struct PdfInfo {
    /// Number of pages in the document
    pub page_count: u32,
    /// PDF version string (e.g., "1.7")
    pub version: String,
    /// Whether the document is encrypted
    pub encrypted: bool,
    /// File size in bytes
    pub size_bytes: usize,
    /// Document title from metadata (if available)
    pub title: Option<String>,
    /// Document author from metadata (if available)
    pub author: Option<String>,
}

/// A parsed PDF held in memory for the length of a viewing session
pub struct PdfDocument {
    name: String,
    bytes: Vec<u8>,
    document: Document,
    info: PdfInfo,
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("name", &self.name)
            .field("info", &self.info)
            .finish()
    }
}

impl PdfDocument {
    /// Validate and parse PDF bytes
    pub fn load(name: &str, bytes: &[u8]) -> Result<Self, HighlightError> {
        quick_validate(bytes)?;

        let document =
            Document::load_mem(bytes).map_err(|e| HighlightError::ParseError(e.to_string()))?;

        let page_count = document.get_pages().len() as u32;
        if page_count == 0 {
            return Err(HighlightError::InvalidDocument(
                "PDF has no pages".to_string(),
            ));
        }

        let (title, author) = extract_metadata(&document);
        let info = PdfInfo {
            page_count,
            version: extract_version(bytes),
            encrypted: document.is_encrypted(),
            size_bytes: bytes.len(),
            title,
            author,
        };

        Ok(Self {
            name: name.to_string(),
            bytes: bytes.to_vec(),
            document,
            info,
        })
    }

    pub fn info(&self) -> &PdfInfo {
        &self.info
    }
}

impl DocumentHandle for PdfDocument {
    fn name(&self) -> &str {
        &self.name
    }

    fn page_count(&self) -> u32 {
        self.info.page_count
    }

    fn page_text(&self, page_number: u32) -> String {
        if page_number == 0 || page_number > self.info.page_count {
            warn!(page_number, "text requested for a page outside the document");
            return String::new();
        }
        match self.document.extract_text(&[page_number]) {
            Ok(text) => text.split_whitespace().collect::<Vec<_>>().join(" "),
            Err(e) => {
                warn!(page_number, error = %e, "failed to extract page text");
                String::new()
            }
        }
    }

    fn page_box(&self, page_number: u32) -> Option<PageBox> {
        let page_id = *self.document.get_pages().get(&page_number)?;
        Some(page_box(&self.document, page_id))
    }

    fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Quick validation without full parsing
pub fn quick_validate(bytes: &[u8]) -> Result<(), HighlightError> {
    if bytes.len() < 8 {
        return Err(HighlightError::InvalidDocument(
            "File too small to be a valid PDF".to_string(),
        ));
    }

    if !bytes.starts_with(b"%PDF-") {
        return Err(HighlightError::InvalidDocument(
            "Not a valid PDF file (missing %PDF- header)".to_string(),
        ));
    }

    // EOF marker should be near the end
    let tail = if bytes.len() > 1024 {
        &bytes[bytes.len() - 1024..]
    } else {
        bytes
    };
    if !tail.windows(5).any(|w| w == b"%%EOF") {
        return Err(HighlightError::InvalidDocument(
            "PDF appears truncated (missing %%EOF marker)".to_string(),
        ));
    }

    Ok(())
}

/// Visible area of a page: `/CropBox` clipped to `/MediaBox` (both
/// inheritable), with the page's `/Rotate`. Missing or unusable boxes fall
/// back to the media box, then to US Letter.
pub fn page_box(doc: &Document, page_id: ObjectId) -> PageBox {
    let media_box = inherited_attribute(doc, page_id, b"MediaBox")
        .and_then(|obj| resolve_box(doc, obj))
        .map(normalize_box)
        .unwrap_or(DEFAULT_MEDIA_BOX);

    let visible = inherited_attribute(doc, page_id, b"CropBox")
        .and_then(|obj| resolve_box(doc, obj))
        .map(normalize_box)
        .and_then(|crop_box| intersect(crop_box, media_box))
        .unwrap_or(media_box);

    let rotation = inherited_attribute(doc, page_id, b"Rotate")
        .and_then(|obj| resolve(doc, obj).as_i64().ok())
        .unwrap_or(0);
    if rotation % 90 != 0 {
        warn!(rotation, "ignoring /Rotate that is not a multiple of 90");
    }

    PageBox::new(box_to_view_box(visible), rotation)
}

/// Look up a page attribute, following `/Parent` for inheritable keys
fn inherited_attribute<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = Some(page_id);
    // Cyclic /Parent chains appear in malformed files
    for _ in 0..MAX_INHERITANCE_DEPTH {
        let dict = doc.get_dictionary(current?).ok()?;
        if let Ok(obj) = dict.get(key) {
            return Some(obj);
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

/// `[x0, y0, x1, y1]` with `x0 < x1` and `y0 < y1`
fn normalize_box(pdf_box: [f64; 4]) -> [f64; 4] {
    let [x0, y0, x1, y1] = pdf_box;
    [x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)]
}

fn intersect(a: [f64; 4], b: [f64; 4]) -> Option<[f64; 4]> {
    let out = [a[0].max(b[0]), a[1].max(b[1]), a[2].min(b[2]), a[3].min(b[3])];
    if out[0] < out[2] && out[1] < out[3] {
        Some(out)
    } else {
        warn!(crop_box = ?a, media_box = ?b, "crop box lies outside the media box");
        None
    }
}

fn resolve_box(doc: &Document, obj: &Object) -> Option<[f64; 4]> {
    let values = resolve(doc, obj).as_array().ok()?;
    if values.len() != 4 {
        return None;
    }
    let mut out = [0.0f64; 4];
    for (slot, value) in out.iter_mut().zip(values) {
        *slot = match resolve(doc, value) {
            Object::Integer(v) => *v as f64,
            Object::Real(v) => *v as f64,
            _ => return None,
        };
    }
    if out[0] == out[2] || out[1] == out[3] {
        return None;
    }
    Some(out)
}

/// Extract PDF version from header
fn extract_version(bytes: &[u8]) -> String {
    // Header format: %PDF-1.7
    if bytes.len() >= 8 && bytes.starts_with(b"%PDF-") {
        if let Ok(version) = std::str::from_utf8(&bytes[5..8]) {
            return version.trim().to_string();
        }
    }
    "1.4".to_string()
}

/// Extract title and author from the trailer's Info dictionary
fn extract_metadata(document: &Document) -> (Option<String>, Option<String>) {
    let info_dict = document
        .trailer
        .get(b"Info")
        .and_then(Object::as_reference)
        .ok()
        .and_then(|id| document.get_dictionary(id).ok());

    let Some(info_dict) = info_dict else {
        return (None, None);
    };

    let field = |key: &[u8]| {
        info_dict
            .get(key)
            .and_then(Object::as_str)
            .ok()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .filter(|s| !s.is_empty())
    };

    (field(b"Title"), field(b"Author"))
}
