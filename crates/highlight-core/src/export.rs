//! Export highlights into a copy of the PDF
//!
//! Each highlight record becomes one `/Highlight` annotation on its page,
//! with a QuadPoints entry per line fragment so multi-line selections do not
//! paint the whitespace between lines.

use crate::config::HighlighterConfig;
use crate::coords::{layer_rect_to_pdf, PageBox};
use crate::document::DocumentHandle;
use crate::error::HighlightError;
use crate::types::{HighlightColor, HighlightRecord};
use chrono::{DateTime, Utc};
use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};
use std::collections::BTreeMap;
use tracing::info;

/// Styling applied to exported annotations
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub opacity: f64,
    pub author: String,
    config: HighlighterConfig,
}

impl ExportOptions {
    pub fn from_config(config: &HighlighterConfig) -> Self {
        Self {
            opacity: config.highlight.opacity,
            author: config.highlight.author.clone(),
            config: config.clone(),
        }
    }

    fn rgb(&self, color: HighlightColor) -> (f32, f32, f32) {
        self.config.rgb(color).to_unit()
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::from_config(&HighlighterConfig::default())
    }
}

/// A finished export ready to be saved
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub annotation_count: usize,
}

/// Append `.pdf` unless the name already ends with it (any case)
pub fn ensure_pdf_extension(name: &str) -> String {
    if name.to_lowercase().ends_with(".pdf") {
        name.to_string()
    } else {
        format!("{}.pdf", name)
    }
}

/// Download name for an annotated copy of `original`
pub fn export_file_name(original: &str) -> String {
    ensure_pdf_extension(&format!("highlighted_{}", original))
}

/// Write every highlight into a copy of `document` as PDF annotations.
///
/// Nothing is produced unless every highlight could be written.
pub fn export_highlights<D>(
    document: &D,
    highlights: &[HighlightRecord],
    suggested_name: &str,
    options: &ExportOptions,
) -> Result<ExportArtifact, HighlightError>
where
    D: DocumentHandle + ?Sized,
{
    let file_name = ensure_pdf_extension(suggested_name);

    if highlights.is_empty() {
        // No changes, return original
        return Ok(ExportArtifact {
            file_name,
            bytes: document.bytes().to_vec(),
            annotation_count: 0,
        });
    }

    let mut doc = Document::load_mem(document.bytes())
        .map_err(|e| HighlightError::ParseError(e.to_string()))?;
    let pages: BTreeMap<u32, ObjectId> = doc.get_pages();
    let page_count = pages.len() as u32;

    for highlight in highlights {
        highlight.validate()?;
        let not_found = || HighlightError::PageNotFound {
            page: highlight.page_number,
            page_count,
        };
        let page_id = *pages.get(&highlight.page_number).ok_or_else(not_found)?;
        let page_box = document.page_box(highlight.page_number).ok_or_else(not_found)?;
        add_highlight_annotation(&mut doc, page_id, &page_box, highlight, options)?;
    }

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| HighlightError::ExportError(e.to_string()))?;

    info!(
        file_name = %file_name,
        annotations = highlights.len(),
        size = bytes.len(),
        "exported highlighted PDF"
    );

    Ok(ExportArtifact {
        file_name,
        bytes,
        annotation_count: highlights.len(),
    })
}

fn add_highlight_annotation(
    doc: &mut Document,
    page_id: ObjectId,
    page_box: &PageBox,
    highlight: &HighlightRecord,
    options: &ExportOptions,
) -> Result<(), HighlightError> {
    let position = &highlight.position;
    let (page_width, page_height) = (position.page_width, position.page_height);

    let bounds = layer_rect_to_pdf(&position.bounding_rect, page_width, page_height, page_box);
    let quad_points: Vec<Object> = position
        .rects
        .iter()
        .flat_map(|rect| layer_rect_to_pdf(rect, page_width, page_height, page_box).quad_points())
        .map(|v| Object::Real(v as f32))
        .collect();

    let (r, g, b) = options.rgb(highlight.color);

    let mut annot = Dictionary::new();
    annot.set("Type", Object::Name(b"Annot".to_vec()));
    annot.set("Subtype", Object::Name(b"Highlight".to_vec()));
    annot.set(
        "Rect",
        Object::Array(bounds.rect().iter().map(|v| Object::Real(*v as f32)).collect()),
    );
    annot.set("QuadPoints", Object::Array(quad_points));
    annot.set(
        "C",
        Object::Array(vec![Object::Real(r), Object::Real(g), Object::Real(b)]),
    );
    annot.set("CA", Object::Real(options.opacity as f32));
    annot.set("Contents", text_string(&highlight.content));
    annot.set("NM", text_string(&highlight.id));
    annot.set("T", text_string(&options.author));
    annot.set(
        "M",
        Object::String(
            pdf_date(highlight.created_at).into_bytes(),
            StringFormat::Literal,
        ),
    );
    annot.set("P", Object::Reference(page_id));
    // Print flag
    annot.set("F", Object::Integer(4));

    let annot_id = doc.add_object(Object::Dictionary(annot));
    add_annotation_to_page(doc, page_id, annot_id)
}

fn add_annotation_to_page(
    doc: &mut Document,
    page_id: ObjectId,
    annot_id: ObjectId,
) -> Result<(), HighlightError> {
    // /Annots may be an indirect array shared with nothing else; resolve it first
    let indirect_annots = doc
        .get_dictionary(page_id)
        .ok()
        .and_then(|page| page.get(b"Annots").ok())
        .and_then(|annots| annots.as_reference().ok());

    if let Some(annots_id) = indirect_annots {
        if let Ok(Object::Array(ref mut arr)) = doc.get_object_mut(annots_id) {
            arr.push(Object::Reference(annot_id));
            return Ok(());
        }
    }

    let page = doc
        .get_object_mut(page_id)
        .map_err(|e| HighlightError::ExportError(e.to_string()))?;

    if let Object::Dictionary(ref mut page_dict) = page {
        if let Ok(Object::Array(ref mut arr)) = page_dict.get_mut(b"Annots") {
            arr.push(Object::Reference(annot_id));
        } else {
            page_dict.set("Annots", Object::Array(vec![Object::Reference(annot_id)]));
        }
        Ok(())
    } else {
        Err(HighlightError::ExportError(format!(
            "page object {:?} is not a dictionary",
            page_id
        )))
    }
}

/// PDF text string: PDFDocEncoding-compatible ASCII as-is, UTF-16BE with BOM otherwise
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        Object::String(text.as_bytes().to_vec(), StringFormat::Literal)
    } else {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        Object::String(bytes, StringFormat::Hexadecimal)
    }
}

/// `D:YYYYMMDDHHmmSSZ` for an epoch-millisecond timestamp
fn pdf_date(epoch_millis: i64) -> String {
    let time = DateTime::<Utc>::from_timestamp_millis(epoch_millis).unwrap_or_default();
    time.format("D:%Y%m%d%H%M%SZ").to_string()
}
