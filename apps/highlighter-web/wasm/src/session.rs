//! Stateful highlighting session
//!
//! Holds the viewer state in Rust memory. Methods with an `_internal`
//! suffix carry the logic and are testable without JsValue.

use crate::dom::DomSelection;
use crate::download::trigger_download;
use crate::overlay::OverlayPainter;
use highlight_core::{
    export_file_name, DocumentHandle, ExportArtifact, HighlightColor, HighlightRecord,
    HighlighterConfig, PdfDocument, PdfInfo, ViewerState,
};
use std::ops::RangeInclusive;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct HighlightSession {
    viewer: ViewerState<PdfDocument>,
}

impl HighlightSession {
    fn new_internal(config_json: Option<&str>) -> Result<Self, String> {
        let config = match config_json {
            Some(json) => HighlighterConfig::from_json(json).map_err(|e| e.to_string())?,
            None => HighlighterConfig::default(),
        };
        Ok(Self {
            viewer: ViewerState::new(config),
        })
    }

    fn load_document_internal(&mut self, name: &str, bytes: &[u8]) -> Result<PdfInfo, String> {
        match PdfDocument::load(name, bytes) {
            Ok(document) => {
                let info = document.info().clone();
                self.viewer.on_document_loaded(document);
                Ok(info)
            }
            Err(e) => Err(self.viewer.on_document_load_failed(&e).message),
        }
    }

    fn set_color_internal(&mut self, color: &str) -> Result<(), String> {
        let color: HighlightColor = color.parse().map_err(|e| format!("{}", e))?;
        self.viewer.set_color(color);
        Ok(())
    }

    fn export_internal(&mut self, suggested_name: &str) -> Result<ExportArtifact, String> {
        self.viewer
            .export_pdf(suggested_name)
            .map_err(|e| e.to_string())
    }

    /// Download name derived from the loaded document
    fn default_export_name(&self) -> Result<String, String> {
        self.viewer
            .document()
            .map(|doc| export_file_name(doc.name()))
            .ok_or_else(|| "No document loaded".to_string())
    }

    fn page_numbers(&self) -> RangeInclusive<u32> {
        1..=self.page_count()
    }

    fn repaint(&self, pages: RangeInclusive<u32>) -> Result<(), JsValue> {
        let painter = OverlayPainter::new()?;
        for page_number in pages {
            self.paint(&painter, page_number)?;
        }
        Ok(())
    }

    fn paint(&self, painter: &OverlayPainter, page_number: u32) -> Result<(), JsValue> {
        painter.paint(
            self.viewer.config(),
            page_number,
            &self.viewer.overlay(page_number),
        )?;
        Ok(())
    }
}

#[wasm_bindgen]
impl HighlightSession {
    /// Create a session. `config_json` overrides the default settings.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<HighlightSession, JsValue> {
        Self::new_internal(config_json.as_deref()).map_err(|e| JsValue::from_str(&e))
    }

    /// Load a PDF, discarding all highlights of the previous document and
    /// their overlays. Returns document info on success.
    #[wasm_bindgen(js_name = loadDocument)]
    pub fn load_document(&mut self, name: &str, bytes: &[u8]) -> Result<JsValue, JsValue> {
        let previous_pages = self.page_count();
        let info = self
            .load_document_internal(name, bytes)
            .map_err(|e| JsValue::from_str(&e))?;
        self.repaint(1..=previous_pages.max(info.page_count))?;

        serde_wasm_bindgen::to_value(&info)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    #[wasm_bindgen(js_name = pageCount)]
    pub fn page_count(&self) -> u32 {
        self.viewer.document().map_or(0, |doc| doc.page_count())
    }

    #[wasm_bindgen(js_name = getPageText)]
    pub fn get_page_text(&self, page_number: u32) -> String {
        self.viewer
            .document()
            .map(|doc| doc.page_text(page_number))
            .unwrap_or_default()
    }

    // ---- zoom ----

    #[wasm_bindgen(getter)]
    pub fn scale(&self) -> f64 {
        self.viewer.scale()
    }

    /// Zoom changes repaint every overlay at the new scale
    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&mut self) -> Result<f64, JsValue> {
        let scale = self.viewer.zoom_in();
        self.render_all_overlays()?;
        Ok(scale)
    }

    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&mut self) -> Result<f64, JsValue> {
        let scale = self.viewer.zoom_out();
        self.render_all_overlays()?;
        Ok(scale)
    }

    #[wasm_bindgen(js_name = setScale)]
    pub fn set_scale(&mut self, scale: f64) -> Result<f64, JsValue> {
        let scale = self.viewer.set_scale(scale);
        self.render_all_overlays()?;
        Ok(scale)
    }

    // ---- highlighter tool ----

    #[wasm_bindgen(js_name = toggleHighlighter)]
    pub fn toggle_highlighter(&mut self) -> bool {
        self.viewer.toggle_highlighter()
    }

    #[wasm_bindgen(getter, js_name = highlighterActive)]
    pub fn highlighter_active(&self) -> bool {
        self.viewer.tool().active
    }

    /// Select the highlight color: "yellow", "blue", "green" or "pink"
    #[wasm_bindgen(js_name = setColor)]
    pub fn set_color(&mut self, color: &str) -> Result<(), JsValue> {
        self.set_color_internal(color)
            .map_err(|e| JsValue::from_str(&e))
    }

    #[wasm_bindgen(getter)]
    pub fn color(&self) -> String {
        self.viewer.tool().color.to_string()
    }

    // ---- capture & overlays ----

    /// Record the current selection on `page_number` and repaint that page.
    /// Returns the new highlight, or null when nothing was recorded.
    #[wasm_bindgen(js_name = captureSelection)]
    pub fn capture_selection(&mut self, page_number: u32) -> Result<JsValue, JsValue> {
        let mut dom = DomSelection::new(&self.viewer.config().dom)?;
        let Some(record) = self.viewer.capture(page_number, &mut dom).cloned() else {
            return Ok(JsValue::NULL);
        };

        self.paint(&OverlayPainter::new()?, page_number)?;
        to_js(&record)
    }

    /// Overlay rectangles for a page at the current zoom
    #[wasm_bindgen(js_name = getOverlay)]
    pub fn get_overlay(&self, page_number: u32) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.viewer.overlay(page_number))
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    #[wasm_bindgen(js_name = renderOverlay)]
    pub fn render_overlay(&self, page_number: u32) -> Result<(), JsValue> {
        self.paint(&OverlayPainter::new()?, page_number)
    }

    /// Repaint every page, e.g. after the page DOM was rebuilt
    #[wasm_bindgen(js_name = renderAllOverlays)]
    pub fn render_all_overlays(&self) -> Result<(), JsValue> {
        self.repaint(self.page_numbers())
    }

    #[wasm_bindgen(js_name = clearHighlights)]
    pub fn clear_highlights(&mut self) -> Result<(), JsValue> {
        self.viewer.clear_highlights();
        self.render_all_overlays()
    }

    #[wasm_bindgen(js_name = highlightCount)]
    pub fn highlight_count(&self) -> usize {
        self.viewer.highlight_count()
    }

    #[wasm_bindgen(js_name = canClear)]
    pub fn can_clear(&self) -> bool {
        self.viewer.can_clear()
    }

    /// All highlights as JSON, in capture order
    #[wasm_bindgen(js_name = getHighlightsJson)]
    pub fn get_highlights_json(&self) -> Result<String, JsValue> {
        self.viewer
            .store()
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    // ---- export ----

    /// Annotated copy of the document as bytes
    #[wasm_bindgen(js_name = exportPdf)]
    pub fn export_pdf(&mut self, suggested_name: Option<String>) -> Result<js_sys::Uint8Array, JsValue> {
        let name = match suggested_name {
            Some(name) => name,
            None => self.default_export_name().map_err(|e| JsValue::from_str(&e))?,
        };
        let artifact = self
            .export_internal(&name)
            .map_err(|e| JsValue::from_str(&e))?;
        Ok(js_sys::Uint8Array::from(artifact.bytes.as_slice()))
    }

    /// Export and save as `highlighted_<name>.pdf`. Returns the file name.
    pub fn download(&mut self) -> Result<String, JsValue> {
        let name = self
            .default_export_name()
            .map_err(|e| JsValue::from_str(&e))?;
        let artifact = self
            .export_internal(&name)
            .map_err(|e| JsValue::from_str(&e))?;
        trigger_download(&artifact.bytes, &artifact.file_name)?;
        Ok(artifact.file_name)
    }
}

fn to_js(record: &HighlightRecord) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(record)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{content::Content, content::Operation, Dictionary, Document, Object, Stream};

    /// Create a valid test PDF with the specified number of pages
    pub(super) fn create_test_pdf(num_pages: u32) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let mut page_ids = Vec::new();

        for i in 0..num_pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new(
                        "Tf",
                        vec![Object::Name(b"F1".to_vec()), Object::Integer(12)],
                    ),
                    Operation::new("Td", vec![Object::Integer(100), Object::Integer(700)]),
                    Operation::new(
                        "Tj",
                        vec![Object::String(
                            format!("Page {}", i + 1).into_bytes(),
                            lopdf::StringFormat::Literal,
                        )],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));

            let page = Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                (
                    "MediaBox",
                    Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(612),
                        Object::Integer(792),
                    ]),
                ),
                ("Contents", Object::Reference(content_id)),
            ]);
            let page_id = doc.add_object(page);
            page_ids.push(page_id);
        }

        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(num_pages as i64)),
            (
                "Kids",
                Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
            ),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_new_session_has_no_document() {
        let session = HighlightSession::new_internal(None).unwrap();
        assert_eq!(session.page_count(), 0);
        assert_eq!(session.highlight_count(), 0);
        assert!(!session.can_clear());
        assert_eq!(session.scale(), 1.0);
        assert!(!session.highlighter_active());
        assert_eq!(session.color(), "yellow");
    }

    #[test]
    fn test_new_session_with_config() {
        let session =
            HighlightSession::new_internal(Some(r#"{"zoom": {"initial": 1.5}}"#)).unwrap();
        assert_eq!(session.scale(), 1.5);
    }

    #[test]
    fn test_new_session_rejects_bad_config() {
        let result = HighlightSession::new_internal(Some(r#"{"highlight": {"opacity": 3.0}}"#));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_document() {
        let mut session = HighlightSession::new_internal(None).unwrap();
        let info = session
            .load_document_internal("paper.pdf", &create_test_pdf(3))
            .unwrap();
        assert_eq!(info.page_count, 3);
        assert_eq!(session.page_count(), 3);
        assert_eq!(session.page_numbers().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_load_failure_keeps_previous_document() {
        let mut session = HighlightSession::new_internal(None).unwrap();
        session
            .load_document_internal("paper.pdf", &create_test_pdf(2))
            .unwrap();

        let err = session
            .load_document_internal("broken.pdf", b"not a pdf")
            .unwrap_err();
        assert!(err.contains("Could not open PDF"));
        assert_eq!(session.page_count(), 2);
    }

    #[test]
    fn test_zoom_and_tool_controls() {
        let mut session = HighlightSession::new_internal(None).unwrap();
        // The JS wrappers also repaint, which needs a browser
        assert_eq!(session.viewer.zoom_in(), 1.1);
        assert_eq!(session.viewer.zoom_out(), 1.0);
        assert_eq!(session.viewer.set_scale(9.0), 3.0);
        assert_eq!(session.scale(), 3.0);
        assert!(session.toggle_highlighter());
        session.set_color_internal("green").unwrap();
        assert_eq!(session.color(), "green");
        assert!(session.set_color_internal("purple").is_err());
        assert_eq!(session.color(), "green");
    }

    #[test]
    fn test_export_without_document_fails() {
        let mut session = HighlightSession::new_internal(None).unwrap();
        assert!(session.default_export_name().is_err());
        assert!(session.export_internal("x").is_err());
    }

    #[test]
    fn test_export_with_no_highlights_returns_original() {
        let pdf = create_test_pdf(1);
        let mut session = HighlightSession::new_internal(None).unwrap();
        session.load_document_internal("paper.pdf", &pdf).unwrap();

        let name = session.default_export_name().unwrap();
        assert_eq!(name, "highlighted_paper.pdf");

        let artifact = session.export_internal(&name).unwrap();
        assert_eq!(artifact.bytes, pdf);
        assert_eq!(artifact.file_name, "highlighted_paper.pdf");

        // The export slot is released afterwards
        assert!(session.export_internal(&name).is_ok());
    }
}
