//! Selection geometry read from the live DOM

use highlight_core::config::DomConfig;
use highlight_core::{ClientRect, SelectionGeometry, SelectionSnapshot, TextLayerGeometry};
use wasm_bindgen::prelude::*;
use web_sys::{Document, DomRect, Selection, Window};

/// `SelectionGeometry` over `window.getSelection()` and the page text layers
pub struct DomSelection {
    window: Window,
    document: Document,
    config: DomConfig,
}

impl DomSelection {
    /// # Errors
    /// Returns JsValue error if unable to access window or document
    pub fn new(config: &DomConfig) -> Result<Self, JsValue> {
        let window =
            web_sys::window().ok_or_else(|| JsValue::from_str("No window object available"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("No document object available"))?;

        Ok(Self {
            window,
            document,
            config: config.clone(),
        })
    }

    fn live_selection(&self) -> Option<Selection> {
        self.window.get_selection().ok().flatten()
    }
}

impl SelectionGeometry for DomSelection {
    fn selection(&self) -> Option<SelectionSnapshot> {
        let selection = self.live_selection()?;
        if selection.range_count() == 0 {
            return None;
        }
        let text = String::from(selection.to_string());
        let range = selection.get_range_at(0).ok()?;

        let mut client_rects = Vec::new();
        if let Some(list) = range.get_client_rects() {
            for i in 0..list.length() {
                if let Some(rect) = list.get(i) {
                    client_rects.push(client_rect(&rect));
                }
            }
        }

        Some(SelectionSnapshot::new(text, client_rects))
    }

    fn text_layer(&self, page_number: u32) -> Option<TextLayerGeometry> {
        let selector = self.config.text_layer_selector_for(page_number);
        let layer = self.document.query_selector(&selector).ok().flatten()?;
        Some(TextLayerGeometry::new(
            client_rect(&layer.get_bounding_client_rect()),
            layer.client_width() as f64,
            layer.client_height() as f64,
        ))
    }

    fn clear_selection(&mut self) {
        if let Some(selection) = self.live_selection() {
            let _ = selection.remove_all_ranges();
        }
    }
}

fn client_rect(rect: &DomRect) -> ClientRect {
    ClientRect::from_origin_size(rect.x(), rect.y(), rect.width(), rect.height())
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_missing_text_layer_is_none() {
        let dom = DomSelection::new(&DomConfig::default()).unwrap();
        assert!(dom.text_layer(999).is_none());
    }

    #[wasm_bindgen_test]
    fn test_empty_selection_yields_no_fragments() {
        let mut dom = DomSelection::new(&DomConfig::default()).unwrap();
        dom.clear_selection();
        let snapshot = dom.selection();
        assert!(snapshot.map_or(true, |s| s.client_rects.is_empty()));
    }
}
