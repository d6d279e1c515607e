//! Paints highlight overlays into the page DOM
//!
//! Each page gets one absolutely positioned, click-through container holding
//! a `div` per highlight fragment. Every paint replaces the container's
//! children, so the DOM always mirrors the store at the current zoom.

use highlight_core::overlay::fill_css;
use highlight_core::{HighlighterConfig, OverlayRect};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement};

pub struct OverlayPainter {
    document: Document,
}

impl OverlayPainter {
    /// # Errors
    /// Returns JsValue error if unable to access window or document
    pub fn new() -> Result<Self, JsValue> {
        let window =
            web_sys::window().ok_or_else(|| JsValue::from_str("No window object available"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("No document object available"))?;
        Ok(Self { document })
    }

    /// Replace the overlay of one page with `rects`.
    ///
    /// Returns `false` when the page is not in the DOM (not rendered yet).
    pub fn paint(
        &self,
        config: &HighlighterConfig,
        page_number: u32,
        rects: &[OverlayRect],
    ) -> Result<bool, JsValue> {
        let Some(page) = self
            .document
            .query_selector(&config.dom.page_selector_for(page_number))?
        else {
            return Ok(false);
        };

        let container = self.container(&page, &config.dom.overlay_class, page_number)?;
        container.set_inner_html("");

        for rect in rects {
            let element = self.create_rect(config, rect)?;
            container.append_child(&element)?;
        }
        Ok(true)
    }

    fn container(
        &self,
        page: &Element,
        class_name: &str,
        page_number: u32,
    ) -> Result<Element, JsValue> {
        if let Some(existing) = page.query_selector(&format!(".{}", class_name))? {
            return Ok(existing);
        }

        let overlay = self.document.create_element("div")?;
        overlay.set_class_name(class_name);
        overlay.set_id(&format!("highlight-layer-page-{}", page_number));

        if let Some(html_element) = overlay.dyn_ref::<HtmlElement>() {
            let style = html_element.style();
            style.set_property("position", "absolute")?;
            style.set_property("top", "0")?;
            style.set_property("left", "0")?;
            style.set_property("width", "100%")?;
            style.set_property("height", "100%")?;
            style.set_property("pointer-events", "none")?;
        }

        page.append_child(&overlay)?;
        Ok(overlay)
    }

    fn create_rect(
        &self,
        config: &HighlighterConfig,
        rect: &OverlayRect,
    ) -> Result<Element, JsValue> {
        let element = self.document.create_element("div")?;
        element.set_class_name("highlight-rect");
        element.set_attribute("data-key", &rect.key)?;
        element.set_attribute("data-highlight-id", &rect.highlight_id)?;

        if let Some(html_element) = element.dyn_ref::<HtmlElement>() {
            html_element.set_title(&rect.title);
            let style = html_element.style();
            for (property, value) in rect.style_declarations(&fill_css(config, rect.color)) {
                style.set_property(property, &value)?;
            }
        }

        Ok(element)
    }
}
