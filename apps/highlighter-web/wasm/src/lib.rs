//! WASM bindings for the PDF highlighter
//!
//! State lives in Rust inside `HighlightSession`: the loaded document, the
//! highlight store, zoom and the highlighter tool. JavaScript renders pages
//! and forwards UI events.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { HighlightSession } from './pkg/highlighter_wasm.js';
//!
//! await init();
//!
//! const session = new HighlightSession();
//! const info = session.loadDocument(file.name, bytes);
//!
//! session.toggleHighlighter();
//! session.setColor("blue");
//! pageDiv.addEventListener("mouseup", () => session.captureSelection(pageNumber));
//!
//! session.zoomIn();
//! session.renderAllOverlays();
//!
//! session.download();
//! ```

pub mod dom;
pub mod download;
pub mod overlay;
pub mod session;

use wasm_bindgen::prelude::*;

pub use session::HighlightSession;

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&"highlighter-wasm initialized".into());
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Get page count from PDF bytes (convenience function)
#[wasm_bindgen]
pub fn get_page_count(bytes: &[u8]) -> Result<u32, JsValue> {
    highlight_core::get_page_count(bytes)
        .map_err(|e| JsValue::from_str(&format!("Failed to parse PDF: {}", e)))
}

/// Download name for the highlighted copy of `original`
#[wasm_bindgen]
pub fn export_file_name(original: &str) -> String {
    highlight_core::export_file_name(original)
}
