//! Overlay projection
//!
//! Projects stored highlights back into absolute pixel rectangles for the
//! page's current zoom. This is a pure multiplication by scale; nothing is
//! re-measured.

use crate::config::HighlighterConfig;
use crate::store::HighlightStore;
use crate::types::{HighlightColor, HighlightRecord};
use serde::Serialize;

/// One positioned overlay element
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayRect {
    /// Stable across re-renders: `{highlight_id}-{fragment_index}`
    pub key: String,
    pub highlight_id: String,
    pub fragment_index: usize,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub color: HighlightColor,
    /// Hover / accessibility text
    pub title: String,
}

impl OverlayRect {
    /// CSS declarations for an absolutely positioned, click-through element
    pub fn style_declarations(&self, fill: &str) -> Vec<(&'static str, String)> {
        vec![
            ("position", "absolute".to_string()),
            ("left", format!("{}px", self.left)),
            ("top", format!("{}px", self.top)),
            ("width", format!("{}px", self.width)),
            ("height", format!("{}px", self.height)),
            ("background-color", fill.to_string()),
            ("pointer-events", "none".to_string()),
        ]
    }
}

/// Overlay rectangles for every highlight on `page_number` at `scale`.
///
/// A non-finite or non-positive scale renders nothing.
pub fn render(store: &HighlightStore, page_number: u32, scale: f64) -> Vec<OverlayRect> {
    if !scale.is_finite() || scale <= 0.0 {
        return Vec::new();
    }
    store
        .by_page(page_number)
        .flat_map(|record| project(record, scale))
        .collect()
}

/// Project a single record's fragments at `scale`
pub fn project(record: &HighlightRecord, scale: f64) -> impl Iterator<Item = OverlayRect> + '_ {
    record
        .position
        .rects
        .iter()
        .enumerate()
        .map(move |(index, rect)| OverlayRect {
            key: format!("{}-{}", record.id, index),
            highlight_id: record.id.clone(),
            fragment_index: index,
            left: rect.x1 * scale,
            top: rect.y1 * scale,
            width: rect.width * scale,
            height: rect.height * scale,
            color: record.color,
            title: record.content.clone(),
        })
}

/// Semi-transparent CSS fill for a palette color
pub fn fill_css(config: &HighlighterConfig, color: HighlightColor) -> String {
    config.rgb(color).to_css_rgba(config.highlight.opacity)
}
