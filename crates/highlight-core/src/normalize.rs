//! Selection → highlight record normalization
//!
//! Converts viewport-space selection rectangles into unscaled page-local
//! rectangles by subtracting the text layer origin and dividing out the
//! current zoom factor.

use crate::geometry::{ClientRect, SelectionSnapshot, TextLayerGeometry};
use crate::types::{
    generate_highlight_id, HighlightColor, HighlightPosition, HighlightRecord, LayerRect,
};
use tracing::debug;

/// Highlighter state consulted at capture time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HighlighterTool {
    pub active: bool,
    pub color: HighlightColor,
}

impl HighlighterTool {
    pub fn new(active: bool, color: HighlightColor) -> Self {
        Self { active, color }
    }
}

/// Normalize a live selection into a scale-independent highlight record.
///
/// Returns `None` for every incidental case: inactive highlighter, blank
/// selection, missing or unlaid text layer, no client rectangles, an unusable
/// scale, or a selection with no fragment on this page. None of these are
/// errors.
pub fn normalize(
    selection: &SelectionSnapshot,
    page_number: u32,
    text_layer: Option<&TextLayerGeometry>,
    scale: f64,
    tool: &HighlighterTool,
) -> Option<HighlightRecord> {
    normalize_at(
        selection,
        page_number,
        text_layer,
        scale,
        tool,
        chrono::Utc::now().timestamp_millis(),
    )
}

/// [`normalize`] with an explicit capture timestamp (epoch milliseconds)
pub fn normalize_at(
    selection: &SelectionSnapshot,
    page_number: u32,
    text_layer: Option<&TextLayerGeometry>,
    scale: f64,
    tool: &HighlighterTool,
    created_at: i64,
) -> Option<HighlightRecord> {
    if !tool.active {
        debug!(page_number, "capture skipped: highlighter inactive");
        return None;
    }
    if page_number == 0 {
        debug!("capture skipped: page numbers start at 1");
        return None;
    }
    if selection.is_blank() {
        debug!(page_number, "capture skipped: blank selection");
        return None;
    }
    let Some(layer) = text_layer else {
        debug!(page_number, "capture skipped: text layer not mounted");
        return None;
    };
    if !(layer.client_width > 0.0 && layer.client_height > 0.0) {
        debug!(page_number, "capture skipped: text layer has no layout");
        return None;
    }
    if selection.client_rects.is_empty() {
        debug!(page_number, "capture skipped: no client rects");
        return None;
    }
    if !scale.is_finite() || scale <= 0.0 {
        debug!(page_number, scale, "capture skipped: unusable scale");
        return None;
    }

    let rects: Vec<LayerRect> = selection
        .client_rects
        .iter()
        .filter(|fragment| fragment.intersects(&layer.bounds))
        .map(|fragment| to_layer_rect(fragment, &layer.bounds, scale))
        .collect();

    // Fragments on neighbouring pages were filtered out above
    let bounding_rect = match LayerRect::envelope(&rects) {
        Some(rect) => rect,
        None => {
            debug!(page_number, "capture skipped: selection lies on another page");
            return None;
        }
    };

    Some(HighlightRecord {
        id: generate_highlight_id(),
        page_number,
        position: HighlightPosition {
            bounding_rect,
            rects,
            page_width: layer.client_width / scale,
            page_height: layer.client_height / scale,
        },
        color: tool.color,
        content: selection.text.clone(),
        created_at,
    })
}

fn to_layer_rect(fragment: &ClientRect, origin: &ClientRect, scale: f64) -> LayerRect {
    LayerRect::from_edges(
        (fragment.left - origin.left) / scale,
        (fragment.top - origin.top) / scale,
        (fragment.right - origin.left) / scale,
        (fragment.bottom - origin.top) / scale,
    )
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn fragment() -> impl Strategy<Value = ClientRect> {
        (0.0f64..500.0, 0.0f64..700.0, 0.0f64..100.0, 0.0f64..40.0)
            .prop_map(|(x, y, w, h)| ClientRect::from_origin_size(x, y, w, h))
    }

    proptest! {
        /// Property: every captured record satisfies the envelope invariant
        #[test]
        fn bounding_rect_envelopes_fragments(
            fragments in prop::collection::vec(fragment(), 1..8),
            scale in 0.5f64..3.0,
        ) {
            let layer = TextLayerGeometry::from_bounds(ClientRect::from_origin_size(
                0.0, 0.0, 612.0 * scale, 792.0 * scale,
            ));
            let scaled: Vec<ClientRect> = fragments
                .iter()
                .map(|r| ClientRect::new(r.left * scale, r.top * scale, r.right * scale, r.bottom * scale))
                .collect();
            let selection = SelectionSnapshot::new("some text", scaled);
            let tool = HighlighterTool::new(true, HighlightColor::Green);

            let record = normalize(&selection, 1, Some(&layer), scale, &tool).unwrap();
            let envelope = LayerRect::envelope(&record.position.rects).unwrap();
            prop_assert!(envelope.approx_eq(&record.position.bounding_rect));
            prop_assert!(record.validate().is_ok());
        }

        /// Property: width and height always match the stored edges
        #[test]
        fn sizes_match_edges(
            fragments in prop::collection::vec(fragment(), 1..8),
            scale in 0.5f64..3.0,
        ) {
            let layer = TextLayerGeometry::from_bounds(ClientRect::from_origin_size(
                0.0, 0.0, 612.0 * scale, 792.0 * scale,
            ));
            let scaled: Vec<ClientRect> = fragments
                .iter()
                .map(|r| ClientRect::new(r.left * scale, r.top * scale, r.right * scale, r.bottom * scale))
                .collect();
            let selection = SelectionSnapshot::new("some text", scaled);
            let tool = HighlighterTool::new(true, HighlightColor::Pink);

            let record = normalize(&selection, 1, Some(&layer), scale, &tool).unwrap();
            for rect in &record.position.rects {
                prop_assert_eq!(rect.width, rect.x2 - rect.x1);
                prop_assert_eq!(rect.height, rect.y2 - rect.y1);
            }
        }
    }
}
