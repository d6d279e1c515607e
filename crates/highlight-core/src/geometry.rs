//! Live selection geometry as reported by the rendering surface
//!
//! These types mirror what a browser hands back for a text selection:
//! viewport-space pixel rectangles that depend on zoom and scroll. The
//! [`SelectionGeometry`] trait is the only seam through which the capture
//! path reads them, so the normalizer itself never touches a DOM.

use serde::{Deserialize, Serialize};

/// A rectangle in viewport pixels (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClientRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl ClientRect {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Build from an origin and a size, the way `DOMRect` is usually constructed.
    pub fn from_origin_size(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self::new(left, top, left + width, top + height)
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Inclusive overlap test; touching edges count as intersecting.
    pub fn intersects(&self, other: &ClientRect) -> bool {
        self.left <= other.right
            && other.left <= self.right
            && self.top <= other.bottom
            && other.top <= self.bottom
    }
}

/// Snapshot of the current text selection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    /// Selected text exactly as the platform reports it
    pub text: String,
    /// One rectangle per visual line fragment, in viewport pixels
    pub client_rects: Vec<ClientRect>,
}

impl SelectionSnapshot {
    pub fn new(text: impl Into<String>, client_rects: Vec<ClientRect>) -> Self {
        Self {
            text: text.into(),
            client_rects,
        }
    }

    /// True for a click-without-drag or a whitespace-only selection
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Geometry of a page's text layer at capture time
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TextLayerGeometry {
    /// Bounding rectangle in viewport pixels; its top-left is the local origin
    pub bounds: ClientRect,
    /// Layout width in pixels at the current scale
    pub client_width: f64,
    /// Layout height in pixels at the current scale
    pub client_height: f64,
}

impl TextLayerGeometry {
    pub fn new(bounds: ClientRect, client_width: f64, client_height: f64) -> Self {
        Self {
            bounds,
            client_width,
            client_height,
        }
    }

    /// A layer whose layout size equals its bounding rectangle
    pub fn from_bounds(bounds: ClientRect) -> Self {
        Self::new(bounds, bounds.width(), bounds.height())
    }
}

/// Read access to the live selection and page text layers.
///
/// Implemented over `web_sys` in the browser and with synthetic rectangles
/// in tests.
pub trait SelectionGeometry {
    /// Current selection, or `None` when nothing is selected
    fn selection(&self) -> Option<SelectionSnapshot>;

    /// Text layer geometry of the given 1-based page, if it is mounted
    fn text_layer(&self, page_number: u32) -> Option<TextLayerGeometry>;

    /// Drop the live selection once it has been consumed
    fn clear_selection(&mut self);
}
