//! Coordinate transformation between layer space and PDF user space
//!
//! Layer space is the highlight store's space: top-left origin, measured in
//! text layer pixels at scale 1.0. The text layer covers the page's visible
//! box (crop box clipped to the media box) after `/Rotate` has been applied.
//! PDF user space has a bottom-left origin and is not rotated.

use crate::types::LayerRect;

/// The part of a page the viewer renders
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    /// Visible box as `[x, y, width, height]` in user space
    pub view_box: [f64; 4],
    /// Clockwise display rotation: 0, 90, 180 or 270
    pub rotation: u32,
}

impl Default for PageBox {
    /// Unrotated US Letter
    fn default() -> Self {
        Self::new([0.0, 0.0, 612.0, 792.0], 0)
    }
}

impl PageBox {
    /// Rotation is normalized into `0..360`; values off the quarter turns
    /// are treated as unrotated.
    pub fn new(view_box: [f64; 4], rotation: i64) -> Self {
        let rotation = rotation.rem_euclid(360);
        Self {
            view_box,
            rotation: if rotation % 90 == 0 { rotation as u32 } else { 0 },
        }
    }

    /// Width and height of the page as displayed (axes swap on quarter turns)
    pub fn display_size(&self) -> (f64, f64) {
        let [_, _, width, height] = self.view_box;
        match self.rotation {
            90 | 270 => (height, width),
            _ => (width, height),
        }
    }
}

/// Convert layer coordinates (top-left origin, rotated display) to PDF
/// coordinates (bottom-left origin, points)
pub fn layer_to_pdf(
    layer_x: f64,
    layer_y: f64,
    layer_width: f64,
    layer_height: f64,
    page: &PageBox,
) -> (f64, f64) {
    let [vb_x, vb_y, vb_width, vb_height] = page.view_box;

    let x_pct = layer_x / layer_width;
    let y_pct = layer_y / layer_height;

    // Undo the display rotation, then flip the Y axis
    let (u, v) = match page.rotation {
        90 => (y_pct, x_pct),
        180 => (1.0 - x_pct, y_pct),
        270 => (1.0 - y_pct, 1.0 - x_pct),
        _ => (x_pct, 1.0 - y_pct),
    };

    (vb_x + u * vb_width, vb_y + v * vb_height)
}

/// A layer rectangle mapped into PDF user space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfQuad {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

impl PdfQuad {
    /// `[llx, lly, urx, ury]` as used by an annotation `/Rect`
    pub fn rect(&self) -> [f64; 4] {
        [self.left, self.bottom, self.right, self.top]
    }

    /// QuadPoints order: upper-left, upper-right, lower-left, lower-right
    pub fn quad_points(&self) -> [f64; 8] {
        [
            self.left,
            self.top,
            self.right,
            self.top,
            self.left,
            self.bottom,
            self.right,
            self.bottom,
        ]
    }
}

/// Map a layer rectangle onto a page whose text layer measured
/// `layer_width` x `layer_height` at scale 1.0
pub fn layer_rect_to_pdf(
    rect: &LayerRect,
    layer_width: f64,
    layer_height: f64,
    page: &PageBox,
) -> PdfQuad {
    let (ax, ay) = layer_to_pdf(rect.x1, rect.y1, layer_width, layer_height, page);
    let (bx, by) = layer_to_pdf(rect.x2, rect.y2, layer_width, layer_height, page);
    PdfQuad {
        left: ax.min(bx),
        bottom: ay.min(by),
        right: ax.max(bx),
        top: ay.max(by),
    }
}

/// Convert a `[x0, y0, x1, y1]` PDF box into `[x, y, width, height]`
pub fn box_to_view_box(pdf_box: [f64; 4]) -> [f64; 4] {
    let [x0, y0, x1, y1] = pdf_box;
    [x0.min(x1), y0.min(y1), (x1 - x0).abs(), (y1 - y0).abs()]
}
