//! Text highlighting for PDF documents
//!
//! This crate holds everything the highlighter needs that does not touch the
//! DOM: selection normalization, the highlight store, overlay projection and
//! export of highlights as PDF annotations using lopdf.
//!
//! Highlights are stored in unscaled page-local coordinates so they can be
//! re-rendered at any zoom level without re-measuring the page.

pub mod config;
pub mod coords;
pub mod document;
pub mod error;
pub mod export;
pub mod geometry;
pub mod normalize;
pub mod overlay;
pub mod store;
pub mod types;
pub mod viewer;

#[cfg(test)]
mod test_pdf;

pub use config::HighlighterConfig;
pub use document::{DocumentHandle, PdfDocument, PdfInfo};
pub use error::HighlightError;
pub use export::{export_file_name, export_highlights, ExportArtifact, ExportOptions};
pub use geometry::{ClientRect, SelectionGeometry, SelectionSnapshot, TextLayerGeometry};
pub use normalize::{normalize, HighlighterTool};
pub use overlay::OverlayRect;
pub use store::HighlightStore;
pub use types::{HighlightColor, HighlightPosition, HighlightRecord, LayerRect};
pub use viewer::{ExportTicket, Notification, NotificationLevel, ViewerState};

/// Parse PDF bytes and return page count
pub fn get_page_count(bytes: &[u8]) -> Result<u32, HighlightError> {
    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| HighlightError::ParseError(e.to_string()))?;
    Ok(doc.get_pages().len() as u32)
}
