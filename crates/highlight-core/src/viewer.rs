//! Viewer session state
//!
//! Owns everything the viewer controls drive: zoom, the highlighter tool,
//! the highlight store and the loaded document. Capture, overlay rendering
//! and export all go through here so the document generation can guard
//! exports against a document swap.

use crate::config::HighlighterConfig;
use crate::document::{DocumentHandle, PdfDocument};
use crate::error::HighlightError;
use crate::export::{export_highlights, ExportArtifact, ExportOptions};
use crate::geometry::SelectionGeometry;
use crate::normalize::{normalize, HighlighterTool};
use crate::overlay::{self, OverlayRect};
use crate::store::HighlightStore;
use crate::types::{HighlightColor, HighlightRecord};
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// User-facing message for a non-fatal failure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// Proof that an export was started against a particular document
#[derive(Debug, PartialEq, Eq)]
pub struct ExportTicket {
    generation: u64,
}

#[derive(Debug)]
pub struct ViewerState<D: DocumentHandle = PdfDocument> {
    config: HighlighterConfig,
    scale: f64,
    tool: HighlighterTool,
    store: HighlightStore,
    document: Option<D>,
    /// Bumped on every document load
    generation: u64,
    export_in_flight: bool,
}

impl<D: DocumentHandle> Default for ViewerState<D> {
    fn default() -> Self {
        Self::new(HighlighterConfig::default())
    }
}

impl<D: DocumentHandle> ViewerState<D> {
    pub fn new(config: HighlighterConfig) -> Self {
        Self {
            scale: config.zoom.initial,
            tool: HighlighterTool::new(false, config.highlight.default_color),
            store: HighlightStore::new(),
            document: None,
            generation: 0,
            export_in_flight: false,
            config,
        }
    }

    pub fn config(&self) -> &HighlighterConfig {
        &self.config
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn tool(&self) -> HighlighterTool {
        self.tool
    }

    pub fn store(&self) -> &HighlightStore {
        &self.store
    }

    pub fn document(&self) -> Option<&D> {
        self.document.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_exporting(&self) -> bool {
        self.export_in_flight
    }

    // ---- zoom ----

    /// Set the zoom factor, clamped to the configured range.
    ///
    /// Returns the scale actually applied. Non-finite input is ignored.
    pub fn set_scale(&mut self, scale: f64) -> f64 {
        if !scale.is_finite() {
            return self.scale;
        }
        let zoom = &self.config.zoom;
        self.scale = snap(scale.clamp(zoom.min, zoom.max));
        self.scale
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.set_scale(self.scale + self.config.zoom.step)
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.set_scale(self.scale - self.config.zoom.step)
    }

    // ---- highlighter tool ----

    pub fn toggle_highlighter(&mut self) -> bool {
        self.tool.active = !self.tool.active;
        self.tool.active
    }

    pub fn set_highlighter_active(&mut self, active: bool) {
        self.tool.active = active;
    }

    pub fn set_color(&mut self, color: HighlightColor) {
        self.tool.color = color;
    }

    // ---- document lifecycle ----

    /// Replace the current document. All highlights are discarded and any
    /// export still running against the old document becomes stale.
    pub fn on_document_loaded(&mut self, document: D) -> u32 {
        let page_count = document.page_count();
        let discarded = self.store.count();

        self.store.clear();
        self.generation += 1;
        self.export_in_flight = false;

        info!(
            name = document.name(),
            page_count,
            discarded,
            generation = self.generation,
            "document loaded"
        );
        self.document = Some(document);
        page_count
    }

    /// Report a failed load. The current document and highlights are kept.
    pub fn on_document_load_failed(&self, error: &HighlightError) -> Notification {
        warn!(error = %error, "document failed to load");
        Notification {
            level: NotificationLevel::Error,
            message: format!("Could not open PDF: {}", error),
        }
    }

    // ---- capture & render ----

    /// Turn the live selection on `page_number` into a stored highlight.
    ///
    /// The selection is cleared only when a highlight was recorded.
    pub fn capture<G>(&mut self, page_number: u32, geometry: &mut G) -> Option<&HighlightRecord>
    where
        G: SelectionGeometry + ?Sized,
    {
        if !self.tool.active {
            debug!(page_number, "capture skipped: highlighter inactive");
            return None;
        }
        if let Some(document) = &self.document {
            if page_number > document.page_count() {
                debug!(page_number, "capture skipped: page outside document");
                return None;
            }
        }

        let selection = geometry.selection()?;
        let layer = geometry.text_layer(page_number);
        let record = normalize(&selection, page_number, layer.as_ref(), self.scale, &self.tool)?;

        let id = record.id.clone();
        if let Err(e) = self.store.append(record) {
            warn!(error = %e, "captured highlight rejected");
            return None;
        }
        geometry.clear_selection();

        debug!(
            id = %id,
            page_number,
            count = self.store.count(),
            "highlight captured"
        );
        self.store.records().last()
    }

    /// Overlay rectangles for a page at the current zoom
    pub fn overlay(&self, page_number: u32) -> Vec<OverlayRect> {
        overlay::render(&self.store, page_number, self.scale)
    }

    pub fn clear_highlights(&mut self) {
        let cleared = self.store.count();
        self.store.clear();
        info!(cleared, "highlights cleared");
    }

    pub fn highlight_count(&self) -> usize {
        self.store.count()
    }

    pub fn can_clear(&self) -> bool {
        !self.store.is_empty()
    }

    // ---- export ----

    /// Start an export against the current document
    pub fn begin_export(&mut self) -> Result<ExportTicket, HighlightError> {
        if self.document.is_none() {
            return Err(HighlightError::NoDocument);
        }
        if self.export_in_flight {
            return Err(HighlightError::ExportInFlight);
        }
        self.export_in_flight = true;
        Ok(ExportTicket {
            generation: self.generation,
        })
    }

    /// Produce the annotated PDF for a running export
    pub fn export(
        &self,
        ticket: &ExportTicket,
        suggested_name: &str,
    ) -> Result<ExportArtifact, HighlightError> {
        if ticket.generation != self.generation {
            return Err(HighlightError::StaleDocument);
        }
        let document = self.document.as_ref().ok_or(HighlightError::NoDocument)?;
        let options = ExportOptions::from_config(&self.config);
        export_highlights(document, self.store.records(), suggested_name, &options)
    }

    /// Close an export. Fails with `StaleDocument` if another document was
    /// loaded after the export began.
    pub fn finish_export(&mut self, ticket: ExportTicket) -> Result<(), HighlightError> {
        if ticket.generation != self.generation {
            return Err(HighlightError::StaleDocument);
        }
        self.export_in_flight = false;
        Ok(())
    }

    /// Begin, run and finish an export in one step
    pub fn export_pdf(&mut self, suggested_name: &str) -> Result<ExportArtifact, HighlightError> {
        let ticket = self.begin_export()?;
        let result = self.export(&ticket, suggested_name);
        self.finish_export(ticket)?;
        result
    }
}

/// Round away float drift from repeated zoom steps
fn snap(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
