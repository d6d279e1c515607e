//! Highlight data model
//!
//! Every rectangle stored here lives in the same space: page-local, top-left
//! origin, measured against the page's text layer at scale 1.0. Replaying a
//! record at any zoom level is then a plain multiplication.

use crate::error::HighlightError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tolerance used when comparing derived geometry.
pub const GEOMETRY_EPSILON: f64 = 1e-9;

/// The highlighter palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightColor {
    #[default]
    Yellow,
    Blue,
    Green,
    Pink,
}

impl HighlightColor {
    pub const ALL: [HighlightColor; 4] = [
        HighlightColor::Yellow,
        HighlightColor::Blue,
        HighlightColor::Green,
        HighlightColor::Pink,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HighlightColor::Yellow => "yellow",
            HighlightColor::Blue => "blue",
            HighlightColor::Green => "green",
            HighlightColor::Pink => "pink",
        }
    }
}

impl fmt::Display for HighlightColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HighlightColor {
    type Err = HighlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yellow" => Ok(HighlightColor::Yellow),
            "blue" => Ok(HighlightColor::Blue),
            "green" => Ok(HighlightColor::Green),
            "pink" => Ok(HighlightColor::Pink),
            _ => Err(HighlightError::InvalidColor(s.to_string())),
        }
    }
}

/// Rectangle in unscaled page-local coordinates.
///
/// `width` and `height` are always derived from the edges; use
/// [`LayerRect::from_edges`] rather than building one by hand.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LayerRect {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub width: f64,
    pub height: f64,
}

impl LayerRect {
    pub fn from_edges(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            width: x2 - x1,
            height: y2 - y1,
        }
    }

    /// Coordinate-wise min/max envelope. `None` for an empty input.
    pub fn envelope<'a, I>(rects: I) -> Option<LayerRect>
    where
        I: IntoIterator<Item = &'a LayerRect>,
    {
        let mut iter = rects.into_iter();
        let first = iter.next()?;
        let (mut x1, mut y1, mut x2, mut y2) = (first.x1, first.y1, first.x2, first.y2);
        for rect in iter {
            x1 = x1.min(rect.x1);
            y1 = y1.min(rect.y1);
            x2 = x2.max(rect.x2);
            y2 = y2.max(rect.y2);
        }
        Some(LayerRect::from_edges(x1, y1, x2, y2))
    }

    pub fn is_finite(&self) -> bool {
        [self.x1, self.y1, self.x2, self.y2, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Edge-wise comparison within [`GEOMETRY_EPSILON`]
    pub fn approx_eq(&self, other: &LayerRect) -> bool {
        let pairs = [
            (self.x1, other.x1),
            (self.y1, other.y1),
            (self.x2, other.x2),
            (self.y2, other.y2),
            (self.width, other.width),
            (self.height, other.height),
        ];
        pairs
            .iter()
            .all(|(a, b)| (a - b).abs() <= GEOMETRY_EPSILON * a.abs().max(b.abs()).max(1.0))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightPosition {
    pub bounding_rect: LayerRect,
    pub rects: Vec<LayerRect>,
    pub page_width: f64,
    pub page_height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightRecord {
    pub id: String,
    /// 1-based page number
    pub page_number: u32,
    pub position: HighlightPosition,
    pub color: HighlightColor,
    pub content: String,
    /// Unix epoch milliseconds
    pub created_at: i64,
}

impl HighlightRecord {
    /// Check the record's structural invariants.
    pub fn validate(&self) -> Result<(), HighlightError> {
        if self.id.is_empty() {
            return Err(HighlightError::InvalidRecord("empty id".to_string()));
        }
        if self.page_number == 0 {
            return Err(HighlightError::InvalidRecord(format!(
                "{}: page numbers start at 1",
                self.id
            )));
        }

        let position = &self.position;
        if !(position.page_width.is_finite() && position.page_width > 0.0)
            || !(position.page_height.is_finite() && position.page_height > 0.0)
        {
            return Err(HighlightError::InvalidRecord(format!(
                "{}: page size {}x{} is not positive",
                self.id, position.page_width, position.page_height
            )));
        }

        if position.rects.iter().any(|r| !r.is_finite()) || !position.bounding_rect.is_finite() {
            return Err(HighlightError::InvalidRecord(format!(
                "{}: non-finite coordinates",
                self.id
            )));
        }

        let envelope = LayerRect::envelope(&position.rects).ok_or_else(|| {
            HighlightError::InvalidRecord(format!("{}: no fragment rectangles", self.id))
        })?;
        if !envelope.approx_eq(&position.bounding_rect) {
            return Err(HighlightError::InvalidRecord(format!(
                "{}: bounding rect does not envelope its fragments",
                self.id
            )));
        }

        Ok(())
    }
}

/// Generate a fresh highlight id
pub fn generate_highlight_id() -> String {
    format!("highlight-{}", uuid::Uuid::new_v4().simple())
}
