//! Highlighter configuration
//!
//! TOML for the native tools, JSON from the browser. Every field has a
//! default so an empty document is a valid configuration.

use crate::error::HighlightError;
use crate::types::HighlightColor;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HighlighterConfig {
    #[serde(default)]
    pub zoom: ZoomConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub palette: Palette,
    #[serde(default)]
    pub dom: DomConfig,
}

impl HighlighterConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed,
    /// or the values fail [`HighlighterConfig::validate`].
    ///
    /// # Example
    ///
    /// ```no_run
    /// use highlight_core::config::HighlighterConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = HighlighterConfig::from_file("highlighter.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Example
    ///
    /// ```
    /// use highlight_core::config::HighlighterConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let toml = r#"
    ///     [zoom]
    ///     max = 4.0
    ///
    ///     [highlight]
    ///     opacity = 0.3
    /// "#;
    /// let config = HighlighterConfig::from_toml_str(toml)?;
    /// assert_eq!(config.zoom.max, 4.0);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from JSON (the browser passes settings this way)
    pub fn from_json(s: &str) -> Result<Self, HighlightError> {
        let config: Self = serde_json::from_str(s)
            .map_err(|e| HighlightError::ConfigError(format!("Invalid JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), HighlightError> {
        self.zoom.validate()?;

        let opacity = self.highlight.opacity;
        if !(0.0..=1.0).contains(&opacity) {
            return Err(HighlightError::ConfigError(format!(
                "opacity {} must be within 0.0..=1.0",
                opacity
            )));
        }

        for color in HighlightColor::ALL {
            Rgb::from_hex(self.palette.hex(color)).map_err(|e| {
                HighlightError::ConfigError(format!("palette.{}: {}", color, e))
            })?;
        }

        if !self.dom.page_selector.contains("{page}") {
            return Err(HighlightError::ConfigError(
                "dom.page_selector must contain a {page} placeholder".to_string(),
            ));
        }

        Ok(())
    }

    /// Palette color of a highlight as RGB
    pub fn rgb(&self, color: HighlightColor) -> Rgb {
        // validate() has already checked every palette entry
        Rgb::from_hex(self.palette.hex(color)).unwrap_or(Rgb::BLACK)
    }
}

/// Zoom bounds and step for the viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoomConfig {
    #[serde(default = "default_zoom_min")]
    pub min: f64,
    #[serde(default = "default_zoom_max")]
    pub max: f64,
    #[serde(default = "default_zoom_step")]
    pub step: f64,
    #[serde(default = "default_zoom_initial")]
    pub initial: f64,
}

impl ZoomConfig {
    fn validate(&self) -> Result<(), HighlightError> {
        let finite = [self.min, self.max, self.step, self.initial]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.min <= 0.0 || self.min >= self.max {
            return Err(HighlightError::ConfigError(format!(
                "zoom range {}..{} is invalid",
                self.min, self.max
            )));
        }
        if self.step <= 0.0 {
            return Err(HighlightError::ConfigError(format!(
                "zoom step {} must be positive",
                self.step
            )));
        }
        if self.initial < self.min || self.initial > self.max {
            return Err(HighlightError::ConfigError(format!(
                "initial zoom {} is outside {}..{}",
                self.initial, self.min, self.max
            )));
        }
        Ok(())
    }
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: default_zoom_min(),
            max: default_zoom_max(),
            step: default_zoom_step(),
            initial: default_zoom_initial(),
        }
    }
}

fn default_zoom_min() -> f64 {
    0.5
}

fn default_zoom_max() -> f64 {
    3.0
}

fn default_zoom_step() -> f64 {
    0.1
}

fn default_zoom_initial() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightConfig {
    /// Color selected when a session starts
    #[serde(default)]
    pub default_color: HighlightColor,
    /// Fill opacity for overlays and exported annotations
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Written to the `/T` entry of exported annotations
    #[serde(default = "default_author")]
    pub author: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            default_color: HighlightColor::default(),
            opacity: default_opacity(),
            author: default_author(),
        }
    }
}

fn default_opacity() -> f64 {
    0.4
}

fn default_author() -> String {
    "PDF Highlighter".to_string()
}

/// Hex colors for each palette entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    #[serde(default = "default_yellow")]
    pub yellow: String,
    #[serde(default = "default_blue")]
    pub blue: String,
    #[serde(default = "default_green")]
    pub green: String,
    #[serde(default = "default_pink")]
    pub pink: String,
}

impl Palette {
    pub fn hex(&self, color: HighlightColor) -> &str {
        match color {
            HighlightColor::Yellow => &self.yellow,
            HighlightColor::Blue => &self.blue,
            HighlightColor::Green => &self.green,
            HighlightColor::Pink => &self.pink,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            yellow: default_yellow(),
            blue: default_blue(),
            green: default_green(),
            pink: default_pink(),
        }
    }
}

fn default_yellow() -> String {
    "#FFEB3B".to_string()
}

fn default_blue() -> String {
    "#64B5F6".to_string()
}

fn default_green() -> String {
    "#81C784".to_string()
}

fn default_pink() -> String {
    "#F48FB1".to_string()
}

/// Selectors used to locate pages and text layers in the host page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomConfig {
    /// Page container selector; `{page}` is replaced by the page number
    #[serde(default = "default_page_selector")]
    pub page_selector: String,
    /// Text layer selector, relative to the page container
    #[serde(default = "default_text_layer_selector")]
    pub text_layer_selector: String,
    /// Class given to the overlay container appended to each page
    #[serde(default = "default_overlay_class")]
    pub overlay_class: String,
}

impl DomConfig {
    pub fn page_selector_for(&self, page_number: u32) -> String {
        self.page_selector
            .replace("{page}", &page_number.to_string())
    }

    pub fn text_layer_selector_for(&self, page_number: u32) -> String {
        format!(
            "{} {}",
            self.page_selector_for(page_number),
            self.text_layer_selector
        )
    }
}

impl Default for DomConfig {
    fn default() -> Self {
        Self {
            page_selector: default_page_selector(),
            text_layer_selector: default_text_layer_selector(),
            overlay_class: default_overlay_class(),
        }
    }
}

fn default_page_selector() -> String {
    ".page[data-page-number=\"{page}\"]".to_string()
}

fn default_text_layer_selector() -> String {
    ".textLayer".to_string()
}

fn default_overlay_class() -> String {
    "highlight-layer".to_string()
}

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    /// Parse `#RRGGBB` or `RRGGBB`
    pub fn from_hex(color: &str) -> Result<Self, String> {
        let hex = color.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("'{}' is not a #RRGGBB color", color));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|e| e.to_string())
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Components in the 0-1 range, as PDF color arrays expect
    pub fn to_unit(&self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }

    /// CSS `rgba()` fill with the given alpha
    pub fn to_css_rgba(&self, alpha: f64) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha)
    }
}
