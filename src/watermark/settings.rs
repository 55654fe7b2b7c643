//! Flat settings/template document mapping.
//!
//! The UI layer persists watermark and export settings as a flat JSON
//! document (the same document backs saved templates). The core does not
//! own schema versioning or file IO for these documents; it only maps the
//! field values onto [`WatermarkSpec`], [`Placement`], and the output
//! format, with defensive clamping downstream.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::image_renderer::load_watermark_source;
use super::spec::{ImageWatermark, Placement, PositionPreset, TextWatermark, WatermarkSpec};
use super::{color, WatermarkError};
use crate::encoder::OutputFormat;

// Defaults mirror the tool's initial state
fn default_text() -> String {
    "Sample Watermark".to_string()
}

fn default_font_family() -> String {
    "Arial".to_string()
}

fn default_font_size() -> u32 {
    36
}

fn default_color() -> String {
    "#FFFFFF".to_string()
}

fn default_opacity() -> u8 {
    50
}

fn default_position() -> String {
    "center".to_string()
}

fn default_type() -> String {
    "text".to_string()
}

fn default_scale() -> u32 {
    100
}

fn default_output_format() -> String {
    "PNG".to_string()
}

fn default_jpeg_quality() -> u8 {
    95
}

fn default_suffix() -> String {
    "_watermarked".to_string()
}

/// The persisted watermark/export settings document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    #[serde(default = "default_text")]
    pub watermark_text: String,

    #[serde(default = "default_font_family")]
    pub watermark_font_family: String,

    #[serde(default = "default_font_size")]
    pub watermark_font_size: u32,

    /// 6-hex-digit color string, e.g. "#FFFFFF".
    #[serde(default = "default_color")]
    pub watermark_color: String,

    /// Opacity percentage, 0-100.
    #[serde(default = "default_opacity")]
    pub watermark_opacity: u8,

    /// Rotation in degrees, -180 to 180.
    #[serde(default)]
    pub watermark_rotation: i32,

    /// One of the nine preset names, or "custom".
    #[serde(default = "default_position")]
    pub watermark_position: String,

    /// Explicit offset used when position is "custom".
    #[serde(default)]
    pub watermark_x: i32,
    #[serde(default)]
    pub watermark_y: i32,

    /// "text" or "image".
    #[serde(default = "default_type")]
    pub watermark_type: String,

    #[serde(default)]
    pub watermark_image_path: String,

    /// Image watermark scale percentage, 10-500.
    #[serde(default = "default_scale")]
    pub watermark_scale: u32,

    /// "PNG" or "JPEG".
    #[serde(default = "default_output_format")]
    pub output_format: String,

    /// JPEG encoder quality, 1-100.
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    #[serde(default)]
    pub filename_prefix: String,

    #[serde(default = "default_suffix")]
    pub filename_suffix: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            watermark_text: default_text(),
            watermark_font_family: default_font_family(),
            watermark_font_size: default_font_size(),
            watermark_color: default_color(),
            watermark_opacity: default_opacity(),
            watermark_rotation: 0,
            watermark_position: default_position(),
            watermark_x: 0,
            watermark_y: 0,
            watermark_type: default_type(),
            watermark_image_path: String::new(),
            watermark_scale: default_scale(),
            output_format: default_output_format(),
            jpeg_quality: default_jpeg_quality(),
            filename_prefix: String::new(),
            filename_suffix: default_suffix(),
        }
    }
}

impl ExportSettings {
    /// Parse a settings document from its JSON text.
    pub fn from_json(text: &str) -> Result<Self, WatermarkError> {
        serde_json::from_str(text).map_err(|e| WatermarkError::ConfigError(e.to_string()))
    }

    /// Validate field values that conversion cannot clamp away.
    pub fn validate(&self) -> Result<(), WatermarkError> {
        color::parse_hex_color(&self.watermark_color)?;

        if self.watermark_font_size == 0 {
            return Err(WatermarkError::ConfigError(
                "watermark_font_size must be positive".to_string(),
            ));
        }

        if self.watermark_scale == 0 {
            return Err(WatermarkError::ConfigError(
                "watermark_scale must be positive".to_string(),
            ));
        }

        if !(-180..=180).contains(&self.watermark_rotation) {
            return Err(WatermarkError::ConfigError(format!(
                "watermark_rotation must be within -180..180, got {}",
                self.watermark_rotation
            )));
        }

        match self.watermark_type.as_str() {
            "text" | "image" => {}
            other => {
                return Err(WatermarkError::ConfigError(format!(
                    "watermark_type must be 'text' or 'image', got '{}'",
                    other
                )))
            }
        }

        self.placement()?;
        self.output_format()?;

        Ok(())
    }

    /// The placement described by the document.
    pub fn placement(&self) -> Result<Placement, WatermarkError> {
        if self.watermark_position == "custom" {
            return Ok(Placement::Custom {
                x: self.watermark_x,
                y: self.watermark_y,
            });
        }

        let preset: PositionPreset = self.watermark_position.parse()?;
        Ok(Placement::Preset(preset))
    }

    /// The watermark spec described by the document.
    ///
    /// For image watermarks this loads the source file; a missing or
    /// unreadable file yields a spec with no source, which renders as a
    /// no-op.
    pub fn watermark_spec(&self) -> WatermarkSpec {
        match self.watermark_type.as_str() {
            "image" => {
                let source = if self.watermark_image_path.is_empty() {
                    None
                } else {
                    load_watermark_source(Path::new(&self.watermark_image_path))
                };

                WatermarkSpec::Image(ImageWatermark {
                    source,
                    scale_percent: self.watermark_scale,
                    opacity_percent: self.watermark_opacity,
                    rotation_degrees: self.watermark_rotation,
                })
            }
            _ => WatermarkSpec::Text(TextWatermark {
                content: self.watermark_text.clone(),
                font_family: self.watermark_font_family.clone(),
                font_size: self.watermark_font_size,
                color_hex: self.watermark_color.clone(),
                opacity_percent: self.watermark_opacity,
                rotation_degrees: self.watermark_rotation,
            }),
        }
    }

    /// The output format described by the document.
    pub fn output_format(&self) -> Result<OutputFormat, WatermarkError> {
        self.output_format.parse()
    }
}
