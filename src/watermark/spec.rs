//! Watermark specification value types.
//!
//! A [`WatermarkSpec`] plus a [`Placement`] fully describe one watermark
//! application. Both are immutable per-call values constructed fresh by the
//! caller (the UI keeps its own mutable state; the core never sees it),
//! which keeps every render call independently testable and trivially
//! parallelizable.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::WatermarkError;

/// The nine named placement presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionPreset {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    Center,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl PositionPreset {
    /// The preset's settings-document name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "top_left",
            Self::TopCenter => "top_center",
            Self::TopRight => "top_right",
            Self::MiddleLeft => "middle_left",
            Self::Center => "center",
            Self::MiddleRight => "middle_right",
            Self::BottomLeft => "bottom_left",
            Self::BottomCenter => "bottom_center",
            Self::BottomRight => "bottom_right",
        }
    }

    /// All nine presets, row by row.
    pub fn all() -> [PositionPreset; 9] {
        [
            Self::TopLeft,
            Self::TopCenter,
            Self::TopRight,
            Self::MiddleLeft,
            Self::Center,
            Self::MiddleRight,
            Self::BottomLeft,
            Self::BottomCenter,
            Self::BottomRight,
        ]
    }
}

impl FromStr for PositionPreset {
    type Err = WatermarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top_left" => Ok(Self::TopLeft),
            "top_center" => Ok(Self::TopCenter),
            "top_right" => Ok(Self::TopRight),
            "middle_left" => Ok(Self::MiddleLeft),
            "center" => Ok(Self::Center),
            "middle_right" => Ok(Self::MiddleRight),
            "bottom_left" => Ok(Self::BottomLeft),
            "bottom_center" => Ok(Self::BottomCenter),
            "bottom_right" => Ok(Self::BottomRight),
            _ => Err(WatermarkError::ConfigError(format!(
                "unknown position preset '{}'",
                s
            ))),
        }
    }
}

/// Where the watermark goes on the base image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// One of the nine named grid positions.
    Preset(PositionPreset),
    /// Explicit top-left offset in base-image pixel coordinates, e.g. from
    /// drag-to-position. Not clamped; off-canvas placements clip.
    Custom { x: i32, y: i32 },
}

impl Default for Placement {
    fn default() -> Self {
        Placement::Preset(PositionPreset::Center)
    }
}

/// A text watermark description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextWatermark {
    /// Text to render. Empty after trimming makes the watermark a no-op.
    pub content: String,
    /// Requested font family; resolution falls back if unavailable.
    pub font_family: String,
    /// Font size in points (rendered as pixel height). Must be positive.
    pub font_size: u32,
    /// Text color as a 6-hex-digit string, leading '#' optional.
    pub color_hex: String,
    /// Opacity percentage, 0-100. Out-of-range values clamp.
    pub opacity_percent: u8,
    /// Rotation in degrees, -180 to 180. 0 means no rotation.
    pub rotation_degrees: i32,
}

impl Default for TextWatermark {
    fn default() -> Self {
        Self {
            content: String::new(),
            font_family: "Arial".to_string(),
            font_size: 36,
            color_hex: "#FFFFFF".to_string(),
            opacity_percent: 50,
            rotation_degrees: 0,
        }
    }
}

/// An image watermark description.
///
/// The source raster is loaded by the caller (or the
/// [`load_watermark_source`](super::image_renderer::load_watermark_source)
/// helper); `None` means the source was missing or unreadable and the
/// watermark is skipped.
#[derive(Clone)]
pub struct ImageWatermark {
    /// Decoded watermark source, if it could be loaded.
    pub source: Option<DynamicImage>,
    /// Scale percentage applied to the source, typically 10-500.
    pub scale_percent: u32,
    /// Opacity percentage, 0-100, multiplied into the source alpha.
    pub opacity_percent: u8,
    /// Rotation in degrees, -180 to 180.
    pub rotation_degrees: i32,
}

impl Default for ImageWatermark {
    fn default() -> Self {
        Self {
            source: None,
            scale_percent: 100,
            opacity_percent: 50,
            rotation_degrees: 0,
        }
    }
}

impl std::fmt::Debug for ImageWatermark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageWatermark")
            .field(
                "source",
                &self.source.as_ref().map(|s| (s.width(), s.height())),
            )
            .field("scale_percent", &self.scale_percent)
            .field("opacity_percent", &self.opacity_percent)
            .field("rotation_degrees", &self.rotation_degrees)
            .finish()
    }
}

/// A watermark description: rendered text or a supplied image.
#[derive(Debug, Clone)]
pub enum WatermarkSpec {
    Text(TextWatermark),
    Image(ImageWatermark),
}
