//! Watermark error types.
//!
//! Defines errors that can occur while rendering, compositing, or
//! exporting watermarked images.

use std::fmt;

/// Errors that can occur during watermark processing.
///
/// Font-load failures never appear here: the font fallback chain in
/// [`crate::watermark::font`] recovers them internally. An unavailable
/// watermark source image is surfaced by the loader helper only; the
/// render path treats it as "no watermark" and passes the base through.
#[derive(Debug)]
pub enum WatermarkError {
    /// Watermark color string is not a 6-digit hex color
    InvalidColor(String),

    /// A font could not be loaded (internal to the fallback chain)
    FontUnavailable(String),

    /// Watermark source image is missing or unreadable
    SourceUnavailable(String),

    /// Failed to render a watermark layer
    RenderError(String),

    /// Failed to decode a base image
    DecodeError(String),

    /// Failed to encode the output image
    EncodeError(String),

    /// Invalid settings document
    ConfigError(String),
}

impl fmt::Display for WatermarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidColor(msg) => write!(f, "Invalid watermark color: {}", msg),
            Self::FontUnavailable(msg) => write!(f, "Font unavailable: {}", msg),
            Self::SourceUnavailable(msg) => write!(f, "Watermark source unavailable: {}", msg),
            Self::RenderError(msg) => write!(f, "Failed to render watermark: {}", msg),
            Self::DecodeError(msg) => write!(f, "Failed to decode image: {}", msg),
            Self::EncodeError(msg) => write!(f, "Failed to encode image: {}", msg),
            Self::ConfigError(msg) => write!(f, "Watermark configuration error: {}", msg),
        }
    }
}

impl std::error::Error for WatermarkError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WatermarkError::InvalidColor("ZZZZZZ".to_string());
        assert_eq!(err.to_string(), "Invalid watermark color: ZZZZZZ");

        let err = WatermarkError::SourceUnavailable("logo.png".to_string());
        assert_eq!(err.to_string(), "Watermark source unavailable: logo.png");

        let err = WatermarkError::DecodeError("invalid PNG".to_string());
        assert_eq!(err.to_string(), "Failed to decode image: invalid PNG");

        let err = WatermarkError::EncodeError("jpeg: io error".to_string());
        assert_eq!(err.to_string(), "Failed to encode image: jpeg: io error");

        let err = WatermarkError::ConfigError("font size must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Watermark configuration error: font size must be positive"
        );
    }

    #[test]
    fn test_error_debug() {
        let err = WatermarkError::FontUnavailable("Arial".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("FontUnavailable"));
        assert!(debug_str.contains("Arial"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WatermarkError>();
    }
}
