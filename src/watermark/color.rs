//! Color and opacity handling for watermarks.
//!
//! Watermark colors arrive as 6-digit hex strings (the color picker always
//! produces `#RRGGBB`) and opacity as a 0-100 percentage from a slider.
//! Out-of-range opacity values are clamped rather than rejected.

use super::WatermarkError;
use image::Rgba;

/// Parse a 6-hex-digit color string into RGB components.
///
/// A single leading `#` is optional. Anything that is not exactly six
/// ASCII hex digits after stripping it is an error.
///
/// # Examples
///
/// ```
/// use suiyin::watermark::color::parse_hex_color;
///
/// assert_eq!(parse_hex_color("#FF8000").unwrap(), [255, 128, 0]);
/// assert_eq!(parse_hex_color("ff8000").unwrap(), [255, 128, 0]);
/// assert!(parse_hex_color("#FFF").is_err());
/// ```
pub fn parse_hex_color(hex: &str) -> Result<[u8; 3], WatermarkError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);

    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(WatermarkError::InvalidColor(format!(
            "expected 6 hex digits, got '{}'",
            hex
        )));
    }

    let r = u8::from_str_radix(&digits[0..2], 16)
        .map_err(|_| WatermarkError::InvalidColor(hex.to_string()))?;
    let g = u8::from_str_radix(&digits[2..4], 16)
        .map_err(|_| WatermarkError::InvalidColor(hex.to_string()))?;
    let b = u8::from_str_radix(&digits[4..6], 16)
        .map_err(|_| WatermarkError::InvalidColor(hex.to_string()))?;

    Ok([r, g, b])
}

/// Convert an opacity percentage to an 8-bit alpha value.
///
/// Values outside 0-100 are clamped, mirroring the slider the value
/// originates from.
pub fn opacity_to_alpha(opacity_percent: u8) -> u8 {
    let pct = opacity_percent.min(100);
    (255.0 * pct as f32 / 100.0).round() as u8
}

/// Combine a hex color and an opacity percentage into a ready-to-draw RGBA.
pub fn color_with_opacity(hex: &str, opacity_percent: u8) -> Result<Rgba<u8>, WatermarkError> {
    let [r, g, b] = parse_hex_color(hex)?;
    Ok(Rgba([r, g, b, opacity_to_alpha(opacity_percent)]))
}
