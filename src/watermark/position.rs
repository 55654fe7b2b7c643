//! Position calculation for watermark placement.
//!
//! Maps a named preset or an explicit offset to the top-left coordinate at
//! which a rendered watermark layer is composited.
//!
//! # Position Modes
//!
//! - **9-grid presets**: corners, edge midpoints, and center, inset by a
//!   fixed 10-pixel margin on margin-adjacent axes.
//! - **Custom**: an explicit `(x, y)` offset, returned verbatim. No
//!   clamping is applied; a watermark placed partially or fully off-canvas
//!   is clipped at composite time.
//!
//! # Example
//!
//! ```
//! use suiyin::watermark::position::resolve_position;
//! use suiyin::watermark::{Placement, PositionPreset};
//!
//! let pos = resolve_position(&Placement::Preset(PositionPreset::BottomRight), (800, 600), (100, 50));
//! assert_eq!(pos, (690, 540)); // 800 - 100 - 10, 600 - 50 - 10
//! ```

use super::spec::{Placement, PositionPreset};

/// Margin from the image edge for the preset positions, in pixels.
pub const PRESET_MARGIN: i32 = 10;

/// Resolve a placement to the top-left coordinate for the watermark layer.
///
/// Centered axes use floor division, which leaves a 1-pixel asymmetry for
/// odd differences; exports depend on that rounding staying put.
///
/// Coordinates may be negative or exceed the container when the content is
/// larger than the container or the offset says so; the compositor clips.
pub fn resolve_position(
    placement: &Placement,
    container: (u32, u32),
    content: (u32, u32),
) -> (i32, i32) {
    let preset = match placement {
        Placement::Custom { x, y } => return (*x, *y),
        Placement::Preset(preset) => preset,
    };

    let (img_w, img_h) = (container.0 as i32, container.1 as i32);
    let (wm_w, wm_h) = (content.0 as i32, content.1 as i32);
    let m = PRESET_MARGIN;

    let center_x = (img_w - wm_w).div_euclid(2);
    let center_y = (img_h - wm_h).div_euclid(2);

    match preset {
        // Top row
        PositionPreset::TopLeft => (m, m),
        PositionPreset::TopCenter => (center_x, m),
        PositionPreset::TopRight => (img_w - wm_w - m, m),

        // Middle row
        PositionPreset::MiddleLeft => (m, center_y),
        PositionPreset::Center => (center_x, center_y),
        PositionPreset::MiddleRight => (img_w - wm_w - m, center_y),

        // Bottom row
        PositionPreset::BottomLeft => (m, img_h - wm_h - m),
        PositionPreset::BottomCenter => (center_x, img_h - wm_h - m),
        PositionPreset::BottomRight => (img_w - wm_w - m, img_h - wm_h - m),
    }
}
