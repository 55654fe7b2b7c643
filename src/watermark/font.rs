//! Font resolution for text watermarks.
//!
//! Resolving a font can fail in the field (missing family, fontless
//! container images), so the chain is explicit and total:
//!
//! 1. the requested family, looked up through the system font source
//! 2. a fixed fallback family
//! 3. a built-in 5x7 bitmap font compiled into the crate
//!
//! Step 3 cannot fail, which makes font loading a recoverable detail of
//! rendering rather than an error the caller ever sees.

use ab_glyph::FontArc;
use font_kit::family_name::FamilyName;
use font_kit::properties::Properties;
use font_kit::source::SystemSource;
use tracing::{debug, warn};

use super::WatermarkError;

/// Family tried when the requested one cannot be loaded.
pub const FALLBACK_FAMILY: &str = "DejaVu Sans";

/// A font usable by the text renderer.
#[derive(Clone)]
pub enum ResolvedFont {
    /// A scalable outline font loaded from the system.
    Outline(FontArc),
    /// The built-in bitmap font, used when no system font loads.
    Bitmap(&'static BitmapFont),
}

impl std::fmt::Debug for ResolvedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Outline(_) => f.write_str("ResolvedFont::Outline"),
            Self::Bitmap(_) => f.write_str("ResolvedFont::Bitmap"),
        }
    }
}

/// Load a font by family name from the system.
pub fn load_system_font(family: &str) -> Result<FontArc, WatermarkError> {
    let source = SystemSource::new();
    let handle = source
        .select_best_match(&[FamilyName::Title(family.to_string())], &Properties::new())
        .map_err(|e| WatermarkError::FontUnavailable(format!("{}: {}", family, e)))?;

    let font = handle
        .load()
        .map_err(|e| WatermarkError::FontUnavailable(format!("{}: {}", family, e)))?;

    let data = font.copy_font_data().ok_or_else(|| {
        WatermarkError::FontUnavailable(format!("{}: font data not available", family))
    })?;

    FontArc::try_from_vec((*data).clone())
        .map_err(|e| WatermarkError::FontUnavailable(format!("{}: {}", family, e)))
}

/// Resolve a font for the requested family. Never fails.
pub fn resolve_font(family: &str) -> ResolvedFont {
    match load_system_font(family) {
        Ok(font) => return ResolvedFont::Outline(font),
        Err(e) => debug!(family, error = %e, "requested font family unavailable"),
    }

    match load_system_font(FALLBACK_FAMILY) {
        Ok(font) => {
            debug!(family, fallback = FALLBACK_FAMILY, "using fallback font family");
            return ResolvedFont::Outline(font);
        }
        Err(e) => warn!(
            family,
            fallback = FALLBACK_FAMILY,
            error = %e,
            "no system font available, using built-in bitmap font"
        ),
    }

    ResolvedFont::Bitmap(&BUILTIN_FONT)
}

/// A fixed-cell bitmap font: 5x7 glyphs for printable ASCII, column-major,
/// least significant bit at the top row.
pub struct BitmapFont {
    glyphs: [[u8; 5]; 95],
}

/// Cell geometry of the bitmap font.
pub const BITMAP_GLYPH_WIDTH: u32 = 5;
pub const BITMAP_GLYPH_HEIGHT: u32 = 7;
/// Horizontal advance per glyph (one column of spacing).
pub const BITMAP_ADVANCE: u32 = 6;
/// Nominal line height the scale factor is derived from.
pub const BITMAP_LINE_HEIGHT: u32 = 8;

impl BitmapFont {
    /// Column bits for a character, or `None` outside printable ASCII.
    pub fn glyph(&self, c: char) -> Option<&[u8; 5]> {
        let code = c as u32;
        if (0x20..0x7F).contains(&code) {
            Some(&self.glyphs[(code - 0x20) as usize])
        } else {
            None
        }
    }

    /// Integer magnification approximating the requested pixel size.
    pub fn scale_for(&self, font_size: f32) -> u32 {
        ((font_size / BITMAP_LINE_HEIGHT as f32).round() as u32).max(1)
    }

    /// Measure a string at the given magnification: (width, height).
    pub fn measure(&self, text: &str, scale: u32) -> (u32, u32) {
        let chars = text.chars().count() as u32;
        if chars == 0 {
            return (0, 0);
        }
        // Drop the trailing inter-glyph spacing column
        let width = (chars * BITMAP_ADVANCE - 1) * scale;
        (width, BITMAP_GLYPH_HEIGHT * scale)
    }
}

/// Classic 5x7 column-encoded glyph set for ASCII 0x20-0x7E.
pub static BUILTIN_FONT: BitmapFont = BitmapFont {
    glyphs: [
        [0x00, 0x00, 0x00, 0x00, 0x00], // ' '
        [0x00, 0x00, 0x5F, 0x00, 0x00], // '!'
        [0x00, 0x07, 0x00, 0x07, 0x00], // '"'
        [0x14, 0x7F, 0x14, 0x7F, 0x14], // '#'
        [0x24, 0x2A, 0x7F, 0x2A, 0x12], // '$'
        [0x23, 0x13, 0x08, 0x64, 0x62], // '%'
        [0x36, 0x49, 0x55, 0x22, 0x50], // '&'
        [0x00, 0x05, 0x03, 0x00, 0x00], // '\''
        [0x00, 0x1C, 0x22, 0x41, 0x00], // '('
        [0x00, 0x41, 0x22, 0x1C, 0x00], // ')'
        [0x14, 0x08, 0x3E, 0x08, 0x14], // '*'
        [0x08, 0x08, 0x3E, 0x08, 0x08], // '+'
        [0x00, 0x50, 0x30, 0x00, 0x00], // ','
        [0x08, 0x08, 0x08, 0x08, 0x08], // '-'
        [0x00, 0x60, 0x60, 0x00, 0x00], // '.'
        [0x20, 0x10, 0x08, 0x04, 0x02], // '/'
        [0x3E, 0x51, 0x49, 0x45, 0x3E], // '0'
        [0x00, 0x42, 0x7F, 0x40, 0x00], // '1'
        [0x42, 0x61, 0x51, 0x49, 0x46], // '2'
        [0x21, 0x41, 0x45, 0x4B, 0x31], // '3'
        [0x18, 0x14, 0x12, 0x7F, 0x10], // '4'
        [0x27, 0x45, 0x45, 0x45, 0x39], // '5'
        [0x3C, 0x4A, 0x49, 0x49, 0x30], // '6'
        [0x01, 0x71, 0x09, 0x05, 0x03], // '7'
        [0x36, 0x49, 0x49, 0x49, 0x36], // '8'
        [0x06, 0x49, 0x49, 0x29, 0x1E], // '9'
        [0x00, 0x36, 0x36, 0x00, 0x00], // ':'
        [0x00, 0x56, 0x36, 0x00, 0x00], // ';'
        [0x08, 0x14, 0x22, 0x41, 0x00], // '<'
        [0x14, 0x14, 0x14, 0x14, 0x14], // '='
        [0x00, 0x41, 0x22, 0x14, 0x08], // '>'
        [0x02, 0x01, 0x51, 0x09, 0x06], // '?'
        [0x32, 0x49, 0x79, 0x41, 0x3E], // '@'
        [0x7E, 0x11, 0x11, 0x11, 0x7E], // 'A'
        [0x7F, 0x49, 0x49, 0x49, 0x36], // 'B'
        [0x3E, 0x41, 0x41, 0x41, 0x22], // 'C'
        [0x7F, 0x41, 0x41, 0x22, 0x1C], // 'D'
        [0x7F, 0x49, 0x49, 0x49, 0x41], // 'E'
        [0x7F, 0x09, 0x09, 0x09, 0x01], // 'F'
        [0x3E, 0x41, 0x49, 0x49, 0x7A], // 'G'
        [0x7F, 0x08, 0x08, 0x08, 0x7F], // 'H'
        [0x00, 0x41, 0x7F, 0x41, 0x00], // 'I'
        [0x20, 0x40, 0x41, 0x3F, 0x01], // 'J'
        [0x7F, 0x08, 0x14, 0x22, 0x41], // 'K'
        [0x7F, 0x40, 0x40, 0x40, 0x40], // 'L'
        [0x7F, 0x02, 0x0C, 0x02, 0x7F], // 'M'
        [0x7F, 0x04, 0x08, 0x10, 0x7F], // 'N'
        [0x3E, 0x41, 0x41, 0x41, 0x3E], // 'O'
        [0x7F, 0x09, 0x09, 0x09, 0x06], // 'P'
        [0x3E, 0x41, 0x51, 0x21, 0x5E], // 'Q'
        [0x7F, 0x09, 0x19, 0x29, 0x46], // 'R'
        [0x46, 0x49, 0x49, 0x49, 0x31], // 'S'
        [0x01, 0x01, 0x7F, 0x01, 0x01], // 'T'
        [0x3F, 0x40, 0x40, 0x40, 0x3F], // 'U'
        [0x1F, 0x20, 0x40, 0x20, 0x1F], // 'V'
        [0x3F, 0x40, 0x38, 0x40, 0x3F], // 'W'
        [0x63, 0x14, 0x08, 0x14, 0x63], // 'X'
        [0x07, 0x08, 0x70, 0x08, 0x07], // 'Y'
        [0x61, 0x51, 0x49, 0x45, 0x43], // 'Z'
        [0x00, 0x7F, 0x41, 0x41, 0x00], // '['
        [0x02, 0x04, 0x08, 0x10, 0x20], // '\\'
        [0x00, 0x41, 0x41, 0x7F, 0x00], // ']'
        [0x04, 0x02, 0x01, 0x02, 0x04], // '^'
        [0x40, 0x40, 0x40, 0x40, 0x40], // '_'
        [0x00, 0x01, 0x02, 0x04, 0x00], // '`'
        [0x20, 0x54, 0x54, 0x54, 0x78], // 'a'
        [0x7F, 0x48, 0x44, 0x44, 0x38], // 'b'
        [0x38, 0x44, 0x44, 0x44, 0x20], // 'c'
        [0x38, 0x44, 0x44, 0x48, 0x7F], // 'd'
        [0x38, 0x54, 0x54, 0x54, 0x18], // 'e'
        [0x08, 0x7E, 0x09, 0x01, 0x02], // 'f'
        [0x0C, 0x52, 0x52, 0x52, 0x3E], // 'g'
        [0x7F, 0x08, 0x04, 0x04, 0x78], // 'h'
        [0x00, 0x44, 0x7D, 0x40, 0x00], // 'i'
        [0x20, 0x40, 0x44, 0x3D, 0x00], // 'j'
        [0x7F, 0x10, 0x28, 0x44, 0x00], // 'k'
        [0x00, 0x41, 0x7F, 0x40, 0x00], // 'l'
        [0x7C, 0x04, 0x18, 0x04, 0x78], // 'm'
        [0x7C, 0x08, 0x04, 0x04, 0x78], // 'n'
        [0x38, 0x44, 0x44, 0x44, 0x38], // 'o'
        [0x7C, 0x14, 0x14, 0x14, 0x08], // 'p'
        [0x08, 0x14, 0x14, 0x18, 0x7C], // 'q'
        [0x7C, 0x08, 0x04, 0x04, 0x08], // 'r'
        [0x48, 0x54, 0x54, 0x54, 0x20], // 's'
        [0x04, 0x3F, 0x44, 0x40, 0x20], // 't'
        [0x3C, 0x40, 0x40, 0x20, 0x7C], // 'u'
        [0x1C, 0x20, 0x40, 0x20, 0x1C], // 'v'
        [0x3C, 0x40, 0x30, 0x40, 0x3C], // 'w'
        [0x44, 0x28, 0x10, 0x28, 0x44], // 'x'
        [0x0C, 0x50, 0x50, 0x50, 0x3C], // 'y'
        [0x44, 0x64, 0x54, 0x4C, 0x44], // 'z'
        [0x00, 0x08, 0x36, 0x41, 0x00], // '{'
        [0x00, 0x00, 0x7F, 0x00, 0x00], // '|'
        [0x00, 0x41, 0x36, 0x08, 0x00], // '}'
        [0x10, 0x08, 0x08, 0x10, 0x08], // '~'
    ],
};
