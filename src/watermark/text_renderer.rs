//! Text watermark rendering.
//!
//! Renders the watermark string into a transparent RGBA layer. Color and
//! opacity are applied once, at draw time, through the anti-aliasing
//! coverage of each glyph; there is no separate opacity pass afterwards.
//!
//! Rotated text is drawn into an intermediate canvas twice the measured
//! text box in each dimension (so no corner clips during rotation), then
//! rotated with bounding-box expansion. The layer records the unrotated
//! text box as its anchor box together with the recentering shift, so the
//! rotated text stays visually centered on the caller's target point.

use ab_glyph::{point, Font, FontArc, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};

use super::color::color_with_opacity;
use super::compositor::{blend_pixels, RenderedLayer};
use super::font::{resolve_font, BitmapFont, ResolvedFont, BITMAP_ADVANCE};
use super::rotate::rotate_layer;
use super::spec::TextWatermark;
use super::WatermarkError;

/// Padding added around the measured text box, in pixels.
const TEXT_PADDING: u32 = 2;

/// Render a text watermark into a transparent layer.
///
/// Returns `Ok(None)` when the content is empty after trimming: an empty
/// text watermark is a documented no-op, not an error. An invalid color
/// string is fatal for this render call.
pub fn render_text(spec: &TextWatermark) -> Result<Option<RenderedLayer>, WatermarkError> {
    let text = spec.content.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let color = color_with_opacity(&spec.color_hex, spec.opacity_percent)?;
    let font = resolve_font(&spec.font_family);
    let font_size = spec.font_size.max(1) as f32;

    let (text_w, text_h) = measure_text(&font, text, font_size);

    let layer = if spec.rotation_degrees == 0 {
        let mut canvas = RgbaImage::new(text_w.max(1), text_h.max(1));
        draw_text(&mut canvas, &font, text, font_size, (0, 0), color);
        RenderedLayer::from_image(canvas)
    } else {
        // Oversized intermediate canvas: the text sits centered so the
        // rotation cannot clip its corners.
        let mut canvas = RgbaImage::new((text_w * 2).max(1), (text_h * 2).max(1));
        draw_text(
            &mut canvas,
            &font,
            text,
            font_size,
            (text_w as i32 / 2, text_h as i32 / 2),
            color,
        );

        let rotated = rotate_layer(&canvas, spec.rotation_degrees as f32);

        // The caller anchors on the unrotated text box; shifting by half
        // the size delta keeps the rotated text centered on that anchor.
        // Signed arithmetic: a wide string rotated near 90 degrees can end
        // up narrower than its unrotated box.
        let shift_x = -((rotated.width() as i32 - text_w as i32).div_euclid(2));
        let shift_y = -((rotated.height() as i32 - text_h as i32).div_euclid(2));

        RenderedLayer {
            image: rotated,
            content_size: (text_w, text_h),
            anchor_shift: (shift_x, shift_y),
        }
    };

    Ok(Some(layer))
}

/// Measure the text box under the resolved font: (width, height) plus the
/// fixed padding.
pub fn measure_text(font: &ResolvedFont, text: &str, font_size: f32) -> (u32, u32) {
    let (width, height) = match font {
        ResolvedFont::Outline(outline) => measure_outline(outline, text, font_size),
        ResolvedFont::Bitmap(bitmap) => bitmap.measure(text, bitmap.scale_for(font_size)),
    };

    (width + TEXT_PADDING, height + TEXT_PADDING)
}

fn measure_outline(font: &FontArc, text: &str, font_size: f32) -> (u32, u32) {
    let scale = PxScale::from(font_size);
    let scaled_font = font.as_scaled(scale);

    let mut width = 0.0f32;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

    for c in text.chars() {
        let glyph_id = scaled_font.glyph_id(c);

        if let Some(prev) = prev_glyph {
            width += scaled_font.kern(prev, glyph_id);
        }

        width += scaled_font.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    (width.ceil() as u32, scaled_font.height().ceil() as u32)
}

/// Draw the string into `canvas` with its text box top-left at `offset`.
fn draw_text(
    canvas: &mut RgbaImage,
    font: &ResolvedFont,
    text: &str,
    font_size: f32,
    offset: (i32, i32),
    color: Rgba<u8>,
) {
    match font {
        ResolvedFont::Outline(outline) => {
            draw_outline_text(canvas, outline, text, font_size, offset, color)
        }
        ResolvedFont::Bitmap(bitmap) => {
            let scale = bitmap.scale_for(font_size);
            draw_bitmap_text(canvas, bitmap, text, scale, offset, color)
        }
    }
}

fn draw_outline_text(
    canvas: &mut RgbaImage,
    font: &FontArc,
    text: &str,
    font_size: f32,
    offset: (i32, i32),
    color: Rgba<u8>,
) {
    let scale = PxScale::from(font_size);
    let scaled_font = font.as_scaled(scale);

    let canvas_w = canvas.width() as i32;
    let canvas_h = canvas.height() as i32;

    let baseline_y = offset.1 as f32 + scaled_font.ascent();
    let mut cursor_x = offset.0 as f32;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

    for c in text.chars() {
        let glyph_id = scaled_font.glyph_id(c);

        if let Some(prev) = prev_glyph {
            cursor_x += scaled_font.kern(prev, glyph_id);
        }

        let glyph = glyph_id.with_scale_and_position(scale, point(cursor_x, baseline_y));

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();

            outlined.draw(|px, py, coverage| {
                let x = px as i32 + bounds.min.x as i32;
                let y = py as i32 + bounds.min.y as i32;

                if x >= 0 && y >= 0 && x < canvas_w && y < canvas_h {
                    let pixel_alpha = (coverage * color[3] as f32).round().min(255.0) as u8;
                    if pixel_alpha == 0 {
                        return;
                    }
                    let pixel = Rgba([color[0], color[1], color[2], pixel_alpha]);

                    // Glyphs can overlap at tight kerning; blend instead of
                    // overwriting so anti-aliased edges accumulate.
                    let existing = canvas.get_pixel(x as u32, y as u32);
                    let blended = blend_pixels(*existing, pixel);
                    canvas.put_pixel(x as u32, y as u32, blended);
                }
            });
        }

        cursor_x += scaled_font.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }
}

fn draw_bitmap_text(
    canvas: &mut RgbaImage,
    font: &BitmapFont,
    text: &str,
    scale: u32,
    offset: (i32, i32),
    color: Rgba<u8>,
) {
    let canvas_w = canvas.width() as i32;
    let canvas_h = canvas.height() as i32;
    let mut cursor_x = offset.0;

    for c in text.chars() {
        if let Some(columns) = font.glyph(c) {
            for (col, bits) in columns.iter().enumerate() {
                for row in 0..7u32 {
                    if bits & (1 << row) == 0 {
                        continue;
                    }

                    let block_x = cursor_x + (col as u32 * scale) as i32;
                    let block_y = offset.1 + (row * scale) as i32;

                    for dy in 0..scale as i32 {
                        for dx in 0..scale as i32 {
                            let x = block_x + dx;
                            let y = block_y + dy;
                            if x >= 0 && y >= 0 && x < canvas_w && y < canvas_h {
                                canvas.put_pixel(x as u32, y as u32, color);
                            }
                        }
                    }
                }
            }
        }

        cursor_x += (BITMAP_ADVANCE * scale) as i32;
    }
}
