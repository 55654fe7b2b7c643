//! Compositing of rendered watermark layers onto base images.
//!
//! The compositor is a pure function: it never mutates the base raster and
//! returns a freshly allocated result, which keeps batch export trivially
//! parallel. Blending uses the Porter-Duff "over" operator on the region
//! where the layer overlaps the base; anything outside the base is clipped,
//! never an error.

use image::{DynamicImage, Rgba, RgbaImage};

/// A rendered watermark layer, not yet positioned on a base image.
///
/// `content_size` is the box position resolution anchors on and
/// `anchor_shift` the correction applied after resolution. For rotated
/// text, `content_size` is the unrotated text box and `anchor_shift`
/// recenters the expanded rotated layer on it; for everything else the
/// layer is its own anchor box and the shift is zero.
#[derive(Clone)]
pub struct RenderedLayer {
    /// The layer pixels (RGBA, transparent background).
    pub image: RgbaImage,
    /// Box used for position resolution.
    pub content_size: (u32, u32),
    /// Offset added to the resolved position before blending.
    pub anchor_shift: (i32, i32),
}

impl RenderedLayer {
    /// A layer that anchors on its own extent with no shift.
    pub fn from_image(image: RgbaImage) -> Self {
        let content_size = (image.width(), image.height());
        Self {
            image,
            content_size,
            anchor_shift: (0, 0),
        }
    }

    /// The box the caller should pass to position resolution.
    pub fn content_size(&self) -> (u32, u32) {
        self.content_size
    }
}

impl std::fmt::Debug for RenderedLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderedLayer")
            .field("dimensions", &(self.image.width(), self.image.height()))
            .field("content_size", &self.content_size)
            .field("anchor_shift", &self.anchor_shift)
            .finish()
    }
}

/// Alpha-blend `layer` onto a copy of `base` at `position`.
///
/// `position` is the anchor coordinate from position resolution; the
/// layer's own `anchor_shift` is applied here. A base without an alpha
/// channel comes back without one: alpha is internal to the blend and is
/// not persisted for RGB inputs.
pub fn composite(base: &DynamicImage, layer: &RenderedLayer, position: (i32, i32)) -> DynamicImage {
    let had_alpha = base.color().has_alpha();
    let mut canvas = base.to_rgba8();

    let x = position.0 + layer.anchor_shift.0;
    let y = position.1 + layer.anchor_shift.1;
    blend_layer(&mut canvas, &layer.image, (x, y));

    if had_alpha {
        DynamicImage::ImageRgba8(canvas)
    } else {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8())
    }
}

/// Blend a watermark image onto the target at the given offset, clipping
/// whatever falls outside the target.
fn blend_layer(target: &mut RgbaImage, layer: &RgbaImage, position: (i32, i32)) {
    let target_width = target.width() as i32;
    let target_height = target.height() as i32;

    let x_start = position.0.max(0);
    let y_start = position.1.max(0);
    let x_end = (position.0 + layer.width() as i32).min(target_width);
    let y_end = (position.1 + layer.height() as i32).min(target_height);

    for ty in y_start..y_end {
        for tx in x_start..x_end {
            let wx = (tx - position.0) as u32;
            let wy = (ty - position.1) as u32;

            let wm_pixel = layer.get_pixel(wx, wy);
            if wm_pixel[3] == 0 {
                continue;
            }

            let target_pixel = target.get_pixel(tx as u32, ty as u32);
            let blended = blend_pixels(*target_pixel, *wm_pixel);
            target.put_pixel(tx as u32, ty as u32, blended);
        }
    }
}

/// Porter-Duff "over": result = fg + bg * (1 - fg.alpha).
///
/// Layer opacity is already baked into the foreground alpha at render
/// time; there is no separate opacity pass here.
pub(crate) fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>) -> Rgba<u8> {
    let fg_alpha = foreground[3] as f32 / 255.0;
    let bg_alpha = background[3] as f32 / 255.0;

    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);

    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = fg as f32 / 255.0;
        let bg_f = bg as f32 / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_rgba(width: u32, height: u32, color: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)))
    }

    fn layer(width: u32, height: u32, color: [u8; 4]) -> RenderedLayer {
        RenderedLayer::from_image(RgbaImage::from_pixel(width, height, Rgba(color)))
    }

    // Test: opaque layer replaces base pixels in the covered region
    #[test]
    fn test_opaque_layer_replaces() {
        let base = base_rgba(100, 100, [255, 255, 255, 255]);
        let wm = layer(20, 20, [0, 0, 255, 255]);

        let out = composite(&base, &wm, (40, 40)).to_rgba8();

        let inside = out.get_pixel(50, 50);
        assert_eq!(*inside, Rgba([0, 0, 255, 255]));

        let outside = out.get_pixel(10, 10);
        assert_eq!(*outside, Rgba([255, 255, 255, 255]));
    }

    // Test: half-alpha white over black lands mid-gray
    #[test]
    fn test_semi_transparent_blend() {
        let base = base_rgba(50, 50, [0, 0, 0, 255]);
        let wm = layer(10, 10, [255, 255, 255, 128]);

        let out = composite(&base, &wm, (0, 0)).to_rgba8();
        let pixel = out.get_pixel(5, 5);

        assert!(pixel[0] > 100 && pixel[0] < 160);
        assert!(pixel[1] > 100 && pixel[1] < 160);
        assert!(pixel[2] > 100 && pixel[2] < 160);
        assert_eq!(pixel[3], 255);
    }

    // Test: fully transparent layer leaves the base byte-identical
    #[test]
    fn test_transparent_layer_is_identity() {
        let base = DynamicImage::ImageRgba8(RgbaImage::from_fn(40, 30, |x, y| {
            Rgba([(x * 6) as u8, (y * 7) as u8, 99, 255])
        }));
        let wm = layer(20, 20, [255, 0, 0, 0]);

        let out = composite(&base, &wm, (5, 5));
        assert_eq!(base.to_rgba8().as_raw(), out.to_rgba8().as_raw());
    }

    // Test: base is never mutated
    #[test]
    fn test_base_untouched() {
        let base = base_rgba(30, 30, [10, 20, 30, 255]);
        let before = base.to_rgba8().as_raw().clone();

        let wm = layer(10, 10, [255, 0, 0, 255]);
        let _ = composite(&base, &wm, (0, 0));

        assert_eq!(base.to_rgba8().as_raw(), &before);
    }

    // Test: clipping on the bottom-right edge
    #[test]
    fn test_clipping_bottom_right() {
        let base = base_rgba(50, 50, [255, 255, 255, 255]);
        let wm = layer(30, 30, [255, 0, 0, 255]);

        // Only a 10x10 corner lands on the canvas
        let out = composite(&base, &wm, (40, 40)).to_rgba8();

        assert_eq!(*out.get_pixel(45, 45), Rgba([255, 0, 0, 255]));
        assert_eq!(*out.get_pixel(30, 30), Rgba([255, 255, 255, 255]));
    }

    // Test: negative positions clip on the top-left edge
    #[test]
    fn test_clipping_negative_position() {
        let base = base_rgba(50, 50, [255, 255, 255, 255]);
        let wm = layer(30, 30, [255, 0, 0, 255]);

        let out = composite(&base, &wm, (-20, -20)).to_rgba8();

        assert_eq!(*out.get_pixel(5, 5), Rgba([255, 0, 0, 255]));
        assert_eq!(*out.get_pixel(20, 20), Rgba([255, 255, 255, 255]));
    }

    // Test: a layer fully off-canvas is a no-op, not an error
    #[test]
    fn test_fully_off_canvas() {
        let base = base_rgba(50, 50, [255, 255, 255, 255]);
        let wm = layer(30, 30, [255, 0, 0, 255]);

        let out = composite(&base, &wm, (500, 500));
        assert_eq!(base.to_rgba8().as_raw(), out.to_rgba8().as_raw());

        let out = composite(&base, &wm, (-300, -300));
        assert_eq!(base.to_rgba8().as_raw(), out.to_rgba8().as_raw());
    }

    // Test: RGB base comes back as RGB; alpha is not persisted
    #[test]
    fn test_rgb_base_round_trip() {
        let base = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            40,
            40,
            image::Rgb([0, 128, 0]),
        ));
        let wm = layer(10, 10, [255, 0, 0, 128]);

        let out = composite(&base, &wm, (0, 0));
        assert!(!out.color().has_alpha());
        assert_eq!(out.width(), 40);
        assert_eq!(out.height(), 40);
    }

    // Test: RGBA base keeps its alpha channel
    #[test]
    fn test_rgba_base_keeps_alpha() {
        let base = base_rgba(40, 40, [0, 128, 0, 200]);
        let wm = layer(10, 10, [255, 0, 0, 255]);

        let out = composite(&base, &wm, (0, 0));
        assert!(out.color().has_alpha());
    }

    // Test: anchor shift moves the blend position
    #[test]
    fn test_anchor_shift_applied() {
        let base = base_rgba(60, 60, [255, 255, 255, 255]);
        let mut wm = layer(10, 10, [255, 0, 0, 255]);
        wm.anchor_shift = (-5, -5);

        let out = composite(&base, &wm, (30, 30)).to_rgba8();

        // Layer lands at (25, 25) .. (35, 35)
        assert_eq!(*out.get_pixel(26, 26), Rgba([255, 0, 0, 255]));
        assert_eq!(*out.get_pixel(36, 36), Rgba([255, 255, 255, 255]));
    }

    // Test: blend_pixels over a transparent background keeps the layer color
    #[test]
    fn test_blend_onto_transparent_background() {
        let result = blend_pixels(Rgba([0, 0, 0, 0]), Rgba([200, 100, 50, 128]));
        assert_eq!(result[0], 200);
        assert_eq!(result[1], 100);
        assert_eq!(result[2], 50);
        assert_eq!(result[3], 128);
    }

    // Test: layer content size defaults to the image extent
    #[test]
    fn test_from_image_content_size() {
        let wm = RenderedLayer::from_image(RgbaImage::new(17, 9));
        assert_eq!(wm.content_size(), (17, 9));
        assert_eq!(wm.anchor_shift, (0, 0));
    }
}
