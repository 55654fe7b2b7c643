//! Arbitrary-angle rotation for watermark layers.
//!
//! Rotation always expands the destination to the rotated bounding box so
//! no corner of the layer is ever cropped. Sampling is bilinear over
//! premultiplied RGBA; interpolating straight alpha would bleed the color
//! of fully transparent pixels into anti-aliased edges.

use image::{Rgba, RgbaImage};

/// Rotate a layer counter-clockwise by `degrees`, expanding the canvas to
/// the rotated bounding box. Areas outside the source sample transparent.
///
/// The output dimensions depend only on the magnitude of the angle, so a
/// -180 and a +180 rotation produce identically-sized layers.
pub fn rotate_layer(image: &RgbaImage, degrees: f32) -> RgbaImage {
    let theta = degrees.to_radians();
    let (sin, cos) = theta.sin_cos();

    let src_w = image.width() as f32;
    let src_h = image.height() as f32;

    // Expanded bounding box of the rotated source rectangle. The epsilon
    // keeps float noise at the axis-aligned angles (sin/cos of 90 and 180
    // degrees are not exactly 0 in f32) from inflating the box by a pixel.
    let dst_w = (src_w * cos.abs() + src_h * sin.abs() - 1e-3).ceil().max(1.0) as u32;
    let dst_h = (src_w * sin.abs() + src_h * cos.abs() - 1e-3).ceil().max(1.0) as u32;

    let src_cx = src_w / 2.0;
    let src_cy = src_h / 2.0;
    let dst_cx = dst_w as f32 / 2.0;
    let dst_cy = dst_h as f32 / 2.0;

    let mut rotated = RgbaImage::new(dst_w, dst_h);

    for dy in 0..dst_h {
        for dx in 0..dst_w {
            // Inverse-map the destination pixel into source coordinates
            let rx = dx as f32 + 0.5 - dst_cx;
            let ry = dy as f32 + 0.5 - dst_cy;

            let sx = rx * cos - ry * sin + src_cx - 0.5;
            let sy = rx * sin + ry * cos + src_cy - 0.5;

            let pixel = sample_bilinear(image, sx, sy);
            if pixel[3] > 0 {
                rotated.put_pixel(dx, dy, pixel);
            }
        }
    }

    rotated
}

/// Bilinear sample at fractional source coordinates, premultiplied.
fn sample_bilinear(image: &RgbaImage, sx: f32, sy: f32) -> Rgba<u8> {
    let x0 = sx.floor() as i64;
    let y0 = sy.floor() as i64;
    let fx = sx - x0 as f32;
    let fy = sy - y0 as f32;

    let p00 = premultiplied_at(image, x0, y0);
    let p10 = premultiplied_at(image, x0 + 1, y0);
    let p01 = premultiplied_at(image, x0, y0 + 1);
    let p11 = premultiplied_at(image, x0 + 1, y0 + 1);

    let mut acc = [0.0f32; 4];
    for c in 0..4 {
        acc[c] = p00[c] * (1.0 - fx) * (1.0 - fy)
            + p10[c] * fx * (1.0 - fy)
            + p01[c] * (1.0 - fx) * fy
            + p11[c] * fx * fy;
    }

    let alpha = acc[3];
    if alpha < 0.5 {
        return Rgba([0, 0, 0, 0]);
    }

    // Un-premultiply back to straight alpha
    let unmul = |v: f32| (v / alpha * 255.0).clamp(0.0, 255.0) as u8;
    Rgba([
        unmul(acc[0]),
        unmul(acc[1]),
        unmul(acc[2]),
        alpha.clamp(0.0, 255.0) as u8,
    ])
}

/// Premultiplied RGBA at integer coordinates; transparent outside bounds.
fn premultiplied_at(image: &RgbaImage, x: i64, y: i64) -> [f32; 4] {
    if x < 0 || y < 0 || x >= image.width() as i64 || y >= image.height() as i64 {
        return [0.0; 4];
    }

    let p = image.get_pixel(x as u32, y as u32);
    let a = p[3] as f32 / 255.0;
    [p[0] as f32 * a, p[1] as f32 * a, p[2] as f32 * a, p[3] as f32]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opaque(w: u32, h: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(color))
    }

    // Test: zero rotation keeps the dimensions
    #[test]
    fn test_rotate_zero_keeps_dimensions() {
        let img = opaque(40, 20, [255, 0, 0, 255]);
        let rotated = rotate_layer(&img, 0.0);
        assert_eq!((rotated.width(), rotated.height()), (40, 20));
    }

    // Test: 90 degrees swaps width and height
    #[test]
    fn test_rotate_90_swaps_dimensions() {
        let img = opaque(40, 20, [255, 0, 0, 255]);
        let rotated = rotate_layer(&img, 90.0);
        assert_eq!((rotated.width(), rotated.height()), (20, 40));
    }

    // Test: 45 degrees expands toward w*sqrt(2) for a square
    #[test]
    fn test_rotate_45_expands_bounding_box() {
        let img = opaque(100, 100, [0, 255, 0, 255]);
        let rotated = rotate_layer(&img, 45.0);
        // 100 * sqrt(2) ~= 141.4, ceil -> 142
        assert_eq!(rotated.width(), 142);
        assert_eq!(rotated.height(), 142);
    }

    // Test: -180 and +180 produce identical bounding boxes
    #[test]
    fn test_rotate_half_turn_symmetry() {
        let img = opaque(73, 31, [0, 0, 255, 255]);
        let neg = rotate_layer(&img, -180.0);
        let pos = rotate_layer(&img, 180.0);
        assert_eq!(
            (neg.width(), neg.height()),
            (pos.width(), pos.height())
        );
    }

    // Test: corners of a rotated opaque rectangle are not cropped
    #[test]
    fn test_rotate_no_cropping() {
        let img = opaque(60, 30, [255, 255, 255, 255]);
        let rotated = rotate_layer(&img, 30.0);

        let opaque_in = img.pixels().filter(|p| p[3] == 255).count() as f64;
        let opaque_out = rotated.pixels().filter(|p| p[3] > 200).count() as f64;

        // Anti-aliased edges lose a little coverage, never whole corners
        assert!(opaque_out > opaque_in * 0.95);
    }

    // Test: center pixel color survives rotation
    #[test]
    fn test_rotate_center_preserved() {
        let img = opaque(51, 51, [200, 100, 50, 255]);
        let rotated = rotate_layer(&img, 77.0);
        let center = rotated.get_pixel(rotated.width() / 2, rotated.height() / 2);
        assert_eq!(center[3], 255);
        assert!((center[0] as i32 - 200).abs() <= 2);
        assert!((center[1] as i32 - 100).abs() <= 2);
        assert!((center[2] as i32 - 50).abs() <= 2);
    }

    // Test: fully transparent input stays fully transparent
    #[test]
    fn test_rotate_transparent_stays_transparent() {
        let img = RgbaImage::new(20, 20);
        let rotated = rotate_layer(&img, 45.0);
        assert!(rotated.pixels().all(|p| p[3] == 0));
    }

    // Test: no color bleed from transparent neighbors at edges
    #[test]
    fn test_rotate_edge_keeps_color() {
        // Opaque white square; edges after rotation must stay white, not
        // darken toward the transparent surround.
        let img = opaque(40, 40, [255, 255, 255, 255]);
        let rotated = rotate_layer(&img, 45.0);

        for p in rotated.pixels() {
            if p[3] > 0 {
                assert_eq!(p[0], 255);
                assert_eq!(p[1], 255);
                assert_eq!(p[2], 255);
            }
        }
    }
}
