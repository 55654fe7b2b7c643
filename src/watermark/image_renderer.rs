//! Image watermark rendering.
//!
//! Scales the watermark source, applies opacity to its alpha channel, and
//! optionally rotates it. A watermark whose source could not be loaded is
//! a no-op: the tool is forgiving about missing logo files, the base image
//! just passes through unwatermarked.

use fast_image_resize::{FilterType, Image, PixelType, ResizeAlg, Resizer};
use image::io::Reader as ImageReader;
use image::{DynamicImage, RgbaImage};
use std::num::NonZeroU32;
use std::path::Path;
use tracing::warn;

use super::compositor::RenderedLayer;
use super::rotate::rotate_layer;
use super::spec::ImageWatermark;
use super::WatermarkError;

/// Render an image watermark into a transparent layer.
///
/// Returns `Ok(None)` when the spec has no source raster (missing or
/// unreadable watermark file); the caller skips compositing entirely.
pub fn render_image(spec: &ImageWatermark) -> Result<Option<RenderedLayer>, WatermarkError> {
    let source = match &spec.source {
        Some(source) => source,
        None => return Ok(None),
    };

    let scale = spec.scale_percent.max(1) as f32 / 100.0;
    let target_w = ((source.width() as f32 * scale).round() as u32).max(1);
    let target_h = ((source.height() as f32 * scale).round() as u32).max(1);

    let mut layer = if (target_w, target_h) == (source.width(), source.height()) {
        source.to_rgba8()
    } else {
        resize_source(source, target_w, target_h)?
    };

    apply_opacity(&mut layer, spec.opacity_percent);

    if spec.rotation_degrees != 0 {
        layer = rotate_layer(&layer, spec.rotation_degrees as f32);
    }

    Ok(Some(RenderedLayer::from_image(layer)))
}

/// Load a watermark source image from disk.
///
/// Missing, unreadable, or undecodable files log a warning and return
/// `None`; a broken watermark file must never fail an export.
pub fn load_watermark_source(path: &Path) -> Option<DynamicImage> {
    match try_load_source(path) {
        Ok(image) => Some(image),
        Err(e) => {
            warn!(error = %e, "skipping watermark");
            None
        }
    }
}

fn try_load_source(path: &Path) -> Result<DynamicImage, WatermarkError> {
    ImageReader::open(path)
        .map_err(|e| WatermarkError::SourceUnavailable(format!("{}: {}", path.display(), e)))?
        .with_guessed_format()
        .map_err(|e| WatermarkError::SourceUnavailable(format!("{}: {}", path.display(), e)))?
        .decode()
        .map_err(|e| WatermarkError::SourceUnavailable(format!("{}: {}", path.display(), e)))
}

/// Resize the source to the target dimensions with Lanczos3 resampling.
///
/// Nearest-neighbor is deliberately off the table here; it visibly
/// degrades watermark edges at non-integer scales.
fn resize_source(
    source: &DynamicImage,
    target_w: u32,
    target_h: u32,
) -> Result<RgbaImage, WatermarkError> {
    let src_width = NonZeroU32::new(source.width())
        .ok_or_else(|| WatermarkError::RenderError("source width is 0".to_string()))?;
    let src_height = NonZeroU32::new(source.height())
        .ok_or_else(|| WatermarkError::RenderError("source height is 0".to_string()))?;
    let dst_width = NonZeroU32::new(target_w)
        .ok_or_else(|| WatermarkError::RenderError("target width is 0".to_string()))?;
    let dst_height = NonZeroU32::new(target_h)
        .ok_or_else(|| WatermarkError::RenderError("target height is 0".to_string()))?;

    let src_image = Image::from_vec_u8(
        src_width,
        src_height,
        source.to_rgba8().into_raw(),
        PixelType::U8x4,
    )
    .map_err(|e| WatermarkError::RenderError(format!("failed to create source image: {:?}", e)))?;

    let mut dst_image = Image::new(dst_width, dst_height, PixelType::U8x4);

    let mut resizer = Resizer::new(ResizeAlg::Convolution(FilterType::Lanczos3));
    resizer
        .resize(&src_image.view(), &mut dst_image.view_mut())
        .map_err(|e| WatermarkError::RenderError(format!("resize failed: {:?}", e)))?;

    RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| WatermarkError::RenderError("failed to assemble resized image".to_string()))
}

/// Multiply the layer's alpha channel by the opacity percentage.
///
/// Multiplicative on purpose: a semi-transparent source can only become
/// more transparent as the slider goes down, never more opaque.
fn apply_opacity(layer: &mut RgbaImage, opacity_percent: u8) {
    let factor = opacity_percent.min(100) as f32 / 100.0;
    if factor >= 1.0 {
        return;
    }

    for pixel in layer.pixels_mut() {
        pixel[3] = (pixel[3] as f32 * factor).round() as u8;
    }
}
