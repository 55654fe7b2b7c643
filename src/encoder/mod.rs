//! Output encoding and base-image decoding.
//!
//! Decoding accepts JPEG, PNG, BMP, and TIFF; output is PNG or JPEG. PNG
//! preserves the raster verbatim, alpha included. JPEG has no alpha
//! channel, so any transparency is first flattened onto an opaque white
//! background with the same "over" blend the compositor uses; dropping the
//! alpha bytes alone would leave garbage color in transparent regions.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::io::Reader as ImageReader;
use image::{DynamicImage, ImageEncoder as _, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;
use std::str::FromStr;

use crate::watermark::compositor::blend_pixels;
use crate::watermark::WatermarkError;

/// Output image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }

    /// File extension used by the export naming convention.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = WatermarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            _ => Err(WatermarkError::ConfigError(format!(
                "unknown output format: {}",
                s
            ))),
        }
    }
}

/// Quality settings for encoding. Only JPEG uses the quality value.
#[derive(Debug, Clone, Copy)]
pub struct EncoderQuality {
    /// JPEG quality, 1-100.
    pub quality: u8,
}

impl Default for EncoderQuality {
    fn default() -> Self {
        Self { quality: 95 }
    }
}

impl EncoderQuality {
    /// Create quality settings, clamping into the valid 1-100 range.
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }
}

/// Decode image bytes into a raster, guessing the format from content.
pub fn decode(data: &[u8]) -> Result<DynamicImage, WatermarkError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| WatermarkError::DecodeError(e.to_string()))?
        .decode()
        .map_err(|e| WatermarkError::DecodeError(e.to_string()))
}

/// Serialize a raster to the requested output format.
pub fn encode(
    raster: &DynamicImage,
    format: OutputFormat,
    quality: EncoderQuality,
) -> Result<Vec<u8>, WatermarkError> {
    match format {
        OutputFormat::Png => encode_png(raster),
        OutputFormat::Jpeg => encode_jpeg(raster, quality),
    }
}

/// PNG keeps the pixel data as-is; RGBA rasters keep their alpha channel.
fn encode_png(raster: &DynamicImage) -> Result<Vec<u8>, WatermarkError> {
    let mut output = Cursor::new(Vec::new());
    let encoder = PngEncoder::new(&mut output);

    let result = if raster.color().has_alpha() {
        let rgba = raster.to_rgba8();
        encoder.write_image(
            rgba.as_raw(),
            rgba.width(),
            rgba.height(),
            image::ColorType::Rgba8,
        )
    } else {
        let rgb = raster.to_rgb8();
        encoder.write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ColorType::Rgb8,
        )
    };

    result.map_err(|e| WatermarkError::EncodeError(format!("png: {}", e)))?;
    Ok(output.into_inner())
}

/// JPEG flattens transparency onto white before encoding RGB.
fn encode_jpeg(
    raster: &DynamicImage,
    quality: EncoderQuality,
) -> Result<Vec<u8>, WatermarkError> {
    let rgb = if raster.color().has_alpha() {
        flatten_onto_white(&raster.to_rgba8())
    } else {
        raster.to_rgb8()
    };

    let mut output = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut output, quality.quality);

    encoder
        .write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ColorType::Rgb8,
        )
        .map_err(|e| WatermarkError::EncodeError(format!("jpeg: {}", e)))?;

    Ok(output.into_inner())
}

/// Blend every pixel over opaque white and drop the alpha channel.
fn flatten_onto_white(rgba: &RgbaImage) -> RgbImage {
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    let mut rgb = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let flat = blend_pixels(WHITE, *pixel);
        rgb.put_pixel(x, y, image::Rgb([flat[0], flat[1], flat[2]]));
    }

    rgb
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba_raster(w: u32, h: u32, color: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba(color)))
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("PNG".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!("png".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!("JPEG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("jpg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert!("webp".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_format_metadata() {
        assert_eq!(OutputFormat::Png.extension(), "png");
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert_eq!(OutputFormat::Png.content_type(), "image/png");
        assert_eq!(OutputFormat::Jpeg.content_type(), "image/jpeg");
    }

    #[test]
    fn test_quality_default_and_clamping() {
        assert_eq!(EncoderQuality::default().quality, 95);
        assert_eq!(EncoderQuality::with_quality(80).quality, 80);
        assert_eq!(EncoderQuality::with_quality(0).quality, 1);
        assert_eq!(EncoderQuality::with_quality(200).quality, 100);
    }

    // Test: PNG output has the PNG signature and survives a round trip
    #[test]
    fn test_png_round_trip_preserves_alpha() {
        let raster = rgba_raster(4, 4, [10, 20, 30, 128]);
        let bytes = encode(&raster, OutputFormat::Png, EncoderQuality::default()).unwrap();

        assert_eq!(&bytes[0..4], &[0x89, 0x50, 0x4E, 0x47]);

        let decoded = decode(&bytes).unwrap();
        assert!(decoded.color().has_alpha());
        let pixel = decoded.to_rgba8().get_pixel(2, 2).0;
        assert_eq!(pixel, [10, 20, 30, 128]);
    }

    #[test]
    fn test_png_rgb_stays_rgb() {
        let raster = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, image::Rgb([1, 2, 3])));
        let bytes = encode(&raster, OutputFormat::Png, EncoderQuality::default()).unwrap();

        let decoded = decode(&bytes).unwrap();
        assert!(!decoded.color().has_alpha());
    }

    // Test: JPEG output has the JPEG signature and no alpha channel
    #[test]
    fn test_jpeg_has_no_alpha() {
        let raster = rgba_raster(8, 8, [200, 50, 25, 255]);
        let bytes = encode(&raster, OutputFormat::Jpeg, EncoderQuality::default()).unwrap();

        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);

        let decoded = decode(&bytes).unwrap();
        assert!(!decoded.color().has_alpha());
    }

    // Test: transparent regions flatten to opaque white, not garbage
    #[test]
    fn test_jpeg_flattens_transparency_to_white() {
        // Left half fully transparent black, right half opaque black
        let raster = DynamicImage::ImageRgba8(RgbaImage::from_fn(16, 16, |x, _| {
            if x < 8 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([0, 0, 0, 255])
            }
        }));

        let bytes = encode(&raster, OutputFormat::Jpeg, EncoderQuality::with_quality(100)).unwrap();
        let decoded = decode(&bytes).unwrap().to_rgb8();

        let transparent_side = decoded.get_pixel(2, 8);
        assert!(
            transparent_side[0] > 240 && transparent_side[1] > 240 && transparent_side[2] > 240,
            "transparent region must flatten to white, got {:?}",
            transparent_side
        );

        let opaque_side = decoded.get_pixel(13, 8);
        assert!(opaque_side[0] < 16, "opaque region must stay dark");
    }

    // Test: semi-transparent pixels blend with white, same math as compositing
    #[test]
    fn test_flatten_blends_partial_alpha() {
        let rgba = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 128]));
        let flat = flatten_onto_white(&rgba);

        // ~50% black over white lands mid-gray
        let pixel = flat.get_pixel(0, 0);
        assert!(pixel[0] > 110 && pixel[0] < 145, "got {:?}", pixel);
    }

    // Test: quality parameter changes JPEG size
    #[test]
    fn test_jpeg_quality_affects_size() {
        let raster = DynamicImage::ImageRgba8(RgbaImage::from_fn(64, 64, |x, y| {
            Rgba([(x * 4) as u8, (y * 4) as u8, ((x + y) * 2) as u8, 255])
        }));

        let high = encode(&raster, OutputFormat::Jpeg, EncoderQuality::with_quality(95)).unwrap();
        let low = encode(&raster, OutputFormat::Jpeg, EncoderQuality::with_quality(10)).unwrap();

        assert!(high.len() > low.len());
    }

    // Test: BMP and TIFF inputs decode
    #[test]
    fn test_decode_bmp_and_tiff() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(6, 6, image::Rgb([9, 8, 7])));

        let mut bmp = Cursor::new(Vec::new());
        img.write_to(&mut bmp, image::ImageFormat::Bmp).unwrap();
        let decoded = decode(&bmp.into_inner()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (6, 6));

        let mut tiff = Cursor::new(Vec::new());
        img.write_to(&mut tiff, image::ImageFormat::Tiff).unwrap();
        let decoded = decode(&tiff.into_inner()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (6, 6));
    }

    // Test: garbage bytes are a decode error, not a panic
    #[test]
    fn test_decode_garbage_fails() {
        let result = decode(&[0x00, 0x01, 0x02, 0x03, 0x04]);
        assert!(matches!(result, Err(WatermarkError::DecodeError(_))));
    }
}
