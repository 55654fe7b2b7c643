//! Watermark compositing core.
//!
//! This module renders a text or image watermark into a transparent RGBA
//! layer, resolves its placement against a base image, and alpha-blends
//! the two. Every operation is a pure, stateless transform over immutable
//! per-call values; the base raster is never mutated.
//!
//! # Features
//!
//! - **Text watermarks** with font family resolution, color, opacity, and
//!   rotation
//! - **Image watermarks** with scaling, opacity, and rotation
//! - **9-grid placement presets** plus explicit drag-to-position offsets
//! - **Forgiving failure policy**: missing fonts fall back, missing
//!   watermark sources pass the base image through unchanged
//!
//! # Example
//!
//! ```
//! use suiyin::watermark::{Placement, PositionPreset, TextWatermark, WatermarkSpec};
//! use suiyin::pipeline::apply_watermark;
//! use image::DynamicImage;
//!
//! let base = DynamicImage::new_rgba8(800, 600);
//! let spec = WatermarkSpec::Text(TextWatermark {
//!     content: "Sample Watermark".to_string(),
//!     ..Default::default()
//! });
//!
//! let out = apply_watermark(&base, &spec, &Placement::Preset(PositionPreset::BottomRight))
//!     .expect("watermarking cannot fail for a valid spec");
//! assert_eq!((out.width(), out.height()), (800, 600));
//! ```

pub mod color;
pub mod compositor;
pub mod error;
pub mod font;
pub mod image_renderer;
pub mod position;
pub mod rotate;
pub mod settings;
pub mod spec;
pub mod text_renderer;

// Re-export main types for convenience
pub use color::{color_with_opacity, opacity_to_alpha, parse_hex_color};
pub use compositor::{composite, RenderedLayer};
pub use error::WatermarkError;
pub use font::{resolve_font, ResolvedFont, FALLBACK_FAMILY};
pub use image_renderer::{load_watermark_source, render_image};
pub use position::{resolve_position, PRESET_MARGIN};
pub use settings::ExportSettings;
pub use spec::{ImageWatermark, Placement, PositionPreset, TextWatermark, WatermarkSpec};
pub use text_renderer::{measure_text, render_text};
