// Suiyin watermark compositing library

pub mod encoder;
pub mod logging;
pub mod pipeline;
pub mod watermark;

// Core call surface consumed by the UI/export layer
pub use encoder::{decode, encode, EncoderQuality, OutputFormat};
pub use pipeline::{
    apply_watermark, export_batch, process_image, render_watermark_layer, BatchReport, ExportJob,
    ExportOptions,
};
pub use watermark::{
    composite, resolve_position, ExportSettings, Placement, PositionPreset, RenderedLayer,
    WatermarkError, WatermarkSpec,
};
