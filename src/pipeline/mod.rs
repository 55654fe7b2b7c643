//! Single-image processing and parallel batch export.
//!
//! One export is decode → render layer → resolve position → composite →
//! encode. Every step is a pure transform over values owned by this call,
//! so a batch is an embarrassingly parallel map: no locks, no shared
//! mutable state, no ordering requirement between images.
//!
//! Failures are isolated per image. A base image that cannot be decoded or
//! encoded is reported and skipped; the rest of the batch continues. An
//! unavailable watermark source is not a failure at all — the affected
//! images export unwatermarked.

use image::DynamicImage;
use rayon::prelude::*;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

use crate::encoder::{self, EncoderQuality, OutputFormat};
use crate::watermark::compositor::{composite, RenderedLayer};
use crate::watermark::image_renderer::render_image;
use crate::watermark::position::resolve_position;
use crate::watermark::spec::{Placement, WatermarkSpec};
use crate::watermark::text_renderer::render_text;
use crate::watermark::WatermarkError;

/// Render the watermark layer for a spec.
///
/// `Ok(None)` means the watermark is a no-op for this spec (empty text or
/// missing image source) and compositing should be skipped.
pub fn render_watermark_layer(
    spec: &WatermarkSpec,
) -> Result<Option<RenderedLayer>, WatermarkError> {
    match spec {
        WatermarkSpec::Text(text) => render_text(text),
        WatermarkSpec::Image(image) => render_image(image),
    }
}

/// Apply a watermark to a decoded base image.
///
/// Returns a new raster; the base is untouched. A no-op spec returns a
/// plain copy of the base.
pub fn apply_watermark(
    base: &DynamicImage,
    spec: &WatermarkSpec,
    placement: &Placement,
) -> Result<DynamicImage, WatermarkError> {
    let layer = match render_watermark_layer(spec)? {
        Some(layer) => layer,
        None => {
            debug!("watermark is a no-op, passing base image through");
            return Ok(base.clone());
        }
    };

    let position = resolve_position(
        placement,
        (base.width(), base.height()),
        layer.content_size(),
    );

    Ok(composite(base, &layer, position))
}

/// Process one image end to end: decode, watermark, encode.
pub fn process_image(
    data: &[u8],
    spec: &WatermarkSpec,
    placement: &Placement,
    format: OutputFormat,
    quality: EncoderQuality,
) -> Result<Vec<u8>, WatermarkError> {
    let base = encoder::decode(data)?;
    let watermarked = apply_watermark(&base, spec, placement)?;
    encoder::encode(&watermarked, format, quality)
}

/// Build the output filename for an exported image:
/// `{prefix}{stem}{suffix}.{ext}`.
pub fn output_filename(stem: &str, prefix: &str, suffix: &str, format: OutputFormat) -> String {
    format!("{}{}{}.{}", prefix, stem, suffix, format.extension())
}

/// One image queued for export: its source filename and encoded bytes.
pub struct ExportJob {
    /// Original filename (used for the output stem).
    pub name: String,
    /// Encoded source bytes (JPEG, PNG, BMP, or TIFF).
    pub data: Vec<u8>,
}

/// Batch-wide export configuration, shared read-only by all workers.
pub struct ExportOptions {
    pub spec: WatermarkSpec,
    pub placement: Placement,
    pub format: OutputFormat,
    pub quality: EncoderQuality,
    pub filename_prefix: String,
    pub filename_suffix: String,
}

/// A successfully exported image.
pub struct ExportedImage {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Per-image batch outcome.
pub enum ExportOutcome {
    Exported(ExportedImage),
    Failed(WatermarkError),
    Cancelled,
}

/// Result of a batch export: one outcome per job, in job order.
pub struct BatchReport {
    pub outcomes: Vec<(String, ExportOutcome)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, ExportOutcome::Exported(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, ExportOutcome::Failed(_)))
            .count()
    }

    pub fn cancelled(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, ExportOutcome::Cancelled))
            .count()
    }

    /// "succeeded/total" summary line, e.g. "2/3".
    pub fn summary(&self) -> String {
        format!("{}/{}", self.succeeded(), self.total())
    }
}

/// Export a batch of images in parallel.
///
/// Each image is processed independently; one failure never aborts the
/// others. `cancel` is a cooperative signal checked before each image
/// starts — an image already being processed runs to completion.
pub fn export_batch(
    jobs: &[ExportJob],
    options: &ExportOptions,
    cancel: &AtomicBool,
) -> BatchReport {
    let outcomes: Vec<(String, ExportOutcome)> = jobs
        .par_iter()
        .map(|job| {
            if cancel.load(Ordering::Relaxed) {
                return (job.name.clone(), ExportOutcome::Cancelled);
            }

            let outcome = match process_image(
                &job.data,
                &options.spec,
                &options.placement,
                options.format,
                options.quality,
            ) {
                Ok(data) => {
                    let stem = file_stem(&job.name);
                    let filename = output_filename(
                        &stem,
                        &options.filename_prefix,
                        &options.filename_suffix,
                        options.format,
                    );
                    ExportOutcome::Exported(ExportedImage { filename, data })
                }
                Err(e) => {
                    warn!(image = %job.name, error = %e, "image export failed");
                    ExportOutcome::Failed(e)
                }
            };

            (job.name.clone(), outcome)
        })
        .collect();

    let report = BatchReport { outcomes };
    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        cancelled = report.cancelled(),
        "batch export finished"
    );

    report
}

/// Filename without its extension, for output naming.
fn file_stem(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string())
}
