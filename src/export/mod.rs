//! Export domain — public API.
//!
//! Turns the current frame, pan/zoom and committed crop into a PNG and hands
//! it to an [`ExportSink`].

mod compositor;
mod sink;

pub use compositor::{compose, encode_png, render, CompositorOptions, ExportRequest};
pub use sink::{to_data_url, DataUrlSink, DownloadDirSink, ExportSink, MemorySink};

use crate::capture::{Frame, PreconditionViolation};
use crate::editor::{CropRegion, TransformState};
use std::time::Instant;

/// Result of a delivered export.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub request: ExportRequest,
    pub bytes: usize,
    pub location: String,
}

/// Composites, encodes and delivers one export.
///
/// Nothing is drawn and nothing reaches the sink unless `crop` is committed
/// and selects a non-empty area.
pub fn export_png(
    frame: &Frame,
    transform: &TransformState,
    crop: Option<&CropRegion>,
    options: CompositorOptions,
    sink: &mut dyn ExportSink,
    file_name: &str,
) -> Result<ExportOutcome, ExportError> {
    let start = Instant::now();

    let crop = crop.ok_or(ExportError::Skipped(SkipReason::NoCropSelected))?;
    let request = ExportRequest::plan(frame, transform, crop, options)?;
    log::debug!(
        "Export plan: {}",
        serde_json::to_string(&request).unwrap_or_default()
    );

    let image = render(frame, &request)?;
    let png_bytes = encode_png(&image)?;
    let location = sink.deliver(file_name, &png_bytes)?;

    log::info!(
        "Exported {}x{} crop to {} in {}ms — {} bytes",
        request.output_width,
        request.output_height,
        location,
        start.elapsed().as_millis(),
        png_bytes.len()
    );

    Ok(ExportOutcome {
        request,
        bytes: png_bytes.len(),
        location,
    })
}

/// Why an export was declined. Not a fault: the user can fix the selection
/// and try again.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum SkipReason {
    #[error("no crop selected")]
    NoCropSelected,

    #[error("crop selection has zero width or height")]
    EmptyCrop,

    #[error("crop selection {width}x{height} is smaller than one captured pixel")]
    EmptyOutput { width: f32, height: f32 },
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Export skipped: {0}")]
    Skipped(SkipReason),

    #[error(transparent)]
    Precondition(#[from] PreconditionViolation),

    #[error("PNG encoding failed: {0}")]
    Encoding(String),

    #[error("Failed to deliver export: {0}")]
    Delivery(#[from] std::io::Error),
}

impl ExportError {
    /// Whether this is a declined export rather than a failure.
    pub fn is_skip(&self) -> bool {
        matches!(self, ExportError::Skipped(_))
    }
}
