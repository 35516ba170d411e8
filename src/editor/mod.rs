//! Editing session — the state a user manipulates between capture and export.
//!
//! A `Session` owns the current frame, its pan/zoom and its crop selection,
//! and applies input events to them strictly in the order they arrive.
//! A new frame replaces all three together; a failed capture touches none.

mod crop;
mod transform;

pub use crop::{CropRegion, CropSelector};
pub use transform::{Direction, DragAnchor, TransformState, MIN_SCALE, NUDGE_STEP, WHEEL_DIVISOR};

use crate::capture::{
    CaptureBackend, CaptureError, CaptureSource, CaptureTarget, DisplayLayout, Frame,
    PreconditionViolation,
};
use crate::config::{EditorConfig, EXPORT_FILE_NAME};
use crate::export::{self, CompositorOptions, ExportError, ExportOutcome, ExportSink};

pub struct Session {
    config: EditorConfig,
    frame: Option<Frame>,
    transform: TransformState,
    crop: CropSelector,
}

impl Session {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            frame: None,
            transform: TransformState::default(),
            crop: CropSelector::new(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn transform(&self) -> &TransformState {
        &self.transform
    }

    pub fn crop(&self) -> &CropSelector {
        &self.crop
    }

    /// The crop selection, for the widget drawing it. Coordinates are in
    /// the frame's layout box.
    pub fn crop_mut(&mut self) -> &mut CropSelector {
        &mut self.crop
    }

    /// Replaces the current frame, recentering the view and installing the
    /// default crop.
    pub fn install_frame(&mut self, frame: Frame) {
        let display = frame.display();
        self.transform.reset(
            display.width,
            display.height,
            frame.natural_width() as f32,
            frame.natural_height() as f32,
        );
        self.crop.set_default(display);
        log::debug!(
            "New frame {}x{}, offset reset to ({}, {})",
            frame.natural_width(),
            frame.natural_height(),
            self.transform.offset_x,
            self.transform.offset_y
        );
        self.frame = Some(frame);
    }

    /// Captures a new frame from `source`. On failure the current frame,
    /// transform and crop are left as they were.
    pub async fn capture<B: CaptureBackend>(
        &mut self,
        source: &CaptureSource<B>,
        target: CaptureTarget,
        layout: DisplayLayout,
    ) -> Result<(), CaptureError> {
        match source.capture(target, layout).await {
            Ok(frame) => {
                self.install_frame(frame);
                Ok(())
            }
            Err(e) => {
                log::warn!("Capture failed, keeping current frame: {}", e);
                Err(e)
            }
        }
    }

    /// Mouse wheel over the image.
    pub fn on_wheel(&mut self, delta_y: f32) {
        self.transform
            .zoom_by(delta_y / self.config.wheel_divisor, self.config.min_scale);
    }

    /// Scale slider moved.
    pub fn set_scale(&mut self, value: f32) {
        self.transform
            .set_scale(value, self.config.min_scale, self.config.max_slider_scale);
    }

    /// One of the directional pan buttons.
    pub fn nudge(&mut self, direction: Direction) {
        self.transform.nudge_toward(direction, self.config.nudge_step);
    }

    /// Pointer pressed, in screen coordinates. Returns true if the press
    /// started a pan and should not reach the crop widget.
    pub fn on_pointer_down(&mut self, x: f32, y: f32, ctrl: bool) -> bool {
        self.transform.begin_drag(x, y, ctrl)
    }

    /// Pointer moved, in screen coordinates. Returns true if it panned the
    /// image.
    pub fn on_pointer_move(&mut self, x: f32, y: f32, ctrl: bool) -> bool {
        self.transform.update_drag(x, y, ctrl)
    }

    pub fn on_pointer_up(&mut self) {
        self.transform.end_drag();
    }

    pub fn compositor_options(&self) -> CompositorOptions {
        CompositorOptions {
            rescale_pan_offset: self.config.rescale_pan_offset,
        }
    }

    /// Exports the committed crop of the current frame to `sink`, always as
    /// `download.png`.
    ///
    /// Exporting before any frame exists is a caller bug and fails with a
    /// precondition error; a missing or empty crop is a skip.
    pub fn export(&self, sink: &mut dyn ExportSink) -> Result<ExportOutcome, ExportError> {
        let frame = self.frame.as_ref().ok_or(PreconditionViolation::NoFrame)?;
        let committed = self.crop.committed();

        let result = export::export_png(
            frame,
            &self.transform,
            committed.as_ref(),
            self.compositor_options(),
            sink,
            EXPORT_FILE_NAME,
        );
        if let Err(e) = &result {
            if e.is_skip() {
                log::warn!("{}", e);
            } else {
                log::error!("Export failed: {}", e);
            }
        }
        result
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}
