//! snapcrop — snapshot a screen or window, pan and zoom it, crop, export PNG.
//!
//! The library wires together:
//! - Screen capture domain (capture/)
//! - Editing session: pan/zoom and crop selection (editor/)
//! - Compositing and delivery of the exported PNG (export/)
//!
//! Hosts feed discrete input events into a [`Session`]; nothing here
//! renders UI.

pub mod capture;
pub mod config;
pub mod editor;
pub mod export;

pub use capture::{CaptureError, CaptureSource, CaptureTarget, DisplayLayout, Frame, LayoutBox};
pub use config::EditorConfig;
pub use editor::{CropRegion, Direction, Session, TransformState};
pub use export::{ExportError, ExportSink, SkipReason};
