//! Screen capture domain — public API.
//!
//! This module owns all screen capture functionality: acquiring a stream
//! from the platform, taking one frame from it, and releasing it.
//! External code should only use the items exported here.

mod frame;
mod screenshot;
mod stream;

#[cfg(test)]
pub(crate) use stream::fake;

pub use frame::{DisplayLayout, Frame, LayoutBox, PreconditionViolation};
pub use screenshot::{list_sources, SourceInfo, SourceKind, XcapBackend};
pub use stream::{snapshot, CaptureBackend, CaptureStream, CaptureTarget};

use std::sync::Arc;
use std::time::Instant;

/// Takes single-frame snapshots through a capture backend.
///
/// The backend is shared with the blocking worker that performs the
/// capture, so the source itself is cheap to clone.
pub struct CaptureSource<B: CaptureBackend> {
    backend: Arc<B>,
}

impl<B: CaptureBackend> Clone for CaptureSource<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: CaptureBackend> CaptureSource<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Requests a live stream for `target`.
    pub fn acquire(&self, target: &CaptureTarget) -> Result<B::Stream, CaptureError> {
        self.backend.acquire(target)
    }

    /// Acquires a stream, snapshots it, and stops it, on the calling thread.
    pub fn capture_blocking(
        &self,
        target: &CaptureTarget,
        layout: DisplayLayout,
    ) -> Result<Frame, CaptureError> {
        capture_with(self.backend.as_ref(), target, layout)
    }

    /// Acquires a stream, snapshots it, and stops it.
    ///
    /// The platform call blocks (and may sit behind a permission prompt),
    /// so it runs on tokio's blocking pool.
    pub async fn capture(
        &self,
        target: CaptureTarget,
        layout: DisplayLayout,
    ) -> Result<Frame, CaptureError> {
        let backend = Arc::clone(&self.backend);
        tokio::task::spawn_blocking(move || capture_with(backend.as_ref(), &target, layout))
            .await
            .map_err(|e| CaptureError::Interrupted(e.to_string()))?
    }
}

fn capture_with<B: CaptureBackend>(
    backend: &B,
    target: &CaptureTarget,
    layout: DisplayLayout,
) -> Result<Frame, CaptureError> {
    let start = Instant::now();

    let stream = backend.acquire(target)?;
    let frame = snapshot(stream, layout)?;

    let display = frame.display();
    log::info!(
        "Captured {}x{} frame (layout {}x{}) in {}ms",
        frame.natural_width(),
        frame.natural_height(),
        display.width,
        display.height,
        start.elapsed().as_millis()
    );

    Ok(frame)
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Capture denied: {0}")]
    Denied(String),

    #[error("Capture stream delivered no frame")]
    NoFrame,

    #[error("Screen capture failed: {0}")]
    Failed(String),

    #[error("Capture task interrupted: {0}")]
    Interrupted(String),

    #[error(transparent)]
    Invalid(#[from] PreconditionViolation),
}

#[cfg(test)]
mod tests {
    use super::fake::FakeBackend;
    use super::*;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn capture_runs_off_thread_and_releases_stream() {
        let backend = FakeBackend::solid(64, 48);
        let stopped = Arc::clone(&backend.stopped);
        let source = CaptureSource::new(backend);

        let frame = source
            .capture(CaptureTarget::PrimaryMonitor, DisplayLayout::Natural)
            .await
            .unwrap();

        assert_eq!((frame.natural_width(), frame.natural_height()), (64, 48));
        assert_eq!(stopped.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn denial_produces_no_frame() {
        let source = CaptureSource::new(FakeBackend::denying());
        let result = source.capture_blocking(&CaptureTarget::PrimaryMonitor, DisplayLayout::Natural);
        assert!(matches!(result, Err(CaptureError::Denied(_))));
    }
}
