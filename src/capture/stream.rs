//! Live capture streams and the one-shot snapshot taken from them.
//!
//! A stream may keep platform capture indicators lit and hold screen or
//! camera resources for as long as any of its tracks is live. `snapshot`
//! stops every track once the first frame is read, on every exit path.

use super::frame::{DisplayLayout, Frame};
use super::CaptureError;
use image::RgbaImage;

/// What the user picked in the platform's source chooser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureTarget {
    /// The primary monitor, or the first one if none reports as primary.
    PrimaryMonitor,
    /// A monitor by its platform name.
    Monitor(String),
    /// The first visible window whose title contains this fragment.
    Window(String),
}

/// A live capture stream handed out by a [`CaptureBackend`].
pub trait CaptureStream {
    /// Decodes the first frame the stream delivers.
    fn first_frame(&mut self) -> Result<RgbaImage, CaptureError>;

    /// Number of tracks still live on this stream.
    fn live_tracks(&self) -> usize;

    /// Stops every track. Must be idempotent.
    fn stop_all_tracks(&mut self);
}

/// The host platform's capture mechanism.
pub trait CaptureBackend: Send + Sync + 'static {
    type Stream: CaptureStream;

    /// Requests a video-only stream for `target`.
    ///
    /// A refused permission prompt or a target that matches no source is
    /// reported as [`CaptureError::Denied`].
    fn acquire(&self, target: &CaptureTarget) -> Result<Self::Stream, CaptureError>;
}

/// Stops the wrapped stream's tracks when dropped.
struct StopOnDrop<'a, S: CaptureStream>(&'a mut S);

impl<S: CaptureStream> Drop for StopOnDrop<'_, S> {
    fn drop(&mut self) {
        let live = self.0.live_tracks();
        self.0.stop_all_tracks();
        log::debug!("Stopped {} capture track(s)", live);
    }
}

/// Reads the stream's first frame into a [`Frame`], then stops the stream.
pub fn snapshot<S: CaptureStream>(
    mut stream: S,
    layout: DisplayLayout,
) -> Result<Frame, CaptureError> {
    let image = {
        let guard = StopOnDrop(&mut stream);
        guard.0.first_frame()?
    };

    let display = layout.resolve(image.width(), image.height());
    Ok(Frame::new(image, display)?)
}


#[cfg(test)]
mod tests {
    use super::fake::FakeStream;
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn stream(frame: Option<RgbaImage>) -> (FakeStream, Arc<AtomicUsize>) {
        let stopped = Arc::new(AtomicUsize::new(0));
        let stream = FakeStream {
            frame,
            tracks: 3,
            stopped: Arc::clone(&stopped),
        };
        (stream, stopped)
    }

    #[test]
    fn snapshot_stops_every_track() {
        let (s, stopped) = stream(Some(RgbaImage::new(40, 20)));
        let frame = snapshot(s, DisplayLayout::Natural).unwrap();
        assert_eq!(frame.natural_width(), 40);
        assert_eq!(frame.natural_height(), 20);
        assert_eq!(stopped.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn snapshot_stops_tracks_when_no_frame_arrives() {
        let (s, stopped) = stream(None);
        let result = snapshot(s, DisplayLayout::Natural);
        assert!(matches!(result, Err(CaptureError::NoFrame)));
        assert_eq!(stopped.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn snapshot_rejects_empty_bitmap_after_stopping() {
        let (s, stopped) = stream(Some(RgbaImage::new(0, 0)));
        let result = snapshot(s, DisplayLayout::Natural);
        assert!(matches!(result, Err(CaptureError::Invalid(_))));
        assert_eq!(stopped.load(Ordering::SeqCst), 3);
    }
}
