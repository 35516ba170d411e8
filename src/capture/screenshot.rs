//! Monitor and window capture using the `xcap` crate.
//!
//! This is the infrastructure layer — it talks to the OS. xcap hands back a
//! still image per call, so a "stream" here is the open monitor or window
//! handle; stopping it drops the handle.

use super::stream::{CaptureBackend, CaptureStream, CaptureTarget};
use super::CaptureError;
use image::RgbaImage;
use serde::Serialize;
use xcap::{Monitor, Window};

/// Production backend over xcap.
#[derive(Debug, Default, Clone, Copy)]
pub struct XcapBackend;

enum Source {
    Monitor(Monitor),
    Window(Window),
}

/// An open xcap monitor or window handle.
pub struct XcapStream {
    source: Option<Source>,
    label: String,
}

impl CaptureStream for XcapStream {
    fn first_frame(&mut self) -> Result<RgbaImage, CaptureError> {
        let image = match self.source.as_ref() {
            Some(Source::Monitor(monitor)) => monitor.capture_image(),
            Some(Source::Window(window)) => window.capture_image(),
            None => return Err(CaptureError::NoFrame),
        };
        image.map_err(|e| classify(&self.label, e.to_string()))
    }

    fn live_tracks(&self) -> usize {
        usize::from(self.source.is_some())
    }

    fn stop_all_tracks(&mut self) {
        if self.source.take().is_some() {
            log::debug!("Released capture source {}", self.label);
        }
    }
}

impl CaptureBackend for XcapBackend {
    type Stream = XcapStream;

    fn acquire(&self, target: &CaptureTarget) -> Result<XcapStream, CaptureError> {
        let (source, label) = match target {
            CaptureTarget::PrimaryMonitor => {
                let monitor = primary_monitor()?;
                let label = monitor.name().unwrap_or_else(|_| "primary".into());
                (Source::Monitor(monitor), label)
            }
            CaptureTarget::Monitor(name) => {
                let monitor = all_monitors()?
                    .into_iter()
                    .find(|m| m.name().map(|n| &n == name).unwrap_or(false))
                    .ok_or_else(|| CaptureError::Denied(format!("no monitor named {name:?}")))?;
                (Source::Monitor(monitor), name.clone())
            }
            CaptureTarget::Window(fragment) => {
                let window = Window::all()
                    .map_err(|e| classify("windows", e.to_string()))?
                    .into_iter()
                    .filter(|w| !w.is_minimized().unwrap_or(false))
                    .find(|w| w.title().map(|t| t.contains(fragment.as_str())).unwrap_or(false))
                    .ok_or_else(|| {
                        CaptureError::Denied(format!("no visible window matching {fragment:?}"))
                    })?;
                let label = window.title().unwrap_or_else(|_| fragment.clone());
                (Source::Window(window), label)
            }
        };

        log::info!("Acquired capture source {}", label);
        Ok(XcapStream {
            source: Some(source),
            label,
        })
    }
}

fn all_monitors() -> Result<Vec<Monitor>, CaptureError> {
    Monitor::all().map_err(|e| classify("monitors", e.to_string()))
}

fn primary_monitor() -> Result<Monitor, CaptureError> {
    let monitors = all_monitors()?;

    // Fallback: if no monitor reports as primary, use the first one
    let primary = monitors.iter().position(|m| m.is_primary().unwrap_or(false)).unwrap_or(0);

    monitors
        .into_iter()
        .nth(primary)
        .ok_or_else(|| CaptureError::Denied("no monitor available".into()))
}

/// Platforms report a refused screen-recording permission as an ordinary
/// capture error; pick those out so callers can treat them as a denial.
fn classify(label: &str, message: String) -> CaptureError {
    let lower = message.to_lowercase();
    if lower.contains("permission") || lower.contains("denied") || lower.contains("not authorized")
    {
        CaptureError::Denied(format!("{label}: {message}"))
    } else {
        CaptureError::Failed(format!("{label}: {message}"))
    }
}

/// A capturable monitor or window, for presenting a source chooser.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    pub kind: SourceKind,
    pub name: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Monitor,
    Window,
}

impl SourceInfo {
    /// The target that re-selects this source.
    pub fn target(&self) -> CaptureTarget {
        match self.kind {
            SourceKind::Monitor => CaptureTarget::Monitor(self.name.clone()),
            SourceKind::Window => CaptureTarget::Window(self.name.clone()),
        }
    }
}

/// Lists monitors and visible, titled windows.
pub fn list_sources() -> Result<Vec<SourceInfo>, CaptureError> {
    let mut sources: Vec<SourceInfo> = all_monitors()?
        .iter()
        .filter_map(|m| {
            Some(SourceInfo {
                kind: SourceKind::Monitor,
                name: m.name().ok()?,
                width: m.width().unwrap_or(0),
                height: m.height().unwrap_or(0),
            })
        })
        .collect();

    let windows = Window::all().map_err(|e| classify("windows", e.to_string()))?;
    sources.extend(windows.iter().filter_map(|w| {
        if w.is_minimized().unwrap_or(true) {
            return None;
        }
        let title = w.title().ok().filter(|t| !t.trim().is_empty())?;
        Some(SourceInfo {
            kind: SourceKind::Window,
            name: title,
            width: w.width().unwrap_or(0),
            height: w.height().unwrap_or(0),
        })
    }));

    Ok(sources)
}
