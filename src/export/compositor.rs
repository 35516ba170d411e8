//! Pure compositing logic — functional core.
//!
//! This module has zero infrastructure dependencies. It takes a frame, the
//! pan/zoom the user saw, and a crop selection, and returns pixel data.
//!
//! The draw replays, in natural pixels, what the user saw on screen:
//! move the crop window to the origin, pan, then zoom about the image
//! centre. The pan offset is measured in layout pixels but applied here
//! unscaled unless `rescale_pan_offset` is set, so the exported pan only
//! matches the screen exactly when the layout box equals the natural size.

use super::{ExportError, SkipReason};
use crate::capture::{Frame, PreconditionViolation};
use crate::editor::{CropRegion, TransformState};
use image::{Rgba, RgbaImage};
use serde::Serialize;
use std::io::Cursor;
use tiny_skia::{ColorU8, FilterQuality, IntSize, Pixmap, PixmapPaint, Transform};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompositorOptions {
    /// Scale the layout-pixel pan offset by `(sx, sy)` before drawing.
    pub rescale_pan_offset: bool,
}

/// Everything the draw needs, derived from frame, transform and crop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub scale_x: f32,
    pub scale_y: f32,
    pub output_width: u32,
    pub output_height: u32,
    /// Crop origin in natural pixels.
    pub crop_x: f32,
    pub crop_y: f32,
    pub center_x: f32,
    pub center_y: f32,
    /// Pan offset as applied in natural-pixel drawing space.
    pub pan_x: f32,
    pub pan_y: f32,
    pub zoom: f32,
}

impl ExportRequest {
    /// Derives the draw parameters. Skips (without side effects) a crop that
    /// selects nothing, or one that floors to an empty bitmap.
    pub fn plan(
        frame: &Frame,
        transform: &TransformState,
        crop: &CropRegion,
        options: CompositorOptions,
    ) -> Result<Self, ExportError> {
        if !crop.is_exportable() {
            return Err(ExportError::Skipped(SkipReason::EmptyCrop));
        }

        let (natural_w, natural_h) = (frame.natural_width() as f64, frame.natural_height() as f64);
        let display = frame.display();
        let (sx, sy) = frame.scale_factors();

        // Multiply before dividing so whole-pixel results stay whole.
        let output_w = (crop.width as f64 * natural_w / display.width as f64).floor();
        let output_h = (crop.height as f64 * natural_h / display.height as f64).floor();
        if !(output_w >= 1.0 && output_h >= 1.0) {
            return Err(ExportError::Skipped(SkipReason::EmptyOutput {
                width: crop.width,
                height: crop.height,
            }));
        }
        if output_w > u32::MAX as f64 || output_h > u32::MAX as f64 {
            return Err(PreconditionViolation::SurfaceAllocation {
                width: u32::MAX,
                height: u32::MAX,
            }
            .into());
        }

        let (pan_x, pan_y) = if options.rescale_pan_offset {
            (transform.offset_x * sx, transform.offset_y * sy)
        } else {
            (transform.offset_x, transform.offset_y)
        };

        Ok(Self {
            scale_x: sx,
            scale_y: sy,
            output_width: output_w as u32,
            output_height: output_h as u32,
            crop_x: crop.x * sx,
            crop_y: crop.y * sy,
            center_x: natural_w as f32 / 2.0,
            center_y: natural_h as f32 / 2.0,
            pan_x,
            pan_y,
            zoom: transform.zoom_factor(),
        })
    }

    /// Natural-pixel to output-pixel transform, composed in draw order:
    /// crop to origin, to centre, pan, zoom, back from centre.
    pub fn transform(&self) -> Transform {
        Transform::from_translate(-self.crop_x, -self.crop_y)
            .pre_translate(self.center_x, self.center_y)
            .pre_translate(self.pan_x, self.pan_y)
            .pre_scale(self.zoom, self.zoom)
            .pre_translate(-self.center_x, -self.center_y)
    }

    /// Where the natural pixel `(x, y)` lands in the output bitmap.
    pub fn project(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.zoom * (x - self.center_x) + self.center_x + self.pan_x - self.crop_x,
            self.zoom * (y - self.center_y) + self.center_y + self.pan_y - self.crop_y,
        )
    }
}

/// Renders the cropped, panned and zoomed frame.
pub fn compose(
    frame: &Frame,
    transform: &TransformState,
    crop: &CropRegion,
    options: CompositorOptions,
) -> Result<RgbaImage, ExportError> {
    let request = ExportRequest::plan(frame, transform, crop, options)?;
    render(frame, &request)
}

/// Draws the full frame through the request's transform onto a fresh
/// output surface.
pub fn render(frame: &Frame, request: &ExportRequest) -> Result<RgbaImage, ExportError> {
    let source = to_pixmap(frame.image())?;

    let (w, h) = (request.output_width, request.output_height);
    let mut target =
        Pixmap::new(w, h).ok_or(PreconditionViolation::SurfaceAllocation { width: w, height: h })?;

    let paint = PixmapPaint {
        quality: FilterQuality::Bicubic,
        ..PixmapPaint::default()
    };
    target.draw_pixmap(0, 0, source.as_ref(), &paint, request.transform(), None);

    Ok(from_pixmap(&target))
}

/// Encodes a bitmap as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut png_bytes: Vec<u8> = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png_bytes), image::ImageFormat::Png)
        .map_err(|e| ExportError::Encoding(e.to_string()))?;
    Ok(png_bytes)
}

// tiny-skia works in premultiplied alpha; image buffers are straight alpha.
fn to_pixmap(image: &RgbaImage) -> Result<Pixmap, PreconditionViolation> {
    let (w, h) = image.dimensions();
    let failed = || PreconditionViolation::SurfaceAllocation { width: w, height: h };

    let mut data = Vec::with_capacity(image.as_raw().len());
    for Rgba([r, g, b, a]) in image.pixels() {
        let c = ColorU8::from_rgba(*r, *g, *b, *a).premultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }

    let size = IntSize::from_wh(w, h).ok_or_else(failed)?;
    Pixmap::from_vec(data, size).ok_or_else(failed)
}

fn from_pixmap(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    image
}
