//! A captured still image plus the box it is laid out in.
//!
//! Natural pixels come from the bitmap itself. The layout box is whatever
//! size the host renders the image element at, before any pan/zoom is
//! applied on top. The two are independent per axis.

use image::RgbaImage;
use serde::Serialize;

/// Rendered size of the image element, in layout pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutBox {
    pub width: f32,
    pub height: f32,
}

impl LayoutBox {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Layout box matching the bitmap's own resolution (one layout pixel per
    /// natural pixel).
    pub fn natural(image: &RgbaImage) -> Self {
        Self::new(image.width() as f32, image.height() as f32)
    }

    fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// How the host lays a freshly captured bitmap out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplayLayout {
    /// One layout pixel per natural pixel.
    Natural,
    /// A fixed box, regardless of the bitmap's aspect ratio.
    Fixed(LayoutBox),
    /// Largest box with the bitmap's aspect ratio that fits inside the given
    /// container.
    FitWithin(LayoutBox),
}

impl DisplayLayout {
    pub fn resolve(&self, natural_width: u32, natural_height: u32) -> LayoutBox {
        let (w, h) = (natural_width as f32, natural_height as f32);
        match *self {
            DisplayLayout::Natural => LayoutBox::new(w, h),
            DisplayLayout::Fixed(layout) => layout,
            DisplayLayout::FitWithin(container) => {
                if w <= 0.0 || h <= 0.0 {
                    return container;
                }
                let fit = (container.width / w).min(container.height / h);
                LayoutBox::new(w * fit, h * fit)
            }
        }
    }
}

/// One captured frame.
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbaImage,
    display: LayoutBox,
}

impl Frame {
    /// Wraps a bitmap together with its layout box.
    ///
    /// Both the bitmap and the box must have positive dimensions, otherwise
    /// the layout-to-natural scale factors are undefined.
    pub fn new(image: RgbaImage, display: LayoutBox) -> Result<Self, PreconditionViolation> {
        if image.width() == 0 || image.height() == 0 {
            return Err(PreconditionViolation::EmptyBitmap);
        }
        if !display.is_valid() {
            return Err(PreconditionViolation::InvalidLayout {
                width: display.width,
                height: display.height,
            });
        }
        Ok(Self { image, display })
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn display(&self) -> LayoutBox {
        self.display
    }

    pub fn natural_width(&self) -> u32 {
        self.image.width()
    }

    pub fn natural_height(&self) -> u32 {
        self.image.height()
    }

    /// Per-axis factors from layout pixels to natural pixels: `(sx, sy)`.
    pub fn scale_factors(&self) -> (f32, f32) {
        (
            self.image.width() as f32 / self.display.width,
            self.image.height() as f32 / self.display.height,
        )
    }
}

/// Invariant violations: states the pipeline should never reach.
///
/// These are bugs in the caller, not user conditions, so they are reported
/// as hard errors instead of being skipped.
#[derive(Debug, thiserror::Error)]
pub enum PreconditionViolation {
    #[error("No frame captured — capture before editing or exporting")]
    NoFrame,

    #[error("Captured bitmap has zero width or height")]
    EmptyBitmap,

    #[error("Layout box {width}x{height} must be finite and positive")]
    InvalidLayout { width: f32, height: f32 },

    #[error("Could not allocate a {width}x{height} export surface")]
    SurfaceAllocation { width: u32, height: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_factors_are_per_axis() {
        let frame = Frame::new(RgbaImage::new(1920, 1080), LayoutBox::new(800.0, 600.0)).unwrap();
        let (sx, sy) = frame.scale_factors();
        assert!((sx - 2.4).abs() < 1e-6);
        assert!((sy - 1.8).abs() < 1e-6);
    }

    #[test]
    fn natural_layout_has_unit_scale() {
        let image = RgbaImage::new(640, 480);
        let display = LayoutBox::natural(&image);
        let frame = Frame::new(image, display).unwrap();
        assert_eq!(frame.scale_factors(), (1.0, 1.0));
    }

    #[test]
    fn fit_within_keeps_aspect_ratio() {
        let layout = DisplayLayout::FitWithin(LayoutBox::new(1000.0, 450.0)).resolve(1920, 1080);
        assert!((layout.width - 800.0).abs() < 1e-3);
        assert!((layout.height - 450.0).abs() < 1e-3);

        let fixed = LayoutBox::new(300.0, 300.0);
        assert_eq!(DisplayLayout::Fixed(fixed).resolve(1920, 1080), fixed);
        assert_eq!(DisplayLayout::Natural.resolve(64, 32), LayoutBox::new(64.0, 32.0));
    }

    #[test]
    fn empty_bitmap_rejected() {
        let result = Frame::new(RgbaImage::new(0, 10), LayoutBox::new(10.0, 10.0));
        assert!(matches!(result, Err(PreconditionViolation::EmptyBitmap)));
    }

    #[test]
    fn non_positive_layout_rejected() {
        let result = Frame::new(RgbaImage::new(10, 10), LayoutBox::new(0.0, 10.0));
        assert!(matches!(result, Err(PreconditionViolation::InvalidLayout { .. })));

        let result = Frame::new(RgbaImage::new(10, 10), LayoutBox::new(5.0, f32::NAN));
        assert!(matches!(result, Err(PreconditionViolation::InvalidLayout { .. })));
    }
}
