//! Crop rectangle selection.
//!
//! Rectangles are measured against the image element's own layout box,
//! origin top-left, ignoring any pan/zoom applied on top of it. The widget
//! drawing the selection feeds either its change/complete callbacks or raw
//! pointer positions in that space.

use crate::capture::LayoutBox;
use serde::Serialize;

/// Margin of the default selection on each side, as a fraction of the box.
const DEFAULT_MARGIN: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CropRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CropRegion {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The 5% / 5% / 90% / 90% selection installed for every new frame.
    pub fn default_for(layout: LayoutBox) -> Self {
        let inner = 1.0 - 2.0 * DEFAULT_MARGIN;
        Self::new(
            layout.width * DEFAULT_MARGIN,
            layout.height * DEFAULT_MARGIN,
            layout.width * inner,
            layout.height * inner,
        )
    }

    /// Rectangle spanned by two corners, in either order.
    pub fn from_corners(ax: f32, ay: f32, bx: f32, by: f32) -> Self {
        Self::new(ax.min(bx), ay.min(by), (ax - bx).abs(), (ay - by).abs())
    }

    /// A region with non-positive width or height selects nothing.
    pub fn is_exportable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct CropSelector {
    draft: Option<CropRegion>,
    committed: Option<CropRegion>,
    anchor: Option<(f32, f32)>,
    bounds: Option<LayoutBox>,
}

impl CropSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the default selection for a frame laid out in `layout`, as
    /// both draft and committed rectangle.
    pub fn set_default(&mut self, layout: LayoutBox) {
        let region = CropRegion::default_for(layout);
        self.bounds = Some(layout);
        self.anchor = None;
        self.draft = Some(region);
        self.committed = Some(region);
    }

    /// Widget callback: the selection is being dragged.
    pub fn change(&mut self, region: CropRegion) {
        self.draft = Some(region);
    }

    /// Widget callback: the drag was released.
    pub fn complete(&mut self, region: CropRegion) {
        self.draft = Some(region);
        self.committed = Some(region);
        self.anchor = None;
    }

    /// Starts drawing a new selection at the pointer.
    pub fn begin(&mut self, x: f32, y: f32) {
        let (x, y) = self.clamp(x, y);
        self.anchor = Some((x, y));
        self.draft = Some(CropRegion::new(x, y, 0.0, 0.0));
    }

    /// Stretches the draft between the start point and the pointer.
    pub fn drag_to(&mut self, x: f32, y: f32) {
        let Some((ax, ay)) = self.anchor else {
            return;
        };
        let (x, y) = self.clamp(x, y);
        self.draft = Some(CropRegion::from_corners(ax, ay, x, y));
    }

    /// Promotes the draft to the committed selection. A zero-area draft is
    /// committed too; it simply cannot be exported.
    pub fn release(&mut self) -> Option<CropRegion> {
        if self.anchor.take().is_some() {
            self.committed = self.draft;
        }
        self.committed
    }

    pub fn draft(&self) -> Option<CropRegion> {
        self.draft
    }

    pub fn committed(&self) -> Option<CropRegion> {
        self.committed
    }

    pub fn is_selecting(&self) -> bool {
        self.anchor.is_some()
    }

    fn clamp(&self, x: f32, y: f32) -> (f32, f32) {
        match self.bounds {
            Some(b) => (x.clamp(0.0, b.width), y.clamp(0.0, b.height)),
            None => (x, y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: CropRegion, b: CropRegion) -> bool {
        (a.x - b.x).abs() < 1e-3
            && (a.y - b.y).abs() < 1e-3
            && (a.width - b.width).abs() < 1e-3
            && (a.height - b.height).abs() < 1e-3
    }

    #[test]
    fn default_selection_is_inset_five_percent() {
        let mut selector = CropSelector::new();
        selector.set_default(LayoutBox::new(800.0, 450.0));
        let committed = selector.committed().unwrap();
        assert!(close(committed, CropRegion::new(40.0, 22.5, 720.0, 405.0)));
        assert_eq!(selector.draft(), selector.committed());
    }

    #[test]
    fn change_only_touches_draft() {
        let mut selector = CropSelector::new();
        selector.set_default(LayoutBox::new(100.0, 100.0));
        let before = selector.committed();

        selector.change(CropRegion::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(selector.committed(), before);
        assert_eq!(selector.draft(), Some(CropRegion::new(1.0, 2.0, 3.0, 4.0)));

        selector.complete(CropRegion::new(1.0, 2.0, 30.0, 40.0));
        assert_eq!(selector.committed(), Some(CropRegion::new(1.0, 2.0, 30.0, 40.0)));
    }

    #[test]
    fn pointer_drag_normalizes_and_clamps() {
        let mut selector = CropSelector::new();
        selector.set_default(LayoutBox::new(200.0, 100.0));

        selector.begin(150.0, 80.0);
        selector.drag_to(-20.0, 10.0);
        assert!(selector.is_selecting());
        assert_eq!(selector.draft(), Some(CropRegion::new(0.0, 10.0, 150.0, 70.0)));

        // Draft does not replace the committed selection until release.
        assert_ne!(selector.committed(), selector.draft());
        let committed = selector.release().unwrap();
        assert_eq!(committed, CropRegion::new(0.0, 10.0, 150.0, 70.0));
        assert!(!selector.is_selecting());
    }

    #[test]
    fn zero_area_release_is_kept_but_not_exportable() {
        let mut selector = CropSelector::new();
        selector.set_default(LayoutBox::new(200.0, 100.0));
        selector.begin(50.0, 50.0);
        let committed = selector.release().unwrap();
        assert_eq!(committed.width, 0.0);
        assert!(!committed.is_exportable());
    }

    #[test]
    fn drag_without_begin_is_ignored() {
        let mut selector = CropSelector::new();
        selector.drag_to(10.0, 10.0);
        assert_eq!(selector.draft(), None);
        assert_eq!(selector.release(), None);
    }
}
