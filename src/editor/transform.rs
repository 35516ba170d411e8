//! Pan and zoom applied on top of the displayed frame.
//!
//! `scale` is a percentage (100 = untransformed). The offsets are signed
//! displacements in layout pixels, applied after scaling. All updates are
//! plain synchronous mutations of this record.

use serde::Serialize;

/// Wheel delta per percentage point of zoom. A typical notch (100) moves
/// the zoom by 4 points.
pub const WHEEL_DIVISOR: f32 = 25.0;

/// Pan distance of one directional button press.
pub const NUDGE_STEP: f32 = 10.0;

/// Zoom floor, in percent.
pub const MIN_SCALE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformState {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    #[serde(skip)]
    drag: Option<DragAnchor>,
}

/// Offset minus pointer position, captured when a drag starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragAnchor {
    pub x: f32,
    pub y: f32,
}

/// The four directional pan buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub fn delta(self, step: f32) -> (f32, f32) {
        match self {
            Direction::Left => (-step, 0.0),
            Direction::Right => (step, 0.0),
            Direction::Up => (0.0, -step),
            Direction::Down => (0.0, step),
        }
    }
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            scale: 100.0,
            offset_x: 0.0,
            offset_y: 0.0,
            drag: None,
        }
    }
}

impl TransformState {
    /// Unzoomed state centering a `natural`-sized image in a `display`-sized
    /// box. Any drag in progress is dropped.
    pub fn reset(
        &mut self,
        display_width: f32,
        display_height: f32,
        natural_width: f32,
        natural_height: f32,
    ) {
        *self = Self {
            scale: 100.0,
            offset_x: (display_width - natural_width) / 2.0,
            offset_y: (display_height - natural_height) / 2.0,
            drag: None,
        };
    }

    /// Applies a wheel event with the default sensitivity and floor.
    pub fn zoom(&mut self, wheel_delta_y: f32) {
        self.zoom_by(wheel_delta_y / WHEEL_DIVISOR, MIN_SCALE);
    }

    /// Lowers the scale by `points` percentage points (raises it for negative
    /// `points`), never going below `min_scale`.
    pub fn zoom_by(&mut self, points: f32, min_scale: f32) {
        self.scale = (self.scale - points).max(min_scale);
    }

    /// Scale slider input.
    pub fn set_scale(&mut self, value: f32, min_scale: f32, max_scale: f32) {
        self.scale = value.clamp(min_scale, max_scale);
    }

    pub fn nudge(&mut self, dx: f32, dy: f32) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    pub fn nudge_toward(&mut self, direction: Direction, step: f32) {
        let (dx, dy) = direction.delta(step);
        self.nudge(dx, dy);
    }

    /// Starts a pan drag at the pointer position. Only a ctrl-held press
    /// starts one; returns whether it did.
    pub fn begin_drag(&mut self, pointer_x: f32, pointer_y: f32, ctrl: bool) -> bool {
        if !ctrl {
            return false;
        }
        self.drag = Some(DragAnchor {
            x: self.offset_x - pointer_x,
            y: self.offset_y - pointer_y,
        });
        true
    }

    /// Moves the image with the pointer. Releasing ctrl mid-move ends the
    /// drag without applying this move. Returns whether the offset changed.
    pub fn update_drag(&mut self, pointer_x: f32, pointer_y: f32, ctrl: bool) -> bool {
        if !ctrl {
            self.end_drag();
            return false;
        }
        let Some(anchor) = self.drag else {
            return false;
        };
        self.offset_x = anchor.x + pointer_x;
        self.offset_y = anchor.y + pointer_y;
        true
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn drag_anchor(&self) -> Option<DragAnchor> {
        self.drag
    }

    /// Zoom as a plain factor (1.0 = untransformed).
    pub fn zoom_factor(&self) -> f32 {
        self.scale / 100.0
    }
}
