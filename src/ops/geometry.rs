// ============================================================================
// GEOMETRY PRIMITIVES + DRAW COMMANDS
// ============================================================================
//
// Both the spiral diagram and the photo overlay describe what to paint as a
// flat list of `DrawCommand`s. The list is executed by `ops::raster` onto an
// RGBA buffer, or serialised as JSON in headless mode.

use serde::Serialize;
use std::f64::consts::{FRAC_PI_2, PI};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Axis-aligned rectangle, top-left origin, y grows downward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn square(x: f64, y: f64, side: f64) -> Self {
        Self::new(x, y, side, side)
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// The four outline edges in drawing order (top, right, bottom, left).
    pub fn edges(&self) -> [(Point, Point); 4] {
        let tl = Point::new(self.x, self.y);
        let tr = Point::new(self.right(), self.y);
        let br = Point::new(self.right(), self.bottom());
        let bl = Point::new(self.x, self.bottom());
        [(tl, tr), (tr, br), (br, bl), (bl, tl)]
    }
}

/// A circular arc swept clockwise on screen (increasing angle, y-down) from
/// `start` to `end` radians.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ArcSpec {
    pub center: Point,
    pub radius: f64,
    pub start: f64,
    pub end: f64,
}

impl ArcSpec {
    /// A quarter arc beginning at `start` radians.
    pub fn quarter(center: Point, radius: f64, start: f64) -> Self {
        Self {
            center,
            radius,
            start,
            end: start + FRAC_PI_2,
        }
    }

    pub fn sweep(&self) -> f64 {
        self.end - self.start
    }

    pub fn point_at(&self, angle: f64) -> Point {
        Point::new(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
        )
    }

    pub fn start_point(&self) -> Point {
        self.point_at(self.start)
    }

    pub fn end_point(&self) -> Point {
        self.point_at(self.end)
    }
}

/// Which side of the remaining space a carved square is pressed against.
/// Each side fixes the quarter of the circle its spiral arc covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    Top,
    Right,
    Bottom,
    Left,
}

impl Anchor {
    /// Next side in the clockwise inward walk.
    pub fn next(self) -> Anchor {
        match self {
            Anchor::Top => Anchor::Right,
            Anchor::Right => Anchor::Bottom,
            Anchor::Bottom => Anchor::Left,
            Anchor::Left => Anchor::Top,
        }
    }

    /// Start angle of the quarter arc inscribed in a square on this side.
    pub fn arc_start(self) -> f64 {
        match self {
            Anchor::Right => 0.0,
            Anchor::Bottom => FRAC_PI_2,
            Anchor::Left => PI,
            Anchor::Top => 3.0 * FRAC_PI_2,
        }
    }

    /// Corner of `square` the inscribed arc is centred on.
    pub fn arc_center(self, square: &Rect) -> Point {
        match self {
            Anchor::Top => Point::new(square.x, square.bottom()),
            Anchor::Right => Point::new(square.x, square.y),
            Anchor::Bottom => Point::new(square.right(), square.y),
            Anchor::Left => Point::new(square.right(), square.bottom()),
        }
    }

    /// Carve a square of `side` out of `remaining` against this side.
    /// Returns `(square, what is left)`. Sizes are not clamped.
    pub fn carve(self, remaining: &Rect, side: f64) -> (Rect, Rect) {
        let r = remaining;
        match self {
            Anchor::Top => (
                Rect::square(r.x, r.y, side),
                Rect::new(r.x, r.y + side, r.w, r.h - side),
            ),
            Anchor::Right => (
                Rect::square(r.right() - side, r.y, side),
                Rect::new(r.x, r.y, r.w - side, r.h),
            ),
            Anchor::Bottom => (
                Rect::square(r.right() - side, r.bottom() - side, side),
                Rect::new(r.x, r.y, r.w, r.h - side),
            ),
            Anchor::Left => (
                Rect::square(r.x, r.bottom() - side, side),
                Rect::new(r.x + side, r.y, r.w - side, r.h),
            ),
        }
    }
}

/// Stroke colour (straight RGBA) and width in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StrokeStyle {
    pub color: [u8; 4],
    pub width: f32,
}

impl StrokeStyle {
    pub const fn new(color: [u8; 4], width: f32) -> Self {
        Self { color, width }
    }
}

/// One immediate-mode drawing operation.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    /// Reset every pixel to transparent.
    Clear,
    /// Paint the session image with its top-left at (`x`, `y`), scaled to
    /// `width` × `height`. Parts outside the surface are dropped.
    Blit {
        x: f64,
        y: f64,
        width: u32,
        height: u32,
    },
    StrokeRect { rect: Rect, style: StrokeStyle },
    Line {
        from: Point,
        to: Point,
        style: StrokeStyle,
    },
    /// A single stroked path made of arcs. Like a 2D-canvas path, the end of
    /// each arc is joined to the start of the next by a straight segment.
    Path { arcs: Vec<ArcSpec>, style: StrokeStyle },
}
