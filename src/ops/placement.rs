// ============================================================================
// IMAGE PLACEMENT — display sizing + mutable offset of the uploaded photo
// ============================================================================

use image::{RgbaImage, imageops};

use super::geometry::Point;
use super::overlay::OverlayParams;

/// Fit `natural_width` × `natural_height` inside `max_width` × `max_height`,
/// preserving aspect ratio. Images already inside the box keep their size.
/// Width is constrained first, then height, and each edge is at least 1 px.
pub fn constrain(natural_width: u32, natural_height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let mut w = natural_width.max(1) as f64;
    let mut h = natural_height.max(1) as f64;
    let max_w = max_width.max(1) as f64;
    let max_h = max_height.max(1) as f64;

    if w > max_w {
        h = h * max_w / w;
        w = max_w;
    }
    if h > max_h {
        w = w * max_h / h;
        h = max_h;
    }
    (w.round().max(1.0) as u32, h.round().max(1.0) as u32)
}

/// The uploaded photo as placed on the overlay canvas.
///
/// The display raster is resampled once at construction; drags only move
/// `offset_x` / `offset_y`, which are never clamped.
#[derive(Clone)]
pub struct ImagePlacement {
    display: RgbaImage,
    pub natural_width: u32,
    pub natural_height: u32,
    pub display_width: u32,
    pub display_height: u32,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl ImagePlacement {
    pub fn new(natural: &RgbaImage, max_width: u32, max_height: u32) -> Self {
        let (natural_width, natural_height) = natural.dimensions();
        let (display_width, display_height) =
            constrain(natural_width, natural_height, max_width, max_height);

        let display = if (display_width, display_height) == (natural_width, natural_height) {
            natural.clone()
        } else {
            imageops::resize(
                natural,
                display_width,
                display_height,
                imageops::FilterType::Triangle,
            )
        };

        Self {
            display,
            natural_width,
            natural_height,
            display_width,
            display_height,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    /// Raster blitted on every redraw, already at display size.
    pub fn display_raster(&self) -> &RgbaImage {
        &self.display
    }

    pub fn origin(&self) -> Point {
        Point::new(self.offset_x, self.offset_y)
    }

    pub fn set_origin(&mut self, origin: Point) {
        self.offset_x = origin.x;
        self.offset_y = origin.y;
    }

    pub fn reset_origin(&mut self) {
        self.set_origin(Point::default());
    }

    pub fn overlay_params(&self, show_grid: bool, show_spiral: bool) -> OverlayParams {
        OverlayParams {
            display_width: self.display_width,
            display_height: self.display_height,
            offset_x: self.offset_x,
            offset_y: self.offset_y,
            show_grid,
            show_spiral,
        }
    }
}

impl std::fmt::Debug for ImagePlacement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePlacement")
            .field("natural", &(self.natural_width, self.natural_height))
            .field("display", &(self.display_width, self.display_height))
            .field("offset", &(self.offset_x, self.offset_y))
            .finish()
    }
}
