use eframe::egui;
use egui::{Color32, ColorImage, Pos2, Rect, Response, Sense, TextureHandle, TextureOptions, Vec2};
use image::RgbaImage;

use crate::ops::geometry::Point;

/// Checkerboard cell edge in screen points.
const CHECKER_SIZE: f32 = 10.0;

// ============================================================================
// CANVAS SURFACE — CPU raster + its egui texture
// ============================================================================

/// One drawable canvas: the rasterizer writes `pixels`, the texture is
/// re-uploaded lazily on the next paint.
pub struct CanvasSurface {
    name: &'static str,
    pixels: RgbaImage,
    texture: Option<TextureHandle>,
    texture_stale: bool,
}

impl CanvasSurface {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            pixels: RgbaImage::new(0, 0),
            texture: None,
            texture_stale: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.width() == 0 || self.pixels.height() == 0
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.pixels.width() as f32, self.pixels.height() as f32)
    }

    /// Swap in a freshly rendered frame.
    pub fn replace(&mut self, pixels: RgbaImage) {
        self.pixels = pixels;
        self.texture_stale = true;
    }

    fn sync_texture(&mut self, ctx: &egui::Context) {
        if self.is_empty() {
            self.texture = None;
            return;
        }
        if !self.texture_stale && self.texture.is_some() {
            return;
        }
        let image = color_image(&self.pixels);
        if let Some(ref mut tex) = self.texture {
            tex.set(image, TextureOptions::LINEAR);
        } else {
            self.texture = Some(ctx.load_texture(self.name, image, TextureOptions::LINEAR));
        }
        self.texture_stale = false;
    }

    /// Paint the surface at its pixel size over a checkerboard.
    /// Returns `None` when there is nothing to show.
    pub fn show(&mut self, ui: &mut egui::Ui, sense: Sense) -> Option<Response> {
        if self.is_empty() {
            return None;
        }
        self.sync_texture(ui.ctx());
        let (rect, response) = ui.allocate_exact_size(self.size(), sense);
        let painter = ui.painter_at(rect);
        draw_checkerboard(&painter, rect);
        if let Some(texture) = &self.texture {
            let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
            painter.image(texture.id(), rect, uv, Color32::WHITE);
        }
        Some(response)
    }
}

/// Straight-alpha RGBA buffer as an egui image.
pub fn color_image(pixels: &RgbaImage) -> ColorImage {
    ColorImage::from_rgba_unmultiplied(
        [pixels.width() as usize, pixels.height() as usize],
        pixels.as_raw(),
    )
}

/// Screen position to canvas pixels, given the canvas' top-left on screen.
pub fn to_canvas(origin: Pos2, pointer: Pos2) -> Point {
    Point::new((pointer.x - origin.x) as f64, (pointer.y - origin.y) as f64)
}

fn draw_checkerboard(painter: &egui::Painter, rect: Rect) {
    let light = Color32::from_gray(220);
    let dark = Color32::from_gray(180);
    painter.rect_filled(rect, 0.0, light);

    let cols = (rect.width() / CHECKER_SIZE).ceil() as i32;
    let rows = (rect.height() / CHECKER_SIZE).ceil() as i32;
    for row in 0..rows {
        for col in 0..cols {
            if (row + col) % 2 == 0 {
                continue;
            }
            let min = rect.min + Vec2::new(col as f32 * CHECKER_SIZE, row as f32 * CHECKER_SIZE);
            let cell = Rect::from_min_size(min, Vec2::splat(CHECKER_SIZE)).intersect(rect);
            painter.rect_filled(cell, 0.0, dark);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn color_image_keeps_straight_alpha() {
        let img = RgbaImage::from_pixel(3, 2, Rgba([200, 100, 50, 255]));
        let c = color_image(&img);
        assert_eq!(c.size, [3, 2]);
        assert_eq!(c.pixels[5], Color32::from_rgb(200, 100, 50));
    }

    #[test]
    fn pointer_maps_to_canvas_pixels() {
        let p = to_canvas(Pos2::new(100.0, 50.0), Pos2::new(90.0, 75.5));
        assert_eq!(p, Point::new(-10.0, 25.5));
    }

    #[test]
    fn new_surface_is_empty_until_replaced() {
        let mut s = CanvasSurface::new("test");
        assert!(s.is_empty());
        s.replace(RgbaImage::new(4, 4));
        assert!(!s.is_empty());
        assert_eq!(s.size(), Vec2::new(4.0, 4.0));
    }
}
