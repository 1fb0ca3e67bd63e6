// ============================================================================
// RASTERIZER — executes DrawCommands onto an RGBA buffer
// ============================================================================
//
// Strokes are rendered from signed distance fields: every pixel centre in a
// command's bounding box measures its distance to the stroke's centre line
// and converts that into anti-aliased coverage. Rows are processed in
// parallel; the result is independent of scheduling.

use image::{RgbaImage, imageops};
use rayon::prelude::*;
use std::f32::consts::TAU;

use super::geometry::{ArcSpec, DrawCommand, Point, Rect, StrokeStyle};

/// Coverage below this is treated as empty.
const MIN_COVERAGE: f32 = 0.001;
/// Arc joins closer than this are not connected by a segment.
const JOIN_EPSILON: f64 = 1e-6;

/// A stroke primitive in `f32` canvas space.
#[derive(Clone, Copy, Debug)]
enum StrokeShape {
    Segment {
        ax: f32,
        ay: f32,
        bx: f32,
        by: f32,
    },
    Arc {
        cx: f32,
        cy: f32,
        r: f32,
        start: f32,
        sweep: f32,
        /// Endpoints, used for the distance outside the swept range.
        p0: (f32, f32),
        p1: (f32, f32),
    },
}

impl StrokeShape {
    fn segment(a: Point, b: Point) -> Self {
        StrokeShape::Segment {
            ax: a.x as f32,
            ay: a.y as f32,
            bx: b.x as f32,
            by: b.y as f32,
        }
    }

    fn arc(arc: &ArcSpec) -> Self {
        let p0 = arc.start_point();
        let p1 = arc.end_point();
        StrokeShape::Arc {
            cx: arc.center.x as f32,
            cy: arc.center.y as f32,
            r: arc.radius as f32,
            start: arc.start as f32,
            sweep: arc.sweep() as f32,
            p0: (p0.x as f32, p0.y as f32),
            p1: (p1.x as f32, p1.y as f32),
        }
    }

    /// `(min_x, min_y, max_x, max_y)` of the centre line.
    fn bounds(&self) -> (f32, f32, f32, f32) {
        match *self {
            StrokeShape::Segment { ax, ay, bx, by } => (ax.min(bx), ay.min(by), ax.max(bx), ay.max(by)),
            StrokeShape::Arc { cx, cy, r, .. } => (cx - r, cy - r, cx + r, cy + r),
        }
    }

    /// Unsigned distance from (px, py) to the centre line.
    #[inline]
    fn distance(&self, px: f32, py: f32) -> f32 {
        match *self {
            StrokeShape::Segment { ax, ay, bx, by } => sdf_line_segment(px, py, ax, ay, bx, by),
            StrokeShape::Arc {
                cx,
                cy,
                r,
                start,
                sweep,
                p0,
                p1,
            } => {
                let dx = px - cx;
                let dy = py - cy;
                let rel = (dy.atan2(dx) - start).rem_euclid(TAU);
                if sweep >= TAU || rel <= sweep {
                    ((dx * dx + dy * dy).sqrt() - r).abs()
                } else {
                    let d0 = ((px - p0.0).powi(2) + (py - p0.1).powi(2)).sqrt();
                    let d1 = ((px - p1.0).powi(2) + (py - p1.1).powi(2)).sqrt();
                    d0.min(d1)
                }
            }
        }
    }
}

/// Distance to a line segment (degenerate segments measure to the point).
#[inline]
fn sdf_line_segment(px: f32, py: f32, ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let dx = bx - ax;
    let dy = by - ay;
    let len2 = dx * dx + dy * dy;
    let t = if len2 > 0.0 {
        (((px - ax) * dx + (py - ay) * dy) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let cx = ax + t * dx;
    let cy = ay + t * dy;
    ((px - cx) * (px - cx) + (py - cy) * (py - cy)).sqrt()
}

/// Smoothstep between edge0 and edge1.
#[inline]
fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Source-over composite of `color` at `coverage` onto one straight-alpha pixel.
#[inline]
fn blend_over(dst: &mut [u8], color: [u8; 4], coverage: f32) {
    let sa = color[3] as f32 / 255.0 * coverage;
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return;
    }
    for c in 0..3 {
        let s = color[c] as f32;
        let d = dst[c] as f32;
        dst[c] = ((s * sa + d * da * (1.0 - sa)) / out_a).round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Stroke the union of `shapes` as one path: each pixel takes its distance to
/// the nearest shape and is composited once.
fn stroke_union(target: &mut RgbaImage, shapes: &[StrokeShape], style: StrokeStyle) {
    let (w, h) = target.dimensions();
    if shapes.is_empty() || w == 0 || h == 0 || style.width <= 0.0 {
        return;
    }

    let half = style.width * 0.5;
    let pad = half + 2.0;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (f32::MAX, f32::MAX, f32::MIN, f32::MIN);
    for s in shapes {
        let (a, b, c, d) = s.bounds();
        min_x = min_x.min(a);
        min_y = min_y.min(b);
        max_x = max_x.max(c);
        max_y = max_y.max(d);
    }
    if !(min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite()) {
        return;
    }

    // Clamp to canvas
    let x0 = ((min_x - pad).floor() as i64).max(0) as usize;
    let y0 = ((min_y - pad).floor() as i64).max(0) as usize;
    let x1 = ((max_x + pad).ceil() as i64).min(w as i64).max(0) as usize;
    let y1 = ((max_y + pad).ceil() as i64).min(h as i64).max(0) as usize;
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let row_bytes = w as usize * 4;
    let color = style.color;
    let pixels: &mut [u8] = target;

    pixels
        .par_chunks_mut(row_bytes)
        .enumerate()
        .skip(y0)
        .take(y1 - y0)
        .for_each(|(row, row_buf)| {
            let py = row as f32 + 0.5;
            for col in x0..x1 {
                let px = col as f32 + 0.5;
                let d = shapes
                    .iter()
                    .map(|s| s.distance(px, py))
                    .fold(f32::MAX, f32::min);
                let coverage = smoothstep(0.5, -0.5, d - half);
                if coverage > MIN_COVERAGE {
                    let idx = col * 4;
                    blend_over(&mut row_buf[idx..idx + 4], color, coverage);
                }
            }
        });
}

fn rect_shapes(rect: &Rect) -> Vec<StrokeShape> {
    rect.edges()
        .iter()
        .map(|&(a, b)| StrokeShape::segment(a, b))
        .collect()
}

/// Arcs plus the straight joins a 2D-canvas path inserts between them.
fn path_shapes(arcs: &[ArcSpec]) -> Vec<StrokeShape> {
    let mut shapes = Vec::with_capacity(arcs.len() * 2);
    for (i, arc) in arcs.iter().enumerate() {
        if i > 0 {
            let prev_end = arcs[i - 1].end_point();
            let start = arc.start_point();
            if prev_end.distance(start) > JOIN_EPSILON {
                shapes.push(StrokeShape::segment(prev_end, start));
            }
        }
        shapes.push(StrokeShape::arc(arc));
    }
    shapes
}

/// Paint `source` at (x, y), scaled to `width` × `height` when it is not
/// already that size. Off-surface parts are dropped.
fn blit(target: &mut RgbaImage, source: &RgbaImage, x: f64, y: f64, width: u32, height: u32) {
    if width == 0 || height == 0 || !x.is_finite() || !y.is_finite() {
        return;
    }
    let scaled;
    let src = if source.dimensions() == (width, height) {
        source
    } else {
        scaled = imageops::resize(source, width, height, imageops::FilterType::Triangle);
        &scaled
    };

    let (tw, th) = target.dimensions();
    let (ox, oy) = (x.round() as i64, y.round() as i64);
    let x0 = ox.max(0);
    let y0 = oy.max(0);
    let x1 = ox.saturating_add(width as i64).min(tw as i64);
    let y1 = oy.saturating_add(height as i64).min(th as i64);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let row_bytes = tw as usize * 4;
    let pixels: &mut [u8] = target;
    pixels
        .par_chunks_mut(row_bytes)
        .enumerate()
        .skip(y0 as usize)
        .take((y1 - y0) as usize)
        .for_each(|(row, row_buf)| {
            let sy = (row as i64 - oy) as u32;
            for col in x0..x1 {
                let sx = (col - ox) as u32;
                let idx = col as usize * 4;
                blend_over(&mut row_buf[idx..idx + 4], src.get_pixel(sx, sy).0, 1.0);
            }
        });
}

/// Execute `commands` in order onto `target`.
///
/// `source` is the raster used by [`DrawCommand::Blit`]; blits are skipped
/// when it is `None`. A zero-sized target is left untouched.
pub fn execute(target: &mut RgbaImage, commands: &[DrawCommand], source: Option<&RgbaImage>) {
    if target.width() == 0 || target.height() == 0 {
        return;
    }
    for cmd in commands {
        match cmd {
            DrawCommand::Clear => {
                let pixels: &mut [u8] = &mut *target;
                pixels.fill(0);
            }
            DrawCommand::Blit {
                x,
                y,
                width,
                height,
            } => {
                if let Some(src) = source {
                    blit(target, src, *x, *y, *width, *height);
                }
            }
            DrawCommand::StrokeRect { rect, style } => {
                stroke_union(target, &rect_shapes(rect), *style);
            }
            DrawCommand::Line { from, to, style } => {
                stroke_union(target, &[StrokeShape::segment(*from, *to)], *style);
            }
            DrawCommand::Path { arcs, style } => {
                stroke_union(target, &path_shapes(arcs), *style);
            }
        }
    }
}

/// Allocate a `width` × `height` surface and execute `commands` on it.
pub fn render_to_image(
    width: u32,
    height: u32,
    commands: &[DrawCommand],
    source: Option<&RgbaImage>,
) -> RgbaImage {
    let mut img = RgbaImage::new(width, height);
    execute(&mut img, commands, source);
    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const GOLD: StrokeStyle = StrokeStyle::new([0xD4, 0xAF, 0x37, 255], 3.0);

    #[test]
    fn horizontal_line_covers_its_row() {
        let cmds = [DrawCommand::Line {
            from: Point::new(0.0, 10.5),
            to: Point::new(40.0, 10.5),
            style: GOLD,
        }];
        let img = render_to_image(40, 20, &cmds, None);
        assert_eq!(img.get_pixel(20, 10)[3], 255);
        assert_eq!(img.get_pixel(20, 10)[0], 0xD4);
        assert_eq!(img.get_pixel(20, 2)[3], 0);
        assert_eq!(img.get_pixel(20, 18)[3], 0);
    }

    #[test]
    fn arc_stroke_stays_on_its_quarter() {
        let arc = ArcSpec::quarter(Point::new(50.0, 50.0), 30.0, 0.0);
        let cmds = [DrawCommand::Path {
            arcs: vec![arc],
            style: GOLD,
        }];
        let img = render_to_image(100, 100, &cmds, None);
        // 45° point of the 0→π/2 quarter (down-right on screen).
        let p = arc.point_at(std::f64::consts::FRAC_PI_4);
        assert!(img.get_pixel(p.x as u32, p.y as u32)[3] > 200);
        // Opposite quarter stays empty.
        assert_eq!(img.get_pixel(29, 29)[3], 0);
    }

    #[test]
    fn path_joins_disjoint_arcs() {
        let a = ArcSpec::quarter(Point::new(20.0, 20.0), 10.0, 0.0);
        let b = ArcSpec::quarter(Point::new(80.0, 20.0), 10.0, 0.0);
        let shapes = path_shapes(&[a, b]);
        assert_eq!(shapes.len(), 3);
        let joined = path_shapes(&[a, ArcSpec::quarter(Point::new(20.0, 20.0), 10.0, std::f64::consts::FRAC_PI_2)]);
        assert_eq!(joined.len(), 2);
    }

    #[test]
    fn blit_honours_negative_offsets() {
        let src = RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]));
        let cmds = [
            DrawCommand::Clear,
            DrawCommand::Blit {
                x: -5.0,
                y: -5.0,
                width: 10,
                height: 10,
            },
        ];
        let img = render_to_image(10, 10, &cmds, Some(&src));
        assert_eq!(*img.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*img.get_pixel(4, 4), Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(5, 5)[3], 0);
    }

    #[test]
    fn blit_fully_off_surface_draws_nothing() {
        let src = RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]));
        let cmds = [DrawCommand::Blit {
            x: 5000.0,
            y: -5000.0,
            width: 10,
            height: 10,
        }];
        let img = render_to_image(10, 10, &cmds, Some(&src));
        assert!(img.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn clear_resets_previous_frame() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 4]));
        execute(&mut img, &[DrawCommand::Clear], None);
        assert!(img.pixels().all(|p| *p == Rgba([0, 0, 0, 0])));
    }

    #[test]
    fn zero_sized_target_is_noop() {
        let mut img = RgbaImage::new(0, 0);
        execute(&mut img, &[DrawCommand::Clear], None);
        assert_eq!(img.dimensions(), (0, 0));
    }

    #[test]
    fn blend_half_coverage_on_transparent() {
        let mut px = [0u8, 0, 0, 0];
        blend_over(&mut px, [200, 100, 50, 255], 0.5);
        assert_eq!(px, [200, 100, 50, 128]);
    }
}
