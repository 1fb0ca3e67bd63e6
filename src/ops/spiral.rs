// ============================================================================
// GOLDEN SPIRAL DIAGRAM — nested rectangles + 7 quarter arcs
// ============================================================================
//
// The two layers run separate recurrences that do not agree with each other;
// the arcs are not inscribed in the rectangles. Both are kept as explicit,
// independent passes so the diagram matches the reference rendering.

use std::f64::consts::FRAC_PI_2;

use super::geometry::{ArcSpec, DrawCommand, Point, Rect, StrokeStyle};
use super::ratio::PHI;

/// Iterations of the rectangle-carving pass.
pub const DIAGRAM_RECTS: usize = 8;
/// Arcs in the spiral pass.
pub const DIAGRAM_ARCS: usize = 7;
/// Starting square side as a fraction of the shorter canvas edge.
const INITIAL_FILL: f64 = 0.8;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpiralDiagram {
    pub rects: Vec<Rect>,
    pub arcs: Vec<ArcSpec>,
}

/// Build both diagram layers for a `width` × `height` surface.
/// A surface with a non-positive edge yields an empty diagram.
pub fn spiral_diagram(width: f64, height: f64) -> SpiralDiagram {
    if width <= 0.0 || height <= 0.0 {
        return SpiralDiagram::default();
    }
    SpiralDiagram {
        rects: carve_rectangles(width, height),
        arcs: spiral_arcs(width, height),
    }
}

/// Centred starting square: `(x, y, size)`.
fn initial_square(width: f64, height: f64) -> (f64, f64, f64) {
    let size = width.min(height) * INITIAL_FILL;
    (width / 2.0 - size / 2.0, height / 2.0 - size / 2.0, size)
}

fn carve_rectangles(width: f64, height: f64) -> Vec<Rect> {
    let (mut x, mut y, mut size) = initial_square(width, height);
    let mut rects = Vec::with_capacity(DIAGRAM_RECTS);

    for i in 0..DIAGRAM_RECTS {
        rects.push(Rect::new(x, y, size, size / PHI));

        let next = size / PHI;
        x += size - next;
        size = next;
        // Even iterations also step down by the *new* size.
        if i % 2 == 0 {
            y += size;
        }
    }
    rects
}

fn spiral_arcs(width: f64, height: f64) -> Vec<ArcSpec> {
    let (mut x, mut y, mut size) = initial_square(width, height);
    let mut arcs = Vec::with_capacity(DIAGRAM_ARCS);

    for i in 0..DIAGRAM_ARCS {
        let radius = size / PHI;
        let start = (i % 4) as f64 * FRAC_PI_2;

        let center = match i % 4 {
            0 => Point::new(x + size, y + size / PHI),
            1 => Point::new(x + size - radius, y),
            2 => Point::new(x, y + radius),
            _ => Point::new(x + radius, y + size / PHI),
        };
        arcs.push(ArcSpec::quarter(center, radius, start));

        let next = size / PHI;
        match i % 4 {
            0 => x += size - next,
            1 => y += size / PHI - next,
            2 => {}
            _ => y += size / PHI,
        }
        size = next;
    }
    arcs
}

impl SpiralDiagram {
    /// Total angle swept by the arc layer.
    pub fn total_sweep(&self) -> f64 {
        self.arcs.iter().map(ArcSpec::sweep).sum()
    }

    /// Draw commands: clear, rectangles, then the arc path on top.
    pub fn commands(&self, rect_style: StrokeStyle, arc_style: StrokeStyle) -> Vec<DrawCommand> {
        let mut cmds = Vec::with_capacity(self.rects.len() + 2);
        cmds.push(DrawCommand::Clear);
        cmds.extend(self.rects.iter().map(|&rect| DrawCommand::StrokeRect {
            rect,
            style: rect_style,
        }));
        if !self.arcs.is_empty() {
            cmds.push(DrawCommand::Path {
                arcs: self.arcs.clone(),
                style: arc_style,
            });
        }
        cmds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn layer_counts() {
        let d = spiral_diagram(600.0, 400.0);
        assert_eq!(d.rects.len(), DIAGRAM_RECTS);
        assert_eq!(d.arcs.len(), DIAGRAM_ARCS);
    }

    #[test]
    fn total_sweep_is_seven_quarters() {
        let d = spiral_diagram(600.0, 400.0);
        for arc in &d.arcs {
            assert!((arc.sweep() - FRAC_PI_2).abs() < 1e-12);
        }
        assert!((d.total_sweep() - 7.0 * PI / 2.0).abs() < 1e-9);
    }

    #[test]
    fn first_rectangle_is_centred_golden() {
        let d = spiral_diagram(600.0, 400.0);
        let r = d.rects[0];
        assert!((r.x - 140.0).abs() < 1e-9);
        assert!((r.y - 40.0).abs() < 1e-9);
        assert!((r.w - 320.0).abs() < 1e-9);
        assert!((r.w / r.h - PHI).abs() < 1e-9);
    }

    #[test]
    fn rectangle_walk_alternates_vertical_shift() {
        let d = spiral_diagram(600.0, 400.0);
        // Odd iterations only move horizontally, so rect[i+1].y == rect[i].y
        // whenever i is odd.
        for i in (1..DIAGRAM_RECTS - 1).step_by(2) {
            assert!((d.rects[i + 1].y - d.rects[i].y).abs() < 1e-9, "i = {}", i);
        }
        assert!((d.rects[1].y - (d.rects[0].y + d.rects[1].w)).abs() < 1e-9);
    }

    #[test]
    fn arc_table_positions() {
        let d = spiral_diagram(600.0, 400.0);
        let size = 320.0;
        let (x, y) = (140.0, 40.0);
        let a0 = d.arcs[0];
        assert!((a0.center.x - (x + size)).abs() < 1e-9);
        assert!((a0.center.y - (y + size / PHI)).abs() < 1e-9);
        assert!((a0.radius - size / PHI).abs() < 1e-9);
        assert_eq!(a0.start, 0.0);

        let x1 = x + size - size / PHI;
        let s1 = size / PHI;
        let a1 = d.arcs[1];
        assert!((a1.center.x - (x1 + s1 - s1 / PHI)).abs() < 1e-9);
        assert!((a1.center.y - y).abs() < 1e-9);
        assert!((a1.start - FRAC_PI_2).abs() < 1e-12);
        assert!((d.arcs[4].start - 0.0).abs() < 1e-12);
    }

    #[test]
    fn radii_shrink_by_phi() {
        let d = spiral_diagram(600.0, 400.0);
        for pair in d.arcs.windows(2) {
            assert!((pair[0].radius / pair[1].radius - PHI).abs() < 1e-9);
        }
    }

    #[test]
    fn degenerate_surface_is_empty() {
        assert_eq!(spiral_diagram(0.0, 400.0), SpiralDiagram::default());
        assert!(spiral_diagram(-1.0, -1.0).commands(
            StrokeStyle::new([0; 4], 1.0),
            StrokeStyle::new([0; 4], 1.0)
        ).len() == 1);
    }
}
