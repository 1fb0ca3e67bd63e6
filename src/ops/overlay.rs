// ============================================================================
// GOLDEN OVERLAY — section grid, nested squares and spiral for a photo canvas
// ============================================================================

use super::geometry::{Anchor, ArcSpec, DrawCommand, Point, Rect, StrokeStyle};
use super::ratio::PHI;

/// When the nested-square recursion stops.
///
/// The walk keeps descending while the current square is wider than
/// `descend_above`, then permits one trailing level as long as that square
/// is wider than `trailing_above`. It never produces more than `max_depth`
/// squares.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NestingRule {
    pub descend_above: f64,
    pub trailing_above: f64,
    pub max_depth: usize,
}

impl Default for NestingRule {
    fn default() -> Self {
        Self {
            descend_above: 40.0,
            trailing_above: 20.0,
            max_depth: 3,
        }
    }
}

/// The top-level golden split of a `width` × `height` surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GoldenSections {
    pub width: f64,
    pub height: f64,
    pub left_width: f64,
    pub right_width: f64,
    pub top_height: f64,
    pub bottom_height: f64,
}

impl GoldenSections {
    pub fn new(width: f64, height: f64) -> Self {
        let left_width = width / PHI;
        let top_height = height / PHI;
        Self {
            width,
            height,
            left_width,
            right_width: width - left_width,
            top_height,
            bottom_height: height - top_height,
        }
    }

    /// Where the two section lines cross.
    pub fn focal_point(&self) -> Point {
        Point::new(self.left_width, self.top_height)
    }

    /// Straight guide lines: both section lines, then the diagonals of the
    /// top-left and bottom-right quadrants.
    pub fn guide_lines(&self) -> [(Point, Point); 4] {
        let focal = self.focal_point();
        [
            (
                Point::new(self.left_width, 0.0),
                Point::new(self.left_width, self.height),
            ),
            (
                Point::new(0.0, self.top_height),
                Point::new(self.width, self.top_height),
            ),
            (Point::new(0.0, 0.0), focal),
            (focal, Point::new(self.width, self.height)),
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NestedSquare {
    pub rect: Rect,
    pub anchor: Anchor,
    /// 1-based recursion level.
    pub depth: usize,
}

impl NestedSquare {
    pub fn side(&self) -> f64 {
        self.rect.w
    }

    /// Quarter arc inscribed in this square for the spiral.
    pub fn arc(&self) -> ArcSpec {
        ArcSpec::quarter(
            self.anchor.arc_center(&self.rect),
            self.side(),
            self.anchor.arc_start(),
        )
    }
}

/// Nested squares walking clockwise inward through the right-hand column.
///
/// Level 1 sits at the top-right quadrant's origin with side
/// `min(right_width, top_height)`; each later level has side `previous / φ`
/// and is pressed against the next side of the space left over by the
/// previous carve.
pub fn nested_squares(sections: &GoldenSections, rule: &NestingRule) -> Vec<NestedSquare> {
    let mut side = sections.right_width.min(sections.top_height);
    if side <= 0.0 || rule.max_depth == 0 {
        return Vec::new();
    }

    let mut remaining = Rect::new(
        sections.left_width,
        0.0,
        sections.right_width,
        sections.height,
    );
    let mut anchor = Anchor::Top;
    let mut squares = Vec::with_capacity(rule.max_depth);
    let mut trailing_used = false;

    loop {
        let (rect, rest) = anchor.carve(&remaining, side);
        squares.push(NestedSquare {
            rect,
            anchor,
            depth: squares.len() + 1,
        });
        if squares.len() >= rule.max_depth {
            break;
        }

        let next = side / PHI;
        if side > rule.descend_above {
            // keep descending
        } else if !trailing_used && next > rule.trailing_above {
            trailing_used = true;
        } else {
            break;
        }

        remaining = rest;
        anchor = anchor.next();
        side = next;
    }
    squares
}

/// The main arc sweeping the left section, followed by one arc per square.
pub fn spiral_arcs(sections: &GoldenSections, squares: &[NestedSquare]) -> Vec<ArcSpec> {
    let main_radius = sections.left_width.min(sections.height);
    if main_radius <= 0.0 {
        return Vec::new();
    }
    let mut arcs = Vec::with_capacity(squares.len() + 1);
    arcs.push(ArcSpec::quarter(
        Point::new(sections.left_width, sections.height),
        main_radius,
        Anchor::Left.arc_start(),
    ));
    arcs.extend(squares.iter().map(NestedSquare::arc));
    arcs
}

/// Everything derived from the display size. Recomputed on every redraw.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayGeometry {
    pub sections: GoldenSections,
    pub squares: Vec<NestedSquare>,
    pub arcs: Vec<ArcSpec>,
}

impl OverlayGeometry {
    pub fn compute(width: f64, height: f64, rule: &NestingRule) -> Self {
        let sections = GoldenSections::new(width, height);
        let squares = nested_squares(&sections, rule);
        let arcs = spiral_arcs(&sections, &squares);
        Self {
            sections,
            squares,
            arcs,
        }
    }
}

/// What one overlay redraw needs to know.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayParams {
    pub display_width: u32,
    pub display_height: u32,
    pub offset_x: f64,
    pub offset_y: f64,
    pub show_grid: bool,
    pub show_spiral: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayStyle {
    pub grid: StrokeStyle,
    pub spiral: StrokeStyle,
    pub nesting: NestingRule,
}

/// Draw commands for one overlay frame: image, then grid, then spiral.
/// A zero-sized surface produces no commands at all.
pub fn render_overlay(params: &OverlayParams, style: &OverlayStyle) -> Vec<DrawCommand> {
    if params.display_width == 0 || params.display_height == 0 {
        return Vec::new();
    }
    let w = params.display_width as f64;
    let h = params.display_height as f64;
    let geometry = OverlayGeometry::compute(w, h, &style.nesting);

    let mut cmds = vec![
        DrawCommand::Clear,
        DrawCommand::Blit {
            x: params.offset_x,
            y: params.offset_y,
            width: params.display_width,
            height: params.display_height,
        },
    ];

    if params.show_grid {
        cmds.push(DrawCommand::StrokeRect {
            rect: Rect::new(0.0, 0.0, w, h),
            style: style.grid,
        });
        for (from, to) in geometry.sections.guide_lines() {
            cmds.push(DrawCommand::Line {
                from,
                to,
                style: style.grid,
            });
        }
        for square in &geometry.squares {
            cmds.push(DrawCommand::StrokeRect {
                rect: square.rect,
                style: style.grid,
            });
        }
    }

    if params.show_spiral && !geometry.arcs.is_empty() {
        cmds.push(DrawCommand::Path {
            arcs: geometry.arcs,
            style: style.spiral,
        });
    }

    cmds
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn style() -> OverlayStyle {
        OverlayStyle {
            grid: StrokeStyle::new([0x33, 0x33, 0x33, 255], 1.5),
            spiral: StrokeStyle::new([0xD4, 0xAF, 0x37, 255], 2.5),
            nesting: NestingRule::default(),
        }
    }

    fn params(w: u32, h: u32, grid: bool, spiral: bool) -> OverlayParams {
        OverlayParams {
            display_width: w,
            display_height: h,
            offset_x: 0.0,
            offset_y: 0.0,
            show_grid: grid,
            show_spiral: spiral,
        }
    }

    #[test]
    fn sections_split_at_phi() {
        let s = GoldenSections::new(900.0, 600.0);
        assert!((s.left_width * PHI - 900.0).abs() < 1e-9);
        assert!((s.top_height * PHI - 600.0).abs() < 1e-9);
        assert!((s.left_width + s.right_width - 900.0).abs() < 1e-9);
        assert!((s.top_height + s.bottom_height - 600.0).abs() < 1e-9);
    }

    #[test]
    fn first_square_at_top_right_origin() {
        let s = GoldenSections::new(900.0, 600.0);
        let squares = nested_squares(&s, &NestingRule::default());
        let first = squares[0];
        assert_eq!(first.depth, 1);
        assert!((first.rect.x - s.left_width).abs() < 1e-9);
        assert_eq!(first.rect.y, 0.0);
        assert!((first.side() - s.right_width.min(s.top_height)).abs() < 1e-9);
    }

    #[test]
    fn nesting_never_exceeds_three_levels() {
        for (w, h) in [(100, 100), (900, 600), (900, 700), (5000, 5000), (120, 700)] {
            let s = GoldenSections::new(w as f64, h as f64);
            let squares = nested_squares(&s, &NestingRule::default());
            assert!(squares.len() <= 3, "{}x{}", w, h);
        }
    }

    #[test]
    fn at_least_two_levels_from_100px() {
        for w in (100..=900).step_by(37) {
            for h in (100..=700).step_by(29) {
                let s = GoldenSections::new(w as f64, h as f64);
                let squares = nested_squares(&s, &NestingRule::default());
                assert!(squares.len() >= 2, "{}x{} -> {}", w, h, squares.len());
            }
        }
    }

    #[test]
    fn tiny_surface_stops_after_first_square() {
        let s = GoldenSections::new(40.0, 40.0);
        let squares = nested_squares(&s, &NestingRule::default());
        assert_eq!(squares.len(), 1);
    }

    #[test]
    fn squares_shrink_by_phi_and_rotate_anchor() {
        let s = GoldenSections::new(900.0, 600.0);
        let squares = nested_squares(&s, &NestingRule::default());
        assert_eq!(squares.len(), 3);
        assert_eq!(squares[0].anchor, Anchor::Top);
        assert_eq!(squares[1].anchor, Anchor::Right);
        assert_eq!(squares[2].anchor, Anchor::Bottom);
        for pair in squares.windows(2) {
            assert!((pair[0].side() / pair[1].side() - PHI).abs() < 1e-9);
        }
        // Second square hugs the right edge just under the first one.
        assert!((squares[1].rect.right() - 900.0).abs() < 1e-9);
        assert!((squares[1].rect.y - squares[0].side()).abs() < 1e-9);
    }

    #[test]
    fn spiral_is_continuous_on_a_golden_frame() {
        // A golden frame with an exactly golden right column.
        let h = 400.0;
        let w = h * PHI;
        let g = OverlayGeometry::compute(w, h, &NestingRule::default());
        for pair in g.arcs.windows(2) {
            let gap = pair[0].end_point().distance(pair[1].start_point());
            assert!(gap < 1e-6, "gap {}", gap);
        }
    }

    #[test]
    fn every_spiral_arc_is_a_quarter() {
        let g = OverlayGeometry::compute(900.0, 600.0, &NestingRule::default());
        assert_eq!(g.arcs.len(), g.squares.len() + 1);
        for arc in &g.arcs {
            assert!((arc.sweep() - FRAC_PI_2).abs() < 1e-12);
        }
    }

    #[test]
    fn draw_order_image_grid_spiral() {
        let cmds = render_overlay(&params(900, 600, true, true), &style());
        assert_eq!(cmds[0], DrawCommand::Clear);
        assert!(matches!(cmds[1], DrawCommand::Blit { .. }));
        assert!(matches!(cmds.last(), Some(DrawCommand::Path { .. })));
        let grid_count = cmds
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. } | DrawCommand::StrokeRect { .. }))
            .count();
        // border + 4 guide lines + 3 squares
        assert_eq!(grid_count, 8);
    }

    #[test]
    fn toggles_remove_layers() {
        let none = render_overlay(&params(900, 600, false, false), &style());
        assert_eq!(none.len(), 2);
        let spiral_only = render_overlay(&params(900, 600, false, true), &style());
        assert_eq!(spiral_only.len(), 3);
        let grid_only = render_overlay(&params(900, 600, true, false), &style());
        assert!(!grid_only.iter().any(|c| matches!(c, DrawCommand::Path { .. })));
    }

    #[test]
    fn blit_keeps_unclamped_offset() {
        let mut p = params(300, 200, false, false);
        p.offset_x = -450.0;
        p.offset_y = 9000.5;
        let cmds = render_overlay(&p, &style());
        assert_eq!(
            cmds[1],
            DrawCommand::Blit {
                x: -450.0,
                y: 9000.5,
                width: 300,
                height: 200
            }
        );
    }

    #[test]
    fn zero_surface_is_noop() {
        assert!(render_overlay(&params(0, 600, true, true), &style()).is_empty());
    }
}
