// ============================================================================
// DRAG STATE MACHINE — Idle ⇄ Dragging for the overlay image
// ============================================================================

use super::geometry::Point;

/// Pointer input relevant to dragging, in canvas-relative pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up,
    Leave,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    /// `grab` is the pointer position minus the image origin at pointer-down.
    Dragging { grab: Point },
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging { .. })
    }

    /// Advance the machine. Returns the new image origin when `event` moves
    /// the image, `None` otherwise. `origin` is the current image origin.
    pub fn handle(&mut self, event: PointerEvent, origin: Point) -> Option<Point> {
        match (*self, event) {
            (_, PointerEvent::Down(p)) => {
                *self = DragState::Dragging {
                    grab: Point::new(p.x - origin.x, p.y - origin.y),
                };
                None
            }
            (DragState::Dragging { grab }, PointerEvent::Move(p)) => {
                Some(Point::new(p.x - grab.x, p.y - grab.y))
            }
            (DragState::Idle, PointerEvent::Move(_)) => None,
            (_, PointerEvent::Up | PointerEvent::Leave) => {
                *self = DragState::Idle;
                None
            }
        }
    }
}
