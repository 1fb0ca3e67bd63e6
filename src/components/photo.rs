use eframe::egui;
use egui::{Pos2, Rect};

use crate::canvas::{self, CanvasSurface};
use crate::ops::drag::PointerEvent;
use crate::session::Session;

/// Requests the photo tab hands back to the app.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhotoAction {
    Upload,
    Export,
}

/// Primary-button state for one frame, in screen coordinates.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointerSample {
    pub pressed: bool,
    pub down: bool,
    pub released: bool,
    pub pos: Option<Pos2>,
}

impl PointerSample {
    pub fn read(ctx: &egui::Context) -> Self {
        ctx.input(|i| Self {
            pressed: i.pointer.primary_pressed(),
            down: i.pointer.primary_down(),
            released: i.pointer.primary_released(),
            pos: i.pointer.hover_pos(),
        })
    }
}

/// Turn one frame of raw pointer state over `rect` into a drag event.
/// Leaving the canvas while dragging ends the drag, like releasing.
pub fn pointer_event(sample: PointerSample, rect: Rect, dragging: bool) -> Option<PointerEvent> {
    let inside = sample.pos.filter(|p| rect.contains(*p));
    if dragging {
        match inside {
            None => Some(PointerEvent::Leave),
            Some(_) if sample.released || !sample.down => Some(PointerEvent::Up),
            Some(p) => Some(PointerEvent::Move(canvas::to_canvas(rect.min, p))),
        }
    } else if sample.pressed {
        inside.map(|p| PointerEvent::Down(canvas::to_canvas(rect.min, p)))
    } else {
        None
    }
}

/// Photo analysis tab: upload, drag, toggle layers, export.
pub struct PhotoPanel {
    surface: CanvasSurface,
}

impl Default for PhotoPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl PhotoPanel {
    pub fn new() -> Self {
        Self {
            surface: CanvasSurface::new("golden_overlay"),
        }
    }

    /// Re-render the overlay if anything changed since the last frame.
    pub fn refresh(&mut self, session: &mut Session) {
        if session.take_overlay_dirty()
            && let Some(frame) = session.render_overlay()
        {
            self.surface.replace(frame);
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, session: &mut Session, loading: bool) -> Option<PhotoAction> {
        let mut action = None;

        ui.heading(t!("photo.heading"));
        ui.label(t!("photo.intro"));
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            if ui.button(t!("photo.upload")).clicked() {
                action = Some(PhotoAction::Upload);
            }
            let has_image = session.placement.is_some();
            if ui
                .add_enabled(has_image, egui::Button::new(t!("photo.export")))
                .clicked()
            {
                action = Some(PhotoAction::Export);
            }
            if ui
                .add_enabled(has_image, egui::Button::new(t!("photo.reset")))
                .clicked()
            {
                session.reset_position();
            }
            ui.separator();

            let mut grid = session.show_grid;
            if ui.checkbox(&mut grid, t!("photo.show_grid")).changed() {
                session.set_show_grid(grid);
            }
            let mut spiral = session.show_spiral;
            if ui.checkbox(&mut spiral, t!("photo.show_spiral")).changed() {
                session.set_show_spiral(spiral);
            }
            if loading {
                ui.spinner();
                ui.weak(t!("photo.loading"));
            }
        });

        if let Some(p) = &session.placement {
            let name = session.image_name.clone().unwrap_or_default();
            ui.weak(t!(
                "photo.image_info",
                name = name,
                width = p.natural_width,
                height = p.natural_height,
                display_width = p.display_width,
                display_height = p.display_height
            ));
        }
        ui.add_space(8.0);

        self.refresh(session);
        match self.surface.show(ui, egui::Sense::click_and_drag()) {
            Some(response) => {
                let sample = PointerSample::read(ui.ctx());
                if let Some(event) = pointer_event(sample, response.rect, session.drag.is_dragging()) {
                    session.pointer(event);
                }
                if session.drag.is_dragging() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
                    ui.ctx().request_repaint();
                } else if response.hovered() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
                }
                ui.weak(t!("photo.drag_hint"));
            }
            None => {
                ui.add_space(24.0);
                ui.label(t!("photo.empty"));
            }
        }

        ui.add_space(12.0);
        ui.label(t!("photo.tip_grid"));
        ui.label(t!("photo.tip_thirds"));
        ui.label(t!("photo.tip_focal"));

        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::geometry::Point;

    fn rect() -> Rect {
        Rect::from_min_size(Pos2::new(100.0, 100.0), egui::vec2(300.0, 200.0))
    }

    fn at(x: f32, y: f32) -> Option<Pos2> {
        Some(Pos2::new(x, y))
    }

    #[test]
    fn press_inside_starts_drag() {
        let s = PointerSample { pressed: true, down: true, pos: at(150.0, 120.0), ..Default::default() };
        assert_eq!(pointer_event(s, rect(), false), Some(PointerEvent::Down(Point::new(50.0, 20.0))));
    }

    #[test]
    fn press_outside_is_ignored() {
        let s = PointerSample { pressed: true, down: true, pos: at(10.0, 10.0), ..Default::default() };
        assert_eq!(pointer_event(s, rect(), false), None);
    }

    #[test]
    fn held_pointer_moves() {
        let s = PointerSample { down: true, pos: at(399.0, 299.0), ..Default::default() };
        assert_eq!(pointer_event(s, rect(), true), Some(PointerEvent::Move(Point::new(299.0, 199.0))));
    }

    #[test]
    fn release_and_leave_end_drag() {
        let up = PointerSample { released: true, pos: at(200.0, 200.0), ..Default::default() };
        assert_eq!(pointer_event(up, rect(), true), Some(PointerEvent::Up));
        let gone = PointerSample { down: true, pos: None, ..Default::default() };
        assert_eq!(pointer_event(gone, rect(), true), Some(PointerEvent::Leave));
        let outside = PointerSample { down: true, pos: at(500.0, 120.0), ..Default::default() };
        assert_eq!(pointer_event(outside, rect(), true), Some(PointerEvent::Leave));
    }
}
