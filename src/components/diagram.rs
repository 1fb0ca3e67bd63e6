use eframe::egui;

use crate::canvas::CanvasSurface;
use crate::io::ExportKind;
use crate::session::Session;

/// Static spiral diagram, rendered once and kept as a texture.
pub struct DiagramPanel {
    surface: CanvasSurface,
}

impl Default for DiagramPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagramPanel {
    pub fn new() -> Self {
        Self {
            surface: CanvasSurface::new("golden_spiral_diagram"),
        }
    }

    /// Returns `Some(ExportKind::Diagram)` when the user asked for a PNG.
    pub fn show(&mut self, ui: &mut egui::Ui, session: &Session) -> Option<ExportKind> {
        if self.surface.is_empty() {
            self.surface.replace(session.render_diagram());
            crate::log_info!(
                "Rendered spiral diagram {}x{}",
                session.config.diagram_width,
                session.config.diagram_height
            );
        }

        ui.heading(t!("diagram.heading"));
        ui.label(t!("diagram.caption"));
        ui.add_space(8.0);
        self.surface.show(ui, egui::Sense::hover());
        ui.weak(t!("diagram.note"));
        ui.add_space(8.0);

        ui.button(t!("diagram.export"))
            .clicked()
            .then_some(ExportKind::Diagram)
    }
}
