use eframe::egui;

use crate::ops::ratio::{self, PHI};
use crate::session::Session;

/// Calculator tab: one number in, its two golden companions out.
#[derive(Default)]
pub struct CalculatorPanel;

impl CalculatorPanel {
    pub fn new() -> Self {
        Self
    }

    pub fn show(&mut self, ui: &mut egui::Ui, session: &mut Session) {
        ui.heading(t!("calc.heading"));
        ui.label(t!("calc.intro"));
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            ui.label(t!("calc.input_label"));
            let mut input = session.ratio_input.clone();
            let edit = egui::TextEdit::singleline(&mut input)
                .hint_text(t!("calc.input_hint"))
                .desired_width(160.0);
            if ui.add(edit).changed() {
                session.set_ratio_input(&input);
            }
        });

        ui.add_space(8.0);
        let result = session.ratio;
        egui::Grid::new("ratio_results")
            .num_columns(3)
            .spacing([24.0, 6.0])
            .show(ui, |ui| {
                let value = session.ratio_input.trim();
                ui.label(t!("calc.smaller"));
                ui.monospace(ratio::format_value(result.smaller));
                ui.weak(t!("calc.smaller_formula", value = value));
                ui.end_row();
                ui.label(t!("calc.larger"));
                ui.monospace(ratio::format_value(result.larger));
                ui.weak(t!("calc.larger_formula", value = value));
                ui.end_row();
            });

        if result.is_zero() && !session.ratio_input.trim().is_empty() {
            ui.weak(t!("calc.invalid"));
        }

        ui.add_space(12.0);
        ui.separator();
        ui.label(t!("calc.phi_label", value = format!("{:.12}", PHI)));
        ui.label(t!("calc.formula"));
        ui.label(t!("calc.usage"));
    }
}
