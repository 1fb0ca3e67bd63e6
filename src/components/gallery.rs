use eframe::egui;

use crate::ops::ratio::{self, PHI};

/// One famous example of the golden ratio.
#[derive(Clone, Copy, Debug)]
pub struct GalleryEntry {
    pub id: &'static str,
    pub image_url: &'static str,
}

impl GalleryEntry {
    pub fn title(&self) -> String {
        crate::i18n::translate(&format!("gallery.{}.title", self.id))
    }

    pub fn description(&self) -> String {
        crate::i18n::translate(&format!("gallery.{}.description", self.id))
    }

    pub fn ratio_label(&self) -> String {
        crate::i18n::translate(&format!("gallery.{}.ratio", self.id))
    }
}

pub const ENTRIES: &[GalleryEntry] = &[
    GalleryEntry {
        id: "parthenon",
        image_url: "https://images.unsplash.com/photo-1555993539-1732b0258235?w=400&q=80",
    },
    GalleryEntry {
        id: "mona_lisa",
        image_url: "https://images.unsplash.com/photo-1582555172866-f73bb12a2ab3?w=400&q=80",
    },
    GalleryEntry {
        id: "nautilus",
        image_url: "https://images.unsplash.com/photo-1559827260-dc66d52bef19?w=400&q=80",
    },
    GalleryEntry {
        id: "sunflower",
        image_url: "https://images.unsplash.com/photo-1470509037663-253afd7f0f51?w=400&q=80",
    },
];

/// Terms of the Fibonacci card.
const FIBONACCI_TERMS: usize = 12;

#[derive(Default)]
pub struct GalleryPanel;

impl GalleryPanel {
    pub fn new() -> Self {
        Self
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        ui.heading(t!("gallery.heading"));
        ui.add_space(8.0);

        egui::Grid::new("gallery_cards")
            .num_columns(2)
            .spacing([16.0, 16.0])
            .show(ui, |ui| {
                for (i, entry) in ENTRIES.iter().enumerate() {
                    ui.group(|ui| {
                        ui.set_width(320.0);
                        ui.strong(entry.title());
                        ui.label(entry.description());
                        ui.colored_label(egui::Color32::from_rgb(0xD4, 0xAF, 0x37), entry.ratio_label());
                        ui.hyperlink_to(t!("gallery.view_image"), entry.image_url);
                    });
                    if i % 2 == 1 {
                        ui.end_row();
                    }
                }
            });

        ui.add_space(16.0);
        ui.group(|ui| {
            ui.strong(t!("fib.heading"));
            let terms: Vec<String> = ratio::fibonacci(FIBONACCI_TERMS)
                .iter()
                .map(u64::to_string)
                .collect();
            ui.label(t!("fib.sequence", terms = terms.join(", ")));
            ui.add_space(4.0);
            ui.label(t!("fib.convergents"));
            for (n, d, r) in ratio::convergents() {
                ui.monospace(format!("{n}/{d} = {r:.6}  (Δφ = {:+.6})", r - PHI));
            }
            ui.weak(t!("fib.note"));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_entries_with_links() {
        assert_eq!(ENTRIES.len(), 4);
        for e in ENTRIES {
            assert!(e.image_url.starts_with("https://"));
        }
    }

    #[test]
    fn every_entry_is_translated() {
        crate::i18n::init();
        for e in ENTRIES {
            for text in [e.title(), e.description(), e.ratio_label()] {
                assert!(!text.starts_with("gallery."), "untranslated {}", text);
            }
        }
    }
}
