use crate::components::calculator::CalculatorPanel;
use crate::components::diagram::DiagramPanel;
use crate::components::gallery::GalleryPanel;
use crate::components::photo::{PhotoAction, PhotoPanel};
use crate::config::RenderConfig;
use crate::io::{ExportKind, FileHandler, LoadError};
use crate::ops::placement::ImagePlacement;
use crate::session::{Session, UploadOutcome};
use eframe::egui;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// How long a notice stays on screen, in seconds.
const NOTICE_SECONDS: f64 = 4.0;

// ============================================================================
// ASYNC IO PIPELINE — background decode / export with channel completion
// ============================================================================

/// Result delivered from a background IO thread.
pub enum IoResult {
    /// A decode finished and the display raster is already fitted. `token`
    /// is compared against the session's pending uploads before install.
    ImageLoaded {
        token: u64,
        path: PathBuf,
        result: Result<ImagePlacement, LoadError>,
    },
    ExportComplete {
        path: PathBuf,
    },
    ExportFailed {
        path: PathBuf,
        error: String,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Calculator,
    Visualization,
    Photo,
    Gallery,
}

impl Tab {
    const ALL: [Tab; 4] = [Tab::Calculator, Tab::Visualization, Tab::Photo, Tab::Gallery];

    fn label(self) -> String {
        match self {
            Tab::Calculator => t!("tab.calculator"),
            Tab::Visualization => t!("tab.visualization"),
            Tab::Photo => t!("tab.photo"),
            Tab::Gallery => t!("tab.gallery"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NoticeKind {
    Info,
    Error,
}

struct Notice {
    text: String,
    kind: NoticeKind,
    shown_at: f64,
}

pub struct GoldenFEApp {
    session: Session,
    tab: Tab,
    file_handler: FileHandler,

    // UI Components
    calculator: CalculatorPanel,
    diagram: DiagramPanel,
    photo: PhotoPanel,
    gallery: GalleryPanel,

    io_sender: mpsc::Sender<IoResult>,
    io_receiver: mpsc::Receiver<IoResult>,
    pending_uploads: usize,

    notices: Vec<Notice>,
    language: String,
}

impl GoldenFEApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: RenderConfig) -> Self {
        let language = crate::i18n::resolve_language(&config.language);
        crate::i18n::set_language(&language);

        let session = Session::new(config);
        crate::log_info!("Session {} started (language: {})", session.id, language);

        let (io_sender, io_receiver) = mpsc::channel();
        Self {
            session,
            tab: Tab::default(),
            file_handler: FileHandler::new(),
            calculator: CalculatorPanel::new(),
            diagram: DiagramPanel::new(),
            photo: PhotoPanel::new(),
            gallery: GalleryPanel::new(),
            io_sender,
            io_receiver,
            pending_uploads: 0,
            notices: Vec::new(),
            language,
        }
    }

    fn notify(&mut self, text: String, kind: NoticeKind, now: f64) {
        self.notices.push(Notice {
            text,
            kind,
            shown_at: now,
        });
    }

    /// Decode and fit `path` on the rayon pool. Only the newest upload may
    /// land. Non-images are turned away here and never take a token.
    fn start_upload(&mut self, path: PathBuf, now: f64) {
        if let Err(e) = crate::io::sniff_path(&path) {
            self.report_rejected(&path, e, now);
            return;
        }
        let token = self.session.begin_upload();
        let (max_w, max_h) = self.session.display_box();
        let sender = self.io_sender.clone();
        self.pending_uploads += 1;
        crate::log_info!("Upload #{} started: {}", token, path.display());
        rayon::spawn(move || {
            let result = crate::io::load_path(&path)
                .map(|image| ImagePlacement::new(&image, max_w, max_h));
            let _ = sender.send(IoResult::ImageLoaded {
                token,
                path,
                result,
            });
        });
    }

    fn report_rejected(&mut self, path: &Path, error: LoadError, now: f64) {
        match error {
            LoadError::NotAnImage => {
                crate::log_warn!("Rejected non-image upload: {}", path.display());
                self.notify(t!("notice.not_image"), NoticeKind::Error, now);
            }
            e => {
                crate::log_err!("Failed to load {}: {}", path.display(), e);
                self.notify(t!("notice.load_failed", error = e), NoticeKind::Error, now);
            }
        }
    }

    fn export(&mut self, kind: ExportKind) {
        let image = match kind {
            ExportKind::Diagram => Some(self.session.render_diagram()),
            ExportKind::Overlay => self.session.render_overlay(),
        };
        let Some(image) = image else { return };
        let Some(path) = self.file_handler.pick_export_path(kind) else { return };

        let sender = self.io_sender.clone();
        rayon::spawn(move || match crate::io::write_export(&image, &path) {
            Ok(()) => {
                let _ = sender.send(IoResult::ExportComplete { path });
            }
            Err(e) => {
                let _ = sender.send(IoResult::ExportFailed {
                    path,
                    error: e.to_string(),
                });
            }
        });
    }

    fn poll_io(&mut self, ctx: &egui::Context, now: f64) {
        while let Ok(result) = self.io_receiver.try_recv() {
            match result {
                IoResult::ImageLoaded {
                    token,
                    path,
                    result,
                } => {
                    self.pending_uploads = self.pending_uploads.saturating_sub(1);
                    let name = path
                        .file_name()
                        .map(|s| s.to_string_lossy().to_string());
                    match self.session.finish_upload(token, result, name) {
                        UploadOutcome::Installed => {
                            if let Some(p) = &self.session.placement {
                                crate::log_info!(
                                    "Upload #{} installed: {}x{} shown at {}x{}",
                                    token,
                                    p.natural_width,
                                    p.natural_height,
                                    p.display_width,
                                    p.display_height
                                );
                            }
                            self.tab = Tab::Photo;
                        }
                        UploadOutcome::Stale => {
                            crate::log_info!("Upload #{} superseded, result dropped", token);
                        }
                        UploadOutcome::Rejected(e) => self.report_rejected(&path, e, now),
                    }
                }
                IoResult::ExportComplete { path } => {
                    crate::log_info!("Exported {}", path.display());
                    self.notify(t!("notice.saved", path = path.display()), NoticeKind::Info, now);
                }
                IoResult::ExportFailed { path, error } => {
                    crate::log_err!("Export to {} failed: {}", path.display(), error);
                }
            }
            ctx.request_repaint();
        }
    }

    fn show_notices(&mut self, ctx: &egui::Context, now: f64) {
        self.notices.retain(|n| now - n.shown_at < NOTICE_SECONDS);
        if self.notices.is_empty() {
            return;
        }
        egui::Area::new(egui::Id::new("notices"))
            .anchor(egui::Align2::RIGHT_BOTTOM, [-16.0, -16.0])
            .show(ctx, |ui| {
                for notice in &self.notices {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        let color = match notice.kind {
                            NoticeKind::Info => egui::Color32::from_rgb(0x2E, 0x7D, 0x32),
                            NoticeKind::Error => egui::Color32::from_rgb(0xC6, 0x28, 0x28),
                        };
                        ui.colored_label(color, notice.text.as_str());
                    });
                }
            });
        // Keep repainting until every notice has expired.
        ctx.request_repaint_after(std::time::Duration::from_millis(250));
    }

    fn header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.heading(egui::RichText::new(t!("app.title")).size(28.0).strong());
                ui.weak("φ = 1.618033988749...");
            });
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    egui::RichText::new("φ")
                        .size(48.0)
                        .color(egui::Color32::from_rgb(0xD4, 0xAF, 0x37)),
                );
                ui.add_space(16.0);
                let current = self.language.clone();
                egui::ComboBox::from_id_source("language")
                    .selected_text(
                        crate::i18n::LANGUAGES
                            .iter()
                            .find(|(code, _)| *code == current)
                            .map(|(_, name)| *name)
                            .unwrap_or("English"),
                    )
                    .show_ui(ui, |ui| {
                        for (code, name) in crate::i18n::LANGUAGES {
                            ui.selectable_value(&mut self.language, code.to_string(), *name);
                        }
                    });
                ui.label(t!("menu.language"));
                if self.language != current {
                    crate::i18n::set_language(&self.language);
                    crate::log_info!("Language switched to {}", self.language);
                }
            });
        });
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            for tab in Tab::ALL {
                ui.selectable_value(&mut self.tab, tab, tab.label());
            }
        });
    }
}

impl eframe::App for GoldenFEApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|i| i.time);

        let title = match &self.session.image_name {
            Some(name) => format!("GoldenFE - {}", name),
            None => "GoldenFE".to_string(),
        };
        ctx.send_viewport_cmd(egui::ViewportCommand::Title(title));

        self.poll_io(ctx, now);

        // Dropped files act like the upload button; the last one wins.
        let dropped: Vec<egui::DroppedFile> = ctx.input(|i| i.raw.dropped_files.clone());
        if let Some(path) = dropped.into_iter().filter_map(|f| f.path).last() {
            self.start_upload(path, now);
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            self.header(ui);
        });

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.weak(t!("footer.about"));
                ui.weak(t!("footer.usage"));
            });
        });

        let mut export = None;
        let mut upload = false;
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both().show(ui, |ui| match self.tab {
                Tab::Calculator => self.calculator.show(ui, &mut self.session),
                Tab::Visualization => export = self.diagram.show(ui, &self.session),
                Tab::Photo => {
                    match self.photo.show(ui, &mut self.session, self.pending_uploads > 0) {
                        Some(PhotoAction::Upload) => upload = true,
                        Some(PhotoAction::Export) => export = Some(ExportKind::Overlay),
                        None => {}
                    }
                }
                Tab::Gallery => self.gallery.show(ui),
            });
        });

        if upload && let Some(path) = self.file_handler.pick_image_path() {
            self.start_upload(path, now);
        }
        if let Some(kind) = export {
            self.export(kind);
        }
        if self.pending_uploads > 0 {
            ctx.request_repaint();
        }

        self.show_notices(ctx, now);
    }
}
