use image::RgbaImage;
use uuid::Uuid;

use crate::config::RenderConfig;
use crate::io::LoadError;
use crate::ops::drag::{DragState, PointerEvent};
use crate::ops::geometry::DrawCommand;
use crate::ops::overlay::render_overlay;
use crate::ops::placement::ImagePlacement;
use crate::ops::raster;
use crate::ops::ratio::{self, RatioResult};
use crate::ops::spiral::spiral_diagram;

/// Calculator value shown when the app opens.
pub const DEFAULT_RATIO_INPUT: &str = "100";

/// Hands out upload tokens; only the newest pending token may install its
/// image. When the newest upload fails, the one before it becomes current
/// again.
#[derive(Clone, Debug, Default)]
pub struct UploadTracker {
    next: u64,
    pending: Vec<u64>,
}

impl UploadTracker {
    pub fn begin(&mut self) -> u64 {
        self.next = self.next.wrapping_add(1);
        self.pending.push(self.next);
        self.next
    }

    pub fn is_current(&self, token: u64) -> bool {
        self.pending.last() == Some(&token)
    }

    /// An install retires every pending upload; older ones can only be stale.
    fn installed(&mut self) {
        self.pending.clear();
    }

    fn retire(&mut self, token: u64) {
        self.pending.retain(|t| *t != token);
    }
}

/// What happened to a finished decode.
#[derive(Debug)]
pub enum UploadOutcome {
    Installed,
    /// A newer upload started after this one; result dropped.
    Stale,
    /// Decode failed; session left as it was, and any older pending upload
    /// may still install.
    Rejected(LoadError),
}

/// The single in-memory session behind the GUI.
pub struct Session {
    pub id: Uuid,
    pub config: RenderConfig,
    pub ratio_input: String,
    pub ratio: RatioResult,
    pub placement: Option<ImagePlacement>,
    /// File name of the current image, for the status line.
    pub image_name: Option<String>,
    pub drag: DragState,
    pub show_grid: bool,
    pub show_spiral: bool,
    pub uploads: UploadTracker,
    overlay_dirty: bool,
}

impl Session {
    pub fn new(config: RenderConfig) -> Self {
        let mut session = Self {
            id: Uuid::new_v4(),
            config,
            ratio_input: String::new(),
            ratio: RatioResult::ZERO,
            placement: None,
            image_name: None,
            drag: DragState::Idle,
            show_grid: true,
            show_spiral: true,
            uploads: UploadTracker::default(),
            overlay_dirty: false,
        };
        session.set_ratio_input(DEFAULT_RATIO_INPUT);
        session
    }

    /// Bounds the display raster is fitted into. Workers build the
    /// [`ImagePlacement`] off the UI thread with these.
    pub fn display_box(&self) -> (u32, u32) {
        (self.config.max_display_width, self.config.max_display_height)
    }

    pub fn set_ratio_input(&mut self, input: &str) {
        self.ratio_input = input.to_string();
        self.ratio = ratio::compute(input);
    }

    pub fn begin_upload(&mut self) -> u64 {
        self.uploads.begin()
    }

    pub fn finish_upload(
        &mut self,
        token: u64,
        result: Result<ImagePlacement, LoadError>,
        name: Option<String>,
    ) -> UploadOutcome {
        match result {
            Ok(placement) if self.uploads.is_current(token) => {
                self.uploads.installed();
                self.placement = Some(placement);
                self.image_name = name;
                self.drag = DragState::Idle;
                self.mark_dirty();
                UploadOutcome::Installed
            }
            Ok(_) => {
                self.uploads.retire(token);
                UploadOutcome::Stale
            }
            Err(e) => {
                self.uploads.retire(token);
                UploadOutcome::Rejected(e)
            }
        }
    }

    pub fn set_show_grid(&mut self, on: bool) {
        if self.show_grid != on {
            self.show_grid = on;
            self.mark_dirty();
        }
    }

    pub fn set_show_spiral(&mut self, on: bool) {
        if self.show_spiral != on {
            self.show_spiral = on;
            self.mark_dirty();
        }
    }

    pub fn reset_position(&mut self) {
        if let Some(p) = self.placement.as_mut() {
            p.reset_origin();
            self.overlay_dirty = true;
        }
    }

    /// Feed a canvas pointer event through the drag machine.
    /// Returns true when the image actually moved.
    pub fn pointer(&mut self, event: PointerEvent) -> bool {
        let Some(placement) = self.placement.as_mut() else {
            self.drag = DragState::Idle;
            return false;
        };
        match self.drag.handle(event, placement.origin()) {
            Some(origin) if origin != placement.origin() => {
                placement.set_origin(origin);
                self.overlay_dirty = true;
                true
            }
            _ => false,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.overlay_dirty = true;
    }

    /// Consume the pending-redraw flag. Any number of events between two
    /// frames yield a single `true`.
    pub fn take_overlay_dirty(&mut self) -> bool {
        std::mem::take(&mut self.overlay_dirty)
    }

    pub fn overlay_commands(&self) -> Vec<DrawCommand> {
        match &self.placement {
            Some(p) => render_overlay(
                &p.overlay_params(self.show_grid, self.show_spiral),
                &self.config.overlay_style(),
            ),
            None => Vec::new(),
        }
    }

    /// Compose the overlay at display size. `None` without an image.
    pub fn render_overlay(&self) -> Option<RgbaImage> {
        let p = self.placement.as_ref()?;
        Some(raster::render_to_image(
            p.display_width,
            p.display_height,
            &self.overlay_commands(),
            Some(p.display_raster()),
        ))
    }

    pub fn diagram_commands(&self) -> Vec<DrawCommand> {
        let c = &self.config;
        spiral_diagram(c.diagram_width as f64, c.diagram_height as f64)
            .commands(c.diagram_rect, c.diagram_arc)
    }

    pub fn render_diagram(&self) -> RgbaImage {
        raster::render_to_image(
            self.config.diagram_width,
            self.config.diagram_height,
            &self.diagram_commands(),
            None,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::geometry::Point;
    use image::Rgba;

    fn photo(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255]))
    }

    fn placed(w: u32, h: u32) -> ImagePlacement {
        ImagePlacement::new(&photo(w, h), 900, 700)
    }

    fn loaded(w: u32, h: u32) -> Session {
        let mut s = Session::new(RenderConfig::default());
        let token = s.begin_upload();
        assert!(matches!(
            s.finish_upload(token, Ok(placed(w, h)), None),
            UploadOutcome::Installed
        ));
        s
    }

    #[test]
    fn calculator_opens_on_one_hundred() {
        let s = Session::new(RenderConfig::default());
        assert_eq!(s.ratio_input, "100");
        assert_eq!(ratio::format_value(s.ratio.smaller), "61.803");
        assert_eq!(ratio::format_value(s.ratio.larger), "161.803");
    }

    #[test]
    fn ratio_input_updates_result() {
        let mut s = Session::new(RenderConfig::default());
        s.set_ratio_input("100");
        assert_eq!(ratio::format_value(s.ratio.smaller), "61.803");
        s.set_ratio_input("abc");
        assert!(s.ratio.is_zero());
    }

    #[test]
    fn stale_decode_is_dropped() {
        let mut s = Session::new(RenderConfig::default());
        let first = s.begin_upload();
        let second = s.begin_upload();
        assert!(matches!(
            s.finish_upload(second, Ok(placed(40, 30)), Some("b.png".into())),
            UploadOutcome::Installed
        ));
        assert!(matches!(
            s.finish_upload(first, Ok(placed(1200, 800)), Some("a.png".into())),
            UploadOutcome::Stale
        ));
        let p = s.placement.as_ref().unwrap();
        assert_eq!((p.display_width, p.display_height), (40, 30));
        assert_eq!(s.image_name.as_deref(), Some("b.png"));
    }

    #[test]
    fn rejected_upload_keeps_previous_image() {
        let mut s = loaded(1200, 800);
        s.take_overlay_dirty();
        let token = s.begin_upload();
        let outcome = s.finish_upload(token, Err(LoadError::NotAnImage), None);
        assert!(matches!(outcome, UploadOutcome::Rejected(LoadError::NotAnImage)));
        let p = s.placement.as_ref().unwrap();
        assert_eq!((p.display_width, p.display_height), (900, 600));
        assert!(!s.take_overlay_dirty());
    }

    #[test]
    fn rejected_newer_upload_lets_pending_image_install() {
        let mut s = Session::new(RenderConfig::default());
        let image = s.begin_upload();
        let not_image = s.begin_upload();
        assert!(matches!(
            s.finish_upload(not_image, Err(LoadError::NotAnImage), Some("notes.txt".into())),
            UploadOutcome::Rejected(LoadError::NotAnImage)
        ));
        assert!(s.placement.is_none());
        assert!(matches!(
            s.finish_upload(image, Ok(placed(40, 30)), Some("a.png".into())),
            UploadOutcome::Installed
        ));
        let p = s.placement.as_ref().unwrap();
        assert_eq!((p.display_width, p.display_height), (40, 30));
        assert_eq!(s.image_name.as_deref(), Some("a.png"));
    }

    #[test]
    fn install_retires_older_pending_uploads() {
        let mut s = Session::new(RenderConfig::default());
        let first = s.begin_upload();
        let second = s.begin_upload();
        let third = s.begin_upload();
        assert!(matches!(
            s.finish_upload(third, Ok(placed(40, 30)), None),
            UploadOutcome::Installed
        ));
        assert!(matches!(
            s.finish_upload(second, Err(LoadError::NotAnImage), None),
            UploadOutcome::Rejected(_)
        ));
        assert!(matches!(
            s.finish_upload(first, Ok(placed(1200, 800)), None),
            UploadOutcome::Stale
        ));
        assert_eq!(s.placement.as_ref().unwrap().display_width, 40);
    }

    #[test]
    fn overlay_render_is_idempotent() {
        let mut s = loaded(300, 200);
        s.pointer(PointerEvent::Down(Point::new(10.0, 10.0)));
        s.pointer(PointerEvent::Move(Point::new(-20.0, 35.5)));
        let a = s.render_overlay().unwrap();
        let b = s.render_overlay().unwrap();
        assert_eq!(a.dimensions(), (300, 200));
        assert!(a.as_raw() == b.as_raw());
    }

    #[test]
    fn no_image_means_no_overlay() {
        let mut s = Session::new(RenderConfig::default());
        assert!(s.render_overlay().is_none());
        assert!(s.overlay_commands().is_empty());
        assert!(!s.pointer(PointerEvent::Down(Point::new(1.0, 1.0))));
        assert!(!s.drag.is_dragging());
    }

    #[test]
    fn events_coalesce_into_one_redraw() {
        let mut s = loaded(300, 200);
        s.take_overlay_dirty();
        s.pointer(PointerEvent::Down(Point::new(0.0, 0.0)));
        for i in 1..=10 {
            assert!(s.pointer(PointerEvent::Move(Point::new(i as f64, 0.0))));
        }
        assert!(!s.pointer(PointerEvent::Move(Point::new(10.0, 0.0))));
        s.set_show_grid(false);
        assert!(s.take_overlay_dirty());
        assert!(!s.take_overlay_dirty());
    }

    #[test]
    fn drag_round_trip_restores_origin() {
        let mut s = loaded(300, 200);
        s.placement.as_mut().unwrap().set_origin(Point::new(12.0, -4.0));
        let p = Point::new(150.0, 90.0);
        s.pointer(PointerEvent::Down(p));
        s.pointer(PointerEvent::Move(Point::new(400.0, -300.0)));
        s.pointer(PointerEvent::Move(p));
        s.pointer(PointerEvent::Leave);
        assert_eq!(s.placement.as_ref().unwrap().origin(), Point::new(12.0, -4.0));
        assert!(!s.pointer(PointerEvent::Move(Point::new(1.0, 1.0))));
    }

    #[test]
    fn hidden_layers_leave_only_the_photo() {
        let mut s = loaded(50, 40);
        s.set_show_grid(false);
        s.set_show_spiral(false);
        let out = s.render_overlay().unwrap();
        assert!(out.as_raw() == photo(50, 40).as_raw());
    }

    #[test]
    fn diagram_uses_configured_size() {
        let s = Session::new(RenderConfig::default());
        let img = s.render_diagram();
        assert_eq!(img.dimensions(), (600, 400));
        assert!(img.pixels().any(|p| p.0 == [0xD4, 0xAF, 0x37, 255]));
    }
}
