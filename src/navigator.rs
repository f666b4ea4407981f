//! Drag-to-pan and wheel-to-zoom state machine.
//!
//! The navigator owns the committed [`Transform`] of the current image and
//! the drag state. While a drag is in progress the visible pan is the
//! committed pan plus the live drag delta; releasing the button commits it.
//! Zoom events re-anchor the pan so the pixel under the cursor stays put (or
//! moves to the window centre, depending on [`ZoomAnchor`]).

use web_time::Instant;

use crate::config::{NavigatorConfig, ZoomAnchor};
use crate::error::Result;
use crate::transform::Transform;

/// Zoom changes smaller than this are treated as "already at the bound".
const ZOOM_EPSILON: f64 = 1e-9;

/// Pointer drag state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        /// Screen point where the button went down
        start: (f64, f64),
        /// Last screen point seen during the drag
        current: (f64, f64),
    },
}

/// Wheel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// What a zoom event did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoomOutcome {
    /// Zoom level changed to the given value
    Applied(f64),
    /// Already at `min_zoom`/`max_zoom`; nothing changed
    AtBound,
    /// Arrived inside the cooldown window of the previous zoom; ignored
    Debounced,
}

/// Pan/zoom state of the image being annotated.
#[derive(Debug, Clone)]
pub struct Navigator {
    config: NavigatorConfig,
    committed: Transform,
    drag: DragState,
    viewport: (f64, f64),
    last_zoom: Option<Instant>,
}

impl Navigator {
    /// Create a navigator in its reset state.
    pub fn new(config: NavigatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            committed: Transform::identity(),
            drag: DragState::Idle,
            viewport: (0.0, 0.0),
            last_zoom: None,
        })
    }

    /// Settings this navigator was built with.
    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// Back to `Idle`, zoom 1.0 and no pan. Called whenever a new image loads.
    pub fn reset(&mut self) {
        self.committed = Transform::identity();
        self.drag = DragState::Idle;
        self.last_zoom = None;
    }

    /// Window size in screen pixels, used for screen-centre anchoring.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = (width, height);
    }

    /// Window size last passed to [`Navigator::set_viewport`].
    pub fn viewport(&self) -> (f64, f64) {
        self.viewport
    }

    /// Current pointer drag state.
    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    /// Current zoom level, always within the configured bounds.
    pub fn zoom_level(&self) -> f64 {
        self.committed.zoom
    }

    /// Pan committed by finished drags and zooms.
    pub fn committed_pan(&self) -> (f64, f64) {
        self.committed.pan()
    }

    /// Pan currently applied on screen, including any drag in progress.
    pub fn pan_offset(&self) -> (f64, f64) {
        let (dx, dy) = self.live_delta();
        (self.committed.pan_x + dx, self.committed.pan_y + dy)
    }

    /// Transform currently applied on screen.
    pub fn transform(&self) -> Transform {
        let (dx, dy) = self.live_delta();
        self.committed.pan_by(dx, dy)
    }

    /// Original-image pixel under a screen point.
    pub fn to_original(&self, screen_x: f64, screen_y: f64) -> (f64, f64) {
        self.transform().screen_to_image(screen_x, screen_y)
    }

    /// `Idle --press--> Dragging`
    pub fn press(&mut self, x: f64, y: f64) {
        if let DragState::Idle = self.drag {
            self.drag = DragState::Dragging {
                start: (x, y),
                current: (x, y),
            };
        }
    }

    /// `Dragging --motion--> Dragging`. Returns whether the view moved.
    pub fn motion(&mut self, x: f64, y: f64) -> bool {
        match &mut self.drag {
            DragState::Dragging { current, .. } => {
                *current = (x, y);
                true
            }
            DragState::Idle => false,
        }
    }

    /// `Dragging --release--> Idle`, committing the drag delta.
    pub fn release(&mut self, x: f64, y: f64) {
        if let DragState::Dragging { start, .. } = self.drag {
            self.committed = self.committed.pan_by(x - start.0, y - start.1);
            self.drag = DragState::Idle;
            log::debug!(
                "Accumulated pan: ({}, {})",
                self.committed.pan_x,
                self.committed.pan_y
            );
        }
    }

    /// Step the zoom level at `cursor`, keeping the pixel under it anchored.
    ///
    /// Drag state is left as it is; a drag in progress keeps following the
    /// pointer from its original start point.
    pub fn zoom(&mut self, direction: ZoomDirection, cursor: (f64, f64), now: Instant) -> ZoomOutcome {
        if let Some(last) = self.last_zoom {
            if now.saturating_duration_since(last) < self.config.zoom_debounce() {
                log::trace!("Zoom event debounced");
                return ZoomOutcome::Debounced;
            }
        }

        let current = self.committed.zoom;
        let target = match direction {
            ZoomDirection::In => current + self.config.zoom_step,
            ZoomDirection::Out => current - self.config.zoom_step,
        }
        .clamp(self.config.min_zoom, self.config.max_zoom);

        if (target - current).abs() < ZOOM_EPSILON {
            return ZoomOutcome::AtBound;
        }

        let anchor = match self.config.zoom_anchor {
            ZoomAnchor::Cursor => cursor,
            ZoomAnchor::ScreenCenter => (self.viewport.0 / 2.0, self.viewport.1 / 2.0),
        };

        let (dx, dy) = self.live_delta();
        let zoomed = self.transform().zoom_about(target, cursor, anchor);
        self.committed = zoomed.pan_by(-dx, -dy);
        self.last_zoom = Some(now);

        log::debug!("Zoom level: {}", target);
        ZoomOutcome::Applied(target)
    }

    fn live_delta(&self) -> (f64, f64) {
        match self.drag {
            DragState::Dragging { start, current } => (current.0 - start.0, current.1 - start.1),
            DragState::Idle => (0.0, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn navigator() -> Navigator {
        Navigator::new(NavigatorConfig::coarse()).unwrap()
    }

    /// Instants far enough apart that debouncing never triggers.
    fn ticks(start: Instant) -> impl Iterator<Item = Instant> {
        (0u64..).map(move |i| start + Duration::from_secs(i))
    }

    #[test]
    fn test_new_navigator_is_reset() {
        let nav = navigator();
        assert_eq!(nav.zoom_level(), 1.0);
        assert_eq!(nav.pan_offset(), (0.0, 0.0));
        assert_eq!(nav.drag_state(), DragState::Idle);
    }

    #[test]
    fn test_accessors_report_settings_and_viewport() {
        let mut nav = navigator();
        assert_eq!(*nav.config(), NavigatorConfig::coarse());
        assert_eq!(nav.viewport(), (0.0, 0.0));

        nav.set_viewport(800.0, 600.0);
        assert_eq!(nav.viewport(), (800.0, 600.0));
        let mut zoomed = ticks(Instant::now());
        for _ in 0..20 {
            nav.zoom(ZoomDirection::In, (400.0, 300.0), zoomed.next().unwrap());
        }
        assert_eq!(nav.zoom_level(), nav.config().max_zoom);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = NavigatorConfig {
            zoom_step: -1.0,
            ..NavigatorConfig::coarse()
        };
        assert!(Navigator::new(config).is_err());
    }

    #[test]
    fn test_drag_commits_exact_delta() {
        let mut nav = navigator();
        nav.press(10.0, 10.0);
        assert!(nav.is_dragging());
        nav.motion(30.0, -5.0);
        nav.release(35.0, -20.0);

        assert!(!nav.is_dragging());
        assert_eq!(nav.committed_pan(), (25.0, -30.0));
    }

    #[test]
    fn test_motion_moves_view_without_committing() {
        let mut nav = navigator();
        nav.press(0.0, 0.0);
        assert!(nav.motion(12.0, 8.0));

        assert_eq!(nav.pan_offset(), (12.0, 8.0));
        assert_eq!(nav.committed_pan(), (0.0, 0.0));
    }

    #[test]
    fn test_sequential_drags_accumulate() {
        let mut nav = navigator();
        nav.press(100.0, 100.0);
        nav.release(130.0, 90.0);
        nav.press(50.0, 50.0);
        nav.release(45.0, 85.0);

        assert_eq!(nav.committed_pan(), (30.0 - 5.0, -10.0 + 35.0));
    }

    #[test]
    fn test_motion_and_release_while_idle_are_ignored() {
        let mut nav = navigator();
        assert!(!nav.motion(40.0, 40.0));
        nav.release(40.0, 40.0);
        assert_eq!(nav.pan_offset(), (0.0, 0.0));
    }

    #[test]
    fn test_drag_outside_image_is_allowed() {
        let mut nav = navigator();
        nav.press(0.0, 0.0);
        nav.release(-5000.0, 9000.0);
        assert_eq!(nav.committed_pan(), (-5000.0, 9000.0));
    }

    #[test]
    fn test_zoom_keeps_pixel_under_cursor() {
        let mut nav = navigator();
        nav.press(0.0, 0.0);
        nav.release(-37.0, 21.0);

        let cursor = (245.0, 130.0);
        let mut times = ticks(Instant::now());
        for direction in [ZoomDirection::In, ZoomDirection::In, ZoomDirection::Out, ZoomDirection::In] {
            let before = nav.to_original(cursor.0, cursor.1);
            let outcome = nav.zoom(direction, cursor, times.next().unwrap());
            assert!(matches!(outcome, ZoomOutcome::Applied(_)));
            let after = nav.to_original(cursor.0, cursor.1);

            assert!(approx_eq(before.0, after.0), "{before:?} vs {after:?}");
            assert!(approx_eq(before.1, after.1), "{before:?} vs {after:?}");
        }
    }

    #[test]
    fn test_zoom_satisfies_original_formula() {
        let mut nav = navigator();
        nav.zoom(ZoomDirection::In, (80.0, 60.0), Instant::now());

        let zoom = nav.zoom_level();
        let pan = nav.pan_offset();
        let (ox, oy) = nav.to_original(300.0, 200.0);
        assert!(approx_eq(ox, (300.0 - pan.0) / zoom));
        assert!(approx_eq(oy, (200.0 - pan.1) / zoom));
    }

    #[test]
    fn test_zoom_to_screen_center() {
        let config = NavigatorConfig::coarse().with_anchor(ZoomAnchor::ScreenCenter);
        let mut nav = Navigator::new(config).unwrap();
        nav.set_viewport(800.0, 600.0);

        let cursor = (100.0, 50.0);
        let pixel = nav.to_original(cursor.0, cursor.1);
        nav.zoom(ZoomDirection::In, cursor, Instant::now());

        let centered = nav.to_original(400.0, 300.0);
        assert!(approx_eq(centered.0, pixel.0));
        assert!(approx_eq(centered.1, pixel.1));
    }

    #[test]
    fn test_zoom_never_leaves_bounds() {
        let config = NavigatorConfig::fine();
        let mut nav = Navigator::new(config).unwrap();
        let mut times = ticks(Instant::now());

        for _ in 0..50 {
            nav.zoom(ZoomDirection::In, (10.0, 10.0), times.next().unwrap());
            assert!(nav.zoom_level() <= config.max_zoom);
        }
        assert!(approx_eq(nav.zoom_level(), config.max_zoom));

        for _ in 0..50 {
            nav.zoom(ZoomDirection::Out, (10.0, 10.0), times.next().unwrap());
            assert!(nav.zoom_level() >= config.min_zoom);
        }
        assert!(approx_eq(nav.zoom_level(), config.min_zoom));
    }

    #[test]
    fn test_zoom_at_bound_has_no_effect() {
        let mut nav = navigator();
        let mut times = ticks(Instant::now());
        // 1.0 -> 0.5 (min)
        assert_eq!(
            nav.zoom(ZoomDirection::Out, (0.0, 0.0), times.next().unwrap()),
            ZoomOutcome::Applied(0.5)
        );
        let pan = nav.pan_offset();
        assert_eq!(
            nav.zoom(ZoomDirection::Out, (70.0, 70.0), times.next().unwrap()),
            ZoomOutcome::AtBound
        );
        assert_eq!(nav.zoom_level(), 0.5);
        assert_eq!(nav.pan_offset(), pan);
    }

    #[test]
    fn test_zoom_debounce() {
        let mut nav = navigator();
        let t0 = Instant::now();

        assert_eq!(
            nav.zoom(ZoomDirection::In, (0.0, 0.0), t0),
            ZoomOutcome::Applied(1.5)
        );
        assert_eq!(
            nav.zoom(ZoomDirection::In, (0.0, 0.0), t0 + Duration::from_millis(50)),
            ZoomOutcome::Debounced
        );
        assert_eq!(nav.zoom_level(), 1.5);
        assert_eq!(
            nav.zoom(ZoomDirection::In, (0.0, 0.0), t0 + Duration::from_millis(150)),
            ZoomOutcome::Applied(2.0)
        );
    }

    #[test]
    fn test_zoom_during_drag_keeps_drag_and_anchor() {
        let mut nav = navigator();
        nav.press(100.0, 100.0);
        nav.motion(140.0, 120.0);

        let cursor = (140.0, 120.0);
        let before = nav.to_original(cursor.0, cursor.1);
        nav.zoom(ZoomDirection::In, cursor, Instant::now());
        assert!(nav.is_dragging());

        let after = nav.to_original(cursor.0, cursor.1);
        assert!(approx_eq(before.0, after.0));
        assert!(approx_eq(before.1, after.1));

        // Releasing where the pointer already is leaves the view unchanged
        let visible = nav.pan_offset();
        nav.release(140.0, 120.0);
        assert!(approx_eq(nav.pan_offset().0, visible.0));
        assert!(approx_eq(nav.pan_offset().1, visible.1));
    }

    #[test]
    fn test_reset_forgets_previous_zoom_time() {
        let mut nav = navigator();
        let t0 = Instant::now();
        nav.zoom(ZoomDirection::In, (0.0, 0.0), t0);
        nav.reset();

        assert_eq!(
            nav.zoom(ZoomDirection::In, (0.0, 0.0), t0 + Duration::from_millis(10)),
            ZoomOutcome::Applied(1.5)
        );
    }

    #[test]
    fn test_reset_restores_identity() {
        let mut nav = navigator();
        nav.zoom(ZoomDirection::In, (30.0, 30.0), Instant::now());
        nav.press(0.0, 0.0);
        nav.motion(5.0, 5.0);

        nav.reset();
        assert_eq!(nav.zoom_level(), 1.0);
        assert_eq!(nav.pan_offset(), (0.0, 0.0));
        assert!(!nav.is_dragging());
    }
}
