//! Engine lifecycle: mount, frame loop, debounced resize, dispose
//!
//! ```text
//! Uninitialized -> Initialized -> Running -> Disposed
//!                                  ^   |
//!                                  |   v
//!                                 Resizing (debounce timer pending)
//! ```
//!
//! The host owns the engine and forwards its callbacks; the engine never
//! reaches into ambient state. Frame and timer callbacks carry the token
//! they were requested with, and anything stale is ignored.

pub mod debounce;
pub mod host;

pub use debounce::Debounce;
pub use host::{FrameToken, Host, TimerToken};

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::RESIZE_DEBOUNCE;
use crate::renderer::{Canvas, render};
use crate::settings::Settings;
use crate::sim::{self, Circle, Surface, SurfaceInfo, generate, initialize_surface, rescale};

/// Externally visible lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Initialized,
    Running,
    /// Running with a resize waiting out its debounce window
    Resizing,
    Disposed,
}

/// One animation instance per mounted host surface
pub struct Engine<H: Host, C: Canvas> {
    host: H,
    canvas: Option<C>,
    settings: Settings,
    rng: Pcg32,
    phase: EngineState,
    surface: Option<Surface>,
    circles: Vec<Circle>,
    pending_frame: Option<FrameToken>,
    resize: Debounce<SurfaceInfo>,
    observing: bool,
    /// `start` was called before a surface existed
    start_requested: bool,
    frame_count: u64,
    resize_count: u64,
}

impl<H: Host, C: Canvas> Engine<H, C> {
    /// `seed` is used unless the settings pin one
    pub fn new(host: H, canvas: Option<C>, settings: Settings, seed: u64) -> Self {
        let seed = settings.seed.unwrap_or(seed);
        log::debug!("Engine seed: {}", seed);
        Self {
            host,
            canvas,
            settings,
            rng: Pcg32::seed_from_u64(seed),
            phase: EngineState::Uninitialized,
            surface: None,
            circles: Vec::new(),
            pending_frame: None,
            resize: Debounce::new(RESIZE_DEBOUNCE),
            observing: false,
            start_requested: false,
            frame_count: 0,
            resize_count: 0,
        }
    }

    pub fn state(&self) -> EngineState {
        match self.phase {
            EngineState::Running if self.resize.is_pending() => EngineState::Resizing,
            phase => phase,
        }
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn circles(&self) -> &[Circle] {
        &self.circles
    }

    pub fn canvas(&self) -> Option<&C> {
        self.canvas.as_ref()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Frames stepped and rendered so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Resize settlements applied so far
    pub fn resize_count(&self) -> u64 {
        self.resize_count
    }

    /// Mount: size the surface and seed the circles.
    ///
    /// Returns `false` and stays idle when the surface is unavailable. If a
    /// canvas exists, resize notifications are still observed so the next
    /// settled resize can retry.
    pub fn initialize(&mut self, info: SurfaceInfo) -> bool {
        if self.phase != EngineState::Uninitialized {
            log::debug!("initialize ignored in state {:?}", self.phase);
            return self.surface.is_some();
        }

        if self.canvas.is_some() && !self.observing {
            self.observing = self.host.observe_resize();
        }

        let info = info.with_max_device_scale(self.settings.max_device_scale());
        let Some(surface) = initialize_surface(self.canvas.as_mut(), &info) else {
            return false;
        };

        self.circles = generate(&surface, &mut self.rng);
        self.surface = Some(surface);
        self.phase = EngineState::Initialized;
        log::info!(
            "Initialized {}x{} @{}x (scale {:.2}), {} circles",
            surface.width,
            surface.height,
            surface.device_scale,
            surface.scale_factor,
            self.circles.len()
        );
        true
    }

    /// Begin the frame loop. Before a successful initialize this only records
    /// the request.
    pub fn start(&mut self) -> bool {
        match self.phase {
            EngineState::Initialized => {
                self.phase = EngineState::Running;
                self.schedule_frame();
                true
            }
            EngineState::Uninitialized => {
                self.start_requested = true;
                false
            }
            _ => false,
        }
    }

    /// One physics step followed by one rendered frame
    pub fn step(&mut self) {
        let Some(surface) = self.surface else {
            return;
        };
        let Some(canvas) = self.canvas.as_mut() else {
            return;
        };

        sim::step(&mut self.circles, &surface);
        if let Err(e) = render(&surface, &self.circles, canvas, self.settings.layers()) {
            log::warn!("Frame dropped: {}", e);
        }
        self.frame_count += 1;
    }

    /// Display refresh callback from the host
    pub fn on_frame(&mut self, token: FrameToken) {
        if self.phase != EngineState::Running || self.pending_frame != Some(token) {
            log::trace!("Ignoring frame {:?} in state {:?}", token, self.phase);
            return;
        }
        self.pending_frame = None;
        self.step();
        self.schedule_frame();
    }

    /// Geometry-change notification; restarts the debounce window
    pub fn on_resize(&mut self, info: SurfaceInfo) {
        if self.phase == EngineState::Disposed || !self.observing {
            return;
        }
        self.resize.schedule(&mut self.host, info);
    }

    /// Timer callback from the host
    pub fn on_timer(&mut self, token: TimerToken) {
        if let Some(info) = self.resize.fire(token) {
            self.settle(info);
        }
    }

    /// Unmount. Cancels everything outstanding; safe to call at any time,
    /// any number of times.
    pub fn dispose(&mut self) {
        if self.phase == EngineState::Disposed {
            return;
        }
        if let Some(token) = self.pending_frame.take() {
            self.host.cancel_frame(token);
        }
        self.resize.cancel(&mut self.host);
        if self.observing {
            self.host.unobserve_resize();
            self.observing = false;
        }
        self.circles.clear();
        self.surface = None;
        self.start_requested = false;
        self.phase = EngineState::Disposed;
        log::debug!("Disposed after {} frames", self.frame_count);
    }

    fn schedule_frame(&mut self) {
        self.pending_frame = self.host.request_frame();
        if self.pending_frame.is_none() {
            log::warn!("Host refused an animation frame; loop stalled");
        }
    }

    fn settle(&mut self, info: SurfaceInfo) {
        let Some(old) = self.surface else {
            // Mount failed earlier; treat the settled size as a fresh mount
            if self.initialize(info) && self.start_requested {
                self.start();
            }
            return;
        };

        let info = info.with_max_device_scale(self.settings.max_device_scale());
        match initialize_surface(self.canvas.as_mut(), &info) {
            Some(new) => {
                rescale(&mut self.circles, &old, &new);
                self.surface = Some(new);
                self.resize_count += 1;
                log::debug!(
                    "Resized {}x{} -> {}x{} (scale {:.2} -> {:.2})",
                    old.width,
                    old.height,
                    new.width,
                    new.height,
                    old.scale_factor,
                    new.scale_factor
                );
            }
            None => {
                log::debug!(
                    "Resize to {}x{} unavailable; keeping {}x{}",
                    info.width,
                    info.height,
                    old.width,
                    old.height
                );
            }
        }
    }
}

impl<H: Host, C: Canvas> Drop for Engine<H, C> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MIN_RESCALED_SPEED;
    use crate::platform::{ManualHost, pump};
    use crate::renderer::PixelCanvas;
    use std::time::Duration;

    const FRAME: Duration = Duration::from_millis(16);

    fn engine() -> Engine<ManualHost, PixelCanvas> {
        Engine::new(ManualHost::new(), Some(PixelCanvas::new()), Settings::default(), 1234)
    }

    fn running(w: f32, h: f32) -> Engine<ManualHost, PixelCanvas> {
        let mut e = engine();
        assert!(e.initialize(SurfaceInfo::new(w, h, 1.0)));
        assert!(e.start());
        e
    }

    #[test]
    fn test_lifecycle_states() {
        let mut e = engine();
        assert_eq!(e.state(), EngineState::Uninitialized);

        assert!(e.initialize(SurfaceInfo::new(400.0, 400.0, 1.0)));
        assert_eq!(e.state(), EngineState::Initialized);
        assert_eq!(e.circles().len(), 10);
        assert!(e.host().is_observing());
        assert_eq!(e.host().pending_frames(), 0);

        assert!(e.start());
        assert_eq!(e.state(), EngineState::Running);
        assert_eq!(e.host().pending_frames(), 1);

        e.dispose();
        assert_eq!(e.state(), EngineState::Disposed);
        assert!(e.circles().is_empty());
        assert!(e.surface().is_none());
    }

    #[test]
    fn test_frame_loop_requests_one_frame_at_a_time() {
        let mut e = running(400.0, 300.0);
        for _ in 0..30 {
            pump(&mut e, FRAME);
            assert_eq!(e.host().pending_frames(), 1);
        }
        assert_eq!(e.frame_count(), 30);
        assert!(e.canvas().unwrap().painted_pixels() > 0);
    }

    #[test]
    fn test_stale_frame_token_ignored() {
        let mut e = running(400.0, 300.0);
        let token = e.host_mut().take_frame().unwrap();
        e.on_frame(token);
        assert_eq!(e.frame_count(), 1);

        // Same token again must not run a second, overlapping frame
        e.on_frame(token);
        assert_eq!(e.frame_count(), 1);
        assert_eq!(e.host().pending_frames(), 1);
    }

    #[test]
    fn test_missing_canvas_stays_idle() {
        let mut e: Engine<ManualHost, PixelCanvas> =
            Engine::new(ManualHost::new(), None, Settings::default(), 1);
        assert!(!e.initialize(SurfaceInfo::new(400.0, 400.0, 1.0)));
        assert!(!e.start());
        assert_eq!(e.state(), EngineState::Uninitialized);
        assert!(e.circles().is_empty());
        assert_eq!(e.host().pending_frames(), 0);
        assert!(!e.host().is_observing());

        e.dispose();
        e.dispose();
        assert_eq!(e.host().pending_frames(), 0);
        assert_eq!(e.host().pending_timers(), 0);
    }

    #[test]
    fn test_dispose_before_initialize_and_twice() {
        let mut e = engine();
        e.dispose();
        e.dispose();
        assert_eq!(e.state(), EngineState::Disposed);
        assert!(!e.initialize(SurfaceInfo::new(400.0, 400.0, 1.0)));
        assert_eq!(e.host().pending_frames(), 0);
    }

    #[test]
    fn test_dispose_cancels_frame_timer_and_observer() {
        let mut e = running(400.0, 400.0);
        e.on_resize(SurfaceInfo::new(500.0, 500.0, 1.0));
        assert_eq!(e.host().pending_timers(), 1);
        assert_eq!(e.host().pending_frames(), 1);

        e.dispose();
        assert_eq!(e.host().pending_timers(), 0);
        assert_eq!(e.host().pending_frames(), 0);
        assert!(!e.host().is_observing());

        // Late callbacks find nothing to touch
        pump(&mut e, Duration::from_millis(500));
        assert_eq!(e.frame_count(), 0);
        assert_eq!(e.resize_count(), 0);
    }

    #[test]
    fn test_resize_burst_settles_once_with_last_size() {
        let mut e = running(400.0, 400.0);
        for size in [450.0, 520.0, 610.0, 700.0, 800.0] {
            e.on_resize(SurfaceInfo::new(size, size, 1.0));
            assert_eq!(e.state(), EngineState::Resizing);
            pump(&mut e, Duration::from_millis(40));
        }
        assert_eq!(e.resize_count(), 0);
        assert_eq!(e.surface().unwrap().width, 400.0);

        for _ in 0..10 {
            pump(&mut e, FRAME);
        }
        assert_eq!(e.resize_count(), 1);
        assert_eq!(e.state(), EngineState::Running);

        let s = *e.surface().unwrap();
        assert_eq!((s.width, s.height), (800.0, 800.0));
        assert!((s.scale_factor - 2.0).abs() < 1e-6);
        for c in e.circles() {
            assert!((c.radius - c.base_radius() * 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_settle_scales_radius_and_speed() {
        let mut e = running(400.0, 400.0);
        let before: Vec<(f32, f32, f32)> = e
            .circles()
            .iter()
            .map(|c| (c.radius, c.speed(), c.heading()))
            .collect();

        e.on_resize(SurfaceInfo::new(800.0, 800.0, 1.0));
        let token = e.host().timer_tokens()[0];
        e.host_mut().advance(Duration::from_millis(100));
        e.on_timer(token);

        for (c, (radius, speed, heading)) in e.circles().iter().zip(before) {
            assert!((c.radius - radius * 2.0).abs() < 1e-4);
            let expected = (speed * 2.0).max(MIN_RESCALED_SPEED);
            assert!((c.speed() - expected).abs() < 1e-4);
            if speed > 1e-3 {
                assert!((c.heading() - heading).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn test_resize_round_trip_restores_radius() {
        let mut e = running(640.0, 480.0);
        let before: Vec<f32> = e.circles().iter().map(|c| c.radius).collect();

        for (w, h) in [(1280.0, 720.0), (640.0, 480.0)] {
            e.on_resize(SurfaceInfo::new(w, h, 1.0));
            pump(&mut e, Duration::from_millis(150));
        }
        assert_eq!(e.resize_count(), 2);
        for (c, r) in e.circles().iter().zip(before) {
            assert!((c.radius - r).abs() < 1e-4);
        }
    }

    #[test]
    fn test_frames_continue_while_resizing() {
        let mut e = running(400.0, 400.0);
        e.on_resize(SurfaceInfo::new(300.0, 300.0, 1.0));
        pump(&mut e, FRAME);
        pump(&mut e, FRAME);
        assert_eq!(e.state(), EngineState::Resizing);
        assert_eq!(e.frame_count(), 2);
        assert_eq!(e.host().pending_frames(), 1);
    }

    #[test]
    fn test_circles_contained_across_frames_and_resizes() {
        let mut e = running(900.0, 500.0);
        let count = e.circles().len();
        let sizes = [(300.0, 200.0), (1200.0, 240.0), (500.0, 500.0)];
        for (w, h) in sizes {
            for _ in 0..60 {
                pump(&mut e, FRAME);
                let s = *e.surface().unwrap();
                assert!(e.circles().iter().all(|c| c.is_contained(s.size()) && c.radius > 0.0));
            }
            e.on_resize(SurfaceInfo::new(w, h, 1.0));
        }
        for _ in 0..20 {
            pump(&mut e, FRAME);
        }
        assert_eq!(e.resize_count(), 3);
        assert_eq!(e.circles().len(), count);
    }

    #[test]
    fn test_unavailable_resize_keeps_previous_surface() {
        let mut e = running(400.0, 400.0);
        let before = e.circles().to_vec();
        e.on_resize(SurfaceInfo::new(0.0, 0.0, 1.0));
        pump(&mut e, Duration::from_millis(150));

        assert_eq!(e.resize_count(), 0);
        assert_eq!(e.surface().unwrap().width, 400.0);
        assert_eq!(e.circles().len(), before.len());
        for (c, b) in e.circles().iter().zip(&before) {
            assert_eq!(c.radius, b.radius);
        }
    }

    #[test]
    fn test_failed_mount_retries_on_settled_resize() {
        let mut e = engine();
        assert!(!e.initialize(SurfaceInfo::new(0.0, 0.0, 1.0)));
        assert!(!e.start());
        assert!(e.host().is_observing());

        e.on_resize(SurfaceInfo::new(320.0, 200.0, 1.0));
        pump(&mut e, Duration::from_millis(150));

        assert_eq!(e.state(), EngineState::Running);
        assert_eq!(e.circles().len(), 6);
        assert_eq!(e.host().pending_frames(), 1);
    }

    #[test]
    fn test_oversized_container_stays_idle() {
        let mut e = engine();
        assert!(!e.initialize(SurfaceInfo::new(40000.0, 30000.0, 1.0)));
        assert!(!e.start());
        assert_eq!(e.state(), EngineState::Uninitialized);
        assert!(e.circles().is_empty());

        // A later, sane size recovers
        e.on_resize(SurfaceInfo::new(400.0, 400.0, 1.0));
        pump(&mut e, Duration::from_millis(150));
        assert_eq!(e.state(), EngineState::Running);
    }

    #[test]
    fn test_hidpi_backing_fitted_to_canvas_limit() {
        let mut e = engine();
        assert!(e.initialize(SurfaceInfo::new(6000.0, 200.0, 2.0)));
        let s = *e.surface().unwrap();
        let canvas = e.canvas().unwrap();
        assert_eq!(s.device_scale, canvas.device_scale());
        assert_eq!(s.backing_size().x, canvas.width());
        assert!(canvas.width() <= canvas.max_dimension());
    }

    #[test]
    fn test_same_seed_same_population() {
        let mut a = engine();
        let mut b = engine();
        a.initialize(SurfaceInfo::new(500.0, 300.0, 2.0));
        b.initialize(SurfaceInfo::new(500.0, 300.0, 2.0));
        assert_eq!(a.circles(), b.circles());
    }

    #[test]
    fn test_quality_caps_backing_scale() {
        let mut settings = Settings::default();
        settings.apply_preset(crate::settings::QualityPreset::Low);
        let mut e = Engine::new(ManualHost::new(), Some(PixelCanvas::new()), settings, 9);
        assert!(e.initialize(SurfaceInfo::new(200.0, 100.0, 3.0)));
        assert_eq!(e.surface().unwrap().device_scale, 1.0);
        assert_eq!(e.canvas().unwrap().width(), 200);
    }
}
