//! Virtual-clock host for tests and headless runs

use std::time::Duration;

use crate::engine::{Engine, FrameToken, Host, TimerToken};
use crate::renderer::Canvas;

/// A host whose time only moves when told to.
///
/// Frame requests queue until taken; timers fire when `advance` passes
/// their deadline.
#[derive(Debug, Default)]
pub struct ManualHost {
    now: Duration,
    next_id: u64,
    frames: Vec<FrameToken>,
    timers: Vec<(TimerToken, Duration)>,
    observing: bool,
}

impl ManualHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn is_observing(&self) -> bool {
        self.observing
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Pending timer tokens, earliest deadline first
    pub fn timer_tokens(&self) -> Vec<TimerToken> {
        let mut timers = self.timers.clone();
        timers.sort_by_key(|&(_, deadline)| deadline);
        timers.into_iter().map(|(token, _)| token).collect()
    }

    /// Move the clock forward and return the timers that came due, in
    /// deadline order. Returned timers are no longer pending.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<TimerToken> {
        self.now += elapsed;
        let now = self.now;
        let mut due: Vec<(TimerToken, Duration)> =
            self.timers.iter().copied().filter(|&(_, deadline)| deadline <= now).collect();
        self.timers.retain(|&(_, deadline)| deadline > now);
        due.sort_by_key(|&(_, deadline)| deadline);
        due.into_iter().map(|(token, _)| token).collect()
    }

    /// Take the oldest pending frame request
    pub fn take_frame(&mut self) -> Option<FrameToken> {
        if self.frames.is_empty() {
            None
        } else {
            Some(self.frames.remove(0))
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl Host for ManualHost {
    fn request_frame(&mut self) -> Option<FrameToken> {
        let token = FrameToken(self.next_id());
        self.frames.push(token);
        Some(token)
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        self.frames.retain(|&t| t != token);
    }

    fn set_timeout(&mut self, delay: Duration) -> Option<TimerToken> {
        let token = TimerToken(self.next_id());
        self.timers.push((token, self.now + delay));
        Some(token)
    }

    fn clear_timeout(&mut self, token: TimerToken) {
        self.timers.retain(|&(t, _)| t != token);
    }

    fn observe_resize(&mut self) -> bool {
        self.observing = true;
        true
    }

    fn unobserve_resize(&mut self) {
        self.observing = false;
    }
}

/// Let `elapsed` pass: deliver due timers, then one pending frame
pub fn pump<C: Canvas>(engine: &mut Engine<ManualHost, C>, elapsed: Duration) {
    let due = engine.host_mut().advance(elapsed);
    for token in due {
        engine.on_timer(token);
    }
    if let Some(frame) = engine.host_mut().take_frame() {
        engine.on_frame(frame);
    }
}
