//! The host environment the engine is mounted in

use std::time::Duration;

/// Handle for a pending animation-frame request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(pub u64);

/// Handle for a pending timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(pub u64);

/// Event sources supplied by the host.
///
/// Requests are fire-and-forget: the host later calls `Engine::on_frame` or
/// `Engine::on_timer` with the returned token, and resize observations
/// arrive through `Engine::on_resize`. All callbacks run on one thread.
pub trait Host {
    /// Ask for a callback at the next display refresh
    fn request_frame(&mut self) -> Option<FrameToken>;

    fn cancel_frame(&mut self, token: FrameToken);

    /// Ask for a callback once `delay` has elapsed
    fn set_timeout(&mut self, delay: Duration) -> Option<TimerToken>;

    fn clear_timeout(&mut self, token: TimerToken);

    /// Start delivering container resize notifications
    fn observe_resize(&mut self) -> bool;

    fn unobserve_resize(&mut self);
}
