//! Cancellable debounce for bursty notifications

use std::time::Duration;

use super::host::{Host, TimerToken};

/// A payload waiting on a host timer
#[derive(Debug, Clone)]
struct ScheduledTask<T> {
    token: TimerToken,
    payload: T,
}

/// Holds at most one pending task. Every `schedule` supersedes (and cancels)
/// the previous one, so only the last payload of a burst is ever delivered.
#[derive(Debug, Clone)]
pub struct Debounce<T> {
    delay: Duration,
    pending: Option<ScheduledTask<T>>,
}

impl<T> Debounce<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// (Re)start the delay with a new payload
    pub fn schedule<H: Host + ?Sized>(&mut self, host: &mut H, payload: T) {
        self.cancel(host);
        match host.set_timeout(self.delay) {
            Some(token) => self.pending = Some(ScheduledTask { token, payload }),
            None => log::warn!("Host refused a timeout; notification dropped"),
        }
    }

    /// Take the payload if `token` is the current task. Stale tokens yield `None`.
    pub fn fire(&mut self, token: TimerToken) -> Option<T> {
        match &self.pending {
            Some(task) if task.token == token => self.pending.take().map(|t| t.payload),
            _ => None,
        }
    }

    pub fn cancel<H: Host + ?Sized>(&mut self, host: &mut H) {
        if let Some(task) = self.pending.take() {
            host.clear_timeout(task.token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ManualHost;

    const DELAY: Duration = Duration::from_millis(100);

    #[test]
    fn test_burst_delivers_last_payload_once() {
        let mut host = ManualHost::new();
        let mut debounce = Debounce::new(DELAY);

        for i in 0..5 {
            debounce.schedule(&mut host, i);
            host.advance(Duration::from_millis(30));
        }
        assert_eq!(host.pending_timers(), 1);

        let due = host.advance(DELAY);
        assert_eq!(due.len(), 1);
        assert_eq!(debounce.fire(due[0]), Some(4));
        assert!(!debounce.is_pending());
    }

    #[test]
    fn test_stale_token_ignored() {
        let mut host = ManualHost::new();
        let mut debounce = Debounce::new(DELAY);

        debounce.schedule(&mut host, "first");
        let first = host.timer_tokens()[0];
        debounce.schedule(&mut host, "second");

        assert_eq!(debounce.fire(first), None);
        assert!(debounce.is_pending());
    }

    #[test]
    fn test_cancel_clears_host_timer() {
        let mut host = ManualHost::new();
        let mut debounce = Debounce::new(DELAY);
        debounce.schedule(&mut host, ());
        debounce.cancel(&mut host);
        assert_eq!(host.pending_timers(), 0);
        assert!(host.advance(DELAY * 2).is_empty());
    }
}
