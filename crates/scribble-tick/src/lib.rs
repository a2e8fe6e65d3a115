//! Round timing primitives for Scribble.
//!
//! Three small pieces, combined by the room's round clock:
//!
//! - [`Countdown`]: yields `n, n-1, …, 0` at a fixed period.
//! - [`timer_pair`]: a [`TimerHandle`] / [`CancelToken`] pair. Cancelling
//!   or dropping the handle wakes every `cancelled()` waiter.
//! - [`TimerSlot`]: holds at most one live timer per room.
//!
//! # Integration
//!
//! The countdown is meant to sit in a `tokio::select!` next to the token:
//!
//! ```ignore
//! let mut countdown = Countdown::new(90);
//! loop {
//!     tokio::select! {
//!         _ = token.cancelled() => break,
//!         next = countdown.tick() => match next {
//!             Some(seconds) => { /* broadcast timer_update */ }
//!             None => break,
//!         },
//!     }
//! }
//! ```

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, Instant};
use tracing::{trace, warn};

// ---------------------------------------------------------------------------
// Countdown
// ---------------------------------------------------------------------------

/// Counts down from `seconds` to zero, one step per period.
///
/// The first value is yielded immediately, so a 90-second countdown
/// produces 91 values (90 through 0) over 90 periods. A step that fires
/// late pushes the remaining schedule back rather than bursting to catch
/// up, so clients never see the timer jump.
#[derive(Debug)]
pub struct Countdown {
    total: u32,
    remaining: Option<u32>,
    period: Duration,
    /// When the next step is due. `None` until the first step.
    next_tick: Option<Instant>,
    late_ticks: u64,
}

impl Countdown {
    /// One step per second.
    pub const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

    pub fn new(seconds: u32) -> Self {
        Self::with_period(seconds, Self::DEFAULT_PERIOD)
    }

    /// Uses a custom step length. Zero is bumped to one millisecond.
    pub fn with_period(seconds: u32, period: Duration) -> Self {
        Self {
            total: seconds,
            remaining: Some(seconds),
            period: period.max(Duration::from_millis(1)),
            next_tick: None,
            late_ticks: 0,
        }
    }

    /// Waits for the next step and returns the seconds left.
    ///
    /// Returns `None` once zero has been yielded. Cancel-safe: dropping
    /// the future before it resolves loses nothing.
    pub async fn tick(&mut self) -> Option<u32> {
        let current = self.remaining?;

        let now = match self.next_tick {
            Some(due) => {
                time::sleep_until(due).await;
                let now = Instant::now();
                let late_by = now.saturating_duration_since(due);
                if late_by > self.period / 10 {
                    self.late_ticks += 1;
                    warn!(
                        remaining = current,
                        late_ms = late_by.as_secs_f64() * 1000.0,
                        "countdown step fired late, shifting schedule"
                    );
                    self.next_tick = Some(now + self.period);
                } else {
                    self.next_tick = Some(due + self.period);
                }
                now
            }
            None => {
                let now = Instant::now();
                self.next_tick = Some(now + self.period);
                now
            }
        };

        self.remaining = current.checked_sub(1);
        trace!(remaining = current, at = ?now, "countdown step");
        Some(current)
    }

    /// Seconds the countdown started from.
    pub fn total(&self) -> u32 {
        self.total
    }

    /// The value the next [`tick`](Self::tick) will yield, if any.
    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    pub fn is_finished(&self) -> bool {
        self.remaining.is_none()
    }

    /// How many steps fired more than 10% of a period late.
    pub fn late_ticks(&self) -> u64 {
        self.late_ticks
    }
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Creates a linked handle/token pair.
pub fn timer_pair() -> (TimerHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (TimerHandle { tx }, CancelToken { rx })
}

/// Owning side of a timer. Cancels its tokens on [`cancel`](Self::cancel)
/// or when dropped.
#[derive(Debug)]
pub struct TimerHandle {
    tx: watch::Sender<bool>,
}

impl TimerHandle {
    pub fn cancel(&self) {
        // No receivers means the timer task already exited.
        let _ = self.tx.send(true);
    }

    /// Returns `true` once every token has been dropped, i.e. the task
    /// holding the token has finished.
    pub fn is_finished(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Waiting side of a timer, held by the task that does the timing.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// Resolves once the handle is cancelled or dropped.
    pub async fn cancelled(&mut self) {
        // An Err means the handle is gone, which counts as cancelled.
        let _ = self.rx.wait_for(|cancelled| *cancelled).await;
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }
}

// ---------------------------------------------------------------------------
// TimerSlot
// ---------------------------------------------------------------------------

/// Holds at most one live timer.
///
/// A room owns one slot. Arming an occupied slot is a no-op, which makes
/// "start the round clock" idempotent. A slot whose task has exited (all
/// tokens dropped) is free again without an explicit disarm.
#[derive(Debug, Default)]
pub struct TimerSlot {
    handle: Option<TimerHandle>,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the slot and returns the token for the new timer task.
    ///
    /// Returns `None` if a live timer already occupies the slot.
    pub fn arm(&mut self) -> Option<CancelToken> {
        if self.is_armed() {
            return None;
        }
        let (handle, token) = timer_pair();
        self.handle = Some(handle);
        Some(token)
    }

    /// Cancels the current timer, if any.
    pub fn disarm(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.cancel();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_period_zero_is_clamped() {
        let c = Countdown::with_period(3, Duration::ZERO);
        assert_eq!(c.period, Duration::from_millis(1));
    }

    #[test]
    fn test_new_countdown_accessors() {
        let c = Countdown::new(90);
        assert_eq!(c.total(), 90);
        assert_eq!(c.remaining(), Some(90));
        assert!(!c.is_finished());
        assert_eq!(c.late_ticks(), 0);
    }

    #[test]
    fn test_token_sees_cancel_without_await() {
        let (handle, token) = timer_pair();
        assert!(!token.is_cancelled());
        handle.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_token_sees_dropped_handle() {
        let (handle, token) = timer_pair();
        drop(handle);
        assert!(token.is_cancelled());
    }
}
