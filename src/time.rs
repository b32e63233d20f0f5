//! The engine's notion of time: displayed hour/minute values, the master
//! tick counter, and the `SystemClock` task that drives it.

use crate::common::Tick;
use crate::config::ClockResolution;
use std::fmt;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

/// A normalized hour:minute value, shared by the wall clock and the alarm
/// countdown.
///
/// The invariant `minute < 60 && hour < 24` holds after every operation.
/// `Display` renders the device's panel format: hour right-aligned in a
/// two-character field, minute zero-padded (`12:05`, ` 3:07`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeValue {
    hour: u8,
    minute: u8,
}

impl TimeValue {
    /// The zero value `0:00`, where the alarm countdown floors.
    pub const ZERO: TimeValue = TimeValue { hour: 0, minute: 0 };

    /// Creates a normalized value; out-of-range inputs roll over.
    pub fn new(hour: u8, minute: u8) -> Self {
        Self {
            hour: (hour + minute / 60) % 24,
            minute: minute % 60,
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Advances one minute, carrying into the hour and wrapping 23:59 to 0:00.
    pub fn increment(&mut self) {
        self.minute += 1;
        if self.minute == 60 {
            self.minute = 0;
            self.hour += 1;
            if self.hour == 24 {
                self.hour = 0;
            }
        }
    }

    /// Steps back one minute, borrowing an hour when the minute is zero.
    ///
    /// A no-op at `0:00`: the countdown stops there and never wraps past
    /// midnight backwards.
    pub fn decrement(&mut self) {
        if self.is_zero() {
            return;
        }
        if self.minute == 0 {
            self.hour -= 1;
            self.minute = 59;
        } else {
            self.minute -= 1;
        }
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>2}:{:02}", self.hour, self.minute)
    }
}

/// The process-wide monotonic tick counter.
///
/// Exactly one writer exists (the [`SystemClock`] task); every other
/// context reads the current value with a single atomic load. The value
/// wraps at the `i32` range, which [`Tick::elapsed_since`] tolerates.
#[derive(Debug, Default)]
pub struct TickCounter {
    ticks: AtomicI32,
}

impl TickCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the current tick. Safe from any task or thread.
    pub fn now(&self) -> Tick {
        Tick(self.ticks.load(Ordering::Relaxed))
    }

    /// Advances the counter by one tick, wrapping at the integer range.
    /// Called only by the `SystemClock` task.
    pub fn advance(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }
}

/// The periodic task that acts as the single source of time.
///
/// On every period it advances the shared [`TickCounter`] exactly once.
/// It does nothing else: all timing decisions are made by the control loop
/// reading the counter.
pub struct SystemClock {
    resolution: ClockResolution,
    counter: Arc<TickCounter>,
}

impl SystemClock {
    pub fn new(resolution: ClockResolution, counter: Arc<TickCounter>) -> Self {
        Self { resolution, counter }
    }

    /// Runs the ticker until a shutdown signal is received.
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) {
        let mut interval = tokio::time::interval(self.resolution.period());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first interval tick completes immediately; consume it so the
        // counter starts at zero.
        interval.tick().await;
        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break,
                _ = interval.tick() => self.counter.advance(),
            }
        }
        info!("SystemClock stopped at tick {:?}.", self.counter.now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_carries_and_wraps() {
        let mut t = TimeValue::new(12, 59);
        t.increment();
        assert_eq!(t, TimeValue::new(13, 0));

        let mut midnight = TimeValue::new(23, 59);
        midnight.increment();
        assert_eq!(midnight, TimeValue::ZERO);
    }

    #[test]
    fn decrement_borrows_an_hour() {
        let mut t = TimeValue::new(13, 0);
        t.decrement();
        assert_eq!(t, TimeValue::new(12, 59));
    }

    #[test]
    fn decrement_floors_at_zero() {
        let mut t = TimeValue::ZERO;
        t.decrement();
        assert_eq!(t, TimeValue::ZERO);
    }

    #[test]
    fn increment_inverts_decrement_away_from_zero() {
        let mut t = TimeValue::new(7, 30);
        t.decrement();
        t.increment();
        assert_eq!(t, TimeValue::new(7, 30));

        // The floor breaks the inverse at 0:00.
        let mut z = TimeValue::ZERO;
        z.decrement();
        z.increment();
        assert_eq!(z, TimeValue::new(0, 1));
    }

    #[test]
    fn full_daily_cycle_returns_to_start() {
        let start = TimeValue::new(12, 12);
        let mut t = start;
        for _ in 0..1440 {
            t.increment();
        }
        assert_eq!(t, start);
    }

    #[test]
    fn panel_format() {
        assert_eq!(TimeValue::new(12, 5).to_string(), "12:05");
        assert_eq!(TimeValue::new(3, 7).to_string(), " 3:07");
        assert_eq!(TimeValue::ZERO.to_string(), " 0:00");
    }

    #[test]
    fn counter_advances_and_wraps() {
        let counter = TickCounter::new();
        assert_eq!(counter.now(), Tick(0));
        counter.advance();
        counter.advance();
        assert_eq!(counter.now(), Tick(2));

        let near_max = TickCounter::new();
        near_max.ticks.store(i32::MAX, Ordering::Relaxed);
        near_max.advance();
        assert_eq!(near_max.now(), Tick(i32::MIN));
    }
}
