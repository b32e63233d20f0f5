//! Defines all configuration structures for the Ovenclock engine.
//!
//! These structs are designed to be deserialized from a configuration file
//! (e.g., a TOML file) using `serde`. This allows the engine's behavior,
//! including its tick rate and every timing threshold, to be defined
//! externally from the application code — and to be shrunk for tests that
//! run the same state machine at accelerated simulated tick rates.

use serde::Deserialize;
use std::time::Duration;

/// The top-level configuration for the [`OvenClockEngine`](crate::engine::OvenClockEngine).
#[derive(Debug, Clone, Deserialize)]
pub struct OvenClockConfig {
    /// The tick speed of the master `SystemClock`.
    #[serde(default)]
    pub resolution: ClockResolution,

    /// Capacity of the bounded button-event queue. Events pushed while the
    /// queue is full are silently dropped.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// The named timing thresholds, all expressed in ticks.
    #[serde(default)]
    pub thresholds: Thresholds,

    /// The wall-clock time the controller starts at. `None` falls back to
    /// the reference seed of 12:12; the dev binary fills this in from the
    /// local time instead.
    #[serde(default)]
    pub clock_seed: Option<ClockSeed>,
}

impl Default for OvenClockConfig {
    fn default() -> Self {
        Self {
            resolution: ClockResolution::default(),
            queue_capacity: default_queue_capacity(),
            thresholds: Thresholds::default(),
            clock_seed: None,
        }
    }
}

/// Defines the operational speed of the `SystemClock`.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClockResolution {
    /// One tick per millisecond, the reference hardware rate.
    #[default]
    Millisecond,
    /// A user-defined speed in ticks per second, for accelerated or
    /// slowed-down simulation.
    Custom { ticks_per_second: u64 },
}

impl ClockResolution {
    /// The number of ticks the counter advances per second.
    pub fn ticks_per_second(&self) -> u64 {
        match self {
            ClockResolution::Millisecond => 1_000,
            ClockResolution::Custom { ticks_per_second } => (*ticks_per_second).max(1),
        }
    }

    /// The wall-time duration of a single tick.
    pub fn period(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / self.ticks_per_second())
    }
}

/// The named timing thresholds of the controller, in ticks.
///
/// At the reference resolution (1 ms per tick) the defaults reproduce the
/// original device: a 200 ms debounce window, a 10 s arming window, a 60 s
/// minute cycle, and a 15 s alert-LED ceiling.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Thresholds {
    /// Minimum tick separation between two accepted presses of the same switch.
    #[serde(default = "default_debounce_ticks")]
    pub debounce_ticks: u32,
    /// How long a zeroed alarm stays in the arming state before the display
    /// reverts to the clock.
    #[serde(default = "default_arming_window_ticks")]
    pub arming_window_ticks: u32,
    /// One displayed minute. Drives both the wall-clock advance and the
    /// alarm countdown cycle, a single constant as on the reference device.
    #[serde(default = "default_minute_ticks")]
    pub minute_ticks: u32,
    /// Maximum time the alert LED stays on after the alarm fires, absent a
    /// cancelling press.
    #[serde(default = "default_led_on_max_ticks")]
    pub led_on_max_ticks: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            debounce_ticks: default_debounce_ticks(),
            arming_window_ticks: default_arming_window_ticks(),
            minute_ticks: default_minute_ticks(),
            led_on_max_ticks: default_led_on_max_ticks(),
        }
    }
}

/// The hour and minute the wall clock starts at.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ClockSeed {
    pub hour: u8,
    pub minute: u8,
}

// --- Default value functions for serde ---

fn default_queue_capacity() -> usize {
    50
}

fn default_debounce_ticks() -> u32 {
    200
}

fn default_arming_window_ticks() -> u32 {
    10_000
}

fn default_minute_ticks() -> u32 {
    60_000
}

fn default_led_on_max_ticks() -> u32 {
    15_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_device() {
        let cfg = OvenClockConfig::default();
        assert_eq!(cfg.resolution.ticks_per_second(), 1_000);
        assert_eq!(cfg.resolution.period(), Duration::from_millis(1));
        assert_eq!(cfg.queue_capacity, 50);
        assert_eq!(cfg.thresholds.debounce_ticks, 200);
        assert_eq!(cfg.thresholds.arming_window_ticks, 10_000);
        assert_eq!(cfg.thresholds.minute_ticks, 60_000);
        assert_eq!(cfg.thresholds.led_on_max_ticks, 15_000);
        assert!(cfg.clock_seed.is_none());
    }

    #[test]
    fn deserializes_from_toml() {
        let toml = r#"
            queue_capacity = 8

            [resolution.custom]
            ticks_per_second = 100

            [thresholds]
            debounce_ticks = 2

            [clock_seed]
            hour = 6
            minute = 30
        "#;
        let cfg: OvenClockConfig = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.resolution.ticks_per_second(), 100);
        assert_eq!(cfg.queue_capacity, 8);
        assert_eq!(cfg.thresholds.debounce_ticks, 2);
        // Unset thresholds keep their reference defaults.
        assert_eq!(cfg.thresholds.minute_ticks, 60_000);
        let seed = cfg.clock_seed.unwrap();
        assert_eq!((seed.hour, seed.minute), (6, 30));
    }

    #[test]
    fn custom_resolution_period() {
        let res = ClockResolution::Custom { ticks_per_second: 200 };
        assert_eq!(res.period(), Duration::from_millis(5));
    }
}
