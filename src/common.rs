//! Contains common, primitive types shared across the Ovenclock engine.
//!
//! This module defines the basic value types used to identify input sources
//! and to carry points-in-time from the master tick counter. Using distinct
//! types improves type safety and code clarity.

use serde::Deserialize;

/// Identifies one of the two physical buttons on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchId {
    /// The decrement / cancel button (SW1 on the reference board).
    Switch1,
    /// The increment / arm button (SW2 on the reference board).
    Switch2,
}

/// A point in time expressed as a value of the master tick counter.
///
/// The counter is a free-running `i32` that wraps at the signed-integer
/// range, so two `Tick`s must never be compared by naive subtraction.
/// [`Tick::elapsed_since`] computes the magnitude of the wrapping
/// difference, which stays correct across the wrap boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tick(pub i32);

impl Tick {
    /// Returns how many ticks separate `self` from `earlier`.
    ///
    /// This is the magnitude of the wrapping difference, mirroring the
    /// `abs(now - then)` comparisons the reference controller performs on
    /// its shared counter.
    pub fn elapsed_since(self, earlier: Tick) -> u32 {
        self.0.wrapping_sub(earlier.0).unsigned_abs()
    }
}
