//! Switch-bounce filtering for the two button inputs.

use crate::common::{SwitchId, Tick};
use crate::events::InputEvent;

/// Rejects spurious rapid repeats of the same switch.
///
/// Each switch owns the tick of its last *accepted* press. A new press
/// closer than the debounce window to that mark is rejected — treated as
/// "no event this iteration" — and the mark is left unchanged. The two
/// switches are filtered independently, so rapid alternating presses on
/// different switches are never cross-debounced.
#[derive(Debug)]
pub struct DebounceFilter {
    window: u32,
    last_accepted: [Tick; 2],
}

impl DebounceFilter {
    /// Creates a filter with both marks seeded at `start`, so presses
    /// inside the first window after boot are rejected, as on the
    /// reference device.
    pub fn new(window: u32, start: Tick) -> Self {
        Self {
            window,
            last_accepted: [start; 2],
        }
    }

    /// Returns `true` if the event passes the filter, updating the mark
    /// for its switch. A rejected event leaves the mark untouched.
    pub fn accept(&mut self, event: &InputEvent) -> bool {
        let mark = &mut self.last_accepted[slot(event.switch)];
        if event.observed_tick.elapsed_since(*mark) < self.window {
            return false;
        }
        *mark = event.observed_tick;
        true
    }
}

fn slot(switch: SwitchId) -> usize {
    match switch {
        SwitchId::Switch1 => 0,
        SwitchId::Switch2 => 1,
    }
}
