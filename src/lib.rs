//! # Ovenclock
//!
//! An event-driven oven/kitchen timer engine for Rust.
//!
//! Ovenclock provides the control logic of a two-button kitchen timer: a
//! free-running wall clock, an alarm countdown armed in one-minute steps,
//! and a visual alert when the countdown expires. The logic is driven
//! purely by an integer tick counter, so the same state machine runs
//! against real time or at accelerated simulated tick rates.
//!
//! ## Core Concepts
//!
//! - **SystemClock**: A periodic ticker that acts as the single source of
//!   time, advancing the shared tick counter once per period.
//! - **Button channel**: A bounded, non-blocking queue carrying tick-stamped
//!   presses from any producer context into the single control loop. A full
//!   queue silently drops new presses.
//! - **Debounce filter**: Per-switch suppression of presses that arrive
//!   inside the bounce window of the last accepted press.
//! - **Display/alarm state machine**: Consumes debounced presses and
//!   elapsed-tick checks; emits `PanelEvent`s for the display and the
//!   alert LED.
//! - **Configuration-Driven**: Tick rate, queue capacity, and every timing
//!   threshold come from an `OvenClockConfig`, often loaded from a file.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use ovenclock::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // 1. Create a default configuration (1 ms ticks, reference thresholds).
//!     let config = OvenClockConfig::default();
//!
//!     // 2. Create the engine.
//!     let engine = OvenClockEngine::new(config);
//!
//!     // 3. Subscribe to the panel stream before starting the engine.
//!     let mut panel = engine.subscribe_panel_events();
//!     tokio::spawn(async move {
//!         while let Ok(event) = panel.recv().await {
//!             println!("Panel: {:?}", event);
//!         }
//!     });
//!
//!     // 4. Wire the buttons. `press` is non-blocking, from any context.
//!     let buttons = engine.button_handle();
//!     buttons.press(SwitchId::Switch2); // arm one minute
//!
//!     // 5. Run the engine. It will shut down on Ctrl+C.
//!     engine.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub const ENGINE_NAME: &str = "Ovenclock";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Declare all the modules in the crate.
pub mod common;
pub mod components;
pub mod config;
pub mod engine;
pub mod events;
pub mod time;

/// A prelude module for easy importing of the most common Ovenclock types.
pub mod prelude {
    pub use crate::common::{SwitchId, Tick};
    pub use crate::components::controller::DisplayState;
    pub use crate::config::{ClockResolution, ClockSeed, OvenClockConfig, Thresholds};
    pub use crate::engine::OvenClockEngine;
    pub use crate::events::{ButtonHandle, InputEvent, PanelEvent};
    pub use crate::time::TimeValue;
}
