//! The components that make up the control loop: the switch-bounce filter
//! and the display/alarm state machine.

pub mod controller;
pub mod debounce;
