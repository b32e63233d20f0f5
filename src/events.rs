//! Defines the event types flowing through the engine, and the bounded
//! button channel that carries presses from interrupt-like producer
//! contexts into the single control loop.
//!
//! This module is the public API of the engine's event system: producers
//! hold a [`ButtonHandle`], the control loop owns the [`InputReceiver`],
//! and observers subscribe to the [`PanelEvent`] stream.

use crate::common::{SwitchId, Tick};
use crate::time::{TickCounter, TimeValue};
use std::sync::Arc;
use tokio::sync::mpsc;

/// One logical button press, stamped with the tick at the moment the edge
/// was observed.
///
/// Ownership transfers at dequeue: the channel holds the only copy until
/// the control loop consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub switch: SwitchId,
    pub observed_tick: Tick,
}

/// Creates the bounded button channel.
///
/// The channel replaces the reference device's raw read/write index pair:
/// a fixed-capacity FIFO with a non-blocking producer side and a polled
/// consumer side, tolerating indefinite drain-and-refill cycles.
pub fn button_channel(
    capacity: usize,
    counter: Arc<TickCounter>,
) -> (ButtonHandle, InputReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (
        ButtonHandle { tx, counter },
        InputReceiver { rx },
    )
}

/// The producer side of the button channel. Clone one per input source.
///
/// Safe to use from any thread or task; [`ButtonHandle::press`] never
/// blocks, loops, or allocates, so it mirrors what an edge-interrupt
/// handler is allowed to do.
#[derive(Debug, Clone)]
pub struct ButtonHandle {
    tx: mpsc::Sender<InputEvent>,
    counter: Arc<TickCounter>,
}

impl ButtonHandle {
    /// Records one press of `switch`, stamped with the current tick.
    ///
    /// If the channel is full the event is dropped silently: there is no
    /// way to apply backpressure to a human pressing a button, and the
    /// next press is still processed normally.
    pub fn press(&self, switch: SwitchId) {
        let event = InputEvent {
            switch,
            observed_tick: self.counter.now(),
        };
        self.tx.try_send(event).ok();
    }
}

/// The consumer side of the button channel, owned by the control loop.
#[derive(Debug)]
pub struct InputReceiver {
    rx: mpsc::Receiver<InputEvent>,
}

impl InputReceiver {
    /// Returns the oldest pending press, or `None` if the queue is empty.
    /// Never waits.
    pub fn poll(&mut self) -> Option<InputEvent> {
        self.rx.try_recv().ok()
    }
}

/// Output events emitted by the controller toward the front panel.
///
/// The panel itself (a UART, a terminal, a test probe) is an external
/// collaborator; it subscribes to this stream and performs the actual I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    /// A one-off diagnostic line printed at startup, reporting the
    /// configured tick rate. Not state-bearing.
    Banner { line: String },
    /// The display should show `time`. The panel appends the carriage
    /// return the reference device sends after each time string.
    TimeShown { time: TimeValue },
    /// The alert LED changed state.
    Led { on: bool },
}
