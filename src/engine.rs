//! The engine that orchestrates the whole Ovenclock system.

use crate::components::controller::TimerController;
use crate::components::debounce::DebounceFilter;
use crate::config::OvenClockConfig;
use crate::events::{button_channel, ButtonHandle, InputReceiver, PanelEvent};
use crate::time::{SystemClock, TickCounter, TimeValue};
use anyhow::{anyhow, Result};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{error, info};

/// Panel-event stream capacity. Slow subscribers lag rather than block the loop.
const PANEL_CHANNEL_CAPACITY: usize = 256;

/// The wall-clock seed used when the configuration provides none.
const REFERENCE_SEED: (u8, u8) = (12, 12);

/// The main Ovenclock engine.
///
/// This struct is the central point of control. It owns the master tick
/// counter and the button channel, and drives the single-threaded control
/// loop that consumes both. The `Engine` is designed to be cloned and
/// shared across tasks, providing a handle to the running instance.
#[derive(Clone)]
pub struct OvenClockEngine {
    config: Arc<OvenClockConfig>,
    ticks: Arc<TickCounter>,
    buttons: ButtonHandle,
    // Handed to the control loop exactly once, at start.
    input_rx: Arc<Mutex<Option<InputReceiver>>>,
    panel_tx: broadcast::Sender<PanelEvent>,
}

impl OvenClockEngine {
    /// Creates a new `OvenClockEngine` with the given configuration.
    pub fn new(config: OvenClockConfig) -> Self {
        let ticks = Arc::new(TickCounter::new());
        let (buttons, input_rx) = button_channel(config.queue_capacity.max(1), ticks.clone());
        let (panel_tx, _) = broadcast::channel(PANEL_CHANNEL_CAPACITY);
        Self {
            config: Arc::new(config),
            ticks,
            buttons,
            input_rx: Arc::new(Mutex::new(Some(input_rx))),
            panel_tx,
        }
    }

    /// Returns a handle for injecting button presses. Clone one per input
    /// source; `press` is non-blocking and callable from any thread.
    pub fn button_handle(&self) -> ButtonHandle {
        self.buttons.clone()
    }

    /// Subscribes to the [`PanelEvent`] stream.
    pub fn subscribe_panel_events(&self) -> broadcast::Receiver<PanelEvent> {
        self.panel_tx.subscribe()
    }

    /// Reads the master tick counter. Diagnostic only.
    pub fn current_tick(&self) -> crate::common::Tick {
        self.ticks.now()
    }

    /// Spawns the `SystemClock` task and the control loop.
    ///
    /// Both tasks stop when `shutdown_tx` broadcasts. Starting the same
    /// engine twice is an error: there is exactly one control loop per
    /// engine, because it is the sole consumer of the button channel.
    pub fn start(&self, shutdown_tx: &broadcast::Sender<()>) -> Result<()> {
        let input_rx = self
            .input_rx
            .lock()
            .map_err(|_| anyhow!("input receiver lock poisoned"))?
            .take()
            .ok_or_else(|| anyhow!("engine already started"))?;

        let clock = SystemClock::new(self.config.resolution.clone(), self.ticks.clone());
        tokio::spawn(clock.run(shutdown_tx.subscribe()));

        let engine = self.clone();
        tokio::spawn(engine.control_loop(input_rx, shutdown_tx.subscribe()));
        Ok(())
    }

    /// Runs the engine until a Ctrl+C signal is received.
    ///
    /// This method will:
    /// 1. Start the `SystemClock` and control-loop tasks.
    /// 2. Wait for a Ctrl+C signal to initiate a graceful shutdown.
    /// 3. Broadcast shutdown to all tasks.
    pub async fn run(&self) -> Result<()> {
        info!("OvenClockEngine starting up...");
        let (shutdown_tx, _) = broadcast::channel(1);
        self.start(&shutdown_tx)?;

        info!(
            "Engine running at {} ticks/s. Press Ctrl+C to shut down.",
            self.config.resolution.ticks_per_second()
        );
        tokio::signal::ctrl_c().await?;

        info!("Shutdown signal received. Broadcasting to all tasks...");
        if shutdown_tx.send(()).is_err() {
            error!("Failed to send shutdown signal. Some tasks may not terminate gracefully.");
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        info!("OvenClockEngine has shut down.");
        Ok(())
    }

    #[doc(hidden)]
    async fn control_loop(
        self,
        mut input_rx: InputReceiver,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) {
        let start = self.ticks.now();
        let thresholds = self.config.thresholds;
        let mut filter = DebounceFilter::new(thresholds.debounce_ticks, start);

        // The reference firmware prints its clock frequency before the
        // first time render; the banner mirrors that diagnostic line.
        self.panel_tx
            .send(PanelEvent::Banner {
                line: format!("{} ticks/s", self.config.resolution.ticks_per_second()),
            })
            .ok();

        let seed = self
            .config
            .clock_seed
            .map(|s| TimeValue::new(s.hour, s.minute))
            .unwrap_or_else(|| TimeValue::new(REFERENCE_SEED.0, REFERENCE_SEED.1));
        let mut controller =
            TimerController::new(thresholds, seed, start, self.panel_tx.clone());

        let mut interval = tokio::time::interval(self.config.resolution.period());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break,
                _ = interval.tick() => {
                    // One snapshot of time and at most one event per
                    // iteration; every branch below sees the same `now`.
                    let now = self.ticks.now();
                    let event = input_rx.poll().filter(|ev| filter.accept(ev));
                    controller.step(now, event);
                }
            }
        }
        info!("Control loop stopped at tick {:?}.", self.ticks.now());
    }
}
