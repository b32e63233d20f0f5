//! The display/alarm state machine at the center of the control loop.

use crate::common::{SwitchId, Tick};
use crate::config::Thresholds;
use crate::events::{InputEvent, PanelEvent};
use crate::time::TimeValue;
use tokio::sync::broadcast;

/// Which time the panel is currently dedicated to.
///
/// Exactly one state is active at any moment. The controller keeps no
/// history beyond the current state and the tick marks needed to evaluate
/// its timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    /// Showing the free-running wall clock.
    Clock,
    /// A zeroed alarm is open for arming; reverts to `Clock` when the
    /// arming window passes without input.
    AlarmArming,
    /// A non-zero alarm is counting down, one minute per cycle.
    AlarmRunning,
}

/// The control-loop state machine: consumes debounced presses and elapsed
/// time, drives the display state, the alert LED, and panel rendering.
///
/// Every transition is total over its inputs; there is no error state and
/// nothing here can halt the loop. All rendering and LED changes leave as
/// [`PanelEvent`]s on the broadcast stream.
pub struct TimerController {
    thresholds: Thresholds,
    panel_tx: broadcast::Sender<PanelEvent>,

    state: DisplayState,
    clock: TimeValue,
    alarm: TimeValue,
    led_on: bool,

    clock_minute_mark: Tick,
    alarm_cycle_mark: Tick,
    arming_mark: Tick,
    led_on_mark: Tick,
}

impl TimerController {
    /// Creates the controller showing `clock_seed`, with every tick mark
    /// anchored at `start`. Renders the seed immediately, as the reference
    /// firmware does before its first loop iteration.
    pub fn new(
        thresholds: Thresholds,
        clock_seed: TimeValue,
        start: Tick,
        panel_tx: broadcast::Sender<PanelEvent>,
    ) -> Self {
        let controller = Self {
            thresholds,
            panel_tx,
            state: DisplayState::Clock,
            clock: clock_seed,
            alarm: TimeValue::ZERO,
            led_on: false,
            clock_minute_mark: start,
            alarm_cycle_mark: start,
            arming_mark: start,
            led_on_mark: start,
        };
        controller.show(controller.clock);
        controller
    }

    /// Advances the state machine by one loop iteration.
    ///
    /// `now` is the single tick snapshot the whole iteration observes;
    /// `event` is the at-most-one debounced press dequeued this iteration.
    /// Exactly one of the event handlers or the idle checks runs, and the
    /// LED ceiling and wall-clock minute are then evaluated regardless, so
    /// sustained button activity can never starve either of them.
    pub fn step(&mut self, now: Tick, event: Option<InputEvent>) {
        match event {
            Some(ev) => match ev.switch {
                SwitchId::Switch2 => self.on_switch2(now),
                SwitchId::Switch1 => self.on_switch1(now),
            },
            None => self.on_idle(now),
        }
        self.check_led_ceiling(now);
        self.check_clock_minute(now);
    }

    pub fn state(&self) -> DisplayState {
        self.state
    }

    pub fn clock_time(&self) -> TimeValue {
        self.clock
    }

    pub fn alarm_time(&self) -> TimeValue {
        self.alarm
    }

    pub fn led_is_on(&self) -> bool {
        self.led_on
    }

    /// Switch 2: add a minute to the alarm and (re)start its cycle.
    fn on_switch2(&mut self, now: Tick) {
        self.set_led(false);
        self.state = DisplayState::AlarmRunning;
        self.alarm.increment();
        self.show(self.alarm);
        self.alarm_cycle_mark = now;
    }

    /// Switch 1: cancel the LED if lit; otherwise step the alarm down,
    /// falling back to the arming window when it reaches zero.
    fn on_switch1(&mut self, now: Tick) {
        if self.led_on {
            self.set_led(false);
            return;
        }
        if self.alarm.is_zero() {
            self.state = DisplayState::AlarmArming;
            self.arming_mark = now;
        } else if self.state == DisplayState::AlarmRunning {
            self.alarm.decrement();
            if self.alarm.is_zero() {
                self.state = DisplayState::AlarmArming;
                self.arming_mark = now;
            } else {
                self.alarm_cycle_mark = now;
            }
        }
        self.show(self.alarm);
    }

    /// No accepted event this iteration: evaluate the arming window and
    /// the alarm countdown cycle.
    fn on_idle(&mut self, now: Tick) {
        if self.state == DisplayState::AlarmArming
            && now.elapsed_since(self.arming_mark) >= self.thresholds.arming_window_ticks
        {
            self.state = DisplayState::Clock;
            self.show(self.clock);
        }

        if self.state == DisplayState::AlarmRunning
            && now.elapsed_since(self.alarm_cycle_mark) >= self.thresholds.minute_ticks
        {
            self.alarm.decrement();
            if self.alarm.is_zero() {
                // The alarm goes off.
                self.state = DisplayState::Clock;
                self.set_led(true);
                self.led_on_mark = now;
                self.show(self.clock);
            } else {
                self.alarm_cycle_mark = now;
                self.show(self.alarm);
            }
        }
    }

    fn check_led_ceiling(&mut self, now: Tick) {
        if self.led_on
            && now.elapsed_since(self.led_on_mark) >= self.thresholds.led_on_max_ticks
        {
            self.set_led(false);
        }
    }

    fn check_clock_minute(&mut self, now: Tick) {
        if now.elapsed_since(self.clock_minute_mark) >= self.thresholds.minute_ticks {
            self.clock_minute_mark = now;
            self.clock.increment();
            if self.state == DisplayState::Clock {
                self.show(self.clock);
            }
        }
    }

    fn set_led(&mut self, on: bool) {
        if self.led_on != on {
            self.led_on = on;
            self.panel_tx.send(PanelEvent::Led { on }).ok();
        }
    }

    fn show(&self, time: TimeValue) {
        self.panel_tx.send(PanelEvent::TimeShown { time }).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLDS: Thresholds = Thresholds {
        debounce_ticks: 200,
        arming_window_ticks: 10_000,
        minute_ticks: 60_000,
        led_on_max_ticks: 15_000,
    };

    struct Rig {
        controller: TimerController,
        panel_rx: broadcast::Receiver<PanelEvent>,
    }

    impl Rig {
        fn new() -> Self {
            let (panel_tx, panel_rx) = broadcast::channel(256);
            let controller =
                TimerController::new(THRESHOLDS, TimeValue::new(12, 12), Tick(0), panel_tx);
            let mut rig = Self { controller, panel_rx };
            // Discard the boot render of the seeded clock.
            assert_eq!(
                rig.drain(),
                vec![PanelEvent::TimeShown { time: TimeValue::new(12, 12) }]
            );
            rig
        }

        fn press(&mut self, switch: SwitchId, tick: i32) {
            let event = InputEvent { switch, observed_tick: Tick(tick) };
            self.controller.step(Tick(tick), Some(event));
        }

        fn idle(&mut self, tick: i32) {
            self.controller.step(Tick(tick), None);
        }

        fn drain(&mut self) -> Vec<PanelEvent> {
            let mut events = Vec::new();
            while let Ok(event) = self.panel_rx.try_recv() {
                events.push(event);
            }
            events
        }
    }

    #[test]
    fn switch2_arms_the_alarm_at_one_minute() {
        let mut rig = Rig::new();

        rig.press(SwitchId::Switch2, 1_000);

        assert_eq!(rig.controller.state(), DisplayState::AlarmRunning);
        assert_eq!(rig.controller.alarm_time(), TimeValue::new(0, 1));
        assert_eq!(
            rig.drain(),
            vec![PanelEvent::TimeShown { time: TimeValue::new(0, 1) }]
        );
    }

    #[test]
    fn switch1_counts_a_one_minute_alarm_down_into_the_arming_window() {
        let mut rig = Rig::new();
        rig.press(SwitchId::Switch2, 1_000);
        rig.drain();

        rig.press(SwitchId::Switch1, 2_000);

        assert_eq!(rig.controller.state(), DisplayState::AlarmArming);
        assert_eq!(rig.controller.alarm_time(), TimeValue::ZERO);
        assert_eq!(
            rig.drain(),
            vec![PanelEvent::TimeShown { time: TimeValue::ZERO }]
        );

        // Still arming just inside the window...
        rig.idle(2_000 + 9_999);
        assert_eq!(rig.controller.state(), DisplayState::AlarmArming);

        // ...and back to the clock once it passes.
        rig.idle(2_000 + 10_000);
        assert_eq!(rig.controller.state(), DisplayState::Clock);
        assert_eq!(
            rig.drain(),
            vec![PanelEvent::TimeShown { time: TimeValue::new(12, 12) }]
        );
    }

    #[test]
    fn switch1_restarts_the_arming_window() {
        let mut rig = Rig::new();
        rig.press(SwitchId::Switch1, 1_000);
        assert_eq!(rig.controller.state(), DisplayState::AlarmArming);
        // A zeroed alarm renders 0:00 on the arming entry.
        assert_eq!(
            rig.drain(),
            vec![PanelEvent::TimeShown { time: TimeValue::ZERO }]
        );

        // Another press near the end of the window restarts it.
        rig.press(SwitchId::Switch1, 10_500);
        rig.idle(10_500 + 9_999);
        assert_eq!(rig.controller.state(), DisplayState::AlarmArming);
        rig.idle(10_500 + 10_000);
        assert_eq!(rig.controller.state(), DisplayState::Clock);
    }

    #[test]
    fn countdown_expiry_fires_the_led_and_reverts_to_clock() {
        let mut rig = Rig::new();
        rig.press(SwitchId::Switch2, 1_000);
        rig.drain();

        // One cycle later the 0:01 alarm hits zero.
        rig.idle(1_000 + 60_000);

        assert_eq!(rig.controller.state(), DisplayState::Clock);
        assert_eq!(rig.controller.alarm_time(), TimeValue::ZERO);
        assert!(rig.controller.led_is_on());
        // The expiry renders the clock as it stood, and the unconditional
        // minute check then advances and re-renders it in the same iteration.
        assert_eq!(
            rig.drain(),
            vec![
                PanelEvent::Led { on: true },
                PanelEvent::TimeShown { time: TimeValue::new(12, 12) },
                PanelEvent::TimeShown { time: TimeValue::new(12, 13) },
            ]
        );
        assert_eq!(rig.controller.clock_time(), TimeValue::new(12, 13));
    }

    #[test]
    fn multi_minute_countdown_renders_each_cycle() {
        let mut rig = Rig::new();
        rig.press(SwitchId::Switch2, 0);
        rig.press(SwitchId::Switch2, 1_000);
        rig.drain();
        assert_eq!(rig.controller.alarm_time(), TimeValue::new(0, 2));

        rig.idle(1_000 + 60_000);
        assert_eq!(rig.controller.state(), DisplayState::AlarmRunning);
        assert_eq!(rig.controller.alarm_time(), TimeValue::new(0, 1));
        assert_eq!(
            rig.drain(),
            vec![PanelEvent::TimeShown { time: TimeValue::new(0, 1) }]
        );
        assert!(!rig.controller.led_is_on());
    }

    #[test]
    fn led_clears_automatically_after_its_ceiling() {
        let mut rig = Rig::new();
        rig.press(SwitchId::Switch2, 1_000);
        rig.idle(61_000);
        rig.drain();
        assert!(rig.controller.led_is_on());

        rig.idle(61_000 + 14_999);
        assert!(rig.controller.led_is_on());

        rig.idle(61_000 + 15_000);
        assert!(!rig.controller.led_is_on());
        assert_eq!(rig.drain(), vec![PanelEvent::Led { on: false }]);
    }

    #[test]
    fn switch1_clears_the_led_and_nothing_else() {
        let mut rig = Rig::new();
        rig.press(SwitchId::Switch2, 1_000);
        rig.idle(61_000);
        rig.drain();
        assert!(rig.controller.led_is_on());

        rig.press(SwitchId::Switch1, 62_000);

        assert!(!rig.controller.led_is_on());
        assert_eq!(rig.controller.state(), DisplayState::Clock);
        assert_eq!(rig.controller.alarm_time(), TimeValue::ZERO);
        // Only the LED event: a cancelling press does not render.
        assert_eq!(rig.drain(), vec![PanelEvent::Led { on: false }]);
    }

    #[test]
    fn wall_clock_advances_every_minute_and_renders_in_clock_state() {
        let mut rig = Rig::new();

        rig.idle(60_000);
        assert_eq!(rig.controller.clock_time(), TimeValue::new(12, 13));
        assert_eq!(
            rig.drain(),
            vec![PanelEvent::TimeShown { time: TimeValue::new(12, 13) }]
        );

        rig.idle(120_000);
        assert_eq!(rig.controller.clock_time(), TimeValue::new(12, 14));
    }

    #[test]
    fn sustained_button_activity_cannot_starve_the_wall_clock() {
        let mut rig = Rig::new();

        // A switch-2 press on every single iteration for two minutes of
        // ticks. The alarm churns, but the wall clock still advances.
        let mut tick = 0;
        while tick <= 120_000 {
            rig.press(SwitchId::Switch2, tick);
            tick += 1_000;
        }

        assert_eq!(rig.controller.state(), DisplayState::AlarmRunning);
        assert_eq!(rig.controller.clock_time(), TimeValue::new(12, 14));
    }
}
