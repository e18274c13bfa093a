//! Waveform state machine
//!
//! ```text
//!   Prepare ──► Output ──(keypad edge)──► Disable ──► Polling ──(key 6)──► Prepare
//! ```
//!
//! [`WaveformEngine::step`] runs one foreground iteration. The timer and keypad interrupt
//! handlers call [`on_timer`](WaveformEngine::on_timer) and
//! [`on_keypad_edge`](WaveformEngine::on_keypad_edge). All three take `&mut self`, so the
//! engine is shared with the handlers through a critical-section cell and each call runs to
//! completion.

use super::{
    Generator, Schedule, Shape, WaveConfig, WaveData, DEFAULT_DUTY, DUTY_STEP, FREQUENCIES,
    MAX_DUTY, MID_CODE, MIN_DUTY,
};
use crate::dac::DacSink;
use crate::keypad::{Key, KeypadIrq};
use crate::timer::WaveTimers;

/// Engine state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FsmState {
    /// Schedule must be recomputed and the shape timer armed
    Prepare,
    /// Shape timer armed and emitting samples
    Output,
    /// Output stopped, waiting for keys
    Polling,
    /// Output was just stopped by the keypad, the foreground has not acknowledged it yet
    Disable,
}

/// What the foreground should show after a [`step`](WaveformEngine::step)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Notice {
    /// Output (re)started: show the wave and the enabled line
    Enabled,
    /// Wave settings changed: refresh the wave line
    Updated,
    /// Output stopped: show the disabled line
    Disabled,
}

impl Notice {
    /// Text for the second display line, if it changes
    pub const fn status_line(self) -> Option<&'static str> {
        match self {
            Notice::Enabled => Some("Enabled         "),
            Notice::Disabled => Some("Disabled Press 6"),
            Notice::Updated => None,
        }
    }
}

/// Timer-driven waveform output controlled from the keypad
pub struct WaveformEngine<T, D, K> {
    timers: T,
    dac: D,
    keypad: K,
    config: WaveConfig,
    state: FsmState,
    wave: WaveData,
    schedule: Schedule,
    generator: Generator,
}

impl<T, D, K> WaveformEngine<T, D, K>
where
    T: WaveTimers,
    D: DacSink,
    K: KeypadIrq,
{
    /// Take over the timers, DAC and keypad interrupt.
    ///
    /// All shape timers are disarmed and the DAC is parked at [`MID_CODE`]. Output starts on
    /// the first [`step`](Self::step) with the default wave.
    pub fn new(mut timers: T, mut dac: D, keypad: K, config: WaveConfig) -> Self {
        timers.disarm_all();
        dac.write(MID_CODE).ok();
        let wave = WaveData::default();
        WaveformEngine {
            timers,
            dac,
            keypad,
            config,
            state: FsmState::Prepare,
            schedule: Schedule::compute(&wave, &config),
            generator: Generator::new(wave.shape),
            wave,
        }
    }

    /// Current state
    #[inline(always)]
    pub fn state(&self) -> FsmState {
        self.state
    }

    /// Current wave selection
    #[inline(always)]
    pub fn wave(&self) -> &WaveData {
        &self.wave
    }

    /// Schedule of the wave being output (or last output)
    #[inline(always)]
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Whether a shape timer is currently armed
    #[inline(always)]
    pub fn is_output_enabled(&self) -> bool {
        self.state == FsmState::Output
    }

    /// One foreground iteration, with the key newly pressed since the last one (if any).
    pub fn step(&mut self, key: Option<Key>) -> Option<Notice> {
        match self.state {
            FsmState::Prepare => {
                self.prepare();
                Some(Notice::Enabled)
            }
            FsmState::Disable => {
                self.transition(FsmState::Polling);
                Some(Notice::Disabled)
            }
            FsmState::Output | FsmState::Polling => key.map(|key| self.apply_key(key)),
        }
    }

    /// Compare interrupt of the timer belonging to `shape`.
    pub fn on_timer(&mut self, shape: Shape) {
        // A firing that raced with a disarm
        if self.state != FsmState::Output || self.generator.shape() != shape {
            return;
        }
        let sample = self.generator.next_sample(&self.schedule);
        self.dac.write(sample.code).ok();
        self.timers.advance(shape, sample.delay);
    }

    /// Keypad column edge interrupt: stop all output until the user re-enables it.
    pub fn on_keypad_edge(&mut self) {
        self.timers.disarm_all();
        self.keypad.disable_interrupt();
        self.transition(FsmState::Disable);
    }

    /// Give back the timers, DAC and keypad interrupt
    pub fn release(self) -> (T, D, K) {
        (self.timers, self.dac, self.keypad)
    }

    fn prepare(&mut self) {
        self.timers.disarm_all();
        self.schedule = Schedule::compute(&self.wave, &self.config);
        self.generator = Generator::new(self.wave.shape);
        self.timers.arm(self.wave.shape, self.schedule.period());
        self.keypad.enable_interrupt();
        #[cfg(feature = "defmt")]
        defmt::debug!("waveform: output {} with {}", self.wave, self.schedule);
        self.transition(FsmState::Output);
    }

    fn apply_key(&mut self, key: Key) -> Notice {
        match key {
            Key::Digit(d @ 1..=5) => self.wave.frequency = FREQUENCIES[d as usize - 1],
            Key::Digit(6) => self.transition(FsmState::Prepare),
            Key::Digit(7) => self.wave.shape = Shape::Square,
            Key::Digit(8) => self.wave.shape = Shape::Sawtooth,
            Key::Digit(9) => self.wave.shape = Shape::Sine,
            Key::Digit(0) => self.wave.duty = DEFAULT_DUTY,
            // Not on the pad
            Key::Digit(_) => {}
            Key::Star => {
                if self.wave.duty > MIN_DUTY {
                    self.wave.duty -= DUTY_STEP;
                }
            }
            Key::Pound => {
                if self.wave.duty < MAX_DUTY {
                    self.wave.duty += DUTY_STEP;
                }
            }
        }
        #[cfg(feature = "defmt")]
        defmt::trace!("waveform: key {} -> {}", key, self.wave);
        Notice::Updated
    }

    #[inline]
    fn transition(&mut self, next: FsmState) {
        #[cfg(feature = "defmt")]
        defmt::debug!("waveform: {} -> {}", self.state, next);
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waveform::{MAX_CODE, MIN_CODE};
    use core::convert::Infallible;
    use std::vec::Vec;

    #[derive(Default)]
    struct Timers {
        armed: Option<Shape>,
        arms: Vec<(Shape, u16)>,
        advances: Vec<(Shape, u16)>,
    }

    impl WaveTimers for Timers {
        fn arm(&mut self, shape: Shape, delta: u16) {
            self.armed = Some(shape);
            self.arms.push((shape, delta));
        }

        fn disarm_all(&mut self) {
            self.armed = None;
        }

        fn advance(&mut self, shape: Shape, delta: u16) {
            self.advances.push((shape, delta));
        }
    }

    #[derive(Default)]
    struct Dac(Vec<u16>);

    impl DacSink for Dac {
        type Error = Infallible;

        fn write(&mut self, code: u16) -> Result<(), Infallible> {
            self.0.push(code);
            Ok(())
        }
    }

    #[derive(Default)]
    struct Irq(bool);

    impl KeypadIrq for Irq {
        fn enable_interrupt(&mut self) {
            self.0 = true;
        }

        fn disable_interrupt(&mut self) {
            self.0 = false;
        }
    }

    type Engine = WaveformEngine<Timers, Dac, Irq>;

    fn engine() -> Engine {
        WaveformEngine::new(
            Timers::default(),
            Dac::default(),
            Irq::default(),
            WaveConfig::default(),
        )
    }

    fn press(engine: &mut Engine, keys: &str) {
        for c in keys.chars() {
            engine.step(Key::from_char(c));
        }
    }

    #[test]
    fn starts_parked_at_mid_scale() {
        let engine = engine();
        assert_eq!(engine.state(), FsmState::Prepare);
        let (timers, dac, irq) = engine.release();
        assert_eq!(timers.armed, None);
        assert_eq!(dac.0, [MID_CODE]);
        assert!(!irq.0);
    }

    #[test]
    fn prepare_arms_shape_timer_and_keypad() {
        let mut engine = engine();
        assert_eq!(engine.step(None), Some(Notice::Enabled));
        assert_eq!(engine.state(), FsmState::Output);
        let (timers, _, irq) = engine.release();
        assert_eq!(timers.arms, [(Shape::Square, 30_000)]);
        assert!(irq.0);
    }

    #[test]
    fn timer_firings_emit_samples() {
        let mut engine = engine();
        engine.step(None);
        engine.on_timer(Shape::Square);
        engine.on_timer(Shape::Square);
        // Not the armed shape
        engine.on_timer(Shape::Sine);
        let (timers, dac, _) = engine.release();
        assert_eq!(dac.0, [MID_CODE, MAX_CODE, MIN_CODE]);
        assert_eq!(
            timers.advances,
            [(Shape::Square, 30_000), (Shape::Square, 30_000)]
        );
    }

    #[test]
    fn keypad_edge_stops_output() {
        let mut engine = engine();
        engine.step(None);
        engine.on_keypad_edge();
        assert_eq!(engine.state(), FsmState::Disable);
        engine.on_timer(Shape::Square);

        assert_eq!(engine.step(None), Some(Notice::Disabled));
        assert_eq!(engine.state(), FsmState::Polling);
        assert_eq!(engine.step(None), None);

        let (timers, dac, irq) = engine.release();
        assert_eq!(timers.armed, None);
        assert_eq!(dac.0, [MID_CODE]);
        assert!(!irq.0);
    }

    #[test]
    fn keymap() {
        let mut engine = engine();
        engine.step(None);
        engine.on_keypad_edge();
        engine.step(None);

        press(&mut engine, "4");
        assert_eq!(engine.wave().frequency, 400);
        press(&mut engine, "8");
        assert_eq!(engine.wave().shape, Shape::Sawtooth);
        press(&mut engine, "9");
        assert_eq!(engine.wave().shape, Shape::Sine);
        press(&mut engine, "7##");
        assert_eq!(engine.wave().shape, Shape::Square);
        assert_eq!(engine.wave().duty, 70);
        press(&mut engine, "0");
        assert_eq!(engine.wave().duty, DEFAULT_DUTY);
        assert_eq!(engine.step(Some(Key::Digit(1))), Some(Notice::Updated));
        assert_eq!(engine.wave().frequency, 100);
    }

    #[test]
    fn digits_off_the_pad_change_nothing() {
        let mut engine = engine();
        engine.step(None);
        engine.on_keypad_edge();
        engine.step(None);
        press(&mut engine, "#3");
        let before = *engine.wave();

        assert_eq!(engine.step(Some(Key::Digit(42))), Some(Notice::Updated));
        assert_eq!(engine.step(Some(Key::Digit(10))), Some(Notice::Updated));
        assert_eq!(*engine.wave(), before);
        assert_eq!(engine.wave().duty, 60);
        assert_eq!(engine.state(), FsmState::Polling);
    }

    #[test]
    fn duty_is_clamped() {
        let mut engine = engine();
        press(&mut engine, " ****");
        assert_eq!(engine.wave().duty, MIN_DUTY);
        assert_eq!(engine.step(Some(Key::Star)), Some(Notice::Updated));
        assert_eq!(engine.wave().duty, MIN_DUTY);

        press(&mut engine, "########");
        assert_eq!(engine.wave().duty, MAX_DUTY);
    }

    #[test]
    fn six_always_reprepares() {
        for edits in ["", "3", "9#", "*8", "2#0"] {
            let mut engine = engine();
            engine.step(None);
            engine.on_keypad_edge();
            engine.step(None);
            press(&mut engine, edits);
            press(&mut engine, "6");
            assert_eq!(engine.state(), FsmState::Prepare, "after {:?}", edits);
        }
    }

    #[test]
    fn new_settings_take_effect_on_enable() {
        let mut engine = engine();
        engine.step(None);
        engine.on_keypad_edge();
        engine.step(None);
        press(&mut engine, "39");
        // Still the old schedule until re-enabled
        assert_eq!(engine.schedule().shape(), Shape::Square);

        press(&mut engine, "6");
        assert_eq!(engine.step(None), Some(Notice::Enabled));
        assert_eq!(engine.schedule().shape(), Shape::Sine);
        assert_eq!(engine.schedule().period(), 533);
        engine.on_timer(Shape::Sine);

        let (timers, dac, irq) = engine.release();
        assert_eq!(timers.armed, Some(Shape::Sine));
        assert_eq!(dac.0.last(), Some(&MID_CODE));
        assert!(irq.0);
    }

    #[test]
    fn status_lines_fill_the_display() {
        assert_eq!(Notice::Enabled.status_line().map(str::len), Some(16));
        assert_eq!(Notice::Disabled.status_line().map(str::len), Some(16));
        assert_eq!(Notice::Updated.status_line(), None);
    }
}
