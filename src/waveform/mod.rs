//! DAC waveform generator
//!
//! A keypad selects a shape, frequency and duty cycle; three compare timers (one per shape)
//! pace the samples written to the DAC. The pieces are:
//!
//! * [`WaveData`]: the user's selection, shown on the status display.
//! * [`Schedule`]: timer delays and square levels derived from a [`WaveData`] when output is
//!   (re)enabled.
//! * [`Generator`]: per-shape sample generator, stepped once per timer interrupt.
//! * [`WaveformEngine`]: the state machine tying these to the timers, the DAC and the keypad
//!   interrupt.

use core::fmt;

use crate::timer::{TimerConfig, TimerDiv};

mod fsm;
mod generator;
mod sine_table;

pub use fsm::{FsmState, Notice, WaveformEngine};
pub use generator::{Generator, Sample, SawGen, SineGen, SquareGen};
pub use sine_table::{SINE_OFFSETS, SINE_TABLE_LEN};

/// Highest code emitted, the top of the square and sawtooth
pub const MAX_CODE: u16 = 2048;
/// Lowest code emitted
pub const MIN_CODE: u16 = 0;
/// DC offset, the sine centre line and the idle output level
pub const MID_CODE: u16 = 1024;
/// Code increment per sawtooth sample
pub const RESOLUTION_STEP: u16 = 8;

/// Frequencies offered on keys `1` to `5`
pub const FREQUENCIES: [u16; 5] = [100, 200, 300, 400, 500];
/// Lowest square duty cycle in percent
pub const MIN_DUTY: u8 = 10;
/// Highest square duty cycle in percent
pub const MAX_DUTY: u8 = 90;
/// Duty cycle after reset, in percent
pub const DEFAULT_DUTY: u8 = 50;
/// Duty cycle change per `*`/`#` press
pub const DUTY_STEP: u8 = 10;

/// Sine samples per period (4 passes over the quarter-wave table, ends not repeated)
pub const SINE_STEPS: u32 = 4 * (SINE_TABLE_LEN as u32 - 1);

/// Waveform shape
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Shape {
    /// Two-level square wave with adjustable duty cycle
    Square,
    /// Linear ramp from [`MIN_CODE`] to [`MAX_CODE`]
    Sawtooth,
    /// Sine around [`MID_CODE`]
    Sine,
}

impl Shape {
    /// Three letter label used on the display
    pub const fn label(self) -> &'static str {
        match self {
            Shape::Square => "Sqr",
            Shape::Sawtooth => "Saw",
            Shape::Sine => "Sin",
        }
    }
}

/// Selected waveform
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WaveData {
    /// Shape
    pub shape: Shape,
    /// Frequency in Hz
    pub frequency: u16,
    /// Square duty cycle in percent. Kept for the other shapes but unused.
    pub duty: u8,
}

impl Default for WaveData {
    fn default() -> Self {
        WaveData {
            shape: Shape::Square,
            frequency: FREQUENCIES[0],
            duty: DEFAULT_DUTY,
        }
    }
}

/// First display line, e.g. `100Hz Sqr 50%`. The other shapes pad the line with spaces to wipe
/// a previously shown duty cycle.
impl fmt::Display for WaveData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Hz {} ", self.frequency, self.shape.label())?;
        match self.shape {
            Shape::Square => write!(f, "{}%", self.duty),
            Shape::Sawtooth | Shape::Sine => f.write_str("       "),
        }
    }
}

/// Tick rates of the shape timers, from which the per-sample delays are computed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WaveConfig {
    square_base: u32,
    saw_base: u32,
    sine_base: u32,
}

impl WaveConfig {
    /// Derive the base counts from the clock settings of each shape's timer
    pub const fn from_timers(square: TimerConfig, sawtooth: TimerConfig, sine: TimerConfig) -> Self {
        WaveConfig {
            square_base: square.tick_hz(),
            saw_base: sawtooth.tick_hz(),
            sine_base: sine.tick_hz() / SINE_STEPS,
        }
    }

    /// Square timer ticks per second
    #[inline(always)]
    pub const fn square_base(&self) -> u32 {
        self.square_base
    }

    /// Sawtooth timer ticks per second
    #[inline(always)]
    pub const fn saw_base(&self) -> u32 {
        self.saw_base
    }

    /// Sine timer ticks per sample at 1 Hz
    #[inline(always)]
    pub const fn sine_base(&self) -> u32 {
        self.sine_base
    }
}

/// 48 MHz SMCLK on all three timers, the square timer divided by 8
impl Default for WaveConfig {
    fn default() -> Self {
        const SMCLK_HZ: u32 = 48_000_000;
        WaveConfig::from_timers(
            TimerConfig::smclk(SMCLK_HZ).clk_div(TimerDiv::_8),
            TimerConfig::smclk(SMCLK_HZ),
            TimerConfig::smclk(SMCLK_HZ),
        )
    }
}

/// Timer delays and output levels for one enabled waveform
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Schedule {
    shape: Shape,
    delays: [u16; 2],
    levels: [u16; 2],
}

impl Schedule {
    /// Compute the schedule for `wave`.
    ///
    /// Square uses two delays (high then low time). Sawtooth and sine use a single sample period
    /// in the first slot. Delays that do not fit the 16-bit compare register saturate.
    pub fn compute(wave: &WaveData, config: &WaveConfig) -> Self {
        let frequency = wave.frequency.max(1) as u32;
        let delays = match wave.shape {
            Shape::Square => {
                let duty = wave.duty.min(100) as u32;
                let tenth = config.square_base / (frequency * 100);
                [ticks(tenth * duty), ticks(tenth * (100 - duty))]
            }
            Shape::Sawtooth => {
                let steps = frequency * (MAX_CODE - MIN_CODE) as u32 / RESOLUTION_STEP as u32;
                let period = ticks(config.saw_base / steps.max(1));
                [period, period]
            }
            Shape::Sine => {
                let period = ticks(config.sine_base / frequency);
                [period, period]
            }
        };
        Schedule {
            shape: wave.shape,
            delays,
            levels: [MAX_CODE, MIN_CODE],
        }
    }

    /// Shape this schedule was computed for
    #[inline(always)]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Delay of square phase `phase` (0 high, 1 low)
    #[inline(always)]
    pub fn delay(&self, phase: usize) -> u16 {
        self.delays[phase & 1]
    }

    /// Output code of square phase `phase` (0 high, 1 low)
    #[inline(always)]
    pub fn level(&self, phase: usize) -> u16 {
        self.levels[phase & 1]
    }

    /// Sample period of the sawtooth and sine, high time of the square
    #[inline(always)]
    pub fn period(&self) -> u16 {
        self.delays[0]
    }
}

#[inline]
fn ticks(count: u32) -> u16 {
    u16::try_from(count).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(shape: Shape, frequency: u16, duty: u8) -> WaveData {
        WaveData {
            shape,
            frequency,
            duty,
        }
    }

    #[test]
    fn default_board_base_counts() {
        let config = WaveConfig::default();
        assert_eq!(config.square_base(), 6_000_000);
        assert_eq!(config.saw_base(), 48_000_000);
        assert_eq!(config.sine_base(), 160_000);
    }

    #[test]
    fn square_is_symmetric_at_half_duty() {
        let s = Schedule::compute(&wave(Shape::Square, 100, 50), &WaveConfig::default());
        assert_eq!(s.delay(0), 30_000);
        assert_eq!(s.delay(0), s.delay(1));
        assert_eq!((s.level(0), s.level(1)), (MAX_CODE, MIN_CODE));
    }

    #[test]
    fn square_duty_ratio() {
        let config = WaveConfig::default();
        let s = Schedule::compute(&wave(Shape::Square, 100, 90), &config);
        assert_eq!((s.delay(0), s.delay(1)), (54_000, 6_000));
        assert_eq!(s.delay(0), 9 * s.delay(1));

        let s = Schedule::compute(&wave(Shape::Square, 300, 10), &config);
        assert_eq!((s.delay(0), s.delay(1)), (2_000, 18_000));
    }

    #[test]
    fn sawtooth_and_sine_periods() {
        let config = WaveConfig::default();
        let saw = Schedule::compute(&wave(Shape::Sawtooth, 100, 50), &config);
        assert_eq!(saw.period(), 1_875);
        let saw = Schedule::compute(&wave(Shape::Sawtooth, 500, 50), &config);
        assert_eq!(saw.period(), 375);

        let sine = Schedule::compute(&wave(Shape::Sine, 100, 50), &config);
        assert_eq!(sine.period(), 1_600);
        let sine = Schedule::compute(&wave(Shape::Sine, 300, 50), &config);
        assert_eq!(sine.period(), 533);
    }

    #[test]
    fn every_offered_setting_fits_the_compare_register() {
        let config = WaveConfig::default();
        for &frequency in FREQUENCIES.iter() {
            for duty in (MIN_DUTY..=MAX_DUTY).step_by(DUTY_STEP as usize) {
                let s = Schedule::compute(&wave(Shape::Square, frequency, duty), &config);
                assert!(s.delay(0) < u16::MAX && s.delay(1) < u16::MAX);
                assert!(s.delay(0) > 0 && s.delay(1) > 0);
            }
        }
    }

    #[test]
    fn status_line() {
        assert_eq!(WaveData::default().to_string(), "100Hz Sqr 50%");
        assert_eq!(
            wave(Shape::Sawtooth, 200, 30).to_string(),
            "200Hz Saw        "
        );
        assert_eq!(wave(Shape::Sine, 500, 50).to_string(), "500Hz Sin        ");
    }
}
