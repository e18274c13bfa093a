//! Timer abstraction
//!
//! The waveform generator runs each Timer_A in continuous mode and schedules samples with
//! capture/compare register 0. Every compare interrupt moves the compare value forward by the
//! sample delay (accumulating rather than restarting the count), so the sample rate does not
//! drift by the interrupt latency.
//!
//! [`CompareTimer`] is the per-timer capability, [`WaveTimers`] is the one the waveform engine
//! uses to address "the timer for this shape".

use crate::waveform::Shape;

/// Timer clock divider
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerDiv {
    /// No division
    _1,
    /// Divide by 2
    _2,
    /// Divide by 4
    _4,
    /// Divide by 8
    _8,
}

impl TimerDiv {
    /// Division factor
    #[inline(always)]
    pub const fn divisor(self) -> u32 {
        1 << (self as u32)
    }
}

/// Clock settings of a timer, used to derive tick-based delays
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerConfig {
    clk_hz: u32,
    div: TimerDiv,
}

impl TimerConfig {
    /// Configure timer clock source to SMCLK running at `clk_hz`
    pub const fn smclk(clk_hz: u32) -> Self {
        TimerConfig {
            clk_hz,
            div: TimerDiv::_1,
        }
    }

    /// Configure the clock divider
    pub const fn clk_div(self, div: TimerDiv) -> Self {
        TimerConfig {
            clk_hz: self.clk_hz,
            div,
        }
    }

    /// Source clock frequency
    #[inline(always)]
    pub const fn clk_hz(&self) -> u32 {
        self.clk_hz
    }

    /// Configured divider
    #[inline(always)]
    pub const fn div(&self) -> TimerDiv {
        self.div
    }

    /// Counter increments per second
    #[inline(always)]
    pub const fn tick_hz(&self) -> u32 {
        self.clk_hz / self.div.divisor()
    }
}

/// Capability of one continuous-mode timer with a compare interrupt.
pub trait CompareTimer {
    /// Schedule the first compare event `delta` ticks from now and enable the interrupt.
    fn arm(&mut self, delta: u16);

    /// Disable the compare interrupt. The counter keeps running.
    fn disarm(&mut self);

    /// Move the compare value forward by `delta` ticks from the previous compare value.
    /// Called from the compare interrupt.
    fn advance(&mut self, delta: u16);
}

impl<T: CompareTimer + ?Sized> CompareTimer for &mut T {
    #[inline(always)]
    fn arm(&mut self, delta: u16) {
        (**self).arm(delta)
    }

    #[inline(always)]
    fn disarm(&mut self) {
        (**self).disarm()
    }

    #[inline(always)]
    fn advance(&mut self, delta: u16) {
        (**self).advance(delta)
    }
}

/// Capability of the set of timers that pace the waveform shapes, one per [`Shape`].
pub trait WaveTimers {
    /// Arm the timer belonging to `shape`.
    fn arm(&mut self, shape: Shape, delta: u16);

    /// Disarm every shape timer.
    fn disarm_all(&mut self);

    /// Advance the compare value of the timer belonging to `shape`.
    fn advance(&mut self, shape: Shape, delta: u16);
}

impl<T: WaveTimers + ?Sized> WaveTimers for &mut T {
    #[inline(always)]
    fn arm(&mut self, shape: Shape, delta: u16) {
        (**self).arm(shape, delta)
    }

    #[inline(always)]
    fn disarm_all(&mut self) {
        (**self).disarm_all()
    }

    #[inline(always)]
    fn advance(&mut self, shape: Shape, delta: u16) {
        (**self).advance(shape, delta)
    }
}

/// One dedicated [`CompareTimer`] per shape
pub struct ShapeTimers<S, W, N> {
    /// Paces the square wave
    pub square: S,
    /// Paces the sawtooth
    pub sawtooth: W,
    /// Paces the sine
    pub sine: N,
}

impl<S, W, N> ShapeTimers<S, W, N>
where
    S: CompareTimer,
    W: CompareTimer,
    N: CompareTimer,
{
    /// Group three timers. All of them are disarmed.
    pub fn new(square: S, sawtooth: W, sine: N) -> Self {
        let mut timers = ShapeTimers {
            square,
            sawtooth,
            sine,
        };
        timers.disarm_all();
        timers
    }

    #[inline]
    fn timer(&mut self, shape: Shape) -> &mut dyn CompareTimer {
        match shape {
            Shape::Square => &mut self.square,
            Shape::Sawtooth => &mut self.sawtooth,
            Shape::Sine => &mut self.sine,
        }
    }
}

impl<S, W, N> WaveTimers for ShapeTimers<S, W, N>
where
    S: CompareTimer,
    W: CompareTimer,
    N: CompareTimer,
{
    fn arm(&mut self, shape: Shape, delta: u16) {
        self.timer(shape).arm(delta);
    }

    fn disarm_all(&mut self) {
        self.square.disarm();
        self.sawtooth.disarm();
        self.sine.disarm();
    }

    fn advance(&mut self, shape: Shape, delta: u16) {
        self.timer(shape).advance(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        compare: u16,
        armed: bool,
    }

    impl CompareTimer for Counter {
        fn arm(&mut self, delta: u16) {
            self.compare = self.compare.wrapping_add(delta);
            self.armed = true;
        }

        fn disarm(&mut self) {
            self.armed = false;
        }

        fn advance(&mut self, delta: u16) {
            self.compare = self.compare.wrapping_add(delta);
        }
    }

    #[test]
    fn tick_rates() {
        let smclk = TimerConfig::smclk(48_000_000);
        assert_eq!(smclk.tick_hz(), 48_000_000);
        assert_eq!(smclk.clk_div(TimerDiv::_8).tick_hz(), 6_000_000);
        assert_eq!(TimerDiv::_4.divisor(), 4);
    }

    #[test]
    fn shape_selects_timer() {
        let mut timers = ShapeTimers::new(
            Counter::default(),
            Counter::default(),
            Counter::default(),
        );
        timers.arm(Shape::Sine, 533);
        assert!(timers.sine.armed);
        assert!(!timers.square.armed && !timers.sawtooth.armed);

        timers.advance(Shape::Sine, 533);
        assert_eq!(timers.sine.compare, 1066);

        timers.disarm_all();
        assert!(!timers.sine.armed);
    }

    #[test]
    fn compare_accumulates_with_wraparound() {
        let mut timer = Counter::default();
        timer.arm(60_000);
        timer.advance(10_000);
        assert_eq!(timer.compare, 4_464);
    }
}
