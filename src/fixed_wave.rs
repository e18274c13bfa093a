//! Fixed 50 Hz DAC waveform
//!
//! The first DAC lab outputs a single hard-wired wave, a 2 Vpp triangle or square from 0 V,
//! paced by one compare timer. There is no keypad and no state machine: the timer interrupt
//! just steps a [`FixedWave`] and writes the result.

use crate::dac::DacSink;
use crate::timer::CompareTimer;
use crate::waveform::Sample;

/// DAC code for 2 V at the board reference and 2x gain
pub const TWO_VOLT_CODE: u16 = 1242;
/// DAC code for 0 V
pub const ZERO_VOLT_CODE: u16 = 0;
/// Output frequency in Hz
pub const FIXED_FREQUENCY: u32 = 50;

/// Shape of the fixed wave
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FixedShape {
    /// Alternates between 0 V and 2 V
    Square,
    /// Counts one code at a time between 0 V and 2 V
    Triangle,
}

impl FixedShape {
    /// Samples per period
    pub const fn samples(self) -> u32 {
        match self {
            FixedShape::Square => 2,
            FixedShape::Triangle => 2 * (TWO_VOLT_CODE - ZERO_VOLT_CODE) as u32,
        }
    }

    /// Timer ticks between samples for a timer counting at `tick_hz`, saturated to the
    /// compare register.
    pub fn delay(self, tick_hz: u32) -> u16 {
        let ticks = tick_hz / (FIXED_FREQUENCY * self.samples());
        u16::try_from(ticks).unwrap_or(u16::MAX)
    }
}

/// Sample generator for a [`FixedShape`]
#[derive(Clone, Copy, Debug)]
pub struct FixedWave {
    shape: FixedShape,
    delay: u16,
    code: u16,
    rising: bool,
}

impl FixedWave {
    /// Start at 0 V
    pub fn new(shape: FixedShape, tick_hz: u32) -> Self {
        FixedWave {
            shape,
            delay: shape.delay(tick_hz),
            code: ZERO_VOLT_CODE,
            rising: true,
        }
    }

    /// Shape being generated
    #[inline(always)]
    pub fn shape(&self) -> FixedShape {
        self.shape
    }

    /// Timer ticks between samples
    #[inline(always)]
    pub fn delay(&self) -> u16 {
        self.delay
    }

    /// Step to the next level and return it
    pub fn next_sample(&mut self) -> Sample {
        match self.shape {
            FixedShape::Square => {
                self.code = if self.code == ZERO_VOLT_CODE {
                    TWO_VOLT_CODE
                } else {
                    ZERO_VOLT_CODE
                };
            }
            FixedShape::Triangle => {
                if self.rising {
                    self.code += 1;
                } else {
                    self.code -= 1;
                }
                if self.code == TWO_VOLT_CODE || self.code == ZERO_VOLT_CODE {
                    self.rising = !self.rising;
                }
            }
        }
        Sample {
            code: self.code,
            delay: self.delay,
        }
    }
}

/// A [`FixedWave`] wired to its timer and DAC
pub struct FixedOutput<T, D> {
    timer: T,
    dac: D,
    wave: FixedWave,
}

impl<T: CompareTimer, D: DacSink> FixedOutput<T, D> {
    /// Write 0 V and arm the timer for the first sample
    pub fn start(mut timer: T, mut dac: D, wave: FixedWave) -> Self {
        dac.write(ZERO_VOLT_CODE).ok();
        timer.arm(wave.delay());
        FixedOutput { timer, dac, wave }
    }

    /// Compare interrupt: output the next sample and schedule the one after
    pub fn on_timer(&mut self) {
        let sample = self.wave.next_sample();
        self.dac.write(sample.code).ok();
        self.timer.advance(sample.delay);
    }

    /// Stop the timer and give back the timer and DAC
    pub fn stop(mut self) -> (T, D) {
        self.timer.disarm();
        (self.timer, self.dac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use std::vec::Vec;

    #[test]
    fn delays_give_fifty_hertz() {
        // 24 MHz / 8 for the square, 24 MHz for the triangle
        assert_eq!(FixedShape::Square.delay(3_000_000), 30_000);
        assert_eq!(FixedShape::Triangle.delay(24_000_000), 193);

        assert_eq!(FixedShape::Square.delay(6_000_000), 60_000);
        assert_eq!(FixedShape::Triangle.delay(48_000_000), 386);
        // Would overflow the compare register
        assert_eq!(FixedShape::Square.delay(48_000_000), u16::MAX);
    }

    #[test]
    fn square_toggles_starting_high() {
        let mut wave = FixedWave::new(FixedShape::Square, 6_000_000);
        let codes: Vec<u16> = (0..4).map(|_| wave.next_sample().code).collect();
        assert_eq!(codes, [TWO_VOLT_CODE, ZERO_VOLT_CODE, TWO_VOLT_CODE, ZERO_VOLT_CODE]);
    }

    #[test]
    fn triangle_turns_at_both_ends() {
        let mut wave = FixedWave::new(FixedShape::Triangle, 48_000_000);
        let period = FixedShape::Triangle.samples() as usize;
        let codes: Vec<u16> = (0..2 * period).map(|_| wave.next_sample().code).collect();

        assert_eq!(codes[0], 1);
        assert_eq!(codes[TWO_VOLT_CODE as usize - 1], TWO_VOLT_CODE);
        assert_eq!(codes[TWO_VOLT_CODE as usize], TWO_VOLT_CODE - 1);
        assert_eq!(codes[period - 1], ZERO_VOLT_CODE);
        assert_eq!(codes[period], 1);
        assert!(codes.windows(2).all(|w| w[0].abs_diff(w[1]) == 1));
        assert_eq!(codes[..period], codes[period..]);
    }

    #[derive(Default)]
    struct Timer {
        armed: Option<u16>,
        compare: u32,
    }

    impl CompareTimer for Timer {
        fn arm(&mut self, delta: u16) {
            self.armed = Some(delta);
            self.compare = delta as u32;
        }

        fn disarm(&mut self) {
            self.armed = None;
        }

        fn advance(&mut self, delta: u16) {
            self.compare += delta as u32;
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

    #[test]
    fn output_paces_samples_with_the_timer() {
        let wave = FixedWave::new(FixedShape::Square, 6_000_000);
        let mut output = FixedOutput::start(Timer::default(), Dac::default(), wave);
        output.on_timer();
        output.on_timer();

        let (timer, dac) = output.stop();
        assert_eq!(dac.0, [ZERO_VOLT_CODE, TWO_VOLT_CODE, ZERO_VOLT_CODE]);
        // Two half periods of 10 ms after the first compare
        assert_eq!(timer.compare, 3 * 60_000);
        assert_eq!(timer.armed, None);
    }
}
