//! Per-shape sample generators
//!
//! Each generator is stepped from its timer interrupt. A step returns the code to write to the
//! DAC now and the number of ticks until the next step. The code emitted is always the one
//! computed on the previous step, so the interrupt does the slow DAC write first and the
//! arithmetic afterwards.

use super::sine_table::{SINE_OFFSETS, SINE_TABLE_LEN};
use super::{Schedule, Shape, MAX_CODE, MID_CODE, MIN_CODE, RESOLUTION_STEP};

/// One step of a generator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    /// DAC code to output
    pub code: u16,
    /// Ticks until the next sample
    pub delay: u16,
}

/// Two-level square wave, alternating between the high and low phase of the schedule.
#[derive(Clone, Copy, Debug, Default)]
pub struct SquareGen {
    phase: usize,
}

impl SquareGen {
    /// Start with the high phase
    pub const fn new() -> Self {
        SquareGen { phase: 0 }
    }

    /// Emit the current phase and toggle
    pub fn next_sample(&mut self, schedule: &Schedule) -> Sample {
        let sample = Sample {
            code: schedule.level(self.phase),
            delay: schedule.delay(self.phase),
        };
        self.phase ^= 1;
        sample
    }
}

/// Rising ramp that wraps to [`MIN_CODE`] once it passes [`MAX_CODE`].
#[derive(Clone, Copy, Debug)]
pub struct SawGen {
    code: u16,
}

impl Default for SawGen {
    fn default() -> Self {
        Self::new()
    }
}

impl SawGen {
    /// Start at the bottom of the ramp
    pub const fn new() -> Self {
        SawGen { code: MIN_CODE }
    }

    /// Emit the current code and step up
    pub fn next_sample(&mut self, schedule: &Schedule) -> Sample {
        let sample = Sample {
            code: self.code,
            delay: schedule.period(),
        };
        self.code += RESOLUTION_STEP;
        if self.code > MAX_CODE {
            self.code = MIN_CODE;
        }
        sample
    }
}

/// Sine rebuilt from the quarter-wave table.
///
/// The table index sweeps up and down between its two ends; every time it turns around the
/// quadrant advances. The first two quadrants add the offset to [`MID_CODE`], the last two
/// subtract it.
#[derive(Clone, Copy, Debug)]
pub struct SineGen {
    code: u16,
    index: usize,
    rising: bool,
    quadrant: u8,
}

impl Default for SineGen {
    fn default() -> Self {
        Self::new()
    }
}

impl SineGen {
    const LAST: usize = SINE_TABLE_LEN - 1;

    /// Start on the centre line, heading up
    pub const fn new() -> Self {
        SineGen {
            code: MID_CODE,
            index: 0,
            rising: true,
            quadrant: 0,
        }
    }

    /// Emit the current code and compute the next one
    pub fn next_sample(&mut self, schedule: &Schedule) -> Sample {
        let sample = Sample {
            code: self.code,
            delay: schedule.period(),
        };

        let offset = SINE_OFFSETS[self.index];
        self.code = if self.quadrant < 2 {
            MID_CODE + offset
        } else {
            MID_CODE - offset
        };

        if self.rising {
            self.index += 1;
        } else {
            self.index -= 1;
        }
        if self.index == Self::LAST || self.index == 0 {
            self.rising = !self.rising;
            self.quadrant = (self.quadrant + 1) % 4;
        }
        sample
    }
}

/// Generator for whichever shape is currently enabled
#[derive(Clone, Copy, Debug)]
pub enum Generator {
    /// Square wave
    Square(SquareGen),
    /// Sawtooth
    Sawtooth(SawGen),
    /// Sine
    Sine(SineGen),
}

impl Generator {
    /// Fresh generator for `shape`
    pub const fn new(shape: Shape) -> Self {
        match shape {
            Shape::Square => Generator::Square(SquareGen::new()),
            Shape::Sawtooth => Generator::Sawtooth(SawGen::new()),
            Shape::Sine => Generator::Sine(SineGen::new()),
        }
    }

    /// Shape being generated
    pub fn shape(&self) -> Shape {
        match self {
            Generator::Square(_) => Shape::Square,
            Generator::Sawtooth(_) => Shape::Sawtooth,
            Generator::Sine(_) => Shape::Sine,
        }
    }

    /// Step the generator
    #[inline]
    pub fn next_sample(&mut self, schedule: &Schedule) -> Sample {
        match self {
            Generator::Square(gen) => gen.next_sample(schedule),
            Generator::Sawtooth(gen) => gen.next_sample(schedule),
            Generator::Sine(gen) => gen.next_sample(schedule),
        }
    }
}
