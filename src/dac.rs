//! DAC output
//!
//! The waveform labs drive an external MCP4921 12-bit DAC over SPI. Cores only see the
//! [`DacSink`] capability; [`Mcp4921`] implements it on top of an
//! [`embedded_hal::spi::SpiDevice`], which also owns the chip-select line.

use embedded_hal::spi::SpiDevice;

/// Mask of the 12 data bits in a DAC word
pub const CODE_MASK: u16 = 0x0FFF;

/// MCP4921 configuration bits: channel A, unbuffered reference, 2x gain, output active.
pub const MCP4921_CONFIG: u16 = 0x1000;

/// Capability to set the DAC output level.
pub trait DacSink {
    /// Error raised by the underlying bus
    type Error;

    /// Output a 12-bit code. Bits above bit 11 are ignored.
    fn write(&mut self, code: u16) -> Result<(), Self::Error>;
}

impl<D: DacSink + ?Sized> DacSink for &mut D {
    type Error = D::Error;

    #[inline(always)]
    fn write(&mut self, code: u16) -> Result<(), Self::Error> {
        (**self).write(code)
    }
}

/// 16-bit command word sent to the MCP4921 for `code`
#[inline(always)]
pub const fn dac_word(code: u16) -> u16 {
    MCP4921_CONFIG | (code & CODE_MASK)
}

/// Microchip MCP4921 12-bit SPI DAC
pub struct Mcp4921<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> Mcp4921<SPI> {
    /// Wrap an SPI device. The bus must be configured MSB first in SPI mode 0 or 3.
    #[inline(always)]
    pub fn new(spi: SPI) -> Self {
        Mcp4921 { spi }
    }

    /// Release the SPI device
    #[inline(always)]
    pub fn free(self) -> SPI {
        self.spi
    }
}

impl<SPI: SpiDevice> DacSink for Mcp4921<SPI> {
    type Error = SPI::Error;

    /// Send the command word high byte first in a single chip-select transaction.
    #[inline]
    fn write(&mut self, code: u16) -> Result<(), Self::Error> {
        self.spi.write(&dac_word(code).to_be_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::spi::{ErrorType, Operation};
    use std::vec::Vec;

    #[derive(Default)]
    struct Frames {
        frames: Vec<Vec<u8>>,
    }

    impl ErrorType for Frames {
        type Error = Infallible;
    }

    impl SpiDevice for Frames {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
            let mut frame = Vec::new();
            for op in operations.iter() {
                if let Operation::Write(bytes) = op {
                    frame.extend_from_slice(bytes);
                }
            }
            self.frames.push(frame);
            Ok(())
        }
    }

    #[test]
    fn word_format() {
        assert_eq!(dac_word(0), 0x1000);
        assert_eq!(dac_word(2048), 0x1800);
        assert_eq!(dac_word(0xFFFF), 0x1FFF);
    }

    #[test]
    fn one_frame_per_code_msb_first() {
        let mut dac = Mcp4921::new(Frames::default());
        dac.write(1024).unwrap();
        dac.write(4095).unwrap();
        assert_eq!(dac.free().frames, [[0x14, 0x00], [0x1F, 0xFF]]);
    }
}
