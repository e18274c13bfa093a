//! ADC reading report
//!
//! Converts raw 14-bit ADC14 results into the terminal message the ADC lab streams over UART:
//! a carriage return followed by the voltage as `X.XX`, so each reading overwrites the last
//! one on the terminal line.

/// Volts per count, scaled by 10^6 (0.000201 V/count for the 3.3 V reference at 14 bits).
pub const MICROVOLTS_PER_COUNT: u32 = 201;

/// Largest 14-bit conversion result
pub const MAX_RAW: u16 = 0x3FFF;

/// Length of a formatted report
pub const MESSAGE_LEN: usize = 5;

/// Calibrated ADC reading
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    raw: u16,
}

impl Reading {
    /// Wrap a raw conversion result. Bits above the 14-bit range are ignored.
    #[inline]
    pub fn from_raw(raw: u16) -> Self {
        Reading { raw: raw & MAX_RAW }
    }

    /// Raw conversion result
    #[inline(always)]
    pub fn raw(&self) -> u16 {
        self.raw
    }

    /// Voltage in hundredths of a volt, truncated.
    #[inline]
    pub fn centivolts(&self) -> u16 {
        // 16383 * 201 fits comfortably in u32
        (self.raw as u32 * MICROVOLTS_PER_COUNT / 10_000) as u16
    }

    /// Format as `"\rX.XX"`.
    pub fn message(&self) -> [u8; MESSAGE_LEN] {
        let cv = self.centivolts();
        [
            b'\r',
            b'0' + (cv / 100 % 10) as u8,
            b'.',
            b'0' + (cv / 10 % 10) as u8,
            b'0' + (cv % 10) as u8,
        ]
    }
}
