//! Serial UART
//!
//! The eUSCI_A peripherals are used as interrupt-driven UART transmitters. This module holds
//! the hardware-facing half of that arrangement:
//!
//! * [`BaudConfig`] computes the baud-rate generator settings for a clock/baud pair.
//! * [`TxHardware`] is the capability a transmitter must provide to a [`TxRing`]: write the
//!   transmit register and switch the "transmit complete" event on and off.
//! * [`BufferedTx`] is the foreground writer. It implements [`embedded-io`](embedded_io)'s
//!   blocking [`Write`](embedded_io::Write), the non-blocking
//!   [`embedded-hal-nb`](embedded_hal_nb::serial) `Write<u8>`, and [`core::fmt::Write`].
//!
//! The interrupt handler side only needs [`TxRing::on_transmit_complete`].

use crate::ring_buffer::TxRing;
use core::convert::Infallible;
use core::num::NonZeroU32;

/// Transmit buffer capacity used by the UART labs.
pub const UART_BUFFER_LENGTH: usize = 20;

/// Capability to drive a UART transmitter from a [`TxRing`].
pub trait TxHardware {
    /// Write a byte into the transmit register. Starts shifting it out immediately.
    fn write_tx(&mut self, byte: u8);

    /// Clear any stale completion flag and enable the "transmit complete" event.
    fn enable_tx_complete(&mut self);

    /// Disable the "transmit complete" event.
    fn disable_tx_complete(&mut self);
}

impl<H: TxHardware + ?Sized> TxHardware for &mut H {
    #[inline(always)]
    fn write_tx(&mut self, byte: u8) {
        (**self).write_tx(byte)
    }

    #[inline(always)]
    fn enable_tx_complete(&mut self) {
        (**self).enable_tx_complete()
    }

    #[inline(always)]
    fn disable_tx_complete(&mut self) {
        (**self).disable_tx_complete()
    }
}

/// eUSCI_A baud-rate generator settings
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BaudConfig {
    /// Clock prescaler (UCBRx)
    pub br: u16,
    /// Second modulation stage (UCBRSx)
    pub brs: u8,
    /// First modulation stage (UCBRFx), only used with oversampling
    pub brf: u8,
    /// Oversampling mode (UCOS16)
    pub ucos16: bool,
}

impl BaudConfig {
    /// Compute the settings for a baud rate given the frequency of the selected clock source.
    /// A baud rate of zero is treated as one.
    #[inline]
    pub fn new(clk_freq: u32, baudrate: u32) -> Self {
        calculate_baud_config(clk_freq, NonZeroU32::new(baudrate).unwrap_or(NonZeroU32::MIN))
    }

    /// Value of the modulation control word (UCAxMCTLW): UCBRSx in bits 15-8, UCBRFx in bits
    /// 7-4 and UCOS16 in bit 0.
    #[inline]
    pub fn mctlw(&self) -> u16 {
        ((self.brs as u16) << 8) | (((self.brf & 0x0F) as u16) << 4) | (self.ucos16 as u16)
    }
}

#[inline]
fn calculate_baud_config(clk_freq: u32, bps: NonZeroU32) -> BaudConfig {
    // Prescaler must fit in UCAxBRW
    let n = (clk_freq / bps).clamp(1, 0xFFFF);

    let brs = lookup_brs(clk_freq, bps);

    if (n >= 16) && (bps.get() < u32::MAX / 16) {
        let div = bps.get() * 16;

        // n / 16 without losing the fraction first
        let br = (clk_freq / div) as u16;

        // n % 16, same reason
        let brf = ((clk_freq % div) / bps) as u8;
        BaudConfig {
            ucos16: true,
            br,
            brf,
            brs,
        }
    } else {
        BaudConfig {
            ucos16: false,
            br: n as u16,
            brf: 0,
            brs,
        }
    }
}

// UCBRSx for the fractional part of N: (lowest fraction in ten-thousandths, setting).
// MSP432P4xx technical reference, "UCBRSx settings for fractional portion of N".
const UCBRS_TABLE: [(u16, u8); 36] = [
    (0, 0x00),
    (529, 0x01),
    (715, 0x02),
    (835, 0x04),
    (1001, 0x08),
    (1252, 0x10),
    (1430, 0x20),
    (1670, 0x11),
    (2147, 0x21),
    (2224, 0x22),
    (2503, 0x44),
    (3000, 0x25),
    (3335, 0x49),
    (3575, 0x4A),
    (3753, 0x52),
    (4003, 0x92),
    (4286, 0x53),
    (4378, 0x55),
    (5002, 0xAA),
    (5715, 0x6B),
    (6003, 0xAD),
    (6254, 0xB5),
    (6432, 0xB6),
    (6667, 0xD6),
    (7001, 0xB7),
    (7147, 0xBB),
    (7503, 0xDD),
    (7861, 0xED),
    (8004, 0xEE),
    (8333, 0xBF),
    (8464, 0xDF),
    (8572, 0xEF),
    (8751, 0xF7),
    (9004, 0xFB),
    (9170, 0xFD),
    (9288, 0xFE),
];

#[inline]
fn lookup_brs(clk_freq: u32, bps: NonZeroU32) -> u8 {
    // clk_freq % bps < bps, so the fraction is below 10000
    let fraction = ((clk_freq % bps) as u64 * 10_000 / bps.get() as u64) as u16;
    UCBRS_TABLE
        .iter()
        .rev()
        .find(|&&(min, _)| fraction >= min)
        .map_or(0x00, |&(_, brs)| brs)
}

/// Foreground writer for an interrupt-driven transmitter.
///
/// Pairs a shared [`TxRing`] with the transmitter's [`TxHardware`]. The transmit interrupt
/// handler must call [`TxRing::on_transmit_complete`] on the same ring.
pub struct BufferedTx<'a, H: TxHardware, const N: usize> {
    ring: &'a TxRing<N>,
    hw: H,
}

impl<'a, H: TxHardware, const N: usize> BufferedTx<'a, H, N> {
    /// Create a writer feeding `ring`
    #[inline(always)]
    pub fn new(ring: &'a TxRing<N>, hw: H) -> Self {
        BufferedTx { ring, hw }
    }

    /// `true` once everything written so far has left the transmitter.
    #[inline(always)]
    pub fn is_drained(&self) -> bool {
        self.ring.is_drained()
    }

    /// Queue as much of `bytes` as currently fits, without waiting. Returns the number of
    /// bytes queued.
    #[inline]
    pub fn write_nonblocking(&mut self, bytes: &[u8]) -> usize {
        self.ring.enqueue_bytes(&mut self.hw, bytes)
    }

    /// Release the underlying hardware handle.
    #[inline(always)]
    pub fn free(self) -> H {
        self.hw
    }

    // Spin until at least one byte of `bytes` is queued. The transmit interrupt frees space.
    fn write_some(&mut self, bytes: &[u8]) -> usize {
        loop {
            let count = self.ring.enqueue_bytes(&mut self.hw, bytes);
            if count > 0 {
                return count;
            }
            core::hint::spin_loop();
        }
    }
}

impl<H: TxHardware, const N: usize> core::fmt::Write for BufferedTx<'_, H, N> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let mut bytes = s.as_bytes();
        while !bytes.is_empty() {
            let count = self.write_some(bytes);
            bytes = &bytes[count..];
        }
        Ok(())
    }
}

mod emb_io {
    use super::*;
    use embedded_io::{ErrorType, Write, WriteReady};

    impl<H: TxHardware, const N: usize> ErrorType for BufferedTx<'_, H, N> {
        type Error = Infallible;
    }

    impl<H: TxHardware, const N: usize> Write for BufferedTx<'_, H, N> {
        /// Queue as many bytes as fit, blocking until at least one does, and return the count.
        ///
        /// If `buf` is length zero, `write` returns `Ok(0)` without blocking.
        #[inline]
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            if buf.is_empty() {
                return Ok(0);
            }
            Ok(self.write_some(buf))
        }

        /// Block until every queued byte has been transmitted.
        #[inline]
        fn flush(&mut self) -> Result<(), Self::Error> {
            while !self.ring.is_drained() {
                core::hint::spin_loop();
            }
            Ok(())
        }
    }

    impl<H: TxHardware, const N: usize> WriteReady for BufferedTx<'_, H, N> {
        /// Whether at least one more byte can be queued without blocking.
        fn write_ready(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.ring.is_full())
        }
    }
}

mod ehal_nb1 {
    use super::*;
    use embedded_hal_nb::serial::{ErrorType, Write};

    impl<H: TxHardware, const N: usize> ErrorType for BufferedTx<'_, H, N> {
        type Error = Infallible;
    }

    impl<H: TxHardware, const N: usize> Write<u8> for BufferedTx<'_, H, N> {
        /// Queue a byte, or return `WouldBlock` if the ring buffer is full.
        #[inline]
        fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
            self.ring.enqueue_byte(&mut self.hw, word)
        }

        /// `WouldBlock` until the ring buffer has drained.
        #[inline]
        fn flush(&mut self) -> nb::Result<(), Self::Error> {
            if self.ring.is_drained() {
                Ok(())
            } else {
                Err(nb::Error::WouldBlock)
            }
        }
    }
}
