//! Serial numeric entry
//!
//! The UART DAC lab lets the user type a DAC code (0-4095) in a terminal and commit it with
//! Enter. Input is checked byte by byte inside the receive interrupt: digits are echoed back,
//! carriage return commits the value, and anything else (or a value that no longer fits the
//! 12-bit DAC) throws away what was typed and moves the terminal to a new line.
//!
//! [`NumericEntry`] is the parser. [`DacEntry`] wires it to a [`ValueLatch`] for the
//! foreground and to a [`TxRing`] for the echo.

use crate::latch::ValueLatch;
use crate::ring_buffer::TxRing;
use crate::serial::TxHardware;

/// Largest value accepted, one past the 12-bit DAC range is rejected.
pub const MAX_ENTRY: u16 = 4095;

/// Byte that commits the typed value
pub const TERMINATOR: u8 = b'\r';

/// Reason an entry was discarded
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EntryError {
    /// A byte that is neither a digit nor the terminator
    NotADigit(u8),
    /// The value grew past [`MAX_ENTRY`]
    OutOfRange,
    /// Terminator with no digits typed
    Empty,
}

/// Outcome of feeding one received byte
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EntryEvent {
    /// Digit accepted, echo it back
    Echo(u8),
    /// Value committed with the terminator
    Committed(u16),
    /// Input discarded
    Rejected(EntryError),
    /// Byte dropped without side effects
    Ignored,
}

/// Accumulates decimal digits until the terminator arrives.
#[derive(Clone, Copy, Debug, Default)]
pub struct NumericEntry {
    value: u16,
    digits: u8,
}

impl NumericEntry {
    /// Create an empty entry
    pub const fn new() -> Self {
        NumericEntry {
            value: 0,
            digits: 0,
        }
    }

    /// Value typed so far, `None` before the first digit.
    #[inline]
    pub fn pending(&self) -> Option<u16> {
        (self.digits > 0).then_some(self.value)
    }

    /// Feed one received byte.
    pub fn push(&mut self, byte: u8) -> EntryEvent {
        match byte {
            b'0'..=b'9' => {
                let value = self.value as u32 * 10 + (byte - b'0') as u32;
                if value > MAX_ENTRY as u32 {
                    self.reset();
                    EntryEvent::Rejected(EntryError::OutOfRange)
                } else {
                    self.value = value as u16;
                    self.digits = self.digits.saturating_add(1);
                    EntryEvent::Echo(byte)
                }
            }
            TERMINATOR => match self.pending() {
                Some(value) => {
                    self.reset();
                    EntryEvent::Committed(value)
                }
                None => EntryEvent::Rejected(EntryError::Empty),
            },
            // Line feed trailing a carriage return from CRLF terminals
            b'\n' if self.digits == 0 => EntryEvent::Ignored,
            other => {
                self.reset();
                EntryEvent::Rejected(EntryError::NotADigit(other))
            }
        }
    }

    #[inline]
    fn reset(&mut self) {
        *self = NumericEntry::new();
    }
}

/// Receive-interrupt service for the UART DAC lab.
///
/// Call [`on_receive`](DacEntry::on_receive) from the receive handler with each byte. Committed
/// values land in the latch passed to [`new`](DacEntry::new); echoes go out through the
/// transmit ring.
pub struct DacEntry<'a, const N: usize> {
    entry: NumericEntry,
    latch: &'a ValueLatch,
    tx: &'a TxRing<N>,
}

impl<'a, const N: usize> DacEntry<'a, N> {
    /// Create the service around a latch and a transmit ring
    pub fn new(latch: &'a ValueLatch, tx: &'a TxRing<N>) -> Self {
        DacEntry {
            entry: NumericEntry::new(),
            latch,
            tx,
        }
    }

    /// Handle one received byte. Echo bytes that do not fit in the transmit ring are dropped.
    pub fn on_receive<H: TxHardware>(&mut self, hw: &mut H, byte: u8) -> EntryEvent {
        let event = self.entry.push(byte);
        match event {
            EntryEvent::Echo(digit) => {
                self.tx.enqueue_byte(hw, digit).ok();
            }
            EntryEvent::Committed(value) => {
                self.latch.publish(value);
                self.tx.enqueue_bytes(hw, b"\r\n");
            }
            EntryEvent::Rejected(_err) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("entry rejected: {}", _err);
                self.tx.enqueue_bytes(hw, b"\r\n");
            }
            EntryEvent::Ignored => {}
        }
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(entry: &mut NumericEntry, input: &[u8]) -> EntryEvent {
        let mut last = EntryEvent::Ignored;
        for &b in input {
            last = entry.push(b);
        }
        last
    }

    #[test]
    fn digits_commit_on_carriage_return() {
        let mut entry = NumericEntry::new();
        assert_eq!(entry.push(b'4'), EntryEvent::Echo(b'4'));
        assert_eq!(feed(&mut entry, b"095\r"), EntryEvent::Committed(4095));
        assert_eq!(entry.pending(), None);
    }

    #[test]
    fn leading_zeros_are_fine() {
        let mut entry = NumericEntry::new();
        assert_eq!(feed(&mut entry, b"0007\r"), EntryEvent::Committed(7));
    }

    #[test]
    fn value_past_dac_range_is_discarded() {
        let mut entry = NumericEntry::new();
        assert_eq!(
            feed(&mut entry, b"4096"),
            EntryEvent::Rejected(EntryError::OutOfRange)
        );
        assert_eq!(entry.pending(), None);
        // Starts over afterwards
        assert_eq!(feed(&mut entry, b"12\r"), EntryEvent::Committed(12));
    }

    #[test]
    fn non_digit_is_discarded() {
        let mut entry = NumericEntry::new();
        assert_eq!(
            feed(&mut entry, b"12a"),
            EntryEvent::Rejected(EntryError::NotADigit(b'a'))
        );
        assert_eq!(entry.push(b'\r'), EntryEvent::Rejected(EntryError::Empty));
    }

    #[test]
    fn trailing_line_feed_is_ignored() {
        let mut entry = NumericEntry::new();
        assert_eq!(feed(&mut entry, b"5\r\n"), EntryEvent::Ignored);
        assert_eq!(
            feed(&mut entry, b"5\n"),
            EntryEvent::Rejected(EntryError::NotADigit(b'\n'))
        );
    }

    #[derive(Default)]
    struct Echo {
        sent: std::vec::Vec<u8>,
    }

    impl TxHardware for Echo {
        fn write_tx(&mut self, byte: u8) {
            self.sent.push(byte);
        }
        fn enable_tx_complete(&mut self) {}
        fn disable_tx_complete(&mut self) {}
    }

    #[test]
    fn service_latches_and_echoes() {
        let latch = ValueLatch::new();
        let ring: TxRing<8> = TxRing::new();
        let mut hw = Echo::default();
        let mut service = DacEntry::new(&latch, &ring);

        for &b in b"42\r" {
            service.on_receive(&mut hw, b);
        }
        assert_eq!(latch.take(), Some(42));
        while !ring.is_drained() {
            ring.on_transmit_complete(&mut hw);
        }
        assert_eq!(hw.sent, b"42\r\n");
    }

    #[test]
    fn service_rejection_moves_to_new_line() {
        let latch = ValueLatch::new();
        let ring: TxRing<8> = TxRing::new();
        let mut hw = Echo::default();
        let mut service = DacEntry::new(&latch, &ring);

        service.on_receive(&mut hw, b'9');
        service.on_receive(&mut hw, b'x');
        assert!(!latch.has_new());
        while !ring.is_drained() {
            ring.on_transmit_complete(&mut hw);
        }
        assert_eq!(hw.sent, b"9\r\n");
    }
}
