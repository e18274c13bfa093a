//! 3x4 matrix keypad
//!
//! Rows are driven one at a time and the three columns are read back through pull-ups, so a
//! pressed key reads low. Between scans all rows are held low: any key press then pulls its
//! column low, which is what the column edge interrupt ([`KeypadIrq`]) triggers on.
//!
//! [`Keypad`] does the scanning over `embedded-hal` pins and turns the raw [`KeyState`] into
//! newly pressed [`Key`]s through a [`KeyDecoder`].

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

/// Number of driven rows
pub const ROWS: usize = 4;
/// Number of sensed columns
pub const COLUMNS: usize = 3;

// Settling time after selecting a row
const ROW_SETTLE_NS: u32 = 1900;
// Settling time after a full scan, before the rows are parked low again
const SCAN_SETTLE_MS: u32 = 1;

bitflags::bitflags! {
    /// Pressed state of every key. Bit `3 * row + column` is set while that key is held.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct KeyState: u16 {
        /// Key 3, row 0
        const THREE = 0x001;
        /// Key 2, row 0
        const TWO = 0x002;
        /// Key 1, row 0
        const ONE = 0x004;
        /// Key 6, row 1
        const SIX = 0x008;
        /// Key 5, row 1
        const FIVE = 0x010;
        /// Key 4, row 1
        const FOUR = 0x020;
        /// Key 9, row 2
        const NINE = 0x040;
        /// Key 8, row 2
        const EIGHT = 0x080;
        /// Key 7, row 2
        const SEVEN = 0x100;
        /// Key #, row 3
        const POUND = 0x200;
        /// Key 0, row 3
        const ZERO = 0x400;
        /// Key *, row 3
        const STAR = 0x800;
    }
}

/// A key on the pad
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    /// Numeric key, `0..=9`
    Digit(u8),
    /// `*`
    Star,
    /// `#`
    Pound,
}

impl Key {
    /// Character printed on the key
    pub fn as_char(self) -> char {
        match self {
            Key::Digit(d) => (b'0' + d % 10) as char,
            Key::Star => '*',
            Key::Pound => '#',
        }
    }

    /// Key printed with `c`, if any
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0'..='9' => Some(Key::Digit(c as u8 - b'0')),
            '*' => Some(Key::Star),
            '#' => Some(Key::Pound),
            _ => None,
        }
    }
}

// Order in which simultaneous new presses are reported
const PRIORITY: [(KeyState, Key); 12] = [
    (KeyState::STAR, Key::Star),
    (KeyState::POUND, Key::Pound),
    (KeyState::ONE, Key::Digit(1)),
    (KeyState::TWO, Key::Digit(2)),
    (KeyState::THREE, Key::Digit(3)),
    (KeyState::FOUR, Key::Digit(4)),
    (KeyState::FIVE, Key::Digit(5)),
    (KeyState::SIX, Key::Digit(6)),
    (KeyState::SEVEN, Key::Digit(7)),
    (KeyState::EIGHT, Key::Digit(8)),
    (KeyState::NINE, Key::Digit(9)),
    (KeyState::ZERO, Key::Digit(0)),
];

/// Edge detector turning successive [`KeyState`] scans into single key presses.
///
/// Holding a key reports it once. If several keys go down between two scans only the highest
/// priority one is reported (`*`, `#`, then `1` through `9`, then `0`).
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyDecoder {
    last: KeyState,
}

impl KeyDecoder {
    /// Create a decoder that considers every key released
    pub const fn new() -> Self {
        KeyDecoder {
            last: KeyState::empty(),
        }
    }

    /// Feed the latest scan. Returns the newly pressed key, if any.
    pub fn feed(&mut self, state: KeyState) -> Option<Key> {
        let pressed = state.difference(self.last);
        self.last = state;
        PRIORITY
            .iter()
            .find(|(mask, _)| pressed.contains(*mask))
            .map(|&(_, key)| key)
    }
}

/// Capability to control the keypad column edge interrupt.
pub trait KeypadIrq {
    /// Clear pending column flags and enable the interrupt.
    fn enable_interrupt(&mut self);

    /// Disable the interrupt.
    fn disable_interrupt(&mut self);
}

impl<K: KeypadIrq + ?Sized> KeypadIrq for &mut K {
    #[inline(always)]
    fn enable_interrupt(&mut self) {
        (**self).enable_interrupt()
    }

    #[inline(always)]
    fn disable_interrupt(&mut self) {
        (**self).disable_interrupt()
    }
}

/// Keypad pin errors
#[derive(Clone, Copy, Debug)]
pub enum KeypadError<RE, CE> {
    /// Driving a row failed
    Row(RE),
    /// Reading a column failed
    Column(CE),
}

/// Scanned matrix keypad.
///
/// Row pins should be open-drain (or emulate it): high releases the row, low selects it.
/// Column pins need pull-ups.
pub struct Keypad<R, C, D> {
    rows: [R; ROWS],
    cols: [C; COLUMNS],
    delay: D,
    decoder: KeyDecoder,
}

impl<R, C, D> Keypad<R, C, D>
where
    R: OutputPin,
    C: InputPin,
    D: DelayNs,
{
    /// Take the pins and park all rows low.
    pub fn new(
        rows: [R; ROWS],
        cols: [C; COLUMNS],
        delay: D,
    ) -> Result<Self, KeypadError<R::Error, C::Error>> {
        let mut keypad = Keypad {
            rows,
            cols,
            delay,
            decoder: KeyDecoder::new(),
        };
        keypad.park_rows()?;
        Ok(keypad)
    }

    /// Scan every key.
    pub fn poll_state(&mut self) -> Result<KeyState, KeypadError<R::Error, C::Error>> {
        let mut bits = 0u16;
        for row in 0..ROWS {
            for (i, pin) in self.rows.iter_mut().enumerate() {
                if i == row {
                    pin.set_low().map_err(KeypadError::Row)?;
                } else {
                    pin.set_high().map_err(KeypadError::Row)?;
                }
            }
            self.delay.delay_ns(ROW_SETTLE_NS);

            for (col, pin) in self.cols.iter_mut().enumerate() {
                if pin.is_low().map_err(KeypadError::Column)? {
                    bits |= 1 << (COLUMNS * row + col);
                }
            }
        }
        self.delay.delay_ms(SCAN_SETTLE_MS);
        self.park_rows()?;
        Ok(KeyState::from_bits_truncate(bits))
    }

    /// Scan and report a newly pressed key.
    pub fn poll_key(&mut self) -> Result<Option<Key>, KeypadError<R::Error, C::Error>> {
        let state = self.poll_state()?;
        Ok(self.decoder.feed(state))
    }

    /// Release the pins and delay provider
    pub fn free(self) -> ([R; ROWS], [C; COLUMNS], D) {
        (self.rows, self.cols, self.delay)
    }

    fn park_rows(&mut self) -> Result<(), KeypadError<R::Error, C::Error>> {
        for pin in self.rows.iter_mut() {
            pin.set_low().map_err(KeypadError::Row)?;
        }
        Ok(())
    }
}
