//! 3x4 keypad wiring
//!
//! Rows are on P10.0-3. A row is selected by making its pin an output (the output latch is
//! held low) and released by making it an input again, so unselected rows float. Columns are
//! on P4.0-2 with pull-ups and falling-edge interrupts.
//!
//! P4 is the high byte of the PB register pair, P10 the high byte of PE.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use msp432_labs::keypad::{KeypadIrq, COLUMNS, ROWS};
use msp432p401r as pac;

const ROW_PINS: u16 = 0x0F << 8;
const COLUMN_PINS: u16 = 0x07 << 8;

#[inline(always)]
fn dio() -> &'static pac::dio::RegisterBlock {
    unsafe { &*pac::DIO::ptr() }
}

/// Keypad row pin on P10
pub struct RowPin {
    mask: u16,
}

impl ErrorType for RowPin {
    type Error = Infallible;
}

impl OutputPin for RowPin {
    #[inline(always)]
    fn set_low(&mut self) -> Result<(), Self::Error> {
        set_bits!(dio().pedir, self.mask);
        Ok(())
    }

    #[inline(always)]
    fn set_high(&mut self) -> Result<(), Self::Error> {
        clear_bits!(dio().pedir, self.mask);
        Ok(())
    }
}

/// Keypad column pin on P4
pub struct ColumnPin {
    mask: u16,
}

impl ErrorType for ColumnPin {
    type Error = Infallible;
}

impl InputPin for ColumnPin {
    #[inline(always)]
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(dio().pbin.read().bits() & self.mask != 0)
    }

    #[inline(always)]
    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

/// Column edge interrupt on P4
pub struct ColumnIrq {
    _private: (),
}

impl KeypadIrq for ColumnIrq {
    fn enable_interrupt(&mut self) {
        clear_bits!(dio().pbifg, COLUMN_PINS);
        set_bits!(dio().pbie, COLUMN_PINS);
    }

    fn disable_interrupt(&mut self) {
        clear_bits!(dio().pbie, COLUMN_PINS);
    }
}

/// Configure the keypad pins. Rows are left selected so any key press pulls its column low.
/// The column interrupt starts disabled.
pub fn keypad_pins(dio: &pac::DIO) -> ([RowPin; ROWS], [ColumnPin; COLUMNS], ColumnIrq) {
    clear_bits!(dio.pesel0, ROW_PINS);
    clear_bits!(dio.pesel1, ROW_PINS);
    clear_bits!(dio.peout, ROW_PINS);
    clear_bits!(dio.peren, ROW_PINS);
    set_bits!(dio.pedir, ROW_PINS);

    clear_bits!(dio.pbie, COLUMN_PINS);
    clear_bits!(dio.pbsel0, COLUMN_PINS);
    clear_bits!(dio.pbsel1, COLUMN_PINS);
    clear_bits!(dio.pbdir, COLUMN_PINS);
    set_bits!(dio.pbout, COLUMN_PINS);
    set_bits!(dio.pbren, COLUMN_PINS);
    set_bits!(dio.pbies, COLUMN_PINS);

    let rows = core::array::from_fn(|i| RowPin { mask: 1 << (i + 8) });
    let cols = core::array::from_fn(|i| ColumnPin { mask: 1 << (i + 8) });
    (rows, cols, ColumnIrq { _private: () })
}
