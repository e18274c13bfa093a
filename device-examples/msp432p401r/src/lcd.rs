//! Character LCD wiring
//!
//! The whole of P7 (low byte of the PD register pair) drives the module: DB4-DB7 on P7.0-3,
//! R/W on P7.5 (held low, the display is never read), RS on P7.6 and E on P7.7.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use msp432p401r as pac;

const LCD_PORT: u16 = 0x00FF;
const DATA_PINS: [u16; 4] = [0x01, 0x02, 0x04, 0x08];
const RS_PIN: u16 = 0x40;
const ENABLE_PIN: u16 = 0x80;

/// LCD control or data line on P7
pub struct LcdPin {
    mask: u16,
}

impl ErrorType for LcdPin {
    type Error = Infallible;
}

impl OutputPin for LcdPin {
    #[inline(always)]
    fn set_low(&mut self) -> Result<(), Self::Error> {
        let dio = unsafe { &*pac::DIO::ptr() };
        clear_bits!(dio.pdout, self.mask);
        Ok(())
    }

    #[inline(always)]
    fn set_high(&mut self) -> Result<(), Self::Error> {
        let dio = unsafe { &*pac::DIO::ptr() };
        set_bits!(dio.pdout, self.mask);
        Ok(())
    }
}

/// Make all of P7 a low GPIO output and hand out the RS, E and DB4-DB7 lines
pub fn lcd_pins(dio: &pac::DIO) -> (LcdPin, LcdPin, [LcdPin; 4]) {
    clear_bits!(dio.pdsel0, LCD_PORT);
    clear_bits!(dio.pdsel1, LCD_PORT);
    clear_bits!(dio.pdout, LCD_PORT);
    set_bits!(dio.pddir, LCD_PORT);

    (
        LcdPin { mask: RS_PIN },
        LcdPin { mask: ENABLE_PIN },
        DATA_PINS.map(|mask| LcdPin { mask }),
    )
}
