//! HD44780 character LCD in 4-bit mode
//!
//! The waveform lab shows its settings on a 16x2 module. Only the upper four data lines
//! (DB4-DB7) are wired, R/W is tied low, so every byte goes out as two nibbles, high nibble
//! first, each latched by a pulse on E. Nothing is ever read back: the driver waits out the
//! controller's execution time instead of polling the busy flag.

use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

/// Visible columns per row
pub const LCD_COLUMNS: u8 = 16;

// Highest DDRAM column addressable in two-line mode
const MAX_COLUMN: u8 = 0x27;
// DDRAM address of the first column of row 1
const ROW1_OFFSET: u8 = 0x40;

const FUNCTION_4BIT_TWO_LINE: u8 = 0x28;
const ENTRY_CURSOR_RIGHT: u8 = 0x06;
const CLEAR: u8 = 0x01;
const HOME: u8 = 0x02;
const DISPLAY_ON: u8 = 0x0C;
const DISPLAY_OFF: u8 = 0x08;
const SET_DDRAM_ADDRESS: u8 = 0x80;

const POWER_UP_MS: u32 = 35;
const INIT_STEP_MS: u32 = 3;
const COMMAND_MS: u32 = 4;
const DATA_MS: u32 = 1;
const ENABLE_PULSE_NS: u32 = 450;

/// LCD errors
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LcdError<E> {
    /// Driving a pin failed
    Pin(E),
    /// Cursor position outside the display memory
    OutOfRange,
}

impl<E> From<E> for LcdError<E> {
    #[inline(always)]
    fn from(err: E) -> Self {
        LcdError::Pin(err)
    }
}

/// 4-bit HD44780 driver.
///
/// `data[0]` is DB4 and `data[3]` is DB7.
pub struct Lcd<P, D> {
    rs: P,
    enable: P,
    data: [P; 4],
    delay: D,
}

impl<P, D> Lcd<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    /// Take the pins. The display is not touched until [`init`](Self::init).
    pub fn new(rs: P, enable: P, data: [P; 4], delay: D) -> Self {
        Lcd {
            rs,
            enable,
            data,
            delay,
        }
    }

    /// Bring the controller into two-line 4-bit mode with the cursor moving right, then clear
    /// the display and switch it on.
    pub fn init(&mut self) -> Result<(), LcdError<P::Error>> {
        self.delay.delay_ms(POWER_UP_MS);

        // Still in 8-bit mode: a single nibble switches the interface width
        self.send_nibble(FUNCTION_4BIT_TWO_LINE >> 4, false)?;
        self.delay.delay_ms(INIT_STEP_MS);

        self.command(DISPLAY_OFF)?;
        self.delay.delay_ms(INIT_STEP_MS);

        self.command(FUNCTION_4BIT_TWO_LINE)?;
        self.command(ENTRY_CURSOR_RIGHT)?;
        self.command(CLEAR)?;
        self.command(DISPLAY_ON)?;
        self.delay.delay_ms(INIT_STEP_MS);
        Ok(())
    }

    /// Blank the display and move the cursor home
    #[inline]
    pub fn clear(&mut self) -> Result<(), LcdError<P::Error>> {
        self.command(CLEAR)
    }

    /// Move the cursor to the top left without clearing
    #[inline]
    pub fn home(&mut self) -> Result<(), LcdError<P::Error>> {
        self.command(HOME)
    }

    /// Move the cursor. `column` may address the off-screen part of the line (up to 39),
    /// `row` is 0 or 1.
    pub fn set_cursor(&mut self, column: u8, row: u8) -> Result<(), LcdError<P::Error>> {
        if column > MAX_COLUMN || row > 1 {
            return Err(LcdError::OutOfRange);
        }
        let address = column + if row == 1 { ROW1_OFFSET } else { 0 };
        self.command(SET_DDRAM_ADDRESS | address)
    }

    /// Display one character code at the cursor
    pub fn write_byte(&mut self, byte: u8) -> Result<(), LcdError<P::Error>> {
        self.send_nibble(byte >> 4, true)?;
        self.send_nibble(byte & 0x0F, true)?;
        self.delay.delay_ms(DATA_MS);
        Ok(())
    }

    /// Display `s` at the cursor. Characters outside ASCII are sent as their low byte.
    pub fn write_str(&mut self, s: &str) -> Result<(), LcdError<P::Error>> {
        s.bytes().try_for_each(|b| self.write_byte(b))
    }

    /// Release the pins and delay provider
    pub fn free(self) -> (P, P, [P; 4], D) {
        (self.rs, self.enable, self.data, self.delay)
    }

    /// Send an instruction byte
    pub fn command(&mut self, command: u8) -> Result<(), LcdError<P::Error>> {
        self.send_nibble(command >> 4, false)?;
        self.send_nibble(command & 0x0F, false)?;
        self.delay.delay_ms(COMMAND_MS);
        Ok(())
    }

    // Put a nibble on DB4-DB7, latch it with E, then return every line low
    fn send_nibble(&mut self, nibble: u8, data: bool) -> Result<(), LcdError<P::Error>> {
        for (bit, pin) in self.data.iter_mut().enumerate() {
            pin.set_state((nibble & (1 << bit) != 0).into())?;
        }
        self.rs.set_state(data.into())?;

        self.enable.set_high()?;
        self.delay.delay_ns(ENABLE_PULSE_NS);
        self.enable.set_low()?;

        for pin in self.data.iter_mut() {
            pin.set_low()?;
        }
        self.rs.set_low()?;
        Ok(())
    }
}

/// Text goes to the cursor position, so `write!` works directly on the display.
impl<P: OutputPin, D: DelayNs> fmt::Write for Lcd<P, D> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Lcd::write_str(self, s).map_err(|_| fmt::Error)
    }
}
