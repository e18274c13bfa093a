//! Board support for the MSP432P401R lab programs in `src/bin`.
//!
//! Each module configures one peripheral and implements the matching `msp432-labs`
//! capability on top of the PAC:
//!
//! * [`uart`]: eUSCI_A0 on P1.2/P1.3, [`TxHardware`](msp432_labs::serial::TxHardware).
//! * [`timer`]: Timer_A0..A2 in continuous mode, [`CompareTimer`](msp432_labs::timer::CompareTimer).
//! * [`keypad`]: rows on P10.0-3, columns on P4.0-2, [`KeypadIrq`](msp432_labs::keypad::KeypadIrq)
//!   and `embedded-hal` pins for the scanner.
//! * [`lcd`]: HD44780 lines on P7, `embedded-hal` output pins for the display driver.
//! * [`spi`]: eUSCI_A3 SPI with chip select on P9.4, an `embedded-hal` `SpiDevice` for the
//!   MCP4921.
//! * [`adc`]: ADC14 single conversions on A1 (P5.4).
//! * [`clock`]: 48 MHz DCO for MCLK and SMCLK.

#![no_std]

// Read-modify-write helpers for registers that take raw bit patterns
macro_rules! set_bits {
    ($reg:expr, $bits:expr) => {
        $reg.modify(|r, w| unsafe { w.bits(r.bits() | $bits) })
    };
}

macro_rules! clear_bits {
    ($reg:expr, $bits:expr) => {
        $reg.modify(|r, w| unsafe { w.bits(r.bits() & !$bits) })
    };
}

pub mod adc;
pub mod clock;
pub mod keypad;
pub mod lcd;
pub mod spi;
pub mod timer;
pub mod uart;
