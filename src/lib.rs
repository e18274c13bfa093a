//! Interrupt-driven peripheral cores for the MSP432P401R laboratory boards.
//!
//! The crate holds the parts of the lab firmware that share data between interrupt context
//! and the foreground loop:
//!
//! * [`ring_buffer`] and [`serial`]: a transmit ring buffer filled by application code and
//!   drained one byte per "transmit complete" interrupt.
//! * [`waveform`]: a timer-interrupt driven DAC waveform generator (square, sawtooth, sine)
//!   controlled from a matrix keypad, with its settings on a character [`lcd`].
//! * [`fixed_wave`]: the fixed 50 Hz square or triangle output of the first DAC lab.
//! * [`entry`], [`adc`] and [`latch`]: the numeric-entry and ADC reporting helpers used by the
//!   UART labs.
//!
//! Register access is not done here. Every core talks to hardware through small capability
//! traits ([`serial::TxHardware`], [`timer::CompareTimer`], [`dac::DacSink`],
//! [`keypad::KeypadIrq`]) or through [`embedded_hal`] traits, so the same code runs against
//! the MSP432 peripherals in `device-examples/` and against fakes in the host tests.
//!
//! # Usage
//!
//! Cores are constructed once and handed to the interrupt handlers through
//! [`shared::IsrCell`] (or placed directly in a `static` in the case of
//! [`ring_buffer::TxRing`], whose operations only need `&self`).
//!
//! Enable the `defmt` feature to get `defmt::Format` on the public types and debug logging of
//! state transitions.

#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]

pub mod adc;
pub mod dac;
pub mod entry;
pub mod fixed_wave;
pub mod keypad;
pub mod latch;
pub mod lcd;
pub mod prelude;
pub mod ring_buffer;
pub mod serial;
pub mod shared;
pub mod timer;
pub mod waveform;
