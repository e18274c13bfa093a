//! Stream the voltage on A1 (P5.4) to a 750000 baud terminal as `X.XX`, one reading over the
//! last.
//!
//! A new conversion is started as soon as the previous message has left, and it completes
//! long before the next message is due.

#![no_main]
#![no_std]

use cortex_m::peripheral::NVIC;
use cortex_m_rt::entry;
use defmt_rtt as _;
use msp432_labs::{
    adc::Reading, latch::ValueLatch, ring_buffer::TxRing, serial::BufferedTx,
    serial::UART_BUFFER_LENGTH,
};
use msp432p401r::{self as pac, interrupt, Interrupt};
use msp432p401r_labs_examples::{
    adc::Adc14,
    clock,
    uart::{TxA0, UartA0},
};
use panic_halt as _;

const BAUD: u32 = 750_000;

static LATCH: ValueLatch = ValueLatch::new();
static TX: TxRing<UART_BUFFER_LENGTH> = TxRing::new();

#[entry]
fn main() -> ! {
    let Some(periph) = pac::Peripherals::take() else { loop {} };
    clock::stop_watchdog(&periph.WDT_A);
    clock::dco_48mhz(&periph.CS, &periph.PCM, &periph.FLCTL);

    let uart = UartA0::new(periph.EUSCI_A0, &periph.DIO, clock::SMCLK_HZ, BAUD);
    let mut terminal = BufferedTx::new(&TX, uart.tx());
    let mut adc = Adc14::new(periph.ADC14, &periph.DIO);

    unsafe {
        NVIC::unmask(Interrupt::EUSCIA0_IRQ);
        NVIC::unmask(Interrupt::ADC14_IRQ);
    }

    let mut reading = Reading::from_raw(0);
    loop {
        if terminal.is_drained() {
            terminal.write_nonblocking(&reading.message());
            adc.start();
            while !LATCH.has_new() {}
            reading = Reading::from_raw(LATCH.take_any());
            defmt::trace!("adc: {}", reading);
        }
    }
}

#[interrupt]
fn ADC14_IRQ() {
    LATCH.publish(Adc14::take_result());
}

#[interrupt]
fn EUSCIA0_IRQ() {
    let mut tx = unsafe { TxA0::steal() };
    if tx.take_tx_complete() {
        TX.on_transmit_complete(&mut tx);
    }
}
