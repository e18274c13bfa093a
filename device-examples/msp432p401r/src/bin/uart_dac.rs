//! Type a DAC code (0-4095) in a 9600 baud terminal and press Enter to output it.
//!
//! Digits are echoed as they arrive. Anything else, or a value past 4095, discards the line.

#![no_main]
#![no_std]

use cortex_m::{asm, peripheral::NVIC};
use cortex_m_rt::entry;
use defmt_rtt as _;
use msp432_labs::{
    dac::Mcp4921,
    entry::DacEntry,
    latch::ValueLatch,
    prelude::*,
    ring_buffer::TxRing,
    serial::UART_BUFFER_LENGTH,
    shared::IsrCell,
};
use msp432p401r::{self as pac, interrupt, Interrupt};
use msp432p401r_labs_examples::{
    clock,
    spi::DacSpi,
    uart::{RxA0, TxA0, UartA0},
};
use panic_halt as _;

const BAUD: u32 = 9_600;

static LATCH: ValueLatch = ValueLatch::new();
static TX: TxRing<UART_BUFFER_LENGTH> = TxRing::new();
static ENTRY: IsrCell<DacEntry<'static, UART_BUFFER_LENGTH>> = IsrCell::new();

#[entry]
fn main() -> ! {
    let Some(periph) = pac::Peripherals::take() else { loop {} };
    clock::stop_watchdog(&periph.WDT_A);
    clock::dco_48mhz(&periph.CS, &periph.PCM, &periph.FLCTL);

    let mut dac = Mcp4921::new(DacSpi::new(periph.EUSCI_A3, &periph.DIO));
    let mut uart = UartA0::new(periph.EUSCI_A0, &periph.DIO, clock::SMCLK_HZ, BAUD);

    ENTRY.install(DacEntry::new(&LATCH, &TX));
    uart.enable_rx_interrupt();
    unsafe { NVIC::unmask(Interrupt::EUSCIA0_IRQ) };

    loop {
        if let Some(code) = LATCH.take() {
            defmt::info!("dac <- {}", code);
            dac.write(code).ok();
        }
        cortex_m::interrupt::free(|_| {
            if !LATCH.has_new() {
                asm::wfi();
            }
        });
    }
}

#[interrupt]
fn EUSCIA0_IRQ() {
    let mut tx = unsafe { TxA0::steal() };
    if let Some(byte) = unsafe { RxA0::steal() }.read() {
        ENTRY.with(|entry| entry.on_receive(&mut tx, byte));
    }
    if tx.take_tx_complete() {
        TX.on_transmit_complete(&mut tx);
    }
}
