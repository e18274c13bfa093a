//! eUSCI_A3 SPI master for the MCP4921 DAC (P9.5 clock, P9.7 data out, P9.4 chip select)

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::{ErrorType, Operation, SpiDevice};
use msp432p401r as pac;

use crate::clock::CycleDelay;

const UCSWRST: u16 = 0x0001;
const UCSSEL_SMCLK: u16 = 0x0080;
const UCSYNC: u16 = 0x0100;
const UCMST: u16 = 0x0800;
const UCMSB: u16 = 0x2000;
const UCCKPL: u16 = 0x4000;

const UCRXIFG: u16 = 0x0001;
const UCTXIFG: u16 = 0x0002;
const UCBUSY: u16 = 0x0001;

// SMCLK / 2
const CLOCK_DIV: u16 = 2;

// P9 is the low byte of PE
const SPI_PINS: u16 = 0x00A0;
const CS_PIN: u16 = 0x0010;

/// SPI device on eUSCI_A3 with its own chip select
pub struct DacSpi {
    usci: pac::EUSCI_A3,
}

impl DacSpi {
    /// Configure the SPI master and the chip-select pin (idle high)
    pub fn new(usci: pac::EUSCI_A3, dio: &pac::DIO) -> Self {
        set_bits!(dio.pesel0, SPI_PINS);
        clear_bits!(dio.pesel1, SPI_PINS);

        clear_bits!(dio.pesel0, CS_PIN);
        clear_bits!(dio.pesel1, CS_PIN);
        set_bits!(dio.peout, CS_PIN);
        set_bits!(dio.pedir, CS_PIN);

        set_bits!(usci.ucax_ctlw0, UCSWRST);
        usci.ucax_ctlw0.write(|w| unsafe {
            w.bits(UCSWRST | UCSYNC | UCMSB | UCCKPL | UCMST | UCSSEL_SMCLK)
        });
        usci.ucax_brw.write(|w| unsafe { w.bits(CLOCK_DIV) });
        clear_bits!(usci.ucax_ctlw0, UCSWRST);

        DacSpi { usci }
    }

    #[inline]
    fn transfer_byte(&mut self, byte: u8) -> u8 {
        while self.usci.ucax_ifg.read().bits() & UCTXIFG == 0 {}
        self.usci.ucax_txbuf.write(|w| unsafe { w.bits(byte as u16) });
        while self.usci.ucax_ifg.read().bits() & UCRXIFG == 0 {}
        self.usci.ucax_rxbuf.read().bits() as u8
    }

    #[inline(always)]
    fn select(&mut self, dio: &pac::dio::RegisterBlock) {
        clear_bits!(dio.peout, CS_PIN);
    }

    #[inline(always)]
    fn deselect(&mut self, dio: &pac::dio::RegisterBlock) {
        while self.usci.ucax_statw.read().bits() & UCBUSY != 0 {}
        set_bits!(dio.peout, CS_PIN);
    }
}

impl ErrorType for DacSpi {
    type Error = Infallible;
}

impl SpiDevice for DacSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
        let dio = unsafe { &*pac::DIO::ptr() };
        self.select(dio);
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => {
                    for &b in bytes.iter() {
                        self.transfer_byte(b);
                    }
                }
                Operation::Read(buf) => {
                    for b in buf.iter_mut() {
                        *b = self.transfer_byte(0);
                    }
                }
                Operation::Transfer(read, write) => {
                    let len = read.len().max(write.len());
                    for i in 0..len {
                        let byte = self.transfer_byte(write.get(i).copied().unwrap_or(0));
                        if let Some(slot) = read.get_mut(i) {
                            *slot = byte;
                        }
                    }
                }
                Operation::TransferInPlace(buf) => {
                    for b in buf.iter_mut() {
                        *b = self.transfer_byte(*b);
                    }
                }
                Operation::DelayNs(ns) => CycleDelay.delay_ns(*ns),
            }
        }
        self.deselect(dio);
        Ok(())
    }
}
