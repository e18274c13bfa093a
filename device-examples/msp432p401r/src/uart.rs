//! eUSCI_A0 UART (P1.2 RX, P1.3 TX, routed to the debugger's virtual COM port)

use msp432_labs::serial::{BaudConfig, TxHardware};
use msp432p401r as pac;

const UCSWRST: u16 = 0x0001;
const UCSSEL_SMCLK: u16 = 0x0080;

const UCRXIE: u16 = 0x0001;
const UCTXCPTIE: u16 = 0x0008;
const UCRXIFG: u16 = 0x0001;
const UCTXCPTIFG: u16 = 0x0008;

// P1 is the low byte of PA
const UART_PINS: u16 = 0x000C;

#[inline(always)]
fn regs() -> &'static pac::eusci_a0::RegisterBlock {
    unsafe { &*pac::EUSCI_A0::ptr() }
}

/// Configured UART
pub struct UartA0 {
    _usci: pac::EUSCI_A0,
}

impl UartA0 {
    /// Configure 8N1 at `baud` from SMCLK and route the pins. All interrupts start disabled.
    pub fn new(usci: pac::EUSCI_A0, dio: &pac::DIO, smclk_hz: u32, baud: u32) -> Self {
        let config = BaudConfig::new(smclk_hz, baud);

        set_bits!(usci.ucax_ctlw0, UCSWRST);
        usci.ucax_ctlw0
            .write(|w| unsafe { w.bits(UCSWRST | UCSSEL_SMCLK) });
        usci.ucax_brw.write(|w| unsafe { w.bits(config.br) });
        usci.ucax_mctlw.write(|w| unsafe { w.bits(config.mctlw()) });

        set_bits!(dio.pasel0, UART_PINS);
        clear_bits!(dio.pasel1, UART_PINS);

        clear_bits!(usci.ucax_ctlw0, UCSWRST);
        usci.ucax_ifg.write(|w| unsafe { w.bits(0) });
        usci.ucax_ie.write(|w| unsafe { w.bits(0) });

        UartA0 { _usci: usci }
    }

    /// Enable the receive interrupt
    pub fn enable_rx_interrupt(&mut self) {
        set_bits!(regs().ucax_ie, UCRXIE);
    }

    /// Transmitter handle for the foreground
    pub fn tx(&self) -> TxA0 {
        TxA0 { _private: () }
    }
}

/// Transmit half of eUSCI_A0
pub struct TxA0 {
    _private: (),
}

impl TxA0 {
    /// Handle for the interrupt handler.
    ///
    /// # Safety
    /// The UART must have been configured with [`UartA0::new`]. Only the transmit complete
    /// flag and interrupt enable are touched.
    #[inline(always)]
    pub unsafe fn steal() -> Self {
        TxA0 { _private: () }
    }

    /// Check and clear the transmit complete flag
    #[inline]
    pub fn take_tx_complete(&mut self) -> bool {
        let usci = regs();
        if usci.ucax_ifg.read().bits() & UCTXCPTIFG != 0 {
            clear_bits!(usci.ucax_ifg, UCTXCPTIFG);
            true
        } else {
            false
        }
    }
}

impl TxHardware for TxA0 {
    #[inline(always)]
    fn write_tx(&mut self, byte: u8) {
        regs().ucax_txbuf.write(|w| unsafe { w.bits(byte as u16) });
    }

    #[inline(always)]
    fn enable_tx_complete(&mut self) {
        let usci = regs();
        clear_bits!(usci.ucax_ifg, UCTXCPTIFG);
        set_bits!(usci.ucax_ie, UCTXCPTIE);
    }

    #[inline(always)]
    fn disable_tx_complete(&mut self) {
        clear_bits!(regs().ucax_ie, UCTXCPTIE);
    }
}

/// Receive half of eUSCI_A0, used from the interrupt handler
pub struct RxA0 {
    _private: (),
}

impl RxA0 {
    /// Handle for the interrupt handler.
    ///
    /// # Safety
    /// The UART must have been configured with [`UartA0::new`].
    #[inline(always)]
    pub unsafe fn steal() -> Self {
        RxA0 { _private: () }
    }

    /// Received byte, if one is waiting. Reading it clears the flag.
    #[inline]
    pub fn read(&mut self) -> Option<u8> {
        let usci = regs();
        (usci.ucax_ifg.read().bits() & UCRXIFG != 0).then(|| usci.ucax_rxbuf.read().bits() as u8)
    }
}
