//! Clock system
//!
//! MCLK and SMCLK both run from the DCO at 48 MHz. That frequency needs core voltage level 1
//! and one flash wait state, which are set up first.

use embedded_hal::delay::DelayNs;
use msp432p401r as pac;

/// MCLK frequency after [`dco_48mhz`]
pub const MCLK_HZ: u32 = 48_000_000;
/// SMCLK frequency after [`dco_48mhz`]
pub const SMCLK_HZ: u32 = 48_000_000;

const WDT_HOLD: u32 = 0x5A80;

const PCM_KEY: u32 = 0x695A << 16;
const PCM_AM_LDO_VCORE1: u32 = 0x01;
const PCM_PMR_BUSY: u32 = 0x0100;

const FLASH_WAIT_MASK: u32 = 0xF000;
const FLASH_WAIT_1: u32 = 0x1000;

const CS_KEY: u32 = 0x695A;
const CS_DCORSEL_5: u32 = 5 << 16;
const CS_SELM_MASK: u32 = 0x0007;
const CS_SELS_MASK: u32 = 0x0070;
const CS_SELM_DCO: u32 = 0x0003;
const CS_SELS_DCO: u32 = 0x0030;

/// Stop the watchdog
pub fn stop_watchdog(wdt: &pac::WDT_A) {
    wdt.wdtctl.write(|w| unsafe { w.bits(WDT_HOLD as u16) });
}

/// Run MCLK and SMCLK from the DCO at 48 MHz
pub fn dco_48mhz(cs: &pac::CS, pcm: &pac::PCM, flctl: &pac::FLCTL) {
    while pcm.pcmctl1.read().bits() & PCM_PMR_BUSY != 0 {}
    pcm.pcmctl0
        .write(|w| unsafe { w.bits(PCM_KEY | PCM_AM_LDO_VCORE1) });
    while pcm.pcmctl1.read().bits() & PCM_PMR_BUSY != 0 {}

    flctl.flctl_bank0_rdctl.modify(|r, w| unsafe {
        w.bits((r.bits() & !FLASH_WAIT_MASK) | FLASH_WAIT_1)
    });
    flctl.flctl_bank1_rdctl.modify(|r, w| unsafe {
        w.bits((r.bits() & !FLASH_WAIT_MASK) | FLASH_WAIT_1)
    });

    cs.cskey.write(|w| unsafe { w.bits(CS_KEY) });
    cs.csctl0.write(|w| unsafe { w.bits(CS_DCORSEL_5) });
    cs.csctl1.modify(|r, w| unsafe {
        w.bits((r.bits() & !(CS_SELM_MASK | CS_SELS_MASK)) | CS_SELM_DCO | CS_SELS_DCO)
    });
    // Lock
    cs.cskey.write(|w| unsafe { w.bits(0) });
}

/// Busy-wait delay counting MCLK cycles, valid once [`dco_48mhz`] has run
#[derive(Clone, Copy, Debug, Default)]
pub struct CycleDelay;

impl DelayNs for CycleDelay {
    #[inline]
    fn delay_ns(&mut self, ns: u32) {
        let cycles = (ns as u64 * MCLK_HZ as u64 / 1_000_000_000) as u32;
        cortex_m::asm::delay(cycles.max(1));
    }
}
