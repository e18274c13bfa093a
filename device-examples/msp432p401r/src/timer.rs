//! Timer_A compare timers
//!
//! Each timer counts continuously from SMCLK and raises its CCR0 interrupt (`TAx_0_IRQ`) when
//! the counter reaches the compare value.

use core::ops::Deref;

use msp432_labs::timer::{CompareTimer, TimerConfig};
use msp432p401r as pac;

const TASSEL_SMCLK: u16 = 0x0200;
const MC_CONTINUOUS: u16 = 0x0020;
const TACLR: u16 = 0x0004;
const ID_SHIFT: u16 = 6;

const CCIE: u16 = 0x0010;
const CCIFG: u16 = 0x0001;

/// A Timer_A peripheral
pub trait TimerA: Deref<Target = pac::timer_a0::RegisterBlock> {
    #[doc(hidden)]
    fn regs() -> &'static pac::timer_a0::RegisterBlock;
}

macro_rules! timer_a {
    ($($TA:ident),*) => {
        $(
            impl TimerA for pac::$TA {
                #[inline(always)]
                fn regs() -> &'static pac::timer_a0::RegisterBlock {
                    unsafe { &*pac::$TA::ptr() }
                }
            }
        )*
    };
}

timer_a!(TIMER_A0, TIMER_A1, TIMER_A2);

/// Continuous-mode timer scheduling events with CCR0
pub struct CompareA<T> {
    timer: T,
}

impl<T: TimerA> CompareA<T> {
    /// Start the counter in continuous mode with the compare interrupt disabled
    pub fn continuous(timer: T, config: TimerConfig) -> Self {
        timer.tax_cctln[0].write(|w| unsafe { w.bits(0) });
        timer.tax_ex0.write(|w| unsafe { w.bits(0) });
        timer.tax_ctl.write(|w| unsafe {
            w.bits(TASSEL_SMCLK | ((config.div() as u16) << ID_SHIFT) | MC_CONTINUOUS | TACLR)
        });
        CompareA { timer }
    }

    /// Clear the CCR0 flag. Call at the end of the `TAx_0` handler.
    #[inline(always)]
    pub fn acknowledge() {
        clear_bits!(T::regs().tax_cctln[0], CCIFG);
    }
}

impl<T: TimerA> CompareTimer for CompareA<T> {
    fn arm(&mut self, delta: u16) {
        let now = self.timer.tax_r.read().bits();
        self.timer.tax_ccrn[0].write(|w| unsafe { w.bits(now.wrapping_add(delta)) });
        clear_bits!(self.timer.tax_cctln[0], CCIFG);
        set_bits!(self.timer.tax_cctln[0], CCIE);
    }

    fn disarm(&mut self) {
        clear_bits!(self.timer.tax_cctln[0], CCIE);
    }

    #[inline]
    fn advance(&mut self, delta: u16) {
        self.timer.tax_ccrn[0].modify(|r, w| unsafe { w.bits(r.bits().wrapping_add(delta)) });
    }
}
