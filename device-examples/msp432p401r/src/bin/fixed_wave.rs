//! Fixed 50 Hz, 2 Vpp DAC output.
//!
//! Change `SHAPE` to switch between the triangle and the square. Timer_A0 paces the samples,
//! divided by 8 for the square so that a half period fits the compare register.

#![no_main]
#![no_std]

use cortex_m::peripheral::NVIC;
use cortex_m_rt::entry;
use defmt_rtt as _;
use msp432_labs::{
    dac::Mcp4921,
    fixed_wave::{FixedOutput, FixedShape, FixedWave},
    shared::IsrCell,
    timer::{TimerConfig, TimerDiv},
};
use msp432p401r::{self as pac, interrupt, Interrupt};
use msp432p401r_labs_examples::{clock, spi::DacSpi, timer::CompareA};
use panic_halt as _;

const SHAPE: FixedShape = FixedShape::Triangle;

type Output = FixedOutput<CompareA<pac::TIMER_A0>, Mcp4921<DacSpi>>;

static OUTPUT: IsrCell<Output> = IsrCell::new();

#[entry]
fn main() -> ! {
    let Some(periph) = pac::Peripherals::take() else { loop {} };
    let Some(mut core) = cortex_m::Peripherals::take() else { loop {} };
    clock::stop_watchdog(&periph.WDT_A);
    clock::dco_48mhz(&periph.CS, &periph.PCM, &periph.FLCTL);

    let config = match SHAPE {
        FixedShape::Square => TimerConfig::smclk(clock::SMCLK_HZ).clk_div(TimerDiv::_8),
        FixedShape::Triangle => TimerConfig::smclk(clock::SMCLK_HZ),
    };
    let wave = FixedWave::new(SHAPE, config.tick_hz());
    defmt::info!("fixed wave: {} every {} ticks", SHAPE, wave.delay());

    let dac = Mcp4921::new(DacSpi::new(periph.EUSCI_A3, &periph.DIO));
    let timer = CompareA::continuous(periph.TIMER_A0, config);
    OUTPUT.install(FixedOutput::start(timer, dac, wave));

    // Everything after this point happens in the timer interrupt
    core.SCB.set_sleeponexit();
    unsafe { NVIC::unmask(Interrupt::TA0_0_IRQ) };

    loop {
        cortex_m::asm::wfi();
    }
}

#[interrupt]
fn TA0_0_IRQ() {
    OUTPUT.with(|o| o.on_timer());
    CompareA::<pac::TIMER_A0>::acknowledge();
}
