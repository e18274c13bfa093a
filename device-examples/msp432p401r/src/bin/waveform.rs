//! Keypad-controlled DAC waveform generator.
//!
//! Keys `1`-`5` pick 100-500 Hz, `7`/`8`/`9` pick square, sawtooth or sine, `*`/`#` step the
//! square duty cycle down/up and `0` resets it. Output stops on any key press; `6` restarts it
//! with the new settings. The LCD shows the settings on the top row and whether output is
//! enabled on the bottom row.
//!
//! Timer_A0 paces the square wave, Timer_A1 the sawtooth and Timer_A2 the sine.

#![no_main]
#![no_std]

use core::fmt::Write;

use cortex_m::{asm, peripheral::NVIC};
use cortex_m_rt::entry;
use defmt_rtt as _;
use msp432_labs::{
    dac::Mcp4921,
    keypad::Keypad,
    lcd::Lcd,
    shared::IsrCell,
    timer::{ShapeTimers, TimerConfig, TimerDiv},
    waveform::{FsmState, Shape, WaveConfig, WaveformEngine},
};
use msp432p401r::{self as pac, interrupt, Interrupt};
use msp432p401r_labs_examples::{
    clock::{self, CycleDelay},
    keypad::{keypad_pins, ColumnIrq},
    lcd::lcd_pins,
    spi::DacSpi,
    timer::CompareA,
};
use panic_halt as _;

type Timers = ShapeTimers<
    CompareA<pac::TIMER_A0>,
    CompareA<pac::TIMER_A1>,
    CompareA<pac::TIMER_A2>,
>;
type Engine = WaveformEngine<Timers, Mcp4921<DacSpi>, ColumnIrq>;

static ENGINE: IsrCell<Engine> = IsrCell::new();

#[entry]
fn main() -> ! {
    let Some(periph) = pac::Peripherals::take() else { loop {} };
    clock::stop_watchdog(&periph.WDT_A);
    clock::dco_48mhz(&periph.CS, &periph.PCM, &periph.FLCTL);

    let (rs, enable, data) = lcd_pins(&periph.DIO);
    let mut lcd = Lcd::new(rs, enable, data, CycleDelay);
    lcd.init().ok();

    let square = TimerConfig::smclk(clock::SMCLK_HZ).clk_div(TimerDiv::_8);
    let sawtooth = TimerConfig::smclk(clock::SMCLK_HZ);
    let sine = TimerConfig::smclk(clock::SMCLK_HZ);
    let timers = ShapeTimers::new(
        CompareA::continuous(periph.TIMER_A0, square),
        CompareA::continuous(periph.TIMER_A1, sawtooth),
        CompareA::continuous(periph.TIMER_A2, sine),
    );

    let dac = Mcp4921::new(DacSpi::new(periph.EUSCI_A3, &periph.DIO));
    let (rows, cols, irq) = keypad_pins(&periph.DIO);
    let Ok(mut keypad) = Keypad::new(rows, cols, CycleDelay) else { loop {} };

    let config = WaveConfig::from_timers(square, sawtooth, sine);
    defmt::info!("waveform: base counts {}", config);
    ENGINE.install(WaveformEngine::new(timers, dac, irq, config));

    unsafe {
        NVIC::unmask(Interrupt::TA0_0_IRQ);
        NVIC::unmask(Interrupt::TA1_0_IRQ);
        NVIC::unmask(Interrupt::TA2_0_IRQ);
        NVIC::unmask(Interrupt::PORT4_IRQ);
    }

    loop {
        // Scanning drives the rows, which would trip the column interrupt while output is on
        let polling = ENGINE.with(|e| e.state() == FsmState::Polling) == Some(true);
        let key = if polling {
            keypad.poll_key().ok().flatten()
        } else {
            None
        };

        if let Some(Some((notice, wave))) = ENGINE.with(|e| e.step(key).map(|n| (n, *e.wave()))) {
            if lcd.set_cursor(0, 0).is_ok() {
                write!(lcd, "{}", wave).ok();
            }
            if let Some(line) = notice.status_line() {
                if lcd.set_cursor(0, 1).is_ok() {
                    lcd.write_str(line).ok();
                }
            }
        }

        // Sleep only while the timers run, Polling has to keep scanning
        cortex_m::interrupt::free(|_| {
            if ENGINE.with(|e| e.is_output_enabled()) == Some(true) {
                asm::wfi();
            }
        });
    }
}

#[interrupt]
fn TA0_0_IRQ() {
    ENGINE.with(|e| e.on_timer(Shape::Square));
    CompareA::<pac::TIMER_A0>::acknowledge();
}

#[interrupt]
fn TA1_0_IRQ() {
    ENGINE.with(|e| e.on_timer(Shape::Sawtooth));
    CompareA::<pac::TIMER_A1>::acknowledge();
}

#[interrupt]
fn TA2_0_IRQ() {
    ENGINE.with(|e| e.on_timer(Shape::Sine));
    CompareA::<pac::TIMER_A2>::acknowledge();
}

#[interrupt]
fn PORT4_IRQ() {
    ENGINE.with(|e| e.on_keypad_edge());
}
