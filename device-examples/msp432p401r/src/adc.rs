//! ADC14 single conversions on A1 (P5.4) against AVCC

use msp432p401r as pac;

const CTL0_SC: u32 = 0x0000_0001;
const CTL0_ENC: u32 = 0x0000_0002;
const CTL0_ON: u32 = 0x0000_0010;
const CTL0_MSC: u32 = 0x0000_0080;
const CTL0_SHT0_16: u32 = 0x0000_0200;
const CTL0_SHP: u32 = 0x0400_0000;
const CTL0_PDIV_4: u32 = 0x4000_0000;
const CTL1_RES_14BIT: u32 = 0x0000_0030;
const MCTL_INCH_1: u32 = 0x0000_0001;
const IER0_IE0: u32 = 0x0000_0001;

// P5 is the low byte of PC
const ADC_PIN: u16 = 0x0010;

/// Configured ADC14
pub struct Adc14 {
    adc: pac::ADC14,
}

impl Adc14 {
    /// Configure 14-bit single conversions into MEM0 with the completion interrupt enabled
    pub fn new(adc: pac::ADC14, dio: &pac::DIO) -> Self {
        adc.adc14ctl0.write(|w| unsafe { w.bits(0) });
        adc.adc14ctl0.write(|w| unsafe {
            w.bits(CTL0_SHT0_16 | CTL0_SHP | CTL0_PDIV_4 | CTL0_MSC | CTL0_ON)
        });
        adc.adc14ctl1.write(|w| unsafe { w.bits(CTL1_RES_14BIT) });
        set_bits!(adc.adc14mctl[0], MCTL_INCH_1);
        set_bits!(adc.adc14ier0, IER0_IE0);
        set_bits!(adc.adc14ctl0, CTL0_ENC);

        set_bits!(dio.pcsel1, ADC_PIN);
        set_bits!(dio.pcsel0, ADC_PIN);

        Adc14 { adc }
    }

    /// Start a conversion unless one is already running
    pub fn start(&mut self) {
        if self.adc.adc14ctl0.read().bits() & CTL0_SC == 0 {
            set_bits!(self.adc.adc14ctl0, CTL0_SC);
        }
    }

    /// Conversion result. Reading it clears the completion flag.
    ///
    /// Meant for the `ADC14_IRQ` handler, which does not own the peripheral.
    #[inline(always)]
    pub fn take_result() -> u16 {
        let adc = unsafe { &*pac::ADC14::ptr() };
        adc.adc14mem[0].read().bits() as u16
    }
}
