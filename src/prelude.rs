//! Prelude

pub use crate::dac::DacSink as _msp432_labs_DacSink;
pub use crate::keypad::KeypadIrq as _msp432_labs_KeypadIrq;
pub use crate::serial::TxHardware as _msp432_labs_TxHardware;
pub use crate::timer::CompareTimer as _msp432_labs_CompareTimer;
pub use crate::timer::WaveTimers as _msp432_labs_WaveTimers;
