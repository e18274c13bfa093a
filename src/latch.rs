//! Single-value hand-off from an interrupt handler to the foreground
//!
//! The ADC conversion-complete handler and the UART receive handler both produce one value at
//! a time that the foreground loop picks up later. [`ValueLatch`] holds the most recent value
//! plus a "new value" flag, each a single atomic word.

use portable_atomic::{AtomicBool, AtomicU16, Ordering};

/// Most recent value published by an interrupt handler.
pub struct ValueLatch {
    value: AtomicU16,
    fresh: AtomicBool,
}

impl Default for ValueLatch {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueLatch {
    /// Create an empty latch
    pub const fn new() -> Self {
        ValueLatch {
            value: AtomicU16::new(0),
            fresh: AtomicBool::new(false),
        }
    }

    /// Store a new value and raise the flag. Overwrites a value that was never taken.
    #[inline]
    pub fn publish(&self, value: u16) {
        self.value.store(value, Ordering::Relaxed);
        self.fresh.store(true, Ordering::Release);
    }

    /// Whether a value has been published since the last [`take`](Self::take) or
    /// [`clear`](Self::clear).
    #[inline]
    pub fn has_new(&self) -> bool {
        self.fresh.load(Ordering::Acquire)
    }

    /// Take the latest value if it has not been taken yet.
    #[inline]
    pub fn take(&self) -> Option<u16> {
        if self.fresh.swap(false, Ordering::AcqRel) {
            Some(self.value.load(Ordering::Relaxed))
        } else {
            None
        }
    }

    /// Read the latest value and lower the flag, whether or not it was new.
    #[inline]
    pub fn take_any(&self) -> u16 {
        self.fresh.store(false, Ordering::Release);
        self.value.load(Ordering::Relaxed)
    }

    /// Lower the flag, e.g. when starting a new conversion.
    #[inline]
    pub fn clear(&self) {
        self.fresh.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_is_taken_once() {
        let latch = ValueLatch::new();
        assert_eq!(latch.take(), None);

        latch.publish(4000);
        assert!(latch.has_new());
        assert_eq!(latch.take(), Some(4000));
        assert!(!latch.has_new());
        assert_eq!(latch.take(), None);
        assert_eq!(latch.take_any(), 4000);
    }

    #[test]
    fn newer_value_replaces_untaken_one() {
        let latch = ValueLatch::new();
        latch.publish(1);
        latch.publish(2);
        assert_eq!(latch.take(), Some(2));
    }

    #[test]
    fn clear_drops_pending_flag() {
        let latch = ValueLatch::new();
        latch.publish(7);
        latch.clear();
        assert_eq!(latch.take(), None);
    }
}
