//! Transmit ring buffer
//!
//! [`TxRing`] is the circular byte queue between application code (the producer) and the
//! serial "transmit complete" interrupt (the consumer). The producer appends bytes and, when
//! the transmitter is idle, writes the first byte straight into the hardware transmit
//! register to start the chain. Every completion event then advances the read cursor and
//! either feeds the next byte or switches the completion event off once the queue is empty.
//!
//! No lock is taken anywhere. The queue relies on each cursor having a single writer:
//!
//! * the load cursor is only stored by [`TxRing::enqueue_byte`] and [`TxRing::enqueue_bytes`],
//! * the write cursor is only stored by [`TxRing::on_transmit_complete`].
//!
//! Keep producer calls in the foreground and the completion call in the interrupt handler.
//!
//! A queue with `N` slots holds at most `N - 1` bytes. When it is full, producers get
//! `WouldBlock` (or a short count) instead of overwriting bytes that have not been sent yet.

use crate::serial::TxHardware;
use core::convert::Infallible;
use portable_atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};

/// Fixed-capacity single-producer/single-consumer byte queue feeding a UART transmitter.
///
/// All operations take `&self`, so a `TxRing` can live in a `static` and be shared between
/// the foreground and the transmit interrupt handler.
pub struct TxRing<const N: usize> {
    buf: [AtomicU8; N],
    // Consumer position: index of the byte currently in (or next for) the transmit register
    write: AtomicUsize,
    // Producer position: next free slot
    load: AtomicUsize,
    // Transmit-complete event is enabled and the chain is running
    armed: AtomicBool,
}

impl<const N: usize> Default for TxRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> TxRing<N> {
    /// Creates an empty queue with an idle transmitter.
    pub const fn new() -> Self {
        assert!(N >= 2, "a TxRing needs at least two slots");
        TxRing {
            buf: [const { AtomicU8::new(0) }; N],
            write: AtomicUsize::new(0),
            load: AtomicUsize::new(0),
            armed: AtomicBool::new(false),
        }
    }

    /// Maximum number of bytes that can be queued at once.
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Number of queued bytes that have not finished transmitting.
    #[inline]
    pub fn len(&self) -> usize {
        let load = self.load.load(Ordering::Acquire);
        let write = self.write.load(Ordering::Acquire);
        (load + N - write) % N
    }

    /// `true` once every queued byte has been transmitted.
    #[inline]
    pub fn is_drained(&self) -> bool {
        self.write.load(Ordering::Acquire) == self.load.load(Ordering::Acquire)
    }

    /// Alias of [`is_drained`](Self::is_drained).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.is_drained()
    }

    /// `true` when another byte cannot be queued.
    #[inline]
    pub fn is_full(&self) -> bool {
        advance::<N>(self.load.load(Ordering::Acquire)) == self.write.load(Ordering::Acquire)
    }

    /// Queue one byte for transmission.
    ///
    /// If the transmitter was idle the byte is written to the transmit register immediately
    /// and the transmit-complete event is enabled. Returns `WouldBlock` when the queue is full;
    /// the byte is not stored in that case.
    ///
    /// Producer side: call from the foreground only.
    pub fn enqueue_byte<H: TxHardware>(&self, hw: &mut H, byte: u8) -> nb::Result<(), Infallible> {
        if !self.push(byte) {
            return Err(nb::Error::WouldBlock);
        }
        self.kick(hw);
        Ok(())
    }

    /// Queue as much of `bytes` as fits and return the number of bytes accepted.
    ///
    /// Unlike calling [`enqueue_byte`](Self::enqueue_byte) per byte, the transmitter is
    /// kick-started at most once, after the whole batch has been copied in.
    ///
    /// Producer side: call from the foreground only.
    pub fn enqueue_bytes<H: TxHardware>(&self, hw: &mut H, bytes: &[u8]) -> usize {
        let mut count = 0;
        for &byte in bytes {
            if !self.push(byte) {
                break;
            }
            count += 1;
        }
        if count > 0 {
            self.kick(hw);
        }
        count
    }

    /// Handle one transmit-complete event.
    ///
    /// Advances the read cursor past the byte that just finished. If more bytes are queued the
    /// next one is written to the transmit register, otherwise the completion event is
    /// disabled. Exactly one hardware write happens per call while data remains.
    ///
    /// Consumer side: call from the transmit interrupt handler only.
    pub fn on_transmit_complete<H: TxHardware>(&self, hw: &mut H) {
        if !self.armed.load(Ordering::Acquire) {
            // Spurious completion with nothing in flight
            return;
        }
        let write = advance::<N>(self.write.load(Ordering::Relaxed));
        self.write.store(write, Ordering::Release);

        if write != self.load.load(Ordering::Acquire) {
            hw.write_tx(self.buf[write].load(Ordering::Relaxed));
        } else {
            hw.disable_tx_complete();
            self.armed.store(false, Ordering::Release);
        }
    }

    // Store a byte at the load cursor. Returns false if the queue is full.
    fn push(&self, byte: u8) -> bool {
        let load = self.load.load(Ordering::Relaxed);
        let next = advance::<N>(load);
        if next == self.write.load(Ordering::Acquire) {
            return false;
        }
        self.buf[load].store(byte, Ordering::Relaxed);
        self.load.store(next, Ordering::Release);
        true
    }

    // Start the transmit chain if the consumer has gone idle.
    //
    // The consumer clears `armed` in the same handler invocation that finds the queue empty,
    // so seeing `false` here means the byte at the write cursor has not been sent yet.
    fn kick<H: TxHardware>(&self, hw: &mut H) {
        if !self.armed.swap(true, Ordering::AcqRel) {
            let write = self.write.load(Ordering::Acquire);
            hw.write_tx(self.buf[write].load(Ordering::Relaxed));
            hw.enable_tx_complete();
        }
    }
}

#[inline(always)]
const fn advance<const N: usize>(idx: usize) -> usize {
    let next = idx + 1;
    if next == N {
        0
    } else {
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    #[derive(Default)]
    struct Recorder {
        sent: Vec<u8>,
        enabled: bool,
        enables: usize,
    }

    impl TxHardware for Recorder {
        fn write_tx(&mut self, byte: u8) {
            self.sent.push(byte);
        }

        fn enable_tx_complete(&mut self) {
            self.enabled = true;
            self.enables += 1;
        }

        fn disable_tx_complete(&mut self) {
            self.enabled = false;
        }
    }

    #[test]
    fn first_byte_goes_straight_to_hardware() {
        let ring: TxRing<4> = TxRing::new();
        let mut hw = Recorder::default();

        ring.enqueue_byte(&mut hw, b'a').unwrap();
        assert_eq!(hw.sent, b"a");
        assert!(hw.enabled);

        // Already draining, so only appended
        ring.enqueue_byte(&mut hw, b'b').unwrap();
        assert_eq!(hw.sent, b"a");
        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn completion_disables_event_when_empty() {
        let ring: TxRing<4> = TxRing::new();
        let mut hw = Recorder::default();

        ring.enqueue_byte(&mut hw, b'x').unwrap();
        assert!(!ring.is_drained());
        ring.on_transmit_complete(&mut hw);
        assert!(ring.is_drained());
        assert!(!hw.enabled);
        assert_eq!(hw.sent, b"x");
    }

    #[test]
    fn full_queue_reports_would_block() {
        let ring: TxRing<3> = TxRing::new();
        let mut hw = Recorder::default();

        assert_eq!(ring.capacity(), 2);
        ring.enqueue_byte(&mut hw, 1).unwrap();
        ring.enqueue_byte(&mut hw, 2).unwrap();
        assert!(ring.is_full());
        assert_eq!(ring.enqueue_byte(&mut hw, 3), Err(nb::Error::WouldBlock));

        ring.on_transmit_complete(&mut hw);
        ring.enqueue_byte(&mut hw, 3).unwrap();
        ring.on_transmit_complete(&mut hw);
        ring.on_transmit_complete(&mut hw);
        assert_eq!(hw.sent, [1, 2, 3]);
        assert!(ring.is_drained());
    }

    #[test]
    fn batch_kick_starts_once() {
        let ring: TxRing<8> = TxRing::new();
        let mut hw = Recorder::default();

        assert_eq!(ring.enqueue_bytes(&mut hw, b"abc"), 3);
        assert_eq!(hw.sent, b"a");
        assert_eq!(hw.enables, 1);
    }

    #[test]
    fn batch_is_truncated_to_free_space() {
        let ring: TxRing<4> = TxRing::new();
        let mut hw = Recorder::default();

        assert_eq!(ring.enqueue_bytes(&mut hw, b"hello"), 3);
        assert!(ring.is_full());
        assert_eq!(ring.enqueue_bytes(&mut hw, b"!"), 0);
    }

    #[test]
    fn empty_batch_does_not_arm() {
        let ring: TxRing<4> = TxRing::new();
        let mut hw = Recorder::default();

        assert_eq!(ring.enqueue_bytes(&mut hw, b""), 0);
        assert!(hw.sent.is_empty());
        assert!(!hw.enabled);
    }

    #[test]
    fn spurious_completion_is_ignored() {
        let ring: TxRing<4> = TxRing::new();
        let mut hw = Recorder::default();

        ring.on_transmit_complete(&mut hw);
        assert!(ring.is_drained());
        ring.enqueue_byte(&mut hw, b'q').unwrap();
        assert_eq!(hw.sent, b"q");
    }

    #[test]
    fn cursors_wrap_around() {
        let ring: TxRing<3> = TxRing::new();
        let mut hw = Recorder::default();

        for byte in 0..10u8 {
            ring.enqueue_byte(&mut hw, byte).unwrap();
            ring.on_transmit_complete(&mut hw);
        }
        assert_eq!(hw.sent, (0..10).collect::<Vec<u8>>());
        assert!(ring.is_drained());
    }
}
