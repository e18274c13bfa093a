use std::convert::Infallible;

use embedded_hal::spi::{ErrorType, Operation, SpiDevice};
use msp432_labs::adc::Reading;
use msp432_labs::dac::{DacSink, Mcp4921};
use msp432_labs::entry::{DacEntry, EntryError, EntryEvent};
use msp432_labs::latch::ValueLatch;
use msp432_labs::ring_buffer::TxRing;
use msp432_labs::serial::{TxHardware, UART_BUFFER_LENGTH};

#[derive(Default)]
struct Terminal {
    screen: Vec<u8>,
    shifting: bool,
}

impl TxHardware for Terminal {
    fn write_tx(&mut self, byte: u8) {
        self.screen.push(byte);
        self.shifting = true;
    }
    fn enable_tx_complete(&mut self) {}
    fn disable_tx_complete(&mut self) {}
}

impl Terminal {
    fn drain<const N: usize>(&mut self, ring: &TxRing<N>) {
        while self.shifting {
            self.shifting = false;
            ring.on_transmit_complete(self);
        }
    }
}

#[derive(Default)]
struct Bus {
    frames: Vec<Vec<u8>>,
}

impl ErrorType for Bus {
    type Error = Infallible;
}

impl SpiDevice for Bus {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
        let mut frame = Vec::new();
        for op in operations.iter() {
            if let Operation::Write(bytes) = op {
                frame.extend_from_slice(bytes);
            }
        }
        self.frames.push(frame);
        Ok(())
    }
}

#[test]
fn typed_value_reaches_the_dac() {
    static LATCH: ValueLatch = ValueLatch::new();
    static TX: TxRing<UART_BUFFER_LENGTH> = TxRing::new();

    let mut terminal = Terminal::default();
    let mut service = DacEntry::new(&LATCH, &TX);
    let mut dac = Mcp4921::new(Bus::default());

    // Receive interrupt, byte by byte, with the transmit interrupt keeping up
    for &b in b"2048\r" {
        service.on_receive(&mut terminal, b);
        terminal.drain(&TX);
    }

    // Foreground loop
    if let Some(code) = LATCH.take() {
        dac.write(code).unwrap();
    }
    assert_eq!(LATCH.take(), None);
    assert_eq!(terminal.screen, b"2048\r\n");
    assert_eq!(dac.free().frames, [[0x18, 0x00]]);
}

#[test]
fn bad_input_leaves_the_dac_alone() {
    let latch = ValueLatch::new();
    let tx: TxRing<UART_BUFFER_LENGTH> = TxRing::new();
    let mut terminal = Terminal::default();
    let mut service = DacEntry::new(&latch, &tx);

    let events: Vec<EntryEvent> = b"4100\r"
        .iter()
        .map(|&b| service.on_receive(&mut terminal, b))
        .collect();
    terminal.drain(&tx);

    assert_eq!(
        events[3],
        EntryEvent::Rejected(EntryError::OutOfRange)
    );
    assert_eq!(events[4], EntryEvent::Rejected(EntryError::Empty));
    assert!(!latch.has_new());
    assert_eq!(terminal.screen, b"410\r\n\r\n");
}

#[test]
fn adc_readings_stream_to_terminal() {
    let latch = ValueLatch::new();
    let tx: TxRing<UART_BUFFER_LENGTH> = TxRing::new();
    let mut terminal = Terminal::default();

    for raw in [0u16, 8192, 0x3FFF] {
        // Conversion-complete interrupt
        latch.publish(raw);
        // Foreground
        let reading = Reading::from_raw(latch.take_any());
        tx.enqueue_bytes(&mut terminal, &reading.message());
        terminal.drain(&tx);
    }
    assert_eq!(terminal.screen, b"\r0.00\r1.64\r3.29");
}
