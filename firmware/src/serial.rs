//! WinKeyer host port over USB CDC ACM
//!
//! The CDC endpoints move bytes through two pipes; the serial task decodes
//! one packet at a time and writes replies back.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pipe::Pipe;
use embassy_time::{Duration, Timer};

use audiokeyer_core::queue::MAX_SYMBOLS_PER_PATTERN;
use audiokeyer_core::{GeneratorConfig, KeyerControl, SymbolProducer, WinkeyDecoder};

use crate::usb_audio::with_generator;
use crate::QUEUE_SIZE;

/// Full-speed CDC bulk packet
pub const PACKET_SIZE: usize = 64;

const _: () = assert!(PACKET_SIZE * MAX_SYMBOLS_PER_PATTERN < QUEUE_SIZE);

/// Host to keyer bytes, filled by the CDC OUT endpoint
static HOST_RX: Pipe<CriticalSectionRawMutex, PACKET_SIZE> = Pipe::new();
/// Keyer to host bytes, drained by the CDC IN endpoint
static HOST_TX: Pipe<CriticalSectionRawMutex, PACKET_SIZE> = Pipe::new();

/// CDC OUT callback. Returns bytes accepted; the rest is dropped.
pub fn on_cdc_rx(bytes: &[u8]) -> usize {
    HOST_RX.try_write(bytes).unwrap_or(0)
}

/// CDC IN poll. Returns bytes copied into `buf`.
pub fn on_cdc_tx(buf: &mut [u8]) -> usize {
    HOST_TX.try_read(buf).unwrap_or(0)
}

/// Keyer operations as seen from the serial task
struct SerialControl<'a> {
    producer: &'a mut SymbolProducer<'static, QUEUE_SIZE>,
}

impl KeyerControl for SerialControl<'_> {
    fn set_frequency(&mut self, frequency: u16) {
        with_generator(|g| g.set_frequency(frequency));
    }

    fn set_wpm(&mut self, wpm: u16) {
        with_generator(|g| g.set_wpm(wpm));
    }

    fn wpm(&self) -> u16 {
        with_generator(|g| g.wpm()).unwrap_or(GeneratorConfig::default().wpm)
    }

    fn set_rise_time(&mut self, rise_time_ms: u8) {
        with_generator(|g| g.set_rise_time(rise_time_ms));
    }

    fn send_pattern(&mut self, pattern: &str) {
        self.producer.enqueue_text_symbols(pattern);
    }

    fn enter_firmware_update(&mut self) {
        with_generator(|g| g.hal_mut().enter_firmware_update());
    }
}

/// Serial decoding task
#[embassy_executor::task]
pub async fn serial_task(mut producer: SymbolProducer<'static, QUEUE_SIZE>) {
    #[cfg(feature = "defmt")]
    defmt::info!("serial task started");

    let mut decoder = WinkeyDecoder::new();
    let mut packet = [0u8; PACKET_SIZE];

    loop {
        let len = HOST_RX.read(&mut packet).await;

        // Enqueueing never blocks once a whole packet fits
        while producer.free_slots() < len * MAX_SYMBOLS_PER_PATTERN {
            Timer::after(Duration::from_millis(1)).await;
        }

        let mut control = SerialControl { producer: &mut producer };
        let reply = decoder.parse(&mut packet[..len], &mut control);
        if reply > 0 {
            HOST_TX.write_all(&packet[..reply]).await;
        }
    }
}
