//! Producer blocking on a full transmission queue, resolved by the audio side

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use audiokeyer_core::hal::mock::MockHal;
use audiokeyer_core::{
    AudioSource, CwGenerator, GeneratorConfig, KeyerControl, KeyerState, MorseSymbol, QueueFull, SymbolProducer,
    TransmissionQueue, WinkeyDecoder,
};
use tokio::time::timeout;

/// Eight slots, seven usable
const SMALL_QUEUE: usize = 8;

/// Control that only queues text, as a decoder running on its own thread would
struct QueueOnly {
    producer: SymbolProducer<'static, SMALL_QUEUE>,
}

impl KeyerControl for QueueOnly {
    fn set_frequency(&mut self, _frequency: u16) {}
    fn set_wpm(&mut self, _wpm: u16) {}
    fn wpm(&self) -> u16 {
        20
    }
    fn set_rise_time(&mut self, _rise_time_ms: u8) {}
    fn send_pattern(&mut self, pattern: &str) {
        self.producer.enqueue_text_symbols(pattern);
    }
    fn enter_firmware_update(&mut self) {}
}

fn small_queue() -> &'static mut TransmissionQueue<SMALL_QUEUE> {
    Box::leak(Box::new(TransmissionQueue::new()))
}

#[test]
fn test_try_enqueue_reports_full() {
    let (mut producer, _consumer) = small_queue().split();
    for _ in 0..SMALL_QUEUE - 1 {
        tokio_test::assert_ok!(producer.try_enqueue_symbol(MorseSymbol::Dit));
    }
    assert_eq!(producer.free_slots(), 0);
    assert_eq!(producer.try_enqueue_symbol(MorseSymbol::Dah), Err(QueueFull));
}

#[tokio::test]
async fn test_blocked_decoder_resumes_as_audio_drains() {
    let (producer, consumer) = small_queue().split();
    let mut generator = CwGenerator::new(GeneratorConfig::default().with_wpm(60), MockHal::new(), consumer);
    let done = Arc::new(AtomicBool::new(false));

    // "50" expands to 14 symbols, twice what fits
    let decoder_done = done.clone();
    let decoder = tokio::task::spawn_blocking(move || {
        let mut control = QueueOnly { producer };
        let reply = WinkeyDecoder::new().parse(&mut b"50".to_vec(), &mut control);
        decoder_done.store(true, Ordering::Release);
        reply
    });

    let audio = async {
        let mut ticks = 0u32;
        while !done.load(Ordering::Acquire) {
            generator.advance();
            ticks += 1;
            if ticks % 64 == 0 {
                tokio::task::yield_now().await;
            }
        }
        generator
    };

    let mut generator = timeout(Duration::from_secs(10), audio)
        .await
        .expect("decoder never unblocked");
    let reply = tokio_test::assert_ok!(decoder.await);
    assert_eq!(reply, 0);

    // The rest drains normally
    for _ in 0..20_000 {
        generator.advance();
    }
    assert_eq!(generator.queued(), 0);
    assert_eq!(generator.state(), KeyerState::Idle);
}

#[tokio::test]
async fn test_drained_symbols_arrive_in_order() {
    let (mut producer, mut consumer) = small_queue().split();

    let writer = tokio::task::spawn_blocking(move || {
        for symbol in [MorseSymbol::Dah, MorseSymbol::Dit].iter().cycle().take(32) {
            producer.enqueue_symbol(*symbol);
        }
    });

    let mut received = Vec::new();
    while received.len() < 32 {
        match consumer.pop() {
            Some(symbol) => received.push(symbol),
            None => tokio::task::yield_now().await,
        }
    }
    tokio_test::assert_ok!(writer.await);

    assert!(received.chunks(2).all(|pair| pair == [MorseSymbol::Dah, MorseSymbol::Dit]));
}
