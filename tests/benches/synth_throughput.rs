use criterion::{black_box, criterion_group, criterion_main, Criterion};

use audiokeyer_core::{AudioSource, GeneratorConfig, KeyerControl, KeyerState, WinkeyDecoder};
use keyer_tests::HostKeyer;

fn keyed_frame(c: &mut Criterion) {
    let mut keyer = HostKeyer::settled();

    c.bench_function("advance_keyed_frame", |b| {
        b.iter(|| {
            if keyer.generator.queued() == 0 && keyer.generator.state() == KeyerState::Idle {
                keyer.send(b"0");
            }
            keyer.generator.advance();
            black_box(keyer.generator.next_buffer());
        })
    });
}

fn table_rebuild(c: &mut Criterion) {
    let mut keyer = HostKeyer::new();
    let mut frequency = 400u16;

    c.bench_function("rebuild_tables", |b| {
        b.iter(|| {
            frequency = if frequency >= 1200 { 400 } else { frequency + 10 };
            keyer.generator.set_frequency(black_box(frequency));
        })
    });

    let slow = GeneratorConfig::default().with_rise_time(50);
    let mut keyer = HostKeyer::with_config(slow);
    c.bench_function("rebuild_tables_50ms_rise", |b| {
        b.iter(|| keyer.generator.set_wpm(black_box(30)))
    });
}

/// Decoder-only control: patterns are dropped, not queued
struct Discard {
    wpm: u16,
}

impl KeyerControl for Discard {
    fn set_frequency(&mut self, _frequency: u16) {}
    fn set_wpm(&mut self, wpm: u16) {
        self.wpm = wpm;
    }
    fn wpm(&self) -> u16 {
        self.wpm
    }
    fn set_rise_time(&mut self, _rise_time_ms: u8) {}
    fn send_pattern(&mut self, pattern: &str) {
        black_box(pattern);
    }
    fn enter_firmware_update(&mut self) {}
}

fn decode_packet(c: &mut Criterion) {
    let mut decoder = WinkeyDecoder::new();
    let mut control = Discard { wpm: 20 };
    let packet: Vec<u8> = [0x02u8, 30, b'a', 0x01, 100, b'k', b' ']
        .iter()
        .copied()
        .cycle()
        .take(64)
        .collect();

    c.bench_function("decode_64_byte_packet", |b| {
        b.iter(|| {
            let mut message = packet.clone();
            black_box(decoder.parse(black_box(&mut message), &mut control))
        })
    });
}

criterion_group!(benches, keyed_frame, table_rebuild, decode_packet);
criterion_main!(benches);
