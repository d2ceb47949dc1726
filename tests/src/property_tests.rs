//! Property checks over configurations and arbitrary host input

use audiokeyer_core::tables::{EnvelopeTable, ToneTable, ENVELOPE_UNITY};
use audiokeyer_core::{GeneratorConfig, KeyerControl, WinkeyDecoder, MAX_FREQUENCY, MIN_FREQUENCY};
use proptest::prelude::*;

use crate::HostKeyer;

/// Control that accepts everything and counts patterns
#[derive(Default)]
struct Sink {
    wpm: u16,
    patterns: usize,
}

impl KeyerControl for Sink {
    fn set_frequency(&mut self, _frequency: u16) {}
    fn set_wpm(&mut self, wpm: u16) {
        assert!((5..=99).contains(&wpm));
        self.wpm = wpm;
    }
    fn wpm(&self) -> u16 {
        self.wpm
    }
    fn set_rise_time(&mut self, _rise_time_ms: u8) {}
    fn send_pattern(&mut self, pattern: &str) {
        assert!(!pattern.is_empty());
        self.patterns += 1;
    }
    fn enter_firmware_update(&mut self) {}
}

fn config_strategy() -> impl Strategy<Value = GeneratorConfig> {
    (8_000u32..=48_000, 1usize..=256, MIN_FREQUENCY..=MAX_FREQUENCY, 10u16..=99, 0u8..=100, 1u8..=50).prop_map(
        |(sample_rate, buffer_size, frequency, wpm, volume, rise)| {
            GeneratorConfig::new(sample_rate, buffer_size)
                .unwrap()
                .with_frequency(frequency)
                .with_wpm(wpm)
                .with_volume(volume)
                .with_rise_time(rise)
        },
    )
}

proptest! {
    #[test]
    fn decoder_reply_never_exceeds_input(bytes in proptest::collection::vec(any::<u8>(), 0..128)) {
        let mut message = bytes.clone();
        let mut sink = Sink::default();
        let reply = WinkeyDecoder::new().parse(&mut message, &mut sink);
        prop_assert!(reply <= bytes.len());
        prop_assert!(sink.patterns <= bytes.len());
    }

    #[test]
    fn dit_is_whole_tone_periods(config in config_strategy()) {
        let tone = ToneTable::new(&config);
        let dit = audiokeyer_core::tables::dit_samples(&config, tone.period());
        prop_assert_eq!(dit % tone.period(), 0);
        prop_assert!(dit >= 60 * config.sample_rate / (50 * config.wpm as u32));
        prop_assert!(dit < 60 * config.sample_rate / (50 * config.wpm as u32) + tone.period());
    }

    #[test]
    fn tone_stays_within_amplitude(config in config_strategy()) {
        let tone = ToneTable::new(&config);
        let amplitude = config.amplitude();
        prop_assert_eq!(tone.as_slice().len() as u32, tone.period());
        prop_assert!(tone.as_slice().iter().all(|&s| (s as i32).abs() <= amplitude));
    }

    #[test]
    fn envelope_is_monotonic_and_bounded(config in config_strategy()) {
        let envelope = EnvelopeTable::new(&config);
        let gains = envelope.as_slice();
        prop_assert_eq!(gains.len() as u32, config.rise_samples() + 1);
        // Allow one LSB of float rounding where the window is flat
        prop_assert!(gains.windows(2).all(|w| w[0] <= w[1] + 1));
        prop_assert_eq!(gains[0], 0);
        prop_assert!(gains.iter().all(|&g| g <= ENVELOPE_UNITY));
    }

    #[test]
    fn audio_is_silent_when_idle(frames in 1usize..200) {
        let mut keyer = HostKeyer::settled();
        let pcm = keyer.capture(frames);
        prop_assert!(pcm.iter().all(|&s| s == 0));
    }
}
