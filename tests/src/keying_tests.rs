//! Paddle keying behaviour through the full generator

use audiokeyer_core::hal::mock::MockIndicator;
use audiokeyer_core::test_utils::paddle_script::PaddleScript;
use audiokeyer_core::{
    AudioSource, CwGenerator, EmbeddedHalPaddle, GeneratorConfig, IndicatorColor, KeyerHal, KeyerState,
    PaddleSide, TransmissionQueue,
};
use embedded_hal_mock::eh1::pin::{Mock as PinMock, State, Transaction};
use rstest::rstest;

use crate::HostKeyer;

// 20 WPM at 48 kHz: a dit is 2898 samples, ended on the first tick past it
const DIT_TICKS: u32 = 61;
const DAH_TICKS: u32 = 182;

#[test]
fn test_power_up_settles_in_one_second() {
    let mut keyer = HostKeyer::new();
    // One Init tick, then 1001 frames of 48 samples to pass 48000
    assert_eq!(keyer.settle(), 1002);
    assert_eq!(keyer.generator.hal().indicator.color(), IndicatorColor::Off);
}

#[test]
fn test_paddle_ignored_while_settling() {
    let mut keyer = HostKeyer::new();
    keyer.generator.hal_mut().dit.set_pressed(true);
    for _ in 0..500 {
        keyer.generator.advance();
    }
    assert_eq!(keyer.generator.state(), KeyerState::InitPause);
    assert_eq!(keyer.generator.hal().dit.reads(), 0);
}

#[test]
fn test_single_dit() {
    let mut keyer = HostKeyer::settled();
    let script = PaddleScript::new().hold(PaddleSide::Dit, 0, 1);
    let trace = keyer.run_script(&script, 400);

    assert_eq!(trace.symbols(), ".");
    assert_eq!(trace.durations(KeyerState::Dit), vec![DIT_TICKS]);
    assert_eq!(trace.durations(KeyerState::DitPause), vec![DIT_TICKS]);
    assert_eq!(trace.keyed_colors(), vec![IndicatorColor::Paddle]);
    assert_eq!(keyer.generator.state(), KeyerState::Idle);
}

#[test]
fn test_single_dah() {
    let mut keyer = HostKeyer::settled();
    let script = PaddleScript::new().hold(PaddleSide::Dah, 0, 1);
    let trace = keyer.run_script(&script, 400);

    assert_eq!(trace.symbols(), "-");
    assert_eq!(trace.durations(KeyerState::Dah), vec![DAH_TICKS]);
    assert_eq!(trace.durations(KeyerState::DahPause), vec![DIT_TICKS]);
}

#[test]
fn test_held_dit_repeats() {
    let mut keyer = HostKeyer::settled();
    // Dit, pause, one idle tick: 123 ticks per element
    let script = PaddleScript::new().hold(PaddleSide::Dit, 0, 400);
    let trace = keyer.run_script(&script, 700);

    assert_eq!(trace.symbols(), "....");
    assert_eq!(trace.durations(KeyerState::Idle).len(), 4);
    assert_eq!(trace.keyed_colors().len(), 4);
    assert!(trace.keyed_colors().iter().all(|&c| c == IndicatorColor::Paddle));
}

#[test]
fn test_squeeze_alternates_without_idle_gap() {
    let mut keyer = HostKeyer::settled();
    let script = PaddleScript::new().squeeze(0, 250);
    let trace = keyer.run_script(&script, 800);

    assert_eq!(trace.symbols(), ".-");
    // The Dah follows the Dit pause directly
    let states: Vec<KeyerState> = trace.segments().iter().map(|s| s.state).collect();
    assert_eq!(
        &states[..4],
        &[KeyerState::Dit, KeyerState::DitPause, KeyerState::Dah, KeyerState::DahPause]
    );
}

#[test]
fn test_long_squeeze_keeps_alternating() {
    let mut keyer = HostKeyer::settled();
    let script = PaddleScript::new().squeeze(0, 500);
    let trace = keyer.run_script(&script, 1200);

    assert_eq!(trace.symbols(), ".-.-");
}

#[test]
fn test_opposite_tap_during_pause_is_remembered() {
    let mut keyer = HostKeyer::settled();
    // Dah tapped only inside the Dit pause window
    let script = PaddleScript::new()
        .hold(PaddleSide::Dit, 0, 1)
        .hold(PaddleSide::Dah, 70, 75);
    let trace = keyer.run_script(&script, 600);

    assert_eq!(trace.symbols(), ".-");
    assert_eq!(keyer.generator.fsm().lookahead(), None);
}

#[test]
fn test_squeeze_released_after_dah_starts_adds_nothing() {
    let mut keyer = HostKeyer::settled();
    // Dah pressed inside the Dit pause and still held when the pause ends,
    // then released a few ticks into the Dah
    let script = PaddleScript::new()
        .hold(PaddleSide::Dit, 0, 1)
        .hold(PaddleSide::Dah, 70, 130);
    let trace = keyer.run_script(&script, 800);

    assert_eq!(trace.symbols(), ".-");
    let states: Vec<KeyerState> = trace.segments().iter().map(|s| s.state).collect();
    assert_eq!(
        &states[..4],
        &[KeyerState::Dit, KeyerState::DitPause, KeyerState::Dah, KeyerState::DahPause]
    );
    assert_eq!(keyer.generator.fsm().lookahead(), None);
    assert_eq!(keyer.generator.state(), KeyerState::Idle);
}

#[test]
fn test_tap_during_symbol_is_not_remembered() {
    let mut keyer = HostKeyer::settled();
    // Dah tapped while the Dit is still sounding
    let script = PaddleScript::new()
        .hold(PaddleSide::Dit, 0, 1)
        .hold(PaddleSide::Dah, 20, 30);
    let trace = keyer.run_script(&script, 400);

    assert_eq!(trace.symbols(), ".");
}

#[test]
fn test_paddle_preempts_queued_text() {
    let mut keyer = HostKeyer::settled();
    keyer.send(b"TTT");
    let queued = keyer.generator.queued();
    assert_eq!(queued, 9);

    let script = PaddleScript::new().hold(PaddleSide::Dah, 10, 300);
    let trace = keyer.run_script(&script, 1000);

    assert_eq!(trace.symbols(), "--");
    assert_eq!(trace.keyed_colors(), vec![IndicatorColor::Queue, IndicatorColor::Paddle]);
    assert_eq!(keyer.generator.queued(), 0);
}

#[rstest]
#[case(10)]
#[case(20)]
#[case(35)]
#[case(99)]
fn test_dit_length_tracks_wpm(#[case] wpm: u16) {
    let config = GeneratorConfig::default().with_wpm(wpm);
    let mut keyer = HostKeyer::with_config(config);
    keyer.settle();

    let script = PaddleScript::new().hold(PaddleSide::Dit, 0, 1);
    let trace = keyer.run_script(&script, 2000);

    let dit = keyer.generator.timing().dit_samples;
    assert_eq!(dit % keyer.generator.tone_table().period(), 0);
    assert!(dit >= 60 * 48_000 / (50 * wpm as u32));
    assert_eq!(trace.durations(KeyerState::Dit), vec![dit / 48 + 1]);
}

#[rstest]
#[case(48_000, 48)]
#[case(16_000, 16)]
#[case(44_100, 44)]
fn test_other_transports_settle_in_one_second(#[case] sample_rate: u32, #[case] buffer_size: usize) {
    let config = GeneratorConfig::new(sample_rate, buffer_size).unwrap();
    let mut keyer = HostKeyer::with_config(config);
    let ticks = keyer.settle();
    assert_eq!(ticks, 1 + sample_rate / buffer_size as u32 + 1);
}

#[test]
fn test_keyed_audio_is_bounded_and_silent_after() {
    let mut keyer = HostKeyer::settled();
    keyer.send(b"E");
    let pcm = keyer.capture(400);

    let amplitude = keyer.generator.config().amplitude() as i16;
    assert!(pcm.iter().any(|&s| s != 0));
    assert!(pcm.iter().all(|&s| s.abs() <= amplitude));
    // Tail after the character is silence
    assert!(pcm[pcm.len() - 48 * 50..].iter().all(|&s| s == 0));
}

/// HAL on top of real embedded-hal pins
struct PinHal {
    dit: EmbeddedHalPaddle<PinMock>,
    dah: EmbeddedHalPaddle<PinMock>,
    indicator: MockIndicator,
}

impl KeyerHal for PinHal {
    type DitPaddle = EmbeddedHalPaddle<PinMock>;
    type DahPaddle = EmbeddedHalPaddle<PinMock>;
    type Indicator = MockIndicator;

    fn dit_paddle(&mut self) -> &mut Self::DitPaddle {
        &mut self.dit
    }

    fn dah_paddle(&mut self) -> &mut Self::DahPaddle {
        &mut self.dah
    }

    fn indicator(&mut self) -> &mut MockIndicator {
        &mut self.indicator
    }

    fn enter_firmware_update(&mut self) {}
}

#[test]
fn test_idle_reads_dit_before_dah_on_gpio() {
    let mut dit_pin = PinMock::new(&[Transaction::get(State::High), Transaction::get(State::Low)]);
    let mut dah_pin = PinMock::new(&[Transaction::get(State::High)]);

    let hal = PinHal {
        dit: EmbeddedHalPaddle::new(dit_pin.clone()),
        dah: EmbeddedHalPaddle::new(dah_pin.clone()),
        indicator: MockIndicator::new(),
    };
    let mut queue: TransmissionQueue<8> = TransmissionQueue::new();
    let (_producer, consumer) = queue.split();
    let mut generator = CwGenerator::new(GeneratorConfig::default(), hal, consumer);

    // Settling never touches the pins
    while generator.state() != KeyerState::Idle {
        generator.advance();
    }

    // Both released: dit then dah read
    generator.advance();
    assert_eq!(generator.state(), KeyerState::Idle);

    // Dit pulled low: Dah is not read
    generator.advance();
    assert_eq!(generator.state(), KeyerState::Dit);

    dit_pin.done();
    dah_pin.done();
}
