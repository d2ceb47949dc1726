//! Sidetone generator: configuration owner, keying FSM driver and PCM renderer

use heapless::Vec;

use crate::fsm::{KeyerFsm, Timing};
use crate::hal::{KeyerHal, StatusIndicator};
use crate::queue::SymbolConsumer;
use crate::tables::{dit_samples, EnvelopeTable, ToneTable};
use crate::types::{GeneratorConfig, IndicatorColor, KeyerState, MAX_BUFFER_SIZE};

/// Audio transport seam: one PCM buffer per USB audio frame
///
/// Pairing contract: the transport calls [`AudioSource::next_buffer`] before
/// it transmits a frame and [`AudioSource::advance`] exactly once after it,
/// strictly alternating. Calling `advance` twice without reading, or reading
/// the same buffer twice, drops or repeats audio; neither is detected here.
pub trait AudioSource {
    /// Buffer for the frame about to be transmitted
    fn next_buffer(&self) -> &[i16];

    /// Advance the keyer by one frame and render the following buffer
    fn advance(&mut self);
}

/// Morse sidetone generator
pub struct CwGenerator<'q, H: KeyerHal, const N: usize> {
    config: GeneratorConfig,
    tone: ToneTable,
    envelope: EnvelopeTable,
    timing: Timing,
    fsm: KeyerFsm,
    queue: SymbolConsumer<'q, N>,
    hal: H,
    buffer: Vec<i16, MAX_BUFFER_SIZE>,
}

impl<'q, H: KeyerHal, const N: usize> CwGenerator<'q, H, N> {
    /// Create a generator; values outside the device range are clamped
    pub fn new(config: GeneratorConfig, hal: H, queue: SymbolConsumer<'q, N>) -> Self {
        let config = config.clamped();

        let mut buffer: Vec<i16, MAX_BUFFER_SIZE> = Vec::new();
        buffer.extend(core::iter::repeat(0).take(config.buffer_size));

        let tone = ToneTable::new(&config);
        let timing = Self::derive_timing(&config, &tone);

        #[cfg(feature = "defmt")]
        defmt::info!("generator: {} Hz, {} WPM, dit {} samples", config.frequency, config.wpm, timing.dit_samples);

        Self {
            envelope: EnvelopeTable::new(&config),
            tone,
            timing,
            config,
            fsm: KeyerFsm::new(),
            queue,
            hal,
            buffer,
        }
    }

    fn derive_timing(config: &GeneratorConfig, tone: &ToneTable) -> Timing {
        Timing {
            dit_samples: dit_samples(config, tone.period()),
            settle_samples: config.sample_rate,
            buffer_len: config.buffer_size as u32,
        }
    }

    /// Regenerate every derived table from the current configuration
    fn rebuild(&mut self) {
        self.tone = ToneTable::new(&self.config);
        self.envelope = EnvelopeTable::new(&self.config);
        self.timing = Self::derive_timing(&self.config, &self.tone);
        #[cfg(feature = "defmt")]
        defmt::debug!("tables rebuilt: period {}, dit {}", self.tone.period(), self.timing.dit_samples);
    }

    /// Set the sidetone frequency in Hz, clamped to the device range
    pub fn set_frequency(&mut self, frequency: u16) {
        self.config.frequency = GeneratorConfig::clamp_frequency(frequency);
        self.rebuild();
    }

    pub fn frequency(&self) -> u16 {
        self.config.frequency
    }

    /// Set the keying speed, clamped to 10..=99 WPM
    pub fn set_wpm(&mut self, wpm: u16) {
        self.config.wpm = GeneratorConfig::clamp_wpm(wpm);
        self.rebuild();
    }

    pub fn wpm(&self) -> u16 {
        self.config.wpm
    }

    /// Set the output volume in percent
    ///
    /// Volume 0 silences output but keeps the last tables.
    pub fn set_volume(&mut self, volume: u8) {
        let volume = GeneratorConfig::clamp_volume(volume);
        if volume == self.config.volume {
            return;
        }
        self.config.volume = volume;
        if volume > 0 {
            self.rebuild();
        }
    }

    pub fn volume(&self) -> u8 {
        self.config.volume
    }

    /// USB audio volume control; only channel 0 is honored
    pub fn set_channel_volume(&mut self, channel: u8, volume: u16, mute: bool) {
        if channel != 0 {
            return;
        }
        let volume = if mute { 0 } else { volume.min(100) as u8 };
        self.set_volume(volume);
    }

    /// Set the envelope rise time in ms, clamped to 1..=50
    pub fn set_rise_time(&mut self, rise_time_ms: u8) {
        self.config.rise_time_ms = GeneratorConfig::clamp_rise_time(rise_time_ms);
        self.rebuild();
    }

    pub fn rise_time(&self) -> u8 {
        self.config.rise_time_ms
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn state(&self) -> KeyerState {
        self.fsm.current_state()
    }

    pub fn fsm(&self) -> &KeyerFsm {
        &self.fsm
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn tone_table(&self) -> &ToneTable {
        &self.tone
    }

    pub fn envelope_table(&self) -> &EnvelopeTable {
        &self.envelope
    }

    /// Symbols still waiting in the transmission queue
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn hal(&self) -> &H {
        &self.hal
    }

    pub fn hal_mut(&mut self) -> &mut H {
        &mut self.hal
    }

    /// Render one buffer starting at `start` samples into the active symbol
    fn render(&mut self, start: u32) {
        let state = self.fsm.current_state();
        if !state.is_keyed() || self.config.volume == 0 {
            self.buffer.iter_mut().for_each(|s| *s = 0);
            return;
        }

        let end = self.fsm.end_index();
        for (position, out) in (start..).zip(self.buffer.iter_mut()) {
            let gain = self.envelope.gain_at(position, end) as i32;
            let sample = self.tone.sample_at(position) as i32;
            *out = ((sample * gain) >> 15) as i16;
        }
    }

    fn update_indicator(&mut self, color: IndicatorColor) {
        if self.hal.indicator().set_color(color).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("indicator update failed");
        }
    }
}

impl<H: KeyerHal, const N: usize> AudioSource for CwGenerator<'_, H, N> {
    fn next_buffer(&self) -> &[i16] {
        &self.buffer
    }

    fn advance(&mut self) {
        let changed = self.fsm.update(&self.timing, &mut self.hal, &mut self.queue);
        if changed {
            let color = self.fsm.indicator_color();
            self.update_indicator(color);
        }
        self.render(self.fsm.progress());
        self.fsm.finish_tick(self.timing.buffer_len);
    }
}
