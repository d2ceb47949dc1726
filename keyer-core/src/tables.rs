//! Precomputed tone and envelope tables
//!
//! Both tables live in fixed-capacity storage sized from the configuration
//! bounds, so regeneration on a config change never allocates.

use core::f32::consts::PI;
use heapless::Vec;

use crate::types::{GeneratorConfig, MAX_ENVELOPE_LEN, MAX_TONE_PERIOD};

/// Unity gain of the Q15 envelope
pub const ENVELOPE_UNITY: u16 = 1 << 15;

/// One period of the sidetone, pre-scaled by volume
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToneTable {
    samples: Vec<i16, MAX_TONE_PERIOD>,
}

impl ToneTable {
    /// Build the table for the configured frequency, rate and volume
    pub fn new(config: &GeneratorConfig) -> Self {
        let config = config.clamped();
        let period = tone_period(&config);
        let amplitude = config.amplitude() as f32;
        let step = 2.0 * PI * config.frequency as f32 / config.sample_rate as f32;

        // A clamped config never needs more than MAX_TONE_PERIOD samples
        let samples = (0..period)
            .map(|i| (amplitude * libm::sinf(i as f32 * step)) as i16)
            .collect();

        Self { samples }
    }

    /// Tone period in samples
    pub fn period(&self) -> u32 {
        self.samples.len() as u32
    }

    /// Sample at an absolute symbol position
    #[inline]
    pub fn sample_at(&self, position: u32) -> i16 {
        self.samples[(position % self.period()) as usize]
    }

    pub fn as_slice(&self) -> &[i16] {
        &self.samples
    }
}

/// Attack half of a Blackman window, Q15 gains rising from 0 to unity
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvelopeTable {
    gains: Vec<u16, MAX_ENVELOPE_LEN>,
}

impl EnvelopeTable {
    /// Build the ramp for the configured rise time and rate
    pub fn new(config: &GeneratorConfig) -> Self {
        let rise = config.clamped().rise_samples().max(1);

        // A clamped config never needs more than MAX_ENVELOPE_LEN gains
        let gains = (0..=rise)
            .map(|i| {
                let x = PI * i as f32 / rise as f32;
                let w = libm::fabsf(0.42 - 0.50 * libm::cosf(x) + 0.08 * libm::cosf(2.0 * x));
                let gain = libm::roundf(w * ENVELOPE_UNITY as f32) as u32;
                gain.min(ENVELOPE_UNITY as u32) as u16
            })
            .collect();

        Self { gains }
    }

    /// Ramp length in samples (table length - 1)
    pub fn rise_samples(&self) -> u32 {
        self.gains.len() as u32 - 1
    }

    /// Gain for a sample `position` samples into a symbol ending at `end`
    #[inline]
    pub fn gain_at(&self, position: u32, end: u32) -> u16 {
        if position >= end {
            return 0;
        }
        let rise = self.rise_samples();
        let from_end = end - position;
        let attack = if position < rise { self.gains[position as usize] } else { ENVELOPE_UNITY };
        let release = if from_end <= rise { self.gains[from_end as usize] } else { ENVELOPE_UNITY };
        attack.min(release)
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.gains
    }
}

/// Samples in one tone period, rounded up
pub fn tone_period(config: &GeneratorConfig) -> u32 {
    config.sample_rate.div_ceil(config.frequency.max(1) as u32).max(1)
}

/// Dit length in samples, rounded up to a whole number of tone periods
///
/// `dit = 60 / (50 * wpm)` seconds (PARIS timing). Ending every tone on a
/// full cycle keeps truncated symbols phase-continuous.
pub fn dit_samples(config: &GeneratorConfig, period: u32) -> u32 {
    let raw = 60 * config.sample_rate / (50 * config.wpm.max(1) as u32);
    let period = period.max(1);
    raw.div_ceil(period) * period
}
