//! Core data types for the audio keyer

/// Number of time units for a Dit
pub const DIT_UNITS: u32 = 1;
/// Number of time units for a Dah
pub const DAH_UNITS: u32 = 3;
/// Number of time units for a pause between the elements of one character
pub const INTRA_CHAR_PAUSE_UNITS: u32 = 1;
/// Number of time units for a pause between characters
pub const INTER_CHAR_PAUSE_UNITS: u32 = 3;

/// Lowest sidetone frequency the device produces (Hz)
pub const MIN_FREQUENCY: u16 = 200;
/// Highest sidetone frequency the device produces (Hz)
pub const MAX_FREQUENCY: u16 = 4000;
/// Slowest supported keying speed
pub const MIN_WPM: u16 = 10;
/// Fastest supported keying speed
pub const MAX_WPM: u16 = 99;
/// Shortest envelope rise time (ms)
pub const MIN_RISE_TIME_MS: u8 = 1;
/// Longest envelope rise time (ms)
pub const MAX_RISE_TIME_MS: u8 = 50;
/// Volume ceiling in percent
pub const MAX_VOLUME: u8 = 100;

/// Lowest accepted audio sample rate (Hz)
pub const MIN_SAMPLE_RATE: u32 = 8_000;
/// Highest accepted audio sample rate (Hz)
pub const MAX_SAMPLE_RATE: u32 = 48_000;
/// Largest number of samples rendered per tick
pub const MAX_BUFFER_SIZE: usize = 256;

/// Storage bound for one tone period at the lowest frequency and highest rate
pub const MAX_TONE_PERIOD: usize = MAX_SAMPLE_RATE.div_ceil(MIN_FREQUENCY as u32) as usize;
/// Storage bound for the envelope ramp at the longest rise time and highest rate
pub const MAX_ENVELOPE_LEN: usize =
    (MAX_SAMPLE_RATE as usize * MAX_RISE_TIME_MS as usize) / 1000 + 1;

/// Morse code symbols fed to the keying state machine
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "std", derive(Hash))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MorseSymbol {
    /// Short element
    Dit,
    /// Long element
    Dah,
    /// One silent time unit
    Pause,
}

impl MorseSymbol {
    /// Returns the duration of this symbol in units
    pub const fn duration_units(&self) -> u32 {
        match self {
            MorseSymbol::Dit => DIT_UNITS,
            MorseSymbol::Dah => DAH_UNITS,
            MorseSymbol::Pause => INTRA_CHAR_PAUSE_UNITS,
        }
    }

    /// Returns true if this symbol produces a tone
    pub const fn is_keyed(&self) -> bool {
        match self {
            MorseSymbol::Dit | MorseSymbol::Dah => true,
            MorseSymbol::Pause => false,
        }
    }

    /// Map one character of a pattern string: `.` Dit, `-` Dah, anything else Pause
    pub const fn from_pattern_char(c: u8) -> Self {
        match c {
            b'.' => MorseSymbol::Dit,
            b'-' => MorseSymbol::Dah,
            _ => MorseSymbol::Pause,
        }
    }
}

/// Paddle side identification
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PaddleSide {
    /// Dit paddle (typically left side)
    Dit,
    /// Dah paddle (typically right side)
    Dah,
}

/// FSM states for the keyer, advanced once per audio tick
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "std", derive(Hash))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyerState {
    /// Power-up, left on the first tick
    Init,
    /// Settling delay after power-up
    InitPause,
    /// Nothing sounding, looking for the next symbol
    Idle,
    /// Sounding a Dit
    Dit,
    /// Sounding a Dah
    Dah,
    /// Silent unit after a Dit
    DitPause,
    /// Silent unit after a Dah (or a queued pause)
    DahPause,
}

impl KeyerState {
    /// Returns true while a tone is being rendered
    pub const fn is_keyed(&self) -> bool {
        matches!(self, KeyerState::Dit | KeyerState::Dah)
    }
}

/// Origin of the symbol currently on air
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SymbolSource {
    /// Live paddle contact
    Paddle,
    /// Transmission queue (serial host)
    Queue,
}

/// Indicator light colors
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IndicatorColor {
    /// Nothing on air
    Off,
    /// Manual paddle keying
    Paddle,
    /// Keying from the serial host
    Queue,
}

impl IndicatorColor {
    /// Packed 0xRRGGBB value for the RGB driver
    pub const fn rgb(&self) -> u32 {
        match self {
            IndicatorColor::Off => 0x00_00_00,
            IndicatorColor::Paddle => 0x00_20_00,
            IndicatorColor::Queue => 0x00_00_20,
        }
    }
}

impl From<SymbolSource> for IndicatorColor {
    fn from(source: SymbolSource) -> Self {
        match source {
            SymbolSource::Paddle => IndicatorColor::Paddle,
            SymbolSource::Queue => IndicatorColor::Queue,
        }
    }
}

/// Configuration rejected at construction
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Sample rate outside the statically sized range
    SampleRate,
    /// Samples per tick outside the statically sized range
    BufferSize,
}

#[cfg(feature = "std")]
impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::SampleRate => write!(
                f,
                "sample rate must be between {} and {} Hz",
                MIN_SAMPLE_RATE, MAX_SAMPLE_RATE
            ),
            ConfigError::BufferSize => {
                write!(f, "buffer size must be between 1 and {} samples", MAX_BUFFER_SIZE)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Tone generator configuration parameters
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GeneratorConfig {
    /// Audio sample rate (Hz)
    pub sample_rate: u32,
    /// Samples rendered per tick
    pub buffer_size: usize,
    /// Sidetone frequency (Hz)
    pub frequency: u16,
    /// Keying speed in words per minute
    pub wpm: u16,
    /// Output volume in percent
    pub volume: u8,
    /// Envelope rise time (ms)
    pub rise_time_ms: u8,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            buffer_size: 48, // one 1 ms USB audio frame
            frequency: 700,
            wpm: 20,
            volume: 100,
            rise_time_ms: 5,
        }
    }
}

impl GeneratorConfig {
    /// Create a configuration for the given audio transport, with validation
    pub fn new(sample_rate: u32, buffer_size: usize) -> Result<Self, ConfigError> {
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sample_rate) {
            return Err(ConfigError::SampleRate);
        }
        if buffer_size == 0 || buffer_size > MAX_BUFFER_SIZE {
            return Err(ConfigError::BufferSize);
        }

        Ok(Self {
            sample_rate,
            buffer_size,
            ..Self::default()
        })
    }

    /// Builder-style frequency override (clamped)
    pub fn with_frequency(mut self, frequency: u16) -> Self {
        self.frequency = Self::clamp_frequency(frequency);
        self
    }

    /// Builder-style speed override (clamped)
    pub fn with_wpm(mut self, wpm: u16) -> Self {
        self.wpm = Self::clamp_wpm(wpm);
        self
    }

    /// Builder-style volume override (clamped)
    pub fn with_volume(mut self, volume: u8) -> Self {
        self.volume = Self::clamp_volume(volume);
        self
    }

    /// Builder-style rise time override (clamped)
    pub fn with_rise_time(mut self, rise_time_ms: u8) -> Self {
        self.rise_time_ms = Self::clamp_rise_time(rise_time_ms);
        self
    }

    pub const fn clamp_frequency(frequency: u16) -> u16 {
        if frequency < MIN_FREQUENCY {
            MIN_FREQUENCY
        } else if frequency > MAX_FREQUENCY {
            MAX_FREQUENCY
        } else {
            frequency
        }
    }

    pub const fn clamp_wpm(wpm: u16) -> u16 {
        if wpm < MIN_WPM {
            MIN_WPM
        } else if wpm > MAX_WPM {
            MAX_WPM
        } else {
            wpm
        }
    }

    pub const fn clamp_volume(volume: u8) -> u8 {
        if volume > MAX_VOLUME {
            MAX_VOLUME
        } else {
            volume
        }
    }

    pub const fn clamp_rise_time(rise_time_ms: u8) -> u8 {
        if rise_time_ms < MIN_RISE_TIME_MS {
            MIN_RISE_TIME_MS
        } else if rise_time_ms > MAX_RISE_TIME_MS {
            MAX_RISE_TIME_MS
        } else {
            rise_time_ms
        }
    }

    /// Force every field into the device range
    ///
    /// Fields are public, so a config built by hand may hold values that
    /// [`GeneratorConfig::new`] would have rejected.
    pub const fn clamped(self) -> Self {
        let sample_rate = if self.sample_rate < MIN_SAMPLE_RATE {
            MIN_SAMPLE_RATE
        } else if self.sample_rate > MAX_SAMPLE_RATE {
            MAX_SAMPLE_RATE
        } else {
            self.sample_rate
        };
        let buffer_size = if self.buffer_size == 0 {
            1
        } else if self.buffer_size > MAX_BUFFER_SIZE {
            MAX_BUFFER_SIZE
        } else {
            self.buffer_size
        };

        Self {
            sample_rate,
            buffer_size,
            frequency: Self::clamp_frequency(self.frequency),
            wpm: Self::clamp_wpm(self.wpm),
            volume: Self::clamp_volume(self.volume),
            rise_time_ms: Self::clamp_rise_time(self.rise_time_ms),
        }
    }

    /// Volume scaled to the i16 amplitude range
    pub const fn amplitude(&self) -> i32 {
        self.volume as i32 * 32767 / 100
    }

    /// Envelope ramp length in samples
    pub const fn rise_samples(&self) -> u32 {
        self.rise_time_ms as u32 * self.sample_rate / 1000
    }
}
