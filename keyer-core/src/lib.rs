#![cfg_attr(not(feature = "std"), no_std)]

//! # Keyer Core
//!
//! Paddle keyer with PCM sidetone for USB audio devices.
//! Iambic keying FSM, tone/envelope synthesis, transmission queue and a
//! WinKeyer compatible host protocol, all allocation free.

pub mod types;
pub mod tables;
pub mod queue;
pub mod fsm;
pub mod synth;
pub mod morse;
pub mod protocol;
pub mod hal;
pub mod paddle;

#[cfg(feature = "test-utils")]
pub mod test_utils;


pub use types::*;
pub use fsm::{KeyerFsm, Timing};
pub use queue::{QueueFull, SymbolConsumer, SymbolProducer, TransmissionQueue};
pub use synth::{AudioSource, CwGenerator};
pub use protocol::{KeyerControl, KeyerPort, ProtocolVersion, WinkeyDecoder};
pub use hal::{EmbeddedHalPaddle, HalError, InputPaddle, KeyerHal, StatusIndicator};
pub use paddle::{LatchedPaddle, PaddleInput};

/// Keyer library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration: 48 kHz full-speed USB audio, 1 ms frames
pub fn default_config() -> GeneratorConfig {
    GeneratorConfig::default()
}
