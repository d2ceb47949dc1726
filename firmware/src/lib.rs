#![no_std]

//! Firmware library: board support, USB audio hooks and the serial task

pub use embassy_executor::Spawner;
pub use static_cell::StaticCell;

pub use audiokeyer_core::*;

pub use crate::hardware::*;

/// Transmission queue slots. Holds the worst case of one full serial packet
/// of text (every byte expanding to a maximal pattern).
pub const QUEUE_SIZE: usize = 1024;

/// Generator type running on this board
pub type FirmwareGenerator = CwGenerator<'static, FirmwareHal, QUEUE_SIZE>;

// CH32V203 board support
pub mod hardware;

// USB audio streaming hooks
pub mod usb_audio;

// WinKeyer serial port over CDC ACM
pub mod serial;

// Frame-clocked time driver for embassy
mod time_driver;

pub use time_driver::on_frame;
