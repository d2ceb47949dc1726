//! WinKeyer serial protocol decoder
//!
//! Streaming scanner over whatever bytes one serial read delivered. There is
//! no buffering across reads: a command split over two reads is dropped.
//! Replies are written over the front of the same buffer, behind the scan
//! position, and the decoder returns how many reply bytes to send back.

use crate::hal::KeyerHal;
use crate::morse;
use crate::queue::SymbolProducer;
use crate::synth::CwGenerator;

/// Firmware revision reported to the host (31.03)
pub const FW_MAJOR_REV: u8 = 31;
pub const FW_MINOR_REV: u8 = 3;
/// Read Back Vcc answer: 26214 / 52 ~ 5.0 V
pub const VCC_REPORT: u8 = 52;
/// Get IC Type answer (SMT part)
pub const IC_TYPE: u8 = 0x01;
/// WinKeyer3 status byte with no flags set
pub const STATUS_IDLE: u8 = 0xC0;

/// Sidetone frequencies for the WK1/WK2 index form of command 0x01
pub const WK12_FREQUENCY_TABLE: [u16; 11] = [0, 4000, 2000, 1333, 1000, 800, 666, 571, 500, 444, 400];

/// Divisor for the WK3 form of command 0x01
const WK3_FREQUENCY_DIVIDEND: u16 = 62_500;

/// Emulated protocol generation
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolVersion {
    Wk1 = 1,
    Wk2 = 2,
    Wk3 = 3,
}

/// Keyer operations the decoder may invoke
///
/// Implemented by whatever owns the generator and the queue producer; the
/// decoder never holds on to it between reads.
pub trait KeyerControl {
    /// Sidetone frequency in Hz (clamped by the implementor)
    fn set_frequency(&mut self, frequency: u16);

    /// Keying speed in WPM (clamped by the implementor)
    fn set_wpm(&mut self, wpm: u16);

    fn wpm(&self) -> u16;

    /// Envelope rise time in ms (clamped by the implementor)
    fn set_rise_time(&mut self, rise_time_ms: u8);

    /// Queue a `.`/`-` pattern; may block while the queue is full
    fn send_pattern(&mut self, pattern: &str);

    /// Hand over to the bootloader
    fn enter_firmware_update(&mut self);
}

/// What an admin sub-command does once its bytes are available
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum AdminAction {
    Ignore,
    HostOpen,
    Echo,
    Reply(u8),
    SetVersion(ProtocolVersion),
    /// Mid-stream volume changes disturb the host's audio, so this is a no-op
    SidetoneVolume,
    RiseTime,
    FrequencyTens,
    FirmwareUpdate,
}

#[derive(Copy, Clone, Debug)]
struct AdminCommand {
    /// Command length including the leading 0x00
    size: usize,
    action: AdminAction,
}

const fn admin(size: usize, action: AdminAction) -> AdminCommand {
    AdminCommand { size, action }
}

/// Admin sub-commands indexed by id
const ADMIN_COMMANDS: [AdminCommand; 29] = [
    admin(3, AdminAction::Ignore),                                 // 0: Calibrate
    admin(2, AdminAction::Ignore),                                 // 1: Reset
    admin(2, AdminAction::HostOpen),                               // 2: Host Open
    admin(2, AdminAction::Ignore),                                 // 3: Host Close
    admin(3, AdminAction::Echo),                                   // 4: Echo Test
    admin(2, AdminAction::Reply(0)),                               // 5: Paddle A2D
    admin(2, AdminAction::Reply(0)),                               // 6: Speed A2D
    admin(2, AdminAction::Reply(0)),                               // 7: Get Values
    admin(2, AdminAction::Ignore),                                 // 8: Reserved
    admin(2, AdminAction::Reply(FW_MAJOR_REV)),                    // 9: Get FW Major Rev
    admin(2, AdminAction::SetVersion(ProtocolVersion::Wk1)),       // 10: Set WK1 Mode
    admin(2, AdminAction::SetVersion(ProtocolVersion::Wk2)),       // 11: Set WK2 Mode
    admin(2, AdminAction::Ignore),                                 // 12: Dump EEPROM
    admin(2, AdminAction::Ignore),                                 // 13: Load EEPROM
    admin(3, AdminAction::Ignore),                                 // 14: Send Message
    admin(3, AdminAction::Ignore),                                 // 15: Load X1MODE
    admin(2, AdminAction::Ignore),                                 // 16: Firmware Update
    admin(2, AdminAction::Ignore),                                 // 17: Set Low Baud
    admin(2, AdminAction::Ignore),                                 // 18: Set High Baud
    admin(4, AdminAction::Ignore),                                 // 19: Set RTTY Registers
    admin(2, AdminAction::SetVersion(ProtocolVersion::Wk3)),       // 20: Set WK3 Mode
    admin(2, AdminAction::Reply(VCC_REPORT)),                      // 21: Read Back Vcc
    admin(3, AdminAction::Ignore),                                 // 22: Load X2MODE
    admin(2, AdminAction::Reply(FW_MINOR_REV)),                    // 23: Get FW Minor Rev
    admin(2, AdminAction::Reply(IC_TYPE)),                         // 24: Get IC Type
    admin(3, AdminAction::SidetoneVolume),                         // 25: Set Sidetone Volume
    admin(3, AdminAction::RiseTime),                               // 26: Set Envelope Rise Time
    admin(3, AdminAction::FrequencyTens),                          // 27: Set Frequency / 10
    admin(2, AdminAction::FirmwareUpdate),                         // 28: Enter Bootloader
];

/// Outcome of decoding one command
enum Step {
    /// Bytes consumed, keep scanning
    Consumed(usize),
    /// Scan ends here with this many reply bytes at the front of the buffer
    Done(usize),
}

/// WinKeyer protocol session
#[derive(Debug)]
pub struct WinkeyDecoder {
    version: ProtocolVersion,
}

impl WinkeyDecoder {
    pub const fn new() -> Self {
        Self {
            version: ProtocolVersion::Wk3,
        }
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Decode one serial read in place. Returns the number of reply bytes now
    /// at the front of `message`.
    ///
    /// Text and settings commands are applied in order. An admin command, a
    /// query or a truncated command ends the read; later bytes are dropped.
    pub fn parse<C: KeyerControl + ?Sized>(&mut self, message: &mut [u8], control: &mut C) -> usize {
        let mut at = 0;

        while at < message.len() {
            let byte = message[at].to_ascii_uppercase();
            message[at] = byte;

            let step = if let Some(pattern) = morse::pattern_for(byte) {
                if !pattern.is_empty() {
                    control.send_pattern(pattern);
                }
                Step::Consumed(1)
            } else {
                self.command(message, at, control)
            };

            match step {
                Step::Consumed(n) => at += n,
                Step::Done(reply) => return reply,
            }
        }

        0
    }

    fn command<C: KeyerControl + ?Sized>(&mut self, message: &mut [u8], at: usize, control: &mut C) -> Step {
        let param = message.get(at + 1).copied();

        match message[at] {
            0x00 => self.admin_command(message, at, control),
            0x01 => {
                let Some(value) = param else {
                    return Step::Done(0);
                };
                if let Some(frequency) = self.sidetone_frequency(value) {
                    control.set_frequency(frequency);
                }
                Step::Consumed(2)
            }
            0x02 => {
                let Some(wpm) = param else {
                    return Step::Done(0);
                };
                if (5..=99).contains(&wpm) {
                    control.set_wpm(wpm as u16);
                }
                Step::Consumed(2)
            }
            0x07 => reply(message, &[(control.wpm() as u8 & 0x3F) | 0x80]),
            0x0E => {
                self.set_version(ProtocolVersion::Wk3);
                Step::Consumed(1)
            }
            0x15 => reply(message, &[STATUS_IDLE]),
            // Remaining control bytes belong to buffered-command features
            _ => Step::Consumed(1),
        }
    }

    fn admin_command<C: KeyerControl + ?Sized>(&mut self, message: &mut [u8], at: usize, control: &mut C) -> Step {
        let available = message.len() - at;
        if available < 2 {
            return Step::Done(0);
        }

        let Some(command) = ADMIN_COMMANDS.get(message[at + 1] as usize).copied() else {
            return Step::Done(0);
        };
        if available < command.size {
            return Step::Done(0);
        }
        let param = message.get(at + 2).copied().unwrap_or(0);

        match command.action {
            AdminAction::Ignore | AdminAction::SidetoneVolume => {}
            AdminAction::HostOpen => {
                self.set_version(ProtocolVersion::Wk1);
                return reply(message, &[FW_MAJOR_REV, FW_MINOR_REV]);
            }
            AdminAction::Echo => return reply(message, &[param]),
            AdminAction::Reply(value) => return reply(message, &[value]),
            AdminAction::SetVersion(version) => self.set_version(version),
            AdminAction::RiseTime => control.set_rise_time(param),
            AdminAction::FrequencyTens => control.set_frequency(param as u16 * 10),
            AdminAction::FirmwareUpdate => {
                #[cfg(feature = "defmt")]
                defmt::info!("host requested firmware update");
                control.enter_firmware_update();
            }
        }

        Step::Done(0)
    }

    /// Frequency for command 0x01, `None` when the value is out of range
    fn sidetone_frequency(&self, value: u8) -> Option<u16> {
        match self.version {
            ProtocolVersion::Wk1 | ProtocolVersion::Wk2 if (1..=10).contains(&value) => {
                Some(WK12_FREQUENCY_TABLE[value as usize])
            }
            ProtocolVersion::Wk3 if (15..=125).contains(&value) => {
                Some(WK3_FREQUENCY_DIVIDEND / value as u16)
            }
            _ => None,
        }
    }

    fn set_version(&mut self, version: ProtocolVersion) {
        #[cfg(feature = "defmt")]
        if version != self.version {
            defmt::info!("protocol version {:?}", version);
        }
        self.version = version;
    }
}

impl Default for WinkeyDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Write the reply at the front of the buffer and end the scan
///
/// Every replying command is at least as long as its reply, so the bytes
/// overwritten have already been read.
fn reply(message: &mut [u8], bytes: &[u8]) -> Step {
    message[..bytes.len()].copy_from_slice(bytes);
    Step::Done(bytes.len())
}

/// Single-context adapter: drives a generator and its queue producer directly
pub struct KeyerPort<'a, 'q, H: KeyerHal, const N: usize> {
    generator: &'a mut CwGenerator<'q, H, N>,
    producer: &'a mut SymbolProducer<'q, N>,
}

impl<'a, 'q, H: KeyerHal, const N: usize> KeyerPort<'a, 'q, H, N> {
    pub fn new(generator: &'a mut CwGenerator<'q, H, N>, producer: &'a mut SymbolProducer<'q, N>) -> Self {
        Self { generator, producer }
    }
}

impl<H: KeyerHal, const N: usize> KeyerControl for KeyerPort<'_, '_, H, N> {
    fn set_frequency(&mut self, frequency: u16) {
        self.generator.set_frequency(frequency);
    }

    fn set_wpm(&mut self, wpm: u16) {
        self.generator.set_wpm(wpm);
    }

    fn wpm(&self) -> u16 {
        self.generator.wpm()
    }

    fn set_rise_time(&mut self, rise_time_ms: u8) {
        self.generator.set_rise_time(rise_time_ms);
    }

    fn send_pattern(&mut self, pattern: &str) {
        self.producer.enqueue_text_symbols(pattern);
    }

    fn enter_firmware_update(&mut self) {
        self.generator.hal_mut().enter_firmware_update();
    }
}
