//! USB audio streaming hooks
//!
//! The USB stack calls these from its interrupt: `on_tx_pre` to fill the
//! isochronous IN packet, `on_tx_post` once it went out, `on_volume` for
//! feature unit requests. The generator lives here behind a critical section
//! so the serial task can change settings between frames.

use core::cell::RefCell;

use critical_section::Mutex;

use audiokeyer_core::AudioSource;

use crate::FirmwareGenerator;

static GENERATOR: Mutex<RefCell<Option<FirmwareGenerator>>> = Mutex::new(RefCell::new(None));

/// Hand the generator to the audio interrupt. Call once before enabling USB.
pub fn install(generator: FirmwareGenerator) {
    critical_section::with(|cs| {
        *GENERATOR.borrow_ref_mut(cs) = Some(generator);
    });
}

/// Run `f` on the generator. `None` before [`install`].
pub fn with_generator<R>(f: impl FnOnce(&mut FirmwareGenerator) -> R) -> Option<R> {
    critical_section::with(|cs| GENERATOR.borrow_ref_mut(cs).as_mut().map(f))
}

/// Before transmission: hand the pending frame to the endpoint writer
pub fn on_tx_pre(write: impl FnOnce(&[i16])) {
    critical_section::with(|cs| {
        if let Some(generator) = GENERATOR.borrow_ref(cs).as_ref() {
            write(generator.next_buffer());
        }
    });
}

/// After transmission: advance the keyer and render the next frame
pub fn on_tx_post() {
    with_generator(|generator| generator.advance());
    crate::on_frame();
}

/// Feature unit volume/mute request
pub fn on_volume(channel: u8, volume: u16, mute: bool) {
    #[cfg(feature = "defmt")]
    defmt::debug!("volume ch{} {} mute {}", channel, volume, mute);
    with_generator(|generator| generator.set_channel_volume(channel, volume, mute));
}
