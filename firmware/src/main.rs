#![no_std]
#![no_main]

#[cfg(feature = "defmt")]
use defmt_rtt as _;

// RISC-V runtime
use riscv_rt as _;

// Panic handler
use panic_halt as _;

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use static_cell::StaticCell;

use audiokeyer_firmware::serial::serial_task;
use audiokeyer_firmware::*;

// Static resources
static KEY_QUEUE: StaticCell<TransmissionQueue<QUEUE_SIZE>> = StaticCell::new();

/// Main firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    #[cfg(feature = "defmt")]
    defmt::info!("Audio Keyer Firmware Starting...");

    let hal = FirmwareHal::new();

    let config = default_config();
    #[cfg(feature = "defmt")]
    defmt::info!("Keyer config: {} Hz, {} WPM, {} samples/frame", config.frequency, config.wpm, config.buffer_size);

    let queue = KEY_QUEUE.init(TransmissionQueue::new());
    let (producer, consumer) = queue.split();

    // The audio interrupt starts driving the keyer once USB streams
    usb_audio::install(CwGenerator::new(config, hal, consumer));

    spawner.must_spawn(serial_task(producer));

    #[cfg(feature = "defmt")]
    defmt::info!("Keyer firmware ready!");

    // Main supervision loop; time only advances while audio streams
    loop {
        Timer::after(Duration::from_secs(1)).await;
        #[cfg(feature = "defmt")]
        defmt::trace!(
            "Heartbeat, queue {}, led {=u32:#x}",
            usb_audio::with_generator(|g| g.queued()).unwrap_or(0),
            indicator_rgb()
        );
    }
}
