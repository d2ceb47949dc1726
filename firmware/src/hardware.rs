//! CH32V203 Hardware Implementation
//!
//! 64KB Flash / 20KB RAM. Paddles on EXTI lines, RGB status LED, USB FS
//! audio + CDC composite device.

use portable_atomic::{AtomicU32, Ordering};

use audiokeyer_core::types::{IndicatorColor, PaddleSide};
use audiokeyer_core::{HalError, KeyerHal, LatchedPaddle, PaddleInput, StatusIndicator};

/// Debounced paddle contacts, written by the EXTI handlers
pub static PADDLE: PaddleInput = PaddleInput::new();

/// CH32V203 hardware abstraction layer implementation
pub struct FirmwareHal {
    dit: LatchedPaddle<'static>,
    dah: LatchedPaddle<'static>,
    indicator: RgbIndicator,
}

impl FirmwareHal {
    /// Initialize CH32V203 hardware
    pub fn new() -> Self {
        #[cfg(feature = "defmt")]
        defmt::info!("CH32V203 HAL initialized");

        Self {
            dit: PADDLE.side(PaddleSide::Dit),
            dah: PADDLE.side(PaddleSide::Dah),
            indicator: RgbIndicator::new(),
        }
    }
}

impl Default for FirmwareHal {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyerHal for FirmwareHal {
    type DitPaddle = LatchedPaddle<'static>;
    type DahPaddle = LatchedPaddle<'static>;
    type Indicator = RgbIndicator;

    fn dit_paddle(&mut self) -> &mut Self::DitPaddle {
        &mut self.dit
    }

    fn dah_paddle(&mut self) -> &mut Self::DahPaddle {
        &mut self.dah
    }

    fn indicator(&mut self) -> &mut Self::Indicator {
        &mut self.indicator
    }

    fn enter_firmware_update(&mut self) {
        #[cfg(feature = "defmt")]
        defmt::info!("entering bootloader");

        let _ = self.indicator.set_color(IndicatorColor::Off);

        // Audio and serial stop here. The ROM bootloader is reached by
        // power-cycling with BOOT0 held; nothing returns from this call.
        unsafe { riscv::interrupt::disable() };
        loop {
            unsafe { riscv::asm::wfi() };
        }
    }
}

/// WS2812 status LED, refreshed from the main loop
pub struct RgbIndicator {
    rgb: &'static AtomicU32,
}

/// Packed 0xRRGGBB shown on the LED
static INDICATOR_RGB: AtomicU32 = AtomicU32::new(0);

impl RgbIndicator {
    fn new() -> Self {
        Self { rgb: &INDICATOR_RGB }
    }
}

impl StatusIndicator for RgbIndicator {
    type Error = HalError;

    fn set_color(&mut self, color: IndicatorColor) -> Result<(), Self::Error> {
        self.rgb.store(color.rgb(), Ordering::Relaxed);
        Ok(())
    }
}

/// Color the LED driver should currently show
pub fn indicator_rgb() -> u32 {
    INDICATOR_RGB.load(Ordering::Relaxed)
}

// Interrupt handlers (connected to the EXTI vectors by the board runtime)

/// EXTI0 interrupt handler for Dit paddle, both edges, after debouncing.
/// `level_high` is the raw pin level; the paddles are active low.
pub fn handle_dit_interrupt(level_high: bool) {
    PADDLE.update(PaddleSide::Dit, !level_high);
}

/// EXTI1 interrupt handler for Dah paddle
pub fn handle_dah_interrupt(level_high: bool) {
    PADDLE.update(PaddleSide::Dah, !level_high);
}

// Critical section implementation for single-core RISC-V
critical_section::set_impl!(RiscvCriticalSection);

struct RiscvCriticalSection;

unsafe impl critical_section::Impl for RiscvCriticalSection {
    unsafe fn acquire() -> u8 {
        let mut mstatus: usize;
        core::arch::asm!("csrrci {}, mstatus, 8", out(reg) mstatus);
        (mstatus & 8) as u8
    }

    unsafe fn release(was_active: u8) {
        if was_active != 0 {
            core::arch::asm!("csrsi mstatus, 8");
        }
    }
}
