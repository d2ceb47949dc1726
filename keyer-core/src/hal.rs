//! Hardware Abstraction Layer for keyer implementation

use embedded_hal::digital::InputPin;
use crate::types::IndicatorColor;

/// Error types for HAL operations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// GPIO operation failed
    GpioError,
}

#[cfg(feature = "std")]
impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HalError::GpioError => write!(f, "GPIO operation failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

/// Trait for paddle input handling. Debouncing happens below this seam.
pub trait InputPaddle {
    type Error: From<HalError>;

    /// Check if paddle is currently pressed
    fn is_pressed(&mut self) -> Result<bool, Self::Error>;
}

/// Trait for the RGB indicator light
pub trait StatusIndicator {
    type Error: From<HalError>;

    /// Show the given status color
    fn set_color(&mut self, color: IndicatorColor) -> Result<(), Self::Error>;
}

/// Complete keyer HAL interface consumed by the generator
pub trait KeyerHal {
    type DitPaddle: InputPaddle;
    type DahPaddle: InputPaddle;
    type Indicator: StatusIndicator;

    /// Access to Dit paddle
    fn dit_paddle(&mut self) -> &mut Self::DitPaddle;

    /// Access to Dah paddle
    fn dah_paddle(&mut self) -> &mut Self::DahPaddle;

    /// Access to indicator light
    fn indicator(&mut self) -> &mut Self::Indicator;

    /// Hand control to the bootloader. Does not return on hardware.
    fn enter_firmware_update(&mut self);
}

/// Read a paddle, treating a failed read as released
pub(crate) fn read_paddle<P: InputPaddle>(paddle: &mut P) -> bool {
    match paddle.is_pressed() {
        Ok(pressed) => pressed,
        Err(_) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("paddle read failed");
            false
        }
    }
}

/// Generic implementation for embedded-hal compatible pins
pub struct EmbeddedHalPaddle<P> {
    pin: P,
}

impl<P> EmbeddedHalPaddle<P>
where
    P: InputPin,
{
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Give back the wrapped pin
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P> InputPaddle for EmbeddedHalPaddle<P>
where
    P: InputPin,
{
    type Error = HalError;

    fn is_pressed(&mut self) -> Result<bool, Self::Error> {
        // Active low (pulled up, grounded when pressed)
        self.pin.is_low().map_err(|_| HalError::GpioError)
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Mock implementations for testing

    use super::*;

    #[derive(Default, Debug)]
    pub struct MockPaddle {
        pressed: bool,
        fail: bool,
        reads: u32,
    }

    impl MockPaddle {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_pressed(&mut self, pressed: bool) {
            self.pressed = pressed;
        }

        /// Make subsequent reads fail
        pub fn set_failing(&mut self, fail: bool) {
            self.fail = fail;
        }

        pub fn reads(&self) -> u32 {
            self.reads
        }
    }

    impl InputPaddle for MockPaddle {
        type Error = HalError;

        fn is_pressed(&mut self) -> Result<bool, Self::Error> {
            self.reads += 1;
            if self.fail {
                return Err(HalError::GpioError);
            }
            Ok(self.pressed)
        }
    }

    #[derive(Debug)]
    pub struct MockIndicator {
        color: IndicatorColor,
        updates: u32,
    }

    impl MockIndicator {
        pub fn new() -> Self {
            Self {
                color: IndicatorColor::Off,
                updates: 0,
            }
        }

        pub fn color(&self) -> IndicatorColor {
            self.color
        }

        pub fn updates(&self) -> u32 {
            self.updates
        }
    }

    impl Default for MockIndicator {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StatusIndicator for MockIndicator {
        type Error = HalError;

        fn set_color(&mut self, color: IndicatorColor) -> Result<(), Self::Error> {
            self.color = color;
            self.updates += 1;
            Ok(())
        }
    }

    /// Mock hardware collection
    #[derive(Default, Debug)]
    pub struct MockHal {
        pub dit: MockPaddle,
        pub dah: MockPaddle,
        pub indicator: MockIndicator,
        pub firmware_update_requested: bool,
    }

    impl MockHal {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl KeyerHal for MockHal {
        type DitPaddle = MockPaddle;
        type DahPaddle = MockPaddle;
        type Indicator = MockIndicator;

        fn dit_paddle(&mut self) -> &mut MockPaddle {
            &mut self.dit
        }

        fn dah_paddle(&mut self) -> &mut MockPaddle {
            &mut self.dah
        }

        fn indicator(&mut self) -> &mut MockIndicator {
            &mut self.indicator
        }

        fn enter_firmware_update(&mut self) {
            self.firmware_update_requested = true;
        }
    }
}
