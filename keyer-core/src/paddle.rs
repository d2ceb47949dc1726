//! Interrupt-safe paddle latch
//!
//! GPIO edge handlers (after debouncing) store the contact state here; the
//! keying FSM reads it through [`LatchedPaddle`] once per audio tick.

use portable_atomic::{AtomicBool, Ordering};

use crate::hal::{HalError, InputPaddle};
use crate::types::PaddleSide;

/// Atomic paddle input state management
/// Safe for use in interrupt contexts
pub struct PaddleInput {
    dit_pressed: AtomicBool,
    dah_pressed: AtomicBool,
}

impl PaddleInput {
    /// Create new paddle input manager
    pub const fn new() -> Self {
        Self {
            dit_pressed: AtomicBool::new(false),
            dah_pressed: AtomicBool::new(false),
        }
    }

    /// Update paddle state (called from interrupt handler)
    pub fn update(&self, side: PaddleSide, pressed: bool) {
        match side {
            PaddleSide::Dit => self.dit_pressed.store(pressed, Ordering::Relaxed),
            PaddleSide::Dah => self.dah_pressed.store(pressed, Ordering::Relaxed),
        }
    }

    pub fn is_pressed(&self, side: PaddleSide) -> bool {
        match side {
            PaddleSide::Dit => self.dit(),
            PaddleSide::Dah => self.dah(),
        }
    }

    /// Check if Dit paddle is pressed
    pub fn dit(&self) -> bool {
        self.dit_pressed.load(Ordering::Relaxed)
    }

    /// Check if Dah paddle is pressed
    pub fn dah(&self) -> bool {
        self.dah_pressed.load(Ordering::Relaxed)
    }

    /// Handle for one side, usable as a HAL paddle
    pub fn side(&self, side: PaddleSide) -> LatchedPaddle<'_> {
        LatchedPaddle { input: self, side }
    }
}

impl Default for PaddleInput {
    fn default() -> Self {
        Self::new()
    }
}

/// One side of a [`PaddleInput`]
#[derive(Clone, Copy)]
pub struct LatchedPaddle<'a> {
    input: &'a PaddleInput,
    side: PaddleSide,
}

impl InputPaddle for LatchedPaddle<'_> {
    type Error = HalError;

    fn is_pressed(&mut self) -> Result<bool, Self::Error> {
        Ok(self.input.is_pressed(self.side))
    }
}
