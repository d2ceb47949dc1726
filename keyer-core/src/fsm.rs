//! Finite State Machine for the paddle keyer
//!
//! Advanced exactly once per audio buffer. Progress is counted in samples so
//! symbol boundaries line up with the synthesizer's tone periods.

use crate::hal::{read_paddle, KeyerHal};
use crate::queue::SymbolConsumer;
use crate::types::{
    IndicatorColor, KeyerState, MorseSymbol, SymbolSource, INTRA_CHAR_PAUSE_UNITS,
};

/// Sample-domain timing derived from the generator configuration
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Timing {
    /// Dit length, a whole number of tone periods
    pub dit_samples: u32,
    /// Power-up settling delay
    pub settle_samples: u32,
    /// Samples rendered per tick
    pub buffer_len: u32,
}

/// Main keyer FSM implementation
#[derive(Debug)]
pub struct KeyerFsm {
    state: KeyerState,
    progress: u32,
    end: u32,
    lookahead: Option<MorseSymbol>,
    source: SymbolSource,
}

impl KeyerFsm {
    /// Create new FSM in the power-up state
    pub const fn new() -> Self {
        Self {
            state: KeyerState::Init,
            progress: 0,
            end: 0,
            lookahead: None,
            source: SymbolSource::Queue,
        }
    }

    /// Get current FSM state
    pub fn current_state(&self) -> KeyerState {
        self.state
    }

    /// Sample position within the active symbol
    pub fn progress(&self) -> u32 {
        self.progress
    }

    /// Position at which the active symbol ends
    pub fn end_index(&self) -> u32 {
        self.end
    }

    /// Symbol queued by the opposite-paddle check during a pause
    pub fn lookahead(&self) -> Option<MorseSymbol> {
        self.lookahead
    }

    /// Origin of the active symbol
    pub fn source(&self) -> SymbolSource {
        self.source
    }

    /// Indicator color for the current state
    pub fn indicator_color(&self) -> IndicatorColor {
        match self.state {
            KeyerState::Dit | KeyerState::Dah | KeyerState::DitPause | KeyerState::DahPause => {
                self.source.into()
            }
            KeyerState::Init | KeyerState::InitPause | KeyerState::Idle => IndicatorColor::Off,
        }
    }

    /// Run one tick of state transitions. Returns true when the state changed.
    ///
    /// Call [`KeyerFsm::finish_tick`] once the buffer for this tick is rendered.
    pub fn update<H: KeyerHal, const N: usize>(
        &mut self,
        timing: &Timing,
        hal: &mut H,
        queue: &mut SymbolConsumer<'_, N>,
    ) -> bool {
        let previous = self.state;

        match self.state {
            KeyerState::Init => {
                self.progress = 0;
                // Ignore a key press that started before power-up settled
                self.end = timing.settle_samples;
                self.state = KeyerState::InitPause;
            }
            KeyerState::Idle => {
                self.progress = 0;
                self.handle_idle_state(timing, hal, queue);
            }
            _ if self.progress > self.end => {
                self.progress = 0;
                self.handle_symbol_end(timing, hal, queue);
            }
            KeyerState::DitPause => {
                if read_paddle(hal.dah_paddle()) {
                    self.lookahead = Some(MorseSymbol::Dah);
                }
            }
            KeyerState::DahPause => {
                if read_paddle(hal.dit_paddle()) {
                    self.lookahead = Some(MorseSymbol::Dit);
                }
            }
            KeyerState::InitPause | KeyerState::Dit | KeyerState::Dah => {}
        }

        let changed = self.state != previous;
        #[cfg(feature = "defmt")]
        if changed {
            defmt::trace!("FSM State: {:?} -> {:?}", previous, self.state);
        }
        changed
    }

    /// Account for the buffer rendered this tick
    pub fn finish_tick(&mut self, buffer_len: u32) {
        self.progress = self.progress.saturating_add(buffer_len);
    }

    /// Handle Idle state: lookahead, Dit paddle, Dah paddle, queue, in that order
    fn handle_idle_state<H: KeyerHal, const N: usize>(
        &mut self,
        timing: &Timing,
        hal: &mut H,
        queue: &mut SymbolConsumer<'_, N>,
    ) {
        if let Some(symbol) = self.lookahead.take() {
            self.start_paddle_symbol(symbol, timing, queue);
        } else if read_paddle(hal.dit_paddle()) {
            self.start_paddle_symbol(MorseSymbol::Dit, timing, queue);
        } else if read_paddle(hal.dah_paddle()) {
            self.start_paddle_symbol(MorseSymbol::Dah, timing, queue);
        } else if let Some(symbol) = queue.pop() {
            self.source = SymbolSource::Queue;
            self.start_symbol(symbol, timing);
        }
    }

    /// Handle the end of a symbol or pause window
    fn handle_symbol_end<H: KeyerHal, const N: usize>(
        &mut self,
        timing: &Timing,
        hal: &mut H,
        queue: &mut SymbolConsumer<'_, N>,
    ) {
        match self.state {
            KeyerState::Dit => self.enter_pause(KeyerState::DitPause, timing),
            KeyerState::Dah => self.enter_pause(KeyerState::DahPause, timing),
            KeyerState::DitPause => {
                if read_paddle(hal.dah_paddle()) {
                    self.lookahead = None;
                    self.start_paddle_symbol(MorseSymbol::Dah, timing, queue);
                } else {
                    self.state = KeyerState::Idle;
                }
            }
            KeyerState::DahPause => {
                if read_paddle(hal.dit_paddle()) {
                    self.lookahead = None;
                    self.start_paddle_symbol(MorseSymbol::Dit, timing, queue);
                } else {
                    self.state = KeyerState::Idle;
                }
            }
            KeyerState::InitPause => self.state = KeyerState::Idle,
            KeyerState::Init | KeyerState::Idle => {}
        }
    }

    /// Manual keying pre-empts everything the host queued
    fn start_paddle_symbol<const N: usize>(
        &mut self,
        symbol: MorseSymbol,
        timing: &Timing,
        queue: &mut SymbolConsumer<'_, N>,
    ) {
        let _dropped = queue.clear();
        #[cfg(feature = "defmt")]
        if _dropped > 0 {
            defmt::debug!("paddle pre-empted {} queued symbols", _dropped);
        }
        self.source = SymbolSource::Paddle;
        self.start_symbol(symbol, timing);
    }

    fn start_symbol(&mut self, symbol: MorseSymbol, timing: &Timing) {
        match symbol {
            MorseSymbol::Dit => {
                self.state = KeyerState::Dit;
                self.end = timing.dit_samples * symbol.duration_units();
            }
            MorseSymbol::Dah => {
                self.state = KeyerState::Dah;
                self.end = timing.dit_samples * symbol.duration_units();
            }
            // A queued pause is a silent unit in the Dah pause slot
            MorseSymbol::Pause => self.enter_pause(KeyerState::DahPause, timing),
        }
    }

    fn enter_pause(&mut self, pause: KeyerState, timing: &Timing) {
        self.state = pause;
        self.end = timing.dit_samples * INTRA_CHAR_PAUSE_UNITS;
    }

    /// Reset FSM to the power-up state
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for KeyerFsm {
    fn default() -> Self {
        Self::new()
    }
}
