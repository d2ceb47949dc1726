//! Transmission queue between the protocol decoder and the keying FSM
//!
//! A single-producer single-consumer ring. The decoder side blocks when the
//! ring is full; the FSM side never blocks.

use heapless::spsc::{Consumer, Producer, Queue};

use crate::types::{MorseSymbol, INTER_CHAR_PAUSE_UNITS};

/// Longest pattern accepted by [`SymbolProducer::enqueue_text_symbols`]
pub const MAX_PATTERN_LEN: usize = 10;

/// Worst case number of symbols one pattern expands to
pub const MAX_SYMBOLS_PER_PATTERN: usize = MAX_PATTERN_LEN + INTER_CHAR_PAUSE_UNITS as usize - 1;

/// Returned by the non-blocking enqueue when the ring is full
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QueueFull;

#[cfg(feature = "std")]
impl core::fmt::Display for QueueFull {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "transmission queue full")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for QueueFull {}

/// Bounded FIFO of morse symbols. Holds `N - 1` symbols.
pub struct TransmissionQueue<const N: usize> {
    inner: Queue<MorseSymbol, N>,
}

impl<const N: usize> TransmissionQueue<N> {
    pub const fn new() -> Self {
        Self { inner: Queue::new() }
    }

    /// Split into the decoder-side and FSM-side handles
    pub fn split(&mut self) -> (SymbolProducer<'_, N>, SymbolConsumer<'_, N>) {
        let (producer, consumer) = self.inner.split();
        (SymbolProducer { inner: producer }, SymbolConsumer { inner: consumer })
    }
}

impl<const N: usize> Default for TransmissionQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Decoder-side handle
pub struct SymbolProducer<'q, const N: usize> {
    inner: Producer<'q, MorseSymbol, N>,
}

impl<'q, const N: usize> SymbolProducer<'q, N> {
    /// Append one symbol, spinning until the consumer frees a slot
    ///
    /// There is no timeout: a consumer that never drains stalls the caller.
    pub fn enqueue_symbol(&mut self, symbol: MorseSymbol) {
        let mut pending = symbol;
        while let Err(rejected) = self.inner.enqueue(pending) {
            pending = rejected;
            core::hint::spin_loop();
        }
    }

    /// Append one symbol or report that the ring is full
    pub fn try_enqueue_symbol(&mut self, symbol: MorseSymbol) -> Result<(), QueueFull> {
        self.inner.enqueue(symbol).map_err(|_| QueueFull)
    }

    /// Append the symbols of a `.`/`-` pattern followed by the inter-character gap
    ///
    /// Only the first [`MAX_PATTERN_LEN`] characters are used. The last
    /// symbol's own pause already covers one unit of the gap.
    pub fn enqueue_text_symbols(&mut self, pattern: &str) {
        for &c in pattern.as_bytes().iter().take(MAX_PATTERN_LEN) {
            self.enqueue_symbol(MorseSymbol::from_pattern_char(c));
        }
        for _ in 0..INTER_CHAR_PAUSE_UNITS - 1 {
            self.enqueue_symbol(MorseSymbol::Pause);
        }
    }

    /// Number of symbols that fit without blocking
    pub fn free_slots(&self) -> usize {
        self.inner.capacity() - self.inner.len()
    }
}

/// FSM-side handle
pub struct SymbolConsumer<'q, const N: usize> {
    inner: Consumer<'q, MorseSymbol, N>,
}

impl<'q, const N: usize> SymbolConsumer<'q, N> {
    /// Take the next symbol if one is waiting
    pub fn pop(&mut self) -> Option<MorseSymbol> {
        self.inner.dequeue()
    }

    /// Drop everything queued
    pub fn clear(&mut self) -> usize {
        let mut dropped = 0;
        while self.inner.dequeue().is_some() {
            dropped += 1;
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.len() == 0
    }
}
