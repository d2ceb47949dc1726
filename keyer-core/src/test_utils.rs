//! Test utilities for keyer core functionality

pub mod paddle_script {
    //! Scripted paddle input, indexed by audio tick

    use crate::hal::mock::MockHal;
    use crate::types::PaddleSide;

    /// Paddle contact change at a given tick
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PaddleEvent {
        pub tick: u32,
        pub side: PaddleSide,
        pub pressed: bool,
    }

    /// Ordered list of paddle events
    #[derive(Debug, Clone, Default)]
    pub struct PaddleScript {
        events: Vec<PaddleEvent>,
    }

    impl PaddleScript {
        pub fn new() -> Self {
            Self::default()
        }

        /// Press `side` at `from` and release it at `to`
        pub fn hold(mut self, side: PaddleSide, from: u32, to: u32) -> Self {
            self.push(PaddleEvent { tick: from, side, pressed: true });
            self.push(PaddleEvent { tick: to, side, pressed: false });
            self
        }

        /// Squeeze both paddles, dit first
        pub fn squeeze(self, from: u32, to: u32) -> Self {
            self.hold(PaddleSide::Dit, from, to).hold(PaddleSide::Dah, from, to)
        }

        fn push(&mut self, event: PaddleEvent) {
            let at = self.events.partition_point(|e| e.tick <= event.tick);
            self.events.insert(at, event);
        }

        pub fn events(&self) -> &[PaddleEvent] {
            &self.events
        }

        /// Tick of the last event
        pub fn last_tick(&self) -> u32 {
            self.events.last().map_or(0, |e| e.tick)
        }

        /// Apply every event scheduled for `tick`
        pub fn apply(&self, tick: u32, hal: &mut MockHal) {
            for event in self.events.iter().filter(|e| e.tick == tick) {
                match event.side {
                    PaddleSide::Dit => hal.dit.set_pressed(event.pressed),
                    PaddleSide::Dah => hal.dah.set_pressed(event.pressed),
                }
            }
        }
    }
}

pub mod state_trace {
    //! Run-length record of generator states and indicator colors

    use crate::types::{IndicatorColor, KeyerState};

    /// Contiguous run of one state
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Segment {
        pub state: KeyerState,
        pub color: IndicatorColor,
        pub ticks: u32,
    }

    #[derive(Debug, Clone, Default)]
    pub struct StateTrace {
        segments: Vec<Segment>,
    }

    impl StateTrace {
        pub fn new() -> Self {
            Self::default()
        }

        /// Record the state seen after one tick
        pub fn record(&mut self, state: KeyerState, color: IndicatorColor) {
            match self.segments.last_mut() {
                Some(last) if last.state == state && last.color == color => last.ticks += 1,
                _ => self.segments.push(Segment { state, color, ticks: 1 }),
            }
        }

        pub fn segments(&self) -> &[Segment] {
            &self.segments
        }

        /// Keyed symbols as a `.`/`-` string
        pub fn symbols(&self) -> String {
            self.segments
                .iter()
                .filter_map(|s| match s.state {
                    KeyerState::Dit => Some('.'),
                    KeyerState::Dah => Some('-'),
                    _ => None,
                })
                .collect()
        }

        /// Colors shown while keyed, one per keyed segment
        pub fn keyed_colors(&self) -> Vec<IndicatorColor> {
            self.segments
                .iter()
                .filter(|s| s.state.is_keyed())
                .map(|s| s.color)
                .collect()
        }

        /// Tick lengths of every segment in `state`
        pub fn durations(&self, state: KeyerState) -> Vec<u32> {
            self.segments
                .iter()
                .filter(|s| s.state == state)
                .map(|s| s.ticks)
                .collect()
        }

        pub fn clear(&mut self) {
            self.segments.clear();
        }
    }
}

pub mod harness {
    //! Drive a mock-backed generator tick by tick

    use super::paddle_script::PaddleScript;
    use super::state_trace::StateTrace;
    use crate::hal::mock::MockHal;
    use crate::synth::{AudioSource, CwGenerator};
    use crate::types::KeyerState;

    /// Upper bound on ticks spent waiting for power-up settling
    pub const SETTLE_LIMIT: u32 = 10_000;

    /// Advance until the generator reaches Idle. Returns ticks taken.
    pub fn settle<const N: usize>(generator: &mut CwGenerator<'_, MockHal, N>) -> u32 {
        let mut ticks = 0;
        while generator.state() != KeyerState::Idle {
            assert!(ticks < SETTLE_LIMIT, "generator never settled");
            generator.advance();
            ticks += 1;
        }
        ticks
    }

    /// Run `ticks` ticks with scripted paddles, recording every state
    pub fn run_script<const N: usize>(
        generator: &mut CwGenerator<'_, MockHal, N>,
        script: &PaddleScript,
        ticks: u32,
    ) -> StateTrace {
        let mut trace = StateTrace::new();
        for tick in 0..ticks {
            script.apply(tick, generator.hal_mut());
            generator.advance();
            trace.record(generator.state(), generator.hal().indicator.color());
        }
        trace
    }

    /// Run until the generator has been Idle for `quiet` consecutive ticks
    pub fn run_until_quiet<const N: usize>(
        generator: &mut CwGenerator<'_, MockHal, N>,
        quiet: u32,
        limit: u32,
    ) -> StateTrace {
        let mut trace = StateTrace::new();
        let mut idle = 0;
        for _ in 0..limit {
            generator.advance();
            trace.record(generator.state(), generator.hal().indicator.color());
            if generator.state() == KeyerState::Idle {
                idle += 1;
                if idle >= quiet {
                    break;
                }
            } else {
                idle = 0;
            }
        }
        trace
    }
}
