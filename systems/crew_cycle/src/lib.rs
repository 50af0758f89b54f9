#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that drives the shared crew work/rest cycle.
//!
//! The whole crew shares one two-phase timer. Once the elapsed time in the
//! current phase reaches that phase's duration the system requests a flip;
//! the world re-validates the timing before honouring it, so a stale
//! request is harmless.

use orepit_core::{Command, CycleView};

/// Cycle system that flips the crew between working and resting.
#[derive(Debug, Default)]
pub struct CrewCycle;

impl CrewCycle {
    /// Creates a new crew cycle system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Consumes the cycle view to emit a phase flip when one is due.
    pub fn handle(&mut self, cycle: &CycleView, out: &mut Vec<Command>) {
        if cycle.elapsed >= cycle.current_duration() {
            out.push(Command::FlipCrewPhase);
        }
    }
}
