#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that schedules the single-slot furnace.
//!
//! Each invocation looks at the current furnace slot and raw ore stock and
//! emits at most one command: completing a smelt that has run its full
//! duration, or charging the idle slot with the rarest in-stock kind. The
//! next-ore decision is re-evaluated fresh every time from the current
//! inventory; there is no queue.

use orepit_core::{Command, FurnaceView, OreKind, OreStockView};

/// Furnace scheduling system that keeps the slot busy while ore remains.
#[derive(Debug, Default)]
pub struct Smelting;

impl Smelting {
    /// Creates a new smelting system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Consumes immutable views to emit the next furnace command, if any.
    pub fn handle(&mut self, furnace: &FurnaceView, stock: &OreStockView, out: &mut Vec<Command>) {
        if let Some(job) = furnace.job() {
            if job.is_done() {
                out.push(Command::CompleteSmelt);
            }
            return;
        }

        if let Some(kind) = OreKind::SMELT_ORDER
            .iter()
            .copied()
            .find(|kind| stock.count(*kind) > 0)
        {
            out.push(Command::ChargeFurnace { kind });
        }
    }
}
