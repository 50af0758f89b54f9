#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits passive mining commands for ready workers.
//!
//! Workers mine only while the shared cycle is in its work phase and only
//! once their individual cooldown has expired. The batch is truncated to
//! the free storage capacity observed when the system ran; the world still
//! re-validates capacity per command, so the cap holds even when other
//! deposits land in between.

use orepit_core::{Command, CrewCooldownView, CrewPhase};

/// Crew mining system that queues mining commands for ready workers.
#[derive(Debug, Default)]
pub struct CrewMining {
    scratch: Vec<Command>,
}

impl CrewMining {
    /// Creates a new crew mining system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::CrewMine` entries for workers ready to mine.
    pub fn handle(
        &mut self,
        phase: CrewPhase,
        cooldowns: CrewCooldownView,
        free_capacity: u32,
        out: &mut Vec<Command>,
    ) {
        if phase != CrewPhase::Working {
            return;
        }

        if free_capacity == 0 {
            return;
        }

        let snapshots = cooldowns.into_vec();
        if snapshots.is_empty() {
            return;
        }

        self.scratch.clear();

        for snapshot in &snapshots {
            if self.scratch.len() as u32 >= free_capacity {
                break;
            }
            if snapshot.ready_in.is_zero() {
                self.scratch.push(Command::CrewMine {
                    worker: snapshot.worker,
                });
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orepit_core::{CrewCooldownSnapshot, WorkerId};
    use std::time::Duration;

    fn snapshot(worker: u32, ready_in: Duration) -> CrewCooldownSnapshot {
        CrewCooldownSnapshot {
            worker: WorkerId::new(worker),
            ready_in,
        }
    }

    #[test]
    fn resting_crews_are_silent() {
        let mut system = CrewMining::new();
        let cooldowns = CrewCooldownView::from_snapshots(vec![snapshot(1, Duration::ZERO)]);
        let mut out = Vec::new();

        system.handle(CrewPhase::Resting, cooldowns, 10, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn mining_respects_cooldown_readiness() {
        let mut system = CrewMining::new();
        let cooldowns = CrewCooldownView::from_snapshots(vec![
            snapshot(2, Duration::ZERO),
            snapshot(5, Duration::from_millis(250)),
            snapshot(7, Duration::ZERO),
        ]);
        let mut out = Vec::new();

        system.handle(CrewPhase::Working, cooldowns, 10, &mut out);

        assert_eq!(
            out,
            vec![
                Command::CrewMine {
                    worker: WorkerId::new(2),
                },
                Command::CrewMine {
                    worker: WorkerId::new(7),
                },
            ],
        );
    }

    #[test]
    fn batches_truncate_to_the_observed_capacity() {
        let mut system = CrewMining::new();
        let cooldowns = CrewCooldownView::from_snapshots(vec![
            snapshot(1, Duration::ZERO),
            snapshot(2, Duration::ZERO),
            snapshot(3, Duration::ZERO),
        ]);
        let mut out = Vec::new();

        system.handle(CrewPhase::Working, cooldowns, 2, &mut out);

        assert_eq!(out.len(), 2);
    }

    #[test]
    fn full_storage_suppresses_the_whole_batch() {
        let mut system = CrewMining::new();
        let cooldowns = CrewCooldownView::from_snapshots(vec![snapshot(1, Duration::ZERO)]);
        let mut out = Vec::new();

        system.handle(CrewPhase::Working, cooldowns, 0, &mut out);

        assert!(out.is_empty());
    }
}
