//! Snapshot capture and restore for persisted sessions.
//!
//! A [`SaveState`] is the serializable image of the whole game state. Every
//! field carries a default so snapshots written by older versions load
//! cleanly: missing sections fall back to fresh values and missing ore kinds
//! backfill at zero, instead of failing the whole load. The simulation clock
//! is persisted alongside the instants recorded on it, so in-flight smelts,
//! worker cooldowns, and the crew phase survive a restart.

use std::collections::BTreeMap;
use std::time::Duration;

use orepit_core::{economy, CrewPhase, OreKind, SmoltenOreKind, WorkerId};
use serde::{Deserialize, Serialize};

use crate::{CrewCycle, Smelt, Worker, World};

/// Serializable snapshot of the full game state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveState {
    clock_ms: u64,
    player: PlayerSave,
    pickaxe: PickaxeSave,
    storage: StorageSave,
    furnace: FurnaceSave,
    worker_stamina: StaminaSave,
    worker_cycle: CycleSave,
    workers: Vec<WorkerSave>,
    ores: BTreeMap<OreKind, u32>,
    smolten_ores: BTreeMap<SmoltenOreKind, u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct PlayerSave {
    coins: u64,
    lightning: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct PickaxeSave {
    level: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct StorageSave {
    level: u32,
}

impl Default for StorageSave {
    fn default() -> Self {
        Self {
            level: economy::BASE_STORAGE_LEVEL,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct FurnaceSave {
    level: u32,
    active: Option<SmeltSave>,
}

impl Default for FurnaceSave {
    fn default() -> Self {
        Self {
            level: 1,
            active: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
struct SmeltSave {
    kind: OreKind,
    started_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct StaminaSave {
    level: u32,
}

impl Default for StaminaSave {
    fn default() -> Self {
        Self { level: 1 }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct CycleSave {
    resting: bool,
    phase_started_ms: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
struct WorkerSave {
    id: u32,
    #[serde(default)]
    last_mine_ms: Option<u64>,
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Captures a serializable snapshot of the provided world.
#[must_use]
pub fn capture(world: &World) -> SaveState {
    SaveState {
        clock_ms: duration_ms(world.clock),
        player: PlayerSave {
            coins: world.coins,
            lightning: world.lightning,
        },
        pickaxe: PickaxeSave {
            level: world.pickaxe_level,
        },
        storage: StorageSave {
            level: world.storage_level,
        },
        furnace: FurnaceSave {
            level: world.furnace_level,
            active: world.smelt.map(|smelt| SmeltSave {
                kind: smelt.kind,
                started_ms: duration_ms(smelt.started),
            }),
        },
        worker_stamina: StaminaSave {
            level: world.stamina_level,
        },
        worker_cycle: CycleSave {
            resting: world.cycle.phase == CrewPhase::Resting,
            phase_started_ms: duration_ms(world.cycle.phase_started),
        },
        workers: world
            .workers
            .iter()
            .map(|worker| WorkerSave {
                id: worker.id.get(),
                last_mine_ms: worker.last_mine.map(duration_ms),
            })
            .collect(),
        ores: OreKind::ALL
            .iter()
            .map(|kind| (*kind, world.ore_counts[kind.index()]))
            .collect(),
        smolten_ores: SmoltenOreKind::ALL
            .iter()
            .map(|kind| (*kind, world.smolten_counts[kind.index()]))
            .collect(),
    }
}

/// Rebuilds a world from a snapshot, clamping out-of-range values.
///
/// Levels are clamped to their configured bounds, the roster is truncated to
/// the crew cap, and every persisted instant is clamped to the restored
/// clock so elapsed-time calculations never underflow.
#[must_use]
pub fn restore(state: &SaveState) -> World {
    let mut world = World::new();
    let clock = Duration::from_millis(state.clock_ms);

    world.clock = clock;
    world.coins = state.player.coins;
    world.lightning = state.player.lightning;
    world.pickaxe_level = state.pickaxe.level;
    world.storage_level = state
        .storage
        .level
        .clamp(economy::BASE_STORAGE_LEVEL, economy::MAX_STORAGE_LEVEL);
    world.furnace_level = state.furnace.level.clamp(1, economy::MAX_FURNACE_LEVEL);
    world.smelt = state.furnace.active.map(|smelt| Smelt {
        kind: smelt.kind,
        started: Duration::from_millis(smelt.started_ms).min(clock),
    });
    world.stamina_level = state.worker_stamina.level.max(1);
    world.cycle = CrewCycle {
        phase: if state.worker_cycle.resting {
            CrewPhase::Resting
        } else {
            CrewPhase::Working
        },
        phase_started: Duration::from_millis(state.worker_cycle.phase_started_ms).min(clock),
    };
    world.workers = state
        .workers
        .iter()
        .take(economy::MAX_CREW)
        .map(|worker| Worker {
            id: WorkerId::new(worker.id),
            last_mine: worker
                .last_mine_ms
                .map(|ms| Duration::from_millis(ms).min(clock)),
        })
        .collect();
    world.next_worker_id = world
        .workers
        .iter()
        .map(|worker| worker.id.get())
        .max()
        .map_or(1, |max| max.saturating_add(1));

    for kind in OreKind::ALL {
        world.ore_counts[kind.index()] = state.ores.get(&kind).copied().unwrap_or(0);
    }
    for kind in SmoltenOreKind::ALL {
        world.smolten_counts[kind.index()] = state.smolten_ores.get(&kind).copied().unwrap_or(0);
    }

    world
}
