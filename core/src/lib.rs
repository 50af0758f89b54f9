#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Orepit engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod economy;

/// Canonical banner emitted when a mining session boots.
pub const WELCOME_BANNER: &str = "Welcome to the orepit.";

/// Raw ore kinds that can be dug out of the field, ordered most common first.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum OreKind {
    /// Most common kind, found in nearly every tile.
    Amethyst,
    /// Common kind, the second of the two the crew can reach.
    Emerald,
    /// Mid-rarity kind.
    Obsidian,
    /// Uncommon kind.
    Ruby,
    /// Rare kind.
    Diamond,
    /// Rarest kind in the field.
    Garnet,
}

impl OreKind {
    /// Number of distinct ore kinds.
    pub const COUNT: usize = 6;

    /// Every ore kind, ordered most common first (sprite-row order).
    pub const ALL: [OreKind; OreKind::COUNT] = [
        OreKind::Amethyst,
        OreKind::Emerald,
        OreKind::Obsidian,
        OreKind::Ruby,
        OreKind::Diamond,
        OreKind::Garnet,
    ];

    /// Furnace charging priority, rarest kind first.
    pub const SMELT_ORDER: [OreKind; OreKind::COUNT] = [
        OreKind::Garnet,
        OreKind::Diamond,
        OreKind::Ruby,
        OreKind::Obsidian,
        OreKind::Emerald,
        OreKind::Amethyst,
    ];

    /// The two common kinds hired workers are able to mine.
    pub const CREW_KINDS: [OreKind; 2] = [OreKind::Amethyst, OreKind::Emerald];

    /// Stable dense index of the kind, usable for table lookups.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Amethyst => 0,
            Self::Emerald => 1,
            Self::Obsidian => 2,
            Self::Ruby => 3,
            Self::Diamond => 4,
            Self::Garnet => 5,
        }
    }

    /// Row the kind occupies in the ore sprite sheet.
    #[must_use]
    pub const fn sprite_row(self) -> u8 {
        self.index() as u8
    }

    /// Relative weight used for random tile and crew ore selection.
    #[must_use]
    pub const fn weight(self) -> u32 {
        match self {
            Self::Amethyst => 150,
            Self::Emerald => 120,
            Self::Obsidian => 80,
            Self::Ruby => 50,
            Self::Diamond => 15,
            Self::Garnet => 5,
        }
    }

    /// Unit sale price of the raw ore, in coins.
    #[must_use]
    pub const fn price(self) -> u64 {
        match self {
            Self::Amethyst => 5,
            Self::Emerald => 10,
            Self::Obsidian => 25,
            Self::Ruby => 50,
            Self::Diamond => 100,
            Self::Garnet => 250,
        }
    }

    /// Icon identifier used by presentation layers.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Amethyst => "purple",
            Self::Emerald => "green",
            Self::Obsidian => "black",
            Self::Ruby => "red",
            Self::Diamond => "diamond",
            Self::Garnet => "red_shade",
        }
    }

    /// The refined counterpart produced when this kind is smelted.
    #[must_use]
    pub const fn smolten(self) -> SmoltenOreKind {
        match self {
            Self::Amethyst => SmoltenOreKind::Amethyst,
            Self::Emerald => SmoltenOreKind::Emerald,
            Self::Obsidian => SmoltenOreKind::Obsidian,
            Self::Ruby => SmoltenOreKind::Ruby,
            Self::Diamond => SmoltenOreKind::Diamond,
            Self::Garnet => SmoltenOreKind::Garnet,
        }
    }
}

/// Refined ore kinds produced by the furnace, one per raw kind.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SmoltenOreKind {
    /// Refined amethyst.
    Amethyst,
    /// Refined emerald.
    Emerald,
    /// Refined obsidian.
    Obsidian,
    /// Refined ruby.
    Ruby,
    /// Refined diamond.
    Diamond,
    /// Refined garnet.
    Garnet,
}

impl SmoltenOreKind {
    /// Every smolten kind, in the same dense order as [`OreKind::ALL`].
    pub const ALL: [SmoltenOreKind; OreKind::COUNT] = [
        SmoltenOreKind::Amethyst,
        SmoltenOreKind::Emerald,
        SmoltenOreKind::Obsidian,
        SmoltenOreKind::Ruby,
        SmoltenOreKind::Diamond,
        SmoltenOreKind::Garnet,
    ];

    /// The raw kind this refined kind is produced from.
    #[must_use]
    pub const fn raw(self) -> OreKind {
        match self {
            Self::Amethyst => OreKind::Amethyst,
            Self::Emerald => OreKind::Emerald,
            Self::Obsidian => OreKind::Obsidian,
            Self::Ruby => OreKind::Ruby,
            Self::Diamond => OreKind::Diamond,
            Self::Garnet => OreKind::Garnet,
        }
    }

    /// Stable dense index of the kind, matching [`OreKind::index`].
    #[must_use]
    pub const fn index(self) -> usize {
        self.raw().index()
    }

    /// Unit sale price of the refined ore, in coins.
    #[must_use]
    pub const fn price(self) -> u64 {
        self.raw().price() * 2
    }

    /// Icon identifier used by presentation layers.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Amethyst => "smolten_purple",
            Self::Emerald => "smolten_green",
            Self::Obsidian => "smolten_black",
            Self::Ruby => "smolten_red",
            Self::Diamond => "smolten_diamond",
            Self::Garnet => "smolten_red_shade",
        }
    }
}

/// Sums the selection weights of the provided ore pool.
#[must_use]
pub fn total_weight(pool: &[OreKind]) -> u64 {
    pool.iter().map(|kind| u64::from(kind.weight())).sum()
}

/// Resolves a weighted random selection over the provided ore pool.
///
/// `draw` must be a uniform sample from `[0, total_weight(pool))`; the first
/// kind whose cumulative weight interval contains the draw is returned.
/// Returns `None` only for an empty pool.
#[must_use]
pub fn weighted_ore(pool: &[OreKind], draw: u64) -> Option<OreKind> {
    let mut cursor = draw;
    for kind in pool {
        let weight = u64::from(kind.weight());
        if cursor < weight {
            return Some(*kind);
        }
        cursor -= weight;
    }
    pool.last().copied()
}

/// Unique identifier assigned to a hired worker.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct WorkerId(u32);

impl WorkerId {
    /// Creates a new worker identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single ore tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    column: u32,
    row: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Position within the ore field expressed in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldPoint {
    x: f32,
    y: f32,
}

impl FieldPoint {
    /// Creates a new field position from world-unit coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal world-unit coordinate.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical world-unit coordinate.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Euclidean distance to another field position.
    #[must_use]
    pub fn distance_to(self, other: FieldPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Phase of the shared crew work/rest cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CrewPhase {
    /// Workers passively mine while their cooldowns allow.
    Working,
    /// All passive mining is paused until the rest phase ends.
    Resting,
}

/// Origin of an ore deposit attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MineSource {
    /// The player's own pickaxe click.
    Pickaxe,
    /// A hired worker's passive mining.
    Crew {
        /// Identifier of the worker that mined.
        worker: WorkerId,
    },
}

/// Upgrade tracks the player can spend coins on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpgradeKind {
    /// Shortens the player's click cooldown.
    Pickaxe,
    /// Raises the raw ore storage cap.
    Storage,
    /// Shortens the smelt duration.
    Furnace,
    /// Lengthens the crew's work phase.
    Stamina,
}

/// Reasons an upgrade purchase may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PurchaseError {
    /// The player cannot afford the computed cost.
    InsufficientCoins,
    /// The track is already at its maximum level.
    MaxLevel,
}

/// Reasons a hire request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HireError {
    /// The crew roster is already at its configured maximum.
    RosterFull,
    /// The player cannot afford the hire cost.
    InsufficientCoins,
}

/// Reasons a rest-skip boost may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoostError {
    /// The crew is not resting, so there is nothing to skip.
    NotResting,
    /// The player holds no lightning tokens.
    OutOfLightning,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Swings the pickaxe at the provided field position.
    MineAt {
        /// World-unit position of the click.
        position: FieldPoint,
    },
    /// Requests that the idle furnace start smelting the provided kind.
    ChargeFurnace {
        /// Raw ore kind to load into the furnace slot.
        kind: OreKind,
    },
    /// Requests completion of a smelt whose duration has fully elapsed.
    CompleteSmelt,
    /// Requests a flip of the shared crew work/rest phase.
    FlipCrewPhase,
    /// Requests a single passive mining action from the identified worker.
    CrewMine {
        /// Worker attempting to mine.
        worker: WorkerId,
    },
    /// Purchases the next pickaxe level.
    UpgradePickaxe,
    /// Purchases the next storage level.
    UpgradeStorage,
    /// Purchases the next furnace level.
    UpgradeFurnace,
    /// Purchases the next crew stamina level.
    UpgradeStamina,
    /// Hires one additional worker.
    HireWorker,
    /// Sells the entire smolten inventory for coins.
    SellAllSmolten,
    /// Spends one lightning token to end the current rest phase early.
    SkipRest,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Reports that a pickaxe swing chipped a tile without breaking it.
    TileCracked {
        /// Tile that was hit.
        tile: TileCoord,
        /// Accumulated hits on the tile after this swing.
        hits: u8,
    },
    /// Reports that a tile broke and was reassigned a fresh ore kind.
    TileBroken {
        /// Tile that broke.
        tile: TileCoord,
        /// Kind that was credited to the ledger.
        kind: OreKind,
        /// Kind assigned to the freshly reset tile.
        next: OreKind,
    },
    /// Confirms that one unit of raw ore was credited to the ledger.
    OreBanked {
        /// Kind that was credited.
        kind: OreKind,
        /// Origin of the deposit.
        source: MineSource,
    },
    /// Reports that a deposit was rejected because storage is full.
    StorageFull {
        /// Origin of the rejected deposit.
        source: MineSource,
    },
    /// Confirms that a lightning token was found in a broken tile.
    LightningFound {
        /// Token balance after banking the find.
        total: u32,
    },
    /// Confirms that the furnace started smelting a raw ore.
    SmeltingStarted {
        /// Kind loaded into the furnace slot.
        kind: OreKind,
        /// Duration the smelt will take at the current furnace level.
        duration: Duration,
    },
    /// Confirms that a smelt finished and produced refined ore.
    SmeltingCompleted {
        /// Raw kind that was consumed.
        kind: OreKind,
        /// Refined kind credited to the smolten inventory.
        smolten: SmoltenOreKind,
    },
    /// Announces that the shared crew cycle entered a new phase.
    CrewPhaseChanged {
        /// Phase that became active.
        phase: CrewPhase,
    },
    /// Confirms that a worker joined the crew.
    WorkerHired {
        /// Identifier assigned to the new worker.
        worker: WorkerId,
        /// Coins deducted for the hire.
        cost: u64,
    },
    /// Reports that a hire request was rejected.
    HireRejected {
        /// Specific reason the hire failed.
        reason: HireError,
    },
    /// Confirms that an upgrade purchase was applied.
    UpgradePurchased {
        /// Track that was upgraded.
        upgrade: UpgradeKind,
        /// Level reached after the purchase.
        level: u32,
        /// Coins deducted for the purchase.
        cost: u64,
    },
    /// Reports that an upgrade purchase was rejected.
    UpgradeRejected {
        /// Track the purchase targeted.
        upgrade: UpgradeKind,
        /// Specific reason the purchase failed.
        reason: PurchaseError,
    },
    /// Confirms that the smolten inventory was sold.
    SmoltenSold {
        /// Coins credited by the sale.
        coins: u64,
    },
    /// Confirms that a lightning token ended the rest phase early.
    RestSkipped {
        /// Token balance remaining after the boost.
        remaining: u32,
    },
    /// Reports that a rest-skip boost was rejected.
    BoostRejected {
        /// Specific reason the boost failed.
        reason: BoostError,
    },
}

/// Read-only description of the furnace slot consumed by systems.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FurnaceView {
    job: Option<FurnaceJob>,
}

impl FurnaceView {
    /// Captures a view over an optionally active smelt job.
    #[must_use]
    pub const fn new(job: Option<FurnaceJob>) -> Self {
        Self { job }
    }

    /// The active smelt job, if one is running.
    #[must_use]
    pub const fn job(&self) -> Option<FurnaceJob> {
        self.job
    }

    /// Reports whether the furnace slot is empty.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.job.is_none()
    }
}

/// Immutable description of a running smelt.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FurnaceJob {
    /// Raw ore kind occupying the furnace slot.
    pub kind: OreKind,
    /// Time elapsed since the smelt started.
    pub elapsed: Duration,
    /// Full duration of the smelt at the current furnace level.
    pub duration: Duration,
}

impl FurnaceJob {
    /// Fraction of the smelt completed so far, clamped to `1.0`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let fraction = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        fraction.min(1.0) as f32
    }

    /// Reports whether the smelt has run for its full duration.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Read-only per-kind raw ore counts consumed by systems.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OreStockView {
    counts: [u32; OreKind::COUNT],
}

impl OreStockView {
    /// Captures a view over dense per-kind counts indexed by [`OreKind::index`].
    #[must_use]
    pub const fn from_counts(counts: [u32; OreKind::COUNT]) -> Self {
        Self { counts }
    }

    /// Units of the provided kind currently held in storage.
    #[must_use]
    pub const fn count(&self, kind: OreKind) -> u32 {
        self.counts[kind.index()]
    }

    /// Total raw ore units across every kind.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts.iter().fold(0u32, |sum, count| {
            sum.saturating_add(*count)
        })
    }
}

/// Read-only description of the shared crew cycle consumed by systems.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleView {
    /// Phase the cycle is currently in.
    pub phase: CrewPhase,
    /// Time elapsed since the current phase started.
    pub elapsed: Duration,
    /// Full duration of a work phase at the current stamina level.
    pub work_duration: Duration,
    /// Full duration of a rest phase.
    pub rest_duration: Duration,
}

impl CycleView {
    /// Full duration of the phase the cycle is currently in.
    #[must_use]
    pub const fn current_duration(&self) -> Duration {
        match self.phase {
            CrewPhase::Working => self.work_duration,
            CrewPhase::Resting => self.rest_duration,
        }
    }

    /// Time left before the current phase would flip on its own.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.current_duration().saturating_sub(self.elapsed)
    }
}

/// Read-only snapshot describing every worker's mining cooldown.
#[derive(Clone, Debug, Default)]
pub struct CrewCooldownView {
    snapshots: Vec<CrewCooldownSnapshot>,
}

impl CrewCooldownView {
    /// Creates a new cooldown view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<CrewCooldownSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.worker);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &CrewCooldownSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<CrewCooldownSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single worker's cooldown state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CrewCooldownSnapshot {
    /// Identifier of the worker.
    pub worker: WorkerId,
    /// Time left before the worker may mine again; zero when ready.
    pub ready_in: Duration,
}
