#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Orepit.
//!
//! The [`World`] owns the single mutable game state. Adapters and systems
//! never touch it directly: every mutation funnels through [`apply`], which
//! validates each [`Command`] against the current state and broadcasts
//! [`Event`] values describing what actually happened. Preconditions are
//! re-checked here at the point of mutation, so stale decisions made by
//! systems against older snapshots degrade to no-ops.

use std::time::Duration;

use orepit_core::{
    economy, BoostError, Command, CrewPhase, Event, FieldPoint, HireError, MineSource, OreKind,
    PurchaseError, SmoltenOreKind, UpgradeKind, WorkerId, WELCOME_BANNER,
};

use crate::field::{OreField, OreRoller, TILE_BREAK_HITS};

mod field;
pub mod save;

const ORE_FIELD_SEED: u64 = 0x6f72_6570_6974_5f31;

/// Represents the authoritative Orepit world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    clock: Duration,
    coins: u64,
    lightning: u32,
    pickaxe_level: u32,
    last_click: Option<Duration>,
    storage_level: u32,
    furnace_level: u32,
    smelt: Option<Smelt>,
    stamina_level: u32,
    cycle: CrewCycle,
    workers: Vec<Worker>,
    next_worker_id: u32,
    ore_counts: [u32; OreKind::COUNT],
    smolten_counts: [u32; OreKind::COUNT],
    field: OreField,
    roller: OreRoller,
}

#[derive(Clone, Copy, Debug)]
struct Smelt {
    kind: OreKind,
    started: Duration,
}

#[derive(Clone, Copy, Debug)]
struct CrewCycle {
    phase: CrewPhase,
    phase_started: Duration,
}

#[derive(Clone, Copy, Debug)]
struct Worker {
    id: WorkerId,
    last_mine: Option<Duration>,
}

impl World {
    /// Creates a fresh world ready for a new mining session.
    #[must_use]
    pub fn new() -> Self {
        let mut roller = OreRoller::new(ORE_FIELD_SEED);
        let field = OreField::generate(&mut roller);
        Self {
            banner: WELCOME_BANNER,
            clock: Duration::ZERO,
            coins: 0,
            lightning: 0,
            pickaxe_level: 0,
            last_click: None,
            storage_level: economy::BASE_STORAGE_LEVEL,
            furnace_level: 1,
            smelt: None,
            stamina_level: 1,
            cycle: CrewCycle {
                phase: CrewPhase::Working,
                phase_started: Duration::ZERO,
            },
            workers: Vec::new(),
            next_worker_id: 1,
            ore_counts: [0; OreKind::COUNT],
            smolten_counts: [0; OreKind::COUNT],
            field,
            roller,
        }
    }

    fn storage_cap(&self) -> u32 {
        economy::storage_cap(self.storage_level)
    }

    fn total_ore_count(&self) -> u32 {
        self.ore_counts
            .iter()
            .fold(0u32, |sum, count| sum.saturating_add(*count))
    }

    fn smelt_duration(&self) -> Duration {
        economy::smelt_duration(self.furnace_level)
    }

    fn click_ready(&self) -> bool {
        let cooldown = economy::pickaxe_cooldown(self.pickaxe_level);
        self.last_click
            .map_or(true, |last| self.clock > last.saturating_add(cooldown))
    }

    fn phase_duration(&self) -> Duration {
        match self.cycle.phase {
            CrewPhase::Working => economy::work_duration(self.stamina_level),
            CrewPhase::Resting => economy::REST_DURATION,
        }
    }

    /// Credits one unit of the kind, re-validating capacity at the mutation.
    fn deposit(&mut self, kind: OreKind, source: MineSource, out: &mut Vec<Event>) -> bool {
        if self.total_ore_count() >= self.storage_cap() {
            out.push(Event::StorageFull { source });
            return false;
        }
        self.ore_counts[kind.index()] = self.ore_counts[kind.index()].saturating_add(1);
        out.push(Event::OreBanked { kind, source });
        true
    }

    fn mine_at(&mut self, position: FieldPoint, out: &mut Vec<Event>) {
        if !self.click_ready() {
            return;
        }
        self.last_click = Some(self.clock);

        let Some(index) = self.field.tile_at(position) else {
            return;
        };
        if self.total_ore_count() >= self.storage_cap() {
            out.push(Event::StorageFull {
                source: MineSource::Pickaxe,
            });
            return;
        }

        let tile_coord = self.field.coord_of(index);
        let (kind, hits) = {
            let Some(tile) = self.field.tile_mut(index) else {
                return;
            };
            tile.hits = tile.hits.saturating_add(1);
            (tile.kind, tile.hits)
        };

        if hits < TILE_BREAK_HITS {
            out.push(Event::TileCracked {
                tile: tile_coord,
                hits,
            });
            return;
        }

        if self.deposit(kind, MineSource::Pickaxe, out) {
            if self.roller.draw_below(100) < economy::LIGHTNING_DROP_PERCENT {
                self.lightning = self.lightning.saturating_add(1);
                out.push(Event::LightningFound {
                    total: self.lightning,
                });
            }
            let next = self.roller.roll(&OreKind::ALL);
            if let Some(tile) = self.field.tile_mut(index) {
                tile.kind = next;
                tile.hits = 0;
            }
            out.push(Event::TileBroken {
                tile: tile_coord,
                kind,
                next,
            });
        }
    }

    fn charge_furnace(&mut self, kind: OreKind, out: &mut Vec<Event>) {
        if self.smelt.is_some() {
            return;
        }
        if self.ore_counts[kind.index()] == 0 {
            return;
        }
        self.ore_counts[kind.index()] -= 1;
        self.smelt = Some(Smelt {
            kind,
            started: self.clock,
        });
        out.push(Event::SmeltingStarted {
            kind,
            duration: self.smelt_duration(),
        });
    }

    fn complete_smelt(&mut self, out: &mut Vec<Event>) {
        let Some(smelt) = self.smelt else {
            return;
        };
        let elapsed = self.clock.saturating_sub(smelt.started);
        if elapsed < self.smelt_duration() {
            return;
        }
        let smolten = smelt.kind.smolten();
        self.smolten_counts[smolten.index()] =
            self.smolten_counts[smolten.index()].saturating_add(1);
        self.smelt = None;
        out.push(Event::SmeltingCompleted {
            kind: smelt.kind,
            smolten,
        });
    }

    fn flip_crew_phase(&mut self, out: &mut Vec<Event>) {
        let elapsed = self.clock.saturating_sub(self.cycle.phase_started);
        if elapsed < self.phase_duration() {
            return;
        }
        let phase = match self.cycle.phase {
            CrewPhase::Working => CrewPhase::Resting,
            CrewPhase::Resting => CrewPhase::Working,
        };
        self.cycle = CrewCycle {
            phase,
            phase_started: self.clock,
        };
        out.push(Event::CrewPhaseChanged { phase });
    }

    fn crew_mine(&mut self, worker: WorkerId, out: &mut Vec<Event>) {
        if self.cycle.phase != CrewPhase::Working {
            return;
        }
        let Some(index) = self.workers.iter().position(|entry| entry.id == worker) else {
            return;
        };
        let cooldown = economy::crew_cooldown(self.pickaxe_level);
        let ready = self.workers[index]
            .last_mine
            .map_or(true, |last| self.clock > last.saturating_add(cooldown));
        if !ready {
            return;
        }
        if self.total_ore_count() >= self.storage_cap() {
            out.push(Event::StorageFull {
                source: MineSource::Crew { worker },
            });
            return;
        }
        self.workers[index].last_mine = Some(self.clock);
        let kind = self.roller.roll(&OreKind::CREW_KINDS);
        let _ = self.deposit(kind, MineSource::Crew { worker }, out);
    }

    fn upgrade_pickaxe(&mut self, out: &mut Vec<Event>) {
        let cost = economy::upgrade_cost(self.pickaxe_level);
        if self.coins < cost {
            out.push(Event::UpgradeRejected {
                upgrade: UpgradeKind::Pickaxe,
                reason: PurchaseError::InsufficientCoins,
            });
            return;
        }
        self.coins -= cost;
        self.pickaxe_level = self.pickaxe_level.saturating_add(1);
        out.push(Event::UpgradePurchased {
            upgrade: UpgradeKind::Pickaxe,
            level: self.pickaxe_level,
            cost,
        });
    }

    fn upgrade_storage(&mut self, out: &mut Vec<Event>) {
        if self.storage_level >= economy::MAX_STORAGE_LEVEL {
            out.push(Event::UpgradeRejected {
                upgrade: UpgradeKind::Storage,
                reason: PurchaseError::MaxLevel,
            });
            return;
        }
        let cost = economy::upgrade_cost(self.storage_level);
        if self.coins < cost {
            out.push(Event::UpgradeRejected {
                upgrade: UpgradeKind::Storage,
                reason: PurchaseError::InsufficientCoins,
            });
            return;
        }
        self.coins -= cost;
        self.storage_level = self.storage_level.saturating_add(1);
        out.push(Event::UpgradePurchased {
            upgrade: UpgradeKind::Storage,
            level: self.storage_level,
            cost,
        });
    }

    fn upgrade_furnace(&mut self, out: &mut Vec<Event>) {
        if self.furnace_level >= economy::MAX_FURNACE_LEVEL {
            out.push(Event::UpgradeRejected {
                upgrade: UpgradeKind::Furnace,
                reason: PurchaseError::MaxLevel,
            });
            return;
        }
        let cost = economy::furnace_upgrade_cost(self.furnace_level);
        if self.coins < cost {
            out.push(Event::UpgradeRejected {
                upgrade: UpgradeKind::Furnace,
                reason: PurchaseError::InsufficientCoins,
            });
            return;
        }
        self.coins -= cost;
        self.furnace_level = self.furnace_level.saturating_add(1);
        out.push(Event::UpgradePurchased {
            upgrade: UpgradeKind::Furnace,
            level: self.furnace_level,
            cost,
        });
    }

    fn upgrade_stamina(&mut self, out: &mut Vec<Event>) {
        let cost = economy::stamina_upgrade_cost(self.stamina_level);
        if self.coins < cost {
            out.push(Event::UpgradeRejected {
                upgrade: UpgradeKind::Stamina,
                reason: PurchaseError::InsufficientCoins,
            });
            return;
        }
        self.coins -= cost;
        self.stamina_level = self.stamina_level.saturating_add(1);
        out.push(Event::UpgradePurchased {
            upgrade: UpgradeKind::Stamina,
            level: self.stamina_level,
            cost,
        });
    }

    fn hire_worker(&mut self, out: &mut Vec<Event>) {
        if self.workers.len() >= economy::MAX_CREW {
            out.push(Event::HireRejected {
                reason: HireError::RosterFull,
            });
            return;
        }
        let cost = economy::hire_cost(self.workers.len());
        if self.coins < cost {
            out.push(Event::HireRejected {
                reason: HireError::InsufficientCoins,
            });
            return;
        }
        self.coins -= cost;
        let id = WorkerId::new(self.next_worker_id);
        self.next_worker_id = self.next_worker_id.saturating_add(1);
        self.workers.push(Worker {
            id,
            last_mine: None,
        });
        out.push(Event::WorkerHired { worker: id, cost });
    }

    fn sell_all_smolten(&mut self, out: &mut Vec<Event>) {
        let payout: u64 = SmoltenOreKind::ALL
            .iter()
            .map(|kind| u64::from(self.smolten_counts[kind.index()]) * kind.price())
            .sum();
        if payout == 0 {
            return;
        }
        self.coins = self.coins.saturating_add(payout);
        self.smolten_counts = [0; OreKind::COUNT];
        out.push(Event::SmoltenSold { coins: payout });
    }

    fn skip_rest(&mut self, out: &mut Vec<Event>) {
        if self.cycle.phase != CrewPhase::Resting {
            out.push(Event::BoostRejected {
                reason: BoostError::NotResting,
            });
            return;
        }
        if self.lightning == 0 {
            out.push(Event::BoostRejected {
                reason: BoostError::OutOfLightning,
            });
            return;
        }
        self.lightning -= 1;
        self.cycle = CrewCycle {
            phase: CrewPhase::Working,
            phase_started: self.clock,
        };
        out.push(Event::RestSkipped {
            remaining: self.lightning,
        });
        out.push(Event::CrewPhaseChanged {
            phase: CrewPhase::Working,
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::MineAt { position } => world.mine_at(position, out_events),
        Command::ChargeFurnace { kind } => world.charge_furnace(kind, out_events),
        Command::CompleteSmelt => world.complete_smelt(out_events),
        Command::FlipCrewPhase => world.flip_crew_phase(out_events),
        Command::CrewMine { worker } => world.crew_mine(worker, out_events),
        Command::UpgradePickaxe => world.upgrade_pickaxe(out_events),
        Command::UpgradeStorage => world.upgrade_storage(out_events),
        Command::UpgradeFurnace => world.upgrade_furnace(out_events),
        Command::UpgradeStamina => world.upgrade_stamina(out_events),
        Command::HireWorker => world.hire_worker(out_events),
        Command::SellAllSmolten => world.sell_all_smolten(out_events),
        Command::SkipRest => world.skip_rest(out_events),
    }
}

/// Test scaffolding that lets other crates seed world state directly.
#[cfg(feature = "ledger_scaffolding")]
pub mod scaffolding {
    use orepit_core::{CrewPhase, OreKind};

    use super::World;

    /// Grants raw ore directly into storage, bypassing the deposit path.
    pub fn grant_ore(world: &mut World, kind: OreKind, amount: u32) {
        world.ore_counts[kind.index()] = world.ore_counts[kind.index()].saturating_add(amount);
    }

    /// Grants spendable coins.
    pub fn grant_coins(world: &mut World, coins: u64) {
        world.coins = world.coins.saturating_add(coins);
    }

    /// Grants lightning tokens.
    pub fn grant_lightning(world: &mut World, tokens: u32) {
        world.lightning = world.lightning.saturating_add(tokens);
    }

    /// Forces the shared crew cycle into the provided phase.
    pub fn set_crew_phase(world: &mut World, phase: CrewPhase) {
        world.cycle.phase = phase;
        world.cycle.phase_started = world.clock;
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use orepit_core::{
        economy, CrewCooldownSnapshot, CrewCooldownView, CycleView, FieldPoint, FurnaceJob,
        FurnaceView, OreKind, OreStockView, SmoltenOreKind, TileCoord, WorkerId,
    };

    use super::{field::OreField, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Current simulation clock reading.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Spendable coin balance.
    #[must_use]
    pub fn coins(world: &World) -> u64 {
        world.coins
    }

    /// Lightning token balance.
    #[must_use]
    pub fn lightning(world: &World) -> u32 {
        world.lightning
    }

    /// Captures the pickaxe level, click cooldown, and next upgrade cost.
    #[must_use]
    pub fn pickaxe(world: &World) -> PickaxeSnapshot {
        PickaxeSnapshot {
            level: world.pickaxe_level,
            cooldown: economy::pickaxe_cooldown(world.pickaxe_level),
            next_cost: economy::upgrade_cost(world.pickaxe_level),
        }
    }

    /// Captures the storage level, capacity, and current fill.
    #[must_use]
    pub fn storage(world: &World) -> StorageSnapshot {
        StorageSnapshot {
            level: world.storage_level,
            max_level: economy::MAX_STORAGE_LEVEL,
            cap: world.storage_cap(),
            used: world.total_ore_count(),
        }
    }

    /// Total raw ore units across every kind.
    #[must_use]
    pub fn total_ore_count(world: &World) -> u32 {
        world.total_ore_count()
    }

    /// Current furnace level.
    #[must_use]
    pub fn furnace_level(world: &World) -> u32 {
        world.furnace_level
    }

    /// Captures the furnace slot for systems and progress display.
    #[must_use]
    pub fn furnace_view(world: &World) -> FurnaceView {
        FurnaceView::new(world.smelt.map(|smelt| FurnaceJob {
            kind: smelt.kind,
            elapsed: world.clock.saturating_sub(smelt.started),
            duration: world.smelt_duration(),
        }))
    }

    /// Captures the dense per-kind raw ore counts.
    #[must_use]
    pub fn ore_stock(world: &World) -> OreStockView {
        OreStockView::from_counts(world.ore_counts)
    }

    /// Captures the per-kind smolten inventory.
    #[must_use]
    pub fn smolten_stock(world: &World) -> SmoltenStock {
        SmoltenStock {
            counts: world.smolten_counts,
        }
    }

    /// Captures the shared crew cycle phase and timings.
    #[must_use]
    pub fn cycle_view(world: &World) -> CycleView {
        CycleView {
            phase: world.cycle.phase,
            elapsed: world.clock.saturating_sub(world.cycle.phase_started),
            work_duration: economy::work_duration(world.stamina_level),
            rest_duration: economy::REST_DURATION,
        }
    }

    /// Captures every worker's mining cooldown state.
    #[must_use]
    pub fn crew_cooldowns(world: &World) -> CrewCooldownView {
        let cooldown = economy::crew_cooldown(world.pickaxe_level);
        CrewCooldownView::from_snapshots(
            world
                .workers
                .iter()
                .map(|worker| CrewCooldownSnapshot {
                    worker: worker.id,
                    ready_in: worker.last_mine.map_or(Duration::ZERO, |last| {
                        last.saturating_add(cooldown).saturating_sub(world.clock)
                    }),
                })
                .collect(),
        )
    }

    /// Identifiers of the hired workers in hire order.
    #[must_use]
    pub fn crew_roster(world: &World) -> Vec<WorkerId> {
        world.workers.iter().map(|worker| worker.id).collect()
    }

    /// Current crew stamina level.
    #[must_use]
    pub fn stamina_level(world: &World) -> u32 {
        world.stamina_level
    }

    /// Captures the ore field grid for display purposes.
    #[must_use]
    pub fn field_view(world: &World) -> FieldView {
        FieldView {
            side: world.field.side(),
            tiles: world
                .field
                .tiles()
                .iter()
                .enumerate()
                .map(|(index, tile)| TileSnapshot {
                    tile: world.field.coord_of(index),
                    kind: tile.kind,
                    hits: tile.hits,
                })
                .collect(),
        }
    }

    /// World-unit centre of a tile, for adapters that aim clicks at tiles.
    #[must_use]
    pub fn tile_centre(tile: TileCoord) -> FieldPoint {
        OreField::centre_of(tile)
    }

    /// Immutable pickaxe statistics used for display.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct PickaxeSnapshot {
        /// Current pickaxe level.
        pub level: u32,
        /// Click cooldown at the current level.
        pub cooldown: Duration,
        /// Coin cost of the next level.
        pub next_cost: u64,
    }

    /// Immutable storage statistics used for display.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct StorageSnapshot {
        /// Current storage level.
        pub level: u32,
        /// Highest purchasable storage level.
        pub max_level: u32,
        /// Raw ore capacity at the current level.
        pub cap: u32,
        /// Raw ore units currently held.
        pub used: u32,
    }

    /// Read-only per-kind smolten inventory.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct SmoltenStock {
        counts: [u32; OreKind::COUNT],
    }

    impl SmoltenStock {
        /// Units of the provided refined kind currently held.
        #[must_use]
        pub const fn count(&self, kind: SmoltenOreKind) -> u32 {
            self.counts[kind.index()]
        }

        /// Coin value of the entire smolten inventory.
        #[must_use]
        pub fn total_value(&self) -> u64 {
            SmoltenOreKind::ALL
                .iter()
                .map(|kind| u64::from(self.count(*kind)) * kind.price())
                .sum()
        }
    }

    /// Read-only snapshot of the ore field grid.
    #[derive(Clone, Debug)]
    pub struct FieldView {
        side: u32,
        tiles: Vec<TileSnapshot>,
    }

    impl FieldView {
        /// Number of tiles along each field edge.
        #[must_use]
        pub const fn side(&self) -> u32 {
            self.side
        }

        /// Iterator over the captured tile snapshots in row-major order.
        pub fn iter(&self) -> impl Iterator<Item = &TileSnapshot> {
            self.tiles.iter()
        }
    }

    /// Immutable representation of a single ore tile.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct TileSnapshot {
        /// Grid coordinate of the tile.
        pub tile: TileCoord,
        /// Kind currently exposed by the tile.
        pub kind: OreKind,
        /// Hits accumulated toward the break threshold.
        pub hits: u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orepit_core::economy;

    fn tick(world: &mut World, dt: Duration) {
        let mut events = Vec::new();
        apply(world, Command::Tick { dt }, &mut events);
    }

    fn first_tile_centre(world: &World) -> (FieldPoint, OreKind) {
        let view = query::field_view(world);
        let snapshot = view.iter().next().expect("field has tiles");
        (query::tile_centre(snapshot.tile), snapshot.kind)
    }

    /// Clicks the same tile enough times to break it once, waiting out the
    /// click cooldown between swings.
    fn break_first_tile(world: &mut World) -> Vec<Event> {
        let (position, _) = first_tile_centre(world);
        let mut events = Vec::new();
        for _ in 0..6 {
            tick(world, Duration::from_millis(900));
            apply(world, Command::MineAt { position }, &mut events);
        }
        events
    }

    #[test]
    fn tick_advances_the_clock() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(50),
            },
            &mut events,
        );
        assert_eq!(query::clock(&world), Duration::from_millis(50));
        assert_eq!(
            events,
            vec![Event::TimeAdvanced {
                dt: Duration::from_millis(50)
            }]
        );
    }

    #[test]
    fn six_swings_crack_then_break_a_tile() {
        let mut world = World::new();
        let (_, kind) = first_tile_centre(&world);
        let events = break_first_tile(&mut world);

        let cracks = events
            .iter()
            .filter(|event| matches!(event, Event::TileCracked { .. }))
            .count();
        assert_eq!(cracks, 5);
        assert!(events.iter().any(|event| matches!(
            event,
            Event::OreBanked {
                source: MineSource::Pickaxe,
                ..
            }
        )));
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::TileBroken { .. })));
        assert_eq!(query::ore_stock(&world).count(kind), 1);
    }

    #[test]
    fn clicks_inside_the_cooldown_window_are_dropped() {
        let mut world = World::new();
        let (position, _) = first_tile_centre(&world);
        tick(&mut world, Duration::from_millis(900));

        let mut events = Vec::new();
        apply(&mut world, Command::MineAt { position }, &mut events);
        apply(&mut world, Command::MineAt { position }, &mut events);

        let cracks = events
            .iter()
            .filter(|event| matches!(event, Event::TileCracked { .. }))
            .count();
        assert_eq!(cracks, 1);
    }

    #[test]
    fn swings_reject_without_cracking_when_storage_is_full() {
        let mut world = World::new();
        world.ore_counts[OreKind::Amethyst.index()] = world.storage_cap();
        let (position, _) = first_tile_centre(&world);
        tick(&mut world, Duration::from_millis(900));

        let mut events = Vec::new();
        apply(&mut world, Command::MineAt { position }, &mut events);

        assert_eq!(
            events,
            vec![Event::StorageFull {
                source: MineSource::Pickaxe
            }]
        );
        assert_eq!(query::total_ore_count(&world), world.storage_cap());
        assert!(query::field_view(&world).iter().all(|tile| tile.hits == 0));
    }

    #[test]
    fn pickaxe_upgrade_requires_the_full_cost() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::UpgradePickaxe, &mut events);
        assert_eq!(
            events,
            vec![Event::UpgradeRejected {
                upgrade: UpgradeKind::Pickaxe,
                reason: PurchaseError::InsufficientCoins,
            }]
        );
        assert_eq!(query::pickaxe(&world).level, 0);
        assert_eq!(query::coins(&world), 0);

        world.coins = 200;
        events.clear();
        apply(&mut world, Command::UpgradePickaxe, &mut events);
        assert_eq!(
            events,
            vec![Event::UpgradePurchased {
                upgrade: UpgradeKind::Pickaxe,
                level: 1,
                cost: 200,
            }]
        );
        let pickaxe = query::pickaxe(&world);
        assert_eq!(pickaxe.level, 1);
        assert_eq!(query::coins(&world), 0);
        assert!(pickaxe.cooldown < economy::BASE_PICKAXE_COOLDOWN);
    }

    #[test]
    fn storage_upgrade_stops_at_the_max_level() {
        let mut world = World::new();
        world.coins = 1_000_000;
        let mut events = Vec::new();
        for _ in economy::BASE_STORAGE_LEVEL..economy::MAX_STORAGE_LEVEL {
            apply(&mut world, Command::UpgradeStorage, &mut events);
        }
        assert_eq!(query::storage(&world).level, economy::MAX_STORAGE_LEVEL);
        assert_eq!(query::storage(&world).cap, 250);

        events.clear();
        apply(&mut world, Command::UpgradeStorage, &mut events);
        assert_eq!(
            events,
            vec![Event::UpgradeRejected {
                upgrade: UpgradeKind::Storage,
                reason: PurchaseError::MaxLevel,
            }]
        );
    }

    #[test]
    fn furnace_upgrade_pays_the_discounted_cost_and_stops_at_max() {
        let mut world = World::new();
        world.coins = 720;
        let mut events = Vec::new();
        apply(&mut world, Command::UpgradeFurnace, &mut events);
        assert_eq!(
            events,
            vec![Event::UpgradePurchased {
                upgrade: UpgradeKind::Furnace,
                level: 2,
                cost: 720,
            }]
        );

        world.furnace_level = economy::MAX_FURNACE_LEVEL;
        world.coins = u64::MAX;
        events.clear();
        apply(&mut world, Command::UpgradeFurnace, &mut events);
        assert_eq!(
            events,
            vec![Event::UpgradeRejected {
                upgrade: UpgradeKind::Furnace,
                reason: PurchaseError::MaxLevel,
            }]
        );
    }

    #[test]
    fn charging_pairs_the_slot_with_a_start_instant() {
        let mut world = World::new();
        world.ore_counts[OreKind::Garnet.index()] = 1;
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ChargeFurnace {
                kind: OreKind::Garnet,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::SmeltingStarted {
                kind: OreKind::Garnet,
                duration: economy::BASE_SMELT_DURATION,
            }]
        );
        assert_eq!(query::ore_stock(&world).count(OreKind::Garnet), 0);
        let job = query::furnace_view(&world).job().expect("slot occupied");
        assert_eq!(job.kind, OreKind::Garnet);

        // A second charge while the slot is busy is a stale command.
        events.clear();
        apply(
            &mut world,
            Command::ChargeFurnace {
                kind: OreKind::Amethyst,
            },
            &mut events,
        );
        assert!(events.is_empty());
    }

    #[test]
    fn charging_an_empty_kind_is_a_no_op() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ChargeFurnace {
                kind: OreKind::Diamond,
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert!(query::furnace_view(&world).is_idle());
    }

    #[test]
    fn smelts_complete_only_after_their_full_duration() {
        let mut world = World::new();
        world.ore_counts[OreKind::Ruby.index()] = 1;
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ChargeFurnace {
                kind: OreKind::Ruby,
            },
            &mut events,
        );

        tick(&mut world, Duration::from_millis(1_999));
        events.clear();
        apply(&mut world, Command::CompleteSmelt, &mut events);
        assert!(events.is_empty());
        assert!(!query::furnace_view(&world).is_idle());

        tick(&mut world, Duration::from_millis(1));
        apply(&mut world, Command::CompleteSmelt, &mut events);
        assert_eq!(
            events,
            vec![Event::SmeltingCompleted {
                kind: OreKind::Ruby,
                smolten: SmoltenOreKind::Ruby,
            }]
        );
        assert!(query::furnace_view(&world).is_idle());
        assert_eq!(query::smolten_stock(&world).count(SmoltenOreKind::Ruby), 1);
    }

    #[test]
    fn selling_smolten_is_atomic_and_idempotent_at_zero() {
        let mut world = World::new();
        world.smolten_counts[SmoltenOreKind::Diamond.index()] = 2;
        world.smolten_counts[SmoltenOreKind::Amethyst.index()] = 3;
        let mut events = Vec::new();
        apply(&mut world, Command::SellAllSmolten, &mut events);

        let expected = 2 * SmoltenOreKind::Diamond.price() + 3 * SmoltenOreKind::Amethyst.price();
        assert_eq!(events, vec![Event::SmoltenSold { coins: expected }]);
        assert_eq!(query::coins(&world), expected);
        assert_eq!(query::smolten_stock(&world).total_value(), 0);

        events.clear();
        apply(&mut world, Command::SellAllSmolten, &mut events);
        assert!(events.is_empty());
        assert_eq!(query::coins(&world), expected);
    }

    #[test]
    fn hiring_stops_at_the_roster_cap() {
        let mut world = World::new();
        world.coins = 100_000;
        let mut events = Vec::new();
        for _ in 0..economy::MAX_CREW {
            apply(&mut world, Command::HireWorker, &mut events);
        }
        assert_eq!(query::crew_roster(&world).len(), economy::MAX_CREW);

        let hired_costs: Vec<u64> = events
            .iter()
            .filter_map(|event| match event {
                Event::WorkerHired { cost, .. } => Some(*cost),
                _ => None,
            })
            .collect();
        assert_eq!(hired_costs, vec![200, 1_100, 2_000, 2_900, 3_800]);

        events.clear();
        apply(&mut world, Command::HireWorker, &mut events);
        assert_eq!(
            events,
            vec![Event::HireRejected {
                reason: HireError::RosterFull
            }]
        );
    }

    #[test]
    fn hiring_requires_the_full_cost() {
        let mut world = World::new();
        world.coins = 199;
        let mut events = Vec::new();
        apply(&mut world, Command::HireWorker, &mut events);
        assert_eq!(
            events,
            vec![Event::HireRejected {
                reason: HireError::InsufficientCoins
            }]
        );
        assert!(query::crew_roster(&world).is_empty());
    }

    #[test]
    fn worker_identifiers_stay_unique_across_hires() {
        let mut world = World::new();
        world.coins = 100_000;
        let mut events = Vec::new();
        apply(&mut world, Command::HireWorker, &mut events);
        apply(&mut world, Command::HireWorker, &mut events);
        let roster = query::crew_roster(&world);
        assert_eq!(roster.len(), 2);
        assert_ne!(roster[0], roster[1]);
    }

    #[test]
    fn crew_mining_honours_the_doubled_cooldown() {
        let mut world = World::new();
        world.coins = 200;
        let mut events = Vec::new();
        apply(&mut world, Command::HireWorker, &mut events);
        let worker = query::crew_roster(&world)[0];

        events.clear();
        apply(&mut world, Command::CrewMine { worker }, &mut events);
        assert!(matches!(events[0], Event::OreBanked { .. }));

        // Cooldown has not elapsed yet: the command is silently dropped.
        events.clear();
        apply(&mut world, Command::CrewMine { worker }, &mut events);
        assert!(events.is_empty());

        tick(&mut world, Duration::from_millis(1_700));
        apply(&mut world, Command::CrewMine { worker }, &mut events);
        assert_eq!(events.len(), 1);
        assert_eq!(query::total_ore_count(&world), 2);
    }

    #[test]
    fn crew_mining_only_yields_common_kinds() {
        let mut world = World::new();
        world.coins = 200;
        let mut events = Vec::new();
        apply(&mut world, Command::HireWorker, &mut events);
        let worker = query::crew_roster(&world)[0];

        for _ in 0..50 {
            tick(&mut world, Duration::from_millis(1_700));
            apply(&mut world, Command::CrewMine { worker }, &mut events);
        }

        let stock = query::ore_stock(&world);
        let common = stock.count(OreKind::Amethyst) + stock.count(OreKind::Emerald);
        assert_eq!(common, query::total_ore_count(&world));
        assert!(common > 0);
    }

    #[test]
    fn crew_mining_pauses_while_resting() {
        let mut world = World::new();
        world.coins = 200;
        let mut events = Vec::new();
        apply(&mut world, Command::HireWorker, &mut events);
        let worker = query::crew_roster(&world)[0];
        world.cycle.phase = CrewPhase::Resting;

        events.clear();
        apply(&mut world, Command::CrewMine { worker }, &mut events);
        assert!(events.is_empty());
        assert_eq!(query::total_ore_count(&world), 0);
    }

    #[test]
    fn crew_deposits_stop_exactly_at_the_cap() {
        let mut world = World::new();
        world.coins = 1_300;
        let mut events = Vec::new();
        apply(&mut world, Command::HireWorker, &mut events);
        apply(&mut world, Command::HireWorker, &mut events);
        let roster = query::crew_roster(&world);
        world.ore_counts[OreKind::Obsidian.index()] = world.storage_cap() - 1;

        events.clear();
        apply(
            &mut world,
            Command::CrewMine { worker: roster[0] },
            &mut events,
        );
        apply(
            &mut world,
            Command::CrewMine { worker: roster[1] },
            &mut events,
        );

        assert!(matches!(events[0], Event::OreBanked { .. }));
        assert_eq!(
            events[1],
            Event::StorageFull {
                source: MineSource::Crew { worker: roster[1] }
            }
        );
        assert_eq!(query::total_ore_count(&world), world.storage_cap());
    }

    #[test]
    fn phase_flips_wait_for_the_full_duration() {
        let mut world = World::new();
        let mut events = Vec::new();

        tick(&mut world, Duration::from_secs(299));
        apply(&mut world, Command::FlipCrewPhase, &mut events);
        assert!(events.is_empty());
        assert_eq!(query::cycle_view(&world).phase, CrewPhase::Working);

        tick(&mut world, Duration::from_secs(1));
        apply(&mut world, Command::FlipCrewPhase, &mut events);
        assert_eq!(
            events,
            vec![Event::CrewPhaseChanged {
                phase: CrewPhase::Resting
            }]
        );

        events.clear();
        tick(&mut world, Duration::from_secs(900));
        apply(&mut world, Command::FlipCrewPhase, &mut events);
        assert_eq!(
            events,
            vec![Event::CrewPhaseChanged {
                phase: CrewPhase::Working
            }]
        );
    }

    #[test]
    fn work_phase_scales_with_stamina_level() {
        let mut world = World::new();
        world.stamina_level = 2;
        let mut events = Vec::new();

        tick(&mut world, Duration::from_secs(300));
        apply(&mut world, Command::FlipCrewPhase, &mut events);
        assert!(events.is_empty());

        tick(&mut world, Duration::from_secs(300));
        apply(&mut world, Command::FlipCrewPhase, &mut events);
        assert_eq!(
            events,
            vec![Event::CrewPhaseChanged {
                phase: CrewPhase::Resting
            }]
        );
    }

    #[test]
    fn skipping_rest_consumes_one_lightning_token() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(&mut world, Command::SkipRest, &mut events);
        assert_eq!(
            events,
            vec![Event::BoostRejected {
                reason: BoostError::NotResting
            }]
        );

        world.cycle.phase = CrewPhase::Resting;
        events.clear();
        apply(&mut world, Command::SkipRest, &mut events);
        assert_eq!(
            events,
            vec![Event::BoostRejected {
                reason: BoostError::OutOfLightning
            }]
        );

        world.lightning = 2;
        events.clear();
        apply(&mut world, Command::SkipRest, &mut events);
        assert_eq!(
            events,
            vec![
                Event::RestSkipped { remaining: 1 },
                Event::CrewPhaseChanged {
                    phase: CrewPhase::Working
                },
            ]
        );
        assert_eq!(query::lightning(&world), 1);
        assert_eq!(query::cycle_view(&world).phase, CrewPhase::Working);
    }

    #[test]
    fn ore_total_never_exceeds_the_cap_under_mixed_pressure() {
        let mut world = World::new();
        world.coins = 200;
        let mut events = Vec::new();
        apply(&mut world, Command::HireWorker, &mut events);
        let worker = query::crew_roster(&world)[0];
        world.ore_counts[OreKind::Amethyst.index()] = world.storage_cap() - 2;
        let (position, _) = first_tile_centre(&world);

        for _ in 0..40 {
            tick(&mut world, Duration::from_millis(1_700));
            apply(&mut world, Command::MineAt { position }, &mut events);
            apply(&mut world, Command::CrewMine { worker }, &mut events);
            assert!(query::total_ore_count(&world) <= world.storage_cap());
        }
        assert_eq!(query::total_ore_count(&world), world.storage_cap());
    }
}
