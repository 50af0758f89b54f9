//! Interactive session loop.
//!
//! Two event sources feed one single-threaded dispatcher: the fixed-cadence
//! tick that drives the furnace and crew systems, and the stdin reader that
//! carries discrete player actions. Both produce [`Command`] values applied
//! through the world's single `apply` entry point, and the snapshot is
//! persisted after every mutation.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use orepit_core::{
    BoostError, Command, CrewPhase, Event, HireError, MineSource, OreKind, PurchaseError,
    SmoltenOreKind, TileCoord, UpgradeKind,
};
use orepit_system_crew_cycle::CrewCycle;
use orepit_system_crew_mining::CrewMining;
use orepit_system_smelting::Smelting;
use orepit_world::{self as world, query, World};

use crate::config::SessionManifest;
use crate::snapshot;

/// One mining session: the world, its systems, and the persistence target.
pub(crate) struct Session {
    world: World,
    manifest: SessionManifest,
    save_path: PathBuf,
    smelting: Smelting,
    cycle: CrewCycle,
    mining: CrewMining,
}

impl Session {
    /// Creates a session around an existing world.
    pub(crate) fn new(world: World, manifest: SessionManifest, save_path: PathBuf) -> Self {
        Self {
            world,
            manifest,
            save_path,
            smelting: Smelting::new(),
            cycle: CrewCycle::new(),
            mining: CrewMining::new(),
        }
    }

    /// Runs the fixed-cadence interactive loop until the player quits.
    pub(crate) fn run_interactive(mut self) -> Result<()> {
        println!("{}", query::welcome_banner(&self.world));
        println!("type 'help' for the action list");
        let actions = spawn_stdin_reader();
        let interval = self.manifest.tick_interval();

        loop {
            thread::sleep(interval);
            self.advance(interval);

            loop {
                match actions.try_recv() {
                    Ok(line) => {
                        if !self.dispatch_line(&line) {
                            self.save_now();
                            println!("session saved; goodbye");
                            return Ok(());
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        self.save_now();
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Advances the provided number of ticks without sleeping, then exits.
    pub(crate) fn run_headless(mut self, ticks: u64) -> Result<()> {
        let interval = self.manifest.tick_interval();
        for _ in 0..ticks {
            self.advance(interval);
        }
        self.print_status();
        snapshot::store(&self.save_path, &self.world)?;
        Ok(())
    }

    /// Applies one tick, pumps the systems, and settles the fallout.
    fn advance(&mut self, dt: Duration) {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);
        self.pump_systems(&mut events);
        self.settle(&events);
    }

    fn pump_systems(&mut self, events: &mut Vec<Event>) {
        let mut commands = Vec::new();
        self.smelting.handle(
            &query::furnace_view(&self.world),
            &query::ore_stock(&self.world),
            &mut commands,
        );
        self.cycle
            .handle(&query::cycle_view(&self.world), &mut commands);
        let storage = query::storage(&self.world);
        self.mining.handle(
            query::cycle_view(&self.world).phase,
            query::crew_cooldowns(&self.world),
            storage.cap.saturating_sub(storage.used),
            &mut commands,
        );
        for command in commands {
            world::apply(&mut self.world, command, events);
        }
    }

    /// Reports notable events and persists the snapshot after mutations.
    fn settle(&mut self, events: &[Event]) {
        for event in events {
            if let Some(line) = describe(event) {
                println!("{line}");
            }
        }
        let mutated = events
            .iter()
            .any(|event| !matches!(event, Event::TimeAdvanced { .. }));
        if mutated && self.manifest.autosave() {
            self.save_now();
        }
    }

    fn save_now(&self) {
        if let Err(error) = snapshot::store(&self.save_path, &self.world) {
            eprintln!("warning: failed to persist snapshot: {error}");
        }
    }

    /// Handles one input line; returns `false` when the player quits.
    fn dispatch_line(&mut self, line: &str) -> bool {
        if line.trim().is_empty() {
            return true;
        }
        match parse_action(line) {
            Action::Dispatch(command) => {
                let mut events = Vec::new();
                world::apply(&mut self.world, command, &mut events);
                self.settle(&events);
            }
            Action::Status => self.print_status(),
            Action::Field => self.print_field(),
            Action::Help => print_help(),
            Action::Quit => return false,
            Action::Unknown => println!("unrecognised action; type 'help'"),
        }
        true
    }

    fn print_status(&self) {
        let storage = query::storage(&self.world);
        println!(
            "coins {}  lightning {}  storage {}/{} (lv{})",
            query::coins(&self.world),
            query::lightning(&self.world),
            storage.used,
            storage.cap,
            storage.level,
        );

        let raw = query::ore_stock(&self.world);
        let smolten = query::smolten_stock(&self.world);
        for kind in OreKind::ALL {
            println!(
                "  {:<9} raw {:>4}  smolten {:>4}",
                format!("{kind:?}"),
                raw.count(kind),
                smolten.count(kind.smolten()),
            );
        }

        match query::furnace_view(&self.world).job() {
            Some(job) => println!(
                "furnace lv{}: smelting {:?}, {:.0}% ({:.1}s left)",
                query::furnace_level(&self.world),
                job.kind,
                f64::from(job.progress()) * 100.0,
                job.duration.saturating_sub(job.elapsed).as_secs_f64(),
            ),
            None => println!(
                "furnace lv{}: idle, waiting for ore",
                query::furnace_level(&self.world)
            ),
        }

        let pickaxe = query::pickaxe(&self.world);
        println!(
            "pickaxe lv{}: swing every {}ms, next upgrade {} coins",
            pickaxe.level,
            pickaxe.cooldown.as_millis(),
            pickaxe.next_cost,
        );

        let roster = query::crew_roster(&self.world);
        let cycle = query::cycle_view(&self.world);
        if roster.is_empty() {
            println!("crew: nobody hired yet");
        } else {
            let phase = match cycle.phase {
                CrewPhase::Working => "working",
                CrewPhase::Resting => "resting",
            };
            println!(
                "crew: {} worker(s), {phase}, {} until the phase flips, stamina lv{}",
                roster.len(),
                format_clock(cycle.remaining()),
                query::stamina_level(&self.world),
            );
        }
    }

    fn print_field(&self) {
        let view = query::field_view(&self.world);
        let mut rows = vec![String::new(); view.side() as usize];
        for tile in view.iter() {
            let row = &mut rows[tile.tile.row() as usize];
            row.push(initial(tile.kind));
            row.push(char::from(b'0' + tile.hits.min(9)));
            row.push(' ');
        }
        for row in rows {
            println!("{row}");
        }
    }
}

enum Action {
    Dispatch(Command),
    Status,
    Field,
    Help,
    Quit,
    Unknown,
}

/// Parses one stdin line into a session action.
fn parse_action(line: &str) -> Action {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Action::Unknown;
    };

    match head {
        "mine" => {
            let column = parts.next().and_then(|part| part.parse::<u32>().ok());
            let row = parts.next().and_then(|part| part.parse::<u32>().ok());
            match (column, row) {
                (Some(column), Some(row)) => Action::Dispatch(Command::MineAt {
                    position: query::tile_centre(TileCoord::new(column, row)),
                }),
                _ => Action::Unknown,
            }
        }
        "click" => {
            let x = parts.next().and_then(|part| part.parse::<f32>().ok());
            let y = parts.next().and_then(|part| part.parse::<f32>().ok());
            match (x, y) {
                (Some(x), Some(y)) => Action::Dispatch(Command::MineAt {
                    position: orepit_core::FieldPoint::new(x, y),
                }),
                _ => Action::Unknown,
            }
        }
        "upgrade" => match parts.next() {
            Some("pickaxe") => Action::Dispatch(Command::UpgradePickaxe),
            Some("storage") => Action::Dispatch(Command::UpgradeStorage),
            Some("furnace") => Action::Dispatch(Command::UpgradeFurnace),
            Some("stamina") => Action::Dispatch(Command::UpgradeStamina),
            _ => Action::Unknown,
        },
        "hire" => Action::Dispatch(Command::HireWorker),
        "sell" => Action::Dispatch(Command::SellAllSmolten),
        "boost" => Action::Dispatch(Command::SkipRest),
        "status" => Action::Status,
        "field" => Action::Field,
        "help" => Action::Help,
        "quit" | "exit" => Action::Quit,
        _ => Action::Unknown,
    }
}

fn print_help() {
    println!("actions:");
    println!("  mine <col> <row>      swing the pickaxe at a tile");
    println!("  click <x> <y>         swing at raw field coordinates");
    println!("  upgrade pickaxe|storage|furnace|stamina");
    println!("  hire                  hire one worker");
    println!("  sell                  sell the smolten inventory");
    println!("  boost                 spend lightning to skip a rest");
    println!("  status | field | help | quit");
}

/// Spawns the stdin reader that feeds player actions into the dispatcher.
fn spawn_stdin_reader() -> Receiver<String> {
    let (sender, receiver) = mpsc::channel();
    let _ = thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if sender.send(line).is_err() {
                    break;
                }
            }
        });
    receiver
}

/// Formats a duration the way the phase countdown is displayed, `m:ss`.
fn format_clock(duration: Duration) -> String {
    let total_seconds = duration.as_millis().div_ceil(1_000);
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

fn initial(kind: OreKind) -> char {
    match kind {
        OreKind::Amethyst => 'A',
        OreKind::Emerald => 'E',
        OreKind::Obsidian => 'O',
        OreKind::Ruby => 'R',
        OreKind::Diamond => 'D',
        OreKind::Garnet => 'G',
    }
}

fn upgrade_label(upgrade: UpgradeKind) -> &'static str {
    match upgrade {
        UpgradeKind::Pickaxe => "pickaxe",
        UpgradeKind::Storage => "storage",
        UpgradeKind::Furnace => "furnace",
        UpgradeKind::Stamina => "stamina",
    }
}

/// Renders an event as a player-facing line; `None` for silent events.
fn describe(event: &Event) -> Option<String> {
    match event {
        Event::TimeAdvanced { .. } | Event::TileCracked { .. } | Event::TileBroken { .. } => None,
        Event::OreBanked { kind, source } => Some(match source {
            MineSource::Pickaxe => format!("+1 {kind:?}"),
            MineSource::Crew { worker } => format!("+1 {kind:?} (worker {})", worker.get()),
        }),
        Event::StorageFull { .. } => Some("storage full!".to_owned()),
        Event::LightningFound { total } => Some(format!("lightning! ({total} stored)")),
        Event::SmeltingStarted { kind, .. } => Some(format!("furnace: smelting {kind:?}")),
        Event::SmeltingCompleted { smolten, .. } => {
            Some(format!("furnace: {} ready", smolten_label(*smolten)))
        }
        Event::CrewPhaseChanged { phase } => Some(match phase {
            CrewPhase::Working => "crew: back to work".to_owned(),
            CrewPhase::Resting => "crew: resting".to_owned(),
        }),
        Event::WorkerHired { worker, cost } => {
            Some(format!("hired worker {} for {cost} coins", worker.get()))
        }
        Event::HireRejected { reason } => Some(match reason {
            HireError::RosterFull => "the crew is already full".to_owned(),
            HireError::InsufficientCoins => "not enough coins to hire".to_owned(),
        }),
        Event::UpgradePurchased {
            upgrade,
            level,
            cost,
        } => Some(format!(
            "{} upgraded to lv{level} for {cost} coins",
            upgrade_label(*upgrade)
        )),
        Event::UpgradeRejected { upgrade, reason } => Some(match reason {
            PurchaseError::InsufficientCoins => format!(
                "not enough coins for the {} upgrade",
                upgrade_label(*upgrade)
            ),
            PurchaseError::MaxLevel => {
                format!("{} is already at max level", upgrade_label(*upgrade))
            }
        }),
        Event::SmoltenSold { coins } => Some(format!("sold the smolten stock for {coins} coins")),
        Event::RestSkipped { remaining } => {
            Some(format!("rest skipped ({remaining} lightning left)"))
        }
        Event::BoostRejected { reason } => Some(match reason {
            BoostError::NotResting => "the crew is not resting".to_owned(),
            BoostError::OutOfLightning => "no lightning stored".to_owned(),
        }),
    }
}

fn smolten_label(kind: SmoltenOreKind) -> String {
    format!("smolten {:?}", kind.raw())
}
