use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use orepit_core::{Command, Event, MineSource, OreKind};
use orepit_system_crew_mining::CrewMining;
use orepit_world::{self as world, query, save, scaffolding, World};

#[test]
fn deterministic_replay_produces_identical_sessions() {
    let (first, first_world) = replay();
    let (second, second_world) = replay();

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert_eq!(save::capture(&first_world), save::capture(&second_world));
}

fn replay() -> (ReplayOutcome, World) {
    let mut world = World::new();
    let mut mining = CrewMining::new();
    let mut log = Vec::new();

    scaffolding::grant_coins(&mut world, 2_000);
    let mut events = Vec::new();
    world::apply(&mut world, Command::HireWorker, &mut events);
    world::apply(&mut world, Command::HireWorker, &mut events);
    record_events(&events, &mut log);

    for _ in 0..200 {
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(50),
            },
            &mut events,
        );

        let storage = query::storage(&world);
        let mut commands = Vec::new();
        mining.handle(
            query::cycle_view(&world).phase,
            query::crew_cooldowns(&world),
            storage.cap.saturating_sub(storage.used),
            &mut commands,
        );
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
        record_events(&events, &mut log);
    }

    let stock = query::ore_stock(&world);
    let counts = OreKind::ALL
        .iter()
        .map(|kind| (*kind, stock.count(*kind)))
        .collect();

    (
        ReplayOutcome {
            counts,
            events: log,
        },
        world,
    )
}

fn record_events(events: &[Event], log: &mut Vec<EventRecord>) {
    log.extend(events.iter().filter_map(EventRecord::from));
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    counts: Vec<(OreKind, u32)>,
    events: Vec<EventRecord>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum EventRecord {
    TimeAdvanced { dt_micros: u128 },
    WorkerHired { worker: u32, cost: u64 },
    OreBanked { kind: OreKind, worker: u32 },
    StorageFull { worker: u32 },
}

impl EventRecord {
    fn from(event: &Event) -> Option<Self> {
        match event {
            Event::TimeAdvanced { dt } => Some(Self::TimeAdvanced {
                dt_micros: dt.as_micros(),
            }),
            Event::WorkerHired { worker, cost } => Some(Self::WorkerHired {
                worker: worker.get(),
                cost: *cost,
            }),
            Event::OreBanked {
                kind,
                source: MineSource::Crew { worker },
            } => Some(Self::OreBanked {
                kind: *kind,
                worker: worker.get(),
            }),
            Event::StorageFull {
                source: MineSource::Crew { worker },
            } => Some(Self::StorageFull {
                worker: worker.get(),
            }),
            _ => None,
        }
    }
}
