use std::time::Duration;

use orepit_core::{Command, Event, MineSource, OreKind};
use orepit_system_crew_mining::CrewMining;
use orepit_world::{self as world, query, scaffolding, World};

const TICK: Duration = Duration::from_millis(50);

fn pump(world: &mut World, system: &mut CrewMining, events: &mut Vec<Event>) {
    let mut commands = Vec::new();
    let storage = query::storage(world);
    system.handle(
        query::cycle_view(world).phase,
        query::crew_cooldowns(world),
        storage.cap.saturating_sub(storage.used),
        &mut commands,
    );
    for command in commands {
        world::apply(world, command, events);
    }
}

fn hire(world: &mut World, events: &mut Vec<Event>) {
    scaffolding::grant_coins(world, 10_000);
    world::apply(world, Command::HireWorker, events);
}

#[test]
fn workers_bank_common_ore_on_their_cooldown_cadence() {
    let mut world = World::new();
    let mut system = CrewMining::new();
    let mut events = Vec::new();
    hire(&mut world, &mut events);
    hire(&mut world, &mut events);

    events.clear();
    for _ in 0..100 {
        world::apply(&mut world, Command::Tick { dt: TICK }, &mut events);
        pump(&mut world, &mut system, &mut events);
    }

    // Five seconds with a 1.6 s cooldown: both workers land their first
    // mine immediately and then three more on the cadence.
    let banked = events
        .iter()
        .filter(|event| {
            matches!(
                event,
                Event::OreBanked {
                    source: MineSource::Crew { .. },
                    ..
                }
            )
        })
        .count();
    assert_eq!(banked, 8);

    let stock = query::ore_stock(&world);
    assert_eq!(
        stock.count(OreKind::Amethyst) + stock.count(OreKind::Emerald),
        query::total_ore_count(&world)
    );
}

#[test]
fn deposits_stop_at_the_storage_cap() {
    let mut world = World::new();
    let mut system = CrewMining::new();
    let mut events = Vec::new();
    hire(&mut world, &mut events);
    hire(&mut world, &mut events);

    let cap = query::storage(&world).cap;
    scaffolding::grant_ore(&mut world, OreKind::Ruby, cap - 1);

    events.clear();
    pump(&mut world, &mut system, &mut events);

    // One free slot: the system only scheduled a single worker.
    assert_eq!(query::total_ore_count(&world), cap);
    let banked = events
        .iter()
        .filter(|event| matches!(event, Event::OreBanked { .. }))
        .count();
    assert_eq!(banked, 1);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::StorageFull { .. })));
}
