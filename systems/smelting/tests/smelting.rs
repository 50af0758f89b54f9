use std::time::Duration;

use orepit_core::{Command, Event, OreKind, SmoltenOreKind};
use orepit_system_smelting::Smelting;
use orepit_world::{self as world, query, scaffolding, World};

const TICK: Duration = Duration::from_millis(50);

fn pump(world: &mut World, system: &mut Smelting, events: &mut Vec<Event>) {
    let mut commands = Vec::new();
    system.handle(
        &query::furnace_view(world),
        &query::ore_stock(world),
        &mut commands,
    );
    for command in commands {
        world::apply(world, command, events);
    }
}

#[test]
fn furnace_drains_stock_rarest_first() {
    let mut world = World::new();
    scaffolding::grant_ore(&mut world, OreKind::Amethyst, 1);
    scaffolding::grant_ore(&mut world, OreKind::Garnet, 1);
    let mut system = Smelting::new();
    let mut events = Vec::new();

    pump(&mut world, &mut system, &mut events);

    assert!(events.contains(&Event::SmeltingStarted {
        kind: OreKind::Garnet,
        duration: query::furnace_view(&world).job().expect("charged").duration,
    }));
    assert_eq!(query::ore_stock(&world).count(OreKind::Garnet), 0);
    assert_eq!(query::ore_stock(&world).count(OreKind::Amethyst), 1);
}

#[test]
fn smelts_complete_and_the_next_charge_follows() {
    let mut world = World::new();
    scaffolding::grant_ore(&mut world, OreKind::Diamond, 2);
    let mut system = Smelting::new();
    let mut events = Vec::new();

    // First pump charges the furnace; ticks then carry the smelt to its end.
    pump(&mut world, &mut system, &mut events);
    for _ in 0..70 {
        world::apply(&mut world, Command::Tick { dt: TICK }, &mut events);
        pump(&mut world, &mut system, &mut events);
    }

    let completions = events
        .iter()
        .filter(|event| {
            matches!(
                event,
                Event::SmeltingCompleted {
                    smolten: SmoltenOreKind::Diamond,
                    ..
                }
            )
        })
        .count();
    assert_eq!(completions, 1);
    assert_eq!(
        query::smolten_stock(&world).count(SmoltenOreKind::Diamond),
        1
    );
    // The second unit went straight back into the slot.
    assert!(!query::furnace_view(&world).is_idle());
    assert_eq!(query::ore_stock(&world).count(OreKind::Diamond), 0);
}

#[test]
fn idle_furnace_waits_for_stock() {
    let mut world = World::new();
    let mut system = Smelting::new();
    let mut events = Vec::new();

    for _ in 0..10 {
        world::apply(&mut world, Command::Tick { dt: TICK }, &mut events);
        pump(&mut world, &mut system, &mut events);
    }

    assert!(query::furnace_view(&world).is_idle());
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::SmeltingStarted { .. })));
}
