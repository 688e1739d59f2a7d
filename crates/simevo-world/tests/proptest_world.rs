//! Property tests for the tick engine.
//!
//! These tests use `proptest` to generate random world shapes, seeds and tick
//! counts, and verify that the world invariants hold after every tick.

use proptest::prelude::*;
use simevo_core::{EntityId, EntityKind, Position, SimulationConfig};
use simevo_world::{EntityView, World};
use std::collections::{HashMap, HashSet};

/// A small, crowded world so that contention actually happens
fn crowded_config(seed: u64, width: i32, height: i32) -> SimulationConfig {
    let cells = (width * height) as usize;
    let mut config = SimulationConfig::with_bounds(width, height);
    config.seed = seed;
    config.log_interval = 0;
    config.world.initial_trees = cells / 4;
    config.world.initial_animals = cells / 8;
    config.trees.mature_stage = 2;
    config.trees.spawn_probability = 0.3;
    config
}

fn config_strategy() -> impl Strategy<Value = SimulationConfig> {
    (any::<u64>(), 3..24i32, 3..24i32)
        .prop_map(|(seed, width, height)| crowded_config(seed, width, height))
}

fn snapshot(world: &World) -> Vec<EntityView> {
    world.entities().collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn ticks_preserve_world_invariants(config in config_strategy(), ticks in 1..60usize) {
        let max_energy = config.animals.max_energy;
        let mut world = World::with_config(config).unwrap();
        let mut kinds: HashMap<EntityId, EntityKind> = world.entities().map(|e| (e.id, e.kind)).collect();
        let mut highest = kinds.keys().max().copied();

        for _ in 0..ticks {
            world.update();
            let views = snapshot(&world);

            // Boundedness and one occupant per cell
            let mut cells = HashSet::new();
            for view in &views {
                prop_assert!(view.position.in_bounds(world.width(), world.height()));
                prop_assert!(cells.insert(view.position), "two entities on {}", view.position);
                prop_assert_eq!(world.get(view.position).map(|e| e.id()), Some(view.id));
            }

            // Ids keep their kind while alive and are never handed out twice
            let mut next_kinds = HashMap::new();
            for view in &views {
                match kinds.get(&view.id) {
                    Some(kind) => prop_assert_eq!(*kind, view.kind),
                    None => prop_assert!(highest.map_or(true, |h| view.id > h)),
                }
                next_kinds.insert(view.id, view.kind);
            }
            highest = highest.max(next_kinds.keys().max().copied());
            kinds = next_kinds;

            // Live animals have positive energy within the cap
            for animal in world.animals() {
                prop_assert!(animal.energy > 0);
                prop_assert!(animal.energy <= max_energy);
                prop_assert!(animal.age <= world.config().animals.max_age);
            }
        }
    }

    #[test]
    fn no_food_means_no_growth(seed in any::<u64>(), size in 4..20i32, ticks in 1..80usize) {
        let mut config = crowded_config(seed, size, size);
        config.world.initial_trees = 0;
        config.world.initial_animals = (size * size / 3) as usize;
        let mut world = World::with_config(config).unwrap();

        let mut population = world.animals().count();
        for _ in 0..ticks {
            world.update();
            let now = world.animals().count();
            prop_assert!(now <= population);
            prop_assert_eq!(world.trees().count(), 0);
            population = now;
        }
    }

    #[test]
    fn same_seed_same_history(config in config_strategy(), ticks in 1..40usize) {
        let mut a = World::with_config(config.clone()).unwrap();
        let mut b = World::with_config(config).unwrap();
        prop_assert_eq!(snapshot(&a), snapshot(&b));

        for _ in 0..ticks {
            a.update();
            b.update();
            prop_assert_eq!(snapshot(&a), snapshot(&b));
        }
    }
}

#[test]
fn grazer_enters_tree_cell_and_feeds() {
    let mut config = SimulationConfig::with_bounds(10, 10);
    config.log_interval = 0;
    config.animals.default_traits.sensing_radius = 3;
    config.animals.default_traits.wander = 0.0;
    let traits = config.animals.default_traits;
    let animals = config.animals.clone();

    let mut world = World::empty(config).unwrap();
    let tree = world.spawn_tree(Position::new(5, 5)).unwrap();
    let grazer = world.spawn_animal(Position::new(5, 6), traits).unwrap();

    world.update();

    assert!(world.entity(tree).is_none());
    let state = world.entity(grazer).and_then(|e| e.as_animal()).unwrap();
    assert_eq!(state.position, Position::new(5, 5));
    assert_eq!(
        state.energy,
        (animals.initial_energy + animals.feeding_yield).min(animals.max_energy)
            - animals.metabolism_cost
    );
    assert_eq!(world.len(), 1);
}

#[test]
fn offspring_traits_vary_but_stay_close() {
    let mut config = SimulationConfig::with_bounds(30, 30);
    config.log_interval = 0;
    let parent_traits = config.animals.default_traits;
    let mutation = config.mutation.clone();
    let max_energy = config.animals.max_energy;

    let mut thresholds = Vec::new();
    for seed in 0..200u64 {
        let mut config = config.clone();
        config.seed = seed;
        let mut world = World::empty(config).unwrap();
        let parent = world
            .spawn_animal_with_energy(Position::new(15, 15), parent_traits, max_energy)
            .unwrap();
        world.update();

        let child = world.animals().find(|a| a.id != parent).unwrap();
        assert_eq!(child.generation, 1);
        assert!(
            (child.traits.sensing_radius - parent_traits.sensing_radius).abs()
                <= mutation.radius_step
        );
        assert!(
            (child.traits.reproduction_threshold - parent_traits.reproduction_threshold).abs()
                <= mutation.threshold_step
        );
        assert!((child.traits.wander - parent_traits.wander).abs() <= mutation.wander_step + 1e-6);
        thresholds.push(child.traits.reproduction_threshold as f64);
    }

    let mean = thresholds.iter().sum::<f64>() / thresholds.len() as f64;
    let variance =
        thresholds.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / thresholds.len() as f64;
    assert!(variance > 0.0);
}

#[test]
fn long_run_with_defaults_stays_consistent() {
    let mut world = World::new(64, 48).unwrap();
    for _ in 0..300 {
        world.update();
    }
    let stats = world.stats();
    assert_eq!(stats.tick, 300);
    assert_eq!(stats.population(), world.len());
    assert_eq!(stats.trees, world.trees().count());
}
