//! Population statistics for logging and host reporting.

use crate::entity::Entity;
use serde::{Deserialize, Serialize};

/// Running totals kept by the world across ticks
#[derive(Debug, Clone, Default)]
pub(crate) struct Counters {
    pub births: u64,
    pub deaths: u64,
    pub saplings: u64,
    pub trees_eaten: u64,
}

/// Snapshot of the population after a tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationStats {
    pub tick: u64,
    pub trees: usize,
    pub animals: usize,
    pub births_total: u64,
    pub deaths_total: u64,
    pub saplings_total: u64,
    pub trees_eaten_total: u64,
    pub mean_energy: f64,
    pub mean_sensing_radius: f64,
    pub mean_reproduction_threshold: f64,
    pub mean_wander: f64,
    pub max_generation: u32,
}

impl PopulationStats {
    pub(crate) fn collect<'a>(
        tick: u64,
        entities: impl Iterator<Item = &'a Entity>,
        counters: &Counters,
    ) -> Self {
        let mut stats = Self {
            tick,
            births_total: counters.births,
            deaths_total: counters.deaths,
            saplings_total: counters.saplings,
            trees_eaten_total: counters.trees_eaten,
            ..Default::default()
        };

        for entity in entities {
            match entity {
                Entity::Tree(_) => stats.trees += 1,
                Entity::Animal(animal) => {
                    stats.animals += 1;
                    stats.mean_energy += animal.energy as f64;
                    stats.mean_sensing_radius += animal.traits.sensing_radius as f64;
                    stats.mean_reproduction_threshold +=
                        animal.traits.reproduction_threshold as f64;
                    stats.mean_wander += animal.traits.wander as f64;
                    stats.max_generation = stats.max_generation.max(animal.generation);
                }
            }
        }

        if stats.animals > 0 {
            let n = stats.animals as f64;
            stats.mean_energy /= n;
            stats.mean_sensing_radius /= n;
            stats.mean_reproduction_threshold /= n;
            stats.mean_wander /= n;
        }

        stats
    }

    pub fn population(&self) -> usize {
        self.trees + self.animals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Animal, Tree};
    use simevo_core::{EntityId, Position, Traits};

    #[test]
    fn test_collect_means() {
        let mut fast = Traits::default();
        fast.sensing_radius = 2;
        let mut slow = Traits::default();
        slow.sensing_radius = 4;

        let mut child = Animal::new(EntityId(2), Position::new(1, 0), 30, slow, 0);
        child.generation = 3;

        let entities = vec![
            Entity::Tree(Tree::new(EntityId(0), Position::new(0, 0), 0)),
            Entity::Animal(Animal::new(EntityId(1), Position::new(0, 1), 10, fast, 0)),
            Entity::Animal(child),
        ];
        let counters = Counters {
            births: 1,
            ..Default::default()
        };

        let stats = PopulationStats::collect(5, entities.iter(), &counters);
        assert_eq!(stats.tick, 5);
        assert_eq!(stats.trees, 1);
        assert_eq!(stats.animals, 2);
        assert_eq!(stats.population(), 3);
        assert_eq!(stats.births_total, 1);
        assert_eq!(stats.mean_energy, 20.0);
        assert_eq!(stats.mean_sensing_radius, 3.0);
        assert_eq!(stats.max_generation, 3);
    }

    #[test]
    fn test_empty_population() {
        let stats = PopulationStats::collect(0, std::iter::empty(), &Counters::default());
        assert_eq!(stats.animals, 0);
        assert_eq!(stats.mean_energy, 0.0);
    }
}
