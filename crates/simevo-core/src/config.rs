//! Configuration types for the simulation.

use crate::{Error, Result, Traits};
use serde::{Deserialize, Serialize};

/// World dimensions and seed population
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Width of the world grid
    pub width: i32,
    /// Height of the world grid
    pub height: i32,
    /// Number of trees scattered at construction
    pub initial_trees: usize,
    /// Number of animals scattered at construction
    pub initial_animals: usize,
}

impl WorldConfig {
    /// A world of the given size seeded with one tree per 20 cells and one
    /// animal per 100 cells
    pub fn sized(width: i32, height: i32) -> Self {
        let cells = width.max(0) as usize * height.max(0) as usize;
        Self {
            width,
            height,
            initial_trees: cells / 20,
            initial_animals: cells / 100,
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self::sized(128, 96)
    }
}

/// Tree growth and spreading
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Growth stage at which a tree may spawn saplings
    pub mature_stage: u32,
    /// Chance per tick that a mature tree spawns a sapling (0.0 to 1.0)
    pub spawn_probability: f64,
    /// Chebyshev radius searched for a vacant sapling cell
    pub spawn_radius: i32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            mature_stage: 10,
            spawn_probability: 0.04,
            spawn_radius: 2,
        }
    }
}

/// Animal energy economy and lifespan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimalConfig {
    /// Starting energy for seeded animals
    pub initial_energy: i32,
    /// Energy cap
    pub max_energy: i32,
    /// Energy lost every tick
    pub metabolism_cost: i32,
    /// Energy gained from eating one tree
    pub feeding_yield: i32,
    /// Energy the parent pays before splitting with its child
    pub reproduction_cost: i32,
    /// Animals older than this die regardless of energy
    pub max_age: u32,
    /// Traits given to seeded animals
    pub default_traits: Traits,
}

impl Default for AnimalConfig {
    fn default() -> Self {
        Self {
            initial_energy: 60,
            max_energy: 200,
            metabolism_cost: 1,
            feeding_yield: 40,
            reproduction_cost: 10,
            max_age: 400,
            default_traits: Traits::default(),
        }
    }
}

/// Magnitude and bounds of trait mutation at birth
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    /// Maximum change of the sensing radius per birth
    pub radius_step: i32,
    /// Maximum change of the reproduction threshold per birth
    pub threshold_step: i32,
    /// Maximum change of the wander bias per birth
    pub wander_step: f32,
    pub min_sensing_radius: i32,
    pub max_sensing_radius: i32,
    pub min_reproduction_threshold: i32,
    pub max_reproduction_threshold: i32,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            radius_step: 1,
            threshold_step: 8,
            wander_step: 0.05,
            min_sensing_radius: 1,
            max_sensing_radius: 8,
            min_reproduction_threshold: 80,
            max_reproduction_threshold: 200,
        }
    }
}

/// Full simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Ticks between population snapshots in the log (0 disables them)
    pub log_interval: u64,
    pub world: WorldConfig,
    pub trees: TreeConfig,
    pub animals: AnimalConfig,
    pub mutation: MutationConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            log_interval: 100,
            world: WorldConfig::default(),
            trees: TreeConfig::default(),
            animals: AnimalConfig::default(),
            mutation: MutationConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Default configuration for a world of the given size
    pub fn with_bounds(width: i32, height: i32) -> Self {
        Self {
            world: WorldConfig::sized(width, height),
            ..Default::default()
        }
    }

    /// Reject configurations the tick engine cannot run on
    pub fn validate(&self) -> Result<()> {
        let world = &self.world;
        if world.width <= 0 || world.height <= 0 {
            return Err(Error::InvalidBounds {
                width: world.width,
                height: world.height,
            });
        }

        let cells = world.width as u64 * world.height as u64;
        let seeded = world.initial_trees as u64 + world.initial_animals as u64;
        if seeded > cells {
            return Err(Error::Validation(format!(
                "seed population of {} does not fit in {} cells",
                seeded, cells
            )));
        }

        let trees = &self.trees;
        if !(0.0..=1.0).contains(&trees.spawn_probability) {
            return Err(Error::Validation(format!(
                "tree spawn probability {} is outside [0, 1]",
                trees.spawn_probability
            )));
        }
        if trees.spawn_radius < 1 {
            return Err(Error::Validation("tree spawn radius must be at least 1".into()));
        }

        let animals = &self.animals;
        if animals.initial_energy <= 0 || animals.initial_energy > animals.max_energy {
            return Err(Error::Validation(format!(
                "initial energy {} must be in (0, {}]",
                animals.initial_energy, animals.max_energy
            )));
        }
        if animals.metabolism_cost <= 0 {
            return Err(Error::Validation("metabolism cost must be positive".into()));
        }
        if animals.feeding_yield < 0 || animals.reproduction_cost < 0 {
            return Err(Error::Validation(
                "feeding yield and reproduction cost must not be negative".into(),
            ));
        }
        if animals.max_age == 0 {
            return Err(Error::Validation("animal max age must be positive".into()));
        }

        let mutation = &self.mutation;
        if mutation.radius_step < 0 || mutation.threshold_step < 0 {
            return Err(Error::Validation("mutation steps must not be negative".into()));
        }
        if !(mutation.wander_step >= 0.0 && mutation.wander_step.is_finite()) {
            return Err(Error::Validation(format!(
                "wander step {} must be a non-negative number",
                mutation.wander_step
            )));
        }
        if mutation.min_sensing_radius < 0
            || mutation.min_sensing_radius > mutation.max_sensing_radius
        {
            return Err(Error::Validation(format!(
                "sensing radius bounds [{}, {}] are invalid",
                mutation.min_sensing_radius, mutation.max_sensing_radius
            )));
        }
        if mutation.min_reproduction_threshold > mutation.max_reproduction_threshold {
            return Err(Error::Validation(format!(
                "reproduction threshold bounds [{}, {}] are inverted",
                mutation.min_reproduction_threshold, mutation.max_reproduction_threshold
            )));
        }
        // Animals must feed at least once before they can reproduce
        if mutation.min_reproduction_threshold <= animals.initial_energy {
            return Err(Error::Validation(format!(
                "minimum reproduction threshold {} must exceed initial energy {}",
                mutation.min_reproduction_threshold, animals.initial_energy
            )));
        }

        let traits = &animals.default_traits;
        if !(mutation.min_sensing_radius..=mutation.max_sensing_radius)
            .contains(&traits.sensing_radius)
            || !(mutation.min_reproduction_threshold..=mutation.max_reproduction_threshold)
                .contains(&traits.reproduction_threshold)
            || !(0.0..=1.0).contains(&traits.wander)
        {
            return Err(Error::Validation(format!(
                "default traits {:?} fall outside the mutation bounds",
                traits
            )));
        }

        Ok(())
    }
}

/// Headless host loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of ticks to run before reporting
    pub ticks: u64,
    /// Emit logs as JSON lines instead of human-readable text
    pub json_logs: bool,
    pub simulation: SimulationConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: 1_000,
            json_logs: false,
            simulation: SimulationConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs() {
        let config = SimulationConfig::default();
        assert_eq!(config.world.width, 128);
        assert_eq!(config.world.height, 96);
        assert_eq!(config.world.initial_trees, 614);
        assert_eq!(config.world.initial_animals, 122);
        assert_eq!(config.animals.initial_energy, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_bounds() {
        for (width, height) in [(0, 10), (10, 0), (-3, 5)] {
            let config = SimulationConfig::with_bounds(width, height);
            assert!(matches!(
                config.validate(),
                Err(Error::InvalidBounds { .. })
            ));
        }
    }

    #[test]
    fn test_small_worlds_are_valid() {
        for (width, height) in [(1, 1), (3, 2), (10, 10)] {
            assert!(SimulationConfig::with_bounds(width, height).validate().is_ok());
        }
    }

    #[test]
    fn test_overfull_seed_population() {
        let mut config = SimulationConfig::with_bounds(4, 4);
        config.world.initial_trees = 10;
        config.world.initial_animals = 7;
        assert!(matches!(config.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_threshold_must_exceed_initial_energy() {
        let mut config = SimulationConfig::default();
        config.mutation.min_reproduction_threshold = config.animals.initial_energy;
        assert!(matches!(config.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "seed": 7, "world": { "width": 20, "height": 10 } }"#;
        let config: SimulationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.world.width, 20);
        assert_eq!(config.world.initial_trees, WorldConfig::default().initial_trees);
        assert_eq!(config.animals.max_energy, 200);
    }

    #[test]
    fn test_run_config_serialization() {
        let run = RunConfig {
            ticks: 42,
            ..Default::default()
        };
        let json = serde_json::to_string(&run).unwrap();
        let deserialized: RunConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.ticks, 42);
        assert_eq!(deserialized.simulation.seed, run.simulation.seed);
        assert!(deserialized.simulation.validate().is_ok());
    }
}
