//! The bounded world: occupancy grid, entity registry and the seeded RNG.

use crate::entity::{Animal, Entity, EntityView, Tree};
use crate::grid::Grid;
use crate::mutation::Mutator;
use crate::registry::EntityRegistry;
use crate::stats::{Counters, PopulationStats};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use simevo_core::{EntityId, Error, Position, Result, SimulationConfig, Traits};
use tracing::{debug, info, instrument};

pub struct World {
    pub(crate) config: SimulationConfig,
    pub(crate) grid: Grid,
    pub(crate) registry: EntityRegistry,
    pub(crate) mutator: Mutator,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) tick: u64,
    pub(crate) counters: Counters,
}

impl World {
    /// Build a `width` x `height` world with the default configuration and
    /// seed its initial population
    pub fn new(width: i32, height: i32) -> Result<Self> {
        Self::with_config(SimulationConfig::with_bounds(width, height))
    }

    /// Build a world from a full configuration and seed its initial population
    #[instrument(skip(config), fields(
        seed = config.seed,
        width = config.world.width,
        height = config.world.height
    ))]
    pub fn with_config(config: SimulationConfig) -> Result<Self> {
        let mut world = Self::empty(config)?;
        world.seed_population();

        info!(
            trees = world.config.world.initial_trees,
            animals = world.config.world.initial_animals,
            "World seeded"
        );

        Ok(world)
    }

    /// Build a validated world with no entities in it
    pub fn empty(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let grid = Grid::new(config.world.width, config.world.height);
        let mutator = Mutator::new(config.mutation.clone());

        Ok(Self {
            config,
            grid,
            registry: EntityRegistry::new(),
            mutator,
            rng,
            tick: 0,
            counters: Counters::default(),
        })
    }

    /// Scatter the configured seed population over distinct cells
    fn seed_population(&mut self) {
        let width = self.grid.width as usize;
        let cells = width * self.grid.height as usize;
        let trees = self.config.world.initial_trees;
        let total = trees + self.config.world.initial_animals;

        let picks = rand::seq::index::sample(&mut self.rng, cells, total);
        for (n, index) in picks.into_iter().enumerate() {
            let pos = Position::new((index % width) as i32, (index / width) as i32);
            if n < trees {
                self.place_tree(pos);
            } else {
                let traits = self.config.animals.default_traits;
                let energy = self.config.animals.initial_energy;
                self.place_animal(pos, traits, energy);
            }
        }
    }

    /// Place a tree on a vacant cell
    pub fn spawn_tree(&mut self, pos: Position) -> Result<EntityId> {
        self.check_vacant(pos)?;
        Ok(self.place_tree(pos))
    }

    /// Place an animal with the configured initial energy on a vacant cell
    pub fn spawn_animal(&mut self, pos: Position, traits: Traits) -> Result<EntityId> {
        let energy = self.config.animals.initial_energy;
        self.spawn_animal_with_energy(pos, traits, energy)
    }

    /// Place an animal with an explicit energy level on a vacant cell
    pub fn spawn_animal_with_energy(
        &mut self,
        pos: Position,
        traits: Traits,
        energy: i32,
    ) -> Result<EntityId> {
        self.check_vacant(pos)?;
        let max_energy = self.config.animals.max_energy;
        if energy <= 0 || energy > max_energy {
            return Err(Error::Validation(format!(
                "animal energy {} must be in (0, {}]",
                energy, max_energy
            )));
        }
        Ok(self.place_animal(pos, traits, energy))
    }

    fn check_vacant(&self, pos: Position) -> Result<()> {
        if !self.grid.in_bounds(pos) {
            return Err(Error::OutOfBounds(pos));
        }
        if !self.grid.is_vacant(pos) {
            return Err(Error::Occupied(pos));
        }
        Ok(())
    }

    pub(crate) fn place_tree(&mut self, pos: Position) -> EntityId {
        let id = self.registry.next_id();
        self.grid.insert(pos, id);
        self.registry.insert(Entity::Tree(Tree::new(id, pos, self.tick)));
        id
    }

    pub(crate) fn place_animal(&mut self, pos: Position, traits: Traits, energy: i32) -> EntityId {
        let id = self.registry.next_id();
        self.grid.insert(pos, id);
        self.registry
            .insert(Entity::Animal(Animal::new(id, pos, energy, traits, self.tick)));
        id
    }

    /// All live entities as `(position, kind, id)` views, in ascending id order.
    ///
    /// Each call starts a fresh pass over the current state.
    pub fn entities(&self) -> impl Iterator<Item = EntityView> + '_ {
        self.registry.iter().map(EntityView::from)
    }

    pub fn animals(&self) -> impl Iterator<Item = &Animal> + '_ {
        self.registry.iter().filter_map(Entity::as_animal)
    }

    pub fn trees(&self) -> impl Iterator<Item = &Tree> + '_ {
        self.registry.iter().filter_map(Entity::as_tree)
    }

    /// Entity standing on `pos`, if any
    pub fn get(&self, pos: Position) -> Option<&Entity> {
        self.grid.get(pos).and_then(|id| self.registry.get(id))
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.registry.get(id)
    }

    pub fn width(&self) -> i32 {
        self.grid.width
    }

    pub fn height(&self) -> i32 {
        self.grid.height
    }

    /// Number of ticks completed
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// No animals left; trees alone cannot bring them back
    pub fn is_extinct(&self) -> bool {
        self.animals().next().is_none()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn stats(&self) -> PopulationStats {
        PopulationStats::collect(self.tick, self.registry.iter(), &self.counters)
    }

    /// Emit a population snapshot every `log_interval` ticks
    pub(crate) fn log_population(&self) {
        let interval = self.config.log_interval;
        if interval == 0 || self.tick % interval != 0 {
            debug!(tick = self.tick, population = self.registry.len(), "Tick complete");
            return;
        }

        let stats = self.stats();
        info!(
            event = "population_metrics",
            tick = stats.tick,
            trees = stats.trees,
            animals = stats.animals,
            births_total = stats.births_total,
            deaths_total = stats.deaths_total,
            trees_eaten_total = stats.trees_eaten_total,
            mean_energy = stats.mean_energy,
            mean_sensing_radius = stats.mean_sensing_radius,
            mean_reproduction_threshold = stats.mean_reproduction_threshold,
            mean_wander = stats.mean_wander,
            max_generation = stats.max_generation,
            "Population metrics snapshot"
        );
    }
}
