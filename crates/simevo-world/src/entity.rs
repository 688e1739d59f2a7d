//! Entity state: trees and animals in one homogeneous store.

use serde::{Deserialize, Serialize};
use simevo_core::{EntityId, EntityKind, Position, Traits};

/// A stationary food source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub id: EntityId,
    pub position: Position,
    pub age: u32,
    pub growth_stage: u32,
    pub birth_tick: u64,
}

impl Tree {
    pub fn new(id: EntityId, position: Position, birth_tick: u64) -> Self {
        Self {
            id,
            position,
            age: 0,
            growth_stage: 0,
            birth_tick,
        }
    }

    /// Advance growth by one stage, stopping at `mature_stage`
    pub fn grow(&mut self, mature_stage: u32) {
        self.growth_stage = (self.growth_stage + 1).min(mature_stage);
    }

    pub fn is_mature(&self, mature_stage: u32) -> bool {
        self.growth_stage >= mature_stage
    }
}

/// A mobile, energy-consuming entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animal {
    pub id: EntityId,
    pub position: Position,
    pub energy: i32,
    pub age: u32,
    pub traits: Traits,
    /// 0 for the seeded population, parent's generation + 1 for offspring
    pub generation: u32,
    pub offspring_count: u32,
    pub birth_tick: u64,
}

impl Animal {
    pub fn new(id: EntityId, position: Position, energy: i32, traits: Traits, birth_tick: u64) -> Self {
        Self {
            id,
            position,
            energy,
            age: 0,
            traits,
            generation: 0,
            offspring_count: 0,
            birth_tick,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.energy > 0
    }

    /// Add energy without exceeding `cap`
    pub fn add_energy(&mut self, amount: i32, cap: i32) {
        self.energy = self.energy.saturating_add(amount).min(cap);
    }

    pub fn consume_energy(&mut self, amount: i32) {
        self.energy = self.energy.saturating_sub(amount);
    }

    pub fn record_offspring(&mut self) {
        self.offspring_count += 1;
    }
}

/// An entity occupying exactly one cell of the world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Entity {
    Tree(Tree),
    Animal(Animal),
}

impl Entity {
    pub fn id(&self) -> EntityId {
        match self {
            Entity::Tree(tree) => tree.id,
            Entity::Animal(animal) => animal.id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Tree(_) => EntityKind::Tree,
            Entity::Animal(_) => EntityKind::Animal,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Entity::Tree(tree) => tree.position,
            Entity::Animal(animal) => animal.position,
        }
    }

    pub fn age(&self) -> u32 {
        match self {
            Entity::Tree(tree) => tree.age,
            Entity::Animal(animal) => animal.age,
        }
    }

    pub fn tick_age(&mut self) {
        match self {
            Entity::Tree(tree) => tree.age += 1,
            Entity::Animal(animal) => animal.age += 1,
        }
    }

    pub fn as_tree(&self) -> Option<&Tree> {
        match self {
            Entity::Tree(tree) => Some(tree),
            Entity::Animal(_) => None,
        }
    }

    pub fn as_animal(&self) -> Option<&Animal> {
        match self {
            Entity::Animal(animal) => Some(animal),
            Entity::Tree(_) => None,
        }
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        match self {
            Entity::Tree(tree) => tree.position = position,
            Entity::Animal(animal) => animal.position = position,
        }
    }
}

/// Read-only view handed to consumers of the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityView {
    pub position: Position,
    pub kind: EntityKind,
    pub id: EntityId,
}

impl From<&Entity> for EntityView {
    fn from(entity: &Entity) -> Self {
        Self {
            position: entity.position(),
            kind: entity.kind(),
            id: entity.id(),
        }
    }
}
