//! World simulation engine.
//!
//! A bounded 2D grid where stationary trees spread and mobile animals sense,
//! move, feed, reproduce with heritable variation, and die. The host calls
//! [`World::update`] once per tick and reads [`World::entities`] in between.

pub mod entity;
pub mod grid;
pub mod mutation;
pub mod registry;
pub mod stats;
mod tick;
pub mod world;

pub use entity::{Animal, Entity, EntityView, Tree};
pub use grid::Grid;
pub use mutation::Mutator;
pub use registry::EntityRegistry;
pub use stats::PopulationStats;
pub use world::World;
