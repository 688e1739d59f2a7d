//! Per-tick update: aging, tree spreading, animal behavior and one commit pass.
//!
//! Every decision made during a tick reads the grid as it stood when the tick
//! began. Decisions are recorded as intents in a [`TickPlan`]; the grid and
//! the registry only change in [`World::commit`], after all intents have been
//! resolved. Entities act in ascending id order, and a contested cell goes to
//! the lowest id that asked for it.

use crate::entity::{Animal, Entity};
use crate::grid::Grid;
use crate::registry::EntityRegistry;
use crate::world::World;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use simevo_core::{EntityId, Position, Traits};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClaimKind {
    Move { from: Position },
    Sapling,
}

/// A request for a cell that was vacant (or held food) at the start of the tick
#[derive(Debug, Clone, Copy)]
struct Claim {
    target: Position,
    kind: ClaimKind,
}

#[derive(Debug, Clone, Copy)]
struct Birth {
    parent: EntityId,
    at: Position,
    energy: i32,
    traits: Traits,
    generation: u32,
}

#[derive(Debug, Default)]
struct TickPlan {
    /// Animals that act this tick, ascending
    active: BTreeSet<EntityId>,
    /// At most one move or sapling claim per actor
    claims: BTreeMap<EntityId, Claim>,
    /// Resolved moves: animal -> (from, to)
    moves: BTreeMap<EntityId, (Position, Position)>,
    /// Resolved saplings: (parent tree, cell)
    saplings: Vec<(EntityId, Position)>,
    /// Cells taken by a resolved move, sapling or birth
    claimed: HashSet<Position>,
    /// (tree, eater)
    eaten: Vec<(EntityId, EntityId)>,
    births: Vec<Birth>,
    dead: BTreeSet<EntityId>,
}

impl TickPlan {
    /// Grant `claim` unless a lower id already took its cell; a loser keeps
    /// its cell or skips its sapling
    fn resolve(&mut self, actor: EntityId, claim: Claim) {
        if !self.claimed.insert(claim.target) {
            trace!(
                actor = %actor,
                target = %claim.target,
                kind = ?claim.kind,
                "Claim lost to a lower id"
            );
            return;
        }

        match claim.kind {
            ClaimKind::Move { from } => {
                self.moves.insert(actor, (from, claim.target));
            }
            ClaimKind::Sapling => self.saplings.push((actor, claim.target)),
        }
    }
}

impl World {
    /// Advance the world by exactly one tick
    pub fn update(&mut self) {
        self.tick += 1;
        let mut plan = TickPlan::default();

        self.age_entities(&mut plan);
        self.propose_saplings(&mut plan);
        self.propose_moves(&mut plan);
        self.take_turns(&mut plan);
        self.commit(plan);

        self.log_population();
    }

    /// Age every entity; animals past their lifespan die without acting
    fn age_entities(&mut self, plan: &mut TickPlan) {
        let max_age = self.config.animals.max_age;

        for entity in self.registry.iter_mut() {
            entity.tick_age();
            if let Entity::Animal(animal) = entity {
                if animal.age > max_age {
                    plan.dead.insert(animal.id);
                } else {
                    plan.active.insert(animal.id);
                }
            }
        }
    }

    /// Grow trees and let mature ones ask for a sapling cell
    fn propose_saplings(&mut self, plan: &mut TickPlan) {
        let trees = &self.config.trees;

        for entity in self.registry.iter_mut() {
            let Entity::Tree(tree) = entity else {
                continue;
            };

            tree.grow(trees.mature_stage);
            if !tree.is_mature(trees.mature_stage) || !self.rng.gen_bool(trees.spawn_probability) {
                continue;
            }

            let vacant: Vec<Position> = self
                .grid
                .neighborhood(tree.position, trees.spawn_radius)
                .into_iter()
                .filter(|&cell| self.grid.is_vacant(cell))
                .collect();

            match vacant.choose(&mut self.rng) {
                Some(&target) => {
                    plan.claims.insert(
                        tree.id,
                        Claim {
                            target,
                            kind: ClaimKind::Sapling,
                        },
                    );
                }
                None => trace!(tree_id = %tree.id, "No room for a sapling"),
            }
        }
    }

    /// Sense food and pick the cell each animal wants to step into
    fn propose_moves(&mut self, plan: &mut TickPlan) {
        for &id in &plan.active {
            let Some(animal) = self.registry.get(id).and_then(Entity::as_animal) else {
                continue;
            };
            let from = animal.position;
            let traits = animal.traits;

            let wanders = traits.wander > 0.0 && self.rng.gen::<f32>() < traits.wander;
            let target = match nearest_food(&self.grid, &self.registry, from, traits.sensing_radius) {
                Some(food) if !wanders => step_toward(&self.grid, &self.registry, from, food),
                _ => random_step(&self.grid, from, &mut self.rng),
            };

            match target {
                Some(target) => {
                    plan.claims.insert(
                        id,
                        Claim {
                            target,
                            kind: ClaimKind::Move { from },
                        },
                    );
                }
                None => trace!(animal_id = %id, position = %from, "Animal stays put"),
            }
        }
    }

    /// Walk every actor in ascending id order. Each one resolves its claim and,
    /// if it is an animal, settles before the next id takes its turn, so a
    /// birth competes for cells on the same footing as moves and saplings.
    fn take_turns(&mut self, plan: &mut TickPlan) {
        let mut claims = std::mem::take(&mut plan.claims);
        let actors: BTreeSet<EntityId> = claims
            .keys()
            .chain(plan.active.iter())
            .copied()
            .collect();

        for id in actors {
            if let Some(claim) = claims.remove(&id) {
                plan.resolve(id, claim);
            }
            if plan.active.contains(&id) {
                self.settle_animal(id, plan);
            }
        }
    }

    /// Feed, burn energy, reproduce and mark the animal dead if it starved
    fn settle_animal(&mut self, id: EntityId, plan: &mut TickPlan) {
        let animals = &self.config.animals;

        let Some(Entity::Animal(animal)) = self.registry.get_mut(id) else {
            return;
        };

        let destination = match plan.moves.get(&id) {
            Some(&(_, to)) => {
                // Moves only target vacant cells or trees
                if let Some(tree_id) = self.grid.get(to) {
                    animal.add_energy(animals.feeding_yield, animals.max_energy);
                    plan.eaten.push((tree_id, id));
                }
                to
            }
            None => animal.position,
        };

        animal.consume_energy(animals.metabolism_cost);

        if animal.energy >= animal.traits.reproduction_threshold {
            let remaining = animal.energy - animals.reproduction_cost;
            let nursery: Vec<Position> = self
                .grid
                .adjacent(destination)
                .filter(|cell| self.grid.is_vacant(*cell) && !plan.claimed.contains(cell))
                .collect();

            match nursery.choose(&mut self.rng) {
                Some(&at) if remaining >= 2 => {
                    plan.claimed.insert(at);
                    let child_energy = remaining / 2;
                    animal.energy = remaining - child_energy;
                    animal.record_offspring();

                    plan.births.push(Birth {
                        parent: id,
                        at,
                        energy: child_energy,
                        traits: self.mutator.mutate(&animal.traits, &mut self.rng),
                        generation: animal.generation + 1,
                    });
                }
                _ => trace!(animal_id = %id, energy = animal.energy, "Reproduction skipped"),
            }
        }

        if !animal.is_alive() {
            plan.dead.insert(id);
        }
    }

    /// Apply every resolved intent to the grid and the registry
    fn commit(&mut self, plan: TickPlan) {
        for &(tree_id, eater) in &plan.eaten {
            if let Some(tree) = self.registry.remove(tree_id) {
                let vacated = self.grid.remove(tree.position());
                assert_eq!(vacated, Some(tree_id), "tree {} was not on the grid", tree_id);
                self.counters.trees_eaten += 1;
                debug!(tree_id = %tree_id, eater_id = %eater, tick = self.tick, "Tree eaten");
            }
        }

        // All movers vacate before any of them lands
        for (&id, &(from, _)) in &plan.moves {
            let vacated = self.grid.remove(from);
            assert_eq!(vacated, Some(id), "animal {} was not standing on {}", id, from);
        }
        for (&id, &(_, to)) in &plan.moves {
            self.grid.insert(to, id);
            if let Some(entity) = self.registry.get_mut(id) {
                entity.set_position(to);
            }
        }

        for &id in &plan.dead {
            let Some(entity) = self.registry.remove(id) else {
                continue;
            };
            let vacated = self.grid.remove(entity.position());
            assert_eq!(vacated, Some(id), "entity {} was not on the grid", id);
            self.counters.deaths += 1;

            if let Entity::Animal(animal) = &entity {
                debug!(
                    event = "animal_death",
                    animal_id = %id,
                    tick = self.tick,
                    age = animal.age,
                    energy = animal.energy,
                    generation = animal.generation,
                    offspring_count = animal.offspring_count,
                    "Animal died"
                );
            }
        }

        for (parent, at) in plan.saplings {
            let id = self.place_tree(at);
            self.counters.saplings += 1;
            trace!(tree_id = %id, parent_id = %parent, position = %at, "Sapling sprouted");
        }

        for birth in plan.births {
            let id = self.registry.next_id();
            let mut child = Animal::new(id, birth.at, birth.energy, birth.traits, self.tick);
            child.generation = birth.generation;

            self.grid.insert(birth.at, id);
            self.registry.insert(Entity::Animal(child));
            self.counters.births += 1;

            debug!(
                event = "animal_birth",
                animal_id = %id,
                parent_id = %birth.parent,
                tick = self.tick,
                energy = birth.energy,
                generation = birth.generation,
                sensing_radius = birth.traits.sensing_radius,
                reproduction_threshold = birth.traits.reproduction_threshold,
                wander = birth.traits.wander,
                "Animal born"
            );
        }
    }
}

/// Nearest tree within `radius`, by Manhattan distance then lowest id
fn nearest_food(
    grid: &Grid,
    registry: &EntityRegistry,
    from: Position,
    radius: i32,
) -> Option<Position> {
    grid.neighborhood(from, radius)
        .into_iter()
        .filter_map(|cell| {
            let id = grid.get(cell)?;
            registry.get(id)?.as_tree()?;
            Some((from.manhattan_distance(&cell), id, cell))
        })
        .min_by_key(|&(distance, id, _)| (distance, id))
        .map(|(_, _, cell)| cell)
}

/// One step toward `food`: diagonal first, then along x, then along y
fn step_toward(
    grid: &Grid,
    registry: &EntityRegistry,
    from: Position,
    food: Position,
) -> Option<Position> {
    let sx = (food.x - from.x).signum();
    let sy = (food.y - from.y).signum();

    [(sx, sy), (sx, 0), (0, sy)]
        .into_iter()
        .filter(|&step| step != (0, 0))
        .map(|(dx, dy)| from.offset(dx, dy))
        .find(|&cell| match grid.get(cell) {
            None => grid.is_vacant(cell),
            Some(id) => matches!(registry.get(id), Some(Entity::Tree(_))),
        })
}

/// A uniformly chosen vacant adjacent cell
fn random_step(grid: &Grid, from: Position, rng: &mut ChaCha8Rng) -> Option<Position> {
    let vacant: Vec<Position> = grid.adjacent(from).filter(|&cell| grid.is_vacant(cell)).collect();
    vacant.choose(rng).copied()
}
