//! Identifier allocation and the authoritative entity store.

use crate::entity::Entity;
use simevo_core::EntityId;
use std::collections::BTreeMap;

/// Issues unique ids and owns every live entity, keyed by id.
///
/// Ids come from a counter that only moves forward, so a removed entity's id
/// is never handed out again. Iteration is in ascending id order.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    next: u64,
    entities: BTreeMap<EntityId, Entity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id.
    ///
    /// Panics if the id space is exhausted.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self
            .next
            .checked_add(1)
            .unwrap_or_else(|| panic!("entity id space exhausted after {}", id));
        id
    }

    /// Store an entity under its own id
    pub fn insert(&mut self, entity: Entity) {
        let id = entity.id();
        assert!(id.0 < self.next, "entity {} was not issued by this registry", id);
        let previous = self.entities.insert(id, entity);
        assert!(previous.is_none(), "entity {} registered twice", id);
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Live entities in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> + '_ {
        self.entities.values_mut()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of ids issued so far
    pub fn issued(&self) -> u64 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Tree;
    use simevo_core::Position;

    #[test]
    fn test_ids_strictly_increase() {
        let mut registry = EntityRegistry::new();
        let a = registry.next_id();
        let b = registry.next_id();
        let c = registry.next_id();
        assert!(a < b && b < c);
        assert_eq!(registry.issued(), 3);
    }

    #[test]
    fn test_ids_not_reused_after_removal() {
        let mut registry = EntityRegistry::new();
        let id = registry.next_id();
        registry.insert(Entity::Tree(Tree::new(id, Position::new(0, 0), 0)));
        assert!(registry.remove(id).is_some());
        assert!(!registry.contains(id));

        let next = registry.next_id();
        assert_ne!(next, id);
        assert!(next > id);
    }

    #[test]
    fn test_iteration_in_id_order() {
        let mut registry = EntityRegistry::new();
        let ids: Vec<EntityId> = (0..5).map(|_| registry.next_id()).collect();
        // Insert out of order
        for &id in ids.iter().rev() {
            registry.insert(Entity::Tree(Tree::new(id, Position::new(id.0 as i32, 0), 0)));
        }

        let seen: Vec<EntityId> = registry.iter().map(|e| e.id()).collect();
        assert_eq!(seen, ids);
    }

    #[test]
    #[should_panic]
    fn test_foreign_id_rejected() {
        let mut registry = EntityRegistry::new();
        registry.insert(Entity::Tree(Tree::new(EntityId(5), Position::new(0, 0), 0)));
    }
}
