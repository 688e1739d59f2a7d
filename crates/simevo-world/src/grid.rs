//! Bounded occupancy grid mapping positions to the entity standing there.

use simevo_core::{Direction, EntityId, Position};

/// A 2D bounded grid of optional occupants
#[derive(Debug, Clone)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    cells: Vec<Option<EntityId>>,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        let size = (width as usize) * (height as usize);
        Self {
            width,
            height,
            cells: vec![None; size],
        }
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.in_bounds(self.width, self.height)
    }

    /// Occupant at position, `None` for vacant or out-of-bounds cells
    pub fn get(&self, pos: Position) -> Option<EntityId> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.cells[self.pos_to_index(pos)]
    }

    /// A cell is vacant when it is inside the world and nobody stands on it
    pub fn is_vacant(&self, pos: Position) -> bool {
        self.in_bounds(pos) && self.cells[self.pos_to_index(pos)].is_none()
    }

    /// Place an entity on a vacant cell.
    ///
    /// Panics if the cell is out of bounds or occupied: the tick engine only
    /// commits placements it has already resolved.
    pub fn insert(&mut self, pos: Position, id: EntityId) {
        assert!(self.in_bounds(pos), "entity {} placed outside the world at {}", id, pos);
        let index = self.pos_to_index(pos);
        if let Some(existing) = self.cells[index] {
            panic!("entity {} placed on {} which is held by {}", id, pos, existing);
        }
        self.cells[index] = Some(id);
    }

    /// Vacate a cell, returning its former occupant
    pub fn remove(&mut self, pos: Position) -> Option<EntityId> {
        if !self.in_bounds(pos) {
            return None;
        }
        let index = self.pos_to_index(pos);
        self.cells[index].take()
    }

    /// In-bounds cells adjacent to `pos`, in [`Direction::all`] order
    pub fn adjacent(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        Direction::all().into_iter().filter_map(move |dir| {
            let (dx, dy) = dir.to_delta();
            let next = pos.offset(dx, dy);
            self.in_bounds(next).then_some(next)
        })
    }

    /// In-bounds cells within Chebyshev `radius` of `pos`, excluding `pos`,
    /// in row-major order. The scan is clipped to the grid, so it never costs
    /// more than one pass over the world whatever the radius.
    pub fn neighborhood(&self, pos: Position, radius: i32) -> Vec<Position> {
        let mut cells = Vec::new();
        if radius < 0 {
            return cells;
        }

        let min_x = pos.x.saturating_sub(radius).max(0);
        let max_x = pos.x.saturating_add(radius).min(self.width - 1);
        let min_y = pos.y.saturating_sub(radius).max(0);
        let max_y = pos.y.saturating_add(radius).min(self.height - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let neighbor = Position::new(x, y);
                if neighbor != pos {
                    cells.push(neighbor);
                }
            }
        }

        cells
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    fn pos_to_index(&self, pos: Position) -> usize {
        (pos.y * self.width + pos.x) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(10, 8);
        assert_eq!(grid.width, 10);
        assert_eq!(grid.height, 8);
        assert_eq!(grid.cells.len(), 80);
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn test_insert_and_remove() {
        let mut grid = Grid::new(10, 10);
        let pos = Position::new(3, 4);

        grid.insert(pos, EntityId(7));
        assert_eq!(grid.get(pos), Some(EntityId(7)));
        assert!(!grid.is_vacant(pos));

        assert_eq!(grid.remove(pos), Some(EntityId(7)));
        assert!(grid.is_vacant(pos));
        assert_eq!(grid.remove(pos), None);
    }

    #[test]
    #[should_panic]
    fn test_double_occupancy_panics() {
        let mut grid = Grid::new(10, 10);
        grid.insert(Position::new(1, 1), EntityId(1));
        grid.insert(Position::new(1, 1), EntityId(2));
    }

    #[test]
    fn test_out_of_bounds_is_never_vacant() {
        let grid = Grid::new(10, 10);
        assert!(!grid.is_vacant(Position::new(-1, 0)));
        assert!(!grid.is_vacant(Position::new(0, 10)));
        assert_eq!(grid.get(Position::new(10, 10)), None);
    }

    #[test]
    fn test_adjacent_clipped_at_edges() {
        let grid = Grid::new(10, 10);
        assert_eq!(grid.adjacent(Position::new(5, 5)).count(), 8);
        assert_eq!(grid.adjacent(Position::new(0, 0)).count(), 3);
        assert_eq!(grid.adjacent(Position::new(9, 5)).count(), 5);
    }

    #[test]
    fn test_neighborhood() {
        let grid = Grid::new(10, 10);
        assert_eq!(grid.neighborhood(Position::new(5, 5), 1).len(), 8);
        assert_eq!(grid.neighborhood(Position::new(5, 5), 2).len(), 24);
        // Corner keeps only the in-bounds quadrant
        assert_eq!(grid.neighborhood(Position::new(0, 0), 2).len(), 8);
    }

    #[test]
    fn test_neighborhood_radius_larger_than_world() {
        let grid = Grid::new(5, 5);
        let cells = grid.neighborhood(Position::new(2, 2), i32::MAX);
        assert_eq!(cells.len(), 24);
        assert!(cells.iter().all(|&cell| grid.in_bounds(cell)));
        assert_eq!(cells[0], Position::new(0, 0));
        assert_eq!(grid.neighborhood(Position::new(4, 4), 20_000).len(), 24);
    }
}
