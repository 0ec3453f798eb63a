//! Transient occupancy grid used while counting tiles.

use hardmix_common::Ident;

/// Priority of a cell nobody has claimed yet; below every rule priority.
pub const UNOCCUPIED_PRIORITY: i32 = i32::MIN;

/// One grid cell: which tile anchors here, and with what rule priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    /// Tile type anchored at this cell, if any.
    pub occupant: Option<Ident>,
    /// Priority of the rule that placed the occupant.
    pub priority: i32,
}

impl GridCell {
    /// An unclaimed cell.
    pub const EMPTY: Self = Self {
        occupant: None,
        priority: UNOCCUPIED_PRIORITY,
    };
}

/// A width x height array of [`GridCell`]s.
///
/// Only the anchor (top-left) cell of a placed tile is recorded, so counting
/// occupants counts placed instances rather than covered area.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<GridCell>,
}

impl Grid {
    /// Allocates a grid with every cell unclaimed.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![GridCell::EMPTY; width * height],
        }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    fn offset(&self, x: i64, y: i64) -> Option<usize> {
        let x = usize::try_from(x).ok().filter(|&x| x < self.width)?;
        let y = usize::try_from(y).ok().filter(|&y| y < self.height)?;
        Some(y * self.width + x)
    }

    /// Returns the cell at `(x, y)`, or `None` outside the grid.
    pub fn get(&self, x: i64, y: i64) -> Option<&GridCell> {
        self.offset(x, y).map(|i| &self.cells[i])
    }

    /// Anchors `tile` at `(x, y)` if `priority` beats the current occupant.
    ///
    /// Returns `true` if the cell changed hands. Positions outside the grid
    /// are ignored.
    pub fn claim(&mut self, x: i64, y: i64, tile: Ident, priority: i32) -> bool {
        let Some(i) = self.offset(x, y) else {
            return false;
        };
        let cell = &mut self.cells[i];
        if cell.priority < priority {
            *cell = GridCell {
                occupant: Some(tile),
                priority,
            };
            true
        } else {
            false
        }
    }

    /// Counts cells anchored by `tile`.
    pub fn count_occupied_by(&self, tile: Ident) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.occupant == Some(tile))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(raw: u32) -> Ident {
        Ident::from_raw(raw)
    }

    #[test]
    fn new_grid_is_empty() {
        let grid = Grid::new(3, 2);
        assert_eq!((grid.width(), grid.height()), (3, 2));
        for x in 0..3 {
            for y in 0..2 {
                assert_eq!(grid.get(x, y), Some(&GridCell::EMPTY));
            }
        }
    }

    #[test]
    fn out_of_bounds() {
        let mut grid = Grid::new(3, 2);
        assert!(grid.get(3, 0).is_none());
        assert!(grid.get(0, 2).is_none());
        assert!(grid.get(-1, 0).is_none());
        assert!(!grid.claim(-1, 0, tag(0), 1));
        assert!(!grid.claim(0, 5, tag(0), 1));
    }

    #[test]
    fn higher_priority_wins_in_either_order() {
        let (low, high) = (tag(1), tag(5));

        let mut grid = Grid::new(2, 2);
        assert!(grid.claim(1, 1, low, 1));
        assert!(grid.claim(1, 1, high, 5));
        assert_eq!(grid.get(1, 1).unwrap().occupant, Some(high));

        let mut grid = Grid::new(2, 2);
        assert!(grid.claim(1, 1, high, 5));
        assert!(!grid.claim(1, 1, low, 1));
        assert_eq!(grid.get(1, 1).unwrap().occupant, Some(high));
    }

    #[test]
    fn equal_priority_keeps_first() {
        let mut grid = Grid::new(1, 1);
        assert!(grid.claim(0, 0, tag(1), 3));
        assert!(!grid.claim(0, 0, tag(2), 3));
        assert_eq!(grid.get(0, 0).unwrap().occupant, Some(tag(1)));
    }

    #[test]
    fn any_real_priority_beats_sentinel() {
        let mut grid = Grid::new(1, 1);
        assert!(grid.claim(0, 0, tag(1), i32::MIN + 1));
    }

    #[test]
    fn count_by_tag() {
        let mut grid = Grid::new(4, 4);
        grid.claim(0, 0, tag(1), 1);
        grid.claim(1, 0, tag(1), 1);
        grid.claim(2, 3, tag(2), 1);
        assert_eq!(grid.count_occupied_by(tag(1)), 2);
        assert_eq!(grid.count_occupied_by(tag(2)), 1);
        assert_eq!(grid.count_occupied_by(tag(3)), 0);
    }
}
