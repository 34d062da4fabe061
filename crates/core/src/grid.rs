//! Board grid - row-major tile storage with 4-neighbourhood lookups
//!
//! The grid never wraps: a neighbour off the edge simply does not exist.

use nets_types::{Direction, Pos};

use crate::error::EngineError;
use crate::tile::Tile;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    height: usize,
    width: usize,
    cells: Vec<Tile>,
}

impl Grid {
    /// Create a grid filled with Empty tiles.
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            cells: vec![Tile::empty(); height * width],
        }
    }

    /// Build from rows. Rows must be non-empty and all the same length.
    pub fn from_rows(rows: Vec<Vec<Tile>>) -> Result<Self, EngineError> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(EngineError::malformed("grid has no cells"));
        }
        if let Some(r) = rows.iter().position(|row| row.len() != width) {
            return Err(EngineError::malformed(format!(
                "grid row {} has {} cells, expected {}",
                r,
                rows[r].len(),
                width
            )));
        }
        Ok(Self {
            height,
            width,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width
    }

    pub fn index(&self, row: usize, col: usize) -> Option<usize> {
        self.in_bounds(row, col).then(|| row * self.width + col)
    }

    pub fn pos(&self, idx: usize) -> Pos {
        Pos::new(idx / self.width, idx % self.width)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Tile> {
        self.index(row, col).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut Tile> {
        self.index(row, col).map(move |i| &mut self.cells[i])
    }

    /// Replace a tile. Returns false when out of bounds.
    pub fn set(&mut self, row: usize, col: usize, tile: Tile) -> bool {
        match self.get_mut(row, col) {
            Some(slot) => {
                *slot = tile;
                true
            }
            None => false,
        }
    }

    pub fn tile(&self, idx: usize) -> &Tile {
        &self.cells[idx]
    }

    pub fn tile_mut(&mut self, idx: usize) -> &mut Tile {
        &mut self.cells[idx]
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.cells.chunks(self.width.max(1))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pos, &Tile)> {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, t)| (self.pos(i), t))
    }

    /// Index of the cell adjacent to `idx` across `dir`, if on the board.
    pub fn neighbor(&self, idx: usize, dir: Direction) -> Option<usize> {
        let Pos { row, col } = self.pos(idx);
        let (dr, dc) = dir.delta();
        let r = row.checked_add_signed(dr)?;
        let c = col.checked_add_signed(dc)?;
        self.index(r, c)
    }

    /// On-board neighbours in N, E, S, W order.
    pub fn neighbors(&self, idx: usize) -> impl Iterator<Item = (Direction, usize)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |d| self.neighbor(idx, d).map(|n| (d, n)))
    }

    pub fn power_index(&self) -> Option<usize> {
        self.cells.iter().position(Tile::is_power)
    }

    pub fn power_count(&self) -> usize {
        self.cells.iter().filter(|t| t.is_power()).count()
    }

    pub fn rotations(&self) -> Vec<nets_types::Rotation> {
        self.cells.iter().map(Tile::rotation).collect()
    }

    pub(crate) fn set_powered(&mut self, powered: &[bool]) {
        for (tile, p) in self.cells.iter_mut().zip(powered) {
            tile.set_powered(*p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{Shape, Sides};
    use nets_types::Rotation;

    #[test]
    fn neighbors_stop_at_the_border() {
        let grid = Grid::new(2, 3);
        let corner: Vec<_> = grid.neighbors(0).collect();
        assert_eq!(corner, vec![(Direction::East, 1), (Direction::South, 3)]);

        let last: Vec<_> = grid.neighbors(5).collect();
        assert_eq!(last, vec![(Direction::North, 2), (Direction::West, 4)]);
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let rows = vec![vec![Tile::empty(); 2], vec![Tile::empty(); 3]];
        assert!(matches!(
            Grid::from_rows(rows),
            Err(EngineError::MalformedState(_))
        ));
        assert!(Grid::from_rows(Vec::new()).is_err());
    }

    #[test]
    fn power_lookup() {
        let mut grid = Grid::new(3, 3);
        assert_eq!(grid.power_index(), None);
        grid.set(1, 2, Tile::power(Sides::ALL));
        grid.set(0, 0, Tile::new(Shape::Corner, Rotation::R90));
        assert_eq!(grid.power_index(), Some(5));
        assert_eq!(grid.power_count(), 1);
        assert_eq!(grid.pos(5), Pos::new(1, 2));
    }
}
