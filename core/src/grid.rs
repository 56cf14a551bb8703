use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Rectangular board of [`Cell`]s, created once per game and never resized.
///
/// A grid starts unarmed (no mines) so that placement can wait for the first
/// dig; [`Grid::from_mine_coords`] builds an armed grid directly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    cells: Array2<Cell>,
    mine_count: CellCount,
    hidden_count: CellCount,
    armed: bool,
}

impl Grid {
    pub fn new(config: GameConfig) -> Self {
        let cells = Array2::from_shape_fn(nd_index(config.size()), |(row, column)| {
            Cell::new((row as Coord, column as Coord))
        });
        Self {
            cells,
            mine_count: config.mines,
            hidden_count: config.total_cells(),
            armed: false,
        }
    }

    /// Builds an armed grid with mines at exactly `mine_coords`.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 {
            return Err(ConfigError::EmptyGrid.into());
        }

        let mut grid = Self::new(GameConfig::new_unchecked(size, 0));
        for &coords in mine_coords {
            grid.validate_coords(coords)?;
        }
        grid.arm(mine_coords.iter().copied());
        Ok(grid)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(MoveError::OutOfBounds.into())
        }
    }

    pub fn size(&self) -> Coord2 {
        let (rows, columns) = self.cells.dim();
        (rows as Coord, columns as Coord)
    }

    pub fn rows(&self) -> Coord {
        self.size().0
    }

    pub fn columns(&self) -> Coord {
        self.size().1
    }

    pub fn config(&self) -> GameConfig {
        GameConfig::new_unchecked(self.size(), self.mine_count)
    }

    pub fn total_cells(&self) -> CellCount {
        self.cells.len() as CellCount
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn hidden_count(&self) -> CellCount {
        self.hidden_count
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Every non-mine cell is revealed, so the hidden cells are exactly the mines.
    pub fn is_cleared(&self) -> bool {
        self.armed && self.hidden_count == self.mine_count
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, self.size())
    }

    pub fn neighbor_cells(&self, coords: Coord2) -> impl Iterator<Item = &Cell> {
        self.iter_neighbors(coords).map(move |pos| &self[pos])
    }

    pub fn count_adjacent_mines(&self, coords: Coord2) -> u8 {
        self.neighbor_cells(coords).filter(|cell| cell.is_mine()).count() as u8
    }

    /// Places mines on `positions` and caches every cell's neighbour count.
    pub(crate) fn arm(&mut self, positions: impl IntoIterator<Item = Coord2>) {
        for coords in positions {
            self.cells[nd_index(coords)].arm();
        }

        for coords in iter_coords(self.size()) {
            let count = self.count_adjacent_mines(coords);
            self.cells[nd_index(coords)].set_adjacent_mines(count);
        }

        self.mine_count = self.cells.iter().filter(|cell| cell.is_mine()).count() as CellCount;
        self.armed = true;
    }

    /// Clears `hidden` on a cell, returning whether it changed.
    pub(crate) fn uncover(&mut self, coords: Coord2) -> bool {
        let cell = &mut self.cells[nd_index(coords)];
        if !cell.is_hidden() {
            return false;
        }
        cell.uncover();
        self.hidden_count -= 1;
        true
    }

    pub(crate) fn toggle_flag(&mut self, coords: Coord2) {
        self.cells[nd_index(coords)].toggle_flag();
    }
}

impl Index<Coord2> for Grid {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[nd_index(coords)]
    }
}
