use core::fmt;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// What a player may see of one cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    Hidden,
    Flagged,
    Revealed(u8),
    /// Unrevealed mine, only shown once the game is over.
    Mine,
    /// The mine that ended the game.
    Detonated,
}

impl CellView {
    pub const fn is_unrevealed(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged | Self::Mine)
    }

    pub const fn symbol(self) -> char {
        match self {
            Self::Hidden => '.',
            Self::Flagged => 'F',
            Self::Revealed(0) => ' ',
            Self::Revealed(count) => (b'0' + count) as char,
            Self::Mine => '*',
            Self::Detonated => 'X',
        }
    }
}

/// Read-only snapshot of the board handed to the presentation layer and the
/// move advisor. Mine positions are absent unless explicitly exposed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardView {
    pub mine_count: CellCount,
    pub cells: Array2<CellView>,
}

impl BoardView {
    pub fn new(mine_count: CellCount, cells: Array2<CellView>) -> Result<Self> {
        let (rows, columns) = cells.dim();
        if rows == 0 || columns == 0 {
            return Err(ConfigError::EmptyGrid.into());
        }
        let max = Coord::MAX as usize;
        if rows > max || columns > max {
            return Err(ConfigError::GridTooLarge { max }.into());
        }
        Ok(Self { mine_count, cells })
    }

    /// Snapshots `grid`. With `expose_mines` every mine is shown, which the
    /// game only does after it has ended.
    pub fn from_grid(grid: &Grid, expose_mines: bool) -> Self {
        let cells = Array2::from_shape_fn(nd_index(grid.size()), |(row, column)| {
            let cell = grid[(row as Coord, column as Coord)];
            match (cell.is_hidden(), cell.is_mine()) {
                (false, true) => CellView::Detonated,
                (false, false) => CellView::Revealed(cell.adjacent_mines()),
                (true, true) if expose_mines => CellView::Mine,
                (true, _) if cell.is_flagged() => CellView::Flagged,
                (true, _) => CellView::Hidden,
            }
        });
        Self {
            mine_count: grid.mine_count(),
            cells,
        }
    }

    pub fn size(&self) -> Coord2 {
        let (rows, columns) = self.cells.dim();
        (rows as Coord, columns as Coord)
    }

    pub fn cell_at(&self, coords: Coord2) -> CellView {
        self.cells[nd_index(coords)]
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, self.size())
    }

    pub fn unrevealed_count(&self) -> CellCount {
        self.cells.iter().filter(|cell| cell.is_unrevealed()).count() as CellCount
    }
}

impl fmt::Display for BoardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.rows() {
            for cell in row {
                write!(f, "{}", cell.symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn hidden_mines_do_not_leak_while_playing() {
        let mut grid = Grid::from_mine_coords((2, 2), &[(0, 0)]).unwrap();
        reveal(&mut grid, (1, 1)).unwrap();
        grid.toggle_flag((0, 1));

        let view = BoardView::from_grid(&grid, false);

        assert_eq!(view.cell_at((0, 0)), CellView::Hidden);
        assert_eq!(view.cell_at((0, 1)), CellView::Flagged);
        assert_eq!(view.cell_at((1, 1)), CellView::Revealed(1));
        assert_eq!(view.unrevealed_count(), 3);
    }

    #[test]
    fn exposed_view_shows_mines_and_detonation() {
        let mut grid = Grid::from_mine_coords((1, 3), &[(0, 0), (0, 2)]).unwrap();
        reveal(&mut grid, (0, 2)).unwrap();

        let view = BoardView::from_grid(&grid, true);

        assert_eq!(view.cell_at((0, 0)), CellView::Mine);
        assert_eq!(view.cell_at((0, 2)), CellView::Detonated);
        assert_eq!(view.to_string(), "*.X\n");
    }

    #[test]
    fn rejects_empty_board() {
        assert!(BoardView::new(0, Array2::from_elem([0, 3], CellView::Hidden)).is_err());
    }
}
