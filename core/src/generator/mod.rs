use crate::*;
pub use random::*;

mod random;

pub trait GridGenerator {
    /// Places mines on an unarmed grid and caches neighbour counts.
    fn arm(self, grid: &mut Grid) -> Result<()>;

    fn generate(self, config: GameConfig) -> Result<Grid>
    where
        Self: Sized,
    {
        let mut grid = Grid::new(config);
        self.arm(&mut grid)?;
        Ok(grid)
    }
}

/// Cells kept free of mines around the excluded (first dug) cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum SafeZone {
    /// No guarantee, mines may land anywhere.
    Unprotected,
    /// Only the excluded cell itself is mine-free.
    Cell,
    /// The excluded cell and its up to eight neighbours are mine-free, so the
    /// first dig always opens an area.
    #[default]
    Neighborhood,
}
