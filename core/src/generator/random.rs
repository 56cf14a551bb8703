use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use rand::Rng;

use super::*;

/// Uniformly random placement over every cell outside the safe zone.
///
/// The random source is injected, so a seeded rng reproduces the same grid.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomGridGenerator<R> {
    rng: R,
    excluded: Option<Coord2>,
    safe_zone: SafeZone,
}

impl<R: Rng> RandomGridGenerator<R> {
    pub fn new(rng: R, excluded: Option<Coord2>, safe_zone: SafeZone) -> Self {
        Self {
            rng,
            excluded,
            safe_zone,
        }
    }

    /// Downgrades the safe zone until the remaining cells can hold every mine.
    fn effective_safe_zone(&self, grid: &Grid, excluded: Coord2) -> SafeZone {
        use SafeZone::*;

        let total = usize::from(grid.total_cells());
        let mines = usize::from(grid.mine_count());
        let zone = grid.iter_neighbors(excluded).count() + 1;

        match self.safe_zone {
            Unprotected => Unprotected,
            Neighborhood if mines + zone <= total => Neighborhood,
            Neighborhood | Cell if mines < total => {
                if self.safe_zone == Neighborhood {
                    log::warn!("Cannot keep neighbourhood of {excluded:?} clear, fallback to single cell");
                }
                Cell
            }
            Neighborhood | Cell => {
                log::warn!("Cannot keep {excluded:?} clear, fallback to unprotected placement");
                Unprotected
            }
        }
    }
}

impl<R: Rng> GridGenerator for RandomGridGenerator<R> {
    fn arm(mut self, grid: &mut Grid) -> Result<()> {
        if grid.is_armed() {
            return Err(GameError::InternalInconsistency("grid is already armed"));
        }

        let mut blocked = BTreeSet::new();
        if let Some(excluded) = self.excluded {
            let excluded = grid.validate_coords(excluded)?;
            match self.effective_safe_zone(grid, excluded) {
                SafeZone::Unprotected => {}
                SafeZone::Cell => {
                    blocked.insert(excluded);
                }
                SafeZone::Neighborhood => {
                    blocked.insert(excluded);
                    blocked.extend(grid.iter_neighbors(excluded));
                }
            }
        }

        let eligible: Vec<Coord2> = iter_coords(grid.size())
            .filter(|coords| !blocked.contains(coords))
            .collect();
        let mines = usize::from(grid.mine_count());
        if mines > eligible.len() {
            return Err(ConfigError::TooManyMines {
                mines: grid.mine_count(),
                limit: eligible.len() as CellCount,
            }
            .into());
        }

        let picks = rand::seq::index::sample(&mut self.rng, eligible.len(), mines);
        grid.arm(picks.iter().map(|index| eligible[index]));

        log::debug!(
            "Armed {}x{} grid with {} mines, {} cells kept clear",
            grid.rows(),
            grid.columns(),
            grid.mine_count(),
            blocked.len()
        );

        if usize::from(grid.mine_count()) != mines {
            return Err(GameError::InternalInconsistency(
                "placed mine count differs from the requested count",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn generate(config: GameConfig, excluded: Option<Coord2>, seed: u64) -> Grid {
        RandomGridGenerator::new(
            SmallRng::seed_from_u64(seed),
            excluded,
            SafeZone::Neighborhood,
        )
        .generate(config)
        .unwrap()
    }

    #[test]
    fn places_exactly_the_requested_mines() {
        let config = GameConfig::new(9, 9, 10).unwrap();
        for seed in 0..32 {
            let grid = generate(config, None, seed);
            assert!(grid.is_armed());
            assert_eq!(grid.cells().filter(|cell| cell.is_mine()).count(), 10);
        }
    }

    #[test]
    fn excluded_neighborhood_stays_clear() {
        let config = GameConfig::new(9, 9, 60).unwrap();
        for seed in 0..32 {
            let grid = generate(config, Some((4, 4)), seed);
            assert!(!grid[(4, 4)].is_mine());
            assert!(grid.neighbor_cells((4, 4)).all(|cell| !cell.is_mine()));
            assert_eq!(grid.mine_count(), 60);
        }
    }

    #[test]
    fn crowded_grid_falls_back_to_single_safe_cell() {
        // 3x3 with 7 mines leaves room for the excluded cell only.
        let config = GameConfig::new(3, 3, 7).unwrap();
        for seed in 0..32 {
            let grid = generate(config, Some((1, 1)), seed);
            assert!(!grid[(1, 1)].is_mine());
            assert_eq!(grid.mine_count(), 7);
            assert_eq!(grid[(1, 1)].adjacent_mines(), 7);
        }
    }

    #[test]
    fn same_seed_gives_same_layout() {
        let config = GameConfig::from(Difficulty::Intermediate);
        assert_eq!(
            generate(config, Some((0, 0)), 7),
            generate(config, Some((0, 0)), 7)
        );
    }

    #[test]
    fn arming_twice_is_rejected() {
        let config = GameConfig::new(4, 4, 3).unwrap();
        let mut grid = generate(config, None, 1);
        let again = RandomGridGenerator::new(SmallRng::seed_from_u64(2), None, SafeZone::Cell)
            .arm(&mut grid);
        assert!(matches!(again, Err(GameError::InternalInconsistency(_))));
    }

    #[test]
    fn neighbor_counts_match_literal_count() {
        let config = GameConfig::from(Difficulty::Expert);
        let grid = generate(config, Some((8, 15)), 99);
        for cell in grid.cells() {
            let literal = grid
                .iter_neighbors(cell.coords())
                .filter(|&pos| grid[pos].is_mine())
                .count();
            assert_eq!(usize::from(cell.adjacent_mines()), literal);
        }
    }
}
