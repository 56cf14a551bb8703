#![no_std]

extern crate alloc;

use serde::{Deserialize, Serialize};

pub use analysis::*;
pub use bot::*;
pub use cell::*;
pub use engine::*;
pub use error::*;
pub use game::*;
pub use generator::*;
pub use grid::*;
pub use types::*;

mod analysis;
mod bot;
mod cell;
mod engine;
mod error;
mod game;
mod generator;
mod grid;
mod types;

/// Validated construction parameters for a game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub rows: Coord,
    pub columns: Coord,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked((rows, columns): Coord2, mines: CellCount) -> Self {
        Self {
            rows,
            columns,
            mines,
        }
    }

    /// Checks `rows, columns >= 1` and `mines < rows * columns - 1`, so that
    /// at least the first dug cell and one more cell stay free of mines.
    pub fn new(rows: usize, columns: usize, mines: usize) -> Result<Self> {
        if rows == 0 || columns == 0 {
            return Err(ConfigError::EmptyGrid.into());
        }
        let max = Coord::MAX as usize;
        if rows > max || columns > max {
            return Err(ConfigError::GridTooLarge { max }.into());
        }

        let limit = rows * columns - 1;
        if mines >= limit {
            return Err(ConfigError::TooManyMines {
                mines: mines.min(CellCount::MAX as usize) as CellCount,
                limit: limit as CellCount,
            }
            .into());
        }

        Ok(Self::new_unchecked(
            (rows as Coord, columns as Coord),
            mines as CellCount,
        ))
    }

    pub const fn size(&self) -> Coord2 {
        (self.rows, self.columns)
    }

    pub const fn total_cells(&self) -> CellCount {
        self.rows as CellCount * self.columns as CellCount
    }
}

impl From<Difficulty> for GameConfig {
    fn from(difficulty: Difficulty) -> Self {
        let (size, mines) = match difficulty {
            Difficulty::Beginner => ((9, 9), 10),
            Difficulty::Intermediate => ((16, 16), 40),
            Difficulty::Expert => ((16, 30), 99),
        };
        Self::new_unchecked(size, mines)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Expert,
}

/// Classification of a dig: the tri-state the presentation layer branches on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DigOutcome {
    /// A mine was uncovered, the game is lost.
    Mine,
    /// Only safe cells were uncovered and the game goes on.
    Safe,
    /// The last safe cell was uncovered, the game is won.
    Win,
}

impl DigOutcome {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Mine | Self::Win)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_rejects_mines_filling_all_but_one_cell() {
        assert_eq!(
            GameConfig::new(5, 5, 24),
            Err(GameError::InvalidConfiguration(ConfigError::TooManyMines {
                mines: 24,
                limit: 24
            }))
        );
        assert!(GameConfig::new(5, 5, 23).is_ok());
    }

    #[test]
    fn config_rejects_empty_and_oversized_grids() {
        assert_eq!(
            GameConfig::new(0, 5, 1),
            Err(GameError::InvalidConfiguration(ConfigError::EmptyGrid))
        );
        assert!(matches!(
            GameConfig::new(256, 2, 1),
            Err(GameError::InvalidConfiguration(ConfigError::GridTooLarge { .. }))
        ));
    }

    #[test]
    fn single_cell_grid_is_never_valid() {
        assert!(GameConfig::new(1, 1, 0).is_err());
        assert!(GameConfig::new(1, 2, 0).is_ok());
    }

    #[test]
    fn presets_are_valid_configurations() {
        for difficulty in [
            Difficulty::Beginner,
            Difficulty::Intermediate,
            Difficulty::Expert,
        ] {
            let preset = GameConfig::from(difficulty);
            let checked = GameConfig::new(
                preset.rows.into(),
                preset.columns.into(),
                preset.mines.into(),
            );
            assert_eq!(checked, Ok(preset));
        }
    }
}
