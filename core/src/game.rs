use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GameState {
    /// Nothing dug yet, mines may still be unplaced.
    #[default]
    Ready,
    InProgress,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// One game session. Owns its grid exclusively; a new game means a new `Game`.
///
/// Mines are placed lazily on the first dig, keeping the dug cell (and its
/// neighbours when they fit, see [`SafeZone`]) free of mines.
#[derive(Clone, Debug)]
pub struct Game {
    grid: Grid,
    state: GameState,
    rng: SmallRng,
    safe_zone: SafeZone,
    detonated: Option<Coord2>,
}

impl Game {
    pub fn new(rows: usize, columns: usize, mines: usize, seed: Option<u64>) -> Result<Self> {
        Ok(Self::with_config(GameConfig::new(rows, columns, mines)?, seed))
    }

    /// Starts a game from an already validated config. Without a seed the
    /// mine layout is drawn from OS entropy.
    pub fn with_config(config: GameConfig, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(SmallRng::from_os_rng, SmallRng::seed_from_u64);
        Self {
            grid: Grid::new(config),
            state: GameState::Ready,
            rng,
            safe_zone: SafeZone::default(),
            detonated: None,
        }
    }

    /// Plays on a fixed layout, e.g. one built with [`Grid::from_mine_coords`].
    pub fn from_grid(grid: Grid) -> Self {
        Self {
            grid,
            state: GameState::Ready,
            rng: SmallRng::seed_from_u64(0),
            safe_zone: SafeZone::default(),
            detonated: None,
        }
    }

    pub fn with_safe_zone(mut self, safe_zone: SafeZone) -> Self {
        self.safe_zone = safe_zone;
        self
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn config(&self) -> GameConfig {
        self.grid.config()
    }

    pub fn size(&self) -> Coord2 {
        self.grid.size()
    }

    pub fn total_mines(&self) -> CellCount {
        self.grid.mine_count()
    }

    pub fn hidden_count(&self) -> CellCount {
        self.grid.hidden_count()
    }

    /// Mines minus flags, as shown on a mine counter. Negative when over-flagged.
    pub fn mines_left(&self) -> isize {
        let flags = self.grid.cells().filter(|cell| cell.is_flagged()).count();
        self.grid.mine_count() as isize - flags as isize
    }

    pub fn detonated(&self) -> Option<Coord2> {
        self.detonated
    }

    /// Player-visible board. Mines only show up once the game is over.
    pub fn view(&self) -> BoardView {
        BoardView::from_grid(&self.grid, self.state.is_finished())
    }

    pub fn dig(&mut self, coords: Coord2) -> Result<DigOutcome> {
        self.apply(coords, reveal).map(|result| result.outcome)
    }

    /// Digs around a revealed cell, returning every cell it uncovered.
    pub fn scan(&mut self, coords: Coord2) -> Result<RevealResult> {
        self.apply(coords, flood_scan)
    }

    /// Tells what [`Game::dig`] on `coords` would report, without digging.
    pub fn is_mine_at(&self, coords: Coord2) -> Result<DigOutcome> {
        let coords = self.check_dig_target(coords)?;
        if self.grid.is_armed() {
            return classify(&self.grid, coords);
        }

        // Place mines on a copy exactly as the first dig would.
        let mut grid = self.grid.clone();
        RandomGridGenerator::new(self.rng.clone(), Some(coords), self.safe_zone).arm(&mut grid)?;
        classify(&grid, coords)
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        let coords = self.grid.validate_coords(coords)?;
        self.check_not_finished()?;

        if !self.grid[coords].is_hidden() {
            return Ok(MarkOutcome::NoChange);
        }
        self.grid.toggle_flag(coords);
        Ok(MarkOutcome::Changed)
    }

    /// Asks the move advisor for the next dig.
    pub fn bot_move(&self, cfg: AdvisorConfig) -> Result<Advice> {
        self.check_not_finished()?;
        choose_move(&self.view(), cfg)
    }

    fn apply(
        &mut self,
        coords: Coord2,
        action: fn(&mut Grid, Coord2) -> Result<RevealResult>,
    ) -> Result<RevealResult> {
        let coords = self.check_dig_target(coords)?;

        if !self.grid.is_armed() {
            RandomGridGenerator::new(&mut self.rng, Some(coords), self.safe_zone)
                .arm(&mut self.grid)?;
        }

        let result = action(&mut self.grid, coords)?;
        self.record(&result)?;
        Ok(result)
    }

    fn record(&mut self, result: &RevealResult) -> Result<()> {
        match result.outcome {
            DigOutcome::Mine => {
                self.detonated = result
                    .newly_revealed
                    .iter()
                    .copied()
                    .find(|&coords| self.grid[coords].is_mine());
                if self.detonated.is_none() {
                    return Err(GameError::InternalInconsistency(
                        "mine outcome without an uncovered mine",
                    ));
                }
                self.state = GameState::Lost;
                log::info!("Game lost at {:?}", self.detonated);
            }
            DigOutcome::Win => {
                if !self.grid.is_cleared() {
                    return Err(GameError::InternalInconsistency(
                        "win reported with safe cells still hidden",
                    ));
                }
                self.state = GameState::Won;
                log::info!("Game won");
            }
            DigOutcome::Safe => {
                if self.state.is_ready() && !result.newly_revealed.is_empty() {
                    self.state = GameState::InProgress;
                }
            }
        }
        Ok(())
    }

    fn check_dig_target(&self, coords: Coord2) -> Result<Coord2> {
        let coords = self.grid.validate_coords(coords)?;
        self.check_not_finished()?;
        let cell = self.grid[coords];
        if cell.is_hidden() && cell.is_flagged() {
            return Err(MoveError::Flagged.into());
        }
        Ok(coords)
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.state.is_finished() {
            Err(MoveError::GameOver.into())
        } else {
            Ok(())
        }
    }
}
