use alloc::collections::{BTreeSet, VecDeque};
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Cells uncovered by one action together with its classification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealResult {
    pub outcome: DigOutcome,
    pub newly_revealed: Vec<Coord2>,
}

impl RevealResult {
    fn unchanged(grid: &Grid) -> Self {
        Self {
            outcome: classify_grid(grid, false),
            newly_revealed: Vec::new(),
        }
    }

    pub fn mine_hit(&self) -> bool {
        self.outcome == DigOutcome::Mine
    }
}

/// Computes which cells a dig at `start` would uncover, without touching the grid.
///
/// Revealed and flagged cells yield nothing. A mine yields only itself. Any
/// other cell yields itself plus the flood of hidden, unflagged cells
/// connected to it through zero-hint cells, in breadth-first order.
pub fn reveal_set(grid: &Grid, start: Coord2) -> Vec<Coord2> {
    let cell = grid[start];
    if !cell.is_hidden() || cell.is_flagged() {
        return Vec::new();
    }
    if cell.is_mine() {
        return Vec::from([start]);
    }

    let mut revealed = Vec::new();
    let mut visited = BTreeSet::from([start]);
    let mut to_visit = VecDeque::from([start]);

    while let Some(coords) = to_visit.pop_front() {
        revealed.push(coords);
        if grid[coords].adjacent_mines() != 0 {
            continue;
        }

        for neighbor in grid.iter_neighbors(coords) {
            let next = grid[neighbor];
            if next.is_hidden() && !next.is_flagged() && visited.insert(neighbor) {
                to_visit.push_back(neighbor);
            }
        }
    }

    revealed
}

/// Classifies a dig at `start` exactly as [`reveal`] would, read-only.
pub fn classify(grid: &Grid, start: Coord2) -> Result<DigOutcome> {
    let start = grid.validate_coords(start)?;
    let cell = grid[start];
    if cell.is_flagged() && cell.is_hidden() {
        return Err(MoveError::Flagged.into());
    }
    if cell.is_hidden() && cell.is_mine() {
        return Ok(DigOutcome::Mine);
    }

    let uncovered = reveal_set(grid, start).len() as CellCount;
    let hidden_after = grid.hidden_count() - uncovered;
    Ok(if grid.is_armed() && hidden_after == grid.mine_count() {
        DigOutcome::Win
    } else {
        DigOutcome::Safe
    })
}

/// Digs `start`: uncovers it and, from zero-hint cells, every connected hidden cell.
///
/// Digging an already revealed cell is a no-op that uncovers nothing.
pub fn reveal(grid: &mut Grid, start: Coord2) -> Result<RevealResult> {
    let start = grid.validate_coords(start)?;
    if !grid.is_armed() {
        return Err(GameError::InternalInconsistency("reveal on a grid without mines"));
    }

    let cell = grid[start];
    if !cell.is_hidden() {
        return Ok(RevealResult::unchanged(grid));
    }
    if cell.is_flagged() {
        return Err(MoveError::Flagged.into());
    }

    let newly_revealed = reveal_set(grid, start);
    for &coords in &newly_revealed {
        grid.uncover(coords);
    }

    let hit_mine = cell.is_mine();
    if !hit_mine && grid.hidden_count() < grid.mine_count() {
        return Err(GameError::InternalInconsistency(
            "fewer hidden cells than mines after a safe reveal",
        ));
    }

    log::trace!(
        "Revealed {:?}, {} cells uncovered, {} still hidden",
        start,
        newly_revealed.len(),
        grid.hidden_count()
    );

    Ok(RevealResult {
        outcome: classify_grid(grid, hit_mine),
        newly_revealed,
    })
}

/// The "dig all around a number" gesture.
///
/// On a revealed cell, digs every hidden, unflagged neighbour in row-major
/// order and stops at the first terminal outcome. On a hidden cell it is a
/// plain [`reveal`].
pub fn flood_scan(grid: &mut Grid, center: Coord2) -> Result<RevealResult> {
    let center = grid.validate_coords(center)?;
    if grid[center].is_hidden() {
        return reveal(grid, center);
    }

    let mut result = RevealResult::unchanged(grid);
    let neighbors: Vec<_> = grid.iter_neighbors(center).collect();
    for neighbor in neighbors {
        let cell = grid[neighbor];
        if !cell.is_hidden() || cell.is_flagged() {
            continue;
        }

        let step = reveal(grid, neighbor)?;
        result.newly_revealed.extend(step.newly_revealed);
        result.outcome = step.outcome;
        if step.outcome.is_terminal() {
            break;
        }
    }

    Ok(result)
}

fn classify_grid(grid: &Grid, hit_mine: bool) -> DigOutcome {
    if hit_mine {
        DigOutcome::Mine
    } else if grid.is_cleared() {
        DigOutcome::Win
    } else {
        DigOutcome::Safe
    }
}
