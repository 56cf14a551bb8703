use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;
use core::cmp::Ordering;
use serde::{Deserialize, Serialize};

use super::BoardView;
use crate::*;

/// How player flags feed into deduction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FlagSemantics {
    /// Flags are treated as ordinary hidden cells.
    #[default]
    Soft,
    /// Flags are trusted as known mines.
    Strict,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AdvisorConfig {
    pub flag_semantics: FlagSemantics,
}

/// Estimated mine probability kept as an exact ratio, so that ranking and
/// tie-breaking never depend on float rounding.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Probability {
    pub mines: CellCount,
    pub cells: CellCount,
}

impl Probability {
    pub const CERTAIN: Self = Self { mines: 1, cells: 1 };

    pub fn new(mines: CellCount, cells: CellCount) -> Self {
        let cells = cells.max(1);
        Self {
            mines: mines.min(cells),
            cells,
        }
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.mines) / f64::from(self.cells)
    }

    fn cross(self, other: Self) -> (u32, u32) {
        (
            u32::from(self.mines) * u32::from(other.cells),
            u32::from(other.mines) * u32::from(self.cells),
        )
    }
}

impl PartialEq for Probability {
    fn eq(&self, other: &Self) -> bool {
        let (left, right) = self.cross(*other);
        left == right
    }
}

impl Eq for Probability {}

impl PartialOrd for Probability {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Probability {
    fn cmp(&self, other: &Self) -> Ordering {
        let (left, right) = self.cross(*other);
        left.cmp(&right)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdviceReason {
    /// Provably safe from a single revealed hint.
    Deduced,
    /// Best available guess with its estimated mine probability.
    Guess(Probability),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    pub coords: Coord2,
    pub reason: AdviceReason,
}

/// Everything the advisor inferred from one board snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Analysis {
    /// Unrevealed cells proven free of mines.
    pub safe: BTreeSet<Coord2>,
    /// Unrevealed cells proven to hold mines.
    pub mines: BTreeSet<Coord2>,
    /// Estimated mine probability for every other unrevealed cell.
    pub estimates: BTreeMap<Coord2, Probability>,
}

/// Hint cell together with its still unexplained mines and undecided neighbours.
struct Constraint {
    remaining: CellCount,
    unknown: Vec<Coord2>,
}

pub fn analyze(view: &BoardView, cfg: AdvisorConfig) -> Analysis {
    let mut analysis = Analysis::default();
    let size = view.size();

    if matches!(cfg.flag_semantics, FlagSemantics::Strict) {
        analysis.mines.extend(
            iter_coords(size).filter(|&coords| view.cell_at(coords) == CellView::Flagged),
        );
    }

    // Single-constraint deduction. Every hint is checked once, and again only
    // when one of its neighbours gets decided.
    let mut pending: BTreeSet<Coord2> = iter_coords(size)
        .filter(|&coords| matches!(view.cell_at(coords), CellView::Revealed(_)))
        .collect();
    while let Some(clue) = pending.pop_first() {
        let Some(constraint) = constraint_at(view, &analysis, clue) else {
            continue;
        };
        if constraint.unknown.is_empty() {
            continue;
        }

        let target = if usize::from(constraint.remaining) == constraint.unknown.len() {
            &mut analysis.mines
        } else if constraint.remaining == 0 {
            &mut analysis.safe
        } else {
            continue;
        };
        for &decided in &constraint.unknown {
            target.insert(decided);
            pending.extend(
                view.iter_neighbors(decided)
                    .filter(|&neighbor| matches!(view.cell_at(neighbor), CellView::Revealed(_))),
            );
        }
    }

    let unrevealed: Vec<Coord2> = iter_coords(size)
        .filter(|&coords| view.cell_at(coords).is_unrevealed())
        .collect();
    let open_cells = unrevealed
        .iter()
        .filter(|&&coords| !analysis.mines.contains(&coords) && !analysis.safe.contains(&coords))
        .count() as CellCount;
    let open_mines = view
        .mine_count
        .saturating_sub(analysis.mines.len() as CellCount);
    let prior = Probability::new(open_mines, open_cells);

    for &coords in &unrevealed {
        if analysis.mines.contains(&coords) || analysis.safe.contains(&coords) {
            continue;
        }

        // Raise the global prior to the tightest neighbouring hint.
        let estimate = view
            .iter_neighbors(coords)
            .filter_map(|clue| constraint_at(view, &analysis, clue))
            .filter(|constraint| !constraint.unknown.is_empty())
            .map(|constraint| {
                Probability::new(constraint.remaining, constraint.unknown.len() as CellCount)
            })
            .fold(prior, Ord::max);
        analysis.estimates.insert(coords, estimate);
    }

    analysis
}

/// Picks the next cell to dig.
///
/// A deduced-safe cell wins outright, lowest row then column. Otherwise the
/// cell with the smallest estimate is guessed with the same tie-break. Cells
/// deduced as mines are only returned when nothing else is left, and flagged
/// cells are never returned since they cannot be dug.
pub fn choose_move(view: &BoardView, cfg: AdvisorConfig) -> Result<Advice> {
    let analysis = analyze(view, cfg);
    let diggable = |coords: Coord2| view.cell_at(coords) == CellView::Hidden;

    if let Some(&coords) = analysis.safe.iter().find(|&&coords| diggable(coords)) {
        log::debug!("Advisor: {coords:?} is provably safe");
        return Ok(Advice {
            coords,
            reason: AdviceReason::Deduced,
        });
    }

    let guess = analysis
        .estimates
        .iter()
        .filter(|&(&coords, _)| diggable(coords))
        .min_by_key(|&(&coords, &probability)| (probability, coords));
    if let Some((&coords, &probability)) = guess {
        log::debug!(
            "Advisor: guessing {coords:?} at {:.1}%",
            probability.as_f64() * 100.0
        );
        return Ok(Advice {
            coords,
            reason: AdviceReason::Guess(probability),
        });
    }

    if let Some(&coords) = analysis.mines.iter().find(|&&coords| diggable(coords)) {
        log::debug!("Advisor: only deduced mines left, picking {coords:?}");
        return Ok(Advice {
            coords,
            reason: AdviceReason::Guess(Probability::CERTAIN),
        });
    }

    Err(MoveError::NoCandidate.into())
}

fn constraint_at(view: &BoardView, analysis: &Analysis, clue: Coord2) -> Option<Constraint> {
    let CellView::Revealed(hint) = view.cell_at(clue) else {
        return None;
    };

    let mut known_mines: CellCount = 0;
    let mut unknown = Vec::new();
    for neighbor in view.iter_neighbors(clue) {
        if !view.cell_at(neighbor).is_unrevealed() {
            continue;
        }
        if analysis.mines.contains(&neighbor) {
            known_mines += 1;
        } else if !analysis.safe.contains(&neighbor) {
            unknown.push(neighbor);
        }
    }

    let Some(remaining) = CellCount::from(hint).checked_sub(known_mines) else {
        log::debug!("Advisor: hint at {clue:?} contradicts deduced mines");
        return None;
    };
    if usize::from(remaining) > unknown.len() {
        log::debug!("Advisor: hint at {clue:?} cannot be satisfied");
        return None;
    }

    Some(Constraint { remaining, unknown })
}
