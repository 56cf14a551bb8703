use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, Ordering};
use serde::{Deserialize, Serialize};

use crate::*;

/// Shared stop flag for a running bot. Starting a new game cancels the old
/// bot, which then stops before its next move is applied.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Hook between choosing a move and applying it, where a front end can wait
/// or animate. The engine itself never sleeps.
pub trait Pacer {
    fn pause(&mut self, game: &Game, advice: &Advice);
}

#[derive(Copy, Clone, Debug, Default)]
pub struct NoPause;

impl Pacer for NoPause {
    fn pause(&mut self, _game: &Game, _advice: &Advice) {}
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotOutcome {
    Won,
    Lost,
    Cancelled,
    /// The advisor had nothing left to dig, e.g. every hidden cell is flagged.
    Stuck,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotMove {
    pub advice: Advice,
    pub outcome: DigOutcome,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotReport {
    pub outcome: BotOutcome,
    pub moves: Vec<BotMove>,
}

impl BotReport {
    pub fn guesses(&self) -> usize {
        self.moves
            .iter()
            .filter(|step| matches!(step.advice.reason, AdviceReason::Guess(_)))
            .count()
    }
}

/// Automated player: asks the advisor, digs, repeats until the game ends.
#[derive(Copy, Clone, Debug, Default)]
pub struct Bot {
    cfg: AdvisorConfig,
}

impl Bot {
    pub fn new(cfg: AdvisorConfig) -> Self {
        Self { cfg }
    }

    /// Plays `game` to the end. Every dig uncovers at least one cell, so the
    /// loop is bounded by the number of cells.
    pub fn play(
        &self,
        game: &mut Game,
        cancel: &CancelToken,
        pacer: &mut impl Pacer,
    ) -> Result<BotReport> {
        let mut moves = Vec::new();
        let max_moves = usize::from(game.config().total_cells());

        for _ in 0..max_moves {
            if let Some(outcome) = finished_outcome(game) {
                return Ok(BotReport { outcome, moves });
            }
            if cancel.is_cancelled() {
                return Ok(cancelled(moves));
            }

            let advice = match game.bot_move(self.cfg) {
                Ok(advice) => advice,
                Err(GameError::InvalidMove(MoveError::NoCandidate)) => {
                    log::warn!("Bot stuck after {} moves", moves.len());
                    return Ok(BotReport {
                        outcome: BotOutcome::Stuck,
                        moves,
                    });
                }
                Err(err) => return Err(err),
            };

            pacer.pause(game, &advice);
            if cancel.is_cancelled() {
                return Ok(cancelled(moves));
            }

            let outcome = game.dig(advice.coords)?;
            log::debug!("Bot dug {:?} ({:?}): {:?}", advice.coords, advice.reason, outcome);
            moves.push(BotMove { advice, outcome });
        }

        finished_outcome(game)
            .map(|outcome| BotReport { outcome, moves })
            .ok_or(GameError::InternalInconsistency(
                "bot exhausted its move budget on an unfinished game",
            ))
    }
}

fn finished_outcome(game: &Game) -> Option<BotOutcome> {
    match game.state() {
        GameState::Won => Some(BotOutcome::Won),
        GameState::Lost => Some(BotOutcome::Lost),
        GameState::Ready | GameState::InProgress => None,
    }
}

fn cancelled(moves: Vec<BotMove>) -> BotReport {
    log::debug!("Bot cancelled after {} moves", moves.len());
    BotReport {
        outcome: BotOutcome::Cancelled,
        moves,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CancelAfter {
        token: CancelToken,
        pauses: usize,
        limit: usize,
    }

    impl Pacer for CancelAfter {
        fn pause(&mut self, _game: &Game, _advice: &Advice) {
            self.pauses += 1;
            if self.pauses >= self.limit {
                self.token.cancel();
            }
        }
    }

    #[test]
    fn bot_finishes_every_seeded_game() {
        for seed in 0..32 {
            let mut game = Game::with_config(Difficulty::Beginner.into(), Some(seed));
            let report = Bot::default()
                .play(&mut game, &CancelToken::new(), &mut NoPause)
                .unwrap();

            assert!(matches!(report.outcome, BotOutcome::Won | BotOutcome::Lost));
            assert!(game.is_finished());
            assert!(!report.moves.is_empty());
            assert_ne!(report.moves[0].outcome, DigOutcome::Mine);
        }
    }

    #[test]
    fn bot_finishes_with_a_deduction() {
        // The opening exposes a 1 next to the only mine; once the second 1
        // shows up, the last cell is provably safe.
        let grid = Grid::from_mine_coords((1, 5), &[(0, 2)]).unwrap();
        let mut game = Game::from_grid(grid);

        let report = Bot::default()
            .play(&mut game, &CancelToken::new(), &mut NoPause)
            .unwrap();

        assert_eq!(report.outcome, BotOutcome::Won);
        let dug: Vec<_> = report.moves.iter().map(|step| step.advice.coords).collect();
        assert_eq!(dug, [(0, 0), (0, 3), (0, 4)]);
        assert_eq!(report.moves[2].advice.reason, AdviceReason::Deduced);
        assert_eq!(report.guesses(), 2);
    }

    #[test]
    fn pre_cancelled_token_stops_before_any_move() {
        let mut game = Game::new(9, 9, 10, Some(5)).unwrap();
        let token = CancelToken::new();
        token.cancel();

        let report = Bot::default().play(&mut game, &token, &mut NoPause).unwrap();

        assert_eq!(report.outcome, BotOutcome::Cancelled);
        assert!(report.moves.is_empty());
        assert_eq!(game.state(), GameState::Ready);
    }

    #[test]
    fn cancel_during_pause_skips_the_pending_move() {
        let mut game = Game::new(16, 16, 40, Some(11)).unwrap();
        let token = CancelToken::new();
        let mut pacer = CancelAfter {
            token: token.clone(),
            pauses: 0,
            limit: 1,
        };

        let report = Bot::default().play(&mut game, &token, &mut pacer).unwrap();

        assert_eq!(report.outcome, BotOutcome::Cancelled);
        assert!(report.moves.is_empty());
        assert_eq!(game.hidden_count(), 256);
    }

    #[test]
    fn fully_flagged_board_leaves_the_bot_stuck() {
        let grid = Grid::from_mine_coords((1, 3), &[(0, 0)]).unwrap();
        let mut game = Game::from_grid(grid);
        game.toggle_flag((0, 1)).unwrap();
        game.toggle_flag((0, 2)).unwrap();
        game.toggle_flag((0, 0)).unwrap();

        let report = Bot::default()
            .play(&mut game, &CancelToken::new(), &mut NoPause)
            .unwrap();

        assert_eq!(report.outcome, BotOutcome::Stuck);
    }
}
