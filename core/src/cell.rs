use serde::{Deserialize, Serialize};

use crate::Coord2;

/// One grid position. Only the reveal engine clears `hidden`, only the player
/// toggles `flagged`, and `is_mine` is written once when mines are placed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    coords: Coord2,
    is_mine: bool,
    hidden: bool,
    flagged: bool,
    adjacent_mines: u8,
}

impl Cell {
    pub const fn new(coords: Coord2) -> Self {
        Self {
            coords,
            is_mine: false,
            hidden: true,
            flagged: false,
            adjacent_mines: 0,
        }
    }

    pub const fn coords(&self) -> Coord2 {
        self.coords
    }

    pub const fn row(&self) -> u8 {
        self.coords.0
    }

    pub const fn column(&self) -> u8 {
        self.coords.1
    }

    pub const fn is_mine(&self) -> bool {
        self.is_mine
    }

    pub const fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub const fn is_flagged(&self) -> bool {
        self.flagged
    }

    /// Neighbouring mine count, meaningful once mines are placed.
    pub const fn adjacent_mines(&self) -> u8 {
        self.adjacent_mines
    }

    pub(crate) fn arm(&mut self) {
        self.is_mine = true;
    }

    pub(crate) fn set_adjacent_mines(&mut self, count: u8) {
        self.adjacent_mines = count;
    }

    pub(crate) fn uncover(&mut self) {
        self.hidden = false;
    }

    pub(crate) fn toggle_flag(&mut self) {
        self.flagged = !self.flagged;
    }
}
