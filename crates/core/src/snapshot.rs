use nets_types::{Actor, GameStatus, Move};

use crate::analysis::Stats;
use crate::grid::Grid;

/// Game metadata carried next to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Meta {
    pub height: usize,
    pub width: usize,
    pub seed: u64,
    pub status: GameStatus,
    pub turn: Actor,
    pub wraps: bool,
}

impl Meta {
    pub fn new(height: usize, width: usize, seed: u64) -> Self {
        Self {
            height,
            width,
            seed,
            status: GameStatus::Playing,
            turn: Actor::Human,
            wraps: false,
        }
    }
}

/// Owned copy of everything a boundary needs to render or serialize a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    pub meta: Meta,
    pub grid: Grid,
    pub last_move: Option<Move>,
    pub stats: Stats,
    pub has_loop: bool,
}

impl GameSnapshot {
    /// Snapshot of a freshly loaded document; stats are filled in on load.
    pub fn unanalyzed(meta: Meta, grid: Grid, last_move: Option<Move>) -> Self {
        Self {
            meta,
            grid,
            last_move,
            stats: Stats::default(),
            has_loop: false,
        }
    }

    pub fn playable(&self) -> bool {
        self.meta.status == GameStatus::Playing
    }
}
