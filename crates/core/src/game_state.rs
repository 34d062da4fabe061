//! Game state and move engine
//!
//! [`GameState`] owns the grid and is the only place rotations are applied
//! during play. Every move is checked in a fixed order and a rejected move
//! leaves the state exactly as it was:
//!
//! 1. coordinates on the board (`OutOfBounds`)
//! 2. game still playing (`GameOver`)
//! 3. actor's turn, unless turns are relaxed (`NotYourTurn`)
//! 4. tile unlocked (`Locked`)
//!
//! An accepted move rotates one tile, recomputes stats and powered flags,
//! records `last_move`, and then either marks the game solved or hands the
//! turn to the other actor.

use nets_types::{Actor, GameStatus, Move, Rotation, RotationDelta};
use tracing::{debug, info, warn};

use crate::analysis::{self, Stats};
use crate::error::EngineError;
use crate::generator;
use crate::grid::Grid;
use crate::snapshot::{GameSnapshot, Meta};

/// Result of an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub applied: Move,
    pub previous: Rotation,
    pub stats: Stats,
}

impl MoveOutcome {
    pub fn solved(&self) -> bool {
        self.stats.solved
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    meta: Meta,
    grid: Grid,
    last_move: Option<Move>,
    stats: Stats,
    has_loop: bool,
    /// Reference rotations, known only for generated games.
    solution: Option<Vec<Rotation>>,
    strict_turns: bool,
}

impl GameState {
    /// Generate a new scrambled game.
    pub fn new(height: usize, width: usize, seed: u64) -> Result<Self, EngineError> {
        let puzzle = generator::generate(height, width, seed)?;
        let mut state = Self {
            meta: Meta::new(height, width, seed),
            grid: puzzle.grid,
            last_move: None,
            stats: Stats::default(),
            has_loop: false,
            solution: Some(puzzle.solution),
            strict_turns: true,
        };
        state.recompute();
        info!(height, width, seed, status = state.meta.status.as_str(), "new game");
        Ok(state)
    }

    /// Adopt an externally supplied game.
    ///
    /// Checks the structural invariants, recomputes stats and powered flags,
    /// and re-derives `status` from the board. `turn` and `last_move` are
    /// taken as given.
    pub fn from_snapshot(snapshot: GameSnapshot) -> Result<Self, EngineError> {
        let GameSnapshot {
            meta,
            grid,
            last_move,
            ..
        } = snapshot;

        if meta.wraps {
            return Err(EngineError::malformed("wrapping boards are not supported"));
        }
        if meta.height != grid.height() || meta.width != grid.width() {
            return Err(EngineError::malformed(format!(
                "meta says {}x{} but grid is {}x{}",
                meta.height,
                meta.width,
                grid.height(),
                grid.width()
            )));
        }
        match grid.power_count() {
            1 => {}
            0 => return Err(EngineError::malformed("grid has no POWER tile")),
            n => return Err(EngineError::malformed(format!("grid has {} POWER tiles", n))),
        }
        if let Some(mv) = last_move {
            if !grid.in_bounds(mv.row, mv.col) {
                return Err(EngineError::malformed(format!(
                    "last_move ({}, {}) is outside the board",
                    mv.row, mv.col
                )));
            }
        }

        let mut state = Self {
            meta,
            grid,
            last_move,
            stats: Stats::default(),
            has_loop: false,
            solution: None,
            strict_turns: true,
        };
        state.recompute();
        if state.has_loop {
            warn!("loaded board contains a closed loop");
        }
        Ok(state)
    }

    pub fn with_strict_turns(mut self, strict: bool) -> Self {
        self.strict_turns = strict;
        self
    }

    pub fn strict_turns(&self) -> bool {
        self.strict_turns
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn has_loop(&self) -> bool {
        self.has_loop
    }

    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    pub fn status(&self) -> GameStatus {
        self.meta.status
    }

    pub fn turn(&self) -> Actor {
        self.meta.turn
    }

    pub fn solution(&self) -> Option<&[Rotation]> {
        self.solution.as_deref()
    }

    pub fn is_solved(&self) -> bool {
        self.meta.status == GameStatus::Solved
    }

    /// Rotate one tile a quarter turn.
    pub fn apply_rotation(
        &mut self,
        actor: Actor,
        row: usize,
        col: usize,
        delta: RotationDelta,
    ) -> Result<MoveOutcome, EngineError> {
        let idx = self.check_move(actor, row, col)?;
        let target = self.grid.tile(idx).rotation().apply(delta);
        Ok(self.commit(actor, idx, target))
    }

    /// Set one tile to an absolute rotation. Used by CPU moves.
    pub fn apply_absolute_rotation(
        &mut self,
        actor: Actor,
        row: usize,
        col: usize,
        rotation: Rotation,
    ) -> Result<MoveOutcome, EngineError> {
        let idx = self.check_move(actor, row, col)?;
        Ok(self.commit(actor, idx, rotation))
    }

    /// Hand the turn over without touching the board.
    pub fn pass_turn(&mut self, actor: Actor) -> Result<(), EngineError> {
        if self.is_solved() {
            return Err(EngineError::GameOver);
        }
        self.check_turn(actor)?;
        self.meta.turn = actor.other();
        debug!(actor = actor.as_str(), "turn passed");
        Ok(())
    }

    fn check_turn(&self, actor: Actor) -> Result<(), EngineError> {
        if self.strict_turns && self.meta.turn != actor {
            return Err(EngineError::NotYourTurn {
                expected: self.meta.turn,
                actual: actor,
            });
        }
        Ok(())
    }

    fn check_move(&self, actor: Actor, row: usize, col: usize) -> Result<usize, EngineError> {
        let idx = self
            .grid
            .index(row, col)
            .ok_or(EngineError::OutOfBounds { row, col })?;
        if self.is_solved() {
            return Err(EngineError::GameOver);
        }
        self.check_turn(actor)?;
        if self.grid.tile(idx).locked() {
            return Err(EngineError::Locked { row, col });
        }
        Ok(idx)
    }

    fn commit(&mut self, actor: Actor, idx: usize, rotation: Rotation) -> MoveOutcome {
        let previous = self.grid.tile(idx).rotation();
        self.grid.tile_mut(idx).set_rotation(rotation);
        let pos = self.grid.pos(idx);
        let applied = Move {
            actor,
            row: pos.row,
            col: pos.col,
            rotation,
        };
        self.last_move = Some(applied);
        self.recompute();

        if self.is_solved() {
            info!(actor = actor.as_str(), row = pos.row, col = pos.col, "puzzle solved");
        } else {
            self.meta.turn = actor.other();
        }
        debug!(
            actor = actor.as_str(),
            row = pos.row,
            col = pos.col,
            from = previous.degrees(),
            to = rotation.degrees(),
            loose_ends = self.stats.loose_ends,
            "move applied"
        );

        MoveOutcome {
            applied,
            previous,
            stats: self.stats,
        }
    }

    /// Recompute stats, loop flag, powered flags and status from the grid.
    pub fn recompute(&mut self) {
        let analysis = analysis::refresh(&mut self.grid);
        self.stats = analysis.stats;
        self.has_loop = analysis.has_loop;
        self.meta.status = if analysis.stats.solved {
            GameStatus::Solved
        } else {
            GameStatus::Playing
        };
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            meta: self.meta,
            grid: self.grid.clone(),
            last_move: self.last_move,
            stats: self.stats,
            has_loop: self.has_loop,
        }
    }
}
