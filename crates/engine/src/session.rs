//! Game session - the single mutation entry point for a running game.
//!
//! Boundaries (CLI, TCP adapter) never touch a [`GameState`] directly; they
//! go through a [`Session`], which applies the configured turn policy and
//! takes care of CPU fallback.

use nets_core::{EngineError, GameSnapshot, GameState, MoveOutcome};
use nets_types::{Actor, Move, Rotation, RotationDelta, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use tracing::{info, warn};

use crate::cpu::{choose_cpu_move, CpuMover, GreedyMover};

/// Session settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Reject moves made out of turn.
    pub strict_turns: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { strict_turns: true }
    }
}

impl SessionConfig {
    /// Read `NETS_RELAXED_TURNS` (`1` or `true` relaxes turn order).
    pub fn from_env() -> Self {
        let relaxed = std::env::var("NETS_RELAXED_TURNS")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        Self {
            strict_turns: !relaxed,
        }
    }
}

/// What a CPU step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuStep {
    Moved(MoveOutcome),
    /// Nothing could turn; the turn went back to the human.
    Passed,
}

#[derive(Debug, Clone)]
enum Origin {
    Generated { height: usize, width: usize, seed: u64 },
    Loaded(GameSnapshot),
}

#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    game: GameState,
    origin: Origin,
}

impl Session {
    /// Start with a default-sized board generated from seed 0.
    pub fn new(config: SessionConfig) -> Result<Self, EngineError> {
        Self::with_game(config, DEFAULT_HEIGHT, DEFAULT_WIDTH, 0)
    }

    pub fn with_game(
        config: SessionConfig,
        height: usize,
        width: usize,
        seed: u64,
    ) -> Result<Self, EngineError> {
        let game = GameState::new(height, width, seed)?.with_strict_turns(config.strict_turns);
        Ok(Self {
            config,
            game,
            origin: Origin::Generated {
                height,
                width,
                seed,
            },
        })
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn state(&self) -> &GameState {
        &self.game
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.game.snapshot()
    }

    /// Replace the current game. The old game survives a failure.
    pub fn new_game(&mut self, height: usize, width: usize, seed: u64) -> Result<(), EngineError> {
        *self = Self::with_game(self.config, height, width, seed)?;
        Ok(())
    }

    /// Start the current puzzle over from its initial position.
    pub fn reset(&mut self) -> Result<(), EngineError> {
        match self.origin.clone() {
            Origin::Generated {
                height,
                width,
                seed,
            } => self.new_game(height, width, seed),
            Origin::Loaded(snapshot) => self.load(snapshot),
        }
    }

    /// Adopt an external game. The old game survives a failure.
    pub fn load(&mut self, snapshot: GameSnapshot) -> Result<(), EngineError> {
        let game = GameState::from_snapshot(snapshot.clone())?
            .with_strict_turns(self.config.strict_turns);
        info!(
            height = game.meta().height,
            width = game.meta().width,
            status = game.status().as_str(),
            "game loaded"
        );
        self.game = game;
        self.origin = Origin::Loaded(snapshot);
        Ok(())
    }

    pub fn human_move(
        &mut self,
        row: usize,
        col: usize,
        delta: RotationDelta,
    ) -> Result<MoveOutcome, EngineError> {
        self.game.apply_rotation(Actor::Human, row, col, delta)
    }

    pub fn human_set_rotation(
        &mut self,
        row: usize,
        col: usize,
        rotation: Rotation,
    ) -> Result<MoveOutcome, EngineError> {
        self.game
            .apply_absolute_rotation(Actor::Human, row, col, rotation)
    }

    /// Let the built-in greedy mover play one move.
    pub fn cpu_step(&mut self) -> Result<CpuStep, EngineError> {
        self.cpu_step_with(&mut GreedyMover)
    }

    /// Let `mover` play one move, falling back to the greedy mover when it
    /// fails or proposes something unplayable.
    pub fn cpu_step_with<M: CpuMover + ?Sized>(
        &mut self,
        mover: &mut M,
    ) -> Result<CpuStep, EngineError> {
        if self.game.is_solved() {
            return Err(EngineError::GameOver);
        }
        if self.config.strict_turns && self.game.turn() != Actor::Cpu {
            return Err(EngineError::NotYourTurn {
                expected: self.game.turn(),
                actual: Actor::Cpu,
            });
        }

        let snapshot = self.game.snapshot();
        let proposal = match mover.choose_move(&snapshot) {
            Ok(Some(mv)) if self.playable_target(&mv) => Some(mv),
            Ok(Some(mv)) => {
                warn!(
                    mover = mover.name(),
                    row = mv.row,
                    col = mv.col,
                    "CPU proposed an unplayable move, using greedy fallback"
                );
                choose_cpu_move(&snapshot.grid)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(mover = mover.name(), error = %e, "CPU mover failed, using greedy fallback");
                choose_cpu_move(&snapshot.grid)
            }
        };

        match proposal {
            Some(mv) => self
                .game
                .apply_absolute_rotation(Actor::Cpu, mv.row, mv.col, mv.rotation)
                .map(CpuStep::Moved),
            None => {
                self.game.pass_turn(Actor::Cpu)?;
                Ok(CpuStep::Passed)
            }
        }
    }

    fn playable_target(&self, mv: &Move) -> bool {
        self.game
            .grid()
            .get(mv.row, mv.col)
            .map_or(false, |t| !t.locked() && !t.is_empty())
    }

    /// Next step towards the reference solution of a generated game.
    ///
    /// Picks the first tile, in row-major order, whose wiring differs from
    /// the solution. Loaded games have no reference solution.
    pub fn hint(&self) -> Option<Move> {
        let solution = self.game.solution()?;
        let grid = self.game.grid();
        grid.tiles()
            .iter()
            .zip(solution)
            .enumerate()
            .find(|(_, (tile, target))| {
                !tile.locked() && tile.connections() != tile.connections_at(**target)
            })
            .map(|(idx, (_, target))| {
                let pos = grid.pos(idx);
                Move {
                    actor: Actor::Human,
                    row: pos.row,
                    col: pos.col,
                    rotation: *target,
                }
            })
    }
}
