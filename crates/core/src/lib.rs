//! Core engine - pure, deterministic, and testable
//!
//! This crate holds the puzzle rules: the tile model, the grid, the
//! connectivity analyzer, the generator, the solver, and the move engine.
//! It does no I/O; boundaries live in `nets-adapter`.
//!
//! - **Deterministic**: the same `(height, width, seed)` yields the same board
//! - **Testable**: every rule is a plain function over a [`Grid`]
//! - **Portable**: no threads, sockets or files
//!
//! # Module Structure
//!
//! - [`tile`]: shapes, side masks and rotation
//! - [`grid`]: row-major board storage and neighbour lookups
//! - [`analysis`]: loose ends, components, power flow, loops, win check
//! - [`rng`]: seeded RNG used by the generator
//! - [`generator`]: spanning-tree puzzle generation and scrambling
//! - [`solver`]: bounded backtracking solver
//! - [`game_state`]: [`GameState`] and the move engine
//! - [`snapshot`]: owned copies handed to boundaries
//! - [`error`]: [`EngineError`]
//!
//! # Rules
//!
//! - Exactly one Power tile, locked at rotation 0
//! - Players alternate; each move turns one unlocked tile
//! - The board is solved with no loose ends, one component, and every
//!   non-Empty tile powered
//!
//! # Example
//!
//! ```
//! use nets_core::GameState;
//! use nets_types::{Actor, GameStatus, RotationDelta};
//!
//! let mut game = GameState::new(3, 3, 0).unwrap();
//! assert_eq!(game.status(), GameStatus::Playing);
//! assert_eq!(game.turn(), Actor::Human);
//!
//! // The centre holds Power, which never turns.
//! assert!(game.apply_rotation(Actor::Human, 1, 1, RotationDelta::Cw).is_err());
//!
//! game.apply_rotation(Actor::Human, 0, 0, RotationDelta::Cw).unwrap();
//! assert!(game.is_solved() || game.turn() == Actor::Cpu);
//! ```

pub mod analysis;
pub mod error;
pub mod game_state;
pub mod generator;
pub mod grid;
pub mod rng;
pub mod snapshot;
pub mod solver;
pub mod tile;

pub use nets_types as types;

pub use analysis::{analyze, refresh, Analysis, Stats};
pub use error::EngineError;
pub use game_state::{GameState, MoveOutcome};
pub use generator::{build_solved, generate, Puzzle};
pub use grid::Grid;
pub use rng::SimpleRng;
pub use snapshot::{GameSnapshot, Meta};
pub use solver::{solve, SolveOutcome, DEFAULT_BUDGET};
pub use tile::{Shape, Sides, Tile};
