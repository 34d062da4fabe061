//! Engine error type.
//!
//! Every rejection the engine can produce is a variant here. Boundary
//! layers map variants to stable snake_case codes via [`EngineError::code`].

use nets_types::Actor;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("cell ({row}, {col}) is outside the board")]
    OutOfBounds { row: usize, col: usize },

    #[error("tile at ({row}, {col}) is locked")]
    Locked { row: usize, col: usize },

    #[error("it is {}'s turn, not {}'s", .expected.as_str(), .actual.as_str())]
    NotYourTurn { expected: Actor, actual: Actor },

    #[error("the puzzle is already solved")]
    GameOver,

    #[error("malformed state: {0}")]
    MalformedState(String),

    #[error("cannot generate a {height}x{width} board")]
    GeneratorFailure { height: usize, width: usize },
}

impl EngineError {
    pub fn malformed(message: impl Into<String>) -> Self {
        EngineError::MalformedState(message.into())
    }

    /// Stable machine-readable code used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::OutOfBounds { .. } => "out_of_bounds",
            EngineError::Locked { .. } => "locked",
            EngineError::NotYourTurn { .. } => "not_your_turn",
            EngineError::GameOver => "game_over",
            EngineError::MalformedState(_) => "malformed_state",
            EngineError::GeneratorFailure { .. } => "generator_failure",
        }
    }

    /// True for errors caused by bad input rather than a rejected move.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            EngineError::MalformedState(_) | EngineError::GeneratorFailure { .. }
        )
    }
}
