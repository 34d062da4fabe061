//! Engine layer: CPU opponent and game session.
//!
//! [`Session`] wraps a [`nets_core::GameState`] with the turn policy and the
//! CPU seam. The CPU is anything implementing [`CpuMover`]; the built-in
//! [`GreedyMover`] is always available as a fallback.

pub mod cpu;
pub mod session;

pub use cpu::{choose_cpu_move, CpuMover, GreedyMover};
pub use session::{CpuStep, Session, SessionConfig};
