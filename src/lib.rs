//! Nets (workspace facade crate).
//!
//! The implementation lives in dedicated crates under `crates/`; this
//! package re-exports them as `nets::{types,core,engine,adapter}` and ships
//! the `nets` binary.

pub use nets_adapter as adapter;
pub use nets_core as core;
pub use nets_engine as engine;
pub use nets_types as types;
