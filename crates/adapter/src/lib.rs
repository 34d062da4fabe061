//! Boundary adapters - state documents, CPU helpers and the TCP server
//!
//! Everything that crosses a process or network boundary lives here. The
//! engine crates stay free of I/O and serde.
//!
//! # Pieces
//!
//! - [`document`]: the JSON state document (serde), helper replies and
//!   CLI outputs
//! - [`helper`]: [`HelperProcessMover`], a CPU that runs an external program
//! - [`protocol`]: line-delimited JSON messages for remote play
//! - [`server`]: tokio TCP server; parses requests, enforces handshake and
//!   `seq` ordering, applies backpressure
//! - [`runtime`]: [`Adapter`] bridge plus the synchronous game loop
//!   ([`serve_session`]) that owns the [`nets_engine::Session`]
//!
//! # Environment Variables
//!
//! - `NETS_HOST`: bind address (default: "127.0.0.1")
//! - `NETS_PORT`: port number (default: 7878)
//! - `NETS_MAX_PENDING`: bounded command queue length (default: 16)
//! - `NETS_CPU_HELPER`: path to an external CPU helper executable
//!
//! # Testing
//!
//! Connect with netcat:
//!
//! ```bash
//! nc 127.0.0.1 7878
//! {"type":"hello","seq":1}
//! {"type":"rotate","seq":2,"row":0,"col":0,"delta":90}
//! ```

pub mod document;
pub mod helper;
pub mod protocol;
pub mod runtime;
pub mod server;

pub use nets_core as core;
pub use nets_engine as engine;
pub use nets_types as types;

pub use document::{parse_state, MoveReply, StateDocument, UnscrambleReply};
pub use helper::HelperProcessMover;
pub use protocol::*;
pub use runtime::{handle_command, serve_session, Adapter, ClientCommand, InboundCommand, OutboundMessage};
pub use server::{run_server, ServerConfig};
