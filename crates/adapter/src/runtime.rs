//! Adapter runtime integration.
//!
//! Bridges the synchronous game loop with the async TCP server. The tokio
//! runtime runs the server; the thread that owns the [`Session`] pulls
//! commands with [`Adapter::recv_blocking`] and pushes replies back with
//! [`Adapter::send`].

use std::net::SocketAddr;

use anyhow::Context;
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

use nets_engine::{CpuMover, Session};
use nets_types::{Actor, RotationDelta};

use crate::protocol::{create_engine_error, create_state, ServerMessage};
use crate::server::{run_server, ServerConfig};

/// Command delivered to the game loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub command: ClientCommand,
}

/// Command payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    NewGame {
        height: usize,
        width: usize,
        seed: Option<u64>,
    },
    Rotate {
        row: usize,
        col: usize,
        delta: RotationDelta,
    },
    Cpu,
    Snapshot,
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    ToClient {
        client_id: usize,
        message: ServerMessage,
    },
    /// Sent to every client that has completed the handshake.
    Broadcast { message: ServerMessage },
}

/// Running adapter instance.
pub struct Adapter {
    rt: Runtime,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    local_addr: SocketAddr,
    auto_cpu: bool,
}

impl Adapter {
    /// Start the server and wait until it is listening.
    pub fn start(config: ServerConfig) -> anyhow::Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let auto_cpu = config.auto_cpu;
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let (ready_tx, ready_rx) = oneshot::channel();

        let rt = Runtime::new().context("failed to create tokio runtime")?;
        rt.spawn(async move {
            if let Err(e) = run_server(config, cmd_tx, out_rx, Some(ready_tx)).await {
                error!(error = %e, "TCP server stopped");
            }
        });
        let local_addr = rt
            .block_on(ready_rx)
            .context("TCP server failed to start")?;

        Ok(Self {
            rt,
            cmd_rx,
            out_tx,
            local_addr,
            auto_cpu,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait for the next command. `None` once the server has stopped.
    pub fn recv_blocking(&mut self) -> Option<InboundCommand> {
        let rx = &mut self.cmd_rx;
        self.rt.block_on(rx.recv())
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }
}

/// Apply one command to the session and build the replies.
///
/// Successful changes are broadcast to every client; errors and snapshots
/// go only to the requester. With `auto_cpu`, a human move that hands the
/// turn to the CPU is followed by a CPU step and a second broadcast.
pub fn handle_command<M: CpuMover + ?Sized>(
    session: &mut Session,
    mover: &mut M,
    inbound: InboundCommand,
    auto_cpu: bool,
) -> Vec<OutboundMessage> {
    let InboundCommand {
        client_id,
        seq,
        command,
    } = inbound;
    let reply_error = |e| OutboundMessage::ToClient {
        client_id,
        message: create_engine_error(seq, &e),
    };
    let broadcast = |session: &Session| OutboundMessage::Broadcast {
        message: create_state(seq, &session.snapshot()),
    };

    let mut out = Vec::new();
    match command {
        ClientCommand::Snapshot => out.push(OutboundMessage::ToClient {
            client_id,
            message: create_state(seq, &session.snapshot()),
        }),
        ClientCommand::NewGame {
            height,
            width,
            seed,
        } => {
            let seed = seed.unwrap_or_else(rand::random);
            match session.new_game(height, width, seed) {
                Ok(()) => out.push(broadcast(session)),
                Err(e) => out.push(reply_error(e)),
            }
        }
        ClientCommand::Rotate { row, col, delta } => match session.human_move(row, col, delta) {
            Ok(_) => {
                out.push(broadcast(session));
                let state = session.state();
                if auto_cpu && !state.is_solved() && state.turn() == Actor::Cpu {
                    match session.cpu_step_with(mover) {
                        Ok(_) => out.push(broadcast(session)),
                        Err(e) => out.push(reply_error(e)),
                    }
                }
            }
            Err(e) => out.push(reply_error(e)),
        },
        ClientCommand::Cpu => match session.cpu_step_with(mover) {
            Ok(_) => out.push(broadcast(session)),
            Err(e) => out.push(reply_error(e)),
        },
    }
    out
}

/// Run the game loop until the server goes away.
pub fn serve_session<M: CpuMover + ?Sized>(adapter: &mut Adapter, session: &mut Session, mover: &mut M) {
    info!(addr = %adapter.local_addr(), mover = mover.name(), "serving session");
    while let Some(inbound) = adapter.recv_blocking() {
        for msg in handle_command(session, mover, inbound, adapter.auto_cpu) {
            adapter.send(msg);
        }
    }
}
