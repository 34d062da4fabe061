//! TCP server for remote players
//!
//! Handles incoming connections and manages client lifecycle. The server
//! never touches the game: parsed requests are forwarded as
//! [`InboundCommand`]s over a bounded channel and replies come back as
//! [`OutboundMessage`]s.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};

use nets_types::RotationDelta;

use crate::protocol::*;
use crate::runtime::{ClientCommand, InboundCommand, OutboundMessage};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    pub max_pending_commands: usize,
    /// Let the CPU answer automatically after each human move.
    pub auto_cpu: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 16,
            auto_cpu: true,
        }
    }
}

impl ServerConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("NETS_HOST").unwrap_or(defaults.host);
        let port = env::var("NETS_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = env::var("NETS_MAX_PENDING")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_pending_commands);

        Self {
            host,
            port,
            max_pending_commands,
            ..defaults
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Handle to a connected client
struct ClientHandle {
    id: usize,
    handshaken: bool,
    last_seq: Option<u64>,
    tx: mpsc::UnboundedSender<ServerMessage>,
}

/// Shared server state
struct ServerState {
    config: ServerConfig,
    clients: RwLock<Vec<ClientHandle>>,
}

impl ServerState {
    async fn is_handshaken(&self, client_id: usize) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.handshaken)
            .unwrap_or(false)
    }

    async fn mark_handshaken(&self, client_id: usize, seq: u64) {
        let mut clients = self.clients.write().await;
        if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
            client.handshaken = true;
            client.last_seq = Some(seq);
        }
    }

    /// Record `seq` if it is newer than the last one seen.
    async fn check_and_update_seq(&self, client_id: usize, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
            return true;
        };
        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }

    async fn send_to(&self, client_id: usize, message: ServerMessage) {
        let clients = self.clients.read().await;
        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
            let _ = c.tx.send(message);
        }
    }

    async fn broadcast(&self, message: ServerMessage) {
        let clients = self.clients.read().await;
        for c in clients.iter().filter(|c| c.handshaken) {
            let _ = c.tx.send(message.clone());
        }
    }
}

/// Start the TCP server
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.bind_addr()).await?;
    let bound = listener.local_addr()?;
    info!(addr = %bound, "TCP server listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState {
        config,
        clients: RwLock::new(Vec::new()),
    });
    let mut client_id_counter = 0usize;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                match msg {
                    OutboundMessage::ToClient { client_id, message } => {
                        state.send_to(client_id, message).await;
                    }
                    OutboundMessage::Broadcast { message } => {
                        state.broadcast(message).await;
                    }
                }
            }
        });
    }

    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        info!(client_id, %addr, "client connected");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, client_id, state, command_tx).await {
                warn!(client_id, error = %e, "client error");
            }
            info!(client_id, "client disconnected");
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    state.clients.write().await.push(ClientHandle {
        id: client_id,
        handshaken: false,
        last_seq: None,
        tx: tx.clone(),
    });

    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            if serde_json::to_writer(&mut buf, &msg).is_err() {
                continue;
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() || writer.flush().await.is_err() {
                break;
            }
        }
    });

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let request = line.trim();
        if request.is_empty() {
            continue;
        }

        match parse_message(request) {
            Ok(message) => {
                debug!(client_id, seq = message.seq(), ?message, "request");
                route(&state, &command_tx, &tx, client_id, message).await;
            }
            Err(e) => {
                let _ = tx.send(create_error(
                    extract_seq_best_effort(request),
                    ErrorCode::InvalidCommand,
                    &format!("malformed request: {}", e),
                ));
            }
        }
    }

    state.clients.write().await.retain(|c| c.id != client_id);
    drop(tx);
    let _ = write_task.await;
    Ok(())
}

/// Apply handshake and ordering rules, then hand the request to the game
/// loop. Rejections are answered directly on `client_tx`.
async fn route(
    state: &ServerState,
    command_tx: &mpsc::Sender<InboundCommand>,
    client_tx: &mpsc::UnboundedSender<ServerMessage>,
    client_id: usize,
    message: ClientMessage,
) {
    let seq = message.seq();
    let reject = |code: ErrorCode, text: &str| {
        let _ = client_tx.send(create_error(seq, code, text));
    };

    let handshaken = state.is_handshaken(client_id).await;
    let is_hello = matches!(message, ClientMessage::Hello { .. });
    if !handshaken && !is_hello {
        reject(ErrorCode::HandshakeRequired, "send hello first");
        return;
    }
    if handshaken && !state.check_and_update_seq(client_id, seq).await {
        reject(ErrorCode::InvalidCommand, "seq must be strictly increasing");
        return;
    }

    let command = if is_hello {
        state.mark_handshaken(client_id, seq).await;
        let _ = client_tx.send(create_welcome(
            seq,
            &state.config.protocol_version,
            client_id as u64,
        ));
        // New clients get the current board right away.
        ClientCommand::Snapshot
    } else {
        match map_command(message) {
            Ok(command) => command,
            Err(text) => {
                reject(ErrorCode::InvalidCommand, &text);
                return;
            }
        }
    };

    let inbound = InboundCommand {
        client_id,
        seq,
        command,
    };
    if command_tx.try_send(inbound).is_err() {
        reject(ErrorCode::Backpressure, "command queue is full");
    }
}

/// Map a protocol message into an engine command.
fn map_command(message: ClientMessage) -> Result<ClientCommand, String> {
    match message {
        ClientMessage::Hello { .. } => Err("unexpected hello".to_string()),
        ClientMessage::NewGame {
            height,
            width,
            seed,
            ..
        } => Ok(ClientCommand::NewGame {
            height,
            width,
            seed,
        }),
        ClientMessage::Rotate {
            row, col, delta, ..
        } => RotationDelta::from_degrees(delta)
            .map(|delta| ClientCommand::Rotate { row, col, delta })
            .ok_or_else(|| format!("delta must be 90 or -90, got {}", delta)),
        ClientMessage::Cpu { .. } => Ok(ClientCommand::Cpu),
        ClientMessage::Snapshot { .. } => Ok(ClientCommand::Snapshot),
    }
}
