//! Protocol messages for the TCP adapter
//!
//! Line-delimited JSON. Every message has a `type` and a `seq`; a client's
//! `seq` must strictly increase. Server replies echo the `seq` of the
//! request they answer and carry a millisecond timestamp `ts`.
//!
//! ```text
//! -> {"type":"hello","seq":1,"client":"nc"}
//! <- {"type":"welcome","seq":1,"ts":...,"protocol_version":"1.0.0","client_id":1}
//! <- {"type":"state","seq":1,"ts":...,"state":{...}}
//! -> {"type":"rotate","seq":2,"row":0,"col":1,"delta":90}
//! <- {"type":"state","seq":2,"ts":...,"state":{...}}
//! -> {"type":"rotate","seq":3,"row":9,"col":9,"delta":90}
//! <- {"type":"error","seq":3,"ts":...,"code":"out_of_bounds","message":"..."}
//! ```

use serde::{Deserialize, Serialize};

use nets_core::{EngineError, GameSnapshot};

use crate::document::StateDocument;

pub const PROTOCOL_VERSION: &str = "1.0.0";

/// Client -> server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Hello {
        seq: u64,
        #[serde(default)]
        client: Option<String>,
    },
    NewGame {
        seq: u64,
        height: usize,
        width: usize,
        #[serde(default)]
        seed: Option<u64>,
    },
    Rotate {
        seq: u64,
        row: usize,
        col: usize,
        /// +90 (clockwise) or -90 (counter-clockwise).
        delta: i64,
    },
    Cpu {
        seq: u64,
    },
    Snapshot {
        seq: u64,
    },
}

impl ClientMessage {
    pub fn seq(&self) -> u64 {
        match self {
            ClientMessage::Hello { seq, .. }
            | ClientMessage::NewGame { seq, .. }
            | ClientMessage::Rotate { seq, .. }
            | ClientMessage::Cpu { seq }
            | ClientMessage::Snapshot { seq } => *seq,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    HandshakeRequired,
    InvalidCommand,
    Backpressure,
    OutOfBounds,
    Locked,
    NotYourTurn,
    GameOver,
    MalformedState,
    GeneratorFailure,
}

impl From<&EngineError> for ErrorCode {
    fn from(e: &EngineError) -> Self {
        match e {
            EngineError::OutOfBounds { .. } => ErrorCode::OutOfBounds,
            EngineError::Locked { .. } => ErrorCode::Locked,
            EngineError::NotYourTurn { .. } => ErrorCode::NotYourTurn,
            EngineError::GameOver => ErrorCode::GameOver,
            EngineError::MalformedState(_) => ErrorCode::MalformedState,
            EngineError::GeneratorFailure { .. } => ErrorCode::GeneratorFailure,
        }
    }
}

/// Server -> client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        seq: u64,
        ts: u64,
        protocol_version: String,
        client_id: u64,
    },
    State {
        seq: u64,
        ts: u64,
        state: StateDocument,
    },
    Error {
        seq: u64,
        ts: u64,
        code: ErrorCode,
        message: String,
    },
}

impl ServerMessage {
    pub fn seq(&self) -> u64 {
        match self {
            ServerMessage::Welcome { seq, .. }
            | ServerMessage::State { seq, .. }
            | ServerMessage::Error { seq, .. } => *seq,
        }
    }
}

pub fn parse_message(json: &str) -> Result<ClientMessage, serde_json::Error> {
    serde_json::from_str(json)
}

pub fn create_welcome(seq: u64, protocol_version: &str, client_id: u64) -> ServerMessage {
    ServerMessage::Welcome {
        seq,
        ts: current_timestamp_ms(),
        protocol_version: protocol_version.to_string(),
        client_id,
    }
}

pub fn create_state(seq: u64, snapshot: &GameSnapshot) -> ServerMessage {
    ServerMessage::State {
        seq,
        ts: current_timestamp_ms(),
        state: StateDocument::from_snapshot(snapshot),
    }
}

pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ServerMessage {
    ServerMessage::Error {
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

pub fn create_engine_error(seq: u64, err: &EngineError) -> ServerMessage {
    create_error(seq, ErrorCode::from(err), &err.to_string())
}

/// Get current timestamp in milliseconds
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Pull `seq` out of a line that failed to parse, so the error can echo it.
pub(crate) fn extract_seq_best_effort(line: &str) -> u64 {
    serde_json::from_str::<serde_json::Value>(line)
        .ok()
        .and_then(|v| v.get("seq").and_then(|s| s.as_u64()))
        .unwrap_or(0)
}
