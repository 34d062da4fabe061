use std::io::{BufRead, BufReader as StdBufReader, Write};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};

use nets::adapter::protocol::{create_state, ErrorCode, ServerMessage};
use nets::adapter::server::{run_server, ServerConfig};
use nets::adapter::{serve_session, Adapter, ClientCommand, InboundCommand, OutboundMessage};
use nets::engine::{GreedyMover, Session, SessionConfig};
use nets::types::RotationDelta;

fn test_config(max_pending_commands: usize) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        max_pending_commands,
        ..ServerConfig::default()
    }
}

async fn next_json<R>(lines: &mut tokio::io::Lines<R>) -> serde_json::Value
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let line = tokio::time::timeout(Duration::from_secs(2), lines.next_line())
        .await
        .expect("timed out waiting for a line")
        .unwrap()
        .expect("connection closed");
    serde_json::from_str(&line).unwrap()
}

#[tokio::test]
async fn adapter_hello_rotate_and_broadcast() {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<InboundCommand>(8);
    let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let (ready_tx, ready_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        let _ = run_server(test_config(8), cmd_tx, out_rx, Some(ready_tx)).await;
    });

    let addr = tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .expect("server did not signal ready")
        .expect("ready channel dropped");

    let stream = TcpStream::connect(addr).await.expect("connect failed");
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    // Anything before hello is refused.
    write_half
        .write_all(b"{\"type\":\"snapshot\",\"seq\":1}\n")
        .await
        .unwrap();
    let refused = next_json(&mut lines).await;
    assert_eq!(refused["type"], "error");
    assert_eq!(refused["code"], "handshake_required");

    write_half
        .write_all(b"{\"type\":\"hello\",\"seq\":2,\"client\":\"e2e\"}\n")
        .await
        .unwrap();
    let welcome = next_json(&mut lines).await;
    assert_eq!(welcome["type"], "welcome");
    assert_eq!(welcome["seq"], 2);
    assert_eq!(welcome["protocol_version"], "1.0.0");

    // The handshake queues a snapshot for the new client.
    let inbound = tokio::time::timeout(Duration::from_secs(2), cmd_rx.recv())
        .await
        .unwrap()
        .expect("expected snapshot command");
    assert_eq!(inbound.command, ClientCommand::Snapshot);

    write_half
        .write_all(b"{\"type\":\"rotate\",\"seq\":3,\"row\":1,\"col\":2,\"delta\":-90}\n")
        .await
        .unwrap();
    let inbound = tokio::time::timeout(Duration::from_secs(2), cmd_rx.recv())
        .await
        .unwrap()
        .expect("expected rotate command");
    assert_eq!(inbound.seq, 3);
    assert_eq!(
        inbound.command,
        ClientCommand::Rotate {
            row: 1,
            col: 2,
            delta: RotationDelta::Ccw
        }
    );

    // Broadcast reaches the handshaken client.
    let session = Session::new(SessionConfig::default()).unwrap();
    out_tx
        .send(OutboundMessage::Broadcast {
            message: create_state(3, &session.snapshot()),
        })
        .unwrap();
    let state = next_json(&mut lines).await;
    assert_eq!(state["type"], "state");
    assert_eq!(state["seq"], 3);
    assert_eq!(state["state"]["meta"]["height"], 5);

    // Replayed seq is rejected without reaching the engine.
    write_half
        .write_all(b"{\"type\":\"cpu\",\"seq\":3}\n")
        .await
        .unwrap();
    let stale = next_json(&mut lines).await;
    assert_eq!(stale["code"], "invalid_command");
    assert!(cmd_rx.try_recv().is_err());

    server_handle.abort();
}

#[tokio::test]
async fn adapter_backpressure_returns_error() {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<InboundCommand>(1);
    let (_out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let (ready_tx, ready_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        let _ = run_server(test_config(1), cmd_tx, out_rx, Some(ready_tx)).await;
    });

    let addr = tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .unwrap()
        .unwrap();

    let stream = TcpStream::connect(addr).await.unwrap();
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    // The handshake snapshot fills the single queue slot.
    write_half
        .write_all(b"{\"type\":\"hello\",\"seq\":1}\n")
        .await
        .unwrap();
    let welcome = next_json(&mut lines).await;
    assert_eq!(welcome["type"], "welcome");

    write_half
        .write_all(b"{\"type\":\"cpu\",\"seq\":2}\n")
        .await
        .unwrap();
    let error = next_json(&mut lines).await;
    assert_eq!(error["type"], "error");
    assert_eq!(error["seq"], 2);
    assert_eq!(error["code"], "backpressure");

    let queued = cmd_rx.recv().await.unwrap();
    assert_eq!(queued.command, ClientCommand::Snapshot);

    server_handle.abort();
}

#[tokio::test]
async fn adapter_rejects_bad_lines() {
    let (cmd_tx, _cmd_rx) = mpsc::channel::<InboundCommand>(4);
    let (_out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let (ready_tx, ready_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        let _ = run_server(test_config(4), cmd_tx, out_rx, Some(ready_tx)).await;
    });
    let addr = ready_rx.await.unwrap();

    let stream = TcpStream::connect(addr).await.unwrap();
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    write_half.write_all(b"{\"type\":\"hello\",\"seq\":1}\n").await.unwrap();
    let _welcome = next_json(&mut lines).await;

    write_half
        .write_all(b"{\"type\":\"dance\",\"seq\":5}\n")
        .await
        .unwrap();
    let unknown = next_json(&mut lines).await;
    assert_eq!(unknown["code"], "invalid_command");
    assert_eq!(unknown["seq"], 5);

    write_half
        .write_all(b"{\"type\":\"rotate\",\"seq\":6,\"row\":0,\"col\":0,\"delta\":180}\n")
        .await
        .unwrap();
    let bad_delta = next_json(&mut lines).await;
    assert_eq!(bad_delta["code"], "invalid_command");
    assert_eq!(bad_delta["seq"], 6);

    server_handle.abort();
}

fn read_message(reader: &mut StdBufReader<std::net::TcpStream>) -> ServerMessage {
    let mut line = String::new();
    reader.read_line(&mut line).unwrap();
    serde_json::from_str(line.trim()).unwrap()
}

/// Full loop: the real adapter, a session on its own thread, a blocking client.
#[test]
fn served_session_answers_moves() {
    let (addr_tx, addr_rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let mut adapter = Adapter::start(test_config(8)).unwrap();
        addr_tx.send(adapter.local_addr()).unwrap();
        let mut session = Session::with_game(SessionConfig::default(), 4, 4, 17).unwrap();
        serve_session(&mut adapter, &mut session, &mut GreedyMover);
    });
    let addr = addr_rx.recv_timeout(Duration::from_secs(5)).unwrap();

    let stream = std::net::TcpStream::connect(addr).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let mut writer = stream.try_clone().unwrap();
    let mut reader = StdBufReader::new(stream);

    writer.write_all(b"{\"type\":\"hello\",\"seq\":1}\n").unwrap();
    assert!(matches!(read_message(&mut reader), ServerMessage::Welcome { seq: 1, .. }));
    let initial = match read_message(&mut reader) {
        ServerMessage::State { seq: 1, state, .. } => state,
        other => panic!("expected initial state, got {:?}", other),
    };
    assert_eq!(initial.meta.seed, 17);

    // Power sits in the centre and never turns.
    writer
        .write_all(b"{\"type\":\"rotate\",\"seq\":2,\"row\":2,\"col\":2,\"delta\":90}\n")
        .unwrap();
    match read_message(&mut reader) {
        ServerMessage::Error { seq: 2, code, .. } => assert_eq!(code, ErrorCode::Locked),
        other => panic!("expected locked error, got {:?}", other),
    }

    writer
        .write_all(b"{\"type\":\"rotate\",\"seq\":3,\"row\":0,\"col\":0,\"delta\":90}\n")
        .unwrap();
    let after_human = match read_message(&mut reader) {
        ServerMessage::State { seq: 3, state, .. } => state,
        other => panic!("expected state, got {:?}", other),
    };
    let last = after_human.last_move.expect("move recorded");
    assert_eq!((last.row, last.col), (0, 0));

    if !after_human.stats.map_or(false, |s| s.solved) {
        // The CPU answers on its own.
        match read_message(&mut reader) {
            ServerMessage::State { seq: 3, state, .. } => {
                assert_eq!(state.last_move.map(|m| m.actor), Some(nets::types::Actor::Cpu));
            }
            other => panic!("expected CPU state, got {:?}", other),
        }
    }
}
