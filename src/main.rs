//! `nets` command-line entrypoint.
//!
//! Every command except `serve` is a one-shot JSON filter: state documents
//! come in on stdin, results go out on stdout, diagnostics go to stderr.
//!
//! Exit codes: 0 success, 2 malformed input or bad arguments, 1 anything
//! else.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use nets::adapter::document::{parse_state, MoveReply, StateDocument, StatsDoc, UnscrambleReply};
use nets::adapter::{serve_session, Adapter, HelperProcessMover, ServerConfig};
use nets::core::{solve, EngineError, GameState, DEFAULT_BUDGET};
use nets::engine::{choose_cpu_move, GreedyMover, Session, SessionConfig};
use nets::types::{DEFAULT_HEIGHT, DEFAULT_WIDTH};

#[derive(Parser)]
#[command(name = "nets", version, about = "Rotational wire-connection puzzle")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate a new scrambled puzzle and print its state document.
    New {
        height: usize,
        width: usize,
        /// Random when omitted.
        seed: Option<u64>,
    },
    /// Read a state from stdin and print the greedy CPU move.
    Solve,
    /// Read a state from stdin and print its stats.
    Analyze,
    /// Read a state from stdin and search for a full solution.
    Unscramble {
        #[arg(long, default_value_t = DEFAULT_BUDGET)]
        budget: u64,
    },
    /// Serve games over line-delimited JSON on TCP.
    Serve {
        #[arg(long, env = "NETS_HOST", default_value = "127.0.0.1")]
        host: String,
        #[arg(long, env = "NETS_PORT", default_value_t = 7878)]
        port: u16,
        #[arg(long, default_value_t = DEFAULT_HEIGHT)]
        height: usize,
        #[arg(long, default_value_t = DEFAULT_WIDTH)]
        width: usize,
        #[arg(long)]
        seed: Option<u64>,
        /// External CPU helper; the built-in greedy mover is used otherwise.
        #[arg(long, env = "NETS_CPU_HELPER")]
        cpu_helper: Option<PathBuf>,
        /// Do not answer human moves with a CPU move automatically.
        #[arg(long)]
        no_auto_cpu: bool,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("NETS_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_stdin() -> Result<String> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read state from stdin")?;
    Ok(input)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    debug!(command = ?cli.command, "running");
    match cli.command {
        Commands::New {
            height,
            width,
            seed,
        } => {
            let seed = seed.unwrap_or_else(rand::random);
            let game = GameState::new(height, width, seed)?;
            let doc = StateDocument::from_snapshot(&game.snapshot());
            println!("{}", doc.to_json_pretty()?);
            Ok(())
        }
        Commands::Solve => {
            let game = parse_state(&read_stdin()?)?;
            print_json(&MoveReply::from_move(choose_cpu_move(game.grid())))
        }
        Commands::Analyze => {
            let game = parse_state(&read_stdin()?)?;
            print_json(&StatsDoc::from(game.stats()))
        }
        Commands::Unscramble { budget } => {
            let game = parse_state(&read_stdin()?)?;
            let outcome = solve(game.grid(), budget);
            print_json(&UnscrambleReply::new(game.grid(), &outcome))
        }
        Commands::Serve {
            host,
            port,
            height,
            width,
            seed,
            cpu_helper,
            no_auto_cpu,
        } => {
            let seed = seed.unwrap_or_else(rand::random);
            let mut session = Session::with_game(SessionConfig::from_env(), height, width, seed)?;
            let config = ServerConfig {
                host,
                port,
                auto_cpu: !no_auto_cpu,
                ..ServerConfig::from_env()
            };
            let mut adapter = Adapter::start(config)?;
            eprintln!("nets: serving on {}", adapter.local_addr());
            info!(height, width, seed, auto_cpu = !no_auto_cpu, "session ready");

            match cpu_helper {
                Some(path) => serve_session(&mut adapter, &mut session, &mut HelperProcessMover::new(path)),
                None => serve_session(&mut adapter, &mut session, &mut GreedyMover),
            }
            Ok(())
        }
    }
}

/// Malformed input and bad arguments exit with 2.
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<EngineError>() {
        Some(e) if e.is_input_error() => 2,
        _ => 1,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("nets: {:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}
