//! External CPU helper process.
//!
//! The helper receives the state document on stdin and answers on stdout
//! with `{"move": {"row", "col", "rotation"}}` or `{"move": null}`. A
//! non-zero exit status or unparsable output is an error; the session then
//! falls back to the built-in greedy mover.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use anyhow::{bail, Context};
use tracing::debug;

use nets_core::GameSnapshot;
use nets_engine::CpuMover;
use nets_types::{Actor, Move};

use crate::document::{MoveReply, StateDocument};

#[derive(Debug, Clone)]
pub struct HelperProcessMover {
    program: PathBuf,
    args: Vec<String>,
}

impl HelperProcessMover {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Helper named by `NETS_CPU_HELPER`, if set and non-empty.
    pub fn from_env() -> Option<Self> {
        std::env::var("NETS_CPU_HELPER")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(Self::new)
    }

    fn run(&self, input: &str) -> anyhow::Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to start CPU helper {}", self.program.display()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.as_bytes())
                .context("failed to write state to CPU helper")?;
        }

        let output = child
            .wait_with_output()
            .context("failed to wait for CPU helper")?;
        if !output.status.success() {
            bail!(
                "CPU helper exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        String::from_utf8(output.stdout).context("CPU helper wrote non-UTF-8 output")
    }
}

impl CpuMover for HelperProcessMover {
    type Error = anyhow::Error;

    fn name(&self) -> &str {
        "helper"
    }

    fn choose_move(&mut self, snapshot: &GameSnapshot) -> anyhow::Result<Option<Move>> {
        let input = StateDocument::from_snapshot(snapshot).to_json()?;
        let output = self.run(&input)?;
        let reply: MoveReply = serde_json::from_str(output.trim())
            .with_context(|| format!("CPU helper reply is not a move: {:?}", output.trim()))?;
        debug!(program = %self.program.display(), ?reply, "CPU helper replied");
        Ok(reply.into_move(Actor::Cpu))
    }
}
