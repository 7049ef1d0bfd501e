//! One engine subprocess, owned for the lifetime of a single request
//!
//! Spawns the engine and speaks just enough UCI to get a best move back.

use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tracing::{debug, warn};

use super::parser::{OutputParser, Verdict};
use crate::error::{Error, Result};

/// What the engine reported before `bestmove`
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub best_move: String,
    pub evaluation: String,
    pub mate: Option<i32>,
}

pub struct EngineSession {
    /// The child process
    process: Child,
    /// Stdin for sending commands
    stdin: ChildStdin,
    /// Raw stdout, read in chunks
    stdout: ChildStdout,
}

impl EngineSession {
    /// Launches the engine described by `command`
    ///
    /// The pipes are set up here; the caller only picks program and arguments.
    pub fn spawn(mut command: Command) -> Result<Self> {
        let mut process = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(Error::Launch)?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| Error::Launch(missing_pipe("stdin")))?;

        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| Error::Launch(missing_pipe("stdout")))?;

        if let Some(stderr) = process.stderr.take() {
            tokio::spawn(log_stderr(stderr));
        }

        Ok(EngineSession {
            process,
            stdin,
            stdout,
        })
    }

    /// Sends a command line to the engine
    async fn send(&mut self, cmd: &str) -> Result<()> {
        self.stdin.write_all(format!("{}\n", cmd).as_bytes()).await?;
        self.stdin.flush().await?;
        Ok(())
    }

    /// Runs one search and waits for `bestmove`
    ///
    /// All three commands go out before any output is read.
    pub async fn search(&mut self, fen: &str, depth: u32) -> Result<SearchOutcome> {
        self.send("uci").await?;
        self.send(&format!("position fen {}", fen)).await?;
        self.send(&format!("go depth {}", depth)).await?;

        let mut parser = OutputParser::new();
        let mut buf = [0u8; 4096];

        let verdict = loop {
            let n = self.stdout.read(&mut buf).await?;
            if n == 0 {
                debug!("engine closed stdout");
                break parser.finish();
            }
            if let Some(verdict) = parser.feed(&buf[..n]) {
                break Some(verdict);
            }
        };

        match verdict {
            Some(Verdict::Move(best_move)) => Ok(SearchOutcome {
                best_move,
                evaluation: parser.evaluation(),
                mate: parser.mate(),
            }),
            Some(Verdict::NoMove) | None => Err(Error::MissingBestMove),
        }
    }

    /// Kills the engine and reaps it
    pub async fn terminate(mut self) -> Option<ExitStatus> {
        if let Err(e) = self.process.start_kill() {
            // Already exited on its own
            debug!("kill skipped: {}", e);
        }
        match self.process.wait().await {
            Ok(status) => Some(status),
            Err(e) => {
                warn!("failed to reap engine: {}", e);
                None
            }
        }
    }
}

fn missing_pipe(name: &str) -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::BrokenPipe,
        format!("Failed to open {}", name),
    )
}

/// Drains stderr until the engine closes it
///
/// Lines are logged lossily; the pipe must stay open for as long as the
/// engine runs or its next write would kill it.
async fn log_stderr(stderr: ChildStderr) {
    let mut reader = BufReader::new(stderr);
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => warn!("engine stderr: {}", String::from_utf8_lossy(&line).trim_end()),
            Err(e) => {
                debug!("engine stderr closed: {}", e);
                break;
            }
        }
    }
}
