// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subshell execution with deadline and bounded output capture.

use parking_lot::Mutex;
use sc_core::TIMEOUT_EXIT_CODE;
use std::path::Path;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;

/// Appended when captured output exceeds the configured bound.
pub(crate) const TRUNCATION_MARKER: &str = "\n[output truncated]";

/// Appended when the per-command deadline fires.
pub(crate) const TIMEOUT_MARKER: &str = "command timed out";

/// How long to wait for the pipe readers after the child has exited or
/// been killed. A killed shell can leave grandchildren holding the
/// pipes open; partial capture wins over waiting them out.
const READER_GRACE: Duration = Duration::from_millis(250);

/// Errors launching or awaiting a gate command (not rejections).
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("spawn {command:?}: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
    #[error("wait for {command:?}: {source}")]
    Wait {
        command: String,
        source: std::io::Error,
    },
    #[error("gate execution cancelled")]
    Cancelled,
}

/// Outcome of one gate command.
#[derive(Debug)]
pub(crate) struct CommandOutput {
    pub exit_code: i32,
    /// Merged stdout+stderr, bounded and truncation-marked.
    pub output: String,
    pub duration: Duration,
}

/// Bounded capture buffer shared with a pipe-reader task.
#[derive(Default)]
struct Capture {
    buf: Mutex<Vec<u8>>,
    truncated: AtomicBool,
}

impl Capture {
    fn push(&self, chunk: &[u8], limit: usize) {
        let mut buf = self.buf.lock();
        if buf.len() >= limit {
            self.truncated.store(true, Ordering::Relaxed);
            return;
        }
        let take = chunk.len().min(limit - buf.len());
        buf.extend_from_slice(&chunk[..take]);
        if take < chunk.len() {
            self.truncated.store(true, Ordering::Relaxed);
        }
    }
}

/// Run one command under `sh -c` in `workdir`.
///
/// Output is captured into a bounded buffer. On deadline the child is
/// killed, the exit code is recorded as [`TIMEOUT_EXIT_CODE`], and
/// `"command timed out"` is appended to whatever was captured.
pub(crate) async fn run_command(
    command: &str,
    workdir: &Path,
    timeout: Duration,
    output_limit: usize,
    cancel: &CancellationToken,
) -> Result<CommandOutput, ExecError> {
    let start = Instant::now();

    let mut child = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(workdir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ExecError::Spawn { command: command.to_string(), source })?;

    // Readers drain the pipes concurrently so a chatty child never
    // blocks on a full pipe while we wait on its exit.
    let stdout_cap = Arc::new(Capture::default());
    let stderr_cap = Arc::new(Capture::default());
    let mut reader_tasks = Vec::new();
    if let Some(reader) = child.stdout.take() {
        reader_tasks.push(tokio::spawn(drain(reader, output_limit, stdout_cap.clone())));
    }
    if let Some(reader) = child.stderr.take() {
        reader_tasks.push(tokio::spawn(drain(reader, output_limit, stderr_cap.clone())));
    }

    let status = tokio::select! {
        status = child.wait() => Some(
            status.map_err(|source| ExecError::Wait { command: command.to_string(), source })?,
        ),
        _ = tokio::time::sleep(timeout) => {
            let _ = child.kill().await;
            None
        }
        _ = cancel.cancelled() => {
            let _ = child.kill().await;
            for task in reader_tasks {
                task.abort();
            }
            return Err(ExecError::Cancelled);
        }
    };

    // Give the readers a bounded window to hit EOF, then take whatever
    // was captured. Orphaned pipe holders must not stall the gate.
    for mut task in reader_tasks {
        if tokio::time::timeout(READER_GRACE, &mut task).await.is_err() {
            task.abort();
        }
    }

    let mut merged = stdout_cap.buf.lock().clone();
    merged.extend_from_slice(&stderr_cap.buf.lock());
    let truncated = stdout_cap.truncated.load(Ordering::Relaxed)
        || stderr_cap.truncated.load(Ordering::Relaxed);

    let mut output = bounded_utf8(&merged, output_limit);
    if output.len() < merged.len() || truncated {
        output.push_str(TRUNCATION_MARKER);
    }

    let exit_code = match status {
        Some(status) => status.code().unwrap_or(TIMEOUT_EXIT_CODE),
        None => {
            if !output.is_empty() && !output.ends_with('\n') {
                output.push('\n');
            }
            output.push_str(TIMEOUT_MARKER);
            TIMEOUT_EXIT_CODE
        }
    };

    Ok(CommandOutput { exit_code, output, duration: start.elapsed() })
}

/// Pump a pipe into the capture buffer until EOF.
async fn drain(
    mut reader: impl tokio::io::AsyncRead + Unpin + Send + 'static,
    limit: usize,
    capture: Arc<Capture>,
) {
    let mut chunk = [0u8; 8192];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => capture.push(&chunk[..n], limit),
        }
    }
}

/// Lossy UTF-8 conversion truncated to at most `limit` bytes on a
/// character boundary.
fn bounded_utf8(bytes: &[u8], limit: usize) -> String {
    let s = String::from_utf8_lossy(bytes);
    if s.len() <= limit {
        return s.into_owned();
    }
    let mut end = limit.min(s.len());
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}

#[cfg(test)]
#[path = "exec_tests.rs"]
mod tests;
