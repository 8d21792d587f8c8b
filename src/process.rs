//! Process utilities for child process management.

use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::Child;

#[cfg(unix)]
use std::os::unix::process::ExitStatusExt;

fn exit_status_code_parts(code: Option<i32>, _signal: Option<i32>) -> Option<i32> {
    if let Some(code) = code {
        return Some(code);
    }
    #[cfg(unix)]
    {
        if let Some(signal) = _signal {
            return Some(128 + signal);
        }
    }
    None
}

/// Extract exit code from ExitStatus, using 128+signal for signal-terminated processes on Unix.
pub(crate) fn exit_status_code(status: &std::process::ExitStatus) -> Option<i32> {
    let code = status.code();
    #[cfg(unix)]
    let signal = status.signal();
    #[cfg(not(unix))]
    let signal = None;
    exit_status_code_parts(code, signal)
}

/// Attempt to capture the exit code from a child process.
/// Tries non-blocking first, falls back to blocking wait if process hasn't exited.
async fn capture_exit_code(child: &mut Child) -> Option<i32> {
    match child.try_wait() {
        Ok(Some(status)) => exit_status_code(&status),
        Ok(None) => child
            .wait()
            .await
            .ok()
            .and_then(|status| exit_status_code(&status)),
        Err(_) => None,
    }
}

/// Stream types for child processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl std::fmt::Display for OutputStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputStream::Stdout => f.write_str("stdout"),
            OutputStream::Stderr => f.write_str("stderr"),
        }
    }
}

/// Errors occurring while waiting for child process output.
#[derive(Debug, Error)]
pub enum OutputWaitError {
    /// Error reading from a stream. The child has been killed.
    #[error("failed to read {stream} (exit code {exit_code:?}): {source}")]
    Read {
        stream: OutputStream,
        #[source]
        source: std::io::Error,
        exit_code: Option<i32>,
    },

    /// Error waiting for the process to exit.
    #[error("failed to wait for process: {source}")]
    Wait {
        #[source]
        source: std::io::Error,
    },
}

/// Wait for child output, reading stdout/stderr concurrently to avoid deadlock.
///
/// Output is decoded lossily so a script printing non-UTF-8 bytes still
/// reports its exit status.
pub(crate) async fn wait_for_child_output(
    child: &mut Child,
) -> Result<(String, String, std::process::ExitStatus), OutputWaitError> {
    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();

    let stdout_fut = async move {
        if let Some(mut out) = stdout_pipe {
            let mut buf = Vec::new();
            out.read_to_end(&mut buf)
                .await
                .map(|_| String::from_utf8_lossy(&buf).into_owned())
                .map_err(|e| (OutputStream::Stdout, e))
        } else {
            Ok(String::new())
        }
    };

    let stderr_fut = async move {
        if let Some(mut err) = stderr_pipe {
            let mut buf = Vec::new();
            err.read_to_end(&mut buf)
                .await
                .map(|_| String::from_utf8_lossy(&buf).into_owned())
                .map_err(|e| (OutputStream::Stderr, e))
        } else {
            Ok(String::new())
        }
    };

    let (stdout, stderr) = match tokio::try_join!(stdout_fut, stderr_fut) {
        Ok(result) => result,
        Err((stream, e)) => {
            let _ = child.kill().await;
            let exit_code = capture_exit_code(child).await;
            return Err(OutputWaitError::Read {
                stream,
                source: e,
                exit_code,
            });
        }
    };

    let status = child
        .wait()
        .await
        .map_err(|e| OutputWaitError::Wait { source: e })?;

    Ok((stdout, stderr, status))
}
