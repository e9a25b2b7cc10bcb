//! Child process execution with live output
//!
//! Both output streams are read line by line, echoed to the console as they
//! arrive and accumulated. The exit status is only awaited once both
//! streams have reached end of file.

use std::process::Stdio;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

/// Failure of [`run_streaming`]
#[derive(Debug, Error)]
pub enum RunError {
    /// The process could not be started
    #[error("failed to spawn process: {0}")]
    Spawn(#[source] std::io::Error),

    /// Reading its output or waiting for it failed after it started
    #[error("process I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of a finished child process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    /// Exit code; `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    /// Everything written to stdout
    pub stdout: String,
    /// Everything written to stderr
    pub stderr: String,
}

impl ProcessResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[derive(Debug, Clone, Copy)]
enum OutputStream {
    Stdout,
    Stderr,
}

/// Spawn `cmd`, relay its output and wait for it to exit
///
/// Spawn failures are kept apart from errors raised once the process runs.
pub async fn run_streaming(mut cmd: Command) -> Result<ProcessResult, RunError> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(RunError::Spawn)?;
    log::debug!("Spawned child process {:?}", child.id());

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (stdout, stderr) = tokio::join!(
        drain(stdout, OutputStream::Stdout),
        drain(stderr, OutputStream::Stderr),
    );

    let status = child.wait().await?;
    log::debug!("Child process exited with {}", status);

    Ok(ProcessResult {
        exit_code: status.code(),
        stdout: stdout?,
        stderr: stderr?,
    })
}

async fn drain<R>(reader: Option<R>, stream: OutputStream) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut collected = String::new();
    let Some(reader) = reader else {
        return Ok(collected);
    };

    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        // Model output may contain non UTF-8 bytes (progress bars, locale output)
        let chunk = String::from_utf8_lossy(&buf);
        let line = chunk.trim_end_matches(|c: char| c == '\r' || c == '\n');
        if !line.trim().is_empty() {
            match stream {
                OutputStream::Stdout => println!("{}", line),
                OutputStream::Stderr => eprintln!("{}", line),
            }
        }
        collected.push_str(&chunk);
    }

    Ok(collected)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("/bin/sh");
        cmd.arg("-c").arg(script);
        cmd
    }

    #[tokio::test]
    async fn collects_both_streams_verbatim() {
        let result = run_streaming(sh("echo out1; echo err1 >&2; echo out2; printf 'err2' >&2"))
            .await
            .unwrap();

        assert!(result.success());
        assert_eq!(result.stdout, "out1\nout2\n");
        assert_eq!(result.stderr, "err1\nerr2");
    }

    #[tokio::test]
    async fn reports_exit_code() {
        let result = run_streaming(sh("echo failing >&2; exit 7")).await.unwrap();

        assert!(!result.success());
        assert_eq!(result.exit_code, Some(7));
        assert_eq!(result.stderr, "failing\n");
    }

    #[tokio::test]
    async fn large_output_is_fully_drained() {
        let result = run_streaming(sh("i=0; while [ $i -lt 2000 ]; do echo line $i; echo err $i >&2; i=$((i+1)); done"))
            .await
            .unwrap();

        assert!(result.success());
        assert_eq!(result.stdout.lines().count(), 2000);
        assert_eq!(result.stderr.lines().count(), 2000);
        assert!(result.stdout.ends_with("line 1999\n"));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let err = run_streaming(Command::new("/nonexistent/bin/python3")).await.unwrap_err();
        match err {
            RunError::Spawn(source) => assert_eq!(source.kind(), std::io::ErrorKind::NotFound),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn signal_has_no_exit_code() {
        let result = run_streaming(sh("kill -9 $$")).await.unwrap();
        assert_eq!(result.exit_code, None);
    }
}
