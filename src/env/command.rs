//! Child-process primitive used for every container lifecycle call.

use std::process::Stdio;
use std::time::Duration;

use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::core::BenchError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, or -1 when the process was ended by a signal.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Trimmed stdout, followed by trimmed stderr when there is any.
    pub fn combined(&self) -> String {
        let stdout = self.stdout.trim();
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            stdout.to_string()
        } else {
            format!("{stdout}\nstderr: {stderr}")
        }
    }
}

/// Runs one program with a hard timeout. Both output streams are drained on
/// their own tasks so a full pipe never blocks the child.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: String,
    prefix: Vec<String>,
    timeout: Duration,
}

impl CommandRunner {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            prefix: Vec::new(),
            timeout,
        }
    }

    /// Build from a whitespace-separated command line such as `sudo docker`.
    /// Words after the first are passed before every call's own arguments.
    pub fn from_command_line(line: &str, timeout: Duration) -> Self {
        let mut words = line.split_whitespace();
        let program = words.next().unwrap_or_default();
        Self::new(program, timeout).with_prefix(words)
    }

    pub fn with_prefix<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefix = args.into_iter().map(Into::into).collect();
        self
    }

    /// Run `program args...`. With `check`, a non-zero exit becomes
    /// [`BenchError::ProcessExitError`].
    pub async fn run(&self, args: &[&str], check: bool) -> Result<CommandOutput, BenchError> {
        let command = self.display(args);
        debug!("running: {command}");

        let mut child = Command::new(&self.program)
            .args(&self.prefix)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BenchError::ProcessSpawnError {
                command: command.clone(),
                reason: e.to_string(),
            })?;

        let mut stdout = child.stdout.take().map(|s| tokio::spawn(drain(s)));
        let mut stderr = child.stderr.take().map(|s| tokio::spawn(drain(s)));

        // One deadline covers the exit and both drains: a descendant may keep
        // the pipes open after the child itself has exited.
        let deadline = Instant::now() + self.timeout;
        let finished = tokio::time::timeout_at(deadline, async {
            let status = child.wait().await?;
            let stdout = collect(stdout.as_mut()).await;
            let stderr = collect(stderr.as_mut()).await;
            Ok::<_, std::io::Error>((status, stdout, stderr))
        })
        .await;

        let (status, stdout, stderr) = match finished {
            Ok(result) => result?,
            Err(_) => {
                if let Err(e) = child.kill().await {
                    warn!("failed to kill timed out command '{command}': {e}");
                }
                for reader in [stdout, stderr].into_iter().flatten() {
                    reader.abort();
                }
                return Err(BenchError::ProcessTimeoutError {
                    command,
                    timeout: self.timeout,
                });
            }
        };

        let output = CommandOutput {
            exit_code: status.code().unwrap_or(-1),
            stdout,
            stderr,
        };

        if check && !output.success() {
            return Err(BenchError::ProcessExitError {
                command,
                code: output.exit_code,
                output: output.combined(),
            });
        }
        Ok(output)
    }

    fn display(&self, args: &[&str]) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.prefix.iter().map(String::as_str))
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

async fn drain<R: AsyncRead + Unpin>(mut stream: R) -> String {
    let mut buf = Vec::new();
    match stream.read_to_end(&mut buf).await {
        Ok(_) => String::from_utf8_lossy(&buf).into_owned(),
        Err(e) => format!("stream read error: {e}"),
    }
}

async fn collect(reader: Option<&mut JoinHandle<String>>) -> String {
    match reader {
        Some(handle) => handle.await.unwrap_or_default(),
        None => String::new(),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh() -> CommandRunner {
        CommandRunner::new("sh", Duration::from_secs(10))
    }

    #[tokio::test]
    async fn test_captures_both_streams() {
        let out = sh()
            .run(&["-c", "echo hello; echo oops >&2"], true)
            .await
            .unwrap();
        assert!(out.success());
        assert_eq!(out.stdout, "hello\n");
        assert_eq!(out.stderr, "oops\n");
        assert_eq!(out.combined(), "hello\nstderr: oops");
    }

    #[tokio::test]
    async fn test_nonzero_exit_with_check_fails() {
        let err = sh().run(&["-c", "echo bad; exit 3"], true).await.unwrap_err();
        match err {
            BenchError::ProcessExitError { code, output, .. } => {
                assert_eq!(code, 3);
                assert_eq!(output, "bad");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_nonzero_exit_without_check_is_returned() {
        let out = sh().run(&["-c", "exit 4"], false).await.unwrap();
        assert_eq!(out.exit_code, 4);
        assert!(!out.success());
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let runner = CommandRunner::new("sleep", Duration::from_millis(100));
        let err = runner.run(&["5"], true).await.unwrap_err();
        assert!(matches!(err, BenchError::ProcessTimeoutError { .. }));
    }

    #[tokio::test]
    async fn test_timeout_covers_inherited_pipes() {
        // the background sleep keeps stdout open after sh exits
        let runner = CommandRunner::new("sh", Duration::from_millis(500));
        let start = std::time::Instant::now();
        let err = runner
            .run(&["-c", "sleep 6 & echo hi"], true)
            .await
            .unwrap_err();
        assert!(matches!(err, BenchError::ProcessTimeoutError { .. }));
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_large_output_does_not_deadlock() {
        let out = sh()
            .run(
                &["-c", "i=0; while [ $i -lt 20000 ]; do echo line-$i; echo err-$i >&2; i=$((i+1)); done"],
                true,
            )
            .await
            .unwrap();
        assert_eq!(out.stdout.lines().count(), 20000);
        assert_eq!(out.stderr.lines().count(), 20000);
    }

    #[tokio::test]
    async fn test_command_line_prefix_precedes_args() {
        let runner = CommandRunner::from_command_line(
            "sh -c 'echo'",
            Duration::from_secs(10),
        );
        assert_eq!(runner.display(&["x"]), "sh -c 'echo' x");

        let runner = sh().with_prefix(["-c", "echo \"$0 $1\""]);
        let out = runner.run(&["start", "db"], true).await.unwrap();
        assert_eq!(out.stdout.trim(), "start db");
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let runner = CommandRunner::new("definitely-not-a-real-binary", Duration::from_secs(1));
        assert!(matches!(
            runner.run(&[], false).await,
            Err(BenchError::ProcessSpawnError { .. })
        ));
    }
}
