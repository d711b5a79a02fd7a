use std::process::Stdio;
use std::time::Duration;

use serde::Serialize;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{CommandExecutor, ParsedCommand};
use crate::error::{ExecError, SecurityViolation};

/// Captured result of one child process: full stdout and stderr text plus
/// the numeric exit code. Produced once per execution call.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionOutcome {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandExecutor {
    /// Validate `raw` and, only if every check passes, run it as a direct
    /// process invocation — argv `[command] + args`, never a shell.
    ///
    /// The call blocks (asynchronously) for up to `command_timeout` seconds.
    /// On expiry the child is killed and [`ExecError::Timeout`] returned.
    /// Exactly one child is spawned per successful validation; no retry is
    /// performed on any failure path.
    pub async fn execute(&self, raw: &str) -> Result<ExecutionOutcome, ExecError> {
        // Length bound precedes everything else so oversized input never
        // reaches the parser.
        let length = raw.chars().count();
        let max = self.config.max_command_length();
        if length > max {
            return Err(SecurityViolation::CommandTooLong { length, max }.into());
        }

        let parsed = self.validate(raw).map_err(|violation| {
            warn!(%violation, "command rejected");
            violation
        })?;
        self.run(&parsed).await
    }

    async fn run(&self, parsed: &ParsedCommand) -> Result<ExecutionOutcome, ExecError> {
        debug!(command = %parsed.command, args = parsed.args.len(), "spawning child");

        let mut cmd = Command::new(&parsed.command);
        cmd.args(&parsed.args)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the wait future on the timeout path must not leave
            // the child running: the runtime kills and reaps it.
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(ExecError::ExecutionFailed)?;
        let seconds = self.config.command_timeout();

        match tokio::time::timeout(Duration::from_secs(seconds), child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(ExecutionOutcome {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                // Signal-terminated children carry no exit code.
                exit_code: output.status.code().unwrap_or(-1),
            }),
            Ok(Err(e)) => Err(ExecError::ExecutionFailed(e)),
            Err(_) => {
                warn!(command = %parsed.command, seconds, "command timed out; child killed");
                Err(ExecError::Timeout { seconds })
            }
        }
    }
}
