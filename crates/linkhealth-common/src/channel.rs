//! Device command channel.
//!
//! The health-check core talks to the switch exclusively through
//! [`CommandChannel`]: one textual command per call, one textual
//! response, blocking from the caller's point of view, no streaming.
//! The production implementation shells out to the device CLI binary;
//! tests substitute scripted channels.

use std::process::Stdio;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::process::Command;

use crate::error::{HealthError, Result};

/// Default path of the device CLI binary used by [`CliChannel`].
pub const DEFAULT_CLI_CMD: &str = "/usr/bin/vsh";

/// Regex for characters that need escaping in shell double-quotes.
/// Matches: $, `, ", \, and newline
static SHELL_ESCAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([$`"\\\n])"#).expect("Invalid regex pattern"));

/// Quotes a string for safe use in shell commands.
///
/// Wraps the string in double quotes and escapes any characters that
/// have special meaning inside double quotes (`$`, `` ` ``, `"`, `\`,
/// newline).
///
/// # Example
///
/// ```
/// use linkhealth_common::channel::shellquote;
///
/// assert_eq!(shellquote("show version"), "\"show version\"");
/// assert_eq!(shellquote("with$var"), "\"with\\$var\"");
/// ```
pub fn shellquote(s: &str) -> String {
    let escaped = SHELL_ESCAPE_RE.replace_all(s, r"\$1");
    format!("\"{}\"", escaped)
}

/// Executes one device command and returns its textual output.
///
/// Implementations must be safe for concurrent independent invocations:
/// the scan orchestrator issues calls from up to `pool_size` probers at
/// once and shares no connection state between them.
#[async_trait]
pub trait CommandChannel: Send + Sync {
    /// Sends one textual command to the device and returns its output.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The command's textual output
    /// * `Err(_)` - The command could not be executed or failed
    async fn execute(&self, command: &str) -> Result<String>;
}

/// Production command channel running commands through the device CLI.
///
/// Each call spawns `<cli> -c "<command>"` via `/bin/sh -c`, so piped
/// commands (as used for the ASIC counter query) work unchanged.
#[derive(Debug, Clone)]
pub struct CliChannel {
    cli_cmd: String,
}

impl CliChannel {
    /// Creates a channel using the default CLI binary.
    pub fn new() -> Self {
        Self::with_cli_cmd(DEFAULT_CLI_CMD)
    }

    /// Creates a channel using a specific CLI binary path.
    pub fn with_cli_cmd(cli_cmd: impl Into<String>) -> Self {
        Self {
            cli_cmd: cli_cmd.into(),
        }
    }
}

impl Default for CliChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandChannel for CliChannel {
    async fn execute(&self, command: &str) -> Result<String> {
        let cmd = format!("{} -c {}", self.cli_cmd, shellquote(command));
        tracing::debug!(command = %command, "Executing device command");

        let output = Command::new("/bin/sh")
            .arg("-c")
            .arg(&cmd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| HealthError::CommandSpawn {
                command: command.to_string(),
                source: e,
            })?;

        let exit_code = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if exit_code == 0 {
            tracing::trace!(command = %command, "Device command succeeded");
            Ok(stdout)
        } else {
            tracing::warn!(
                command = %command,
                exit_code = exit_code,
                stderr = %stderr,
                "Device command failed"
            );
            Err(HealthError::CommandFailed {
                command: command.to_string(),
                exit_code,
                output: if stderr.is_empty() {
                    stdout.trim().to_string()
                } else {
                    stderr
                },
            })
        }
    }
}
