//! Helpers intended for [`std::process::Command`].

use std::process::{Command, ExitStatus};

use anyhow::{Context, Result};

/// The captured result of a command that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit status of the child process
    pub status: ExitStatus,
    /// Standard output, lossily decoded as UTF-8
    pub stdout: String,
    /// Standard error, lossily decoded as UTF-8
    pub stderr: String,
}

impl CommandOutput {
    /// Returns true if the process exited with status zero.
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Standard output followed by standard error, with surrounding
    /// whitespace removed. Suitable for embedding in diagnostics.
    pub fn text(&self) -> String {
        let stdout = self.stdout.trim();
        let stderr = self.stderr.trim();
        match (stdout.is_empty(), stderr.is_empty()) {
            (_, true) => stdout.to_owned(),
            (true, false) => stderr.to_owned(),
            (false, false) => format!("{stdout}\n{stderr}"),
        }
    }
}

/// Helpers intended for [`std::process::Command`].
pub trait CommandRunExt {
    /// Run the command to completion, capturing its output. A non-zero
    /// exit status is *not* an error; only a failure to spawn is.
    fn run_capture(&mut self) -> Result<CommandOutput>;

    /// Run the command, requiring it to exit successfully, and return
    /// its standard output.
    fn run_get_string(&mut self) -> Result<String>;

    /// Render the program and arguments as a shell-quoted string.
    fn to_string_pretty(&self) -> String;
}

impl CommandRunExt for Command {
    fn run_capture(&mut self) -> Result<CommandOutput> {
        tracing::debug!("exec: {}", self.to_string_pretty());
        let output = self
            .output()
            .with_context(|| format!("Spawning {}", self.get_program().to_string_lossy()))?;
        Ok(CommandOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn run_get_string(&mut self) -> Result<String> {
        let output = self.run_capture()?;
        if !output.success() {
            anyhow::bail!(
                "{} failed: {}: {}",
                self.to_string_pretty(),
                output.status,
                output.stderr.trim()
            );
        }
        Ok(output.stdout)
    }

    fn to_string_pretty(&self) -> String {
        std::iter::once(self.get_program())
            .chain(self.get_args())
            .map(|arg| {
                let arg = arg.to_string_lossy();
                shlex::try_quote(&arg)
                    .map(|q| q.into_owned())
                    .unwrap_or_else(|_| arg.to_string())
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
