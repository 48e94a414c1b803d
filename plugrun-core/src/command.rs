//! External command execution.
//!
//! Every child is spawned with kill-on-drop: when the future driving a command is
//! dropped (for example because its task was aborted after a timeout) the child
//! process is killed as well.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

/// Captured output of a successful command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// An external program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    dir: Option<PathBuf>,
    sensitive: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            dir: None,
            sensitive: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Keeps the arguments out of logs and error messages (they carry a secret).
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    #[inline]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[inline]
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    #[inline]
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Printable form of the command line.
    pub fn display(&self) -> String {
        if self.sensitive {
            format!("{} <redacted>", self.program)
        } else if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }

    fn build(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).kill_on_drop(true);
        if let Some(ref dir) = self.dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    fn failure(&self, message: impl Into<String>) -> Error {
        Error::Command {
            command: self.display(),
            message: message.into(),
        }
    }

    fn check_status(&self, status: ExitStatus, detail: Option<&str>) -> Result<()> {
        if status.success() {
            return Ok(());
        }
        match detail {
            Some(detail) => Err(self.failure(format!("{}: {}", status, detail))),
            None => Err(self.failure(status.to_string())),
        }
    }

    /// Runs the command with inherited stdio.
    pub async fn run(&self) -> Result<()> {
        debug!(command = %self.display(), dir = ?self.dir, "Running command");
        let status = self
            .build()
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| self.failure(format!("failed to start: {}", e)))?;
        self.check_status(status, None)
    }

    /// Runs the command with captured output.
    ///
    /// On failure the last non-empty line of stderr is folded into the error.
    pub async fn run_captured(&self) -> Result<CommandOutput> {
        debug!(command = %self.display(), dir = ?self.dir, "Running command (captured)");
        let output = self
            .build()
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.failure(format!("failed to start: {}", e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            debug!(command = %self.display(), %stderr, "Command failed");
        }
        self.check_status(output.status, last_line(&stderr))?;

        Ok(CommandOutput { stdout, stderr })
    }

    /// Runs the command, forwarding every non-empty output line as it arrives.
    ///
    /// `on_line` receives the line and whether it came from stderr.
    pub async fn run_streaming<F>(&self, mut on_line: F) -> Result<()>
    where
        F: FnMut(&str, bool),
    {
        debug!(command = %self.display(), dir = ?self.dir, "Running command (streaming)");
        let mut child = self
            .build()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.failure(format!("failed to start: {}", e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| self.failure("failed to capture stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| self.failure("failed to capture stderr"))?;

        let mut stdout_lines = BufReader::new(stdout).lines();
        let mut stderr_lines = BufReader::new(stderr).lines();
        let mut stdout_done = false;
        let mut stderr_done = false;
        let mut last_stderr: Option<String> = None;

        while !(stdout_done && stderr_done) {
            tokio::select! {
                line = stdout_lines.next_line(), if !stdout_done => {
                    match line.map_err(|e| self.failure(format!("failed to read stdout: {}", e)))? {
                        Some(line) => {
                            emit(&line, false, &mut on_line);
                        }
                        None => stdout_done = true,
                    }
                }
                line = stderr_lines.next_line(), if !stderr_done => {
                    match line.map_err(|e| self.failure(format!("failed to read stderr: {}", e)))? {
                        Some(line) => {
                            if emit(&line, true, &mut on_line) {
                                last_stderr = Some(line.trim_end().to_string());
                            }
                        }
                        None => stderr_done = true,
                    }
                }
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| self.failure(format!("failed to wait for process: {}", e)))?;
        self.check_status(status, last_stderr.as_deref())
    }
}

fn emit<F: FnMut(&str, bool)>(line: &str, is_stderr: bool, on_line: &mut F) -> bool {
    let trimmed = line.trim_end();
    if trimmed.is_empty() {
        return false;
    }
    on_line(trimmed, is_stderr);
    true
}

fn last_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).rev().find(|l| !l.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_redacts_sensitive_args() {
        let spec = CommandSpec::new("cue").args(["login", "--token=secret"]);
        assert_eq!(spec.display(), "cue login --token=secret");
        assert_eq!(spec.sensitive().display(), "cue <redacted>");
    }

    #[test]
    fn test_last_line_skips_blank_tail() {
        assert_eq!(last_line("first\nerror: boom\n\n  \n"), Some("error: boom"));
        assert_eq!(last_line(""), None);
    }
}
