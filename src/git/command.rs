//! Builder for system git invocations.

use crate::error::{GitError, Result};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

/// One git invocation bound to a working directory
#[derive(Debug, Clone)]
pub struct GitCommand {
    dir: PathBuf,
    args: Vec<OsString>,
}

impl GitCommand {
    /// Start a command that runs in `dir`
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            args: Vec::new(),
        }
    }

    /// Append one argument
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Human-readable command line, for messages
    pub fn display(&self) -> String {
        let mut line = String::from("git");
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    /// Run the command, failing on non-zero exit
    pub fn run(&self) -> Result<()> {
        self.output().map(|_| ())
    }

    /// Run the command and return trimmed stdout
    pub fn output(&self) -> Result<String> {
        let command_line = self.display();
        log::debug!("{} (in {})", command_line, self.dir.display());

        let output = self
            .to_command()
            .output()
            .map_err(|e| GitError::SpawnFailed {
                command: command_line.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: command_line,
                dir: self.dir.clone(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(&self.dir);
        // Keep output parseable regardless of user config
        cmd.arg("-c").arg("advice.detachedHead=false");
        cmd.arg("-c").arg("core.quotePath=false");
        cmd.args(&self.args);
        cmd.env("GIT_TERMINAL_PROMPT", "0");
        cmd
    }
}
