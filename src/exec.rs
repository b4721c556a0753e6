//! External process execution behind an injectable [`Executor`] seam.
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use crate::error::RunnerError;

/// A fully assembled external-process request.
///
/// Built as a plain value before anything is spawned so that commands can be
/// logged, previewed in dry-run mode, and asserted on in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to run, looked up on `PATH`.
    pub program: String,
    /// Arguments passed to the program.
    pub args: Vec<String>,
    /// Working directory of the child; inherits the dispatcher's when `None`.
    pub dir: Option<PathBuf>,
    /// Extra environment variables set on the child only.
    pub env: Vec<(String, String)>,
}

impl Invocation {
    /// Start a new invocation of `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            dir: None,
            env: Vec::new(),
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run the child in `dir`.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Set an environment variable on the child.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Look up an environment variable assigned to this invocation.
    #[must_use]
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Working directory of the child, if one was set.
    #[must_use]
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Result of a command execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecResult {
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code; `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl ExecResult {
    /// A successful exit with code zero.
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            success: true,
            code: Some(0),
        }
    }

    /// An unsuccessful exit with the given code.
    #[must_use]
    pub const fn failed(code: i32) -> Self {
        Self {
            success: false,
            code: Some(code),
        }
    }

    /// Convert a non-zero exit into [`RunnerError::ProcessFailed`].
    ///
    /// # Errors
    ///
    /// Returns an error if the process did not exit successfully.
    pub fn check(self, program: &str) -> Result<Self, RunnerError> {
        if self.success {
            Ok(self)
        } else {
            Err(RunnerError::ProcessFailed {
                program: program.to_string(),
                code: self.code.unwrap_or(-1),
            })
        }
    }
}

impl From<ExitStatus> for ExecResult {
    fn from(status: ExitStatus) -> Self {
        Self {
            success: status.success(),
            code: status.code(),
        }
    }
}

/// Abstraction over spawning external processes.
///
/// Production code uses [`SystemExecutor`]; tests substitute a mock so that
/// dispatch logic can be exercised without running Ansible or Vagrant.
#[cfg_attr(test, mockall::automock)]
pub trait Executor: Send + Sync {
    /// Run the invocation to completion with inherited stdio.
    ///
    /// Does not inspect the exit status; callers decide whether a non-zero
    /// exit is fatal (see [`ExecResult::check`]).
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Spawn`] if the process cannot be started.
    fn run(&self, invocation: &Invocation) -> Result<ExecResult, RunnerError>;

    /// Check if a program is available on `PATH`.
    fn which(&self, program: &str) -> bool;
}

/// Production [`Executor`] that spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run(&self, invocation: &Invocation) -> Result<ExecResult, RunnerError> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        if let Some(dir) = &invocation.dir {
            cmd.current_dir(dir);
        }
        cmd.envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        tracing::debug!("spawning: {invocation}");
        let status = cmd.status().map_err(|source| RunnerError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;
        Ok(ExecResult::from(status))
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}
