//! Domain-specific error types for the recipe dispatcher.
//!
//! Internal modules return typed errors (e.g., [`RecipeError`],
//! [`RunnerError`]) while command handlers at the CLI boundary convert them
//! to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error families
//!
//! ```text
//! ConfigError  settings file, --kwargs parsing
//! RecipeError  lookup, scan policy, scaffolding, pulling
//! InfraError   infrastructure names and inventories
//! RunnerError  runtime selection and external processes
//! ```
//!
//! Per-file scan problems are not errors; they are reported as
//! [`ScanIssue`](crate::recipes::ScanIssue) values.

use std::path::PathBuf;

use thiserror::Error;

use crate::recipes::RecipeType;

/// Errors that arise from settings loading and argument validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("IO error reading settings file {}: {source}", path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The settings file is not valid TOML for the expected schema.
    #[error("Invalid settings in {}: {message}", path.display())]
    InvalidSyntax {
        /// Path to the offending file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// A `--kwargs` entry is not of the form `key=value`.
    #[error("Invalid argument override '{0}': expected key=value")]
    InvalidKwarg(String),
}

/// Errors that arise from recipe lookup and recipe scaffolding.
#[derive(Error, Debug)]
pub enum RecipeError {
    /// No recipe of the requested type carries the requested name.
    #[error("{kind} recipe '{name}' does not exist")]
    NotFound {
        /// Recipe type that was searched.
        kind: RecipeType,
        /// Requested recipe name.
        name: String,
    },

    /// The scan found manifests with unrecognized `recipe_type` values and
    /// the strict policy is active.
    #[error(
        "{count} manifest(s) declare an unknown recipe_type (first: {})",
        first.display()
    )]
    UnknownTypes {
        /// Number of offending manifests.
        count: usize,
        /// Path of the first offending manifest.
        first: PathBuf,
    },

    /// The destination of a new or pulled recipe already exists.
    #[error("Destination already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// The requested starter template does not exist.
    #[error("No starter template for {kind} recipes using the {runtime} runtime")]
    NoTemplate {
        /// Requested recipe type.
        kind: RecipeType,
        /// Requested runtime tag.
        runtime: String,
    },

    /// A recipe name cannot be used as a directory name.
    #[error("Invalid recipe name '{0}'")]
    InvalidName(String),

    /// A recipe repository URL has no usable final path segment.
    #[error("Cannot derive a recipe directory name from '{0}'")]
    InvalidSource(String),

    /// An I/O error occurred while writing recipe files.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        /// Path that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise from infrastructure resolution.
#[derive(Error, Debug)]
pub enum InfraError {
    /// The infrastructure name cannot be used as a directory name.
    #[error("Invalid infrastructure name '{0}'")]
    InvalidName(String),

    /// The infrastructure directory does not exist.
    #[error("Infrastructure '{name}' not found at {}: provision it first", path.display())]
    NotProvisioned {
        /// Requested infrastructure name.
        name: String,
        /// Expected location of its inventory data.
        path: PathBuf,
    },

    /// The inventory could not be written.
    #[error("IO error writing inventory {}: {source}", path.display())]
    Io {
        /// Path that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise while selecting and running the external tool.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// The manifest names a runtime this dispatcher does not know.
    #[error("Unknown recipe runtime '{0}': must be one of ansible, bash, vagrant")]
    UnknownRuntime(String),

    /// The runtime cannot serve the recipe's type.
    #[error("{kind} recipe '{recipe}' cannot use the {runtime} runtime")]
    RuntimeMismatch {
        /// Recipe name.
        recipe: String,
        /// Recipe type.
        kind: RecipeType,
        /// Declared runtime tag.
        runtime: String,
    },

    /// Shell recipes only run against the local machine.
    #[error("bash recipes can only target localhost, not '{0}'")]
    BashRequiresLocalhost(String),

    /// A `--kwargs` key collides with a variable the dispatcher sets itself.
    #[error("Argument '{0}' is set by stack-starter and cannot be overridden")]
    ReservedKwarg(String),

    /// The requested provider is not in the allow-list.
    #[error("Invalid provider '{provider}': must be one of {allowed}")]
    InvalidProvider {
        /// Requested provider.
        provider: String,
        /// Comma-separated allow-list.
        allowed: String,
    },

    /// The external tool is not on `PATH`.
    #[error("Required tool '{0}' not found on PATH")]
    ToolMissing(String),

    /// The external process could not be started.
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        /// Program that could not be started.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The external process exited unsuccessfully.
    #[error("'{program}' failed with exit code {code}")]
    ProcessFailed {
        /// Program that failed.
        program: String,
        /// Exit code, `-1` when terminated by a signal.
        code: i32,
    },
}

impl RunnerError {
    /// Exit code the dispatcher should terminate with for this error.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ProcessFailed { code, .. } => u8::try_from(*code)
                .ok()
                .filter(|c| *c != 0)
                .unwrap_or(1),
            _ => 1,
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn recipe_not_found_display() {
        let e = RecipeError::NotFound {
            kind: RecipeType::Configure,
            name: "webserver".to_string(),
        };
        assert_eq!(e.to_string(), "configure recipe 'webserver' does not exist");
    }

    #[test]
    fn infra_not_provisioned_display() {
        let e = InfraError::NotProvisioned {
            name: "myhost".to_string(),
            path: PathBuf::from("/tmp/stack_starter/myhost"),
        };
        assert_eq!(
            e.to_string(),
            "Infrastructure 'myhost' not found at /tmp/stack_starter/myhost: provision it first"
        );
    }

    #[test]
    fn config_error_io_has_source() {
        use std::error::Error as StdError;
        let e = ConfigError::Io {
            path: PathBuf::from("/etc/stack-starter.toml"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("/etc/stack-starter.toml"));
    }

    #[test]
    fn process_failed_exit_code_passes_through() {
        let e = RunnerError::ProcessFailed {
            program: "bash".to_string(),
            code: 3,
        };
        assert_eq!(e.exit_code(), 3);
    }

    #[test]
    fn process_failed_exit_code_clamps_out_of_range() {
        let signalled = RunnerError::ProcessFailed {
            program: "vagrant".to_string(),
            code: -1,
        };
        assert_eq!(signalled.exit_code(), 1);

        let large = RunnerError::ProcessFailed {
            program: "vagrant".to_string(),
            code: 300,
        };
        assert_eq!(large.exit_code(), 1);
    }

    #[test]
    fn other_runner_errors_exit_with_one() {
        assert_eq!(RunnerError::ToolMissing("vagrant".into()).exit_code(), 1);
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<ConfigError>();
        assert_send_sync::<RecipeError>();
        assert_send_sync::<InfraError>();
        assert_send_sync::<RunnerError>();
    }

    #[test]
    fn runner_error_downcasts_from_anyhow() {
        let err: anyhow::Error = RunnerError::ProcessFailed {
            program: "ansible-playbook".to_string(),
            code: 2,
        }
        .into();
        let runner = err
            .downcast_ref::<RunnerError>()
            .expect("should downcast to RunnerError");
        assert_eq!(runner.exit_code(), 2);
    }
}
