// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed workspace (working directory, recipe
// directory, settings file) and a fluent builder so each integration test can
// set up an isolated environment without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use stack_starter::cli::GlobalOpts;
use stack_starter::error::RunnerError;
use stack_starter::exec::{ExecResult, Executor, Invocation};

/// Render a `manifest.yaml` with the four core keys.
pub fn manifest_yaml(name: &str, kind: &str, runtime: &str, entry: &str) -> String {
    format!(
        "name: {name}\nrecipe_type: {kind}\nrecipe_runtime: {runtime}\nrecipe_entry: {entry}\nversion: \"1.0\"\n"
    )
}

/// An isolated workspace backed by a [`tempfile::TempDir`].
///
/// Layout:
/// - `work/`         working directory passed with `--directory`
/// - `recipes/`      recipe directory passed with `--recipes`
/// - `config.toml`   settings file passed with `--config`
pub struct IntegrationTestContext {
    /// Temporary directory containing the workspace.
    pub root: tempfile::TempDir,
}

impl IntegrationTestContext {
    /// Create a workspace with an empty recipe directory and settings file.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(root.path().join("recipes")).expect("create recipes dir");
        std::fs::write(root.path().join("config.toml"), "").expect("write config.toml");
        Self { root }
    }

    /// Workspace root, used as the base for relative paths.
    pub fn base(&self) -> PathBuf {
        dunce::canonicalize(self.root.path()).expect("canonicalize root")
    }

    /// Working directory passed to commands.
    pub fn work_dir(&self) -> PathBuf {
        self.base().join("work")
    }

    /// Recipe directory passed to commands.
    pub fn recipes_dir(&self) -> PathBuf {
        self.base().join("recipes")
    }

    /// Global options pointing every path at this workspace.
    pub fn global(&self) -> GlobalOpts {
        GlobalOpts {
            directory: Some(self.work_dir()),
            recipes: Some(self.recipes_dir()),
            config: Some(self.base().join("config.toml")),
            dry_run: false,
            lenient: false,
        }
    }

    /// Global options with `--dry-run`.
    pub fn global_dry_run(&self) -> GlobalOpts {
        GlobalOpts {
            dry_run: true,
            ..self.global()
        }
    }

    /// Global options with `--lenient`.
    pub fn global_lenient(&self) -> GlobalOpts {
        GlobalOpts {
            lenient: true,
            ..self.global()
        }
    }

    /// Directory of the recipe written at `rel` under the recipe directory.
    pub fn recipe_dir(&self, rel: &str) -> PathBuf {
        self.recipes_dir().join(rel)
    }
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a new workspace.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// Write a recipe at `recipes/<rel>` with the given manifest and entry file.
    pub fn with_recipe(self, rel: &str, manifest: &str, entry: Option<(&str, &str)>) -> Self {
        let dir = self.ctx.recipes_dir().join(rel);
        std::fs::create_dir_all(&dir).expect("create recipe dir");
        std::fs::write(dir.join("manifest.yaml"), manifest).expect("write manifest");
        if let Some((name, content)) = entry {
            std::fs::write(dir.join(name), content).expect("write entry");
        }
        self
    }

    /// Write a bash configure recipe named `name` whose `setup.sh` is `script`.
    pub fn with_bash_recipe(self, name: &str, script: &str) -> Self {
        let manifest = manifest_yaml(name, "configure", "bash", "setup.sh");
        self.with_recipe(name, &manifest, Some(("setup.sh", script)))
    }

    /// Replace the settings file contents.
    pub fn with_settings(self, toml: &str) -> Self {
        std::fs::write(self.ctx.root.path().join("config.toml"), toml)
            .expect("write config.toml");
        self
    }

    /// Create `work/<name>` as if it had been provisioned.
    pub fn with_provisioned(self, name: &str) -> Self {
        std::fs::create_dir_all(self.ctx.work_dir().join(name)).expect("create infra dir");
        self
    }

    /// Finish building.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}

/// [`Executor`] that records invocations instead of spawning them.
pub struct RecordingExecutor {
    calls: Mutex<Vec<Invocation>>,
    available: bool,
    result: ExecResult,
}

impl RecordingExecutor {
    /// Every tool is available and every run succeeds.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            available: true,
            result: ExecResult::ok(),
        }
    }

    /// No tool is found on `PATH`.
    pub fn missing_tools() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Every run exits with `code`.
    pub fn failing(code: i32) -> Self {
        Self {
            result: ExecResult::failed(code),
            ..Self::new()
        }
    }

    /// Invocations recorded so far.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().expect("lock calls").clone()
    }
}

impl Executor for RecordingExecutor {
    fn run(&self, invocation: &Invocation) -> Result<ExecResult, RunnerError> {
        self.calls
            .lock()
            .expect("lock calls")
            .push(invocation.clone());
        Ok(self.result)
    }

    fn which(&self, _program: &str) -> bool {
        self.available
    }
}

