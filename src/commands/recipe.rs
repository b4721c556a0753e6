//! Commands: `recipe pull`, `recipe list`, `recipe create`.
use std::path::Path;

use anyhow::{Context as _, Result};

use super::{CommandSetup, load_settings};
use crate::cli::{GlobalOpts, RecipeCommand};
use crate::exec::Executor;
use crate::logging::Log;
use crate::recipes::scaffold;
use crate::recipes::{RecipeType, Runtime, pull};
use crate::runner;

/// Run a `recipe` subcommand, printing listings to stdout.
///
/// # Errors
///
/// Returns an error if the subcommand fails.
#[allow(clippy::print_stdout)]
pub fn run(
    global: &GlobalOpts,
    command: &RecipeCommand,
    base: &Path,
    log: &dyn Log,
    executor: &dyn Executor,
) -> Result<()> {
    match command {
        RecipeCommand::Pull { url, name } => {
            pull_recipe(global, url, name.as_deref(), base, log, executor)
        }
        RecipeCommand::List { json } => {
            print!("{}", list(global, *json, base, log)?);
            Ok(())
        }
        RecipeCommand::Create {
            recipe,
            dir,
            kind,
            runtime,
        } => create(global, recipe, &base.join(dir), *kind, *runtime, log),
    }
}

/// Clone a recipe repository into `<working_dir>/recipes`.
///
/// # Errors
///
/// Returns an error if the destination exists, no name can be derived, or
/// `git` fails.
pub fn pull_recipe(
    global: &GlobalOpts,
    url: &str,
    name: Option<&str>,
    base: &Path,
    log: &dyn Log,
    executor: &dyn Executor,
) -> Result<()> {
    let settings = load_settings(global, base, log)?;
    let recipes_dir = settings.pulled_recipes_dir();

    log.stage(&format!("Pulling {url}"));
    let plan = pull::plan_clone(url, name, &recipes_dir)?;
    if !settings.dry_run {
        std::fs::create_dir_all(&recipes_dir)
            .with_context(|| format!("creating {}", recipes_dir.display()))?;
    }
    runner::dispatch(executor, &plan.invocation, settings.dry_run, log)?;

    if !settings.dry_run {
        log.info(&format!("pulled into {}", plan.dest.display()));
    }
    Ok(())
}

/// Render the recipe listing as text or pretty JSON.
///
/// # Errors
///
/// Returns an error if setup fails.
pub fn list(global: &GlobalOpts, json: bool, base: &Path, log: &dyn Log) -> Result<String> {
    let setup = CommandSetup::init(global, base, log)?;
    if json {
        let mut out = serde_json::to_string_pretty(&setup.index.to_json())?;
        out.push('\n');
        Ok(out)
    } else {
        Ok(setup.index.render_listing())
    }
}

/// Write a starter recipe into `parent/<name>`.
///
/// # Errors
///
/// Returns an error if the destination exists, the name is invalid, or the
/// type and runtime have no template.
pub fn create(
    global: &GlobalOpts,
    name: &str,
    parent: &Path,
    kind: RecipeType,
    runtime: Option<Runtime>,
    log: &dyn Log,
) -> Result<()> {
    let runtime = runtime.unwrap_or_else(|| scaffold::default_runtime(kind));
    log.stage(&format!("Creating {kind} recipe {name}"));

    if global.dry_run {
        let (dest, _) = scaffold::destination(name, parent, kind, runtime)?;
        log.dry_run(&format!("create {} ({runtime})", dest.display()));
        return Ok(());
    }

    let dir = scaffold::create(name, parent, kind, runtime)?;
    log.info(&format!("created {}", dir.display()));
    Ok(())
}
