//! Command entry points and the setup they share.
//!
//! Each command builds a [`CommandSetup`] for its settings and recipe index
//! before handing an invocation to [`crate::runner`].
pub mod configure;
pub mod provision;
pub mod recipe;

use std::path::Path;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::Settings;
use crate::logging::Log;
use crate::recipes::{self, RecipeIndex};

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates settings resolution, working-directory preparation, and the
/// recipe scan so that each command does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Merged CLI, file and default settings.
    pub settings: Settings,
    /// Recipes found on the search path, keyed by type and name.
    pub index: RecipeIndex,
}

impl CommandSetup {
    /// Resolve settings, prepare the working directory, and index recipes.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file is invalid, the working
    /// directory cannot be created, or the scan finds manifests with unknown
    /// recipe types under the strict policy.
    pub fn init(global: &GlobalOpts, base: &Path, log: &dyn Log) -> Result<Self> {
        let settings = load_settings(global, base, log)?;

        log.stage("Scanning recipes");
        let dirs = settings.recipe_dirs();
        for dir in &dirs {
            log.debug(&format!("search path: {}", dir.display()));
        }
        if dirs.is_empty() {
            log.warn("no recipe directories found");
        }

        let report = recipes::scan(&dirs);
        for issue in &report.issues {
            log.warn(&issue.to_string());
        }
        for s in &report.shadowed {
            log.warn(&format!(
                "{} recipe '{}' in {} shadows {}",
                s.kind,
                s.name,
                s.dir.display(),
                s.previous_dir.display()
            ));
        }
        report.enforce(settings.unknown_recipe_type)?;

        log.info(&format!(
            "indexed {} recipe(s) from {} director{}",
            report.index.len(),
            dirs.len(),
            if dirs.len() == 1 { "y" } else { "ies" }
        ));

        Ok(Self {
            settings,
            index: report.index,
        })
    }
}

/// Resolve settings and make sure the working directory exists.
///
/// # Errors
///
/// Returns an error if the settings file is invalid or the working directory
/// cannot be created.
pub fn load_settings(global: &GlobalOpts, base: &Path, log: &dyn Log) -> Result<Settings> {
    let settings = Settings::resolve(global, base)?;
    match &settings.config_path {
        Some(path) if path.exists() => log.debug(&format!("settings: {}", path.display())),
        _ => log.debug("settings: built-in defaults"),
    }

    std::fs::create_dir_all(&settings.working_dir).with_context(|| {
        format!(
            "creating working directory {}",
            settings.working_dir.display()
        )
    })?;
    log.debug(&format!("working directory: {}", settings.working_dir.display()));
    Ok(settings)
}
