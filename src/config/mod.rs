//! Settings resolution: CLI flags over the TOML settings file over built-in
//! defaults.
pub mod toml_loader;

use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::cli::GlobalOpts;
use crate::error::ConfigError;
use crate::paths::{expand_home, normalize_dirs};
use crate::runner::{DEFAULT_PROVIDER, ProviderPolicy};

/// Working directory used when neither the CLI nor the settings file sets one.
pub const DEFAULT_WORKING_DIR: &str = "/tmp/stack_starter";

/// Name of the recipe directory searched under the working directory and the
/// current directory.
pub const RECIPES_DIR: &str = "recipes";

/// Application directory name under `$XDG_CONFIG_HOME`.
const APP_DIR: &str = "stack-starter";

/// Settings file name inside [`APP_DIR`].
const CONFIG_FILE: &str = "config.toml";

/// What to do when a scanned manifest declares an unrecognized `recipe_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownTypePolicy {
    /// Abort the command after the scan.
    #[default]
    Error,
    /// Log the manifest and leave it out of the index.
    Ignore,
}

/// `[policy]` table of the settings file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PolicyFile {
    unknown_recipe_type: UnknownTypePolicy,
    unknown_provider: ProviderPolicy,
}

/// On-disk shape of the settings file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SettingsFile {
    working_dir: Option<PathBuf>,
    recipe_paths: Vec<PathBuf>,
    default_provider: Option<String>,
    policy: PolicyFile,
}

/// Fully resolved settings for one command run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Absolute working directory holding infrastructures and pulled recipes.
    pub working_dir: PathBuf,
    /// `--recipes` override, searched before everything else.
    pub recipe_dir: Option<PathBuf>,
    /// Extra recipe search paths from the settings file.
    pub recipe_paths: Vec<PathBuf>,
    /// Provider used by the fallback policy.
    pub default_provider: String,
    /// Policy for manifests with unknown recipe types.
    pub unknown_recipe_type: UnknownTypePolicy,
    /// Policy for providers outside the allow-list.
    pub unknown_provider: ProviderPolicy,
    /// Log invocations instead of running them.
    pub dry_run: bool,
    /// Directory relative paths are resolved against.
    pub base: PathBuf,
    /// Settings file that was consulted, if any.
    pub config_path: Option<PathBuf>,
}

/// Default settings file location: `$XDG_CONFIG_HOME/stack-starter/config.toml`,
/// falling back to `$HOME/.config/stack-starter/config.toml`.
#[must_use]
pub fn default_config_path(
    xdg_config_home: Option<OsString>,
    home: Option<OsString>,
) -> Option<PathBuf> {
    xdg_config_home
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            home.filter(|v| !v.is_empty())
                .map(|h| PathBuf::from(h).join(".config"))
        })
        .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

fn absolutize(path: &Path, base: &Path) -> PathBuf {
    let expanded = expand_home(path);
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}

impl Settings {
    /// Resolve settings from CLI options and the settings file.
    ///
    /// `base` is the directory relative paths are resolved against, normally
    /// the process's current directory at startup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an explicitly requested settings file is
    /// missing or if any settings file is unreadable or malformed.
    pub fn resolve(global: &GlobalOpts, base: &Path) -> Result<Self, ConfigError> {
        let config_path = match &global.config {
            Some(explicit) => {
                let path = absolutize(explicit, base);
                if !path.is_file() {
                    return Err(ConfigError::Io {
                        path,
                        source: std::io::Error::from(std::io::ErrorKind::NotFound),
                    });
                }
                Some(path)
            }
            None => default_config_path(
                std::env::var_os("XDG_CONFIG_HOME"),
                std::env::var_os("HOME"),
            ),
        };

        let file: SettingsFile = match &config_path {
            Some(path) => toml_loader::load_config(path)?,
            None => SettingsFile::default(),
        };

        Ok(Self::merge(global, file, base, config_path))
    }

    fn merge(
        global: &GlobalOpts,
        file: SettingsFile,
        base: &Path,
        config_path: Option<PathBuf>,
    ) -> Self {
        let working_dir = global
            .directory
            .clone()
            .or(file.working_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKING_DIR));

        let (unknown_recipe_type, unknown_provider) = if global.lenient {
            (UnknownTypePolicy::Ignore, ProviderPolicy::Fallback)
        } else {
            (file.policy.unknown_recipe_type, file.policy.unknown_provider)
        };

        Self {
            working_dir: absolutize(&working_dir, base),
            recipe_dir: global.recipes.as_deref().map(expand_home),
            recipe_paths: file.recipe_paths.iter().map(|p| expand_home(p)).collect(),
            default_provider: file
                .default_provider
                .unwrap_or_else(|| DEFAULT_PROVIDER.to_string()),
            unknown_recipe_type,
            unknown_provider,
            dry_run: global.dry_run,
            base: base.to_path_buf(),
            config_path,
        }
    }

    /// Directory `recipe pull` clones into.
    #[must_use]
    pub fn pulled_recipes_dir(&self) -> PathBuf {
        self.working_dir.join(RECIPES_DIR)
    }

    /// Existing recipe directories in search order: `--recipes`, settings
    /// `recipe_paths`, `<working_dir>/recipes`, `./recipes`.
    #[must_use]
    pub fn recipe_dirs(&self) -> Vec<PathBuf> {
        let mut defaults = self.recipe_paths.clone();
        defaults.push(self.pulled_recipes_dir());
        defaults.push(PathBuf::from(RECIPES_DIR));
        normalize_dirs(self.recipe_dir.as_deref(), &defaults, &self.base)
    }
}
