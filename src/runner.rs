//! Runtime dispatch: turn a recipe and its target into one external-process
//! invocation and run it.
//!
//! Building the [`Invocation`] ([`plan`]) is kept separate from running it
//! ([`dispatch`]) so every precondition is checked before anything spawns.
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::RunnerError;
use crate::exec::{Executor, Invocation};
use crate::infra::Infrastructure;
use crate::logging::Log;
use crate::recipes::{Manifest, RecipeType, Runtime};

/// Vagrant providers a provision recipe may request.
pub const PROVIDERS: &[&str] = &[
    "virtualbox",
    "libvirt",
    "vmware_desktop",
    "hyperv",
    "docker",
    "parallels",
];

/// Provider used when none is configured.
pub const DEFAULT_PROVIDER: &str = "virtualbox";

/// Environment variable carrying the infrastructure name to Vagrant.
pub const ENV_INFRA_NAME: &str = "STACK_STARTER_INFRA_NAME";
/// Environment variable carrying the chosen provider to Vagrant.
pub const ENV_INFRA_PROVIDER: &str = "STACK_STARTER_INFRA_PROVIDER";
/// Environment variable carrying the working directory to Vagrant.
pub const ENV_WORKING_DIR: &str = "STACK_STARTER_WORKING_DIR";
/// Environment variable Vagrant reads to locate the Vagrantfile.
pub const ENV_VAGRANTFILE: &str = "VAGRANT_VAGRANTFILE";

/// Variables the dispatcher sets for Vagrant; `--kwargs` may not override them.
pub const RESERVED_ENV: [&str; 4] = [
    ENV_INFRA_NAME,
    ENV_INFRA_PROVIDER,
    ENV_WORKING_DIR,
    ENV_VAGRANTFILE,
];

/// Verbosity passed to `ansible-playbook`.
const ANSIBLE_VERBOSITY: &str = "-vv";

/// What to do when a requested provider is not in [`PROVIDERS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderPolicy {
    /// Reject the request.
    #[default]
    Error,
    /// Use the default provider instead and warn.
    Fallback,
}

/// Outcome of provider validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderChoice {
    /// The requested provider is allowed.
    Requested(String),
    /// The requested provider was replaced by the default.
    Fallback {
        /// What the user asked for.
        requested: String,
        /// What will be used.
        used: String,
    },
}

impl ProviderChoice {
    /// Provider that will be passed to Vagrant.
    #[must_use]
    pub fn provider(&self) -> &str {
        match self {
            Self::Requested(p) | Self::Fallback { used: p, .. } => p,
        }
    }
}

fn invalid_provider(provider: &str) -> RunnerError {
    RunnerError::InvalidProvider {
        provider: provider.to_string(),
        allowed: PROVIDERS.join(", "),
    }
}

/// Validate `requested` against [`PROVIDERS`], applying `policy`.
///
/// # Errors
///
/// Returns [`RunnerError::InvalidProvider`] if `requested` is not allowed and
/// the policy is [`ProviderPolicy::Error`], or if the fallback provider
/// itself is not allowed.
pub fn resolve_provider(
    requested: &str,
    default: &str,
    policy: ProviderPolicy,
) -> Result<ProviderChoice, RunnerError> {
    if PROVIDERS.contains(&requested) {
        return Ok(ProviderChoice::Requested(requested.to_string()));
    }
    match policy {
        ProviderPolicy::Error => Err(invalid_provider(requested)),
        ProviderPolicy::Fallback if PROVIDERS.contains(&default) => Ok(ProviderChoice::Fallback {
            requested: requested.to_string(),
            used: default.to_string(),
        }),
        ProviderPolicy::Fallback => Err(invalid_provider(default)),
    }
}

/// Where a recipe is being applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Create an infrastructure with Vagrant.
    Provision {
        /// Infrastructure name exported to the Vagrantfile.
        infra_name: String,
        /// Validated Vagrant provider.
        provider: String,
        /// Working directory exported to the Vagrantfile.
        working_dir: PathBuf,
    },
    /// Configure an existing infrastructure.
    Configure(Infrastructure),
}

impl Target {
    /// Recipe type this target accepts.
    #[must_use]
    pub const fn kind(&self) -> RecipeType {
        match self {
            Self::Provision { .. } => RecipeType::Provision,
            Self::Configure(_) => RecipeType::Configure,
        }
    }
}

/// Build the invocation for `manifest` against `target`.
///
/// `kwargs` become `-e key=value` pairs for Ansible and environment
/// variables for the shell and Vagrant runtimes.
///
/// # Errors
///
/// Returns [`RunnerError::UnknownRuntime`] for unrecognized runtime tags,
/// [`RunnerError::RuntimeMismatch`] when the runtime cannot serve the
/// recipe's type or the target, [`RunnerError::BashRequiresLocalhost`]
/// when a shell recipe targets anything but localhost, and
/// [`RunnerError::ReservedKwarg`] when a Vagrant kwarg names one of
/// [`RESERVED_ENV`].
pub fn plan(
    manifest: &Manifest,
    target: &Target,
    kwargs: &[(String, String)],
) -> Result<Invocation, RunnerError> {
    let runtime = manifest
        .runtime()
        .ok_or_else(|| RunnerError::UnknownRuntime(manifest.recipe_runtime.clone()))?;
    if !runtime.serves(manifest.recipe_type) || manifest.recipe_type != target.kind() {
        return Err(RunnerError::RuntimeMismatch {
            recipe: manifest.name.clone(),
            kind: manifest.recipe_type,
            runtime: manifest.recipe_runtime.clone(),
        });
    }

    let base = Invocation::new(runtime.program()).current_dir(&manifest.recipe_dir);
    let with_env = |inv: Invocation| {
        kwargs
            .iter()
            .fold(inv, |inv, (k, v)| inv.env(k.as_str(), v.as_str()))
    };

    let invocation = match (runtime, target) {
        (Runtime::Ansible, Target::Configure(infra)) => {
            let inventory = infra.inventory().display().to_string();
            let inv = base
                .arg(&manifest.recipe_entry)
                .args(["-i", inventory.as_str(), ANSIBLE_VERBOSITY]);
            kwargs
                .iter()
                .fold(inv, |inv, (k, v)| inv.arg("-e").arg(format!("{k}={v}")))
        }
        (Runtime::Bash, Target::Configure(infra)) => {
            if !infra.is_localhost() {
                return Err(RunnerError::BashRequiresLocalhost(infra.name.clone()));
            }
            with_env(base.arg(&manifest.recipe_entry))
        }
        (
            Runtime::Vagrant,
            Target::Provision {
                infra_name,
                provider,
                working_dir,
            },
        ) => {
            if let Some((key, _)) = kwargs
                .iter()
                .find(|(k, _)| RESERVED_ENV.contains(&k.as_str()))
            {
                return Err(RunnerError::ReservedKwarg(key.clone()));
            }
            with_env(
                base.args(["up".to_string(), format!("--provider={provider}")])
                    .env(ENV_INFRA_NAME, infra_name.as_str())
                    .env(ENV_INFRA_PROVIDER, provider.as_str())
                    .env(ENV_WORKING_DIR, working_dir.display().to_string())
                    .env(ENV_VAGRANTFILE, manifest.recipe_entry.as_str()),
            )
        }
        _ => {
            return Err(RunnerError::RuntimeMismatch {
                recipe: manifest.name.clone(),
                kind: manifest.recipe_type,
                runtime: manifest.recipe_runtime.clone(),
            });
        }
    };
    Ok(invocation)
}

/// Run `invocation` synchronously, treating a non-zero exit as fatal.
///
/// In dry-run mode the invocation is only logged.
///
/// # Errors
///
/// Returns [`RunnerError::ToolMissing`] if the program is not on `PATH`,
/// [`RunnerError::Spawn`] if it cannot start, and
/// [`RunnerError::ProcessFailed`] if it exits unsuccessfully.
pub fn dispatch(
    executor: &dyn Executor,
    invocation: &Invocation,
    dry_run: bool,
    log: &dyn Log,
) -> Result<(), RunnerError> {
    let dir = invocation
        .dir()
        .map_or_else(|| ".".to_string(), |d| d.display().to_string());
    for (key, value) in &invocation.env {
        log.debug(&format!("env {key}={value}"));
    }

    if dry_run {
        log.dry_run(&format!("{invocation} (in {dir})"));
        return Ok(());
    }

    if !executor.which(&invocation.program) {
        return Err(RunnerError::ToolMissing(invocation.program.clone()));
    }

    log.info(&format!("running {invocation} (in {dir})"));
    executor.run(invocation)?.check(&invocation.program)?;
    log.debug(&format!("{} exited successfully", invocation.program));
    Ok(())
}
