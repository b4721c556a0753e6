//! Command: create an infrastructure with a provision recipe.
use std::path::Path;

use anyhow::Result;

use super::CommandSetup;
use crate::cli::{GlobalOpts, ProvisionOpts};
use crate::exec::Executor;
use crate::infra;
use crate::logging::Log;
use crate::recipes::RecipeType;
use crate::runner::{self, ProviderChoice, Target};

/// Run the provision command.
///
/// # Errors
///
/// Returns an error if setup fails, the infrastructure name or provider is
/// invalid, the recipe does not exist, or Vagrant fails.
pub fn run(
    global: &GlobalOpts,
    opts: &ProvisionOpts,
    base: &Path,
    log: &dyn Log,
    executor: &dyn Executor,
) -> Result<()> {
    let setup = CommandSetup::init(global, base, log)?;
    let settings = &setup.settings;

    log.stage(&format!("Provisioning {}", opts.infra));
    let location = infra::location(&settings.working_dir, &opts.infra)?;
    if location.exists() {
        log.warn(&format!(
            "{} already exists, vagrant will reuse it",
            location.display()
        ));
    }

    let choice = runner::resolve_provider(
        &opts.provider,
        &settings.default_provider,
        settings.unknown_provider,
    )?;
    if let ProviderChoice::Fallback { requested, used } = &choice {
        log.warn(&format!(
            "unknown provider '{requested}', falling back to '{used}'"
        ));
    }

    let manifest = setup.index.get(RecipeType::Provision, &opts.recipe)?;
    log.info(&format!(
        "recipe {} from {}",
        manifest.name,
        manifest.recipe_dir.display()
    ));

    let target = Target::Provision {
        infra_name: opts.infra.clone(),
        provider: choice.provider().to_string(),
        working_dir: settings.working_dir.clone(),
    };
    let invocation = runner::plan(manifest, &target, &opts.kwargs)?;
    runner::dispatch(executor, &invocation, settings.dry_run, log)?;

    if !settings.dry_run {
        log.info(&format!(
            "provisioned {}, inventory expected at {}",
            opts.infra,
            infra::inventory_file(&location).display()
        ));
    }
    Ok(())
}
