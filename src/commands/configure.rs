//! Command: apply a configure recipe to an infrastructure.
use std::path::Path;

use anyhow::Result;

use super::CommandSetup;
use crate::cli::{ConfigureOpts, GlobalOpts};
use crate::exec::Executor;
use crate::infra::{self, Infrastructure, LOCALHOST};
use crate::logging::Log;
use crate::recipes::RecipeType;
use crate::runner::{self, Target};

/// Run the configure command.
///
/// The recipe is looked up before the infrastructure is touched, so a
/// missing recipe never writes an inventory or spawns anything.
///
/// # Errors
///
/// Returns an error if setup fails, the recipe does not exist, the
/// infrastructure has not been provisioned, or the runtime fails.
pub fn run(
    global: &GlobalOpts,
    opts: &ConfigureOpts,
    base: &Path,
    log: &dyn Log,
    executor: &dyn Executor,
) -> Result<()> {
    let setup = CommandSetup::init(global, base, log)?;
    let settings = &setup.settings;

    log.stage(&format!("Configuring {}", opts.infra));
    let manifest = setup.index.get(RecipeType::Configure, &opts.recipe)?;
    log.info(&format!(
        "recipe {} from {}",
        manifest.name,
        manifest.recipe_dir.display()
    ));

    let infra = if settings.dry_run && opts.infra == LOCALHOST {
        let dir = infra::location(&settings.working_dir, LOCALHOST)?;
        log.dry_run(&format!(
            "write {}",
            infra::inventory_file(&dir).display()
        ));
        Infrastructure {
            name: LOCALHOST.to_string(),
            dir,
        }
    } else {
        infra::resolve(&settings.working_dir, &opts.infra)?
    };
    log.debug(&format!("inventory: {}", infra.inventory().display()));

    let invocation = runner::plan(manifest, &Target::Configure(infra), &opts.kwargs)?;
    runner::dispatch(executor, &invocation, settings.dry_run, log)?;
    Ok(())
}
