//! Command-line interface: the clap derive tree and the `--kwargs` parser.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::ConfigError;
use crate::recipes::{RecipeType, Runtime};

/// Top-level CLI entry point for the recipe dispatcher.
#[derive(Parser, Debug)]
#[command(
    name = "stack-starter",
    about = "Provision and configure infrastructures from recipes",
    version
)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options accepted by every subcommand
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Working directory for infrastructures and pulled recipes [default: /tmp/stack_starter/]
    #[arg(short = 'd', long, global = true)]
    pub directory: Option<PathBuf>,

    /// Directory searched for recipes before all others
    #[arg(short, long, global = true)]
    pub recipes: Option<PathBuf>,

    /// Settings file [default: $XDG_CONFIG_HOME/stack-starter/config.toml]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Show the external commands without running them
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    /// Skip manifests with unknown types and fall back to the default provider
    #[arg(long, global = true)]
    pub lenient: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an infrastructure with a provision recipe
    Provision(ProvisionOpts),
    /// Apply a configure recipe to an infrastructure
    Configure(ConfigureOpts),
    /// Manage recipes
    #[command(subcommand)]
    Recipe(RecipeCommand),
    /// Print a shell completion script
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
    /// Print version information
    Version,
}

/// Options for the `provision` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ProvisionOpts {
    /// Name of the infrastructure to create
    pub infra: String,

    /// Vagrant provider (virtualbox, libvirt, vmware_desktop, hyperv, docker, parallels)
    pub provider: String,

    /// Provision recipe to run
    pub recipe: String,

    /// Extra key=value arguments passed to the recipe
    #[arg(long, num_args = 1.., value_parser = parse_kwarg)]
    pub kwargs: Vec<(String, String)>,
}

/// Options for the `configure` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ConfigureOpts {
    /// Infrastructure to configure (`localhost` for this machine)
    pub infra: String,

    /// Configure recipe to run
    pub recipe: String,

    /// Extra key=value arguments passed to the recipe
    #[arg(long, num_args = 1.., value_parser = parse_kwarg)]
    pub kwargs: Vec<(String, String)>,
}

/// `recipe` subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum RecipeCommand {
    /// Clone a recipe repository into the working directory
    Pull {
        /// Git URL of the recipe repository
        url: String,

        /// Directory name under <working_dir>/recipes [default: derived from the URL]
        #[arg(long)]
        name: Option<String>,
    },
    /// List available recipes
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Write a starter recipe
    Create {
        /// Recipe name
        recipe: String,

        /// Parent directory of the new recipe
        dir: PathBuf,

        /// Recipe type
        #[arg(long = "type", value_enum, default_value_t = RecipeType::Configure)]
        kind: RecipeType,

        /// Runtime [default: vagrant for provision, ansible for configure]
        #[arg(long, value_enum)]
        runtime: Option<Runtime>,
    },
}

impl Command {
    /// Whether this command prints machine-readable data on stdout, so log
    /// output must stay on stderr.
    #[must_use]
    pub const fn writes_data(&self) -> bool {
        matches!(self, Self::Recipe(RecipeCommand::List { json: true }))
    }
}

/// Parse a `key=value` override.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidKwarg`] if there is no `=` or the key is
/// empty.
pub fn parse_kwarg(raw: &str) -> Result<(String, String), ConfigError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(ConfigError::InvalidKwarg(raw.to_string())),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_configure() {
        let cli = Cli::parse_from(["stack-starter", "configure", "localhost", "sample"]);
        assert!(
            matches!(&cli.command, Command::Configure(_)),
            "Expected Configure command"
        );
        if let Command::Configure(opts) = cli.command {
            assert_eq!(opts.infra, "localhost");
            assert_eq!(opts.recipe, "sample");
            assert!(opts.kwargs.is_empty());
        }
    }

    #[test]
    fn parse_provision_with_kwargs() {
        let cli = Cli::parse_from([
            "stack-starter",
            "provision",
            "lab",
            "libvirt",
            "vm",
            "--kwargs",
            "cpus=2",
            "memory=4096",
        ]);
        assert!(
            matches!(&cli.command, Command::Provision(_)),
            "Expected Provision command"
        );
        if let Command::Provision(opts) = cli.command {
            assert_eq!(opts.infra, "lab");
            assert_eq!(opts.provider, "libvirt");
            assert_eq!(opts.recipe, "vm");
            assert_eq!(
                opts.kwargs,
                vec![
                    ("cpus".to_string(), "2".to_string()),
                    ("memory".to_string(), "4096".to_string()),
                ]
            );
        }
    }

    #[test]
    fn invalid_kwarg_is_a_usage_error() {
        let result = Cli::try_parse_from([
            "stack-starter",
            "configure",
            "localhost",
            "sample",
            "--kwargs",
            "novalue",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn kwarg_rules() {
        assert_eq!(
            parse_kwarg("url=http://x/?a=b").unwrap(),
            ("url".to_string(), "http://x/?a=b".to_string())
        );
        assert_eq!(
            parse_kwarg("empty=").unwrap(),
            ("empty".to_string(), String::new())
        );
        assert!(parse_kwarg("=value").is_err());
        assert!(parse_kwarg("plain").is_err());
    }

    #[test]
    fn parse_global_options() {
        let cli = Cli::parse_from([
            "stack-starter",
            "-d",
            "/srv/work",
            "-r",
            "./mine",
            "-c",
            "/etc/ss.toml",
            "-n",
            "--lenient",
            "recipe",
            "list",
        ]);
        assert_eq!(cli.global.directory, Some(PathBuf::from("/srv/work")));
        assert_eq!(cli.global.recipes, Some(PathBuf::from("./mine")));
        assert_eq!(cli.global.config, Some(PathBuf::from("/etc/ss.toml")));
        assert!(cli.global.dry_run);
        assert!(cli.global.lenient);
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = Cli::parse_from(["stack-starter", "configure", "localhost", "s", "--dry-run"]);
        assert!(cli.global.dry_run);
    }

    #[test]
    fn defaults_are_unset() {
        let cli = Cli::parse_from(["stack-starter", "version"]);
        assert!(matches!(cli.command, Command::Version));
        assert_eq!(cli.global.directory, None);
        assert!(!cli.global.dry_run);
        assert!(!cli.global.lenient);
        assert!(!cli.verbose);
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::parse_from(["stack-starter", "-v", "recipe", "list"]);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_recipe_list_json() {
        let cli = Cli::parse_from(["stack-starter", "recipe", "list", "--json"]);
        assert!(matches!(
            cli.command,
            Command::Recipe(RecipeCommand::List { json: true })
        ));
        assert!(cli.command.writes_data());
    }

    #[test]
    fn only_json_listing_writes_data() {
        for args in [
            &["stack-starter", "recipe", "list"][..],
            &["stack-starter", "configure", "localhost", "sample"],
            &["stack-starter", "recipe", "create", "web", "."],
        ] {
            let cli = Cli::parse_from(args);
            assert!(!cli.command.writes_data(), "{args:?}");
        }
    }

    #[test]
    fn parse_recipe_pull() {
        let cli = Cli::parse_from([
            "stack-starter",
            "recipe",
            "pull",
            "https://example.com/ops.git",
            "--name",
            "ops",
        ]);
        assert!(
            matches!(&cli.command, Command::Recipe(RecipeCommand::Pull { .. })),
            "Expected recipe pull"
        );
        if let Command::Recipe(RecipeCommand::Pull { url, name }) = cli.command {
            assert_eq!(url, "https://example.com/ops.git");
            assert_eq!(name.as_deref(), Some("ops"));
        }
    }

    #[test]
    fn parse_recipe_create_defaults() {
        let cli = Cli::parse_from(["stack-starter", "recipe", "create", "web", "./recipes"]);
        assert!(
            matches!(&cli.command, Command::Recipe(RecipeCommand::Create { .. })),
            "Expected recipe create"
        );
        if let Command::Recipe(RecipeCommand::Create {
            recipe,
            dir,
            kind,
            runtime,
        }) = cli.command
        {
            assert_eq!(recipe, "web");
            assert_eq!(dir, PathBuf::from("./recipes"));
            assert_eq!(kind, RecipeType::Configure);
            assert_eq!(runtime, None);
        }
    }

    #[test]
    fn parse_recipe_create_with_type_and_runtime() {
        let cli = Cli::parse_from([
            "stack-starter",
            "recipe",
            "create",
            "vm",
            ".",
            "--type",
            "provision",
            "--runtime",
            "vagrant",
        ]);
        assert!(matches!(
            cli.command,
            Command::Recipe(RecipeCommand::Create {
                kind: RecipeType::Provision,
                runtime: Some(Runtime::Vagrant),
                ..
            })
        ));
    }

    #[test]
    fn parse_completions() {
        let cli = Cli::parse_from(["stack-starter", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Command::Completions {
                shell: clap_complete::Shell::Bash
            }
        ));
    }
}
