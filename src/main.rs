//! `stack-starter` binary: parses arguments and runs one command.
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::{CommandFactory as _, Parser};

use stack_starter::cli::{Cli, Command};
use stack_starter::commands;
use stack_starter::exec::SystemExecutor;
use stack_starter::logging::{self, ConsoleTarget, Logger};

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    let command = match &args.command {
        Command::Provision(_) => "provision",
        Command::Configure(_) => "configure",
        Command::Recipe(_) => "recipe",
        Command::Completions { .. } | Command::Version => {
            print_only(&args.command);
            return ExitCode::SUCCESS;
        }
    };

    let target = if args.command.writes_data() {
        ConsoleTarget::Stderr
    } else {
        ConsoleTarget::Split
    };
    logging::init_subscriber(args.verbose, command, target);
    let log = Logger::new(command);

    match run(&args, &log) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log.error(&format!("{e:#}"));
            if let Some(path) = log.log_path() {
                log.debug(&format!("log written to {}", path.display()));
            }
            ExitCode::from(stack_starter::exit_code(&e))
        }
    }
}

#[allow(clippy::print_stdout)]
fn print_only(command: &Command) {
    match command {
        Command::Completions { shell } => {
            clap_complete::generate(
                *shell,
                &mut Cli::command(),
                "stack-starter",
                &mut std::io::stdout(),
            );
        }
        _ => println!("stack-starter {}", stack_starter::version()),
    }
}

fn run(args: &Cli, log: &Logger) -> Result<()> {
    let base = std::env::current_dir().context("reading current directory")?;
    let executor = SystemExecutor;

    match &args.command {
        Command::Provision(opts) => {
            commands::provision::run(&args.global, opts, &base, log, &executor)
        }
        Command::Configure(opts) => {
            commands::configure::run(&args.global, opts, &base, log, &executor)
        }
        Command::Recipe(cmd) => commands::recipe::run(&args.global, cmd, &base, log, &executor),
        Command::Completions { .. } | Command::Version => Ok(()),
    }
}
