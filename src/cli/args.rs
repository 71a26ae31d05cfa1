use crate::constants::{exit_codes, verbosity};
use clap::{error::ErrorKind, Args as ClapArgs, CommandFactory, Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#;

/// CLI arguments for stencil.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase logging verbosity (`-v`, `-vv`, `-vvv`).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Execute the action files of a command.
    Run(RunArgs),
    /// List the commands available in a project.
    List(ListArgs),
    /// Print the variables stored for a role.
    Vars(VarsArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RunArgs {
    /// Command name, the directory under `.spring/commands`.
    #[arg(value_name = "NOUN")]
    pub noun: String,

    /// Subcommand name, the directory under the command.
    #[arg(value_name = "VERB")]
    pub verb: String,

    /// Option values passed to the command.
    #[arg(value_name = "NAME=VALUE", value_parser = parse_key_value)]
    pub options: Vec<(String, String)>,

    /// Project root. Defaults to the current directory.
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Seconds before an exec action without its own timeout is killed.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Answer questions from defaults instead of prompting.
    #[arg(long = "non-interactive")]
    pub non_interactive: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ListArgs {
    /// Project root. Defaults to the current directory.
    #[arg(short, long)]
    pub dir: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct VarsArgs {
    /// Role to print. Defaults to the default role.
    #[arg(short, long)]
    pub role: Option<String>,

    /// List the named roles instead.
    #[arg(long, conflicts_with = "role")]
    pub list: bool,

    /// Project root. Defaults to the current directory.
    #[arg(short, long)]
    pub dir: Option<PathBuf>,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{raw}'")),
    }
}

/// Parse command line arguments with custom handling for missing required inputs.
pub fn parse_cli() -> Cli {
    Cli::try_parse().unwrap_or_else(|e| {
        if matches!(
            e.kind(),
            ErrorKind::MissingRequiredArgument
                | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                | ErrorKind::MissingSubcommand
        ) {
            let mut command = Cli::command().help_template(HELP_TEMPLATE);
            if let Err(print_err) = command.print_help() {
                eprintln!("Failed to display help information: {print_err}");
            } else {
                println!();
            }
            std::process::exit(exit_codes::FAILURE);
        } else {
            e.exit();
        }
    })
}

/// Map `-v` counts to the appropriate log level.
pub fn get_log_level_from_verbose(verbose_count: u8) -> LevelFilter {
    match verbose_count {
        verbosity::OFF => LevelFilter::Error,
        verbosity::INFO => LevelFilter::Info,
        verbosity::DEBUG => LevelFilter::Debug,
        verbosity::TRACE.. => LevelFilter::Trace,
    }
}
