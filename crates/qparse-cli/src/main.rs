mod commands;
mod error;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::commands::{check, parse, parsers, read, Context};
use crate::error::{exit_code_for, report_error};
use qparse_config as config;
use qparse_core::ParserRegistry;

#[derive(Debug, Parser)]
#[command(name = "qparse", version, about = "qparse CLI")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Activate only this parser (repeatable, overrides config)
    #[arg(long = "parser", value_name = "NAME", global = true)]
    parsers: Vec<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a filter expression
    Parse(parse::ParseArgs),
    /// Show which parsers would claim an expression
    Check(check::CheckArgs),
    /// List registered and active parsers
    Parsers(parsers::ParsersArgs),
    /// Build a read request payload
    Read(read::ReadArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        config: config_path,
        json,
        verbose,
        parsers: parser_names,
        command,
    } = cli;

    let app_config = config::load(config_path.clone()).with_context(|| "load config")?;
    if verbose {
        match config::resolve_config_path(config_path) {
            Ok(path) => {
                if path.exists() {
                    debug!(path = %path.display(), "config resolved");
                } else {
                    debug!(path = %path.display(), "config missing, using defaults");
                }
            }
            Err(err) => {
                debug!(error = %err, "config unavailable");
            }
        }
    }

    let registry = ParserRegistry::with_builtin_parsers();
    let active = if parser_names.is_empty() {
        app_config.parsers.active.clone()
    } else {
        Some(parser_names)
    };
    if let Some(names) = active {
        registry
            .set_active(&names)
            .with_context(|| "activate parsers")?;
    }
    if verbose {
        let (_, active) = registry.active_parsers();
        debug!(active = ?active, "parsers ready");
    }

    let ctx = Context {
        registry: &registry,
        json,
        config: &app_config,
    };

    match command {
        Command::Parse(args) => parse::parse_expression(&ctx, args),
        Command::Check(args) => check::check_expression(&ctx, args),
        Command::Parsers(args) => parsers::list_parsers(&ctx, args),
        Command::Read(args) => read::build_read_query(&ctx, args),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
