mod commands;
mod helpers;

use clap::Parser;
use olcum_core::domain::OlcumError;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "OLCUM_LOG";

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let diagnostic = error.as_olcum_error();
            eprintln!("{}", diagnostic.diagnostic_line());
            eprintln!("{}", diagnostic.exit_line());
            diagnostic.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("olcum".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    match Cli::try_parse_from(&full_args) {
        Ok(cli) => {
            init_tracing(cli.verbose);
            dispatch_parsed(cli)
        }
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

/// Logs go to stderr. `OLCUM_LOG` takes an `EnvFilter` directive; `--verbose`
/// overrides it with `debug`.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "olcum",
    about = "Measurement record chimney/parameter matrix editor"
)]
struct Cli {
    /// JSON configuration file (defaults to ./olcum.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Measurement store path, overriding the configuration
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// List the parameter catalog of a page payload
    Catalog(commands::CatalogArgs),
    /// Create a measurement record from a draft through the two-step wizard
    Create(commands::CreateArgs),
    /// Edit the chimney matrix of a stored measurement record
    Edit(commands::EditArgs),
    /// Print a stored record's chimney matrix with parameter counters
    Show(commands::ShowArgs),
    /// List the districts of a region
    Districts(commands::DistrictsArgs),
}

fn dispatch_parsed(cli: Cli) -> Result<i32, CliError> {
    let mut config = helpers::load_config(cli.config.as_deref())?;
    if let Some(store) = cli.store {
        config.store_path = store;
    }

    match cli.command {
        CliCommand::Catalog(args) => commands::run_catalog_command(args),
        CliCommand::Create(args) => commands::run_create_command(&config, args),
        CliCommand::Edit(args) => commands::run_edit_command(&config, args),
        CliCommand::Show(args) => commands::run_show_command(&config, args),
        CliCommand::Districts(args) => commands::run_districts_command(&config, args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Domain(OlcumError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<OlcumError> for CliError {
    fn from(error: OlcumError) -> Self {
        Self::Domain(error)
    }
}

impl CliError {
    fn as_olcum_error(&self) -> OlcumError {
        match self {
            Self::Usage(message) => OlcumError::input_validation("INPUT.CLI_USAGE", message.clone()),
            Self::Domain(error) => error.clone(),
            Self::Internal(error) => OlcumError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}
