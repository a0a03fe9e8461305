use anyhow::Result;
use clap::{Parser, Subcommand};
use fxconv::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxconv::AppCommand {
    fn from(cmd: Commands) -> fxconv::AppCommand {
        match cmd {
            Commands::Rates => fxconv::AppCommand::Rates,
            Commands::Convert { from, to, amount } => {
                fxconv::AppCommand::Convert { from, to, amount }
            }
            Commands::SetUrl { url } => fxconv::AppCommand::SetUrl(url),
            Commands::Interactive => fxconv::AppCommand::Interactive,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Store the exchange-rate API URL and fetch rates from it
    SetUrl {
        url: String,
    },
    /// List available currencies and their rates
    Rates,
    /// Convert an amount between two currencies
    Convert {
        /// Currency to convert from, e.g. USD
        from: String,
        /// Currency to convert to, e.g. EUR
        to: String,
        /// Amount to convert
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// Start an interactive conversion session (default)
    Interactive,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxconv::cli::setup::setup(),
        Some(cmd) => fxconv::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            fxconv::run_command(fxconv::AppCommand::Interactive, cli.config_path.as_deref())
                .await
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
