pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use anyhow::Result;
use cli::context::AppContext;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// List the currencies and rates of the current table
    Rates,
    /// Convert a single amount
    Convert {
        from: String,
        to: String,
        amount: String,
    },
    /// Store a new API URL and fetch rates from it
    SetUrl(String),
    /// Interactive conversion session over stdin
    Interactive,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxconv starting...");

    let mut ctx = AppContext::new(config_path)?;

    match command {
        AppCommand::Rates => cli::rates::run(&mut ctx).await,
        AppCommand::Convert { from, to, amount } => {
            cli::convert::run(&mut ctx, &from, &to, &amount).await
        }
        AppCommand::SetUrl(url) => cli::set_url::run(&mut ctx, &url).await,
        AppCommand::Interactive => {
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            cli::interactive::run(&mut ctx, input, std::io::stdout()).await
        }
    }
}
