use super::{context::AppContext, report_update, ui};
use anyhow::Result;

/// Saves a new source URL and immediately fetches rates from it.
pub async fn run(ctx: &mut AppContext, url: &str) -> Result<()> {
    ctx.set_api_url(url)?;
    tracing::info!("Saved API URL to {}", ctx.config_path().display());

    let pb = ui::new_spinner("Fetching exchange rates...");
    let update = ctx.refresh_rates().await;
    pb.finish_and_clear();
    report_update(&update?);

    if let Some(table) = ctx.rates() {
        println!(
            "Loaded {} currencies (base {}) from {}",
            table.rates.len(),
            table.base_code,
            table.source_url
        );
    }
    Ok(())
}
