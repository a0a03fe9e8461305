use super::{context::AppContext, load_rates, ui};
use crate::core::ConversionHistoryEntry;
use anyhow::Result;

/// Result line shown after a successful conversion.
pub fn format_result(entry: &ConversionHistoryEntry) -> String {
    format!("Converted Amount: {:.2} {}", entry.converted, entry.to)
}

pub async fn run(ctx: &mut AppContext, from: &str, to: &str, amount: &str) -> Result<()> {
    load_rates(ctx).await?;

    let from = from.trim().to_uppercase();
    let to = to.trim().to_uppercase();
    let entry = ctx.convert(&from, &to, amount)?;
    println!(
        "{}",
        ui::style_text(&format_result(&entry), ui::StyleType::Result)
    );
    Ok(())
}
