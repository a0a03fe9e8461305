pub mod context;
pub mod convert;
pub mod interactive;
pub mod rates;
pub mod set_url;
pub mod setup;
pub mod ui;

use crate::core::{RateError, RateOrigin};
use context::{AppContext, RatesUpdate};
use tracing::debug;

/// Prints the cache warning attached to a rates update, if any.
pub(crate) fn report_update(update: &RatesUpdate) {
    debug!(origin = ?update.origin, "Rates ready");
    if let Some(warning) = &update.cache_warning {
        eprintln!(
            "{}",
            ui::style_text(&format!("Warning: {warning}"), ui::StyleType::Warning)
        );
    }
}

/// Loads rates through the cache, with a spinner while a fetch may be running.
pub(crate) async fn load_rates(ctx: &mut AppContext) -> Result<RateOrigin, RateError> {
    let pb = ui::new_spinner("Loading exchange rates...");
    let update = ctx.load_rates().await;
    pb.finish_and_clear();
    let update = update?;
    report_update(&update);
    Ok(update.origin)
}
