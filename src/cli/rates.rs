use super::{context::AppContext, load_rates, ui};
use crate::core::RateTable;
use anyhow::Result;
use chrono::Utc;
use comfy_table::Cell;

impl RateTable {
    pub fn display_as_table(&self, now_unix: i64) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Currency"),
            ui::header_cell(&format!("Rate (per 1 {})", self.base_code)),
        ]);

        for code in self.currencies() {
            table.add_row(vec![
                Cell::new(code),
                ui::number_cell(format!("{:.4}", self.rates[code])),
            ]);
        }

        let mut output = format!(
            "Base currency: {}\n\n",
            ui::style_text(&self.base_code, ui::StyleType::Title)
        );
        output.push_str(&table.to_string());
        output.push_str(&format!(
            "\n\n{}",
            ui::style_text(
                &format!(
                    "{} currencies, fetched {} ago",
                    self.rates.len(),
                    ui::format_age(self.age_secs(now_unix))
                ),
                ui::StyleType::Subtle
            )
        ));
        output
    }
}

pub async fn run(ctx: &mut AppContext) -> Result<()> {
    load_rates(ctx).await?;
    if let Some(table) = ctx.rates() {
        println!("{}", table.display_as_table(Utc::now().timestamp()));
    }
    Ok(())
}
