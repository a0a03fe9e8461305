//! Line-oriented conversion session.
//!
//! Each line is either `<FROM> <TO> <AMOUNT>` or one of the commands listed
//! in [`HELP`]. The session keeps the displayed rate table and the conversion
//! history for its whole lifetime.

use super::context::{AppContext, RatesUpdate, is_conversion_error};
use super::convert::format_result;
use super::ui;
use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

pub const HELP: &str = "\
Enter a conversion as <FROM> <TO> <AMOUNT>, e.g. `USD EUR 10`.
Commands:
  currencies      list available currency codes
  history         show the last conversions
  refresh         fetch fresh rates now
  seturl <URL>    store a new API URL and fetch rates from it
  help            show this message
  quit            leave the session";

enum Flow {
    Continue,
    Quit,
}

fn report<W: Write>(out: &mut W, update: &RatesUpdate) -> Result<()> {
    if let Some(warning) = &update.cache_warning {
        writeln!(
            out,
            "{}",
            ui::style_text(&format!("Warning: {warning}"), ui::StyleType::Warning)
        )?;
    }
    Ok(())
}

fn write_error<W: Write>(out: &mut W, message: &str) -> Result<()> {
    writeln!(out, "{}", ui::style_text(message, ui::StyleType::Error))?;
    Ok(())
}

fn write_loaded<W: Write>(out: &mut W, ctx: &AppContext) -> Result<()> {
    if let Some(table) = ctx.rates() {
        writeln!(
            out,
            "{}",
            ui::style_text(
                &format!(
                    "{} currencies loaded (base {})",
                    table.rates.len(),
                    table.base_code
                ),
                ui::StyleType::Subtle
            )
        )?;
    }
    Ok(())
}

async fn convert_line<W: Write>(ctx: &mut AppContext, out: &mut W, args: &[&str]) -> Result<()> {
    let [from, to, amount] = args else {
        if args.len() < 3 {
            writeln!(out, "Please fill all fields")?;
        } else {
            writeln!(out, "Usage: <FROM> <TO> <AMOUNT>")?;
        }
        return Ok(());
    };

    match ctx.ensure_fresh().await {
        Ok(Some(update)) => report(out, &update)?,
        Ok(None) => {}
        Err(e) if ctx.rates().is_some() => writeln!(
            out,
            "{}",
            ui::style_text(
                &format!("Using previously loaded rates: {e}"),
                ui::StyleType::Warning
            )
        )?,
        Err(e) => return write_error(out, &format!("Error: {e}")),
    }

    match ctx.convert(&from.to_uppercase(), &to.to_uppercase(), amount) {
        Ok(entry) => writeln!(
            out,
            "{}",
            ui::style_text(&format_result(&entry), ui::StyleType::Result)
        )?,
        // Bad input is a warning; anything else is an application error.
        Err(e) if is_conversion_error(&e) => writeln!(
            out,
            "{}",
            ui::style_text(&e.to_string(), ui::StyleType::Warning)
        )?,
        Err(e) => write_error(out, &format!("Error: {e}"))?,
    }
    Ok(())
}

async fn handle_line<W: Write>(ctx: &mut AppContext, out: &mut W, line: &str) -> Result<Flow> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&command, args)) = tokens.split_first() else {
        return Ok(Flow::Continue);
    };

    match command.to_lowercase().as_str() {
        "quit" | "exit" => return Ok(Flow::Quit),
        "help" => writeln!(out, "{HELP}")?,
        "history" => {
            if ctx.history().is_empty() {
                writeln!(out, "No conversions yet")?;
            }
            for entry in ctx.history().iter() {
                writeln!(out, "{entry}")?;
            }
        }
        "currencies" => match ctx.rates() {
            Some(table) => writeln!(out, "{}", table.currencies().join(", "))?,
            None => write_error(out, "No exchange rates loaded")?,
        },
        "refresh" => match ctx.refresh_rates().await {
            Ok(update) => {
                report(out, &update)?;
                write_loaded(out, ctx)?;
            }
            Err(e) => write_error(out, &format!("Error: {e}"))?,
        },
        "seturl" | "set-url" => match args {
            [url] => {
                if let Err(e) = ctx.set_api_url(url) {
                    write_error(out, &format!("Error: {e}"))?;
                    return Ok(Flow::Continue);
                }
                match ctx.refresh_rates().await {
                    Ok(update) => {
                        report(out, &update)?;
                        write_loaded(out, ctx)?;
                    }
                    Err(e) => write_error(out, &format!("Error: {e}"))?,
                }
            }
            _ => writeln!(out, "Usage: seturl <URL>")?,
        },
        _ => convert_line(ctx, out, &tokens).await?,
    }
    Ok(Flow::Continue)
}

/// Runs the session until `quit` or end of input.
pub async fn run<R, W>(ctx: &mut AppContext, input: R, mut out: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(
        out,
        "{}",
        ui::style_text("Currency Exchange", ui::StyleType::Title)
    )?;
    match ctx.load_rates().await {
        Ok(update) => {
            report(&mut out, &update)?;
            write_loaded(&mut out, ctx)?;
        }
        Err(e) => write_error(&mut out, &format!("Error: {e}"))?,
    }
    writeln!(out, "{HELP}")?;

    let mut lines = input.lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if let Flow::Quit = handle_line(ctx, &mut out, line.trim()).await? {
            break;
        }
    }
    writeln!(out)?;
    Ok(())
}
