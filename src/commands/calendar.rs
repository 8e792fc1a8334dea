use agenda_core::date::parse_date;
use anyhow::Result;
use chrono::{Duration, Local, NaiveTime};
use owo_colors::OwoColorize;

use crate::commands::Context;
use crate::render::{Render, overlaps, render_by_day};
use crate::utils::tui;

/// Days shown ahead of `from` when no end date is given
const DEFAULT_DAYS: i64 = 30;

pub async fn run(from: Option<&str>, to: Option<&str>) -> Result<()> {
    let from = match from {
        Some(s) => parse_date(s).map_err(|e| anyhow::anyhow!(e))?,
        None => Local::now().date_naive(),
    };
    let to = match to {
        Some(s) => parse_date(s).map_err(|e| anyhow::anyhow!(e))?,
        None => from + Duration::days(DEFAULT_DAYS),
    };
    if to < from {
        anyhow::bail!("--to ({}) is before --from ({})", to, from);
    }

    let ctx = Context::load()?;
    let aggregator = ctx.aggregator();

    let spinner = tui::create_spinner("Loading calendar");
    let report = aggregator.load_report().await;
    spinner.finish_and_clear();

    for diagnostic in &report.diagnostics {
        eprintln!("{}", diagnostic.render());
    }
    if report.session_expired() {
        eprintln!("Your session has expired. Log in again with:\n  agenda login\n");
    }

    let from_dt = from.and_time(NaiveTime::MIN);
    let to_dt = to.and_hms_opt(23, 59, 59).unwrap_or(from_dt);

    let mut visible: Vec<_> = report
        .items
        .iter()
        .filter(|item| overlaps(item, from_dt, to_dt))
        .collect();
    visible.sort_by_key(|item| item.start);

    if visible.is_empty() {
        println!("{}", "No events in this range.".dimmed());
        return Ok(());
    }

    println!("{}", render_by_day(&visible));
    Ok(())
}
