use std::path::Path;

use agenda_core::date::parse_date;
use agenda_core::source::Document;
use anyhow::Result;
use owo_colors::OwoColorize;

use crate::commands::Context;
use crate::utils::tui;

pub async fn run(dia: Option<&str>, documento: Option<&Path>) -> Result<()> {
    let dia = dia
        .map(parse_date)
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))?;

    let documento = match documento {
        Some(path) => Some(Document::from_path(path).await?),
        None => None,
    };

    let ctx = Context::load()?;
    let aggregator = ctx.aggregator();

    let spinner = tui::create_spinner("Submitting justificante");
    let items = aggregator.submit_justificante(dia, documento).await;
    spinner.finish_and_clear();
    let items = items?;

    let count = items.iter().filter(|item| item.is_justificante()).count();
    println!("{}", "Justificante submitted, pending review.".green());
    println!("You have {} justificante(s) on your calendar.", count);
    Ok(())
}
