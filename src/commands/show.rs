use anyhow::Result;

use crate::commands::Context;
use crate::render::render_details;
use crate::utils::tui;

pub async fn run(id: &str) -> Result<()> {
    let ctx = Context::load()?;
    let aggregator = ctx.aggregator();

    let spinner = tui::create_spinner("Loading calendar");
    let items = aggregator.load().await;
    spinner.finish_and_clear();

    let Some(item) = items.iter().find(|item| item.id.to_string() == id) else {
        anyhow::bail!("No calendar item with id '{}'", id);
    };

    println!("{}", render_details(item));
    Ok(())
}
