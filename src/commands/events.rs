use agenda_core::dashboard::{Dashboard, EventDraft};
use agenda_core::date::parse_timestamp;
use agenda_core::source::EventRecord;
use anyhow::Result;
use chrono::NaiveDateTime;
use dialoguer::Confirm;
use owo_colors::OwoColorize;

use crate::commands::Context;
use crate::utils::tui;

fn parse_arg(s: &str) -> Result<NaiveDateTime> {
    parse_timestamp(s).map_err(|e| anyhow::anyhow!(e))
}

fn render_record(record: &EventRecord) -> String {
    format!(
        "{:>6}  {}  {}  {}  {}",
        record.id.to_string().dimmed(),
        record.start_date,
        record.end_date,
        record.title.bold(),
        record.description.as_deref().unwrap_or("").dimmed()
    )
}

pub async fn list() -> Result<()> {
    let ctx = Context::load()?;
    let session = ctx.session();
    let dashboard = Dashboard::new(&ctx.api, &session);

    let spinner = tui::create_spinner("Loading events");
    let records = dashboard.list().await;
    spinner.finish_and_clear();
    let records = records?;

    if records.is_empty() {
        println!("{}", "No events yet.".dimmed());
        return Ok(());
    }

    for record in &records {
        println!("{}", render_record(record));
    }
    Ok(())
}

pub async fn create(
    title: String,
    start: &str,
    end: &str,
    description: Option<String>,
) -> Result<()> {
    let draft = EventDraft {
        title,
        description,
        start: parse_arg(start)?,
        end: parse_arg(end)?,
    };

    let ctx = Context::load()?;
    let session = ctx.session();
    Dashboard::new(&ctx.api, &session).create(&draft).await?;

    println!("{} {}", "Created".green(), draft.title);
    Ok(())
}

pub async fn update(
    id: &str,
    title: Option<String>,
    start: Option<&str>,
    end: Option<&str>,
    description: Option<String>,
) -> Result<()> {
    let ctx = Context::load()?;
    let session = ctx.session();
    let dashboard = Dashboard::new(&ctx.api, &session);

    let records = dashboard.list().await?;
    let Some(record) = records.iter().find(|r| r.id.to_string() == id) else {
        anyhow::bail!("No event with id '{}'", id);
    };

    let mut draft = EventDraft::from_record(record)?;
    if let Some(title) = title {
        draft.title = title;
    }
    if let Some(start) = start {
        draft.start = parse_arg(start)?;
    }
    if let Some(end) = end {
        draft.end = parse_arg(end)?;
    }
    if description.is_some() {
        draft.description = description;
    }

    dashboard.update(&record.id, &draft).await?;

    println!("{} {}", "Updated".green(), draft.title);
    Ok(())
}

pub async fn delete(id: &str, yes: bool) -> Result<()> {
    let ctx = Context::load()?;
    let session = ctx.session();
    let dashboard = Dashboard::new(&ctx.api, &session);

    let records = dashboard.list().await?;
    let Some(record) = records.iter().find(|r| r.id.to_string() == id) else {
        anyhow::bail!("No event with id '{}'", id);
    };

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete \"{}\"?", record.title))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    dashboard.delete(&record.id).await?;

    println!("{} {}", "Deleted".red(), record.title);
    Ok(())
}
