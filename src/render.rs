//! TUI rendering traits for agenda types.
//!
//! Extension traits that add colored terminal rendering to agenda-core
//! types using owo_colors.

use agenda_core::item::ItemKind;
use agenda_core::{CalendarItem, ColorTag, Diagnostic, SessionState};
use chrono::{Local, NaiveDate, NaiveDateTime};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

/// Paint text in the item's calendar colour.
fn paint(tag: ColorTag, text: &str) -> String {
    match tag {
        ColorTag::Green => text.truecolor(0x4c, 0xaf, 0x50).to_string(),
        ColorTag::Red => text.truecolor(0xf4, 0x43, 0x36).to_string(),
        ColorTag::Orange => text.truecolor(0xff, 0x98, 0x00).to_string(),
    }
}

impl Render for CalendarItem {
    fn render(&self) -> String {
        let time = if self.is_justificante() {
            format!("{:>13}", "all-day")
        } else {
            format!("{} - {}", self.start.format("%H:%M"), self.end.format("%H:%M"))
        };
        let tag = format!("[{}]", self.id);

        format!(
            "  {} {} {}",
            time,
            paint(self.color(), &self.title),
            tag.dimmed()
        )
    }
}

/// Multi-line details for a single item.
pub fn render_details(item: &CalendarItem) -> String {
    let mut lines = vec![
        format!("{} {}", "Evento:".bold(), paint(item.color(), &item.title)),
        format!(
            "{} {} - {}",
            "Hora:".bold(),
            item.start.format("%Y-%m-%d %H:%M"),
            item.end.format("%Y-%m-%d %H:%M")
        ),
        format!(
            "{} {}",
            "Descripción:".bold(),
            item.description.as_deref().unwrap_or("Sin descripción")
        ),
    ];

    if let ItemKind::Justificante { status, source_id } = &item.kind {
        lines.push(format!("{} {}", "Estatus:".bold(), paint(item.color(), status.as_str())));
        lines.push(format!("{} {}", "Justificante:".bold(), source_id));
    }

    lines.join("\n")
}

impl Render for SessionState {
    fn render(&self) -> String {
        match self {
            SessionState::Anonymous => "Not logged in".dimmed().to_string(),
            SessionState::AuthenticatedNonEmployee => "Logged in".green().to_string(),
            SessionState::AuthenticatedEmployee => "Logged in (employee)".green().to_string(),
        }
    }
}

impl Render for Diagnostic {
    fn render(&self) -> String {
        format!("Could not load {}: {}", self.source, self.error)
            .yellow()
            .to_string()
    }
}

/// Format a date as a human-readable label (e.g. "Today", "Tomorrow", "Wed Feb 25")
pub fn format_date_label(date: NaiveDate) -> String {
    let today = Local::now().date_naive();

    let diff = (date - today).num_days();
    match diff {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d").to_string(),
    }
}

/// Group items by start day, in the order given, and render them.
pub fn render_by_day(items: &[&CalendarItem]) -> String {
    let mut lines = Vec::new();
    let mut current_date: Option<NaiveDate> = None;

    for item in items {
        let date = item.start.date();

        if current_date != Some(date) {
            if current_date.is_some() {
                lines.push(String::new());
            }
            lines.push(format_date_label(date).bold().to_string());
            current_date = Some(date);
        }

        lines.push(item.render());
    }

    lines.join("\n")
}

/// Whether an item overlaps [from, to].
pub fn overlaps(item: &CalendarItem, from: NaiveDateTime, to: NaiveDateTime) -> bool {
    item.start <= to && item.end >= from
}
