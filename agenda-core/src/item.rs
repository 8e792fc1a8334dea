//! Calendar items: events and justificantes unified for display.
//!
//! Both sources normalize into [`CalendarItem`]. The kind-specific metadata
//! (a justificante's approval status and its own id) lives on
//! [`ItemKind`], so an event can never carry a status.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Prefix for ids of justificante-derived items, keeping them apart from event ids.
pub const JUSTIFICANTE_ID_PREFIX: &str = "justificante_";

/// An identifier as the API sends it: a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(i64),
    Text(String),
}

impl ItemId {
    /// Numeric value of the id, if it has one (`7` or `"7"`).
    pub fn as_number(&self) -> Option<i64> {
        match self {
            ItemId::Number(n) => Some(*n),
            ItemId::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ItemId::Number(n) => write!(f, "{}", n),
            ItemId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        ItemId::Number(n)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId::Text(s.to_string())
    }
}

/// Approval status of a justificante.
///
/// The API speaks Spanish (`pendiente`, `aprobado`, `rechazado`); English
/// spellings are accepted too. Anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JustificanteStatus {
    Pending,
    Approved,
    Rejected,
    Other(String),
}

impl JustificanteStatus {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pendiente" | "pending" => JustificanteStatus::Pending,
            "aprobado" | "approved" => JustificanteStatus::Approved,
            "rechazado" | "rejected" => JustificanteStatus::Rejected,
            _ => JustificanteStatus::Other(s.to_string()),
        }
    }

    /// The value sent to and received from the API.
    pub fn as_str(&self) -> &str {
        match self {
            JustificanteStatus::Pending => "pendiente",
            JustificanteStatus::Approved => "aprobado",
            JustificanteStatus::Rejected => "rechazado",
            JustificanteStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for JustificanteStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for JustificanteStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JustificanteStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(JustificanteStatus::parse(&s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemKind {
    Event,
    Justificante {
        status: JustificanteStatus,
        /// The justificante's own id, distinct from the namespaced display id.
        source_id: ItemId,
    },
}

/// One entry of the aggregated calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarItem {
    pub id: ItemId,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub description: Option<String>,
    #[serde(flatten)]
    pub kind: ItemKind,
}

impl CalendarItem {
    pub fn is_justificante(&self) -> bool {
        matches!(self.kind, ItemKind::Justificante { .. })
    }

    pub fn status(&self) -> Option<&JustificanteStatus> {
        match &self.kind {
            ItemKind::Justificante { status, .. } => Some(status),
            ItemKind::Event => None,
        }
    }

    /// Display colour, derived from the item alone.
    ///
    /// Justificantes are coloured by status; events alternate by the
    /// parity of their numeric id.
    pub fn color(&self) -> ColorTag {
        match &self.kind {
            ItemKind::Justificante { status, .. } => match status {
                JustificanteStatus::Approved => ColorTag::Green,
                JustificanteStatus::Rejected => ColorTag::Red,
                JustificanteStatus::Pending | JustificanteStatus::Other(_) => ColorTag::Orange,
            },
            ItemKind::Event => match self.id.as_number() {
                Some(n) if n % 2 == 0 => ColorTag::Green,
                _ => ColorTag::Orange,
            },
        }
    }
}

impl fmt::Display for CalendarItem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    Green,
    Red,
    Orange,
}

impl ColorTag {
    /// CSS colour for calendar front ends.
    pub fn hex(&self) -> &'static str {
        match self {
            ColorTag::Green => "#4caf50",
            ColorTag::Red => "#f44336",
            ColorTag::Orange => "#ff9800",
        }
    }
}
