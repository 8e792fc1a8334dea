//! Public events from `GET /events`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::date::parse_timestamp;
use crate::error::AgendaResult;
use crate::item::{CalendarItem, ItemId, ItemKind};
use crate::source::{EventSource, decode_records, null_as_default};

/// An event as the API stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: ItemId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub end_date: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl EventRecord {
    /// Normalize into a calendar item. Fails on unparseable dates or an
    /// end before the start.
    pub fn to_item(&self) -> Result<CalendarItem, String> {
        let start = parse_timestamp(&self.start_date)
            .map_err(|e| format!("event {}: bad start_date: {}", self.id, e))?;
        let end = parse_timestamp(&self.end_date)
            .map_err(|e| format!("event {}: bad end_date: {}", self.id, e))?;

        if end < start {
            return Err(format!(
                "event {}: ends ({}) before it starts ({})",
                self.id, end, start
            ));
        }

        Ok(CalendarItem {
            id: self.id.clone(),
            title: self.title.clone(),
            start,
            end,
            description: self.description.clone(),
            kind: ItemKind::Event,
        })
    }
}

/// Normalize records in order, skipping (and logging) the ones that can't be shown.
pub fn normalize_events(records: &[EventRecord]) -> Vec<CalendarItem> {
    records
        .iter()
        .filter_map(|record| match record.to_item() {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("Skipping {}", e);
                None
            }
        })
        .collect()
}

pub struct HttpEventSource {
    api: ApiClient,
}

impl HttpEventSource {
    pub fn new(api: ApiClient) -> Self {
        HttpEventSource { api }
    }
}

#[async_trait]
impl EventSource for HttpEventSource {
    async fn fetch_events(&self) -> AgendaResult<Vec<CalendarItem>> {
        let values: Vec<serde_json::Value> = self.api.get_json("events", None).await?;
        let records: Vec<EventRecord> = decode_records(values, "event");
        let items = normalize_events(&records);

        info!("Fetched {} events", items.len());
        Ok(items)
    }
}
