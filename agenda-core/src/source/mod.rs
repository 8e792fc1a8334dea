//! Sources feeding the calendar.
//!
//! Each source fetches raw records from the API and normalizes them into
//! [`CalendarItem`]s. Sources report failures as errors; deciding what to
//! do about them is the aggregator's job.

pub mod events;
pub mod justificantes;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::warn;

use crate::error::AgendaResult;
use crate::item::CalendarItem;
use crate::session::UserId;

pub use events::{EventRecord, HttpEventSource};
pub use justificantes::{Document, HttpJustificanteSource, JustificanteRecord, NewJustificante};

/// Public calendar events, visible to everyone.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch_events(&self) -> AgendaResult<Vec<CalendarItem>>;
}

/// An employee's justificantes. Every call needs a bearer token.
#[async_trait]
pub trait JustificanteSource: Send + Sync {
    async fn fetch_justificantes(
        &self,
        employee_id: &UserId,
        token: &str,
    ) -> AgendaResult<Vec<CalendarItem>>;

    async fn submit_justificante(&self, token: &str, request: &NewJustificante) -> AgendaResult<()>;
}

/// Decode each record on its own, skipping (and logging) the ones that
/// don't fit so one bad record doesn't sink the batch.
pub(crate) fn decode_records<T: DeserializeOwned>(
    values: Vec<serde_json::Value>,
    what: &str,
) -> Vec<T> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping undecodable {} record: {}", what, e);
                None
            }
        })
        .collect()
}

/// Reads `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        id: i64,
        #[serde(default, deserialize_with = "null_as_default")]
        name: String,
    }

    #[test]
    fn test_decode_records_skips_only_bad_rows() {
        let rows: Vec<Row> = decode_records(
            vec![
                json!({"id": 1, "name": "a"}),
                json!({"id": "x"}),
                json!({"id": 3, "name": null}),
            ],
            "row",
        );

        assert_eq!(
            rows,
            vec![
                Row { id: 1, name: "a".to_string() },
                Row { id: 3, name: String::new() },
            ]
        );
    }
}
