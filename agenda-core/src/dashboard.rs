//! Dashboard CRUD over `/events`. Every operation needs a logged-in session.

use chrono::NaiveDateTime;
use reqwest::Method;
use serde::Serialize;
use tracing::info;

use crate::api::ApiClient;
use crate::date::{WIRE_DATETIME_FORMAT, parse_timestamp};
use crate::error::{AgendaError, AgendaResult};
use crate::item::ItemId;
use crate::session::{SessionStorage, SessionStore};
use crate::source::EventRecord;

/// Fields of an event being created or edited.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub description: Option<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl EventDraft {
    pub fn validate(&self) -> AgendaResult<()> {
        if self.title.trim().is_empty() {
            return Err(AgendaError::Validation("Please enter a title".to_string()));
        }
        if self.end < self.start {
            return Err(AgendaError::Validation(
                "The event must end after it starts".to_string(),
            ));
        }
        Ok(())
    }

    /// Prefill from an existing record, for editing.
    pub fn from_record(record: &EventRecord) -> AgendaResult<Self> {
        let start = parse_timestamp(&record.start_date).map_err(AgendaError::Decode)?;
        let end = parse_timestamp(&record.end_date).map_err(AgendaError::Decode)?;
        Ok(EventDraft {
            title: record.title.clone(),
            description: record.description.clone(),
            start,
            end,
        })
    }

    fn payload(&self) -> EventPayload<'_> {
        EventPayload {
            title: &self.title,
            description: self.description.as_deref(),
            start_date: self.start.format(WIRE_DATETIME_FORMAT).to_string(),
            end_date: self.end.format(WIRE_DATETIME_FORMAT).to_string(),
        }
    }
}

#[derive(Serialize)]
struct EventPayload<'a> {
    title: &'a str,
    description: Option<&'a str>,
    start_date: String,
    end_date: String,
}

pub struct Dashboard<'a, S> {
    api: &'a ApiClient,
    session: &'a SessionStore<S>,
}

impl<'a, S: SessionStorage> Dashboard<'a, S> {
    pub fn new(api: &'a ApiClient, session: &'a SessionStore<S>) -> Self {
        Dashboard { api, session }
    }

    fn token(&self) -> AgendaResult<String> {
        self.session.token().ok_or_else(|| {
            AgendaError::Unauthorized("Please log in to access the dashboard".to_string())
        })
    }

    /// GET /events, newest start first.
    pub async fn list(&self) -> AgendaResult<Vec<EventRecord>> {
        let token = self.token()?;
        let mut records: Vec<EventRecord> = self.api.get_json("events", Some(&token)).await?;

        records.sort_by_key(|r| std::cmp::Reverse(parse_timestamp(&r.start_date).ok()));
        Ok(records)
    }

    /// POST /events
    pub async fn create(&self, draft: &EventDraft) -> AgendaResult<()> {
        draft.validate()?;
        let token = self.token()?;

        let builder = self
            .api
            .request(Method::POST, "events", Some(&token))?
            .json(&draft.payload());
        self.api.send(builder).await?;

        info!("Created event '{}'", draft.title);
        Ok(())
    }

    /// PUT /events/:id
    pub async fn update(&self, id: &ItemId, draft: &EventDraft) -> AgendaResult<()> {
        draft.validate()?;
        let token = self.token()?;

        let builder = self
            .api
            .request(Method::PUT, &format!("events/{}", id), Some(&token))?
            .json(&draft.payload());
        self.api.send(builder).await?;

        info!("Updated event {}", id);
        Ok(())
    }

    /// DELETE /events/:id
    pub async fn delete(&self, id: &ItemId) -> AgendaResult<()> {
        let token = self.token()?;

        let builder = self
            .api
            .request(Method::DELETE, &format!("events/{}", id), Some(&token))?;
        self.api.send(builder).await?;

        info!("Deleted event {}", id);
        Ok(())
    }
}
