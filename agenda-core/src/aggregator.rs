//! Calendar aggregation: public events plus, for employees, their justificantes.
//!
//! [`CalendarAggregator::load`] never fails. A source that errors contributes
//! nothing, and the error is kept as a [`Diagnostic`] on the
//! [`Aggregation`] returned by [`CalendarAggregator::load_report`].

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::{AgendaError, AgendaResult};
use crate::item::{CalendarItem, ItemId};
use crate::session::{EMPLOYEE_ROLE, SessionStorage, SessionStore};
use crate::source::{Document, EventSource, JustificanteSource, NewJustificante};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Events,
    Justificantes,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SourceKind::Events => write!(f, "events"),
            SourceKind::Justificantes => write!(f, "justificantes"),
        }
    }
}

/// An error that was absorbed while aggregating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub source: SourceKind,
    pub error: AgendaError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    pub items: Vec<CalendarItem>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Aggregation {
    /// A protected fetch was rejected; the user should log in again.
    pub fn session_expired(&self) -> bool {
        self.diagnostics.iter().any(|d| d.error.is_unauthorized())
    }

    pub fn is_complete(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

pub struct CalendarAggregator<E, J, S> {
    events: E,
    justificantes: J,
    session: SessionStore<S>,
}

impl<E, J, S> CalendarAggregator<E, J, S>
where
    E: EventSource,
    J: JustificanteSource,
    S: SessionStorage,
{
    pub fn new(events: E, justificantes: J, session: SessionStore<S>) -> Self {
        CalendarAggregator {
            events,
            justificantes,
            session,
        }
    }

    pub fn session(&self) -> &SessionStore<S> {
        &self.session
    }

    /// The best available calendar. Safe to call repeatedly.
    pub async fn load(&self) -> Vec<CalendarItem> {
        self.load_report().await.items
    }

    /// Events first, then the employee's justificantes, each in source order.
    pub async fn load_report(&self) -> Aggregation {
        let mut report = Aggregation::default();

        match self.events.fetch_events().await {
            Ok(events) => report.items.extend(events),
            Err(error) => report.absorb(SourceKind::Events, error),
        }

        match self.fetch_justificantes().await {
            Ok(Some(justificantes)) => report.items.extend(justificantes),
            Ok(None) => {}
            Err(error) => report.absorb(SourceKind::Justificantes, error),
        }

        report.dedup_ids();
        info!(
            "Loaded {} calendar items ({} diagnostics)",
            report.items.len(),
            report.diagnostics.len()
        );
        report
    }

    /// `Ok(None)` when the session doesn't qualify for justificantes.
    async fn fetch_justificantes(&self) -> AgendaResult<Option<Vec<CalendarItem>>> {
        // Catch up on external changes so the generation matches the snapshot
        self.session.refresh();
        let generation = self.session.generation();
        let session = self.session.snapshot();

        let (Some(token), Some(employee_id)) = (session.token.as_deref(), session.user_id())
        else {
            return Ok(None);
        };
        if !session.has_role(EMPLOYEE_ROLE) {
            return Ok(None);
        }

        let items = self
            .justificantes
            .fetch_justificantes(employee_id, token)
            .await?;

        // Drop responses that outlived the session they were requested under
        self.session.refresh();
        if self.session.generation() != generation
            || self.session.token().as_deref() != Some(token)
        {
            debug!("Discarding justificantes fetched under a previous session");
            return Err(AgendaError::StaleSession);
        }

        Ok(Some(items))
    }

    /// Submit a pending justificante for the logged-in employee, then reload.
    pub async fn submit_justificante(
        &self,
        dia_justificar: Option<NaiveDate>,
        documento: Option<Document>,
    ) -> AgendaResult<Vec<CalendarItem>> {
        let session = self.session.snapshot();

        if !session.state().is_employee() {
            return Err(AgendaError::Unauthorized(
                "Only employees can submit justificantes".to_string(),
            ));
        }
        let (Some(token), Some(user_id)) = (session.token.as_deref(), session.user_id()) else {
            return Err(AgendaError::Unauthorized(
                "No user id in the current session".to_string(),
            ));
        };

        let request = NewJustificante {
            user_id: user_id.clone(),
            dia_justificar,
            documento,
        };
        request.validate()?;

        self.justificantes.submit_justificante(token, &request).await?;

        Ok(self.load().await)
    }
}

impl Aggregation {
    fn absorb(&mut self, source: SourceKind, error: AgendaError) {
        warn!("Could not load {}: {}", source, error);
        self.diagnostics.push(Diagnostic { source, error });
    }

    /// Within a kind the first occurrence wins. An event whose id collides
    /// with a justificante's display id yields to the justificante.
    fn dedup_ids(&mut self) {
        let justificante_ids: HashSet<ItemId> = self
            .items
            .iter()
            .filter(|item| item.is_justificante())
            .map(|item| item.id.clone())
            .collect();
        let mut seen: HashSet<ItemId> = HashSet::new();
        let mut duplicates = Vec::new();

        self.items.retain(|item| {
            let shadowed = !item.is_justificante() && justificante_ids.contains(&item.id);
            if !shadowed && seen.insert(item.id.clone()) {
                return true;
            }
            let source = if item.is_justificante() {
                SourceKind::Justificantes
            } else {
                SourceKind::Events
            };
            duplicates.push((source, item.id.clone()));
            false
        });

        for (source, id) in duplicates {
            self.absorb(
                source,
                AgendaError::Decode(format!("Duplicate item id '{}' dropped", id)),
            );
        }
    }
}
