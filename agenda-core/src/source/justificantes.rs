//! An employee's justificantes (absence excuses).

use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::date::{WIRE_DATE_FORMAT, day_span, parse_date};
use crate::error::{AgendaError, AgendaResult};
use crate::item::{CalendarItem, ItemId, ItemKind, JUSTIFICANTE_ID_PREFIX, JustificanteStatus};
use crate::session::UserId;
use crate::source::{JustificanteSource, decode_records, null_as_default};

pub const JUSTIFICANTE_TITLE: &str = "Justificante";

/// A justificante as the API stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JustificanteRecord {
    pub id: ItemId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dia_justificar: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub estatus: String,
    /// Reference to the uploaded document (path or URL), if any
    #[serde(default)]
    pub documento: Option<serde_json::Value>,
}

impl JustificanteRecord {
    pub fn has_document(&self) -> bool {
        match &self.documento {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        }
    }

    /// "Estatus: {estatus}", plus " - Con documento" when a document is attached.
    pub fn description(&self) -> String {
        let mut description = format!("Estatus: {}", self.estatus);
        if self.has_document() {
            description.push_str(" - Con documento");
        }
        description
    }

    /// Normalize into a full-day calendar item on the excused date.
    pub fn to_item(&self) -> Result<CalendarItem, String> {
        let date = parse_date(&self.dia_justificar)
            .map_err(|e| format!("justificante {}: {}", self.id, e))?;
        let (start, end) = day_span(date);

        Ok(CalendarItem {
            id: ItemId::Text(format!("{}{}", JUSTIFICANTE_ID_PREFIX, self.id)),
            title: JUSTIFICANTE_TITLE.to_string(),
            start,
            end,
            description: Some(self.description()),
            kind: ItemKind::Justificante {
                status: JustificanteStatus::parse(&self.estatus),
                source_id: self.id.clone(),
            },
        })
    }
}

pub fn normalize_justificantes(records: &[JustificanteRecord]) -> Vec<CalendarItem> {
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

/// A supporting document attached to a new justificante.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Document {
    pub async fn from_path(path: &Path) -> AgendaResult<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            AgendaError::Validation(format!("Could not read {}: {}", path.display(), e))
        })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "documento".to_string());

        Ok(Document { file_name, bytes })
    }
}

/// A justificante to submit. New ones always start out pending.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJustificante {
    pub user_id: UserId,
    pub dia_justificar: Option<NaiveDate>,
    pub documento: Option<Document>,
}

impl NewJustificante {
    /// The excused day, or a validation error if none was chosen.
    pub fn validate(&self) -> AgendaResult<NaiveDate> {
        self.dia_justificar
            .ok_or_else(|| AgendaError::Validation("Please choose the day to justify".to_string()))
    }

    fn to_form(&self) -> AgendaResult<Form> {
        let dia = self.validate()?;

        let mut form = Form::new()
            .text("user_id", self.user_id.to_string())
            .text("dia_justificar", dia.format(WIRE_DATE_FORMAT).to_string())
            .text("estatus", JustificanteStatus::Pending.as_str().to_string());

        if let Some(doc) = &self.documento {
            let part = Part::bytes(doc.bytes.clone()).file_name(doc.file_name.clone());
            form = form.part("documento", part);
        }

        Ok(form)
    }
}

pub struct HttpJustificanteSource {
    api: ApiClient,
}

impl HttpJustificanteSource {
    pub fn new(api: ApiClient) -> Self {
        HttpJustificanteSource { api }
    }
}

#[async_trait]
impl JustificanteSource for HttpJustificanteSource {
    async fn fetch_justificantes(
        &self,
        employee_id: &UserId,
        token: &str,
    ) -> AgendaResult<Vec<CalendarItem>> {
        let path = format!("empleados/{}/justificantes", employee_id);
        let values: Vec<serde_json::Value> = self.api.get_json(&path, Some(token)).await?;
        let records: Vec<JustificanteRecord> = decode_records(values, "justificante");
        let items = normalize_justificantes(&records);

        info!("Fetched {} justificantes for employee {}", items.len(), employee_id);
        Ok(items)
    }

    async fn submit_justificante(&self, token: &str, request: &NewJustificante) -> AgendaResult<()> {
        let form = request.to_form()?;

        let builder = self
            .api
            .request(Method::POST, "justificantes", Some(token))?
            .multipart(form);
        self.api.send(builder).await?;

        info!("Submitted justificante for employee {}", request.user_id);
        Ok(())
    }
}
