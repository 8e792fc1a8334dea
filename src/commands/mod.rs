pub mod calendar;
pub mod events;
pub mod justificar;
pub mod login;
pub mod logout;
pub mod show;
pub mod whoami;

use agenda_core::source::{HttpEventSource, HttpJustificanteSource};
use agenda_core::{AgendaConfig, ApiClient, CalendarAggregator, FileStorage, SessionStore};
use anyhow::Result;
use tracing::debug;

pub type Aggregator = CalendarAggregator<HttpEventSource, HttpJustificanteSource, FileStorage>;

/// Config and API client shared by every command.
pub struct Context {
    pub config: AgendaConfig,
    pub api: ApiClient,
}

impl Context {
    pub fn load() -> Result<Self> {
        let config = AgendaConfig::load()?;
        let api = ApiClient::from_config(&config)?;
        debug!("Using API at {}", api.base_url());
        Ok(Context { config, api })
    }

    pub fn session(&self) -> SessionStore<FileStorage> {
        SessionStore::new(FileStorage::new(self.config.session_path()))
    }

    pub fn aggregator(&self) -> Aggregator {
        CalendarAggregator::new(
            HttpEventSource::new(self.api.clone()),
            HttpJustificanteSource::new(self.api.clone()),
            self.session(),
        )
    }
}
