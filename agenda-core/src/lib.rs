//! Core library for agenda.
//!
//! - `session`: the persisted login token and user profile, role queries
//! - `source`: event and justificante adapters over the REST API
//! - `aggregator`: merges both sources into one calendar, best effort
//! - `dashboard` / `auth`: event CRUD and login
//!
//! ```rust,ignore
//! use agenda_core::{AgendaConfig, ApiClient, CalendarAggregator, FileStorage, SessionStore};
//! use agenda_core::source::{HttpEventSource, HttpJustificanteSource};
//!
//! let config = AgendaConfig::load()?;
//! let api = ApiClient::from_config(&config)?;
//! let session = SessionStore::new(FileStorage::new(config.session_path()));
//! let aggregator = CalendarAggregator::new(
//!     HttpEventSource::new(api.clone()),
//!     HttpJustificanteSource::new(api),
//!     session,
//! );
//! for item in aggregator.load().await {
//!     println!("{} {} ({})", item.start, item.title, item.color().hex());
//! }
//! ```

pub mod aggregator;
pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod date;
pub mod error;
pub mod item;
pub mod session;
pub mod source;

pub use aggregator::{Aggregation, CalendarAggregator, Diagnostic, SourceKind};
pub use api::ApiClient;
pub use config::AgendaConfig;
pub use error::{AgendaError, AgendaResult};
pub use item::{CalendarItem, ColorTag, ItemId, ItemKind, JustificanteStatus};
pub use session::{FileStorage, MemoryStorage, Session, SessionState, SessionStore};
