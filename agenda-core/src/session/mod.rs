//! Session store: the login token and user profile, and the role queries
//! derived from them.
//!
//! Nothing is cached. Every query re-reads [`SessionStorage`], so a login or
//! logout performed by another process shows up on the next call. Observers
//! registered with [`SessionStore::on_change`] hear about changes made
//! through this store immediately, and about external ones when
//! [`SessionStore::refresh`] is called.

mod storage;
mod user;

pub use storage::{FileStorage, MemoryStorage, SessionStorage};
pub use user::{User, UserId};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::error::{AgendaError, AgendaResult};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// Role that unlocks viewing and submitting justificantes.
pub const EMPLOYEE_ROLE: &str = "empleado";

/// A point-in-time read of the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.user.as_ref().is_some_and(|u| u.has_role(role))
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user.as_ref().and_then(User::resolved_id)
    }

    pub fn state(&self) -> SessionState {
        if !self.is_authenticated() {
            SessionState::Anonymous
        } else if self.has_role(EMPLOYEE_ROLE) {
            SessionState::AuthenticatedEmployee
        } else {
            SessionState::AuthenticatedNonEmployee
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    AuthenticatedNonEmployee,
    AuthenticatedEmployee,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, SessionState::Anonymous)
    }

    /// Only employees may view and submit justificantes.
    pub fn is_employee(&self) -> bool {
        matches!(self, SessionState::AuthenticatedEmployee)
    }
}

/// Delivered to observers whenever the observed session changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionChange {
    pub previous: SessionState,
    pub current: SessionState,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Arc<dyn Fn(&SessionChange) + Send + Sync>;

pub struct SessionStore<S> {
    storage: S,
    /// Last session this store told observers about
    observed: Mutex<Session>,
    generation: AtomicU64,
    observers: Mutex<Vec<(SubscriptionId, Observer)>>,
    next_subscription: AtomicU64,
}

impl<S: SessionStorage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        let store = SessionStore {
            storage,
            observed: Mutex::new(Session::default()),
            generation: AtomicU64::new(0),
            observers: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(0),
        };
        *store.lock_observed() = store.snapshot();
        store
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The bearer token, if one is stored and non-empty.
    pub fn token(&self) -> Option<String> {
        match self.storage.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.trim().is_empty()),
            Err(e) => {
                warn!("Could not read session token: {}", e);
                None
            }
        }
    }

    /// The stored user profile. Unreadable or unparseable values read as no user.
    pub fn user(&self) -> Option<User> {
        let raw = match self.storage.get(USER_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Could not read session user: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("Could not parse session user: {}", e);
                None
            }
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user().and_then(|u| u.resolved_id().cloned())
    }

    pub fn roles(&self) -> Vec<String> {
        self.user().map(|u| u.roles().to_vec()).unwrap_or_default()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.user().is_some_and(|u| u.has_role(role))
    }

    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        self.user()
            .is_some_and(|u| roles.iter().any(|role| u.has_role(role)))
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn snapshot(&self) -> Session {
        Session {
            token: self.token(),
            user: self.user(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.snapshot().state()
    }

    /// Counts observed session changes. A response issued under one
    /// generation is stale once this moves on.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Persist a new token and user together. If the write fails part way,
    /// both keys are cleared so a token is never left paired with another
    /// user's profile.
    pub fn login(&self, token: &str, user: Option<&User>) -> AgendaResult<()> {
        let json = user
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| AgendaError::Storage(format!("Failed to serialize user: {e}")))?;

        if let Err(e) = self
            .storage
            .set_all(&[(TOKEN_KEY, Some(token)), (USER_KEY, json.as_deref())])
        {
            warn!("Could not store session, clearing it: {}", e);
            if let Err(cleanup) = self.storage.remove_all(&[TOKEN_KEY, USER_KEY]) {
                warn!("Could not clear partial session: {}", cleanup);
            }
            self.refresh();
            return Err(e);
        }

        debug!("Session stored");
        self.refresh();
        Ok(())
    }

    /// Clear token and user together.
    pub fn logout(&self) -> AgendaResult<()> {
        self.storage.remove_all(&[TOKEN_KEY, USER_KEY])?;

        debug!("Session cleared");
        self.refresh();
        Ok(())
    }

    /// Re-read storage and notify observers if the session differs from the
    /// last one observed. Returns whether it changed.
    pub fn refresh(&self) -> bool {
        let current = self.snapshot();

        let change = {
            let mut observed = self.lock_observed();
            if *observed == current {
                return false;
            }
            let previous = observed.state();
            *observed = current;
            SessionChange {
                previous,
                current: observed.state(),
                generation: self.generation.fetch_add(1, Ordering::SeqCst) + 1,
            }
        };

        let observers: Vec<Observer> = self
            .lock_observers()
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();

        for observer in observers {
            observer(&change);
        }

        true
    }

    pub fn on_change<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&SessionChange) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::SeqCst));
        self.lock_observers().push((id, Arc::new(callback)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.lock_observers().retain(|(sub, _)| *sub != id);
    }

    fn lock_observed(&self) -> std::sync::MutexGuard<'_, Session> {
        self.observed.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_observers(&self) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, Observer)>> {
        self.observers.lock().unwrap_or_else(|e| e.into_inner())
    }
}
