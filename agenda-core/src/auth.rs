//! Login against `POST /login` and hand-off to the session store.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::ApiClient;
use crate::error::{AgendaError, AgendaResult};
use crate::session::{SessionState, SessionStorage, SessionStore, User};

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn validate(&self) -> AgendaResult<()> {
        if self.email.trim().is_empty() {
            return Err(AgendaError::Validation("Please enter your user".to_string()));
        }
        if self.password.is_empty() {
            return Err(AgendaError::Validation("Please enter your password".to_string()));
        }
        Ok(())
    }
}

/// The login endpoint returns either a user object or bare roles.
#[derive(Debug, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub roles: Option<Vec<String>>,
}

impl LoginResponse {
    /// The profile to persist. Without a user or roles nothing is stored,
    /// and the session grants no roles.
    pub fn profile(&self) -> Option<User> {
        match (&self.user, &self.roles) {
            (Some(user), _) => Some(user.clone()),
            (None, Some(roles)) => Some(User::with_roles(roles.clone())),
            (None, None) => None,
        }
    }
}

pub async fn login<S: SessionStorage>(
    api: &ApiClient,
    session: &SessionStore<S>,
    credentials: &Credentials,
) -> AgendaResult<SessionState> {
    credentials.validate()?;

    let builder = api
        .request(Method::POST, "login", None)?
        .json(credentials);
    let response: LoginResponse = match api.send_json(builder).await {
        Ok(response) => response,
        Err(AgendaError::Unauthorized(_) | AgendaError::HttpStatus { status: 422, .. }) => {
            return Err(AgendaError::Unauthorized("Incorrect credentials".to_string()));
        }
        Err(e) => return Err(e),
    };

    let Some(token) = response.token.as_deref().filter(|t| !t.is_empty()) else {
        return Err(AgendaError::Unauthorized("Incorrect credentials".to_string()));
    };

    session.login(token, response.profile().as_ref())?;

    let state = session.state();
    info!("Logged in as {} ({:?})", credentials.email, state);
    Ok(state)
}

pub fn logout<S: SessionStorage>(session: &SessionStore<S>) -> AgendaResult<()> {
    session.logout()?;
    info!("Logged out");
    Ok(())
}
