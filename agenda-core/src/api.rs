//! HTTP client for the agenda REST API.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use url::Url;

use crate::config::AgendaConfig;
use crate::error::{AgendaError, AgendaResult};

/// Thin wrapper over `reqwest::Client` that knows the API base URL and
/// turns HTTP failures into [`AgendaError`]s.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> AgendaResult<Self> {
        // Url::join drops the last segment unless the base ends with '/'
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|e| AgendaError::Config(format!("Invalid API URL '{}': {}", base_url, e)))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgendaError::Config(e.to_string()))?;

        Ok(ApiClient { http, base_url })
    }

    pub fn from_config(config: &AgendaConfig) -> AgendaResult<Self> {
        Self::new(&config.api_url, config.timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for an API path such as `events/3`.
    pub fn url(&self, path: &str) -> AgendaResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| AgendaError::Config(format!("Invalid API path '{}': {}", path, e)))
    }

    /// Start a request, attaching the bearer token when one is given.
    pub fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> AgendaResult<RequestBuilder> {
        let url = self.url(path)?;
        debug!("{} {}", method, url);

        let builder = self
            .http
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");

        Ok(match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Send a request and fail on any non-2xx status.
    pub async fn send(&self, builder: RequestBuilder) -> AgendaResult<Response> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                AgendaError::Network(format!("Request timed out: {e}"))
            } else {
                AgendaError::Network(e.to_string())
            }
        })?;

        check_status(response).await
    }

    /// Send a request and decode its JSON body.
    pub async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> AgendaResult<T> {
        let response = self.send(builder).await?;
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| AgendaError::Decode(e.to_string()))
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> AgendaResult<T> {
        let builder = self.request(Method::GET, path, token)?;
        self.send_json(builder).await
    }
}

async fn check_status(response: Response) -> AgendaResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();

    if status == StatusCode::UNAUTHORIZED {
        return Err(AgendaError::Unauthorized(
            "Session expired. Please log in again".to_string(),
        ));
    }

    error!("Request failed: {} - {}", status, body);
    Err(AgendaError::HttpStatus {
        status: status.as_u16(),
        body,
    })
}
