//! Shared HTTP transport for the backend API clients.
//!
//! Every response body is a `{ "data": ... }` envelope. Failures are mapped
//! to `TransportError` kinds and never retried.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};
use uuid::Uuid;
use validator::Validate;

use crate::config::AppConfig;
use crate::domain::{ApiEnvelope, AppError, ConfigError, TransportError, ValidationError};
use crate::infra::storage::SecureStorage;

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    storage: Option<Arc<SecureStorage>>,
}

impl HttpTransport {
    /// Build a transport rooted at `base_url` with a per-request `timeout`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            AppError::Config(ConfigError::Invalid {
                name: "http_client".to_string(),
                message: e.to_string(),
            })
        })?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            storage: None,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(config.api_base_url.clone(), config.api_timeout)
    }

    /// Sign requests with the session token held in `storage`
    #[must_use]
    pub fn with_storage(mut self, storage: Arc<SecureStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<F>(&self, method: Method, path: &str, build: F) -> Result<Response, AppError>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let url = self.url(path);
        let request_id = Uuid::new_v4().to_string();
        debug!(method = %method, url = %url, request_id = %request_id, "Sending backend request");

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(REQUEST_ID_HEADER, &request_id);
        if let Some(storage) = &self.storage {
            // An unreadable token means an unauthenticated request
            if let Some(token) = storage.session_token().await {
                request = request.bearer_auth(token.expose_secret());
            }
        }

        let response = build(request).send().await.map_err(|e| {
            error!(method = %method, url = %url, request_id = %request_id, error = %e, "Backend request failed");
            map_reqwest_error(&e)
        })?;
        debug!(status = %response.status(), request_id = %request_id, "Backend responded");
        Ok(response)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let response = self.send(Method::GET, path, |r| r).await?;
        decode(response).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, AppError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self.send(Method::GET, path, |r| r.query(query)).await?;
        decode(response).await
    }

    /// Like `get`, but a `404` yields `None`
    pub async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, AppError> {
        let response = self.send(Method::GET, path, |r| r).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(path = %path, "Resource not found");
            return Ok(None);
        }
        decode(response).await.map(Some)
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, AppError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.send(Method::POST, path, |r| r.json(body)).await?;
        decode(response).await
    }

    /// POST without a request body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let response = self.send(Method::POST, path, |r| r).await?;
        decode(response).await
    }

    /// POST whose response body is ignored on success
    pub async fn post_discard<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), AppError> {
        let response = self.send(Method::POST, path, |r| r.json(body)).await?;
        ensure_success(response).await.map(|_| ())
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, AppError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.send(Method::PUT, path, |r| r.json(body)).await?;
        decode(response).await
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.storage.is_some())
            .finish_non_exhaustive()
    }
}

fn map_reqwest_error(e: &reqwest::Error) -> AppError {
    let kind = if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else if e.is_decode() {
        TransportError::Decode(e.to_string())
    } else {
        TransportError::Network(e.to_string())
    };
    AppError::Transport(kind)
}

/// Pass 2xx responses through; anything else becomes `Http`
async fn ensure_success(response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);
    warn!(status = %status, message = %message, "Backend returned error status");
    Err(AppError::Transport(TransportError::Http {
        status_code: status.as_u16(),
        message,
    }))
}

/// Prefer a `message` or `error` field of a JSON error body over the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error"]
                .iter()
                .find_map(|field| value.get(field)?.as_str().map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let response = ensure_success(response).await?;
    let bytes = response.bytes().await.map_err(|e| map_reqwest_error(&e))?;
    let envelope: ApiEnvelope<T> = serde_json::from_slice(&bytes).map_err(|e| {
        error!(error = %e, "Failed to decode backend response");
        AppError::Transport(TransportError::Decode(e.to_string()))
    })?;
    Ok(envelope.into_inner())
}

/// Build a request path from `segments`, percent-encoding each one.
///
/// `/`, `?`, `#` and `%` inside a segment never change the route. Empty and
/// dot segments are rejected.
pub(crate) fn path(segments: &[&str]) -> Result<String, AppError> {
    let invalid = |message: String| {
        AppError::Validation(ValidationError::InvalidField {
            field: "id".to_string(),
            message,
        })
    };
    if let Some(bad) = segments
        .iter()
        .find(|s| s.trim().is_empty() || matches!(**s, "." | ".."))
    {
        return Err(invalid(format!("'{}' is not a valid path segment", bad)));
    }

    let mut url = Url::parse("http://localhost/").map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| invalid("cannot build request path".to_string()))?
        .clear()
        .extend(segments);
    Ok(url.path().to_string())
}

/// Reject a decoded model that violates its schema rules
pub(crate) fn validated<T: Validate>(value: T) -> Result<T, AppError> {
    value.validate().map_err(|e| {
        error!(error = %e, "Backend response failed validation");
        AppError::Transport(TransportError::Decode(e.to_string()))
    })?;
    Ok(value)
}

pub(crate) fn validated_all<T: Validate>(values: Vec<T>) -> Result<Vec<T>, AppError> {
    values.into_iter().map(validated).collect()
}
