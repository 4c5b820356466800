//! Reqwest-backed realtime database store.
//!
//! This adapter owns transport details only: URL construction, the optional
//! `auth` query parameter, timeout and HTTP error mapping, and JSON
//! decoding. Child keys are minted locally, as the database's own clients
//! do.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::{Map, Value};
use zeroize::Zeroizing;

use crate::domain::ports::{DocumentPath, DocumentStore, DocumentStoreError};
use crate::outbound::push_key::PushKeyGenerator;

/// Document store talking to a REST realtime database.
pub struct RealtimeDbStore {
    client: Client,
    base: Url,
    auth_token: Option<Zeroizing<String>>,
    keys: PushKeyGenerator,
}

impl RealtimeDbStore {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base: Url,
        timeout: Duration,
        auth_token: Option<String>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base,
            auth_token: auth_token
                .filter(|token| !token.trim().is_empty())
                .map(Zeroizing::new),
            keys: PushKeyGenerator::new(clock),
        })
    }

    fn endpoint(&self, path: &DocumentPath) -> Result<Url, DocumentStoreError> {
        endpoint_for(
            &self.base,
            path,
            self.auth_token.as_ref().map(|token| token.as_str()),
        )
    }

    async fn send(
        &self,
        method: Method,
        path: &DocumentPath,
        body: Option<&Value>,
    ) -> Result<Vec<u8>, DocumentStoreError> {
        let url = self.endpoint(path)?;
        let mut request = self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }
}

#[async_trait]
impl DocumentStore for RealtimeDbStore {
    async fn read(&self, path: &DocumentPath) -> Result<Option<Value>, DocumentStoreError> {
        let body = self.send(Method::GET, path, None).await?;
        parse_node(&body)
    }

    async fn write(&self, path: &DocumentPath, value: Value) -> Result<(), DocumentStoreError> {
        self.send(Method::PUT, path, Some(&value)).await.map(drop)
    }

    async fn merge(
        &self,
        path: &DocumentPath,
        partial: Map<String, Value>,
    ) -> Result<(), DocumentStoreError> {
        let body = Value::Object(partial);
        self.send(Method::PATCH, path, Some(&body)).await.map(drop)
    }

    async fn append_child(&self, _path: &DocumentPath) -> Result<String, DocumentStoreError> {
        Ok(self.keys.next_key())
    }
}

fn endpoint_for(
    base: &Url,
    path: &DocumentPath,
    auth_token: Option<&str>,
) -> Result<Url, DocumentStoreError> {
    let mut url = base.clone();
    {
        let mut segments = url.path_segments_mut().map_err(|()| {
            DocumentStoreError::connection(format!("database URL {base} cannot carry a path"))
        })?;
        segments.pop_if_empty();
        let all: Vec<&str> = path.segments().collect();
        if let Some((last, parents)) = all.split_last() {
            segments.extend(parents);
            segments.push(&format!("{last}.json"));
        }
    }
    url.set_query(None);
    if let Some(token) = auth_token {
        url.query_pairs_mut().append_pair("auth", token);
    }
    Ok(url)
}

fn parse_node(body: &[u8]) -> Result<Option<Value>, DocumentStoreError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let value: Value = serde_json::from_slice(body).map_err(|error| {
        DocumentStoreError::serialization(format!("invalid database JSON payload: {error}"))
    })?;
    Ok((!value.is_null()).then_some(value))
}

fn map_transport_error(error: reqwest::Error) -> DocumentStoreError {
    DocumentStoreError::connection(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> DocumentStoreError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            DocumentStoreError::connection(message)
        }
        _ if status.is_client_error() => DocumentStoreError::rejected(message),
        _ => DocumentStoreError::connection(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
