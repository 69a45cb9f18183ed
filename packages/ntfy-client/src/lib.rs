//! Minimal client for publishing to an ntfy server.
//!
//! Messages are sent the way the ntfy docs describe for plain HTTP publishing:
//! `POST {server}/{topic}` with the body as the message and the metadata in
//! `Title`, `Tags`, `Click`, `Attach` and `Priority` headers.

use std::time::Duration;

pub mod models;

use base64::Engine;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use thiserror::Error;

pub use models::{
    truncate_bytes, truncate_chars, ErrorResponse, Message, PublishResponse, MESSAGE_LIMIT,
    TITLE_LIMIT,
};

pub const DEFAULT_SERVER: &str = "https://ntfy.sh";

#[derive(Debug, Error)]
pub enum NtfyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ntfy returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid value for header {header}")]
    InvalidHeader { header: &'static str },
}

#[derive(Debug, Clone)]
pub struct NtfyOptions {
    pub server: String,
    pub topic: String,
    /// Access token for protected topics
    pub token: Option<String>,
    pub timeout: Duration,
}

impl NtfyOptions {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            topic: topic.into(),
            token: None,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn topic_url(&self) -> String {
        format!("{}/{}", self.server.trim_end_matches('/'), self.topic)
    }
}

#[derive(Debug, Clone)]
pub struct NtfyService {
    client: reqwest::Client,
    options: NtfyOptions,
}

impl NtfyService {
    pub fn new(options: NtfyOptions) -> Result<Self, NtfyError> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()?;
        Ok(Self { client, options })
    }

    pub fn options(&self) -> &NtfyOptions {
        &self.options
    }

    /// Publish one message to the configured topic.
    pub async fn publish(&self, message: &Message) -> Result<PublishResponse, NtfyError> {
        let url = self.options.topic_url();
        let headers = self.headers_for(message)?;
        let body = truncate_bytes(&message.body, MESSAGE_LIMIT).to_string();

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&raw)
                .map(|e| e.error)
                .unwrap_or(raw);
            tracing::error!(status = %status, topic = %self.options.topic, "ntfy publish failed");
            return Err(NtfyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let published: PublishResponse = response.json().await?;
        tracing::debug!(id = %published.id, topic = %published.topic, "ntfy message published");
        Ok(published)
    }

    fn headers_for(&self, message: &Message) -> Result<HeaderMap, NtfyError> {
        let mut headers = HeaderMap::new();

        if let Some(token) = &self.options.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| NtfyError::InvalidHeader { header: "Authorization" })?;
            headers.insert(AUTHORIZATION, value);
        }
        if let Some(title) = &message.title {
            let title = truncate_chars(title, TITLE_LIMIT);
            insert(&mut headers, "title", &encode_header(title))?;
        }
        if !message.tags.is_empty() {
            insert(&mut headers, "tags", &encode_header(&message.tags.join(",")))?;
        }
        if let Some(click) = &message.click {
            insert(&mut headers, "click", click)?;
        }
        if let Some(attach) = &message.attach {
            insert(&mut headers, "attach", attach)?;
        }
        if let Some(priority) = message.priority {
            insert(&mut headers, "priority", &priority.to_string())?;
        }

        Ok(headers)
    }
}

fn insert(headers: &mut HeaderMap, name: &'static str, value: &str) -> Result<(), NtfyError> {
    let value = HeaderValue::from_str(value).map_err(|_| NtfyError::InvalidHeader { header: name })?;
    headers.insert(HeaderName::from_static(name), value);
    Ok(())
}

/// HTTP headers are ASCII; ntfy accepts RFC 2047 encoded words for anything else.
fn encode_header(value: &str) -> String {
    if value.chars().all(|c| c.is_ascii() && !c.is_ascii_control()) {
        return value.to_string();
    }
    let encoded = base64::engine::general_purpose::STANDARD.encode(value.as_bytes());
    format!("=?UTF-8?B?{}?=", encoded)
}
