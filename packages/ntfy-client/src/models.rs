use serde::Deserialize;

/// ntfy rejects titles longer than this (characters).
pub const TITLE_LIMIT: usize = 256;

/// Bodies above this many bytes are turned into attachments by ntfy.
pub const MESSAGE_LIMIT: usize = 4096;

/// A single message to publish to a topic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    pub body: String,
    pub title: Option<String>,
    pub tags: Vec<String>,
    /// URL opened when the notification is tapped
    pub click: Option<String>,
    /// URL of an external attachment (usually an image)
    pub attach: Option<String>,
    /// 1 (min) ..= 5 (max); server default is 3
    pub priority: Option<u8>,
}

impl Message {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_click(mut self, url: impl Into<String>) -> Self {
        self.click = Some(url.into());
        self
    }

    pub fn with_attach(mut self, url: impl Into<String>) -> Self {
        self.attach = Some(url.into());
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority.clamp(1, 5));
        self
    }
}

/// Successful publish response.
#[derive(Debug, Clone, Deserialize)]
pub struct PublishResponse {
    pub id: String,
    pub time: i64,
    pub event: String,
    pub topic: String,
}

/// Error body ntfy sends alongside 4xx/5xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub code: Option<i64>,
    pub http: Option<u16>,
    pub error: String,
}

/// Cut `s` to at most `max` characters.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Cut `s` to at most `max` bytes without splitting a character.
pub fn truncate_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
