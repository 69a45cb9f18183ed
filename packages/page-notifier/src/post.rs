use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One post pulled from the source page.
///
/// `id` is the only identity: two posts with the same id are the same post,
/// whatever their text says.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    /// Plain text, possibly empty
    pub text: String,
    pub image_url: Option<String>,
    /// Permalink, empty when the source had none
    pub link: String,
    pub title: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn new(id: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: String::new(),
            image_url: None,
            link: link.into(),
            title: None,
            published_at: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_published_at(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = Some(at);
        self
    }

    /// Short label for logs and notification titles: the title, else the
    /// first non-blank line of text.
    pub fn headline(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .or_else(|| self.text.lines().map(str::trim).find(|l| !l.is_empty()))
    }
}
