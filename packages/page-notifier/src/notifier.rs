//! Push notification dispatch.
//!
//! One notification per post, sent one after another. A failed send is
//! logged and counted; it never stops the remaining posts from going out.

use async_trait::async_trait;
use ntfy::{truncate_chars, Message, NtfyOptions, NtfyService};
use tracing::{error, info};

use crate::config::Config;
use crate::error::NotificationError;
use crate::post::Post;

/// Longest headline taken from a post before the prefix is added.
pub const HEADLINE_LIMIT: usize = 50;
/// Longest body before it is cut and marked with an ellipsis.
pub const BODY_LIMIT: usize = 500;

#[async_trait]
pub trait PostNotifier: Send + Sync {
    async fn notify(&self, post: &Post) -> Result<(), NotificationError>;
}

/// How a post is rendered into a push message.
#[derive(Debug, Clone, Default)]
pub struct MessageFormat {
    pub title_prefix: Option<String>,
    pub tags: Vec<String>,
}

impl MessageFormat {
    pub fn from_config(config: &Config) -> Self {
        Self {
            title_prefix: config.title_prefix.clone(),
            tags: config.tags.clone(),
        }
    }

    pub fn title(&self, post: &Post) -> String {
        let headline = truncate_chars(post.headline().unwrap_or("New Post"), HEADLINE_LIMIT);
        let title = match &self.title_prefix {
            Some(prefix) => format!("{}: {}", prefix, headline),
            None => headline.to_string(),
        };
        truncate_chars(&title, ntfy::TITLE_LIMIT).to_string()
    }

    pub fn body(&self, post: &Post) -> String {
        let text = post.text.trim();
        if text.is_empty() {
            return if post.link.is_empty() {
                "New post".to_string()
            } else {
                post.link.clone()
            };
        }

        let cut = truncate_chars(text, BODY_LIMIT);
        if cut.len() < text.len() {
            format!("{}...", cut)
        } else {
            cut.to_string()
        }
    }

    pub fn render(&self, post: &Post) -> Message {
        let mut message = Message::new(self.body(post))
            .with_title(self.title(post))
            .with_tags(self.tags.iter().cloned());
        if !post.link.is_empty() {
            message = message.with_click(post.link.clone());
        }
        if let Some(image) = &post.image_url {
            message = message.with_attach(image.clone());
        }
        message
    }
}

/// Sends posts to an ntfy topic.
pub struct NtfyNotifier {
    service: NtfyService,
    format: MessageFormat,
}

impl NtfyNotifier {
    pub fn new(service: NtfyService, format: MessageFormat) -> Self {
        Self { service, format }
    }

    pub fn from_config(config: &Config) -> Result<Self, NotificationError> {
        let mut options = NtfyOptions::new(config.ntfy_topic.clone());
        options.server = config.ntfy_server.clone();
        options.token = config.ntfy_token.clone();

        let service = NtfyService::new(options)?;
        Ok(Self::new(service, MessageFormat::from_config(config)))
    }
}

#[async_trait]
impl PostNotifier for NtfyNotifier {
    async fn notify(&self, post: &Post) -> Result<(), NotificationError> {
        let message = self.format.render(post);
        let published = self.service.publish(&message).await?;
        info!(
            post_id = %post.id,
            ntfy_id = %published.id,
            title = message.title.as_deref().unwrap_or_default(),
            "Notification sent"
        );
        Ok(())
    }
}

/// Per-batch delivery tally.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: Vec<String>,
    /// (post id, error message)
    pub failed: Vec<(String, String)>,
}

impl DispatchReport {
    pub fn attempted(&self) -> usize {
        self.sent.len() + self.failed.len()
    }
}

/// Notify for each post in order, isolating failures.
pub async fn dispatch(notifier: &dyn PostNotifier, posts: &[&Post]) -> DispatchReport {
    let mut report = DispatchReport::default();

    for post in posts {
        match notifier.notify(post).await {
            Ok(()) => report.sent.push(post.id.clone()),
            Err(e) => {
                error!(post_id = %post.id, error = %e, "Failed to send notification");
                report.failed.push((post.id.clone(), e.to_string()));
            }
        }
    }

    report
}
