//! RSS/Atom extractor for feeds that mirror a Facebook page.

use std::time::Duration;

use async_trait::async_trait;
use feed_rs::model::{Entry, Link, Text};
use tracing::{debug, info};

use super::html::{fallback_id, first_image, html_to_text};
use super::{finalize, PostExtractor};
use crate::error::ExtractionError;
use crate::post::Post;

pub struct FeedExtractor {
    client: reqwest::Client,
    url: String,
    max_posts: usize,
}

impl FeedExtractor {
    pub fn new(url: String, max_posts: usize) -> Result<Self, ExtractionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("page-notifier/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ExtractionError::Http {
                url: url.clone(),
                source,
            })?;

        Ok(Self {
            client,
            url,
            max_posts,
        })
    }

    async fn fetch(&self) -> Result<Vec<u8>, ExtractionError> {
        let http_err = |source| ExtractionError::Http {
            url: self.url.clone(),
            source,
        };

        let response = self.client.get(&self.url).send().await.map_err(http_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(http_err)?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl PostExtractor for FeedExtractor {
    async fn extract(&self) -> Result<Vec<Post>, ExtractionError> {
        info!(url = %self.url, "Fetching feed");

        let body = self.fetch().await?;
        let posts = parse_feed(&body)?;
        let total = posts.len();
        let posts = finalize(posts, self.max_posts, &self.url)?;

        info!(url = %self.url, total, kept = posts.len(), "Feed parsed");
        Ok(posts)
    }

    fn name(&self) -> &str {
        "feed"
    }
}

/// Parse a feed document into posts, in feed order.
pub fn parse_feed(body: &[u8]) -> Result<Vec<Post>, ExtractionError> {
    let parser = feed_rs::parser::Builder::new()
        .id_generator(|links: &[Link], title: &Option<Text>, _uri: Option<&str>| {
            let link = links.first().map(|l| l.href.as_str()).unwrap_or("");
            let title = title.as_ref().map(|t| t.content.as_str()).unwrap_or("");
            fallback_id(link, title)
        })
        .build();

    let feed = parser.parse(body)?;
    debug!(entries = feed.entries.len(), "Feed document decoded");

    Ok(feed.entries.iter().map(entry_to_post).collect())
}

fn entry_to_post(entry: &Entry) -> Post {
    let link = entry
        .links
        .first()
        .map(|l| l.href.clone())
        .unwrap_or_default();

    // RSS <description> lands in `summary`
    let html = entry
        .content
        .as_ref()
        .and_then(|c| c.body.as_deref())
        .or_else(|| entry.summary.as_ref().map(|s| s.content.as_str()))
        .unwrap_or("");

    let image = first_image(html).or_else(|| {
        entry
            .media
            .iter()
            .flat_map(|m| m.thumbnails.iter())
            .map(|t| t.image.uri.clone())
            .find(|uri| !uri.starts_with("data:"))
    });

    let mut post = Post::new(entry.id.clone(), link).with_text(html_to_text(html));
    if let Some(title) = entry.title.as_ref().map(|t| t.content.trim()).filter(|t| !t.is_empty()) {
        post = post.with_title(title);
    }
    if let Some(image) = image {
        post = post.with_image(image);
    }
    if let Some(at) = entry.published.or(entry.updated) {
        post = post.with_published_at(at);
    }
    post
}
