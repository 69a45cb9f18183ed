//! Facebook extractor — renders the page through Apify and maps the dataset to posts.

use std::sync::Arc;

use apify_client::{ApifyClient, FacebookPost};
use async_trait::async_trait;
use tracing::{info, warn};

use super::{finalize, PostExtractor};
use crate::error::ExtractionError;
use crate::post::Post;

pub struct ApifyExtractor {
    apify: Arc<ApifyClient>,
    page_url: String,
    max_posts: usize,
}

impl ApifyExtractor {
    pub fn new(apify: Arc<ApifyClient>, page_url: String, max_posts: usize) -> Self {
        Self {
            apify,
            page_url,
            max_posts,
        }
    }
}

#[async_trait]
impl PostExtractor for ApifyExtractor {
    async fn extract(&self) -> Result<Vec<Post>, ExtractionError> {
        info!(page_url = %self.page_url, limit = self.max_posts, "Scraping Facebook posts via Apify");

        let scraped = self
            .apify
            .scrape_facebook_posts(&self.page_url, self.max_posts as u32)
            .await?;

        let posts: Vec<Post> = scraped.iter().filter_map(to_post).collect();
        if posts.len() < scraped.len() {
            warn!(
                skipped = scraped.len() - posts.len(),
                "Dropped Facebook items without an id or permalink"
            );
        }

        let posts = finalize(posts, self.max_posts, &self.page_url)?;
        info!(
            page_url = %self.page_url,
            total_scraped = scraped.len(),
            kept = posts.len(),
            "Facebook extraction complete"
        );
        Ok(posts)
    }

    fn name(&self) -> &str {
        "facebook"
    }
}

/// Items without an id or a link cannot be tracked and are skipped.
pub(crate) fn to_post(item: &FacebookPost) -> Option<Post> {
    let id = item.stable_id()?;
    let link = item.permalink().unwrap_or_default();

    let mut post = Post::new(id, link).with_text(item.text.as_deref().unwrap_or("").trim());
    if let Some(image) = item.first_image() {
        post = post.with_image(image);
    }
    if let Some(at) = item.published_at() {
        post = post.with_published_at(at);
    }
    Some(post)
}
