//! Post extractors.
//!
//! Each extractor turns one configured source into an ordered list of
//! [`Post`]s. Which one runs is decided by [`Config::source`].

mod apify;
mod feed;
pub mod html;

pub use apify::ApifyExtractor;
pub use feed::{parse_feed, FeedExtractor};

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Config, Source};
use crate::error::ExtractionError;
use crate::post::Post;

#[async_trait]
pub trait PostExtractor: Send + Sync {
    /// Fetch the source and return its posts in the source's native order.
    async fn extract(&self) -> Result<Vec<Post>, ExtractionError>;

    /// Label used in logs.
    fn name(&self) -> &str;
}

/// Build the extractor selected by the configuration.
pub fn from_config(config: &Config) -> Result<Box<dyn PostExtractor>, ExtractionError> {
    let extractor: Box<dyn PostExtractor> = match &config.source {
        Source::Feed { url } => Box::new(FeedExtractor::new(url.clone(), config.max_posts)?),
        Source::Facebook {
            page_url,
            apify_token,
        } => {
            let client = Arc::new(apify_client::ApifyClient::new(apify_token.clone()));
            Box::new(ApifyExtractor::new(client, page_url.clone(), config.max_posts))
        }
    };
    Ok(extractor)
}

/// Drop repeated ids, cap the list and refuse an empty result.
pub(crate) fn finalize(
    posts: Vec<Post>,
    limit: usize,
    source_name: &str,
) -> Result<Vec<Post>, ExtractionError> {
    let mut ids = HashSet::new();
    let posts: Vec<Post> = posts
        .into_iter()
        .filter(|p| ids.insert(p.id.clone()))
        .take(limit)
        .collect();

    if posts.is_empty() {
        return Err(ExtractionError::Empty {
            source_name: source_name.to_string(),
        });
    }
    Ok(posts)
}
