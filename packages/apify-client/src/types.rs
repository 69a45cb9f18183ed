use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A start URL entry as the Apify actors expect it.
#[derive(Debug, Clone, Serialize)]
pub struct StartUrl {
    pub url: String,
}

/// Input for the apify/facebook-posts-scraper actor.
#[derive(Debug, Clone, Serialize)]
pub struct FacebookScraperInput {
    #[serde(rename = "startUrls")]
    pub start_urls: Vec<StartUrl>,
    #[serde(rename = "resultsLimit")]
    pub results_limit: u32,
}

/// A single Facebook post from the Apify dataset.
///
/// The actor renders the page in a headless browser, so every field other
/// than the URL may be missing on odd post types (shares, events, reels).
#[derive(Debug, Clone, Deserialize)]
pub struct FacebookPost {
    #[serde(rename = "postId")]
    pub post_id: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "facebookUrl")]
    pub facebook_url: Option<String>,
    pub text: Option<String>,
    #[serde(rename = "pageName")]
    pub page_name: Option<String>,
    pub time: Option<String>,
    /// Unix seconds
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub media: Vec<FacebookMedia>,
    pub likes: Option<i64>,
    pub comments: Option<i64>,
    pub shares: Option<i64>,
}

impl FacebookPost {
    /// Stable identifier: the actor's post id, else the permalink.
    pub fn stable_id(&self) -> Option<&str> {
        self.post_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .or_else(|| self.permalink())
    }

    /// Permalink of the post, falling back to the page URL it was found on.
    pub fn permalink(&self) -> Option<&str> {
        self.url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .or(self.facebook_url.as_deref())
    }

    /// First usable image attached to the post.
    pub fn first_image(&self) -> Option<&str> {
        self.media.iter().find_map(FacebookMedia::image_url)
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        let ts = self.timestamp?;
        Utc.timestamp_opt(ts, 0).single()
    }
}

/// One media attachment of a Facebook post.
#[derive(Debug, Clone, Deserialize)]
pub struct FacebookMedia {
    pub thumbnail: Option<String>,
    pub photo_image: Option<PhotoImage>,
}

impl FacebookMedia {
    fn image_url(&self) -> Option<&str> {
        self.photo_image
            .as_ref()
            .map(|p| p.uri.as_str())
            .or(self.thumbnail.as_deref())
            .filter(|u| !u.is_empty() && !u.starts_with("data:"))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoImage {
    pub uri: String,
}

/// Wrapper for Apify API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Apify actor run metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct RunData {
    pub id: String,
    pub status: String,
    #[serde(rename = "defaultDatasetId")]
    pub default_dataset_id: String,
    #[serde(rename = "startedAt")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "finishedAt")]
    pub finished_at: Option<DateTime<Utc>>,
}
