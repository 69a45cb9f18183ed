use std::path::{Path, PathBuf};

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;
use crate::novelty::{FirstRunPolicy, PostOrder};

pub const DEFAULT_NTFY_SERVER: &str = ntfy::DEFAULT_SERVER;
pub const DEFAULT_SEEN_POSTS_FILE: &str = "./seen_posts.json";
pub const DEFAULT_MAX_POSTS: usize = 10;
/// The Apify actor will not return more than this per run without paging.
pub const MAX_POSTS_LIMIT: usize = 50;

/// Where posts come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// RSS/Atom mirror of the page
    Feed { url: String },
    /// The page itself, rendered by Apify's headless browser
    Facebook { page_url: String, apify_token: String },
}

impl Source {
    pub fn describe(&self) -> &str {
        match self {
            Source::Feed { url } => url,
            Source::Facebook { page_url, .. } => page_url,
        }
    }
}

/// Validated application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub source: Source,
    pub ntfy_topic: String,
    pub ntfy_server: String,
    pub ntfy_token: Option<String>,
    pub seen_posts_file: PathBuf,
    pub title_prefix: Option<String>,
    pub tags: Vec<String>,
    pub max_posts: usize,
    pub first_run: FirstRunPolicy,
    pub post_order: PostOrder,
}

/// The document as written on disk. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    rss_url: Option<String>,
    facebook_page: Option<String>,
    ntfy_topic: Option<String>,
    ntfy_server: Option<String>,
    ntfy_token: Option<String>,
    seen_posts_file: Option<PathBuf>,
    apify_token: Option<String>,
    title_prefix: Option<String>,
    tags: Option<Vec<String>>,
    max_posts: Option<usize>,
    first_run: Option<FirstRunPolicy>,
    post_order: Option<PostOrder>,
}

impl Config {
    /// Load configuration from a JSON file, with secrets falling back to the
    /// environment (`APIFY_API_TOKEN`, `NTFY_TOKEN`).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();

        let data = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        Self::from_json_with_env(&data, |key| std::env::var(key).ok())
    }

    /// Parse a configuration document without consulting the environment.
    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        Self::from_json_with_env(data, |_| None)
    }

    pub fn from_json_with_env<F>(data: &str, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw: RawConfig = serde_json::from_str(data)?;
        Self::from_raw(raw, env)
    }

    fn from_raw<F>(raw: RawConfig, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source = match (non_empty(raw.rss_url), non_empty(raw.facebook_page)) {
            (Some(url), None) => {
                validate_http_url("rss_url", &url)?;
                Source::Feed { url }
            }
            (None, Some(page)) => {
                let apify_token = non_empty(raw.apify_token)
                    .or_else(|| non_empty(env("APIFY_API_TOKEN")))
                    .ok_or(ConfigError::Missing("apify_token"))?;
                Source::Facebook {
                    page_url: facebook_page_url(&page)?,
                    apify_token,
                }
            }
            (Some(_), Some(_)) => {
                return Err(ConfigError::Invalid {
                    key: "rss_url",
                    reason: "set either rss_url or facebook_page, not both".into(),
                })
            }
            (None, None) => return Err(ConfigError::Missing("rss_url")),
        };

        let ntfy_topic = non_empty(raw.ntfy_topic).ok_or(ConfigError::Missing("ntfy_topic"))?;
        if ntfy_topic.contains('/') || ntfy_topic.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid {
                key: "ntfy_topic",
                reason: format!("'{}' is not a single path segment", ntfy_topic),
            });
        }

        let ntfy_server = non_empty(raw.ntfy_server)
            .unwrap_or_else(|| DEFAULT_NTFY_SERVER.to_string())
            .trim_end_matches('/')
            .to_string();
        validate_http_url("ntfy_server", &ntfy_server)?;

        let max_posts = raw.max_posts.unwrap_or(DEFAULT_MAX_POSTS);
        if !(1..=MAX_POSTS_LIMIT).contains(&max_posts) {
            return Err(ConfigError::Invalid {
                key: "max_posts",
                reason: format!("{} is outside 1..={}", max_posts, MAX_POSTS_LIMIT),
            });
        }

        let tags = raw
            .tags
            .unwrap_or_else(|| vec!["facebook".to_string()])
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        Ok(Self {
            source,
            ntfy_topic,
            ntfy_server,
            ntfy_token: non_empty(raw.ntfy_token).or_else(|| non_empty(env("NTFY_TOKEN"))),
            seen_posts_file: raw
                .seen_posts_file
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SEEN_POSTS_FILE)),
            title_prefix: non_empty(raw.title_prefix),
            tags,
            max_posts,
            first_run: raw.first_run.unwrap_or_default(),
            post_order: raw.post_order.unwrap_or_default(),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_http_url(key: &'static str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::Invalid {
        key,
        reason: format!("'{}': {}", value, e),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Invalid {
            key,
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

/// Accept a bare page name (`newarkparkrun`) or a full page URL.
fn facebook_page_url(page: &str) -> Result<String, ConfigError> {
    if page.starts_with("http://") || page.starts_with("https://") {
        validate_http_url("facebook_page", page)?;
        return Ok(page.to_string());
    }

    let name = page.trim_matches('/');
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(ConfigError::Invalid {
            key: "facebook_page",
            reason: format!("'{}' is not a page name or URL", page),
        });
    }
    Ok(format!("https://www.facebook.com/{}", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_feed_config_gets_defaults() {
        let config = Config::from_json(
            r#"{"rss_url": "https://rss.app/feeds/abc.xml", "ntfy_topic": "parkrun"}"#,
        )
        .unwrap();

        assert_eq!(
            config.source,
            Source::Feed {
                url: "https://rss.app/feeds/abc.xml".into()
            }
        );
        assert_eq!(config.ntfy_server, "https://ntfy.sh");
        assert_eq!(config.seen_posts_file, PathBuf::from("./seen_posts.json"));
        assert_eq!(config.max_posts, 10);
        assert_eq!(config.tags, vec!["facebook"]);
        assert_eq!(config.first_run, FirstRunPolicy::Seed);
        assert_eq!(config.post_order, PostOrder::NewestFirst);
        assert!(config.ntfy_token.is_none());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let config = Config::from_json(
            r#"{"rss_url": "https://example.org/feed", "ntfy_topic": "t", "schedule": "*/15 * * * *"}"#,
        );
        assert!(config.is_ok());
    }

    #[test]
    fn missing_topic_fails() {
        let err = Config::from_json(r#"{"rss_url": "https://example.org/feed"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("ntfy_topic")));
    }

    #[test]
    fn missing_source_fails() {
        let err = Config::from_json(r#"{"ntfy_topic": "t"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("rss_url")));
    }

    #[test]
    fn both_sources_is_rejected() {
        let err = Config::from_json(
            r#"{"rss_url": "https://example.org/feed", "facebook_page": "page", "apify_token": "x", "ntfy_topic": "t"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "rss_url", .. }));
    }

    #[test]
    fn facebook_page_name_expands_and_reads_token_from_env() {
        let config = Config::from_json_with_env(
            r#"{"facebook_page": "newarkparkrun", "ntfy_topic": "t"}"#,
            |key| (key == "APIFY_API_TOKEN").then(|| "apify_api_123".to_string()),
        )
        .unwrap();

        assert_eq!(
            config.source,
            Source::Facebook {
                page_url: "https://www.facebook.com/newarkparkrun".into(),
                apify_token: "apify_api_123".into(),
            }
        );
    }

    #[test]
    fn facebook_page_without_token_fails() {
        let err = Config::from_json(r#"{"facebook_page": "page", "ntfy_topic": "t"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("apify_token")));
    }

    #[test]
    fn server_override_is_normalised() {
        let config = Config::from_json(
            r#"{"rss_url": "https://example.org/feed", "ntfy_topic": "t", "ntfy_server": "https://ntfy.example.org/"}"#,
        )
        .unwrap();
        assert_eq!(config.ntfy_server, "https://ntfy.example.org");
    }

    #[test]
    fn topic_with_slash_is_rejected() {
        let err = Config::from_json(r#"{"rss_url": "https://example.org/feed", "ntfy_topic": "a/b"}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "ntfy_topic", .. }));
    }

    #[test]
    fn non_http_feed_is_rejected() {
        let err = Config::from_json(r#"{"rss_url": "file:///etc/passwd", "ntfy_topic": "t"}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "rss_url", .. }));
    }

    #[test]
    fn max_posts_out_of_range_is_rejected() {
        let err = Config::from_json(
            r#"{"rss_url": "https://example.org/feed", "ntfy_topic": "t", "max_posts": 0}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "max_posts", .. }));
    }

    #[test]
    fn policies_parse_from_snake_case() {
        let config = Config::from_json(
            r#"{"rss_url": "https://example.org/feed", "ntfy_topic": "t",
                "first_run": "notify", "post_order": "oldest_first"}"#,
        )
        .unwrap();
        assert_eq!(config.first_run, FirstRunPolicy::Notify);
        assert_eq!(config.post_order, PostOrder::OldestFirst);
    }

    #[test]
    fn missing_file_reports_hint() {
        let err = Config::load(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(err.to_string().contains("config.example.json"));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = Config::from_json("{").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
