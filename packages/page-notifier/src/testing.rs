//! Mock implementations for testing.
//!
//! Both mocks record their calls behind `Arc<Mutex<_>>` so a clone handed to
//! the runner can be inspected afterwards.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{ExtractionError, NotificationError};
use crate::extractors::PostExtractor;
use crate::notifier::PostNotifier;
use crate::post::Post;

/// Extractor returning canned posts, or failing.
#[derive(Clone, Default)]
pub struct MockExtractor {
    posts: Arc<Mutex<Vec<Post>>>,
    fail: Arc<Mutex<bool>>,
    calls: Arc<Mutex<usize>>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extractor that returns `posts` in the given order.
    pub fn with_posts(posts: Vec<Post>) -> Self {
        let mock = Self::new();
        *mock.posts.lock().unwrap() = posts;
        mock
    }

    /// Extractor whose every call fails as if the source were unreachable.
    pub fn failing() -> Self {
        let mock = Self::new();
        *mock.fail.lock().unwrap() = true;
        mock
    }

    pub fn set_posts(&self, posts: Vec<Post>) {
        *self.posts.lock().unwrap() = posts;
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl PostExtractor for MockExtractor {
    async fn extract(&self) -> Result<Vec<Post>, ExtractionError> {
        *self.calls.lock().unwrap() += 1;

        if *self.fail.lock().unwrap() {
            return Err(ExtractionError::Status {
                url: "mock://source".to_string(),
                status: 503,
            });
        }

        let posts = self.posts.lock().unwrap().clone();
        if posts.is_empty() {
            return Err(ExtractionError::Empty {
                source_name: "mock://source".to_string(),
            });
        }
        Ok(posts)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Notifier that records every post it is asked to send.
#[derive(Clone, Default)]
pub struct MockNotifier {
    sent: Arc<Mutex<Vec<Post>>>,
    attempts: Arc<Mutex<Vec<String>>>,
    failing_ids: Arc<Mutex<HashSet<String>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sends for this post id fail.
    pub fn fail_for(self, id: &str) -> Self {
        self.failing_ids.lock().unwrap().insert(id.to_string());
        self
    }

    /// Posts that were delivered, in send order.
    pub fn sent(&self) -> Vec<Post> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_ids(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|p| p.id.clone()).collect()
    }

    /// Every id a send was attempted for, including failures.
    pub fn attempted_ids(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn was_sent(&self, id: &str) -> bool {
        self.sent.lock().unwrap().iter().any(|p| p.id == id)
    }
}

#[async_trait]
impl PostNotifier for MockNotifier {
    async fn notify(&self, post: &Post) -> Result<(), NotificationError> {
        self.attempts.lock().unwrap().push(post.id.clone());

        if self.failing_ids.lock().unwrap().contains(&post.id) {
            return Err(NotificationError::Rejected(format!(
                "mock failure for {}",
                post.id
            )));
        }

        self.sent.lock().unwrap().push(post.clone());
        Ok(())
    }
}
