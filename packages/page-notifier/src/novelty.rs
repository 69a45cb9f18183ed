//! New-post detection.
//!
//! Diffing is a pure function of the extracted posts and the seen-set; the
//! caller owns loading and saving the set.

use std::collections::HashSet;

use serde::Deserialize;

use crate::post::Post;
use crate::store::SeenSet;

/// Native order of the posts an extractor returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostOrder {
    /// Page timelines and most feeds
    #[default]
    NewestFirst,
    OldestFirst,
}

/// What to do when there is no seen-set yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstRunPolicy {
    /// Record everything currently on the page without notifying.
    #[default]
    Seed,
    /// Notify for every post on the page.
    Notify,
}

/// Posts whose id is not in `seen`, oldest first.
///
/// When every candidate carries a publication time the result is sorted by
/// it; otherwise `order` decides whether the input has to be reversed.
/// Duplicate ids in `posts` are reported once.
pub fn novelty<'a>(posts: &'a [Post], seen: &SeenSet, order: PostOrder) -> Vec<&'a Post> {
    let mut emitted = HashSet::new();
    let mut fresh: Vec<&Post> = Vec::new();
    for post in posts {
        if !seen.contains(&post.id) && emitted.insert(post.id.as_str()) {
            fresh.push(post);
        }
    }

    if order == PostOrder::NewestFirst {
        fresh.reverse();
    }
    if fresh.iter().all(|p| p.published_at.is_some()) {
        fresh.sort_by_key(|p| p.published_at);
    }
    fresh
}

/// Outcome of applying the first-run policy to a diff.
#[derive(Debug, PartialEq)]
pub struct Selection<'a> {
    pub to_notify: Vec<&'a Post>,
    /// Posts that are new but will only be recorded
    pub suppressed: usize,
    pub first_run: bool,
}

/// Decide which posts to notify for.
pub fn select<'a>(
    posts: &'a [Post],
    seen: &SeenSet,
    order: PostOrder,
    policy: FirstRunPolicy,
) -> Selection<'a> {
    let fresh = novelty(posts, seen, order);
    let first_run = seen.is_empty();

    if first_run && policy == FirstRunPolicy::Seed {
        return Selection {
            suppressed: fresh.len(),
            to_notify: Vec::new(),
            first_run,
        };
    }

    Selection {
        to_notify: fresh,
        suppressed: 0,
        first_run,
    }
}
