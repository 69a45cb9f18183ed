//! End-to-end tests for a single notifier pass, using mock source and sink
//! with a real seen-set file.

use page_notifier::testing::{MockExtractor, MockNotifier};
use page_notifier::{
    run_once, FirstRunPolicy, Post, PostOrder, RunError, RunOptions, SeenSet, SeenStore,
};
use tempfile::TempDir;

fn post(id: &str) -> Post {
    Post::new(id, format!("https://www.facebook.com/newarkparkrun/posts/{}", id))
        .with_text(format!("Post {}", id))
}

fn store_with(ids: &[&str]) -> (TempDir, SeenStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = SeenStore::new(dir.path().join("seen_posts.json"));
    if !ids.is_empty() {
        let seen: SeenSet = ids.iter().copied().collect();
        store.save(&seen).unwrap();
    }
    (dir, store)
}

fn options() -> RunOptions {
    RunOptions::default()
}

#[tokio::test]
async fn first_run_seeds_without_notifying() {
    // A is newer than B
    let extractor = MockExtractor::with_posts(vec![post("A"), post("B")]);
    let notifier = MockNotifier::new();
    let (_dir, store) = store_with(&[]);

    let summary = run_once(&extractor, &notifier, &store, &options()).await.unwrap();

    assert!(notifier.attempted_ids().is_empty());
    assert_eq!(summary.seeded, 2);
    assert!(summary.saved);
    let seen = store.load().unwrap();
    assert!(seen.contains("A") && seen.contains("B"));
    assert_eq!(seen.len(), 2);
}

#[tokio::test]
async fn first_run_with_notify_policy_sends_oldest_first() {
    let extractor = MockExtractor::with_posts(vec![post("A"), post("B")]);
    let notifier = MockNotifier::new();
    let (_dir, store) = store_with(&[]);
    let options = RunOptions {
        first_run: FirstRunPolicy::Notify,
        ..options()
    };

    run_once(&extractor, &notifier, &store, &options).await.unwrap();

    assert_eq!(notifier.sent_ids(), vec!["B", "A"]);
}

#[tokio::test]
async fn only_unseen_post_is_notified() {
    let extractor = MockExtractor::with_posts(vec![post("A"), post("B")]);
    let notifier = MockNotifier::new();
    let (_dir, store) = store_with(&["A"]);

    let summary = run_once(&extractor, &notifier, &store, &options()).await.unwrap();

    assert_eq!(notifier.sent_ids(), vec!["B"]);
    assert_eq!(summary.new_posts, 1);
    let seen = store.load().unwrap();
    assert_eq!(seen, ["A", "B"].into_iter().collect::<SeenSet>());
}

#[tokio::test]
async fn nothing_new_leaves_file_untouched() {
    let extractor = MockExtractor::with_posts(vec![post("A"), post("B")]);
    let notifier = MockNotifier::new();
    let (_dir, store) = store_with(&["A", "B"]);
    let before = std::fs::read(store.path()).unwrap();
    let modified = std::fs::metadata(store.path()).unwrap().modified().unwrap();

    let summary = run_once(&extractor, &notifier, &store, &options()).await.unwrap();

    assert!(notifier.attempted_ids().is_empty());
    assert_eq!(summary.new_posts, 0);
    assert!(!summary.saved);
    assert_eq!(std::fs::read(store.path()).unwrap(), before);
    assert_eq!(std::fs::metadata(store.path()).unwrap().modified().unwrap(), modified);
}

#[tokio::test]
async fn extraction_failure_does_not_touch_seen_set() {
    let extractor = MockExtractor::failing();
    let notifier = MockNotifier::new();
    let (_dir, store) = store_with(&["A"]);
    let before = std::fs::read(store.path()).unwrap();

    let err = run_once(&extractor, &notifier, &store, &options()).await.unwrap_err();

    assert!(matches!(err, RunError::Extraction(_)));
    assert!(notifier.attempted_ids().is_empty());
    assert_eq!(std::fs::read(store.path()).unwrap(), before);
}

#[tokio::test]
async fn extraction_failure_on_first_run_creates_no_file() {
    let extractor = MockExtractor::failing();
    let (_dir, store) = store_with(&[]);

    let result = run_once(&extractor, &MockNotifier::new(), &store, &options()).await;

    assert!(result.is_err());
    assert!(!store.path().exists());
}

#[tokio::test]
async fn one_failed_send_does_not_stop_the_rest() {
    let extractor = MockExtractor::with_posts(vec![post("D"), post("C"), post("B"), post("A")]);
    let notifier = MockNotifier::new().fail_for("C");
    let (_dir, store) = store_with(&["A"]);

    let summary = run_once(&extractor, &notifier, &store, &options()).await.unwrap();

    assert_eq!(notifier.attempted_ids(), vec!["B", "C", "D"]);
    assert_eq!(notifier.sent_ids(), vec!["B", "D"]);
    assert_eq!(summary.report.sent.len(), 2);
    assert_eq!(summary.report.failed.len(), 1);
    assert_eq!(summary.report.failed[0].0, "C");

    // The failed post is still recorded so it is not retried
    let seen = store.load().unwrap();
    assert!(seen.contains("C"));
    assert!(summary.saved);
}

#[tokio::test]
async fn seen_set_only_grows() {
    let (_dir, store) = store_with(&["old-1", "old-2"]);
    let before = store.load().unwrap();
    let extractor = MockExtractor::with_posts(vec![post("new"), post("old-1")]);

    run_once(&extractor, &MockNotifier::new(), &store, &options()).await.unwrap();

    let after = store.load().unwrap();
    assert!(after.is_superset(&before));
    assert!(after.contains("new"));
}

#[tokio::test]
async fn second_run_is_quiet() {
    let extractor = MockExtractor::with_posts(vec![post("B"), post("A")]);
    let notifier = MockNotifier::new();
    let (_dir, store) = store_with(&["A"]);

    run_once(&extractor, &notifier, &store, &options()).await.unwrap();
    run_once(&extractor, &notifier, &store, &options()).await.unwrap();

    assert_eq!(notifier.sent_ids(), vec!["B"]);
    assert_eq!(extractor.call_count(), 2);
}

#[tokio::test]
async fn edited_post_is_not_renotified() {
    let extractor = MockExtractor::with_posts(vec![post("A")]);
    let notifier = MockNotifier::new();
    let (_dir, store) = store_with(&["A"]);

    extractor.set_posts(vec![post("A").with_text("Edited: start time moved to 9:30")]);
    run_once(&extractor, &notifier, &store, &options()).await.unwrap();

    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn oldest_first_sources_keep_their_order() {
    let extractor = MockExtractor::with_posts(vec![post("A"), post("B"), post("C")]);
    let notifier = MockNotifier::new();
    let (_dir, store) = store_with(&["A"]);
    let options = RunOptions {
        post_order: PostOrder::OldestFirst,
        ..options()
    };

    run_once(&extractor, &notifier, &store, &options).await.unwrap();

    assert_eq!(notifier.sent_ids(), vec!["B", "C"]);
}

#[tokio::test]
async fn dry_run_sends_and_saves_nothing() {
    let extractor = MockExtractor::with_posts(vec![post("B"), post("A")]);
    let notifier = MockNotifier::new();
    let (_dir, store) = store_with(&["A"]);
    let before = std::fs::read(store.path()).unwrap();
    let options = RunOptions {
        dry_run: true,
        ..options()
    };

    let summary = run_once(&extractor, &notifier, &store, &options).await.unwrap();

    assert_eq!(summary.new_posts, 1);
    assert!(!summary.saved);
    assert!(notifier.attempted_ids().is_empty());
    assert_eq!(std::fs::read(store.path()).unwrap(), before);
}

#[tokio::test]
async fn corrupt_seen_set_aborts_before_notifying() {
    let (_dir, store) = store_with(&[]);
    std::fs::write(store.path(), "{ not json").unwrap();
    let extractor = MockExtractor::with_posts(vec![post("A")]);
    let notifier = MockNotifier::new();

    let err = run_once(&extractor, &notifier, &store, &options()).await.unwrap_err();

    assert!(matches!(err, RunError::Store(_)));
    assert_eq!(extractor.call_count(), 0);
    assert!(notifier.attempted_ids().is_empty());
}
