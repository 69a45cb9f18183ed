//! One pass: load seen-set, extract, diff, notify, save.

use tracing::{info, warn};

use crate::error::Result;
use crate::extractors::PostExtractor;
use crate::novelty::{self, FirstRunPolicy, PostOrder};
use crate::notifier::{dispatch, DispatchReport, PostNotifier};
use crate::store::SeenStore;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub first_run: FirstRunPolicy,
    pub post_order: PostOrder,
    /// Log what would be sent; do not notify or persist.
    pub dry_run: bool,
}

/// What a run did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub extracted: usize,
    /// Posts not seen before this run
    pub new_posts: usize,
    /// New posts recorded without a notification (first-run seeding)
    pub seeded: usize,
    pub report: DispatchReport,
    pub seen_total: usize,
    /// Whether the seen-set file was rewritten
    pub saved: bool,
}

/// Run the whole pipeline once.
///
/// Extraction failure returns before anything is written, leaving the stored
/// seen-set untouched. Notification failures are recorded in the summary and
/// the posts are still marked seen.
pub async fn run_once(
    extractor: &dyn PostExtractor,
    notifier: &dyn PostNotifier,
    store: &SeenStore,
    options: &RunOptions,
) -> Result<RunSummary> {
    let mut seen = store.load()?;
    info!(path = %store.path().display(), known = seen.len(), "Seen-set loaded");

    let posts = extractor.extract().await?;
    info!(source = extractor.name(), count = posts.len(), "Posts extracted");

    let selection = novelty::select(&posts, &seen, options.post_order, options.first_run);
    let new_posts = selection.to_notify.len() + selection.suppressed;

    if selection.first_run && selection.suppressed > 0 {
        info!(
            count = selection.suppressed,
            "First run: recording current posts without notifying"
        );
    }
    for post in &selection.to_notify {
        info!(
            post_id = %post.id,
            headline = post.headline().unwrap_or("Untitled"),
            "New post found"
        );
    }

    if options.dry_run {
        info!(would_notify = selection.to_notify.len(), "Dry run: skipping notifications and save");
        return Ok(RunSummary {
            extracted: posts.len(),
            new_posts,
            seeded: selection.suppressed,
            report: DispatchReport::default(),
            seen_total: seen.len(),
            saved: false,
        });
    }

    let report = dispatch(notifier, &selection.to_notify).await;
    if !report.failed.is_empty() {
        warn!(
            failed = report.failed.len(),
            sent = report.sent.len(),
            "Some notifications failed; their posts are still marked seen"
        );
    }

    let added = seen.record(&posts);
    let saved = added > 0;
    if saved {
        store.save(&seen)?;
    }

    info!(
        new_posts,
        sent = report.sent.len(),
        failed = report.failed.len(),
        seen_total = seen.len(),
        "Run complete"
    );

    Ok(RunSummary {
        extracted: posts.len(),
        new_posts,
        seeded: selection.suppressed,
        report,
        seen_total: seen.len(),
        saved,
    })
}
