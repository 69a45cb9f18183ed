//! Facebook page notifier.
//!
//! Watches one public Facebook page (directly through Apify's headless
//! browser, or through an RSS mirror) and pushes an ntfy notification for
//! every post it has not seen before.
//!
//! # Modules
//!
//! - [`config`] - Validated configuration document
//! - [`extractors`] - Source adapters producing [`Post`]s
//! - [`novelty`] - Diffing posts against the seen-set
//! - [`notifier`] - Rendering and sending push notifications
//! - [`store`] - Seen-set persistence
//! - [`runner`] - The single pass tying it together
//! - [`testing`] - Mock implementations for testing

pub mod config;
pub mod error;
pub mod extractors;
pub mod notifier;
pub mod novelty;
pub mod post;
pub mod runner;
pub mod store;
pub mod testing;

pub use config::{Config, Source};
pub use error::{ConfigError, ExtractionError, NotificationError, RunError, StoreError};
pub use extractors::PostExtractor;
pub use notifier::{dispatch, DispatchReport, MessageFormat, NtfyNotifier, PostNotifier};
pub use novelty::{novelty, FirstRunPolicy, PostOrder};
pub use post::Post;
pub use runner::{run_once, RunOptions, RunSummary};
pub use store::{SeenSet, SeenStore};
