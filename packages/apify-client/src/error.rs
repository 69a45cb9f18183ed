use thiserror::Error;

/// Errors returned by the Apify client.
#[derive(Debug, Error)]
pub enum ApifyError {
    /// Transport-level failure (DNS, TLS, timeout, body decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Apify answered with a non-success status
    #[error("Apify API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Actor run ended in a terminal state other than SUCCEEDED
    #[error("Apify run ended with status {0}")]
    RunFailed(String),

    /// Run did not finish within the allotted polling rounds
    #[error("Apify run {run_id} still {status} after {rounds} polls")]
    PollTimeout {
        run_id: String,
        status: String,
        rounds: u32,
    },
}

pub type Result<T> = std::result::Result<T, ApifyError>;
