//! Error types for repotallylib

use thiserror::Error;

/// Errors that can occur while fetching, estimating, or reporting
#[derive(Error, Debug)]
pub enum RepotallyError {
    /// A catalog or inspection call failed or returned non-success
    #[error("upstream call '{call}' failed: {message}")]
    UpstreamUnavailable { call: String, message: String },

    /// A collaborator returned data we could not parse
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// No acting identity could be resolved
    #[error("not authenticated: run 'gh auth login' first")]
    NotAuthenticated,

    /// The initial catalog listing was empty
    #[error("no repositories found for '{owner}'")]
    EmptyCorpus { owner: String },

    /// The date filter matched nothing
    #[error("no repositories matched the date filter")]
    EmptyResult,

    /// A date argument was not `YYYY-MM-DD`
    #[error("invalid date '{input}': expected YYYY-MM-DD")]
    InvalidDate { input: String },

    /// HTML report rendering failed
    #[error("template error: {0}")]
    Template(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RepotallyError {
    /// Shorthand for an upstream failure of the named call.
    pub fn upstream(call: impl Into<String>, message: impl Into<String>) -> Self {
        RepotallyError::UpstreamUnavailable {
            call: call.into(),
            message: message.into(),
        }
    }
}
