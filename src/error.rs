// src/error.rs
//! Error taxonomy for the enrichment pipeline.
//!
//! Only two failures ever leave their component: a page fetch that exhausted
//! its retries (fatal to that one article) and an upstream query failure
//! (fatal to the whole request). Malformed HTML/JSON and missing fields are
//! handled locally and never show up here.

use thiserror::Error;

/// Network, timeout or HTTP status failure after the retry budget is spent.
#[derive(Debug, Clone, Error)]
#[error("fetching {url} failed after {attempts} attempt(s): {message}")]
pub struct FetchError {
    pub url: String,
    pub attempts: u32,
    pub message: String,
}

#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("credentials unavailable: {0}")]
    Credentials(String),
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("upstream response could not be decoded: {0}")]
    Decode(String),
    #[error("upstream job {job_id} did not complete after {polls} polls")]
    JobIncomplete { job_id: String, polls: u32 },
}
