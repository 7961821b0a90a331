//! Search engine notification (IndexNow).

pub mod indexnow;

use async_trait::async_trait;
use serde::Serialize;

pub use indexnow::IndexNowClient;

/// Raw upstream answer to a submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionReport {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Submit absolute page URLs. `Err` when the request fails or upstream rejects it.
    async fn submit(&self, urls: &[String]) -> anyhow::Result<SubmissionReport>;
}
