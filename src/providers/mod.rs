mod servicenow;

use crate::core::models::QueueReading;
use async_trait::async_trait;
use thiserror::Error;

pub use servicenow::ServiceNowProvider;

/// Hard failures of a queue read. Non-200 statuses are not errors, see [`QueueReading`].
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Request to {endpoint} failed")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode ticket response")]
    Decode(#[source] serde_json::Error),
}

#[async_trait]
pub trait TicketSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Reads the number of open, unassigned tickets in the configured group.
    async fn fetch_queue(&self) -> Result<QueueReading, SourceError>;
}
