use async_trait::async_trait;

use super::error::TransportError;
use super::model::{BuildDescriptor, LogEventsRequest, LogPage};

/// Read access to the build service
#[async_trait]
pub trait BuildOperations: Send + Sync {
    /// Fetch metadata for the given builds. Unknown ids are simply absent
    /// from the result, so an empty list is a valid answer.
    async fn batch_get_builds(&self, ids: &[String]) -> Result<Vec<BuildDescriptor>, TransportError>;
}

/// Read access to the paged log-events API
#[async_trait]
pub trait LogEventOperations: Send + Sync {
    /// Fetch one page of events. `request.token` is `None` for the first page.
    async fn get_log_events(&self, request: &LogEventsRequest) -> Result<LogPage, TransportError>;
}
