use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_cloudwatchlogs as cloudwatchlogs;
use aws_sdk_cloudwatchlogs::error::DisplayErrorContext;
use log::debug;

use crate::codebuild::error::TransportError;
use crate::codebuild::model::{LogEvent, LogEventsRequest, LogPage, PageToken};
use crate::codebuild::traits::LogEventOperations;

/// CloudWatch Logs client for reading a single log stream
#[derive(Debug, Clone)]
pub struct CloudWatchLogsClient {
    client: cloudwatchlogs::Client,
}

impl CloudWatchLogsClient {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: cloudwatchlogs::Client::new(config),
        }
    }
}

#[async_trait]
impl LogEventOperations for CloudWatchLogsClient {
    async fn get_log_events(&self, request: &LogEventsRequest) -> Result<LogPage, TransportError> {
        // Always read oldest first and follow the forward token
        let response = self
            .client
            .get_log_events()
            .log_group_name(&request.address.group)
            .log_stream_name(&request.address.stream)
            .start_from_head(true)
            .set_next_token(request.token.as_ref().map(|t| t.as_str().to_string()))
            .set_start_time(request.range.start)
            .set_end_time(request.range.end)
            .set_limit(request.limit)
            .send()
            .await
            .map_err(|e| TransportError::service("GetLogEvents", DisplayErrorContext(&e)))?;

        let events: Vec<LogEvent> = response
            .events()
            .iter()
            .map(|e| LogEvent::new(e.message().unwrap_or_default(), e.timestamp()))
            .collect();
        debug!(
            "GetLogEvents {}: {} event(s), forward token {:?}",
            request.address,
            events.len(),
            response.next_forward_token()
        );

        Ok(LogPage {
            events,
            next_token: response.next_forward_token().map(PageToken::new),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codebuild::model::{LogAddress, TimeRange};

    #[tokio::test]
    async fn test_get_log_events_live() {
        if std::env::var("CBLOGS_AWS_TESTS").unwrap_or_default() != "true" {
            eprintln!("Skipping test_get_log_events_live: Set CBLOGS_AWS_TESTS=true to run AWS integration tests");
            return;
        }
        let (Ok(group), Ok(stream)) = (
            std::env::var("CBLOGS_TEST_LOG_GROUP"),
            std::env::var("CBLOGS_TEST_LOG_STREAM"),
        ) else {
            eprintln!("Skipping test_get_log_events_live: CBLOGS_TEST_LOG_GROUP/CBLOGS_TEST_LOG_STREAM not set");
            return;
        };

        let config = crate::codebuild::client::load_sdk_config(None, None).await;
        let client = CloudWatchLogsClient::new(&config);
        let request = LogEventsRequest {
            address: LogAddress { group, stream },
            token: None,
            range: TimeRange::default(),
            limit: Some(10),
        };
        let page = client.get_log_events(&request).await.unwrap();
        assert!(page.events.len() <= 10);
        assert!(page.next_token.is_some());
    }
}
