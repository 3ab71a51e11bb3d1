//! In-memory stand-ins for the build and log services.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::error::TransportError;
use super::model::{BuildDescriptor, LogEvent, LogEventsRequest, LogLocation, LogPage, PageToken};
use super::traits::{BuildOperations, LogEventOperations};

pub fn descriptor(id: &str, stream_prefix: Option<&str>) -> BuildDescriptor {
    BuildDescriptor {
        id: id.to_string(),
        logs: Some(LogLocation {
            group_name: "/aws/codebuild/proj".to_string(),
            stream_prefix: stream_prefix.map(str::to_string),
        }),
        status: Some("SUCCEEDED".to_string()),
        start_time: Some(1_000),
        end_time: Some(9_000),
    }
}

pub fn page(messages: &[&str], token: Option<&str>) -> LogPage {
    LogPage {
        events: messages.iter().map(|m| LogEvent::new(*m, None)).collect(),
        next_token: token.map(PageToken::new),
    }
}

pub struct FakeBuilds {
    // Err holds the cause text of a failing BatchGetBuilds
    response: Result<Vec<BuildDescriptor>, String>,
    requests: Mutex<Vec<Vec<String>>>,
}

impl FakeBuilds {
    pub fn returning(builds: Vec<BuildDescriptor>) -> Self {
        Self {
            response: Ok(builds),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(cause: &str) -> Self {
        Self {
            response: Err(cause.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Vec<String>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl BuildOperations for FakeBuilds {
    async fn batch_get_builds(&self, ids: &[String]) -> Result<Vec<BuildDescriptor>, TransportError> {
        self.requests.lock().unwrap().push(ids.to_vec());
        self.response
            .clone()
            .map_err(|cause| TransportError::service("BatchGetBuilds", cause))
    }
}

/// A build service that never answers
pub struct HangingBuilds;

#[async_trait]
impl BuildOperations for HangingBuilds {
    async fn batch_get_builds(&self, _ids: &[String]) -> Result<Vec<BuildDescriptor>, TransportError> {
        std::future::pending().await
    }
}

/// Serves scripted pages in order. Once the script runs out every further
/// call fails, so a reader that does not stop shows up as an error rather
/// than a hang.
pub struct FakeLogs {
    pages: Mutex<VecDeque<Result<LogPage, TransportError>>>,
    requests: Mutex<Vec<LogEventsRequest>>,
    calls: AtomicUsize,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl FakeLogs {
    pub fn new(pages: Vec<LogPage>) -> Self {
        Self::scripted(pages.into_iter().map(Ok).collect())
    }

    pub fn scripted(pages: Vec<Result<LogPage, TransportError>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            cancel_after: None,
        }
    }

    /// Cancel `token` as soon as the `calls`-th page has been served
    pub fn cancel_after(mut self, calls: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((calls, token));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<LogEventsRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogEventOperations for FakeLogs {
    async fn get_log_events(&self, request: &LogEventsRequest) -> Result<LogPage, TransportError> {
        let calls = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(request.clone());

        let next = self.pages.lock().unwrap().pop_front();
        if let Some((after, token)) = &self.cancel_after {
            if calls >= *after {
                token.cancel();
            }
        }
        next.unwrap_or_else(|| {
            Err(TransportError::service(
                "GetLogEvents",
                format!("no scripted page for call {calls}"),
            ))
        })
    }
}
