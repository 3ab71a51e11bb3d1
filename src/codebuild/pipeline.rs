use std::fmt::{Display, Formatter};
use std::io::Write;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use super::error::PipelineError;
use super::lookup::{fetch_build_descriptor, log_location};
use super::model::{BuildDescriptor, BuildIdentifier, LogAddress, TimeRange};
use super::reader::{EndOfStream, LogStreamReader, ReadOptions};
use super::resolver::resolve_location;
use super::traits::{BuildOperations, LogEventOperations};

/// States of a single fetch. `Failed` is reachable from every state before `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Start,
    MetadataFetched,
    AddressResolved,
    Streaming,
    Done,
    Failed,
}

impl Display for PipelineState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineState::Start => write!(f, "start"),
            PipelineState::MetadataFetched => write!(f, "metadata fetched"),
            PipelineState::AddressResolved => write!(f, "address resolved"),
            PipelineState::Streaming => write!(f, "streaming"),
            PipelineState::Done => write!(f, "done"),
            PipelineState::Failed => write!(f, "failed"),
        }
    }
}

/// Fetch options beyond the build identifier
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub read: ReadOptions,
    /// Bound the read to the build's own start/end time. Explicit bounds in
    /// `read.range` take precedence.
    pub build_window: bool,
}

/// Result of a prepared pipeline: the build and a reader for its stream
pub struct PreparedFetch {
    pub build: BuildDescriptor,
    pub reader: LogStreamReader,
}

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub state: PipelineState,
    /// `None` when the run was cancelled before the stream was resolved
    pub address: Option<LogAddress>,
    pub pages: usize,
    pub events: usize,
    pub cancelled: bool,
}

/// Resolves a build to its log stream and copies the stream to an output sink.
/// Both service clients are injected.
pub struct Pipeline {
    builds: Arc<dyn BuildOperations>,
    logs: Arc<dyn LogEventOperations>,
    options: FetchOptions,
    cancel: CancellationToken,
    state: PipelineState,
}

impl Pipeline {
    pub fn new(builds: Arc<dyn BuildOperations>, logs: Arc<dyn LogEventOperations>) -> Self {
        Self {
            builds,
            logs,
            options: FetchOptions::default(),
            cancel: CancellationToken::new(),
            state: PipelineState::Start,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    fn advance(&mut self, next: PipelineState) {
        debug!("Pipeline: {} -> {}", self.state, next);
        self.state = next;
    }

    fn fail(&mut self, error: impl Into<PipelineError>) -> PipelineError {
        let error = error.into();
        warn!("Pipeline failed in state '{}': {error}", self.state);
        self.state = PipelineState::Failed;
        error
    }

    /// Look the build up and resolve its log stream, stopping short of reading it.
    /// `Ok(None)` if the lookup was cancelled; the state is left at `Start`.
    ///
    /// # Errors
    /// A `PipelineError` tagged with the lookup or resolution stage.
    pub async fn prepare(
        &mut self,
        raw_identifier: &str,
    ) -> Result<Option<PreparedFetch>, PipelineError> {
        self.state = PipelineState::Start;
        let identifier = BuildIdentifier::new(raw_identifier);

        let cancel = self.cancel.clone();
        let looked_up = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            result = fetch_build_descriptor(self.builds.as_ref(), &identifier) => Some(result),
        };
        let build = match looked_up {
            None => {
                info!("Lookup of {identifier} cancelled");
                return Ok(None);
            }
            Some(Err(e)) => return Err(self.fail(e)),
            Some(Ok(build)) => build,
        };
        self.advance(PipelineState::MetadataFetched);

        let address = match log_location(&build) {
            Ok(location) => resolve_location(&build.id, location).map_err(PipelineError::from),
            Err(e) => Err(PipelineError::from(e)),
        };
        let address = match address {
            Ok(address) => address,
            Err(e) => return Err(self.fail(e)),
        };
        self.advance(PipelineState::AddressResolved);
        info!("Resolved {identifier} to {address}");

        let mut read = self.options.read.clone();
        if self.options.build_window {
            read.range = read.range.or(TimeRange {
                start: build.start_time,
                end: build.end_time,
            });
        }

        let reader = LogStreamReader::new(Arc::clone(&self.logs), address)
            .with_options(read)
            .with_cancellation(self.cancel.clone());
        Ok(Some(PreparedFetch { build, reader }))
    }

    /// Run the whole pipeline: event messages go to `out` exactly as received,
    /// progress text goes to `diagnostics`.
    ///
    /// Events written before a mid-stream failure stay written.
    ///
    /// # Errors
    /// A `PipelineError` naming the stage that failed.
    pub async fn run<O: Write, D: Write>(
        &mut self,
        raw_identifier: &str,
        out: &mut O,
        diagnostics: &mut D,
    ) -> Result<PipelineReport, PipelineError> {
        // Progress output is best-effort and never fails the fetch
        let _ = writeln!(diagnostics, "Pulling Logs for {raw_identifier}");
        let Some(PreparedFetch { build, reader }) = self.prepare(raw_identifier).await? else {
            self.advance(PipelineState::Done);
            return Ok(PipelineReport {
                state: self.state,
                address: None,
                pages: 0,
                events: 0,
                cancelled: true,
            });
        };
        let _ = writeln!(diagnostics, "\n{}", reader.address().stream);

        self.advance(PipelineState::Streaming);
        let mut pager = reader.pages();
        let mut events = 0;
        loop {
            let page = match pager.next_page().await {
                Ok(Some(page)) => page,
                Ok(None) => break,
                Err(e) => return Err(self.fail(e)),
            };
            for event in &page {
                if let Err(e) = out.write_all(event.message.as_bytes()) {
                    return Err(self.fail(e));
                }
            }
            if let Err(e) = out.flush() {
                return Err(self.fail(e));
            }
            events += page.len();
        }

        let cancelled = pager.end() == Some(EndOfStream::Cancelled);
        self.advance(PipelineState::Done);
        info!(
            "Read {events} event(s) of build {} ({}) in {} page(s) from {}{}",
            build.id,
            build.status.as_deref().unwrap_or("status unknown"),
            pager.pages_read(),
            reader.address(),
            if cancelled { " (cancelled)" } else { "" }
        );

        Ok(PipelineReport {
            state: self.state,
            address: Some(reader.address().clone()),
            pages: pager.pages_read(),
            events,
            cancelled,
        })
    }
}
