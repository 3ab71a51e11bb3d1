use std::sync::Arc;

use futures::{Stream, TryStreamExt};
use log::{debug, info};
use tokio_util::sync::CancellationToken;

use super::error::ReadError;
use super::model::{LogAddress, LogEvent, LogEventsRequest, PageToken, TimeRange};
use super::traits::LogEventOperations;

/// Optional knobs for a read. The default reads the whole stream from its head.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadOptions {
    pub range: TimeRange,
    /// Maximum events per page request, service default when `None`
    pub limit: Option<i32>,
    /// Resume from a token obtained earlier instead of the head of the stream
    pub start_token: Option<PageToken>,
}

/// Why a pager stopped asking for more pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOfStream {
    /// The service returned no continuation token
    NoToken,
    /// The service handed back the token we just used: nothing newer exists
    RepeatedToken,
    /// The caller cancelled; events read so far are kept
    Cancelled,
    /// A page request failed
    Failed,
}

/// Reads one log stream from the log service.
///
/// The reader itself holds no paging state: [`LogStreamReader::pages`] and
/// [`LogStreamReader::read_all`] start from the first page on every call.
#[derive(Clone)]
pub struct LogStreamReader {
    client: Arc<dyn LogEventOperations>,
    address: LogAddress,
    options: ReadOptions,
    cancel: CancellationToken,
}

impl LogStreamReader {
    pub fn new(client: Arc<dyn LogEventOperations>, address: LogAddress) -> Self {
        Self {
            client,
            address,
            options: ReadOptions::default(),
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ReadOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn address(&self) -> &LogAddress {
        &self.address
    }

    /// A fresh pager positioned before the first page
    pub fn pages(&self) -> LogPager {
        LogPager {
            client: Arc::clone(&self.client),
            request: LogEventsRequest {
                address: self.address.clone(),
                token: self.options.start_token.clone(),
                range: self.options.range,
                limit: self.options.limit,
            },
            cancel: self.cancel.clone(),
            end: None,
            pages_read: 0,
        }
    }

    /// Every event of the stream, in service order. Pages are fetched lazily
    /// as the stream is polled. A failed page request ends the stream with
    /// that error after all earlier events have been yielded.
    #[allow(dead_code)]
    pub fn read_all(&self) -> impl Stream<Item = Result<LogEvent, ReadError>> + Send + 'static {
        futures::stream::try_unfold(self.pages(), |mut pager| async move {
            let page = pager.next_page().await?;
            Ok::<_, ReadError>(page.map(|events| (events, pager)))
        })
        .map_ok(|events| futures::stream::iter(events.into_iter().map(Ok::<LogEvent, ReadError>)))
        .try_flatten()
    }
}

/// Walks the pages of one stream.
///
/// CloudWatch Logs never says "end of stream" outright: once the reader has
/// caught up it keeps returning the forward token it was just given. So the
/// only stop signal is the previous token compared with the next one.
pub struct LogPager {
    client: Arc<dyn LogEventOperations>,
    // `request.token` is always the token the next fetch will send
    request: LogEventsRequest,
    cancel: CancellationToken,
    end: Option<EndOfStream>,
    pages_read: usize,
}

impl LogPager {
    /// Fetch the next page. `Ok(None)` once the stream has ended or the
    /// read was cancelled; no request is made after that.
    ///
    /// # Errors
    /// `ReadError::Transport` when the request fails. The pager is finished
    /// afterwards.
    pub async fn next_page(&mut self) -> Result<Option<Vec<LogEvent>>, ReadError> {
        if self.end.is_some() {
            return Ok(None);
        }
        if self.cancel.is_cancelled() {
            info!("Read of {} cancelled after {} page(s)", self.request.address, self.pages_read);
            self.end = Some(EndOfStream::Cancelled);
            return Ok(None);
        }

        let cancel = self.cancel.clone();
        let fetched = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            result = self.client.get_log_events(&self.request) => Some(result),
        };

        let page = match fetched {
            None => {
                info!("Read of {} cancelled during page {}", self.request.address, self.pages_read + 1);
                self.end = Some(EndOfStream::Cancelled);
                return Ok(None);
            }
            Some(Err(e)) => {
                self.end = Some(EndOfStream::Failed);
                return Err(e.into());
            }
            Some(Ok(page)) => page,
        };
        self.pages_read += 1;
        debug!(
            "Page {}: {} event(s), next token {:?}",
            self.pages_read,
            page.events.len(),
            page.next_token
        );

        match page.next_token {
            None => self.end = Some(EndOfStream::NoToken),
            Some(next) if self.request.token.as_ref() == Some(&next) => {
                self.end = Some(EndOfStream::RepeatedToken);
            }
            Some(next) => self.request.token = Some(next),
        }
        Ok(Some(page.events))
    }

    pub fn pages_read(&self) -> usize {
        self.pages_read
    }

    /// `None` while more pages may follow
    pub fn end(&self) -> Option<EndOfStream> {
        self.end
    }
}
