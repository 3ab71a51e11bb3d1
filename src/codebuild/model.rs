use std::fmt::{Display, Formatter};

/// Opaque identifier of one build execution, as given by the operator.
/// The expected shape is `<project-name>:<execution-id>`, but nothing is
/// validated until resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildIdentifier(String);

impl BuildIdentifier {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for BuildIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the build service says a build's logs live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLocation {
    pub group_name: String,
    /// Stream-name prefix configured on the project. `None` means the build
    /// service uses the bare execution id as the stream name.
    pub stream_prefix: Option<String>,
}

/// Metadata about one build, as returned by the build service
#[derive(Debug, Clone, PartialEq)]
pub struct BuildDescriptor {
    pub id: String,
    pub logs: Option<LogLocation>,
    pub status: Option<String>,
    /// Milliseconds since the epoch
    pub start_time: Option<i64>,
    /// Milliseconds since the epoch, absent while the build is still running
    pub end_time: Option<i64>,
}

/// Fully resolved coordinates of a log stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogAddress {
    pub group: String,
    pub stream: String,
}

impl Display for LogAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.group, self.stream)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub message: String,
    pub timestamp: Option<i64>,
}

impl LogEvent {
    pub fn new(message: impl Into<String>, timestamp: Option<i64>) -> Self {
        Self {
            message: message.into(),
            timestamp,
        }
    }
}

/// Opaque continuation cursor issued by the log service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageToken(String);

impl PageToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Optional time bounds for a read, in milliseconds since the epoch.
/// Both ends default to unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl TimeRange {
    /// Fills in whichever bound is missing from `fallback`.
    #[must_use]
    pub fn or(self, fallback: TimeRange) -> TimeRange {
        TimeRange {
            start: self.start.or(fallback.start),
            end: self.end.or(fallback.end),
        }
    }
}

/// One request against the paged log-events API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEventsRequest {
    pub address: LogAddress,
    pub token: Option<PageToken>,
    pub range: TimeRange,
    pub limit: Option<i32>,
}

/// One response page from the log-events API
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogPage {
    pub events: Vec<LogEvent>,
    pub next_token: Option<PageToken>,
}
