use custom_error::custom_error;

use super::pipeline::PipelineState;

// A call to one of the remote services failed
custom_error! {pub TransportError
    Service{operation: String, cause: String} = "{operation} failed: {cause}"
}

impl TransportError {
    pub fn service(operation: &str, cause: impl ToString) -> Self {
        TransportError::Service {
            operation: operation.to_string(),
            cause: cause.to_string(),
        }
    }
}

custom_error! {pub ResolutionError
    MalformedIdentifier{identifier: String} =
        "build identifier '{identifier}' is not of the form <project-name>:<execution-id>"
}

custom_error! {pub LookupError
    NotFound{identifier: String} = "no such build: {identifier}",
    LogsUnavailable{identifier: String} = "build {identifier} has no CloudWatch log location",
    Transport{source: TransportError} = "{source}"
}

custom_error! {pub ReadError
    Transport{source: TransportError} = "{source}"
}

// Each variant names the stage that failed and carries its cause
custom_error! {pub PipelineError
    Lookup{source: LookupError} = "build metadata lookup failed: {source}",
    Resolution{source: ResolutionError} = "log stream resolution failed: {source}",
    Read{source: ReadError} = "log stream read failed: {source}",
    Output{source: std::io::Error} = "writing log output failed: {source}"
}

impl PipelineError {
    /// The state the pipeline was in when the failure happened
    pub fn stage(&self) -> PipelineState {
        match self {
            PipelineError::Lookup {
                source: LookupError::LogsUnavailable { .. },
            }
            | PipelineError::Resolution { .. } => PipelineState::MetadataFetched,
            PipelineError::Lookup { .. } => PipelineState::Start,
            PipelineError::Read { .. } | PipelineError::Output { .. } => PipelineState::Streaming,
        }
    }

    /// Process exit code for this failure. A missing build gets its own code so
    /// scripts can tell it apart from a transient failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Lookup {
                source: LookupError::NotFound { .. },
            } => 2,
            _ => 1,
        }
    }
}
