pub mod config;
pub mod fetch;

use crate::codebuild::error::PipelineError;

/// Exit code for a failed command
pub fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<PipelineError>()
        .map_or(1, PipelineError::exit_code)
}

/// The single diagnostic line printed for a failed command. Pipeline errors
/// already carry their cause in their message; anything else gets its
/// context chain.
pub fn error_line(error: &anyhow::Error) -> String {
    match error.downcast_ref::<PipelineError>() {
        Some(e) => format!("Error: {e}"),
        None => format!("Error: {error:#}"),
    }
}
