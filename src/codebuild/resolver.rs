//! Maps a build identifier onto the log stream the build wrote to.
//!
//! CodeBuild names each execution `<project-name>:<execution-id>` and writes
//! its output to the stream `<stream-prefix>/<execution-id>` inside the
//! project's log group. When the project has no custom stream prefix the
//! stream is named after the execution id alone.

use super::error::ResolutionError;
use super::model::{LogAddress, LogLocation};

/// Returns the execution id, the part after the first colon.
///
/// # Errors
/// `MalformedIdentifier` when there is no colon or nothing follows it.
pub fn execution_id(raw_identifier: &str) -> Result<&str, ResolutionError> {
    match raw_identifier.split_once(':') {
        Some((_, id)) if !id.is_empty() => Ok(id),
        _ => Err(ResolutionError::MalformedIdentifier {
            identifier: raw_identifier.to_string(),
        }),
    }
}

/// Resolves `raw_identifier` into `<stream_name_prefix>/<execution-id>`.
/// The group is left empty; see [`resolve_location`] for a full address.
///
/// # Errors
/// `MalformedIdentifier` when the identifier does not match the grammar.
pub fn resolve(raw_identifier: &str, stream_name_prefix: &str) -> Result<LogAddress, ResolutionError> {
    let id = execution_id(raw_identifier)?;
    Ok(LogAddress {
        group: String::new(),
        stream: format!("{stream_name_prefix}/{id}"),
    })
}

/// Resolves a build identifier against the log location reported for that build.
///
/// # Errors
/// `MalformedIdentifier` when the identifier does not match the grammar.
pub fn resolve_location(
    raw_identifier: &str,
    location: &LogLocation,
) -> Result<LogAddress, ResolutionError> {
    let stream = match &location.stream_prefix {
        Some(prefix) => resolve(raw_identifier, prefix)?.stream,
        None => execution_id(raw_identifier)?.to_string(),
    };
    Ok(LogAddress {
        group: location.group_name.clone(),
        stream,
    })
}
