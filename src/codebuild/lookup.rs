use log::{debug, info};

use super::error::LookupError;
use super::model::{BuildDescriptor, BuildIdentifier, LogLocation};
use super::traits::BuildOperations;

/// Fetch the descriptor of a single build, in one request.
///
/// # Errors
/// - `NotFound` if the build service knows no build with this id
/// - `LogsUnavailable` if the build has no CloudWatch log group
/// - `Transport` if the request itself failed
pub async fn fetch_build_descriptor(
    client: &dyn BuildOperations,
    identifier: &BuildIdentifier,
) -> Result<BuildDescriptor, LookupError> {
    let builds = client
        .batch_get_builds(&[identifier.as_str().to_string()])
        .await?;
    debug!("BatchGetBuilds returned {} build(s) for {identifier}", builds.len());

    let Some(build) = builds.into_iter().next() else {
        return Err(LookupError::NotFound {
            identifier: identifier.to_string(),
        });
    };

    if build.logs.is_none() {
        return Err(LookupError::LogsUnavailable {
            identifier: identifier.to_string(),
        });
    }

    info!(
        "Build {} status={:?} logs={:?}",
        build.id, build.status, build.logs
    );
    Ok(build)
}

/// The log location of a descriptor returned by [`fetch_build_descriptor`].
///
/// # Errors
/// `LogsUnavailable` if the descriptor carries no log location.
pub fn log_location(build: &BuildDescriptor) -> Result<&LogLocation, LookupError> {
    build.logs.as_ref().ok_or_else(|| LookupError::LogsUnavailable {
        identifier: build.id.clone(),
    })
}
