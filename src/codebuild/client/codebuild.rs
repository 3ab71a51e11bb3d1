use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_codebuild as codebuild;
use aws_sdk_codebuild::error::DisplayErrorContext;
use aws_sdk_codebuild::types::Build;
use log::debug;

use crate::codebuild::error::TransportError;
use crate::codebuild::model::{BuildDescriptor, LogLocation};
use crate::codebuild::traits::BuildOperations;

/// CodeBuild client for build metadata
#[derive(Debug, Clone)]
pub struct CodeBuildClient {
    client: codebuild::Client,
}

impl CodeBuildClient {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: codebuild::Client::new(config),
        }
    }
}

#[async_trait]
impl BuildOperations for CodeBuildClient {
    async fn batch_get_builds(&self, ids: &[String]) -> Result<Vec<BuildDescriptor>, TransportError> {
        let response = self
            .client
            .batch_get_builds()
            .set_ids(Some(ids.to_vec()))
            .send()
            .await
            .map_err(|e| TransportError::service("BatchGetBuilds", DisplayErrorContext(&e)))?;

        if !response.builds_not_found().is_empty() {
            debug!("Builds not found: {:?}", response.builds_not_found());
        }

        Ok(response.builds().iter().map(build_descriptor).collect())
    }
}

/// The CloudWatch settings on the build win over the resolved `logs` location,
/// matching how CodeBuild itself names the stream.
fn build_descriptor(build: &Build) -> BuildDescriptor {
    let logs = build.logs();
    let cloud_watch = logs.and_then(|l| l.cloud_watch_logs());

    let group_name = cloud_watch
        .and_then(|c| c.group_name())
        .or_else(|| logs.and_then(|l| l.group_name()));
    let location = group_name.map(|group_name| LogLocation {
        group_name: group_name.to_string(),
        stream_prefix: cloud_watch
            .and_then(|c| c.stream_name())
            .filter(|prefix| !prefix.is_empty())
            .map(str::to_string),
    });

    BuildDescriptor {
        id: build.id().unwrap_or_default().to_string(),
        logs: location,
        status: build.build_status().map(|s| s.as_str().to_string()),
        start_time: build.start_time().and_then(|t| t.to_millis().ok()),
        end_time: build.end_time().and_then(|t| t.to_millis().ok()),
    }
}
