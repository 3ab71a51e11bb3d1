pub mod cloudwatch;
pub mod codebuild;

pub use cloudwatch::CloudWatchLogsClient;
pub use codebuild::CodeBuildClient;

use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_codebuild::config::Region;
use log::info;

/// Loads the shared AWS configuration. Credentials, MFA and SSO are handled
/// entirely by the default provider chain of the selected profile.
pub async fn load_sdk_config(profile: Option<&str>, region: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(profile) = profile {
        info!("Using AWS profile: {profile}");
        loader = loader.profile_name(profile);
    }
    if let Some(region) = region {
        info!("Using AWS region: {region}");
        loader = loader.region(Region::new(region.to_string()));
    }
    loader.load().await
}
