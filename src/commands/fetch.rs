use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use log::{error, info, LevelFilter};
use simplelog::{Config, WriteLogger};
use tokio_util::sync::CancellationToken;

use crate::codebuild::client::{load_sdk_config, CloudWatchLogsClient, CodeBuildClient};
use crate::codebuild::config::CblogsConfig;
use crate::codebuild::model::TimeRange;
use crate::codebuild::pipeline::{FetchOptions, Pipeline};
use crate::codebuild::reader::ReadOptions;

#[derive(Parser, Debug)]
pub struct FetchCommand {
    /// CodeBuild build id, `<project-name>:<execution-id>`
    #[clap(short, long)]
    pub build_id: String,
    /// AWS profile
    #[clap(short, long)]
    pub profile: Option<String>,
    #[clap(short, long)]
    pub region: Option<String>,
    /// Config file
    #[clap(short, long)]
    pub file: Option<String>,
    /// Only events at or after this time (RFC 3339 or epoch milliseconds)
    #[clap(long, value_parser = parse_timestamp)]
    pub start_time: Option<i64>,
    /// Only events before this time (RFC 3339 or epoch milliseconds)
    #[clap(long, value_parser = parse_timestamp)]
    pub end_time: Option<i64>,
    /// Limit the read to the build's own start and end time
    #[clap(long)]
    pub build_window: bool,
    /// Events per page request
    #[clap(long, value_parser = clap::value_parser!(i32).range(1..=10_000))]
    pub limit: Option<i32>,
}

impl FetchCommand {
    pub async fn run(&self) -> Result<()> {
        // setup logging
        if let Ok(log_level) = std::env::var("CBLOGS_LOG") {
            setup_logging(&log_level)?;
        }

        let path = self.file.as_ref().map(PathBuf::from);
        let config = CblogsConfig::from_file(path.as_ref())?;
        let profile = config.resolve_profile(self.profile.as_deref())?;
        let region = config.resolve_region(self.region.as_deref())?;
        let sdk_config = load_sdk_config(profile.as_deref(), region.as_deref()).await;

        let cancel = CancellationToken::new();
        let on_ctrl_c = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted, stopping after the current page");
                on_ctrl_c.cancel();
            }
        });

        let options = FetchOptions {
            read: ReadOptions {
                range: TimeRange {
                    start: self.start_time,
                    end: self.end_time,
                },
                limit: self.limit.or(config.page_limit),
                start_token: None,
            },
            build_window: self.build_window,
        };
        let mut pipeline = Pipeline::new(
            Arc::new(CodeBuildClient::new(&sdk_config)),
            Arc::new(CloudWatchLogsClient::new(&sdk_config)),
        )
        .with_options(options)
        .with_cancellation(cancel);

        let mut out = std::io::stdout().lock();
        let mut diagnostics = std::io::stderr().lock();
        let result = pipeline.run(&self.build_id, &mut out, &mut diagnostics).await;
        let report = match result {
            Ok(report) => report,
            Err(e) => {
                error!(
                    "Fetch of {} failed in stage '{}' (pipeline {}): {e}",
                    self.build_id,
                    e.stage(),
                    pipeline.state()
                );
                return Err(e.into());
            }
        };

        if report.cancelled {
            let _ = match report.address {
                Some(_) => writeln!(
                    diagnostics,
                    "Interrupted after {} page(s), {} event(s) printed",
                    report.pages, report.events
                ),
                None => writeln!(diagnostics, "Interrupted while looking up {}", self.build_id),
            };
        }
        Ok(())
    }
}

/// Accepts RFC 3339 (`2024-05-01T12:00:00Z`) or epoch milliseconds
fn parse_timestamp(value: &str) -> Result<i64, String> {
    if let Ok(millis) = value.parse::<i64>() {
        return Ok(millis);
    }
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|t| t.timestamp_millis())
        .map_err(|e| format!("'{value}' is neither RFC 3339 nor epoch milliseconds: {e}"))
}

fn setup_logging(log_level: &str) -> Result<()> {
    // Get the XDG state directory for logs
    let log_dir = crate::get_state_dir().join("logs");

    // Create the log directory if it doesn't exist
    std::fs::create_dir_all(&log_dir)?;

    let log_file_path = log_dir.join(format!(
        "cblogs-debug-{}.log",
        chrono::Local::now().format("%Y%m%d%H%M%S")
    ));

    let log_level = match log_level.to_lowercase().as_str() {
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    };

    WriteLogger::init(log_level, Config::default(), File::create(&log_file_path)?)?;

    // Log the file location so users know where to find it
    info!("Logging to: {}", log_file_path.display());

    Ok(())
}
