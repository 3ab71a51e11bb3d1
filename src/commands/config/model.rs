use anyhow::Result;
use clap::Parser;
use inquire::validator::Validation;

#[derive(Parser, Debug)]
pub enum ConfigCommand {
    /// Print the config file location and contents
    #[clap(alias = "ls")]
    Show(ShowCommand),
    /// Set the default profile, region and page size interactively
    Set(SetCommand),
}

impl ConfigCommand {
    pub fn run(&self) -> Result<()> {
        match self {
            ConfigCommand::Show(cmd) => cmd.run(),
            ConfigCommand::Set(cmd) => cmd.run(),
        }
    }
}

#[derive(Parser, Debug)]
pub struct ShowCommand {
    #[clap(short, long)]
    pub file: Option<String>,
}

#[derive(Parser, Debug)]
pub struct SetCommand {
    #[clap(short, long)]
    pub file: Option<String>,
}

/// GetLogEvents accepts between 1 and 10,000 events per page. Empty means
/// "use the service default".
#[allow(clippy::unnecessary_wraps)]
pub fn validate_page_limit(
    input: &str,
) -> Result<Validation, Box<dyn std::error::Error + Send + Sync>> {
    if input.trim().is_empty() {
        return Ok(Validation::Valid);
    }
    match input.trim().parse::<i32>() {
        Ok(limit) if (1..=10_000).contains(&limit) => Ok(Validation::Valid),
        Ok(_) => Ok(Validation::Invalid(
            "⚠️ Page limit must be between 1 and 10000".into(),
        )),
        Err(error) => Ok(Validation::Invalid(error.into())),
    }
}
