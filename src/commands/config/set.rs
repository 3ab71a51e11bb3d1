use std::path::PathBuf;

use super::model::{validate_page_limit, SetCommand};
use crate::codebuild::config::CblogsConfig;
use anyhow::{Context, Result};

impl SetCommand {
    pub fn run(&self) -> Result<()> {
        let path = self.file.as_ref().map(PathBuf::from);
        let mut config = CblogsConfig::from_file_or_new(path.as_ref())?;

        println!("\n📝 Leave a field empty to fall back to the AWS SDK defaults.");
        println!("   Values may reference environment variables (${{VAR}} or $VAR).\n");

        let profile = inquire::Text::new("AWS profile")
            .with_initial_value(config.profile.as_deref().unwrap_or_default())
            .with_placeholder("default")
            .prompt()?;
        let region = inquire::Text::new("AWS region")
            .with_initial_value(config.region.as_deref().unwrap_or_default())
            .with_placeholder("eu-west-1")
            .prompt()?;
        let current_limit = config.page_limit.map(|l| l.to_string()).unwrap_or_default();
        let page_limit = inquire::Text::new("events per page")
            .with_initial_value(&current_limit)
            .with_validator(validate_page_limit)
            .prompt()?;

        config.profile = non_empty(profile);
        config.region = non_empty(region);
        config.page_limit = non_empty(page_limit)
            .map(|l| l.parse::<i32>())
            .transpose()
            .context("Invalid page limit")?;

        config.write_to_file()?;

        println!("✅ Config saved successfully!");
        Ok(())
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
