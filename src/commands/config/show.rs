use std::path::PathBuf;

use super::model::ShowCommand;
use crate::codebuild::config::CblogsConfig;
use anyhow::Result;

impl ShowCommand {
    pub fn run(&self) -> Result<()> {
        let path = self.file.as_ref().map(PathBuf::from);
        let config = CblogsConfig::from_file(path.as_ref())?;

        if let Some(path) = &config.path {
            println!("# {}", path.display());
        }
        print!("{}", config.to_str()?);
        Ok(())
    }
}
