use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::CONFIG_FILE;
use anyhow::{Context, Result};

/// Expands environment variables in a string value.
/// Supports ${VAR} and $VAR syntax.
pub fn expand_env_vars(value: &str) -> Result<String> {
    shellexpand::env(value)
        .map(|s| s.into_owned())
        .map_err(|e| anyhow::anyhow!("Failed to expand environment variable in '{}': {}", value, e))
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct CblogsConfig {
    /// AWS shared-config profile
    pub profile: Option<String>,
    pub region: Option<String>,
    /// Events per GetLogEvents request
    pub page_limit: Option<i32>,
    #[serde(skip)]
    pub path: Option<PathBuf>,
}

impl CblogsConfig {
    /// Load the config at `config_path`, which must exist, or at the default
    /// location, where a missing file means an empty config.
    pub fn from_file(config_path: Option<&PathBuf>) -> Result<Self> {
        match config_path {
            Some(path) => Self::read(path, false),
            None => Self::read_default(),
        }
    }

    /// Like [`Self::from_file`], but an explicit path that does not exist yet
    /// also gives an empty config, to be written there later.
    pub fn from_file_or_new(config_path: Option<&PathBuf>) -> Result<Self> {
        match config_path {
            Some(path) => Self::read(path, true),
            None => Self::read_default(),
        }
    }

    fn read_default() -> Result<Self> {
        let default_path = CONFIG_FILE.as_path();
        info!("Using configuration path: {}", default_path.display());
        Self::read(default_path, true)
    }

    fn read(path: &Path, missing_is_empty: bool) -> Result<Self> {
        let toml_config = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if missing_is_empty && e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read config file {}", path.display()))
            }
        };
        let mut config = Self::from_str(&toml_config)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.path = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn from_str(config: &str) -> Result<Self> {
        let config: CblogsConfig = toml::from_str(config)?;
        info!(
            "Loaded config: profile={:?}, region={:?}, page_limit={:?}",
            config.profile, config.region, config.page_limit
        );
        Ok(config)
    }

    /// The profile to use: the command-line value wins, then the file.
    /// Environment variables in either are expanded.
    pub fn resolve_profile(&self, cli: Option<&str>) -> Result<Option<String>> {
        cli.or(self.profile.as_deref())
            .map(expand_env_vars)
            .transpose()
    }

    pub fn resolve_region(&self, cli: Option<&str>) -> Result<Option<String>> {
        cli.or(self.region.as_deref())
            .map(expand_env_vars)
            .transpose()
    }

    pub fn to_str(&self) -> Result<String> {
        toml::to_string(self).map_err(std::convert::Into::into)
    }

    pub fn write_to_file(&self) -> Result<()> {
        let path = self
            .path
            .clone()
            .unwrap_or(CONFIG_FILE.as_path().to_path_buf());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Set restrictive file permissions on Unix systems (0600 = rw-------)
        #[cfg(unix)]
        let mut file = {
            use std::os::unix::fs::OpenOptionsExt;
            OpenOptions::new()
                .write(true)
                .truncate(true)
                .create(true)
                .mode(0o600)
                .open(&path)?
        };

        #[cfg(not(unix))]
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(&path)?;

        file.write_all(self.to_str()?.as_bytes())?;
        info!("Wrote config to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_CONFIG: &str = r#"
profile = "ci-readonly"
region = "eu-west-1"
page_limit = 1000
"#;

    #[test]
    fn test_get_config() {
        let config = CblogsConfig::from_str(TEST_CONFIG).unwrap();
        assert_eq!(config.profile.as_deref(), Some("ci-readonly"));
        assert_eq!(config.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.page_limit, Some(1000));
    }

    #[test]
    fn test_empty_config() {
        let config = CblogsConfig::from_str("").unwrap();
        assert_eq!(config, CblogsConfig::default());
    }

    #[test]
    fn test_cli_overrides_file() {
        let config = CblogsConfig::from_str(TEST_CONFIG).unwrap();
        assert_eq!(
            config.resolve_profile(Some("admin")).unwrap().as_deref(),
            Some("admin")
        );
        assert_eq!(
            config.resolve_profile(None).unwrap().as_deref(),
            Some("ci-readonly")
        );
        assert_eq!(CblogsConfig::default().resolve_region(None).unwrap(), None);
    }

    #[test]
    fn test_profile_env_var() {
        std::env::set_var("CBLOGS_TEST_PROFILE", "from-env");
        let config = CblogsConfig::from_str(r#"profile = "${CBLOGS_TEST_PROFILE}""#).unwrap();
        assert_eq!(config.profile.as_deref(), Some("${CBLOGS_TEST_PROFILE}"));
        assert_eq!(
            config.resolve_profile(None).unwrap().as_deref(),
            Some("from-env")
        );
    }

    #[test]
    fn test_unknown_env_var_is_an_error() {
        let config = CblogsConfig::from_str(r#"region = "${CBLOGS_TEST_UNSET_VARIABLE}""#).unwrap();
        assert!(config.resolve_region(None).is_err());
    }

    #[test]
    fn test_serialize_round_trip_skips_path() {
        let config = CblogsConfig {
            profile: Some("ci".to_string()),
            region: None,
            page_limit: Some(500),
            path: Some(PathBuf::from("/tmp/ignored.toml")),
        };

        let serialized = config.to_str().unwrap();
        assert!(serialized.contains("profile = \"ci\""));
        assert!(serialized.contains("page_limit = 500"));
        assert!(!serialized.contains("ignored"));
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let path = PathBuf::from("non-existing.toml");
        let err = CblogsConfig::from_file(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("non-existing.toml"));
    }

    #[test]
    fn missing_path_for_a_new_config() {
        let path = PathBuf::from("non-existing.toml");
        let config = CblogsConfig::from_file_or_new(Some(&path)).unwrap();
        assert_eq!(config.path, Some(path));
        assert_eq!(config.profile, None);
    }

    #[test]
    fn unreadable_path_is_an_error() {
        // A directory exists but cannot be read as a file
        let path = std::env::temp_dir();
        assert!(CblogsConfig::from_file(Some(&path)).is_err());
        assert!(CblogsConfig::from_file_or_new(Some(&path)).is_err());
    }

    #[test]
    fn malformed_file_names_the_path() {
        let path = std::env::temp_dir().join(format!("cblogs-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "page_limit = \"many\"").unwrap();

        let err = CblogsConfig::from_file(Some(&path)).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(format!("{err:#}").contains("Failed to parse config file"));
    }

    #[test]
    fn none_path() {
        let config = CblogsConfig::from_file(None).unwrap();
        assert_eq!(config.path.unwrap(), CONFIG_FILE.as_path().to_path_buf());
    }

    #[test]
    fn test_write_to_file() {
        let path = std::env::temp_dir().join(format!("cblogs-test-{}.toml", std::process::id()));
        let config = CblogsConfig {
            profile: Some("ci".to_string()),
            region: Some("us-east-1".to_string()),
            page_limit: None,
            path: Some(path.clone()),
        };
        config.write_to_file().unwrap();

        let loaded = CblogsConfig::from_file(Some(&path)).unwrap();
        assert_eq!(loaded.profile.as_deref(), Some("ci"));
        assert_eq!(loaded.region.as_deref(), Some("us-east-1"));
        std::fs::remove_file(&path).unwrap();
    }
}
