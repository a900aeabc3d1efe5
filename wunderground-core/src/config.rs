use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::client::ClientOptions;

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// api_key = "..."
/// state = "CA"
/// city = "San_Francisco"
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,

    /// Default state code, used when none is given on the command line.
    pub state: Option<String>,

    /// Default city, used when none is given on the command line.
    pub city: Option<String>,

    /// Override for the API host, e.g. a local mock.
    pub base_url: Option<String>,

    pub timeout_secs: Option<u64>,

    /// Skip TLS certificate validation. Off unless explicitly enabled.
    pub accept_invalid_certs: bool,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Like [`Config::load`], but an unreadable or corrupt file is logged and
    /// treated as empty, so command-line values still work.
    pub fn load_or_default() -> Self {
        match Self::config_file_path() {
            Ok(path) => Self::load_or_default_from(&path),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring configuration");
                Self::default()
            }
        }
    }

    pub fn load_or_default_from(path: &std::path::Path) -> Self {
        Self::load_from(path).unwrap_or_else(|err| {
            tracing::warn!("ignoring configuration: {err:#}");
            Self::default()
        })
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "wunderground", "wunderground-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty()).ok_or_else(|| {
            anyhow!(
                "No API key configured.\n\
                 Hint: run `wunderground configure` and enter your API key."
            )
        })
    }

    /// Resolve the location to query: explicit values win over stored defaults.
    pub fn location<'a>(
        &'a self,
        state: Option<&'a str>,
        city: Option<&'a str>,
    ) -> Result<(&'a str, &'a str)> {
        let state = state.or(self.state.as_deref()).ok_or_else(|| {
            anyhow!(
                "No state given and no default state configured.\n\
                 Hint: pass a state code (e.g. `wunderground show CA San_Francisco`) \
                 or run `wunderground configure`."
            )
        })?;
        let city = city.or(self.city.as_deref()).ok_or_else(|| {
            anyhow!(
                "No city given and no default city configured.\n\
                 Hint: pass a city (e.g. `wunderground show CA San_Francisco`) \
                 or run `wunderground configure`."
            )
        })?;

        Ok((state, city))
    }

    pub fn client_options(&self) -> ClientOptions {
        let mut options = ClientOptions {
            accept_invalid_certs: self.accept_invalid_certs,
            ..ClientOptions::default()
        };
        if let Some(base_url) = &self.base_url {
            options.base_url = base_url.clone();
        }
        if let Some(secs) = self.timeout_secs {
            options.timeout = Duration::from_secs(secs);
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::DEFAULT_BASE_URL;

    #[test]
    fn api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.api_key().unwrap_err();

        assert!(err.to_string().contains("No API key configured"));
        assert!(err.to_string().contains("Hint: run `wunderground configure`"));
    }

    #[test]
    fn empty_api_key_counts_as_missing() {
        let cfg = Config { api_key: Some(String::new()), ..Default::default() };
        assert!(cfg.api_key().is_err());
    }

    #[test]
    fn explicit_location_overrides_defaults() {
        let cfg = Config {
            state: Some("CA".into()),
            city: Some("San_Francisco".into()),
            ..Default::default()
        };

        assert_eq!(cfg.location(None, None).unwrap(), ("CA", "San_Francisco"));
        assert_eq!(cfg.location(Some("NY"), None).unwrap(), ("NY", "San_Francisco"));
        assert_eq!(cfg.location(Some("OR"), Some("Portland")).unwrap(), ("OR", "Portland"));
    }

    #[test]
    fn location_errors_when_nothing_known() {
        let cfg = Config::default();

        let err = cfg.location(None, Some("Portland")).unwrap_err();
        assert!(err.to_string().contains("No state given"));

        let err = cfg.location(Some("OR"), None).unwrap_err();
        assert!(err.to_string().contains("No city given"));
    }

    #[test]
    fn client_options_follow_config() {
        let options = Config::default().client_options();
        assert_eq!(options, ClientOptions::default());
        assert_eq!(options.base_url, DEFAULT_BASE_URL);
        assert!(!options.accept_invalid_certs);

        let cfg = Config {
            base_url: Some("http://localhost:9000".into()),
            timeout_secs: Some(3),
            accept_invalid_certs: true,
            ..Default::default()
        };
        let options = cfg.client_options();
        assert_eq!(options.base_url, "http://localhost:9000");
        assert_eq!(options.timeout, Duration::from_secs(3));
        assert!(options.accept_invalid_certs);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join(format!("wunderground-config-{}", std::process::id()));
        let path = dir.join("nested").join("config.toml");

        let cfg = Config {
            api_key: Some("KEY".into()),
            state: Some("CA".into()),
            city: Some("San_Francisco".into()),
            ..Default::default()
        };
        cfg.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), cfg);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn corrupt_file_is_an_error_unless_lenient() {
        let dir = std::env::temp_dir().join(format!("wunderground-corrupt-{}", std::process::id()));
        let path = dir.join("config.toml");
        fs::create_dir_all(&dir).unwrap();
        fs::write(&path, "api_key = [unterminated").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
        assert_eq!(Config::load_or_default_from(&path), Config::default());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_loads_default() {
        let path = std::env::temp_dir().join("wunderground-does-not-exist").join("config.toml");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }
}
