//! Configuration loading for tangled-mcp
//!
//! Configuration is loaded from:
//! 1. Environment variables TANGLED_HANDLE, TANGLED_PASSWORD, TANGLED_PDS_URL,
//!    TANGLED_TIMEOUT_SECS
//! 2. Environment variable TANGLED_CONFIG_PATH
//! 3. ~/.binks/tangled.toml
//! 4. Default values

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Main configuration structure
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Account used to write records
    #[serde(default)]
    pub account: AccountConfig,
    /// Tangled network endpoints and scan settings
    #[serde(default)]
    pub tangled: TangledConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Handle or DID to log in as
    #[serde(default)]
    pub handle: String,
    /// App password
    #[serde(default)]
    pub password: String,
    /// PDS hosting the account
    #[serde(default = "default_pds_url")]
    pub pds_url: String,
    /// Timeout for every outbound request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Session lifetime when the access token carries no expiry
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TangledConfig {
    /// Web frontend used for result links
    #[serde(default = "default_appview_url")]
    pub appview_url: String,
    /// Audience for knot service tokens
    #[serde(default = "default_service_did")]
    pub service_did: String,
    /// Page size for repository lookups and number scans
    #[serde(default = "default_scan_limit")]
    pub scan_limit: u32,
}

fn default_pds_url() -> String {
    "https://bsky.social".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_session_ttl_secs() -> u64 {
    30 * 60
}

fn default_appview_url() -> String {
    "https://tangled.org".to_string()
}

fn default_service_did() -> String {
    "did:web:tangled.org".to_string()
}

fn default_scan_limit() -> u32 {
    100
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            handle: String::new(),
            password: String::new(),
            pds_url: default_pds_url(),
            timeout_secs: default_timeout_secs(),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

impl Default for TangledConfig {
    fn default() -> Self {
        Self {
            appview_url: default_appview_url(),
            service_did: default_service_did(),
            scan_limit: default_scan_limit(),
        }
    }
}

impl fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountConfig")
            .field("handle", &self.handle)
            .field("password", &"<redacted>")
            .field("pds_url", &self.pds_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .finish()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("account", &self.account)
            .field("tangled", &self.tangled)
            .finish()
    }
}

impl Config {
    /// Load configuration from file and environment, then validate it
    pub fn load() -> Result<Self> {
        let env = |key: &str| std::env::var(key).ok();
        let config = Self::load_with(Self::find_config_path().as_deref(), env)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` (if it exists) and apply overrides from `env`
    pub fn load_with(path: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                tracing::info!("Loading config from: {}", path.display());
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?
            }
            Some(_) => {
                tracing::info!("Config file not found, using defaults");
                Self::default()
            }
            None => {
                tracing::info!("No config path specified, using defaults");
                Self::default()
            }
        };

        if let Some(handle) = env("TANGLED_HANDLE") {
            config.account.handle = handle;
        }
        if let Some(password) = env("TANGLED_PASSWORD") {
            config.account.password = password;
        }
        if let Some(url) = env("TANGLED_PDS_URL") {
            config.account.pds_url = url;
        }
        if let Some(secs) = env("TANGLED_TIMEOUT_SECS") {
            config.account.timeout_secs = secs
                .parse()
                .with_context(|| format!("TANGLED_TIMEOUT_SECS is not a number: '{}'", secs))?;
        }

        Ok(config)
    }

    /// Reject configurations the server cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.account.handle.trim().is_empty() {
            bail!("no account handle configured (set TANGLED_HANDLE or account.handle)");
        }
        if self.account.password.is_empty() {
            bail!("no app password configured (set TANGLED_PASSWORD or account.password)");
        }
        if self.account.timeout_secs == 0 {
            bail!("timeout_secs must be at least 1");
        }
        for (key, value) in [
            ("account.pds_url", &self.account.pds_url),
            ("tangled.appview_url", &self.tangled.appview_url),
        ] {
            let parsed =
                Url::parse(value).with_context(|| format!("{} is not a URL: '{}'", key, value))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                bail!("{} must be http or https, got '{}'", key, value);
            }
        }
        if !(1..=100).contains(&self.tangled.scan_limit) {
            bail!(
                "scan_limit must be between 1 and 100, got {}",
                self.tangled.scan_limit
            );
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.account.timeout_secs)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.account.session_ttl_secs)
    }

    /// Find the configuration file path
    fn find_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("TANGLED_CONFIG_PATH") {
            return Some(PathBuf::from(path));
        }

        if let Ok(home) = std::env::var("HOME") {
            return Some(PathBuf::from(home).join(".binks").join("tangled.toml"));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::load_with(None, env_of(&[])).unwrap();
        assert_eq!(config.account.pds_url, "https://bsky.social");
        assert_eq!(config.account.timeout_secs, 10);
        assert_eq!(config.tangled.appview_url, "https://tangled.org");
        assert_eq!(config.tangled.service_did, "did:web:tangled.org");
        assert_eq!(config.tangled.scan_limit, 100);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_file_then_env_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[account]
handle = "me.test"
password = "from-file"
pds_url = "https://pds.example"

[tangled]
scan_limit = 50
"#
        )
        .unwrap();

        let config = Config::load_with(
            Some(file.path()),
            env_of(&[("TANGLED_PASSWORD", "from-env"), ("TANGLED_TIMEOUT_SECS", "3")]),
        )
        .unwrap();

        assert_eq!(config.account.handle, "me.test");
        assert_eq!(config.account.password, "from-env");
        assert_eq!(config.account.pds_url, "https://pds.example");
        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert_eq!(config.tangled.scan_limit, 50);
        assert_eq!(config.tangled.service_did, "did:web:tangled.org");
        config.validate().unwrap();
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_with(
            Some(dir.path().join("absent.toml").as_path()),
            env_of(&[("TANGLED_HANDLE", "me.test"), ("TANGLED_PASSWORD", "pw")]),
        )
        .unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn test_validation_errors() {
        let mut config = Config::default();
        config.account.handle = "me.test".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("TANGLED_PASSWORD"));

        config.account.password = "pw".into();
        config.tangled.scan_limit = 500;
        assert!(config.validate().is_err());

        config.tangled.scan_limit = 100;
        config.account.pds_url = "bsky.social".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("account.pds_url"));

        config.account.pds_url = "ftp://bsky.social".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_timeout_env() {
        let err = Config::load_with(None, env_of(&[("TANGLED_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(err.to_string().contains("soon"));
    }

    #[test]
    fn test_debug_hides_password() {
        let mut config = Config::default();
        config.account.password = "hunter2".into();
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
