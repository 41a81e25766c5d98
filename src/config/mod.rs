use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub oauth: OAuthConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Prefix of every backend endpoint, e.g. `http://localhost:8082/api/v0`
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Pause on the OAuth success screen before going home.
    pub home_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Overrides the default `~/.config/matchmaker/portal`
    pub config_dir: Option<PathBuf>,
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl OAuthConfig {
    pub fn home_delay(&self) -> Duration {
        Duration::from_millis(self.home_delay_ms)
    }
}

impl PortalConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("PORTAL_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("PORTAL_API_URL") {
            self.api.base_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("PORTAL_REQUEST_TIMEOUT_SECS") {
            self.api.request_timeout_secs = v.parse().unwrap_or(self.api.request_timeout_secs);
        }
        if let Ok(v) = env::var("PORTAL_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("PORTAL_OAUTH_HOME_DELAY_MS") {
            self.oauth.home_delay_ms = v.parse().unwrap_or(self.oauth.home_delay_ms);
        }
        if let Ok(v) = env::var("PORTAL_CONFIG_DIR") {
            self.storage.config_dir = Some(PathBuf::from(v));
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:8082/api/v0".to_string(),
                request_timeout_secs: 30,
                enable_request_logging: true,
            },
            oauth: OAuthConfig { home_delay_ms: 2000 },
            storage: StorageConfig { config_dir: None },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: "https://staging.example.com/api/v0".to_string(),
                request_timeout_secs: 15,
                enable_request_logging: true,
            },
            oauth: OAuthConfig { home_delay_ms: 2000 },
            storage: StorageConfig { config_dir: None },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "https://app.example.com/api/v0".to_string(),
                request_timeout_secs: 10,
                enable_request_logging: false,
            },
            oauth: OAuthConfig { home_delay_ms: 2000 },
            storage: StorageConfig { config_dir: None },
        }
    }

    /// Directory holding the persisted session, created if missing.
    pub fn config_dir(&self) -> anyhow::Result<PathBuf> {
        let config_dir = match &self.storage.config_dir {
            Some(dir) => dir.clone(),
            None => {
                let home = env::var("HOME")
                    .map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
                PathBuf::from(home).join(".config").join("matchmaker").join("portal")
            }
        };

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }

        Ok(config_dir)
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<PortalConfig> = Lazy::new(PortalConfig::from_env);

pub fn config() -> &'static PortalConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = PortalConfig::development();
        assert_eq!(config.api.base_url, "http://localhost:8082/api/v0");
        assert_eq!(config.oauth.home_delay(), Duration::from_secs(2));
        assert!(config.api.enable_request_logging);
    }

    #[test]
    fn test_default_production_config() {
        let config = PortalConfig::production();
        assert!(config.api.base_url.starts_with("https://"));
        assert!(!config.api.enable_request_logging);
        assert_eq!(config.api.request_timeout(), Duration::from_secs(10));
    }
}
