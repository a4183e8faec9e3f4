use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for the meditrack shell
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MeditrackConfig {
    /// Clinic service connection
    pub service: ServiceConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the clinic service
    pub base_url: String,
    /// Per-request timeout; unset means wait for the service indefinitely
    pub request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter directive (overridden by RUST_LOG)
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            request_timeout_seconds: None,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl Default for MeditrackConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl ServiceConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_seconds.map(Duration::from_secs)
    }
}

impl MeditrackConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (meditrack.toml, .meditrack-rc)
    /// 3. Environment variables (prefixed with MEDITRACK_, nested with __)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Same as [`MeditrackConfig::load`] but looks for files under `dir`
    pub fn load_from(dir: &Path) -> Result<Self> {
        let mut builder = Config::builder();

        let toml_path = dir.join("meditrack.toml");
        if toml_path.exists() {
            builder = builder.add_source(File::from(toml_path));
        }

        let rc_path = dir.join(".meditrack-rc");
        if rc_path.exists() {
            builder = builder.add_source(File::from(rc_path).format(config::FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("MEDITRACK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let meditrack_config: MeditrackConfig = config.try_deserialize()?;
        Ok(meditrack_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists. Returns whether one was loaded.
    pub fn load_env_file() -> Result<bool> {
        Self::load_env_file_from(Path::new("."))
    }

    pub fn load_env_file_from(dir: &Path) -> Result<bool> {
        let env_path = dir.join(".env");
        if !env_path.exists() {
            return Ok(false);
        }
        dotenvy::from_path(&env_path)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = MeditrackConfig::load_from(dir.path()).unwrap();

        assert_eq!(config.service.base_url, "http://localhost:8080");
        assert_eq!(config.service.request_timeout(), None);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("meditrack.toml"),
            "[service]\nbase_url = \"http://clinic.local:9000\"\nrequest_timeout_seconds = 15\n",
        )
        .unwrap();

        let config = MeditrackConfig::load_from(dir.path()).unwrap();

        assert_eq!(config.service.base_url, "http://clinic.local:9000");
        assert_eq!(config.service.request_timeout(), Some(Duration::from_secs(15)));
        assert!(!config.observability.json_logs);
    }

    #[test]
    fn test_save_round_trips_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = MeditrackConfig::default();
        config.observability.json_logs = true;
        config.save_to_file(dir.path().join("meditrack.toml")).unwrap();

        let loaded = MeditrackConfig::load_from(dir.path()).unwrap();
        assert!(loaded.observability.json_logs);
    }

    #[test]
    fn test_env_file_is_reported_when_loaded() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!MeditrackConfig::load_env_file_from(dir.path()).unwrap());

        std::fs::write(dir.path().join(".env"), "MEDITRACK_ENV_FILE_MARKER=present\n").unwrap();
        assert!(MeditrackConfig::load_env_file_from(dir.path()).unwrap());
        assert_eq!(std::env::var("MEDITRACK_ENV_FILE_MARKER").unwrap(), "present");
    }
}
