use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "fintrack.toml";

/// Runtime settings: optional TOML file, then `FINTRACK_*` environment
/// variables, then command-line overrides applied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// SQLite database file
    pub database: String,
    /// Log filter for the `fintrack` target (e.g. "info", "debug")
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: "fintrack.db".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

impl Settings {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let config_path = config_path.unwrap_or(DEFAULT_CONFIG_PATH);
        config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("FINTRACK"))
            .build()
            .and_then(|settings| settings.try_deserialize())
            .with_context(|| format!("Failed to load configuration from {config_path}"))
    }

    /// Filter directive for `tracing_subscriber::EnvFilter`.
    pub fn log_filter(&self) -> String {
        format!("fintrack={}", self.log_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        let settings = Settings::load(path.to_str()).unwrap();
        assert_eq!(settings.database, Settings::default().database);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("fintrack.toml");
        std::fs::write(&path, "database = \"/tmp/money.db\"\nlog_level = \"debug\"\n").unwrap();

        let settings = Settings::load(path.to_str()).unwrap();
        assert_eq!(settings.database, "/tmp/money.db");
        assert_eq!(settings.log_filter(), "fintrack=debug");
    }
}
