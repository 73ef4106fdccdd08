//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Lifecycle reconciliation configuration.
    #[serde(default)]
    pub reconciliation: ReconciliationConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Settings for validating caller credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Shared secret of the identity provider (HS256).
    pub secret: String,
    /// Clock skew tolerated when checking `exp`, in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_secs: u64,
}

fn default_leeway() -> u64 {
    30
}

/// Reconciliation engine settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconciliationConfig {
    /// Maximum number of record updates in flight per batch.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Interval of the scheduled sweep over all organizations. `0` disables it.
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
}

fn default_concurrency() -> usize {
    8
}

fn default_interval() -> u64 {
    3600 // hourly
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            interval_secs: default_interval(),
        }
    }
}

impl ReconciliationConfig {
    /// Returns the concurrency, never less than one worker.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.concurrency.max(1)
    }

    /// Returns true if the scheduled sweep should run.
    #[must_use]
    pub const fn schedule_enabled(&self) -> bool {
        self.interval_secs > 0
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FIELDOPS").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(toml: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let cfg = from_toml(
            r#"
            [server]
            [database]
            url = "postgres://localhost/fieldops"
            [jwt]
            secret = "s3cret"
            "#,
        );

        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.database.max_connections, 10);
        assert_eq!(cfg.jwt.leeway_secs, 30);
        assert_eq!(cfg.reconciliation.concurrency, 8);
        assert!(cfg.reconciliation.schedule_enabled());
    }

    #[test]
    fn test_reconciliation_overrides() {
        let cfg = from_toml(
            r#"
            [server]
            port = 9000
            [database]
            url = "postgres://localhost/fieldops"
            [jwt]
            secret = "s3cret"
            [reconciliation]
            concurrency = 0
            interval_secs = 0
            "#,
        );

        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.reconciliation.workers(), 1);
        assert!(!cfg.reconciliation.schedule_enabled());
    }
}
