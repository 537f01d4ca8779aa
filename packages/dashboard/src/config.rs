use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub use common::config::{ApiAppConfig, AuthAppConfig, DashboardAppConfig};

/// Client application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct HackathonAppConfig {
    #[serde(default)]
    pub api: ApiAppConfig,
    #[serde(default)]
    pub dashboard: DashboardAppConfig,
    #[serde(default)]
    pub auth: AuthAppConfig,
}

impl HackathonAppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("HACKATHON_CONFIG").unwrap_or_else(|_| "config/config".to_string());

        let s = Config::builder()
            .set_default("api.base_url", "http://localhost:8080/api")?
            .set_default("api.request_timeout_ms", 30_000_i64)?
            .set_default("api.retry_count", 3_i64)?
            .set_default("api.retry_base_delay_ms", 500_i64)?
            .set_default("api.retry_max_delay_ms", 5_000_i64)?
            .set_default("dashboard.poll_interval_secs", 30_i64)?
            .set_default("dashboard.admin_poll_interval_secs", 300_i64)?
            .add_source(File::with_name(&config_path).required(false))
            .add_source(Environment::with_prefix("HACKATHON").separator("__"))
            .build()?;

        Self::from_config(s)
    }

    /// Deserialize and reject settings that would stall the client.
    pub fn from_config(s: Config) -> Result<Self, ConfigError> {
        let config: Self = s.try_deserialize()?;

        let zero = [
            ("dashboard.poll_interval_secs", config.dashboard.poll_interval_secs),
            (
                "dashboard.admin_poll_interval_secs",
                config.dashboard.admin_poll_interval_secs,
            ),
            ("api.request_timeout_ms", config.api.request_timeout_ms),
        ]
        .into_iter()
        .find(|(_, value)| *value == 0);

        if let Some((key, _)) = zero {
            return Err(ConfigError::Message(format!("{key} must be greater than zero")));
        }
        Ok(config)
    }
}
