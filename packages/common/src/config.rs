use std::time::Duration;

use serde::Deserialize;

/// REST backend connection settings.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiAppConfig {
    /// Base URL every endpoint path is joined onto. Default: "http://localhost:8080/api".
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    /// Per-request timeout in milliseconds. Default: 30000.
    #[serde(default = "default_api_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// How many times an idempotent GET is retried after the first failure. Default: 3.
    #[serde(default = "default_api_retry_count")]
    pub retry_count: u8,
    /// Base delay for exponential backoff between retries. Default: 500.
    #[serde(default = "default_api_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    /// Upper bound on a single backoff delay. Default: 5000.
    #[serde(default = "default_api_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

fn default_api_base_url() -> String {
    "http://localhost:8080/api".into()
}
fn default_api_request_timeout_ms() -> u64 {
    30_000
}
fn default_api_retry_count() -> u8 {
    3
}
fn default_api_retry_base_delay_ms() -> u64 {
    500
}
fn default_api_retry_max_delay_ms() -> u64 {
    5_000
}

impl ApiAppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ApiAppConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            request_timeout_ms: default_api_request_timeout_ms(),
            retry_count: default_api_retry_count(),
            retry_base_delay_ms: default_api_retry_base_delay_ms(),
            retry_max_delay_ms: default_api_retry_max_delay_ms(),
        }
    }
}

/// Timer settings for a team dashboard session.
///
/// The countdown always ticks once per second and is not configurable.
#[derive(Debug, Deserialize, Clone)]
pub struct DashboardAppConfig {
    /// Seconds between reconciliation polls. Default: 30. Zero is treated as 1.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Seconds between admin status checks when auto-closing. Default: 300. Zero is
    /// treated as 1.
    #[serde(default = "default_admin_poll_interval_secs")]
    pub admin_poll_interval_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    30
}
fn default_admin_poll_interval_secs() -> u64 {
    300
}

impl DashboardAppConfig {
    /// Never zero; `tokio::time::interval` rejects a zero period.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    /// Never zero.
    pub fn admin_poll_interval(&self) -> Duration {
        Duration::from_secs(self.admin_poll_interval_secs.max(1))
    }
}

impl Default for DashboardAppConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            admin_poll_interval_secs: default_admin_poll_interval_secs(),
        }
    }
}

/// Credentials used when none are passed on the command line.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthAppConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}
