use config::{Config, ConfigError, Environment};
use hielera_domain::Product;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Append-only JSON trace log; empty disables it
    #[serde(default = "default_trace_log_path")]
    pub trace_log_path: String,

    // WebSocket configuration
    /// Telemetry gateway URL, must be ws://
    #[serde(default = "default_websocket_url")]
    pub websocket_url: String,

    /// Name sent in the register message after the welcome
    #[serde(default = "default_client_name")]
    pub client_name: String,

    /// Wait between reconnect attempts in seconds
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,

    // Reporting configuration
    /// Directory that receives charts, CSV snapshots and text reports
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Product whose baseline shelf life drives the estimates
    #[serde(default = "default_product")]
    pub product: String,

    /// Render a trend chart every N readings per device
    #[serde(default = "default_chart_every")]
    pub chart_every: usize,

    /// Export a snapshot and a report every N readings per device
    #[serde(default = "default_report_every")]
    pub report_every: usize,

    /// Upper bound for closers during shutdown, in seconds
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_trace_log_path() -> String {
    "hieleras_trace.log".to_string()
}

fn default_websocket_url() -> String {
    "ws://localhost:8080".to_string()
}

fn default_client_name() -> String {
    ingestion_worker::DEFAULT_CLIENT_NAME.to_string()
}

fn default_reconnect_delay_secs() -> u64 {
    5
}

fn default_output_dir() -> String {
    "hielera_reports".to_string()
}

fn default_product() -> String {
    Product::default().as_str().to_string()
}

fn default_chart_every() -> usize {
    10
}

fn default_report_every() -> usize {
    20
}

fn default_shutdown_timeout_secs() -> u64 {
    10
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("HIELERA"))
            .build()?
            .try_deserialize()
    }

    pub fn product(&self) -> anyhow::Result<Product> {
        Ok(self.product.parse::<Product>()?)
    }

    pub fn trace_log_path(&self) -> Option<&str> {
        let path = self.trace_log_path.trim();
        (!path.is_empty()).then_some(path)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}
