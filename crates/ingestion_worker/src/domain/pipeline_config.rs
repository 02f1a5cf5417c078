use hielera_domain::{DomainError, DomainResult, Product};
use std::time::Duration;

/// Client identifier sent in the registration message
pub const DEFAULT_CLIENT_NAME: &str = "python_processor";

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Identifier announced to the gateway after `welcome`
    pub client_name: String,

    /// Product whose baseline calibrates the shelf-life estimate
    pub product: Product,

    /// Render a trend chart every N readings per device (default: 10)
    pub chart_every: usize,

    /// Export data and write a statistics report every N readings per device (default: 20)
    pub report_every: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            product: Product::default(),
            chart_every: 10,
            report_every: 20,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> DomainResult<()> {
        if self.chart_every == 0 {
            return Err(DomainError::InvalidCadence(
                "chart_every must be greater than zero".to_string(),
            ));
        }
        if self.report_every == 0 {
            return Err(DomainError::InvalidCadence(
                "report_every must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Gateway endpoint, `ws://host:port[/path]`
    pub websocket_url: String,

    /// Fixed wait between connection attempts (default: 5 seconds)
    pub reconnect_delay_secs: u64,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            websocket_url: "ws://localhost:8080".to_string(),
            reconnect_delay_secs: 5,
        }
    }
}

impl SubscriberConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }
}
