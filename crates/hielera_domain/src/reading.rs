use chrono::{DateTime, Utc};

/// A single sensor observation from one hielera.
///
/// Fields are private so a reading cannot be altered after it has been
/// routed into a [`DeviceHistory`](crate::DeviceHistory). Environmental values
/// are stored as reported; out-of-range values are kept and flow through the
/// shelf-life model unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    device_id: String,
    temperature: f64,
    humidity: f64,
    ethylene: f64,
    observed_at: DateTime<Utc>,
}

impl Reading {
    pub fn new(
        device_id: impl Into<String>,
        temperature: f64,
        humidity: f64,
        ethylene: f64,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            temperature,
            humidity,
            ethylene,
            observed_at,
        }
    }

    /// Build a reading stamped with the current ingestion time
    pub fn observed_now(
        device_id: impl Into<String>,
        temperature: f64,
        humidity: f64,
        ethylene: f64,
    ) -> Self {
        Self::new(device_id, temperature, humidity, ethylene, Utc::now())
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Degrees Celsius
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Relative humidity, percent
    pub fn humidity(&self) -> f64 {
        self.humidity
    }

    /// Ethylene concentration, ppm
    pub fn ethylene(&self) -> f64 {
        self.ethylene
    }

    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }
}
