use hielera_domain::{DomainError, DomainResult, Reading};
use serde::{Deserialize, Deserializer, Serialize};

/// Per-device sensor payload as sent by the gateway
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SensorPayload {
    /// Gateways send either string or numeric ids; both normalise to a string
    #[serde(deserialize_with = "deserialize_device_id")]
    pub id: String,
    pub temp: f64,
    pub hum: f64,
    pub ethylene: f64,
}

impl SensorPayload {
    pub fn from_value(value: serde_json::Value) -> DomainResult<Self> {
        serde_json::from_value(value).map_err(|e| DomainError::MalformedMessage(e.to_string()))
    }

    /// Stamp the payload with its ingestion time
    pub fn into_reading(self) -> Reading {
        Reading::observed_now(self.id, self.temp, self.hum, self.ethylene)
    }
}

/// Messages received from the gateway, keyed by their `type` field
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    Welcome,
    /// Bulk state of every active hielera. Entries stay undecoded so a single
    /// bad entry does not discard the rest.
    CurrentState {
        total: u64,
        hieleras: Vec<serde_json::Value>,
    },
    SensorUpdate {
        data: SensorPayload,
    },
    #[serde(other)]
    Unknown,
}

/// Messages sent to the gateway
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    Register { client: String },
}

/// Decode one text frame
pub fn decode_message(text: &str) -> DomainResult<InboundMessage> {
    serde_json::from_str(text).map_err(|e| DomainError::MalformedMessage(e.to_string()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireDeviceId {
    Text(String),
    Integer(i64),
}

fn deserialize_device_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match WireDeviceId::deserialize(deserializer)? {
        WireDeviceId::Text(id) => id,
        WireDeviceId::Integer(id) => id.to_string(),
    })
}
