use crate::reading::Reading;

/// Append-only, arrival-ordered readings for one hielera.
///
/// Routing by device id is the caller's job; appending a reading for a
/// different device is a contract violation and trips a debug assertion.
#[derive(Debug, Clone)]
pub struct DeviceHistory {
    device_id: String,
    readings: Vec<Reading>,
}

impl DeviceHistory {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            readings: Vec::new(),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Append a reading and return the updated count
    pub fn append(&mut self, reading: Reading) -> usize {
        debug_assert_eq!(
            reading.device_id(),
            self.device_id,
            "reading routed to the wrong device history"
        );
        self.readings.push(reading);
        self.readings.len()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Read-only view of every reading in arrival order
    pub fn snapshot(&self) -> &[Reading] {
        &self.readings
    }
}
