use crate::device_history::DeviceHistory;
use crate::reading::Reading;
use std::collections::HashMap;
use tracing::debug;

/// Owned map of device id to accumulated history.
///
/// Starts empty, creates a history the first time a device id is seen and
/// keeps every history for its own lifetime. The ingestion pipeline holds the
/// only mutable handle.
#[derive(Debug, Default)]
pub struct HistoryStore {
    histories: HashMap<String, DeviceHistory>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a reading to its device history, creating the history if needed.
    /// Returns the history after the append.
    pub fn append(&mut self, reading: Reading) -> &DeviceHistory {
        let history = self
            .histories
            .entry(reading.device_id().to_string())
            .or_insert_with_key(|device_id| {
                debug!(device_id = %device_id, "creating history for new device");
                DeviceHistory::new(device_id.clone())
            });
        history.append(reading);
        history
    }

    pub fn get(&self, device_id: &str) -> Option<&DeviceHistory> {
        self.histories.get(device_id)
    }

    pub fn device_count(&self) -> usize {
        self.histories.len()
    }

    /// Device ids in sorted order
    pub fn device_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.histories.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
