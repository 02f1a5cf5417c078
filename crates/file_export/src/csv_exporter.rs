use crate::error::FileExportResult;
use crate::output_dir::OutputDir;
use chrono::SecondsFormat;
use hielera_domain::{DomainResult, SnapshotExporter, SnapshotRow};
use serde::Serialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Serialize)]
struct CsvRow {
    timestamp: String,
    temperature: f64,
    humidity: f64,
    ethylene: f64,
    shelf_life_days: f64,
}

impl From<&SnapshotRow> for CsvRow {
    fn from(row: &SnapshotRow) -> Self {
        Self {
            timestamp: row
                .reading
                .observed_at()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            temperature: row.reading.temperature(),
            humidity: row.reading.humidity(),
            ethylene: row.reading.ethylene(),
            shelf_life_days: row.shelf_life_days,
        }
    }
}

/// Writes the full device history to `hielera_<id>_data.csv`, replacing the
/// previous export.
#[derive(Debug, Clone)]
pub struct CsvSnapshotExporter {
    output_dir: OutputDir,
}

impl CsvSnapshotExporter {
    pub fn new(output_dir: OutputDir) -> Self {
        Self { output_dir }
    }

    fn write_rows(path: &Path, rows: &[SnapshotRow]) -> FileExportResult<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for row in rows {
            writer.serialize(CsvRow::from(row))?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl SnapshotExporter for CsvSnapshotExporter {
    fn export_snapshot(&self, device_id: &str, rows: &[SnapshotRow]) -> DomainResult<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let path = self.output_dir.device_file(device_id, "data.csv");
        Self::write_rows(&path, rows)?;

        info!(device_id = %device_id, rows = rows.len(), path = %path.display(), "data exported");
        Ok(())
    }
}
