//! Outbound seams for the effects triggered by the ingestion pipeline.
//!
//! Implementations live outside the domain (e.g. the `file_export` crate).
//! Every method reports failure through [`DomainResult`]; the pipeline logs
//! failures and keeps ingesting.

use crate::error::DomainResult;
use crate::reading::Reading;
use crate::statistics::Report;

/// One exported row: a stored reading plus its derived shelf life
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRow {
    pub reading: Reading,
    pub shelf_life_days: f64,
}

/// Produces a visual trend artifact for one device
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TrendChartRenderer: Send + Sync {
    /// `shelf_life_days` holds one estimate per reading in `snapshot`, in the
    /// same order.
    fn render_trend_chart(
        &self,
        device_id: &str,
        snapshot: &[Reading],
        shelf_life_days: &[f64],
    ) -> DomainResult<()>;
}

/// Persists the tabular history of one device
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait SnapshotExporter: Send + Sync {
    fn export_snapshot(&self, device_id: &str, rows: &[SnapshotRow]) -> DomainResult<()>;
}

/// Persists a human-readable statistics report
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait ReportWriter: Send + Sync {
    fn write_report(&self, device_id: &str, report: &Report) -> DomainResult<()>;
}
