//! Descriptive statistics over a device history.
//!
//! Everything here is pure computation. Persisting a [`Report`] is left to a
//! [`ReportWriter`](crate::ReportWriter).

use crate::device_history::DeviceHistory;
use crate::shelf_life::ShelfLifeEstimator;
use chrono::{DateTime, Utc};

/// Summary of one numeric series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldStatistics {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator). `None` below two samples.
    pub std_dev: Option<f64>,
    pub min: f64,
    pub max: f64,
}

impl FieldStatistics {
    /// Returns `None` for an empty series
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;

        let std_dev = if count < 2 {
            None
        } else {
            let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            Some((sum_sq / (count - 1) as f64).sqrt())
        };

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            count,
            mean,
            std_dev,
            min,
            max,
        })
    }
}

/// Statistics report for one hielera
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub device_id: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub record_count: usize,
    pub temperature: FieldStatistics,
    pub humidity: FieldStatistics,
    pub ethylene: FieldStatistics,
    pub shelf_life_days: FieldStatistics,
}

/// Computes a [`Report`] from a history, deriving the shelf-life series with
/// the configured estimator.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatisticsReporter {
    estimator: ShelfLifeEstimator,
}

impl StatisticsReporter {
    pub fn new(estimator: ShelfLifeEstimator) -> Self {
        Self { estimator }
    }

    /// Summarize every reading in the history. An empty history has nothing
    /// to report and yields `None`.
    pub fn summarize(&self, history: &DeviceHistory) -> Option<Report> {
        let readings = history.snapshot();

        let temperatures: Vec<f64> = readings.iter().map(|r| r.temperature()).collect();
        let humidities: Vec<f64> = readings.iter().map(|r| r.humidity()).collect();
        let ethylenes: Vec<f64> = readings.iter().map(|r| r.ethylene()).collect();
        let shelf_life = self.estimator.estimate_series(readings);

        let period_start = readings.iter().map(|r| r.observed_at()).min()?;
        let period_end = readings.iter().map(|r| r.observed_at()).max()?;

        Some(Report {
            device_id: history.device_id().to_string(),
            period_start,
            period_end,
            record_count: readings.len(),
            temperature: FieldStatistics::from_values(&temperatures)?,
            humidity: FieldStatistics::from_values(&humidities)?,
            ethylene: FieldStatistics::from_values(&ethylenes)?,
            shelf_life_days: FieldStatistics::from_values(&shelf_life)?,
        })
    }
}
