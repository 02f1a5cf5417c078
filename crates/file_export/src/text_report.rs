use crate::error::FileExportResult;
use crate::output_dir::OutputDir;
use hielera_domain::{DomainResult, FieldStatistics, Report, ReportWriter};
use std::fmt::Write;
use std::path::Path;
use tracing::info;

const RULE: &str = "===========================================";

/// Format a statistics report as plain text
pub fn render_report(report: &Report) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "STATISTICS REPORT - HIELERA {}", report.device_id);
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Period: {} to {}",
        report.period_start.format("%Y-%m-%d %H:%M:%S"),
        report.period_end.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(out, "Total records: {}", report.record_count);
    let _ = writeln!(out);

    write_section(&mut out, "TEMPERATURE", &report.temperature, "°C", true);
    write_section(&mut out, "HUMIDITY", &report.humidity, "%", true);
    write_section(&mut out, "ETHYLENE", &report.ethylene, " ppm", true);
    write_section(&mut out, "ESTIMATED SHELF LIFE", &report.shelf_life_days, " days", false);

    let _ = writeln!(out, "{RULE}");
    out
}

fn write_section(
    out: &mut String,
    title: &str,
    stats: &FieldStatistics,
    unit: &str,
    with_std_dev: bool,
) {
    let _ = writeln!(out, "{}:", title);
    let _ = writeln!(out, "  Mean: {:.2}{}", stats.mean, unit);
    if with_std_dev {
        match stats.std_dev {
            Some(std_dev) => {
                let _ = writeln!(out, "  Std. dev.: {:.2}{}", std_dev, unit);
            }
            None => {
                let _ = writeln!(out, "  Std. dev.: n/a");
            }
        }
    }
    let _ = writeln!(out, "  Minimum: {:.2}{}", stats.min, unit);
    let _ = writeln!(out, "  Maximum: {:.2}{}", stats.max, unit);
    let _ = writeln!(out);
}

/// Writes `hielera_<id>_report.txt`, replacing the previous report
#[derive(Debug, Clone)]
pub struct TextReportWriter {
    output_dir: OutputDir,
}

impl TextReportWriter {
    pub fn new(output_dir: OutputDir) -> Self {
        Self { output_dir }
    }

    fn write_file(path: &Path, content: &str) -> FileExportResult<()> {
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl ReportWriter for TextReportWriter {
    fn write_report(&self, device_id: &str, report: &Report) -> DomainResult<()> {
        let path = self.output_dir.device_file(device_id, "report.txt");
        Self::write_file(&path, &render_report(report))?;

        info!(device_id = %device_id, path = %path.display(), "report written");
        Ok(())
    }
}
