mod csv_exporter;
mod error;
mod output_dir;
mod svg_chart;
mod text_report;

pub use csv_exporter::CsvSnapshotExporter;
pub use error::{FileExportError, FileExportResult};
pub use output_dir::OutputDir;
pub use svg_chart::{render_svg, SvgTrendChartRenderer, MIN_CHART_READINGS};
pub use text_report::{render_report, TextReportWriter};
