//! Four-panel SVG trend chart: temperature, humidity, ethylene and the
//! derived shelf-life series, one polyline per panel.

use crate::error::FileExportResult;
use crate::output_dir::OutputDir;
use hielera_domain::{DomainResult, Reading, TrendChartRenderer};
use std::fmt::Write;
use std::path::Path;
use tracing::{debug, info};

/// Charts with fewer points than this are not rendered
pub const MIN_CHART_READINGS: usize = 3;

const PANEL_WIDTH: f64 = 480.0;
const PANEL_HEIGHT: f64 = 280.0;
const PANEL_MARGIN: f64 = 40.0;
const TITLE_HEIGHT: f64 = 40.0;

struct Panel<'a> {
    title: &'a str,
    unit: &'a str,
    color: &'a str,
    values: Vec<f64>,
}

/// Render the chart document for one device
pub fn render_svg(device_id: &str, snapshot: &[Reading], shelf_life_days: &[f64]) -> String {
    let panels = [
        Panel {
            title: "Temperature",
            unit: "°C",
            color: "rgb(255,127,14)",
            values: snapshot.iter().map(Reading::temperature).collect(),
        },
        Panel {
            title: "Humidity",
            unit: "%",
            color: "rgb(44,160,44)",
            values: snapshot.iter().map(Reading::humidity).collect(),
        },
        Panel {
            title: "Ethylene",
            unit: "ppm",
            color: "rgb(214,39,40)",
            values: snapshot.iter().map(Reading::ethylene).collect(),
        },
        Panel {
            title: "Estimated shelf life",
            unit: "days",
            color: "rgb(31,119,180)",
            values: shelf_life_days.to_vec(),
        },
    ];

    let width = PANEL_WIDTH * 2.0;
    let height = TITLE_HEIGHT + PANEL_HEIGHT * 2.0;
    let device = escape_xml(device_id);

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" font-family="sans-serif">"#
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="26" font-size="18" text-anchor="middle">Conditions - Hielera {device}</text>"#,
        width / 2.0
    );

    for (index, panel) in panels.iter().enumerate() {
        let x = PANEL_WIDTH * (index % 2) as f64;
        let y = TITLE_HEIGHT + PANEL_HEIGHT * (index / 2) as f64;
        write_panel(&mut svg, &device, panel, x, y);
    }

    let _ = writeln!(svg, "</svg>");
    svg
}

fn write_panel(svg: &mut String, device: &str, panel: &Panel<'_>, x: f64, y: f64) {
    let plot_left = x + PANEL_MARGIN;
    let plot_top = y + PANEL_MARGIN;
    let plot_width = PANEL_WIDTH - PANEL_MARGIN * 2.0;
    let plot_height = PANEL_HEIGHT - PANEL_MARGIN * 2.0;

    let finite = panel.values.iter().copied().filter(|v| v.is_finite());
    let min = finite.clone().fold(f64::INFINITY, f64::min);
    let max = finite.fold(f64::NEG_INFINITY, f64::max);
    let (min, max) = match (min.is_finite(), max.is_finite()) {
        (true, true) if max > min => (min, max),
        (true, true) => (min - 1.0, max + 1.0),
        _ => (0.0, 1.0),
    };

    let _ = writeln!(
        svg,
        r#"<text x="{}" y="{}" font-size="13" text-anchor="middle">Hielera {} - {}</text>"#,
        x + PANEL_WIDTH / 2.0,
        y + 24.0,
        device,
        panel.title
    );
    let _ = writeln!(
        svg,
        r##"<rect x="{plot_left}" y="{plot_top}" width="{plot_width}" height="{plot_height}" fill="none" stroke="#ccc"/>"##
    );
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="{}" font-size="10" text-anchor="end">{:.1} {}</text>"#,
        plot_left - 4.0,
        plot_top + 10.0,
        max,
        panel.unit
    );
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="{}" font-size="10" text-anchor="end">{:.1} {}</text>"#,
        plot_left - 4.0,
        plot_top + plot_height,
        min,
        panel.unit
    );

    let last = panel.values.len().saturating_sub(1).max(1) as f64;
    let points: Vec<String> = panel
        .values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .map(|(i, v)| {
            let px = plot_left + plot_width * i as f64 / last;
            let py = plot_top + plot_height * (1.0 - (v - min) / (max - min));
            format!("{:.1},{:.1}", px, py)
        })
        .collect();

    let _ = writeln!(
        svg,
        r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="2"/>"#,
        points.join(" "),
        panel.color
    );
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Writes `hielera_<id>_trend.svg`, replacing the previous chart
#[derive(Debug, Clone)]
pub struct SvgTrendChartRenderer {
    output_dir: OutputDir,
}

impl SvgTrendChartRenderer {
    pub fn new(output_dir: OutputDir) -> Self {
        Self { output_dir }
    }

    fn write_file(path: &Path, content: &str) -> FileExportResult<()> {
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl TrendChartRenderer for SvgTrendChartRenderer {
    fn render_trend_chart(
        &self,
        device_id: &str,
        snapshot: &[Reading],
        shelf_life_days: &[f64],
    ) -> DomainResult<()> {
        if snapshot.len() < MIN_CHART_READINGS {
            debug!(device_id = %device_id, readings = snapshot.len(), "not enough readings to chart");
            return Ok(());
        }

        let path = self.output_dir.device_file(device_id, "trend.svg");
        Self::write_file(&path, &render_svg(device_id, snapshot, shelf_life_days))?;

        info!(device_id = %device_id, path = %path.display(), "trend chart saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readings(n: usize) -> Vec<Reading> {
        (0..n)
            .map(|i| Reading::observed_now("H-01", i as f64, 88.0, 50.0 * i as f64))
            .collect()
    }

    #[test]
    fn test_render_svg_has_four_series() {
        let snapshot = readings(10);
        let shelf_life = vec![90.0; 10];

        let svg = render_svg("H-01", &snapshot, &shelf_life);

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<polyline").count(), 4);
        assert!(svg.contains("Hielera H-01 - Temperature"));
        assert!(svg.contains("Hielera H-01 - Estimated shelf life"));
    }

    #[test]
    fn test_render_svg_escapes_device_id() {
        let svg = render_svg("<A&B>", &readings(3), &[1.0, 2.0, 3.0]);

        assert!(svg.contains("&lt;A&amp;B&gt;"));
        assert!(!svg.contains("<A&B>"));
    }

    #[test]
    fn test_flat_series_stays_inside_plot() {
        let svg = render_svg("H-01", &readings(3), &[90.0, 90.0, 90.0]);
        assert!(!svg.contains("NaN"));
    }

    #[test]
    fn test_renderer_skips_short_history() {
        let root = std::env::temp_dir().join(format!("file_export_svg_short_{}", std::process::id()));
        let dir = OutputDir::new(&root);
        dir.ensure_exists().unwrap();
        let renderer = SvgTrendChartRenderer::new(dir.clone());

        renderer
            .render_trend_chart("H-01", &readings(2), &[90.0, 90.0])
            .unwrap();
        assert!(!dir.device_file("H-01", "trend.svg").exists());

        renderer
            .render_trend_chart("H-01", &readings(3), &[90.0, 90.0, 90.0])
            .unwrap();
        assert!(dir.device_file("H-01", "trend.svg").exists());

        std::fs::remove_dir_all(root).unwrap();
    }
}
