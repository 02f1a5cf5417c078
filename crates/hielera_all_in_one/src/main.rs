mod config;
mod telemetry;

use config::ServiceConfig;
use file_export::{CsvSnapshotExporter, OutputDir, SvgTrendChartRenderer, TextReportWriter};
use hielera_runner::Runner;
use ingestion_worker::{
    IngestionWorker, IngestionWorkerConfig, PipelineConfig, ReportingCollaborators,
    SubscriberConfig,
};
use std::sync::Arc;
use telemetry::{init_telemetry, TelemetryConfig};
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_telemetry(&TelemetryConfig {
        log_level: config.log_level.clone(),
        trace_log_path: config.trace_log_path().map(str::to_string),
    }) {
        eprintln!("Failed to initialize telemetry: {:#}", e);
        std::process::exit(1);
    }

    info!(
        websocket_url = %config.websocket_url,
        output_dir = %config.output_dir,
        "Starting hielera-all-in-one service"
    );
    debug!("Configuration: {:?}", config);

    let product = match config.product() {
        Ok(product) => product,
        Err(e) => {
            error!("Invalid product: {}", e);
            std::process::exit(1);
        }
    };

    let output_dir = OutputDir::new(&config.output_dir);
    if let Err(e) = output_dir.ensure_exists() {
        error!("Failed to prepare output directory: {}", e);
        std::process::exit(1);
    }

    let collaborators = ReportingCollaborators {
        chart_renderer: Arc::new(SvgTrendChartRenderer::new(output_dir.clone())),
        snapshot_exporter: Arc::new(CsvSnapshotExporter::new(output_dir.clone())),
        report_writer: Arc::new(TextReportWriter::new(output_dir)),
    };

    let ingestion_worker = match IngestionWorker::new(
        collaborators,
        IngestionWorkerConfig {
            pipeline: PipelineConfig {
                client_name: config.client_name.clone(),
                product,
                chart_every: config.chart_every,
                report_every: config.report_every,
            },
            subscriber: SubscriberConfig {
                websocket_url: config.websocket_url.clone(),
                reconnect_delay_secs: config.reconnect_delay_secs,
            },
        },
    ) {
        Ok(worker) => worker,
        Err(e) => {
            error!("Failed to initialize ingestion worker: {:#}", e);
            std::process::exit(1);
        }
    };

    let outcome = Runner::new()
        .with_named_process("ingestion_worker", ingestion_worker.into_runner_process())
        .with_closer(move || {
            Box::pin(async move {
                info!("Running cleanup tasks...");
                Ok(())
            })
        })
        .with_closer_timeout(config.shutdown_timeout())
        .run()
        .await;

    std::process::exit(outcome.exit_code());
}
