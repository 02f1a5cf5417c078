use crate::domain::{IngestionPipeline, PipelineConfig, ReportingCollaborators, SubscriberConfig};
use crate::websocket::{run_websocket_subscriber, validate_websocket_url};
use hielera_domain::HistoryStore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub struct IngestionWorkerConfig {
    pub pipeline: PipelineConfig,
    pub subscriber: SubscriberConfig,
}

/// Wires a fresh history store and the reporting collaborators into an
/// ingestion pipeline and exposes it as a runner process.
pub struct IngestionWorker {
    pipeline: IngestionPipeline,
    subscriber_config: SubscriberConfig,
}

impl IngestionWorker {
    pub fn new(
        collaborators: ReportingCollaborators,
        config: IngestionWorkerConfig,
    ) -> anyhow::Result<Self> {
        debug!("initializing ingestion worker");

        validate_websocket_url(&config.subscriber.websocket_url)?;

        let product = config.pipeline.product;
        let chart_every = config.pipeline.chart_every;
        let report_every = config.pipeline.report_every;
        let pipeline = IngestionPipeline::new(config.pipeline, HistoryStore::new(), collaborators)?;

        info!(
            product = %product,
            baseline_days = product.baseline_days(),
            chart_every,
            report_every,
            "ingestion worker initialized"
        );

        Ok(Self {
            pipeline,
            subscriber_config: config.subscriber,
        })
    }

    #[allow(clippy::type_complexity)]
    pub fn into_runner_process(
        self,
    ) -> Box<
        dyn FnOnce(
                CancellationToken,
            ) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = anyhow::Result<()>> + Send>,
            > + Send,
    > {
        Box::new({
            let pipeline = self.pipeline;
            let subscriber_config = self.subscriber_config;
            move |ctx| {
                Box::pin(async move {
                    let pipeline = run_websocket_subscriber(pipeline, subscriber_config, ctx).await;
                    info!(
                        devices = pipeline.store().device_count(),
                        "ingestion worker finished"
                    );
                    Ok(())
                })
            }
        })
    }
}
