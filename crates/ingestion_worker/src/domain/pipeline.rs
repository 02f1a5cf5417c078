use crate::domain::message::{decode_message, InboundMessage, OutboundMessage, SensorPayload};
use crate::domain::pipeline_config::PipelineConfig;
use hielera_domain::{
    DeviceHistory, DomainResult, HistoryStore, ReportWriter, ShelfLifeEstimator, SnapshotExporter, SnapshotRow,
    StatisticsReporter, TrendChartRenderer,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Connection lifecycle as seen by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
    /// Registration was sent; the gateway never acknowledges it
    Registered,
    /// Operator stopped the worker. Terminal.
    Stopped,
}

/// Effectful collaborators invoked at the reporting cadences
#[derive(Clone)]
pub struct ReportingCollaborators {
    pub chart_renderer: Arc<dyn TrendChartRenderer>,
    pub snapshot_exporter: Arc<dyn SnapshotExporter>,
    pub report_writer: Arc<dyn ReportWriter>,
}

/// Decodes gateway messages, accumulates readings per device and triggers
/// charting and reporting.
///
/// The pipeline owns the [`HistoryStore`]; transport code drives it through
/// the transition handlers (`on_connected`, `handle_text`, `on_disconnected`,
/// `stop`) and sends whatever outbound message a handler returns.
pub struct IngestionPipeline {
    state: ConnectionState,
    client_name: String,
    store: HistoryStore,
    reporting: ReportingSchedule,
}

struct ReportingSchedule {
    chart_every: usize,
    report_every: usize,
    estimator: ShelfLifeEstimator,
    reporter: StatisticsReporter,
    collaborators: ReportingCollaborators,
}

impl IngestionPipeline {
    /// Fails with `InvalidCadence` when either cadence is zero.
    pub fn new(
        config: PipelineConfig,
        store: HistoryStore,
        collaborators: ReportingCollaborators,
    ) -> DomainResult<Self> {
        config.validate()?;

        let estimator = ShelfLifeEstimator::new(config.product);
        Ok(Self {
            state: ConnectionState::Disconnected,
            client_name: config.client_name,
            store,
            reporting: ReportingSchedule {
                chart_every: config.chart_every,
                report_every: config.report_every,
                estimator,
                reporter: StatisticsReporter::new(estimator),
                collaborators,
            },
        })
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    pub fn is_stopped(&self) -> bool {
        self.state == ConnectionState::Stopped
    }

    pub fn on_connected(&mut self) {
        if self.is_stopped() {
            return;
        }
        info!("connection to gateway established");
        self.state = ConnectionState::Connected;
    }

    pub fn on_disconnected(&mut self) {
        if self.is_stopped() {
            return;
        }
        info!(previous_state = ?self.state, "connection to gateway lost");
        self.state = ConnectionState::Disconnected;
    }

    pub fn stop(&mut self) {
        if !self.is_stopped() {
            info!("ingestion pipeline stopped by operator");
        }
        self.state = ConnectionState::Stopped;
    }

    /// Handle one text frame. Malformed frames are logged and dropped without
    /// touching any history.
    pub fn handle_text(&mut self, text: &str) -> Option<OutboundMessage> {
        if self.is_stopped() {
            debug!("pipeline stopped, ignoring frame");
            return None;
        }

        match decode_message(text) {
            Ok(message) => self.handle_message(message),
            Err(e) => {
                error!(error = %e, raw = %text, "discarding malformed message");
                None
            }
        }
    }

    pub fn handle_message(&mut self, message: InboundMessage) -> Option<OutboundMessage> {
        match message {
            InboundMessage::Welcome => {
                info!(client = %self.client_name, "gateway welcome received, registering");
                self.state = ConnectionState::Registered;
                Some(OutboundMessage::Register {
                    client: self.client_name.clone(),
                })
            }
            InboundMessage::CurrentState { total, hieleras } => {
                info!(total, entries = hieleras.len(), "received current state");
                for entry in hieleras {
                    match SensorPayload::from_value(entry) {
                        Ok(payload) => {
                            self.ingest(payload);
                        }
                        Err(e) => {
                            warn!(error = %e, "skipping malformed entry in current state");
                        }
                    }
                }
                None
            }
            InboundMessage::SensorUpdate { data } => {
                self.ingest(data);
                None
            }
            InboundMessage::Unknown => {
                debug!("ignoring message with unknown type");
                None
            }
        }
    }

    /// Append one reading to its device history and run any reporting that
    /// falls due. Returns the device's updated reading count.
    pub fn ingest(&mut self, payload: SensorPayload) -> usize {
        let reading = payload.into_reading();
        let shelf_life_days = self.reporting.estimator.estimate_reading(&reading);

        info!(
            device_id = %reading.device_id(),
            temperature = reading.temperature(),
            humidity = reading.humidity(),
            ethylene = reading.ethylene(),
            "reading received"
        );
        info!(
            device_id = %reading.device_id(),
            shelf_life_days,
            "estimated shelf life"
        );

        let history = self.store.append(reading);
        self.reporting.on_append(history);
        history.len()
    }
}

impl ReportingSchedule {
    fn on_append(&self, history: &DeviceHistory) {
        let count = history.len();
        if count % self.chart_every == 0 {
            self.render_chart(history);
        }
        if count % self.report_every == 0 {
            self.export_and_report(history);
        }
    }

    fn render_chart(&self, history: &DeviceHistory) {
        let device_id = history.device_id();
        let snapshot = history.snapshot();
        let shelf_life = self.estimator.estimate_series(snapshot);

        match self
            .collaborators
            .chart_renderer
            .render_trend_chart(device_id, snapshot, &shelf_life)
        {
            Ok(()) => debug!(device_id = %device_id, readings = snapshot.len(), "trend chart rendered"),
            Err(e) => error!(device_id = %device_id, error = %e, "failed to render trend chart"),
        }
    }

    fn export_and_report(&self, history: &DeviceHistory) {
        let device_id = history.device_id();
        let snapshot = history.snapshot();
        let report = self.reporter.summarize(history);

        let rows: Vec<SnapshotRow> = snapshot
            .iter()
            .map(|reading| SnapshotRow {
                reading: reading.clone(),
                shelf_life_days: self.estimator.estimate_reading(reading),
            })
            .collect();

        if let Err(e) = self
            .collaborators
            .snapshot_exporter
            .export_snapshot(device_id, &rows)
        {
            error!(device_id = %device_id, error = %e, "failed to export snapshot");
        }

        let Some(report) = report else {
            return;
        };

        match self.collaborators.report_writer.write_report(device_id, &report) {
            Ok(()) => info!(
                device_id = %device_id,
                records = report.record_count,
                mean_shelf_life_days = report.shelf_life_days.mean,
                "statistics report written"
            ),
            Err(e) => error!(device_id = %device_id, error = %e, "failed to write statistics report"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hielera_domain::{
        DomainError, MockReportWriter, MockSnapshotExporter, MockTrendChartRenderer, Reading,
        Report,
    };

    fn sensor_update(id: &str, temp: f64, hum: f64, ethylene: f64) -> String {
        format!(
            r#"{{"type":"sensor_update","data":{{"id":"{}","temp":{},"hum":{},"ethylene":{}}}}}"#,
            id, temp, hum, ethylene
        )
    }

    fn pipeline_with(
        chart_renderer: MockTrendChartRenderer,
        snapshot_exporter: MockSnapshotExporter,
        report_writer: MockReportWriter,
    ) -> IngestionPipeline {
        IngestionPipeline::new(
            PipelineConfig::default(),
            HistoryStore::new(),
            ReportingCollaborators {
                chart_renderer: Arc::new(chart_renderer),
                snapshot_exporter: Arc::new(snapshot_exporter),
                report_writer: Arc::new(report_writer),
            },
        )
        .unwrap()
    }

    fn idle_pipeline() -> IngestionPipeline {
        pipeline_with(
            MockTrendChartRenderer::new(),
            MockSnapshotExporter::new(),
            MockReportWriter::new(),
        )
    }

    #[test]
    fn test_state_transitions() {
        let mut pipeline = idle_pipeline();
        assert_eq!(pipeline.state(), ConnectionState::Disconnected);

        pipeline.on_connected();
        assert_eq!(pipeline.state(), ConnectionState::Connected);

        let reply = pipeline.handle_text(r#"{"type":"welcome"}"#);
        assert_eq!(
            reply,
            Some(OutboundMessage::Register {
                client: "python_processor".to_string()
            })
        );
        assert_eq!(pipeline.state(), ConnectionState::Registered);

        pipeline.on_disconnected();
        assert_eq!(pipeline.state(), ConnectionState::Disconnected);

        pipeline.on_connected();
        assert_eq!(pipeline.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_stopped_is_terminal() {
        let mut pipeline = idle_pipeline();
        pipeline.on_connected();
        pipeline.stop();

        pipeline.on_connected();
        pipeline.on_disconnected();
        assert_eq!(pipeline.state(), ConnectionState::Stopped);

        assert!(pipeline.handle_text(r#"{"type":"welcome"}"#).is_none());
        assert!(pipeline
            .handle_text(&sensor_update("A", 2.0, 88.0, 50.0))
            .is_none());
        assert_eq!(pipeline.store().device_count(), 0);
    }

    #[test]
    fn test_malformed_message_leaves_state_untouched() {
        let mut pipeline = idle_pipeline();
        pipeline.on_connected();
        pipeline.handle_text(&sensor_update("A", 2.0, 88.0, 50.0));

        assert!(pipeline.handle_text("not json at all").is_none());
        assert!(pipeline
            .handle_text(r#"{"type":"sensor_update","data":{"id":"A"}}"#)
            .is_none());

        assert_eq!(pipeline.state(), ConnectionState::Connected);
        assert_eq!(pipeline.store().device_count(), 1);
        assert_eq!(pipeline.store().get("A").unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_message_type_ignored() {
        let mut pipeline = idle_pipeline();
        assert!(pipeline.handle_text(r#"{"type":"alert","level":3}"#).is_none());
        assert_eq!(pipeline.store().device_count(), 0);
    }

    #[test]
    fn test_ten_readings_render_one_chart_and_no_report() {
        // Arrange
        let mut chart_renderer = MockTrendChartRenderer::new();
        let mut snapshot_exporter = MockSnapshotExporter::new();
        let mut report_writer = MockReportWriter::new();

        chart_renderer
            .expect_render_trend_chart()
            .withf(|device_id: &str, snapshot: &[Reading], shelf_life: &[f64]| {
                device_id == "A" && snapshot.len() == 10 && shelf_life.len() == 10
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        snapshot_exporter.expect_export_snapshot().times(0);
        report_writer.expect_write_report().times(0);

        let mut pipeline = pipeline_with(chart_renderer, snapshot_exporter, report_writer);

        // Act
        for _ in 0..10 {
            pipeline.handle_text(&sensor_update("A", 2.0, 88.0, 50.0));
        }

        // Assert
        assert_eq!(pipeline.store().get("A").unwrap().len(), 10);
    }

    #[test]
    fn test_twenty_readings_render_two_charts_and_one_report() {
        // Arrange
        let mut chart_renderer = MockTrendChartRenderer::new();
        let mut snapshot_exporter = MockSnapshotExporter::new();
        let mut report_writer = MockReportWriter::new();

        chart_renderer
            .expect_render_trend_chart()
            .times(2)
            .returning(|_, _, _| Ok(()));
        snapshot_exporter
            .expect_export_snapshot()
            .withf(|device_id: &str, rows: &[SnapshotRow]| {
                device_id == "A"
                    && rows.len() == 20
                    && rows.iter().all(|row| row.shelf_life_days == 90.0)
            })
            .times(1)
            .returning(|_, _| Ok(()));
        report_writer
            .expect_write_report()
            .withf(|device_id: &str, report: &Report| {
                device_id == "A"
                    && report.record_count == 20
                    && report.shelf_life_days.mean == 90.0
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let mut pipeline = pipeline_with(chart_renderer, snapshot_exporter, report_writer);

        // Act
        for _ in 0..20 {
            pipeline.handle_text(&sensor_update("A", 2.0, 88.0, 50.0));
        }

        // Assert
        assert_eq!(pipeline.store().get("A").unwrap().len(), 20);
    }

    #[test]
    fn test_cadence_is_per_device() {
        // Arrange
        let mut chart_renderer = MockTrendChartRenderer::new();
        chart_renderer
            .expect_render_trend_chart()
            .withf(|device_id: &str, _: &[Reading], _: &[f64]| device_id == "B")
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut pipeline = pipeline_with(
            chart_renderer,
            MockSnapshotExporter::new(),
            MockReportWriter::new(),
        );

        // Act
        for _ in 0..9 {
            pipeline.handle_text(&sensor_update("A", 2.0, 88.0, 50.0));
        }
        for _ in 0..10 {
            pipeline.handle_text(&sensor_update("B", 2.0, 88.0, 50.0));
        }

        // Assert
        assert_eq!(pipeline.store().get("A").unwrap().len(), 9);
        assert_eq!(pipeline.store().get("B").unwrap().len(), 10);
    }

    #[test]
    fn test_collaborator_failures_do_not_block_ingestion() {
        // Arrange
        let mut chart_renderer = MockTrendChartRenderer::new();
        let mut snapshot_exporter = MockSnapshotExporter::new();
        let mut report_writer = MockReportWriter::new();

        chart_renderer
            .expect_render_trend_chart()
            .times(2)
            .returning(|_, _, _| Err(DomainError::CollaboratorError(anyhow::anyhow!("disk full"))));
        snapshot_exporter
            .expect_export_snapshot()
            .times(1)
            .returning(|_, _| Err(DomainError::CollaboratorError(anyhow::anyhow!("disk full"))));
        // The report is still attempted after a failed export
        report_writer
            .expect_write_report()
            .times(1)
            .returning(|_, _| Err(DomainError::CollaboratorError(anyhow::anyhow!("disk full"))));

        let mut pipeline = pipeline_with(chart_renderer, snapshot_exporter, report_writer);

        // Act
        for _ in 0..21 {
            pipeline.handle_text(&sensor_update("A", 2.0, 88.0, 50.0));
        }

        // Assert
        assert_eq!(pipeline.store().get("A").unwrap().len(), 21);
    }

    #[test]
    fn test_current_state_matches_sequential_updates() {
        // Arrange
        let entries = [("A", 2.0, 88.0, 50.0), ("B", 10.0, 70.0, 150.0), ("A", -3.0, 97.0, 250.0)];

        let mut bulk = idle_pipeline();
        let hieleras: Vec<String> = entries
            .iter()
            .map(|(id, t, h, e)| {
                format!(r#"{{"id":"{}","temp":{},"hum":{},"ethylene":{}}}"#, id, t, h, e)
            })
            .collect();

        // Act
        bulk.handle_text(&format!(
            r#"{{"type":"current_state","total":{},"hieleras":[{}]}}"#,
            entries.len(),
            hieleras.join(",")
        ));

        let mut sequential = idle_pipeline();
        for (id, t, h, e) in entries {
            sequential.handle_text(&sensor_update(id, t, h, e));
        }

        // Assert
        assert_eq!(bulk.store().device_ids(), sequential.store().device_ids());
        for device_id in ["A", "B"] {
            let left = bulk.store().get(device_id).unwrap().snapshot();
            let right = sequential.store().get(device_id).unwrap().snapshot();
            assert_eq!(left.len(), right.len());
            for (l, r) in left.iter().zip(right) {
                assert_eq!(l.device_id(), r.device_id());
                assert_eq!(l.temperature(), r.temperature());
                assert_eq!(l.humidity(), r.humidity());
                assert_eq!(l.ethylene(), r.ethylene());
            }
        }
    }

    #[test]
    fn test_current_state_skips_bad_entries() {
        let mut pipeline = idle_pipeline();

        pipeline.handle_text(
            r#"{"type":"current_state","total":3,"hieleras":[
                {"id":"A","temp":2,"hum":88,"ethylene":50},
                {"id":"B","temp":"warm"},
                {"id":"C","temp":5,"hum":90,"ethylene":10}
            ]}"#,
        );

        assert_eq!(pipeline.store().device_ids(), vec!["A", "C"]);
    }

    fn collaborators() -> ReportingCollaborators {
        ReportingCollaborators {
            chart_renderer: Arc::new(MockTrendChartRenderer::new()),
            snapshot_exporter: Arc::new(MockSnapshotExporter::new()),
            report_writer: Arc::new(MockReportWriter::new()),
        }
    }

    #[test]
    fn test_new_rejects_zero_chart_cadence() {
        // Arrange
        let config = PipelineConfig {
            chart_every: 0,
            ..Default::default()
        };

        // Act
        let result = IngestionPipeline::new(config, HistoryStore::new(), collaborators());

        // Assert
        assert!(matches!(result, Err(DomainError::InvalidCadence(_))));
    }

    #[test]
    fn test_new_rejects_zero_report_cadence() {
        // Arrange
        let config = PipelineConfig {
            report_every: 0,
            ..Default::default()
        };

        // Act
        let result = IngestionPipeline::new(config, HistoryStore::new(), collaborators());

        // Assert
        assert!(matches!(result, Err(DomainError::InvalidCadence(_))));
    }

    #[test]
    fn test_custom_cadence_is_honored() {
        // Arrange
        let mut chart_renderer = MockTrendChartRenderer::new();
        chart_renderer
            .expect_render_trend_chart()
            .times(3)
            .returning(|_, _, _| Ok(()));
        let mut snapshot_exporter = MockSnapshotExporter::new();
        snapshot_exporter
            .expect_export_snapshot()
            .times(1)
            .returning(|_, _| Ok(()));
        let mut report_writer = MockReportWriter::new();
        report_writer
            .expect_write_report()
            .times(1)
            .returning(|_, _| Ok(()));

        let mut pipeline = IngestionPipeline::new(
            PipelineConfig {
                chart_every: 1,
                report_every: 3,
                ..Default::default()
            },
            HistoryStore::new(),
            ReportingCollaborators {
                chart_renderer: Arc::new(chart_renderer),
                snapshot_exporter: Arc::new(snapshot_exporter),
                report_writer: Arc::new(report_writer),
            },
        )
        .unwrap();

        // Act
        for _ in 0..3 {
            pipeline.handle_text(&sensor_update("A", 2.0, 88.0, 50.0));
        }

        // Assert
        assert_eq!(pipeline.store().get("A").unwrap().len(), 3);
    }

    #[test]
    fn test_ingest_returns_updated_count() {
        let mut pipeline = idle_pipeline();
        let payload = SensorPayload {
            id: "A".to_string(),
            temp: 2.0,
            hum: 88.0,
            ethylene: 50.0,
        };

        assert_eq!(pipeline.ingest(payload.clone()), 1);
        assert_eq!(pipeline.ingest(payload), 2);
    }
}
