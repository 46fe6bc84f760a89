// Report pipeline: request → interfaces → history → series → statistics → chart → report.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use crate::chart::{self, ChartSpec};
use crate::config::AppConfig;
use crate::error::ReportError;
use crate::history::{FetchOptions, TimeWindow, fetch_history_or_empty};
use crate::models::{Direction, Interface, ReportRequest, Series};
use crate::normalize::{UnitPolicy, normalize};
use crate::report::{self, DirectionReport, NO_GROUP, Report, ReportMetadata};
use crate::resolver::resolve_interfaces;
use crate::source::MetricsSource;
use crate::stats::compute_statistics;

/// Pipeline settings, taken from `[report]` and `[zabbix]` config.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub unit_policy: UnitPolicy,
    pub history_limit: u32,
    pub request_timeout: Duration,
    pub default_period_minutes: u32,
    pub max_period_minutes: u32,
    pub axis_headroom: f64,
    pub fallback_axis_max: f64,
}

impl PipelineConfig {
    pub fn new(unit_policy: UnitPolicy) -> Self {
        Self {
            unit_policy,
            history_limit: crate::history::MAX_HISTORY_LIMIT,
            request_timeout: Duration::from_secs(30),
            default_period_minutes: 15,
            max_period_minutes: 7 * 24 * 60,
            axis_headroom: 1.2,
            fallback_axis_max: chart::FALLBACK_AXIS_MAX,
        }
    }
}

impl From<&AppConfig> for PipelineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            unit_policy: config.report.unit_policy,
            history_limit: config.report.history_limit,
            request_timeout: Duration::from_secs(config.zabbix.request_timeout_secs),
            default_period_minutes: config.report.default_period_minutes,
            max_period_minutes: config.report.max_period_minutes,
            axis_headroom: config.report.axis_headroom,
            fallback_axis_max: config.report.fallback_axis_max,
        }
    }
}

pub struct ReportPipeline {
    source: Arc<dyn MetricsSource>,
    config: PipelineConfig,
}

impl ReportPipeline {
    pub fn new(source: Arc<dyn MetricsSource>, config: PipelineConfig) -> Self {
        Self { source, config }
    }

    pub fn source(&self) -> &dyn MetricsSource {
        self.source.as_ref()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Interfaces on a host, keyed by name. Blank host id → empty map.
    pub async fn interfaces(
        &self,
        host_id: &str,
    ) -> Result<BTreeMap<String, Interface>, ReportError> {
        Ok(resolve_interfaces(self.source(), host_id).await?)
    }

    /// Build the report for the most recent `period_minutes` ending now.
    pub async fn generate(&self, request: &ReportRequest) -> Result<Report, ReportError> {
        self.generate_at(request, Utc::now()).await
    }

    #[instrument(
        skip(self, request, now),
        fields(
            host_id = %request.host_id,
            interface = %request.interface_name,
            period_minutes = request.period_minutes
        )
    )]
    pub async fn generate_at(
        &self,
        request: &ReportRequest,
        now: DateTime<Utc>,
    ) -> Result<Report, ReportError> {
        request.validate(self.config.max_period_minutes)?;

        let host = self
            .source
            .get_host(&request.host_id)
            .await?
            .ok_or_else(|| ReportError::NotFound(format!("host {} not found", request.host_id)))?;

        let interfaces = resolve_interfaces(self.source(), &request.host_id).await?;
        if interfaces.is_empty() {
            return Err(ReportError::NotFound(format!(
                "no traffic items found on host {}",
                host.name
            )));
        }
        let interface = interfaces.get(&request.interface_name).ok_or_else(|| {
            ReportError::NotFound(format!(
                "no items found for interface {} on host {}",
                request.interface_name, host.name
            ))
        })?;

        let window = TimeWindow::last_minutes(now, request.period_minutes);
        let options = FetchOptions::new(self.config.history_limit, self.config.request_timeout);
        let (download, upload) = tokio::join!(
            self.fetch_series(interface, Direction::Download, window, options),
            self.fetch_series(interface, Direction::Upload, window, options),
        );
        report::ensure_has_data(
            &download,
            &upload,
            &request.interface_name,
            request.period_minutes,
        )?;

        let y_max = chart::axis_max(
            &[&download, &upload],
            self.config.axis_headroom,
            self.config.fallback_axis_max,
        );
        let chart = chart::render_svg(&ChartSpec {
            title: chart::chart_title(&request.interface_name, request.period_minutes),
            window,
            y_max,
            series: [&download, &upload],
        })?;

        info!(
            host = %host.name,
            download_samples = download.len(),
            upload_samples = upload.len(),
            unit_policy = self.config.unit_policy.name(),
            "report generated"
        );

        let metadata = ReportMetadata {
            host_id: host.host_id.clone(),
            host_name: host.name.clone(),
            group_name: host.primary_group().unwrap_or(NO_GROUP).to_string(),
            interface: request.interface_name.clone(),
            period_minutes: request.period_minutes,
            generated_at: now,
            window,
        };
        let download = DirectionReport {
            statistics: compute_statistics(&download),
            series: download,
        };
        let upload = DirectionReport {
            statistics: compute_statistics(&upload),
            series: upload,
        };
        report::assemble(download, upload, chart, metadata)
    }

    /// Normalized series for one direction; missing item or failed fetch → empty.
    async fn fetch_series(
        &self,
        interface: &Interface,
        direction: Direction,
        window: TimeWindow,
        options: FetchOptions,
    ) -> Series {
        let Some(item) = interface.item(direction) else {
            return Series::empty(direction);
        };
        let samples = fetch_history_or_empty(self.source(), item, window, options).await;
        normalize(direction, &samples, self.config.unit_policy)
    }
}
