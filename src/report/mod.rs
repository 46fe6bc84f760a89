// Report assembly: series + statistics + chart + metadata → page or PDF.

pub mod html;
mod pdf;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::chart::ChartArtifact;
use crate::error::ReportError;
use crate::history::TimeWindow;
use crate::models::{Direction, ReportStatistics, Series};

/// Group label used when the host belongs to no group.
pub const NO_GROUP: &str = "No group";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMetadata {
    pub host_id: String,
    pub host_name: String,
    pub group_name: String,
    pub interface: String,
    pub period_minutes: u32,
    pub generated_at: DateTime<Utc>,
    #[serde(skip)]
    pub window: TimeWindow,
}

impl ReportMetadata {
    pub fn generated_at_local(&self) -> String {
        self.generated_at
            .with_timezone(&Local)
            .format("%d/%m/%Y %H:%M:%S")
            .to_string()
    }
}

/// Series and statistics of one direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectionReport {
    pub series: Series,
    pub statistics: ReportStatistics,
}

impl DirectionReport {
    /// Local `HH:MM` of the last sample; empty when there is no data.
    pub fn last_time(&self) -> String {
        self.series
            .last()
            .map(|p| p.timestamp.with_timezone(&Local).format("%H:%M").to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub download: DirectionReport,
    pub upload: DirectionReport,
    pub chart: ChartArtifact,
}

impl Report {
    pub fn direction(&self, direction: Direction) -> &DirectionReport {
        match direction {
            Direction::Download => &self.download,
            Direction::Upload => &self.upload,
        }
    }
}

/// Fails with [`ReportError::NoData`] when both directions are empty; one empty
/// direction is fine and renders as zeros.
pub fn ensure_has_data(
    download: &Series,
    upload: &Series,
    interface: &str,
    period_minutes: u32,
) -> Result<(), ReportError> {
    if download.is_empty() && upload.is_empty() {
        return Err(ReportError::NoData {
            interface: interface.to_string(),
            period_minutes,
        });
    }
    Ok(())
}

pub fn assemble(
    download: DirectionReport,
    upload: DirectionReport,
    chart: ChartArtifact,
    metadata: ReportMetadata,
) -> Result<Report, ReportError> {
    ensure_has_data(
        &download.series,
        &upload.series,
        &metadata.interface,
        metadata.period_minutes,
    )?;
    Ok(Report {
        metadata,
        download,
        upload,
        chart,
    })
}

/// One row of the archival summary: a metric across both directions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub metric: &'static str,
    pub download: String,
    pub upload: String,
}

/// Direction × {max, mean, last, p95}, formatted.
pub fn summary_table(report: &Report) -> Vec<SummaryRow> {
    let (dl, ul) = (&report.download.statistics, &report.upload.statistics);
    vec![
        SummaryRow {
            metric: "Maximum",
            download: dl.max.formatted.clone(),
            upload: ul.max.formatted.clone(),
        },
        SummaryRow {
            metric: "Average",
            download: dl.mean.formatted.clone(),
            upload: ul.mean.formatted.clone(),
        },
        SummaryRow {
            metric: "Last value",
            download: dl.last_value.formatted.clone(),
            upload: ul.last_value.formatted.clone(),
        },
        SummaryRow {
            metric: "95th percentile",
            download: dl.percentile_95.formatted.clone(),
            upload: ul.percentile_95.formatted.clone(),
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    /// HTML page for the browser.
    Interactive,
    /// Downloadable PDF document.
    Archival,
}

#[derive(Debug, Clone)]
pub enum RenderedReport {
    Page(String),
    Pdf { filename: String, bytes: Vec<u8> },
}

pub fn render(report: &Report, mode: ReportMode) -> Result<RenderedReport, ReportError> {
    match mode {
        ReportMode::Interactive => Ok(RenderedReport::Page(html::report_page(report))),
        ReportMode::Archival => {
            let meta = &report.metadata;
            if meta.host_name.trim().is_empty() || meta.group_name.trim().is_empty() {
                return Err(ReportError::Render(
                    "incomplete host data for PDF report".into(),
                ));
            }
            Ok(RenderedReport::Pdf {
                filename: pdf_filename(&meta.host_name, &meta.interface, meta.period_minutes),
                bytes: pdf::report_pdf(report),
            })
        }
    }
}

/// `relatorio_trafego_{host}_{interface}_{period}min.pdf`, with characters
/// outside `[A-Za-z0-9._-]` replaced by `_` so the name is header-safe.
pub fn pdf_filename(host_name: &str, interface: &str, period_minutes: u32) -> String {
    fn clean(s: &str) -> String {
        s.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
    format!(
        "relatorio_trafego_{}_{}_{}min.pdf",
        clean(host_name),
        clean(interface),
        period_minutes
    )
}
