// Traffic chart: axis range hints and SVG rendering via plotters.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{Local, TimeZone};
use plotters::prelude::*;

use crate::error::ReportError;
use crate::format::format_axis_rate;
use crate::history::TimeWindow;
use crate::models::{Direction, Series};

/// Default y-axis max (1 Mbps) when no sample gives a positive peak.
pub const FALLBACK_AXIS_MAX: f64 = 1_000_000.0;

pub const CHART_SIZE: (u32, u32) = (1200, 600);

/// Y-axis upper bound: the highest peak across `series` times `headroom`, or
/// `fallback` when every series is empty, all-zero or non-finite.
pub fn axis_max(series: &[&Series], headroom: f64, fallback: f64) -> f64 {
    let peak = series
        .iter()
        .filter_map(|s| s.peak())
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    if peak > 0.0 {
        peak * headroom
    } else {
        fallback
    }
}

pub fn direction_color(direction: Direction) -> RGBColor {
    match direction {
        Direction::Download => BLUE,
        Direction::Upload => RED,
    }
}

/// Everything the renderer needs; the pipeline supplies data and hints only.
pub struct ChartSpec<'a> {
    pub title: String,
    pub window: TimeWindow,
    pub y_max: f64,
    pub series: [&'a Series; 2],
}

/// Rendered chart, opaque to the report assembler.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartArtifact {
    pub svg: String,
    pub y_max: f64,
}

impl ChartArtifact {
    /// `data:` URI for embedding in an `<img>` tag.
    pub fn data_uri(&self) -> String {
        format!(
            "data:image/svg+xml;base64,{}",
            STANDARD.encode(self.svg.as_bytes())
        )
    }
}

pub fn chart_title(interface: &str, period_minutes: u32) -> String {
    format!("Interface {interface} traffic - last {period_minutes} minutes")
}

fn render_err<E: std::fmt::Display>(e: E) -> ReportError {
    ReportError::Render(format!("chart: {e}"))
}

fn local_clock(ts: i64) -> String {
    Local
        .timestamp_opt(ts, 0)
        .single()
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_default()
}

fn local_date(ts: i64) -> String {
    Local
        .timestamp_opt(ts, 0)
        .single()
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

pub fn render_svg(spec: &ChartSpec<'_>) -> Result<ChartArtifact, ReportError> {
    let y_max = if spec.y_max.is_finite() && spec.y_max > 0.0 {
        spec.y_max
    } else {
        FALLBACK_AXIS_MAX
    };
    let TimeWindow {
        time_from,
        time_till,
    } = spec.window;
    let time_till = time_till.max(time_from + 1);
    let (date_from, date_till) = (local_date(time_from), local_date(time_till));
    let x_desc = if date_from == date_till {
        date_from
    } else {
        format!("{date_from} - {date_till}")
    };

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(&spec.title, ("sans-serif", 22))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(90)
            .build_cartesian_2d(time_from..time_till, 0.0..y_max)
            .map_err(render_err)?;
        chart
            .configure_mesh()
            .x_labels(10)
            .y_labels(8)
            .x_label_formatter(&|ts| local_clock(*ts))
            .y_label_formatter(&|v| format_axis_rate(*v))
            .x_desc(x_desc)
            .y_desc("Speed")
            .draw()
            .map_err(render_err)?;

        for series in spec.series {
            if series.is_empty() {
                continue;
            }
            let color = direction_color(series.direction);
            chart
                .draw_series(LineSeries::new(
                    series
                        .points
                        .iter()
                        .map(|p| (p.timestamp.timestamp(), p.value.clamp(0.0, y_max))),
                    &color,
                ))
                .map_err(render_err)?
                .label(series.direction.label())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
        }
        if spec.series.iter().any(|s| !s.is_empty()) {
            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()
                .map_err(render_err)?;
        }
        root.present().map_err(render_err)?;
    }
    Ok(ChartArtifact { svg, y_max })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NormalizedPoint;
    use chrono::Utc;

    fn series(direction: Direction, values: &[f64]) -> Series {
        Series {
            direction,
            points: values
                .iter()
                .enumerate()
                .map(|(i, v)| NormalizedPoint {
                    timestamp: Utc.timestamp_opt(1_700_000_000 + i as i64 * 60, 0).unwrap(),
                    value: *v,
                    formatted: String::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn axis_uses_peak_with_headroom() {
        let dl = series(Direction::Download, &[100.0, 500.0]);
        let ul = series(Direction::Upload, &[800.0]);
        assert!((axis_max(&[&dl, &ul], 1.2, FALLBACK_AXIS_MAX) - 960.0).abs() < 1e-9);
    }

    #[test]
    fn axis_falls_back_without_positive_peak() {
        let dl = Series::empty(Direction::Download);
        let ul = series(Direction::Upload, &[0.0, 0.0]);
        assert_eq!(axis_max(&[&dl, &ul], 1.2, FALLBACK_AXIS_MAX), FALLBACK_AXIS_MAX);
    }

    #[test]
    fn renders_svg_document() {
        let dl = series(Direction::Download, &[100_000.0, 200_000.0, 150_000.0]);
        let ul = Series::empty(Direction::Upload);
        let spec = ChartSpec {
            title: chart_title("eth0", 15),
            window: TimeWindow {
                time_from: 1_700_000_000,
                time_till: 1_700_000_900,
            },
            y_max: 240_000.0,
            series: [&dl, &ul],
        };
        let chart = render_svg(&spec).unwrap();
        assert!(chart.svg.contains("<svg"));
        assert!(chart.svg.contains("Download"));
        assert!(chart.data_uri().starts_with("data:image/svg+xml;base64,"));
    }
}
