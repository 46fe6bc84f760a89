// Single-page PDF report.
//
// Writes PDF 1.4 directly: built-in Helvetica fonts (WinAnsi), one content
// stream of text, rectangle and path operators. The chart is redrawn from the
// series as vector paths rather than embedding the SVG.

use std::fmt::Write;

use chrono::{Local, TimeZone};
use plotters::style::RGBColor;

use super::{Report, summary_table};
use crate::chart::direction_color;
use crate::format::format_axis_rate;
use crate::models::Direction;

const PAGE_WIDTH: f64 = 612.0;
const PAGE_HEIGHT: f64 = 792.0;
const MARGIN: f64 = 36.0;
const ROW_HEIGHT: f64 = 18.0;

#[derive(Debug, Clone, Copy)]
struct Rgb(f64, f64, f64);

impl Rgb {
    const fn hex(v: u32) -> Self {
        Rgb(
            ((v >> 16) & 0xff) as f64 / 255.0,
            ((v >> 8) & 0xff) as f64 / 255.0,
            (v & 0xff) as f64 / 255.0,
        )
    }
}

impl From<RGBColor> for Rgb {
    fn from(c: RGBColor) -> Self {
        Rgb(c.0 as f64 / 255.0, c.1 as f64 / 255.0, c.2 as f64 / 255.0)
    }
}

const TITLE: Rgb = Rgb::hex(0x0d6efd);
const HEADING: Rgb = Rgb::hex(0x212529);
const MUTED: Rgb = Rgb::hex(0x6c757d);
const BLACK: Rgb = Rgb::hex(0x000000);
const WHITE_SMOKE: Rgb = Rgb::hex(0xf5f5f5);
const HEADER_BG: Rgb = Rgb::hex(0x4472c4);
const BODY_BG: Rgb = Rgb::hex(0xd9e1f2);
const GRID: Rgb = Rgb::hex(0xdddddd);

#[derive(Debug, Clone, Copy)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

/// Content stream builder; coordinates are PDF points from the bottom-left.
#[derive(Default)]
struct Canvas {
    ops: String,
}

impl Canvas {
    fn text(&mut self, x: f64, y: f64, font: Font, size: f64, color: Rgb, s: &str) {
        let _ = writeln!(
            self.ops,
            "BT {:.3} {:.3} {:.3} rg /{} {size:.1} Tf {x:.2} {y:.2} Td ({}) Tj ET",
            color.0,
            color.1,
            color.2,
            font.resource(),
            encode_text(s)
        );
    }

    /// Right-aligned text using an average Helvetica glyph width.
    fn text_right(&mut self, x: f64, y: f64, font: Font, size: f64, color: Rgb, s: &str) {
        let width = s.chars().count() as f64 * size * 0.5;
        self.text(x - width, y, font, size, color, s);
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb) {
        let _ = writeln!(
            self.ops,
            "{:.3} {:.3} {:.3} rg {x:.2} {y:.2} {w:.2} {h:.2} re f",
            color.0, color.1, color.2
        );
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb, width: f64) {
        let _ = writeln!(
            self.ops,
            "{:.3} {:.3} {:.3} RG {width:.2} w {x:.2} {y:.2} {w:.2} {h:.2} re S",
            color.0, color.1, color.2
        );
    }

    fn polyline(&mut self, points: &[(f64, f64)], color: Rgb, width: f64) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        let _ = write!(
            self.ops,
            "{:.3} {:.3} {:.3} RG {width:.2} w {:.2} {:.2} m",
            color.0, color.1, color.2, first.0, first.1
        );
        for (x, y) in rest {
            let _ = write!(self.ops, " {x:.2} {y:.2} l");
        }
        self.ops.push_str(" S\n");
    }
}

/// PDF literal-string body in WinAnsi: escapes delimiters, writes Latin-1 as
/// octal and replaces anything else with `?`.
fn encode_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            c if (c as u32) >= 0xa0 && (c as u32) <= 0xff => {
                let _ = write!(out, "\\{:03o}", c as u32);
            }
            _ => out.push('?'),
        }
    }
    out
}

/// Table whose first row is a header; returns the y below the table.
fn table(canvas: &mut Canvas, x: f64, top: f64, widths: &[f64], rows: &[Vec<String>]) -> f64 {
    let total: f64 = widths.iter().sum();
    for (i, row) in rows.iter().enumerate() {
        let y = top - (i as f64 + 1.0) * ROW_HEIGHT;
        let header = i == 0;
        canvas.fill_rect(x, y, total, ROW_HEIGHT, if header { HEADER_BG } else { BODY_BG });
        let mut cx = x;
        for (cell, w) in row.iter().zip(widths) {
            canvas.stroke_rect(cx, y, *w, ROW_HEIGHT, BLACK, 0.8);
            let (font, color) = if header {
                (Font::Bold, WHITE_SMOKE)
            } else {
                (Font::Regular, BLACK)
            };
            canvas.text(cx + 6.0, y + 5.5, font, 10.0, color, cell);
            cx += w;
        }
    }
    top - rows.len() as f64 * ROW_HEIGHT
}

fn local_clock(ts: i64) -> String {
    Local
        .timestamp_opt(ts, 0)
        .single()
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_default()
}

/// Chart drawn into the box `(x, y, w, h)`: grid, axis labels, one path per direction, legend.
fn chart(canvas: &mut Canvas, report: &Report, x: f64, y: f64, w: f64, h: f64) {
    let window = report.metadata.window;
    let span = (window.time_till - window.time_from).max(1) as f64;
    let y_max = report.chart.y_max;
    const TICKS: usize = 5;

    canvas.stroke_rect(x, y, w, h, BLACK, 0.8);
    for i in 0..=TICKS {
        let frac = i as f64 / TICKS as f64;
        let gy = y + h * frac;
        if i > 0 && i < TICKS {
            canvas.polyline(&[(x, gy), (x + w, gy)], GRID, 0.5);
        }
        canvas.text_right(x - 4.0, gy - 3.0, Font::Regular, 8.0, MUTED, &format_axis_rate(y_max * frac));

        let gx = x + w * frac;
        let ts = window.time_from + (span * frac) as i64;
        canvas.text(gx - 10.0, y - 12.0, Font::Regular, 8.0, MUTED, &local_clock(ts));
    }

    for direction in Direction::ALL {
        let series = &report.direction(direction).series;
        let points: Vec<(f64, f64)> = series
            .points
            .iter()
            .map(|p| {
                let tx = (p.timestamp.timestamp() - window.time_from) as f64 / span;
                let vy = if y_max > 0.0 { p.value / y_max } else { 0.0 };
                (x + w * tx.clamp(0.0, 1.0), y + h * vy.clamp(0.0, 1.0))
            })
            .collect();
        canvas.polyline(&points, direction_color(direction).into(), 1.2);
    }

    let mut lx = x + 10.0;
    for direction in Direction::ALL {
        let color = Rgb::from(direction_color(direction));
        canvas.polyline(&[(lx, y + h - 12.0), (lx + 16.0, y + h - 12.0)], color, 2.0);
        canvas.text(lx + 20.0, y + h - 15.0, Font::Regular, 9.0, BLACK, direction.label());
        lx += 80.0;
    }
}

fn content(report: &Report) -> String {
    let meta = &report.metadata;
    let mut c = Canvas::default();
    let left = MARGIN + 24.0;
    let mut y = PAGE_HEIGHT - MARGIN - 18.0;

    c.text(left, y, Font::Bold, 18.0, TITLE, &format!("Traffic Report - {}", meta.host_name));
    y -= 30.0;

    let info = [
        ("Group:", meta.group_name.clone()),
        ("Host:", meta.host_name.clone()),
        ("Interface:", meta.interface.clone()),
        ("Period:", format!("Last {} minutes", meta.period_minutes)),
        ("Generated at:", meta.generated_at_local()),
    ];
    for (label, value) in &info {
        c.text_right(left + 90.0, y, Font::Regular, 10.0, MUTED, label);
        c.text(left + 100.0, y, Font::Regular, 10.0, BLACK, value);
        y -= 15.0;
    }
    y -= 15.0;

    c.text(left, y, Font::Bold, 14.0, HEADING, "Interface Traffic");
    y -= 14.0;
    let chart_h = 200.0;
    let chart_x = left + 50.0;
    chart(&mut c, report, chart_x, y - chart_h, PAGE_WIDTH - MARGIN - chart_x, chart_h);
    y -= chart_h + 40.0;

    c.text(left, y, Font::Bold, 14.0, HEADING, "Traffic Summary");
    y -= 8.0;
    let (dl, ul) = (&report.download.statistics, &report.upload.statistics);
    let summary = vec![
        vec!["Metric".to_string(), "Value".to_string()],
        vec!["Last Download".to_string(), dl.last_value.formatted.clone()],
        vec!["Last Upload".to_string(), ul.last_value.formatted.clone()],
        vec!["95th Percentile Download".to_string(), dl.percentile_95.formatted.clone()],
        vec!["95th Percentile Upload".to_string(), ul.percentile_95.formatted.clone()],
    ];
    y = table(&mut c, left, y, &[180.0, 180.0], &summary);
    y -= 30.0;

    c.text(left, y, Font::Bold, 14.0, HEADING, "Traffic Statistics");
    y -= 8.0;
    let mut stats = vec![vec![
        "Metric".to_string(),
        "Download".to_string(),
        "Upload".to_string(),
    ]];
    stats.extend(
        summary_table(report)
            .into_iter()
            .map(|r| vec![r.metric.to_string(), r.download, r.upload]),
    );
    table(&mut c, left, y, &[150.0, 150.0, 150.0], &stats);

    c.ops
}

/// Serialize the report into a complete PDF file.
pub(super) fn report_pdf(report: &Report) -> Vec<u8> {
    let stream = content(report);
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
             /Resources << /Font << /F1 4 0 R /F2 5 0 R >> >> /Contents 6 0 R >>"
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{stream}endstream",
            stream.len()
        ),
    ];

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, obj) in objects.iter().enumerate() {
        offsets.push(out.len());
        let _ = write!(out, "{} 0 obj\n{obj}\nendobj\n", i + 1);
    }
    let xref = out.len();
    let _ = write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for off in offsets {
        let _ = write!(out, "{off:010} 00000 n \n");
    }
    let _ = write!(
        out,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
        objects.len() + 1
    );
    out.into_bytes()
}
