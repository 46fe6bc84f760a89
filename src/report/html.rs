// HTML pages: host listing/form, interactive report, error page.

use std::fmt::Write;

use super::{Report, summary_table};
use crate::models::Direction;
use crate::source::{Host, HostGroup};

const STYLE: &str = r#"<style>
body{font-family:Helvetica,Arial,sans-serif;margin:2rem;color:#212529}
h1{color:#0d6efd}
table{border-collapse:collapse;margin:1rem 0}
th,td{border:1px solid #000;padding:.35rem .8rem;text-align:center}
th{background:#4472C4;color:#f5f5f5}
td{background:#D9E1F2}
table.info td{border:none;background:none;text-align:left}
table.info td:first-child{color:#6c757d;text-align:right}
.error{color:#b02a37}
img.chart{max-width:100%}
</style>"#;

/// Escape text for HTML element content and attribute values.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{}</title>{STYLE}</head>\n<body>\n{body}\n</body></html>\n",
        escape(title)
    )
}

/// Landing page: groups and hosts with the report form. The interface list is
/// filled from `/api/interfaces` when a host is picked.
pub fn index_page(groups: &[HostGroup], hosts: &[Host]) -> String {
    let mut body = String::from("<h1>Interface Traffic Report</h1>\n");
    body.push_str("<form method=\"post\" action=\"/report\">\n");

    body.push_str("<p><label>Group <select id=\"group\"><option value=\"\">All groups</option>");
    for g in groups {
        let _ = write!(
            body,
            "<option value=\"{}\">{}</option>",
            escape(&g.group_id),
            escape(&g.name)
        );
    }
    body.push_str("</select></label></p>\n");

    body.push_str("<p><label>Host <select id=\"host\" name=\"host\" required><option value=\"\">Select a host</option>");
    for h in hosts {
        let group_ids: Vec<&str> = h.groups.iter().map(|g| g.group_id.as_str()).collect();
        let _ = write!(
            body,
            "<option value=\"{}\" data-groups=\"{}\">{}</option>",
            escape(&h.host_id),
            escape(&group_ids.join(",")),
            escape(&h.name)
        );
    }
    body.push_str("</select></label></p>\n");

    body.push_str(
        "<p><label>Interface <select id=\"interface\" name=\"interface\" required></select></label></p>\n\
         <p><label>Period (minutes) <input type=\"number\" name=\"period\" value=\"15\" min=\"1\"></label></p>\n\
         <p><label><input type=\"checkbox\" name=\"generate_pdf\" value=\"1\"> Download as PDF</label></p>\n\
         <p><button type=\"submit\">Generate report</button></p>\n</form>\n",
    );
    body.push_str(
        r#"<script>
const group = document.getElementById('group');
const host = document.getElementById('host');
const iface = document.getElementById('interface');
group.addEventListener('change', () => {
  for (const opt of host.options) {
    if (!opt.value) continue;
    opt.hidden = group.value !== '' && !opt.dataset.groups.split(',').includes(group.value);
  }
});
host.addEventListener('change', async () => {
  iface.innerHTML = '';
  if (!host.value) return;
  const resp = await fetch('/api/interfaces?hostid=' + encodeURIComponent(host.value));
  if (!resp.ok) return;
  for (const name of Object.keys(await resp.json())) {
    iface.add(new Option(name, name));
  }
});
</script>"#,
    );
    page("Interface Traffic Report", &body)
}

pub fn report_page(report: &Report) -> String {
    let meta = &report.metadata;
    let mut body = String::new();
    let _ = writeln!(body, "<h1>Traffic Report - {}</h1>", escape(&meta.host_name));
    let _ = writeln!(
        body,
        "<table class=\"info\">\
         <tr><td>Group:</td><td>{}</td></tr>\
         <tr><td>Host:</td><td>{}</td></tr>\
         <tr><td>Interface:</td><td>{}</td></tr>\
         <tr><td>Period:</td><td>Last {} minutes</td></tr>\
         <tr><td>Generated at:</td><td>{}</td></tr></table>",
        escape(&meta.group_name),
        escape(&meta.host_name),
        escape(&meta.interface),
        meta.period_minutes,
        meta.generated_at_local()
    );

    let _ = writeln!(
        body,
        "<h2>Interface Traffic</h2>\n<img class=\"chart\" alt=\"traffic chart\" src=\"{}\">",
        report.chart.data_uri()
    );

    body.push_str("<h2>Traffic Summary</h2>\n<table><tr><th>Metric</th><th>Value</th><th>At</th></tr>");
    for direction in Direction::ALL {
        let d = report.direction(direction);
        let _ = write!(
            body,
            "<tr><td>Last {}</td><td>{}</td><td>{}</td></tr>",
            direction.label(),
            escape(&d.statistics.last_value.formatted),
            escape(&d.last_time())
        );
    }
    for direction in Direction::ALL {
        let d = report.direction(direction);
        let _ = write!(
            body,
            "<tr><td>95th percentile {}</td><td>{}</td><td></td></tr>",
            direction.label(),
            escape(&d.statistics.percentile_95.formatted)
        );
    }
    body.push_str("</table>\n");

    body.push_str("<h2>Traffic Statistics</h2>\n<table><tr><th>Metric</th><th>Download</th><th>Upload</th></tr>");
    for row in summary_table(report) {
        let _ = write!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            row.metric,
            escape(&row.download),
            escape(&row.upload)
        );
    }
    body.push_str("</table>\n<p><a href=\"/\">New report</a></p>");

    page(&format!("Traffic Report - {}", meta.host_name), &body)
}

pub fn error_page(message: &str) -> String {
    let body = format!(
        "<h1>Error</h1>\n<p class=\"error\">{}</p>\n<p><a href=\"/\">Back</a></p>",
        escape(message)
    );
    page("Error", &body)
}
