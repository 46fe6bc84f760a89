// HTML handlers: landing page and report generation

use axum::{
    Form,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, warn};

use super::AppState;
use crate::error::ReportError;
use crate::models::{ReportRequest, parse_period};
use crate::report::{self, RenderedReport, ReportMode, html};

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Html(html::error_page(message))).into_response()
}

fn report_error_response(err: &ReportError) -> Response {
    let status = err.status_code();
    if status.is_server_error() {
        warn!(error = %err, operation = "report", "report generation failed");
    } else {
        debug!(error = %err, operation = "report", "report request rejected");
    }
    error_response(status, &err.to_string())
}

/// GET /: groups, hosts and the report form.
pub(super) async fn index_handler(State(state): State<AppState>) -> Response {
    let source = state.pipeline.source();
    match tokio::try_join!(source.list_host_groups(), source.list_monitored_hosts()) {
        Ok((groups, hosts)) => Html(html::index_page(&groups, &hosts)).into_response(),
        Err(e) => {
            warn!(error = %e, operation = "index", "failed to list hosts");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Error loading hosts: {e}"),
            )
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ReportForm {
    #[serde(default)]
    host: String,
    #[serde(default)]
    interface: String,
    period: Option<String>,
    generate_pdf: Option<String>,
}

impl ReportForm {
    /// Checkbox semantics: present and not an explicit false value.
    fn wants_pdf(&self) -> bool {
        self.generate_pdf.as_deref().is_some_and(|v| {
            let v = v.trim();
            !v.is_empty() && !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "off")
        })
    }
}

/// POST /report: HTML report page, or a PDF attachment when `generate_pdf` is set.
pub(super) async fn report_handler(
    State(state): State<AppState>,
    Form(form): Form<ReportForm>,
) -> Response {
    let default_period = state.pipeline.config().default_period_minutes;
    let period = match parse_period(form.period.as_deref(), default_period) {
        Ok(p) => p,
        Err(e) => return report_error_response(&e),
    };
    let mode = if form.wants_pdf() {
        ReportMode::Archival
    } else {
        ReportMode::Interactive
    };
    let request = ReportRequest::new(form.host.trim(), form.interface.trim(), period);

    let built = match state.pipeline.generate(&request).await {
        Ok(r) => r,
        Err(e) => return report_error_response(&e),
    };
    let rendered = tokio::task::spawn_blocking(move || report::render(&built, mode))
        .await
        .map_err(|e| ReportError::Render(format!("render task: {e}")))
        .and_then(|r| r);

    match rendered {
        Ok(RenderedReport::Page(page)) => Html(page).into_response(),
        Ok(RenderedReport::Pdf { filename, bytes }) => {
            let disposition =
                match HeaderValue::from_str(&format!("attachment; filename=\"{filename}\"")) {
                    Ok(v) => v,
                    Err(e) => {
                        return report_error_response(&ReportError::Render(format!(
                            "content disposition: {e}"
                        )));
                    }
                };
            (
                [
                    (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                Bytes::from(bytes),
            )
                .into_response()
        }
        Err(e) => report_error_response(&e),
    }
}
