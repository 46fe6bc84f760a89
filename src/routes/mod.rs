// HTTP routes: report pages and JSON API

mod http;
mod pages;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::pipeline::ReportPipeline;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) pipeline: Arc<ReportPipeline>,
}

pub fn app(pipeline: Arc<ReportPipeline>) -> Router {
    let state = AppState { pipeline };
    Router::new()
        .route("/", get(pages::index_handler)) // GET /
        .route("/report", post(pages::report_handler)) // POST /report
        .route("/api/hosts", get(http::hosts_handler)) // GET /api/hosts
        .route("/api/interfaces", get(http::interfaces_handler)) // GET /api/interfaces?hostid=
        .route("/version", get(http::version_handler)) // GET /version
        .route("/health", get(http::health_handler)) // GET /health
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
