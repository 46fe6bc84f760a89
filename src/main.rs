use anyhow::Result;
use netreport::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

use netreport::pipeline::{PipelineConfig, ReportPipeline};
use netreport::source::{MetricsSource, ZabbixClient};

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    let client = ZabbixClient::connect(&app_config.zabbix)
        .map_err(|e| anyhow::anyhow!("metrics source client: {}", e))?;

    // The server still starts when the backend is down; /health reports it.
    match client.health_check().await {
        Ok(api_version) => tracing::info!(
            url = %client.url(),
            api_version = %api_version,
            "Connected to metrics source"
        ),
        Err(e) => tracing::warn!(
            error = %e,
            url = %client.url(),
            operation = "health_check",
            "Metrics source not reachable at startup"
        ),
    }

    let source: Arc<dyn MetricsSource> = Arc::new(client);
    let pipeline = Arc::new(ReportPipeline::new(
        source,
        PipelineConfig::from(&app_config),
    ));
    tracing::info!(
        unit_policy = app_config.report.unit_policy.name(),
        history_limit = app_config.report.history_limit,
        "Report pipeline ready"
    );

    let app = routes::app(pipeline);
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(
            tokio::signal::unix::SignalKind::terminate(),
        ) {
            Ok(s) => s,
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Received shutdown signal");
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("Received shutdown signal");
}
