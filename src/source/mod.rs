// Metrics source: the read-only monitoring backend the report pipeline queries.

mod error;
mod types;
mod zabbix;

use async_trait::async_trait;

pub use error::SourceError;
pub use types::{HistoryChannel, HistoryQuery, HistoryRecord, Host, HostGroup, MonitoredItem};
pub use zabbix::ZabbixClient;

/// Read operations the pipeline needs from the monitoring backend.
///
/// Implementations own their session/auth lifecycle and must be safe to share
/// across concurrent requests.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Cheap liveness probe; returns the backend API version.
    async fn health_check(&self) -> Result<String, SourceError>;

    /// All hosts, `{hostid, name}` only, sorted by name.
    async fn list_hosts(&self) -> Result<Vec<Host>, SourceError>;

    /// One host with its groups; `None` when the id is unknown.
    async fn get_host(&self, host_id: &str) -> Result<Option<Host>, SourceError>;

    /// Host groups that contain monitored hosts, sorted by name.
    async fn list_host_groups(&self) -> Result<Vec<HostGroup>, SourceError>;

    /// Monitored hosts with their groups.
    async fn list_monitored_hosts(&self) -> Result<Vec<Host>, SourceError>;

    /// Enabled items on `host_id` whose key contains `key_pattern`.
    async fn list_items(
        &self,
        host_id: &str,
        key_pattern: &str,
    ) -> Result<Vec<MonitoredItem>, SourceError>;

    /// The newest `query.limit` history rows of one item in the window, ascending by clock.
    async fn fetch_history(&self, query: &HistoryQuery) -> Result<Vec<HistoryRecord>, SourceError>;
}
