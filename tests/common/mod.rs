// Shared test helpers: in-memory metrics source and config fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use netreport::normalize::UnitPolicy;
use netreport::pipeline::PipelineConfig;
use netreport::source::{
    HistoryQuery, HistoryRecord, Host, HostGroup, MetricsSource, MonitoredItem, SourceError,
};

pub const VALID_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"

[zabbix]
url = "http://zabbix.local/zabbix/api_jsonrpc.php"
token = "test-token"

[report]
unit_policy = "bits"
"#;

/// Fixed "now" for pipeline tests: 2023-11-14T22:13:20Z.
pub const NOW_SECS: i64 = 1_700_000_000;

pub fn pipeline_config() -> PipelineConfig {
    let mut config = PipelineConfig::new(UnitPolicy::Bits);
    config.request_timeout = Duration::from_millis(200);
    config
}

pub fn group(id: &str, name: &str) -> HostGroup {
    HostGroup {
        group_id: id.into(),
        name: name.into(),
    }
}

pub fn item(item_id: &str, display_name: &str, key: &str, value_type: u8) -> MonitoredItem {
    MonitoredItem {
        item_id: item_id.into(),
        display_name: display_name.into(),
        key: key.into(),
        value_type,
    }
}

/// In-memory [`MetricsSource`] with per-item failure and latency injection.
#[derive(Default)]
pub struct FakeSource {
    hosts: Vec<Host>,
    groups: Vec<HostGroup>,
    items: HashMap<String, Vec<MonitoredItem>>,
    history: HashMap<String, Vec<HistoryRecord>>,
    failing_items: HashSet<String>,
    slow_items: HashMap<String, Duration>,
    unavailable: bool,
    history_queries: Mutex<Vec<HistoryQuery>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host_id: &str, name: &str, groups: Vec<HostGroup>) -> Self {
        for g in &groups {
            if !self.groups.contains(g) {
                self.groups.push(g.clone());
            }
        }
        self.hosts.push(Host {
            host_id: host_id.into(),
            name: name.into(),
            groups,
        });
        self
    }

    pub fn with_item(mut self, host_id: &str, item: MonitoredItem) -> Self {
        self.items.entry(host_id.into()).or_default().push(item);
        self
    }

    /// `(clock, value)` rows for one item, in the order given.
    pub fn with_history(mut self, item_id: &str, rows: &[(i64, f64)]) -> Self {
        self.history.insert(
            item_id.into(),
            rows.iter()
                .map(|&(clock, value)| HistoryRecord {
                    clock,
                    ns: 0,
                    value,
                })
                .collect(),
        );
        self
    }

    pub fn failing(mut self, item_id: &str) -> Self {
        self.failing_items.insert(item_id.into());
        self
    }

    pub fn slow(mut self, item_id: &str, delay: Duration) -> Self {
        self.slow_items.insert(item_id.into(), delay);
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub fn history_queries(&self) -> Vec<HistoryQuery> {
        self.history_queries.lock().unwrap().clone()
    }

    fn check_available(&self) -> Result<(), SourceError> {
        if self.unavailable {
            return Err(SourceError::Api {
                code: -32500,
                message: "Application error.".into(),
                data: "backend down".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MetricsSource for FakeSource {
    async fn health_check(&self) -> Result<String, SourceError> {
        self.check_available()?;
        Ok("7.0.0".into())
    }

    async fn list_hosts(&self) -> Result<Vec<Host>, SourceError> {
        self.check_available()?;
        let mut hosts: Vec<Host> = self
            .hosts
            .iter()
            .map(|h| Host {
                host_id: h.host_id.clone(),
                name: h.name.clone(),
                groups: Vec::new(),
            })
            .collect();
        hosts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(hosts)
    }

    async fn get_host(&self, host_id: &str) -> Result<Option<Host>, SourceError> {
        self.check_available()?;
        Ok(self.hosts.iter().find(|h| h.host_id == host_id).cloned())
    }

    async fn list_host_groups(&self) -> Result<Vec<HostGroup>, SourceError> {
        self.check_available()?;
        let mut groups = self.groups.clone();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    async fn list_monitored_hosts(&self) -> Result<Vec<Host>, SourceError> {
        self.check_available()?;
        Ok(self.hosts.clone())
    }

    async fn list_items(
        &self,
        host_id: &str,
        key_pattern: &str,
    ) -> Result<Vec<MonitoredItem>, SourceError> {
        self.check_available()?;
        Ok(self
            .items
            .get(host_id)
            .map(|items| {
                items
                    .iter()
                    .filter(|i| i.key.contains(key_pattern))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn fetch_history(&self, query: &HistoryQuery) -> Result<Vec<HistoryRecord>, SourceError> {
        self.check_available()?;
        self.history_queries.lock().unwrap().push(query.clone());
        if let Some(delay) = self.slow_items.get(&query.item_id) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_items.contains(&query.item_id) {
            return Err(SourceError::Api {
                code: -32602,
                message: "Invalid params.".into(),
                data: format!("item {} unavailable", query.item_id),
            });
        }
        let mut rows: Vec<HistoryRecord> = self
            .history
            .get(&query.item_id)
            .map(|rows| {
                rows.iter()
                    .filter(|r| r.clock >= query.time_from && r.clock <= query.time_till)
                    .copied()
                    .collect()
            })
            .unwrap_or_default();
        rows.sort_by_key(|r| r.clock);
        let excess = rows.len().saturating_sub(query.limit as usize);
        rows.drain(..excess);
        Ok(rows)
    }
}

/// Host "2" ("edge-router", group "Routers") with one SNMP interface named "2"
/// and three download samples inside the last 15 minutes before [`NOW_SECS`].
pub fn edge_router() -> FakeSource {
    FakeSource::new()
        .with_host("2", "edge-router", vec![group("4", "Routers")])
        .with_item("2", item("100", "Bits received", "net.if.in[ifHCInOctets.2]", 3))
        .with_item("2", item("101", "Bits sent", "net.if.out[ifHCOutOctets.2]", 3))
        .with_history(
            "100",
            &[
                (NOW_SECS - 600, 100_000.0),
                (NOW_SECS - 300, 200_000.0),
                (NOW_SECS - 60, 150_000.0),
            ],
        )
}
