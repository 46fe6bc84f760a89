// Zabbix JSON-RPC client
//
// Wraps one reusable `reqwest::Client` with the JSON-RPC envelope and token
// auth. Constructed once at startup and shared behind `Arc<dyn MetricsSource>`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, instrument};
use url::Url;

use super::{
    HistoryQuery, HistoryRecord, Host, HostGroup, MetricsSource, MonitoredItem, SourceError,
};
use crate::config::ZabbixConfig;

/// Item status 0 = enabled.
const ITEM_STATUS_ENABLED: &str = "0";
/// Host status 0 = monitored.
const HOST_STATUS_MONITORED: &str = "0";

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: String,
}

pub struct ZabbixClient {
    http: reqwest::Client,
    url: Url,
    token: SecretString,
    timeout: Duration,
    next_id: AtomicU64,
}

impl ZabbixClient {
    /// Build the client from config. Does not touch the network; call
    /// [`MetricsSource::health_check`] to verify the endpoint.
    pub fn connect(config: &ZabbixConfig) -> Result<Self, SourceError> {
        let url = Url::parse(&config.url)?;
        let token = config.token.clone().ok_or(SourceError::MissingToken)?;
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(crate::version::user_agent())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;
        Ok(Self::with_client(http, url, token, timeout))
    }

    /// Create a client around a pre-built `reqwest::Client` (tests, custom TLS).
    pub fn with_client(
        http: reqwest::Client,
        url: Url,
        token: SecretString,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            url,
            token,
            timeout,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn auth_headers(&self) -> Result<HeaderMap, SourceError> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&format!("Bearer {}", self.token.expose_secret()))
            .map_err(|_| SourceError::MissingToken)?;
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }

    /// Send one JSON-RPC call and unwrap `result`, or map the `error` object.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
        authenticated: bool,
    ) -> Result<T, SourceError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });
        debug!(method, id, "POST {}", self.url);

        let mut request = self.http.post(self.url.clone()).json(&body);
        if authenticated {
            request = request.headers(self.auth_headers()?);
        }
        let timeout_secs = self.timeout.as_secs();
        let resp = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| SourceError::from_transport(e, timeout_secs))?;
        let text = resp
            .text()
            .await
            .map_err(|e| SourceError::from_transport(e, timeout_secs))?;

        let envelope: RpcResponse<T> =
            serde_json::from_str(&text).map_err(|e| SourceError::Deserialization {
                message: format!("{method}: {e}"),
                body: text.clone(),
            })?;
        if let Some(err) = envelope.error {
            return Err(SourceError::Api {
                code: err.code,
                message: err.message,
                data: err.data,
            });
        }
        envelope.result.ok_or_else(|| SourceError::Deserialization {
            message: format!("{method}: response has neither result nor error"),
            body: text,
        })
    }
}

#[async_trait]
impl MetricsSource for ZabbixClient {
    #[instrument(skip(self), fields(source = "zabbix", operation = "health_check"))]
    async fn health_check(&self) -> Result<String, SourceError> {
        // apiinfo.version rejects requests that carry auth.
        self.call("apiinfo.version", json!({}), false).await
    }

    #[instrument(skip(self), fields(source = "zabbix", operation = "list_hosts"))]
    async fn list_hosts(&self) -> Result<Vec<Host>, SourceError> {
        self.call(
            "host.get",
            json!({
                "output": ["hostid", "name"],
                "sortfield": "name",
            }),
            true,
        )
        .await
    }

    #[instrument(skip(self), fields(source = "zabbix", operation = "get_host"))]
    async fn get_host(&self, host_id: &str) -> Result<Option<Host>, SourceError> {
        let hosts: Vec<Host> = self
            .call(
                "host.get",
                json!({
                    "output": ["hostid", "name"],
                    "hostids": host_id,
                    "selectGroups": ["groupid", "name"],
                }),
                true,
            )
            .await?;
        Ok(hosts.into_iter().next())
    }

    #[instrument(skip(self), fields(source = "zabbix", operation = "list_host_groups"))]
    async fn list_host_groups(&self) -> Result<Vec<HostGroup>, SourceError> {
        self.call(
            "hostgroup.get",
            json!({
                "output": ["groupid", "name"],
                "sortfield": "name",
                "with_monitored_hosts": true,
            }),
            true,
        )
        .await
    }

    #[instrument(skip(self), fields(source = "zabbix", operation = "list_monitored_hosts"))]
    async fn list_monitored_hosts(&self) -> Result<Vec<Host>, SourceError> {
        self.call(
            "host.get",
            json!({
                "output": ["hostid", "name"],
                "filter": { "status": HOST_STATUS_MONITORED },
                "monitored_hosts": true,
                "selectGroups": ["groupid", "name"],
                "sortfield": "name",
            }),
            true,
        )
        .await
    }

    #[instrument(skip(self), fields(source = "zabbix", operation = "list_items"))]
    async fn list_items(
        &self,
        host_id: &str,
        key_pattern: &str,
    ) -> Result<Vec<MonitoredItem>, SourceError> {
        self.call(
            "item.get",
            json!({
                "output": ["itemid", "name", "key_", "value_type"],
                "hostids": host_id,
                "search": { "key_": key_pattern },
                "filter": { "status": ITEM_STATUS_ENABLED },
                "sortfield": "itemid",
            }),
            true,
        )
        .await
    }

    #[instrument(
        skip(self, query),
        fields(source = "zabbix", operation = "fetch_history", item_id = %query.item_id)
    )]
    async fn fetch_history(&self, query: &HistoryQuery) -> Result<Vec<HistoryRecord>, SourceError> {
        // Newest first so `limit` drops the oldest rows of the window.
        let mut rows: Vec<HistoryRecord> = self
            .call(
                "history.get",
                json!({
                    "output": ["clock", "ns", "value"],
                    "itemids": query.item_id,
                    "history": query.channel.as_u8(),
                    "time_from": query.time_from,
                    "time_till": query.time_till,
                    "sortfield": "clock",
                    "sortorder": "DESC",
                    "limit": query.limit,
                }),
                true,
            )
            .await?;
        rows.reverse();
        Ok(rows)
    }
}
