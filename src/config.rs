use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use url::Url;

use crate::normalize::UnitPolicy;

/// Environment variable that overrides `zabbix.token` from the config file.
pub const TOKEN_ENV: &str = "ZABBIX_TOKEN";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub zabbix: ZabbixConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZabbixConfig {
    /// JSON-RPC endpoint, e.g. `http://zabbix.local/zabbix/api_jsonrpc.php`.
    pub url: String,
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub token: Option<SecretString>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// How raw history values are converted to bits/sec. Required: deployments
    /// disagree on whether items already store bits/sec or byte rates.
    pub unit_policy: UnitPolicy,
    #[serde(default = "default_period_minutes")]
    pub default_period_minutes: u32,
    #[serde(default = "default_max_period_minutes")]
    pub max_period_minutes: u32,
    /// Max history rows requested per item (the metrics source caps this at 1000).
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,
    /// Chart y-axis max used when no sample establishes a positive range.
    #[serde(default = "default_fallback_axis_max")]
    pub fallback_axis_max: f64,
    /// Multiplier applied to the observed peak to get the chart y-axis max.
    #[serde(default = "default_axis_headroom")]
    pub axis_headroom: f64,
}

fn default_period_minutes() -> u32 {
    15
}

fn default_max_period_minutes() -> u32 {
    7 * 24 * 60
}

fn default_history_limit() -> u32 {
    crate::history::MAX_HISTORY_LIMIT
}

fn default_fallback_axis_max() -> f64 {
    crate::chart::FALLBACK_AXIS_MAX
}

fn default_axis_headroom() -> f64 {
    1.2
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .filter(|s| !s.trim().is_empty())
        .map(SecretString::from))
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path, e))?;
        let mut config: AppConfig = toml::from_str(&s)?;
        if let Ok(token) = std::env::var(TOKEN_ENV)
            && !token.trim().is_empty()
        {
            config.zabbix.token = Some(SecretString::from(token));
        }
        config.validate()?;
        anyhow::ensure!(
            config.zabbix.token.is_some(),
            "zabbix.token is not set (config file or {} env var)",
            TOKEN_ENV
        );
        Ok(config)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.server.host.is_empty(), "server.host must be non-empty");

        let url = Url::parse(&self.zabbix.url)
            .map_err(|e| anyhow::anyhow!("zabbix.url is not a valid URL ({}): {}", e, self.zabbix.url))?;
        anyhow::ensure!(
            matches!(url.scheme(), "http" | "https"),
            "zabbix.url must use http or https, got {}",
            url.scheme()
        );
        anyhow::ensure!(
            self.zabbix.request_timeout_secs > 0,
            "zabbix.request_timeout_secs must be > 0, got {}",
            self.zabbix.request_timeout_secs
        );

        let report = &self.report;
        anyhow::ensure!(
            report.default_period_minutes > 0,
            "report.default_period_minutes must be > 0, got {}",
            report.default_period_minutes
        );
        anyhow::ensure!(
            report.max_period_minutes >= report.default_period_minutes,
            "report.max_period_minutes must be >= report.default_period_minutes, got {}",
            report.max_period_minutes
        );
        anyhow::ensure!(
            (1..=crate::history::MAX_HISTORY_LIMIT).contains(&report.history_limit),
            "report.history_limit must be between 1 and {}, got {}",
            crate::history::MAX_HISTORY_LIMIT,
            report.history_limit
        );
        anyhow::ensure!(
            report.fallback_axis_max.is_finite() && report.fallback_axis_max > 0.0,
            "report.fallback_axis_max must be > 0, got {}",
            report.fallback_axis_max
        );
        anyhow::ensure!(
            report.axis_headroom.is_finite() && report.axis_headroom >= 1.0,
            "report.axis_headroom must be >= 1.0, got {}",
            report.axis_headroom
        );
        Ok(())
    }
}
