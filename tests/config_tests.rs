// Config loading and validation tests

mod common;

use common::VALID_CONFIG;
use netreport::config::AppConfig;
use netreport::normalize::UnitPolicy;
use secrecy::ExposeSecret;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.server.port, 8081);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(
        config.zabbix.url,
        "http://zabbix.local/zabbix/api_jsonrpc.php"
    );
    assert_eq!(
        config.zabbix.token.as_ref().map(|t| t.expose_secret()),
        Some("test-token")
    );
    assert_eq!(config.report.unit_policy, UnitPolicy::Bits);
}

#[test]
fn test_config_defaults() {
    let config = AppConfig::load_from_str(VALID_CONFIG).unwrap();
    assert_eq!(config.zabbix.request_timeout_secs, 30);
    assert!(!config.zabbix.accept_invalid_certs);
    assert_eq!(config.report.default_period_minutes, 15);
    assert_eq!(config.report.max_period_minutes, 10080);
    assert_eq!(config.report.history_limit, 1000);
    assert_eq!(config.report.fallback_axis_max, 1_000_000.0);
    assert_eq!(config.report.axis_headroom, 1.2);
}

#[test]
fn test_config_token_is_optional_in_file() {
    let cfg = VALID_CONFIG.replace("token = \"test-token\"\n", "");
    let config = AppConfig::load_from_str(&cfg).unwrap();
    assert!(config.zabbix.token.is_none());

    let blank = VALID_CONFIG.replace("token = \"test-token\"", "token = \"  \"");
    assert!(AppConfig::load_from_str(&blank).unwrap().zabbix.token.is_none());
}

#[test]
fn test_config_token_is_not_debug_printed() {
    let config = AppConfig::load_from_str(VALID_CONFIG).unwrap();
    assert!(!format!("{:?}", config).contains("test-token"));
}

#[test]
fn test_config_requires_unit_policy() {
    let bad = VALID_CONFIG.replace("unit_policy = \"bits\"", "");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("unit_policy"));
}

#[test]
fn test_config_parses_bytes_policy() {
    let cfg = VALID_CONFIG.replace("unit_policy = \"bits\"", "unit_policy = \"bytes\"");
    let config = AppConfig::load_from_str(&cfg).unwrap();
    assert_eq!(config.report.unit_policy, UnitPolicy::Bytes);
}

#[test]
fn test_config_validation_rejects_invalid_port() {
    let bad = VALID_CONFIG.replace("port = 8081", "port = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("server.port"));
}

#[test]
fn test_config_validation_rejects_empty_host() {
    let bad = VALID_CONFIG.replace("host = \"0.0.0.0\"", "host = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("server.host"));
}

#[test]
fn test_config_validation_rejects_bad_url() {
    let bad = VALID_CONFIG.replace(
        "url = \"http://zabbix.local/zabbix/api_jsonrpc.php\"",
        "url = \"not a url\"",
    );
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("zabbix.url"));

    let ftp = VALID_CONFIG.replace("http://zabbix.local", "ftp://zabbix.local");
    let err = AppConfig::load_from_str(&ftp).unwrap_err();
    assert!(err.to_string().contains("http or https"));
}

#[test]
fn test_config_validation_rejects_zero_timeout() {
    let bad = VALID_CONFIG.replace(
        "token = \"test-token\"",
        "token = \"test-token\"\nrequest_timeout_secs = 0",
    );
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("zabbix.request_timeout_secs"));
}

#[test]
fn test_config_validation_rejects_history_limit_out_of_range() {
    for limit in ["0", "1001"] {
        let bad = VALID_CONFIG.replace(
            "unit_policy = \"bits\"",
            &format!("unit_policy = \"bits\"\nhistory_limit = {limit}"),
        );
        let err = AppConfig::load_from_str(&bad).unwrap_err();
        assert!(err.to_string().contains("report.history_limit"), "{limit}");
    }
}

#[test]
fn test_config_validation_rejects_max_period_below_default() {
    let bad = VALID_CONFIG.replace(
        "unit_policy = \"bits\"",
        "unit_policy = \"bits\"\ndefault_period_minutes = 60\nmax_period_minutes = 30",
    );
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("report.max_period_minutes"));
}

#[test]
fn test_config_validation_rejects_headroom_below_one() {
    let bad = VALID_CONFIG.replace(
        "unit_policy = \"bits\"",
        "unit_policy = \"bits\"\naxis_headroom = 0.5",
    );
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("report.axis_headroom"));
}
