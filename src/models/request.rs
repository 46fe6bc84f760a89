// Report request parameters and per-direction statistics

use serde::{Deserialize, Serialize};

use crate::error::ReportError;
use crate::format::{ZERO_RATE, format_rate};

/// Input of one report: which host/interface and how many recent minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub host_id: String,
    pub interface_name: String,
    pub period_minutes: u32,
}

impl ReportRequest {
    pub fn new(
        host_id: impl Into<String>,
        interface_name: impl Into<String>,
        period_minutes: u32,
    ) -> Self {
        Self {
            host_id: host_id.into(),
            interface_name: interface_name.into(),
            period_minutes,
        }
    }

    /// Checks required fields and the period bounds.
    pub fn validate(&self, max_period_minutes: u32) -> Result<(), ReportError> {
        if self.host_id.trim().is_empty() {
            return Err(ReportError::Validation("host id is required".into()));
        }
        if self.interface_name.trim().is_empty() {
            return Err(ReportError::Validation("interface is required".into()));
        }
        if self.period_minutes == 0 {
            return Err(ReportError::Validation(
                "period must be a positive number of minutes".into(),
            ));
        }
        if self.period_minutes > max_period_minutes {
            return Err(ReportError::Validation(format!(
                "period must be at most {max_period_minutes} minutes, got {}",
                self.period_minutes
            )));
        }
        Ok(())
    }
}

/// Parse a form/query period. Missing or blank → `default`; anything that is
/// not a positive integer is a validation error.
pub fn parse_period(raw: Option<&str>, default: u32) -> Result<u32, ReportError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(default);
    };
    match raw.parse::<i64>() {
        Ok(p) if p > 0 => u32::try_from(p)
            .map_err(|_| ReportError::Validation(format!("period is too large: {raw}"))),
        Ok(_) => Err(ReportError::Validation(
            "period must be a positive number of minutes".into(),
        )),
        Err(_) => Err(ReportError::Validation(format!(
            "period must be an integer number of minutes, got {raw:?}"
        ))),
    }
}

/// A numeric value paired with its formatted rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistic {
    pub value: f64,
    pub formatted: String,
}

impl Statistic {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            formatted: format_rate(value),
        }
    }

    pub fn zero() -> Self {
        Self {
            value: 0.0,
            formatted: ZERO_RATE.to_string(),
        }
    }
}

/// Aggregates over one series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportStatistics {
    pub max: Statistic,
    pub mean: Statistic,
    pub last_value: Statistic,
    pub percentile_95: Statistic,
}

impl ReportStatistics {
    pub fn zero() -> Self {
        Self {
            max: Statistic::zero(),
            mean: Statistic::zero(),
            last_value: Statistic::zero(),
            percentile_95: Statistic::zero(),
        }
    }
}
