// History fetcher: bounded, most-recent-window queries with per-item failure isolation.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tracing::{instrument, warn};

use crate::models::{ItemRef, Sample};
use crate::source::{HistoryQuery, HistoryRecord, MetricsSource, SourceError};

/// Hard cap on rows requested per item per report.
pub const MAX_HISTORY_LIMIT: u32 = 1000;

/// `[from, till]` in Unix seconds: always the most recent `period` minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub time_from: i64,
    pub time_till: i64,
}

impl TimeWindow {
    pub fn last_minutes(now: DateTime<Utc>, period_minutes: u32) -> Self {
        let time_till = now.timestamp();
        Self {
            time_from: time_till - i64::from(period_minutes) * 60,
            time_till,
        }
    }
}

/// Fetch settings shared by every item of a report.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub limit: u32,
    /// Upper bound on one source call, independent of the source's own timeout.
    pub timeout: Duration,
}

impl FetchOptions {
    pub fn new(limit: u32, timeout: Duration) -> Self {
        Self {
            limit: limit.clamp(1, MAX_HISTORY_LIMIT),
            timeout,
        }
    }
}

/// The newest `options.limit` samples of one item in `window`, ascending by timestamp.
#[instrument(
    skip(source, item, options),
    fields(operation = "fetch_history", item_id = %item.item_id)
)]
pub async fn fetch_history(
    source: &dyn MetricsSource,
    item: &ItemRef,
    window: TimeWindow,
    options: FetchOptions,
) -> Result<Vec<Sample>, SourceError> {
    let query = HistoryQuery {
        item_id: item.item_id.clone(),
        channel: item.channel,
        time_from: window.time_from,
        time_till: window.time_till,
        limit: options.limit,
    };
    let records = tokio::time::timeout(options.timeout, source.fetch_history(&query))
        .await
        .map_err(|_| SourceError::Timeout {
            timeout_secs: options.timeout.as_secs(),
        })??;
    let limit = options.limit as usize;
    if records.len() >= limit {
        warn!(
            item_id = %item.item_id,
            limit,
            window_minutes = (window.time_till - window.time_from) / 60,
            "history row limit reached; older samples in the window are dropped"
        );
    }
    let mut samples: Vec<Sample> = records.into_iter().filter_map(to_sample).collect();
    // Stable: equal clocks keep source order.
    samples.sort_by_key(|s| s.timestamp);
    // Keep the newest rows when a source returns more than asked for.
    let excess = samples.len().saturating_sub(limit);
    samples.drain(..excess);
    Ok(samples)
}

/// Like [`fetch_history`], but a failure is logged and yields no samples so
/// one broken item never aborts the report.
pub async fn fetch_history_or_empty(
    source: &dyn MetricsSource,
    item: &ItemRef,
    window: TimeWindow,
    options: FetchOptions,
) -> Vec<Sample> {
    match fetch_history(source, item, window, options).await {
        Ok(samples) => samples,
        Err(e) => {
            warn!(
                error = %e,
                item_id = %item.item_id,
                key = %item.key,
                operation = "fetch_history",
                "history fetch failed; direction will be empty"
            );
            Vec::new()
        }
    }
}

fn to_sample(record: HistoryRecord) -> Option<Sample> {
    let timestamp = Utc.timestamp_opt(record.clock, record.ns).single()?;
    Some(Sample {
        timestamp,
        raw_value: record.value,
    })
}
