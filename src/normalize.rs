// Series normalizer: raw history values → bits/sec points with display strings.

use serde::Deserialize;

use crate::format::format_rate;
use crate::models::{Direction, NormalizedPoint, Sample, Series};

/// How raw item values map to bits/sec. Chosen per deployment in config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitPolicy {
    /// Items already store bits/sec (e.g. templates with a ×8 preprocessing step).
    Bits,
    /// Items store bytes/sec; multiply by 8.
    Bytes,
}

impl UnitPolicy {
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Bits => 1.0,
            Self::Bytes => 8.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Bits => "bits",
            Self::Bytes => "bytes",
        }
    }
}

/// One point per sample, order preserved. Empty input gives an empty series.
pub fn normalize(direction: Direction, samples: &[Sample], policy: UnitPolicy) -> Series {
    let multiplier = policy.multiplier();
    let points = samples
        .iter()
        .map(|s| {
            let value = s.raw_value * multiplier;
            NormalizedPoint {
                timestamp: s.timestamp,
                value,
                formatted: format_rate(value),
            }
        })
        .collect();
    Series { direction, points }
}
