// Samples and normalized series

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Direction;

/// One raw metric reading, as fetched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub raw_value: f64,
}

/// A sample converted to bits/sec, with its display string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub formatted: String,
}

/// Ordered points for one direction over one query window. May be empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub direction: Direction,
    pub points: Vec<NormalizedPoint>,
}

impl Series {
    pub fn empty(direction: Direction) -> Self {
        Self {
            direction,
            points: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn last(&self) -> Option<&NormalizedPoint> {
        self.points.last()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }

    /// Largest value, or `None` for an empty series.
    pub fn peak(&self) -> Option<f64> {
        self.values().reduce(f64::max)
    }
}
