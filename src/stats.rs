// Statistics over a normalized series: max, mean, last value, 95th percentile.

use crate::models::{ReportStatistics, Series, Statistic};

/// Percentile reported alongside max/mean/last.
pub const REPORT_PERCENTILE: f64 = 95.0;

/// All-zero statistics for an empty series; never divides by zero.
/// Non-finite values are skipped.
pub fn compute_statistics(series: &Series) -> ReportStatistics {
    let values: Vec<f64> = series.values().filter(|v| v.is_finite()).collect();
    if values.is_empty() {
        return ReportStatistics::zero();
    }
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let last = values.last().copied().unwrap_or(0.0);

    ReportStatistics {
        max: Statistic::new(max),
        mean: Statistic::new(mean(&values)),
        last_value: Statistic::new(last),
        percentile_95: Statistic::new(percentile(&values, REPORT_PERCENTILE)),
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// `p`-th percentile (0..=100) with linear interpolation between the closest
/// ranks: rank = p/100 × (n − 1) over the sorted finite values. 0 for no values.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return 0.0;
    }
    sorted.sort_by(f64::total_cmp);

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&v, 50.0), 3.0);
        assert!((percentile(&v, 95.0) - 4.8).abs() < 1e-9);
        assert_eq!(percentile(&v, 100.0), 5.0);
        assert_eq!(percentile(&v, 0.0), 1.0);
    }

    #[test]
    fn percentile_of_single_value() {
        assert_eq!(percentile(&[7.0], 95.0), 7.0);
        assert_eq!(percentile(&[], 95.0), 0.0);
    }

    #[test]
    fn percentile_ignores_input_order() {
        assert_eq!(
            percentile(&[5.0, 1.0, 4.0, 2.0, 3.0], 95.0),
            percentile(&[1.0, 2.0, 3.0, 4.0, 5.0], 95.0)
        );
    }

    #[test]
    fn percentile_skips_nan() {
        let p = percentile(&[5.0, f64::NAN, 1.0, 3.0], 100.0);
        assert_eq!(p, 5.0);
        assert_eq!(percentile(&[f64::NAN], 95.0), 0.0);
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
    }
}
