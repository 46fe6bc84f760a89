// Human-readable bandwidth formatting (bits/sec family, SI prefixes).

/// Rendered for zero, negative and non-finite rates.
pub const ZERO_RATE: &str = "0 bps";

const KILO: f64 = 1_000.0;
const MEGA: f64 = 1_000_000.0;
const GIGA: f64 = 1_000_000_000.0;

/// Format a rate in bits/sec as e.g. "512.00 bps", "200.00 Kbps", "1.50 Gbps".
///
/// Total over all `f64` input: negative and non-finite values render as [`ZERO_RATE`].
pub fn format_rate(value: f64) -> String {
    if !value.is_finite() || value <= 0.0 {
        return ZERO_RATE.to_string();
    }
    if value < KILO {
        format!("{value:.2} bps")
    } else if value < MEGA {
        format!("{:.2} Kbps", value / KILO)
    } else if value < GIGA {
        format!("{:.2} Mbps", value / MEGA)
    } else {
        format!("{:.2} Gbps", value / GIGA)
    }
}

/// Compact axis label: drops the decimals when they are zero ("200 Kbps").
pub fn format_axis_rate(value: f64) -> String {
    format_rate(value).replace(".00 ", " ")
}
