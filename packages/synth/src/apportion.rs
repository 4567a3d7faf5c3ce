//! Turning fractional shares into whole counts.
//!
//! Both the population split and the incident estimate distribute a fixed
//! integer total across neighborhoods in proportion to real-valued weights.
//! [`apportion`] uses the largest-remainder method so the parts always sum
//! to the total; [`scale_independently`] rounds each part on its own.

/// Splits `total` into parts proportional to `weights` using the
/// largest-remainder method.
///
/// Negative and non-finite weights count as zero. When no weight is
/// positive every part is 0. Otherwise the parts sum to exactly `total`.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn apportion(weights: &[f64], total: u64) -> Vec<u64> {
    let Some(quotas) = quotas(weights, total) else {
        return vec![0; weights.len()];
    };

    let mut parts: Vec<u64> = quotas.iter().map(|q| q.floor() as u64).collect();
    let assigned: u64 = parts.iter().sum();
    let remainder = total.saturating_sub(assigned);

    let mut order: Vec<usize> = (0..quotas.len()).filter(|&i| quotas[i] > 0.0).collect();
    order.sort_by(|&a, &b| {
        let frac_a = quotas[a] - quotas[a].floor();
        let frac_b = quotas[b] - quotas[b].floor();
        frac_b
            .total_cmp(&frac_a)
            .then_with(|| quotas[b].total_cmp(&quotas[a]))
            .then_with(|| a.cmp(&b))
    });

    for &idx in order.iter().cycle().take(remainder as usize) {
        parts[idx] += 1;
    }

    parts
}

/// Scales `weights` so they sum to `total`, then rounds each part with
/// `round` (e.g. [`f64::floor`] or [`f64::round`]).
///
/// Negative and non-finite weights count as zero. When no weight is
/// positive every part is 0. The parts may not sum to `total` exactly.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn scale_independently(weights: &[f64], total: u64, round: fn(f64) -> f64) -> Vec<u64> {
    quotas(weights, total).map_or_else(
        || vec![0; weights.len()],
        |quotas| quotas.into_iter().map(|q| round(q).max(0.0) as u64).collect(),
    )
}

/// Real-valued shares of `total`, or `None` when no weight is positive.
#[allow(clippy::cast_precision_loss)]
fn quotas(weights: &[f64], total: u64) -> Option<Vec<f64>> {
    let sanitized: Vec<f64> = weights
        .iter()
        .map(|&w| if w.is_finite() && w > 0.0 { w } else { 0.0 })
        .collect();
    let sum: f64 = sanitized.iter().sum();

    if sum <= 0.0 || !sum.is_finite() {
        return None;
    }

    let scale = total as f64 / sum;
    Some(sanitized.into_iter().map(|w| w * scale).collect())
}
