//! Exponential Moving Average.
//!
//! alpha = 2/(n+1), EMA[i] = alpha*C[i] + (1-alpha)*EMA[i-1].
//! Seeding depends on the warm-up policy: `SeedFirst` uses C[0] and has no
//! warm-up; `SeedSma` leaves the first (n-1) values undefined and seeds with
//! the SMA of the first n closes.

use super::WarmupPolicy;

/// Smoothing factor for a span.
pub fn smoothing_factor(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// One value per close; `None` where the EMA is undefined.
///
/// A span of zero yields no values at all. Non-finite results (only possible
/// when a close is itself non-finite) are reported as undefined.
pub fn calculate_ema(closes: &[f64], span: usize, warmup: WarmupPolicy) -> Vec<Option<f64>> {
    if span == 0 || closes.is_empty() {
        return Vec::new();
    }

    let alpha = smoothing_factor(span);
    let mut values = Vec::with_capacity(closes.len());
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, &close) in closes.iter().enumerate() {
        let value = match warmup {
            WarmupPolicy::SeedFirst => {
                ema = if i == 0 {
                    close
                } else {
                    alpha * close + (1.0 - alpha) * ema
                };
                Some(ema)
            }
            WarmupPolicy::SeedSma => {
                if i < span - 1 {
                    sum += close;
                    None
                } else if i == span - 1 {
                    sum += close;
                    ema = sum / span as f64;
                    Some(ema)
                } else {
                    ema = alpha * close + (1.0 - alpha) * ema;
                    Some(ema)
                }
            }
        };
        values.push(value.filter(|v| v.is_finite()));
    }

    values
}
