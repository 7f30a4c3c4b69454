//! Technical indicators over a bar series.
//!
//! - `WarmupPolicy`: how the EMA is seeded, and therefore how many leading
//!   bars carry no indicator value
//! - `AnnotatedBar`: a bar paired with its EMA (or `None` while undefined)
//! - `annotate`: runs the EMA over a series and pairs the results back up

pub mod ema;

use std::fmt;
use std::str::FromStr;

use crate::domain::ohlcv::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WarmupPolicy {
    /// Seed from the first close; every bar has a value.
    #[default]
    SeedFirst,
    /// First `span - 1` bars undefined, seed with the SMA of the first `span` closes.
    SeedSma,
}

impl fmt::Display for WarmupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarmupPolicy::SeedFirst => write!(f, "seed_first"),
            WarmupPolicy::SeedSma => write!(f, "seed_sma"),
        }
    }
}

impl FromStr for WarmupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "seed_first" | "first" => Ok(WarmupPolicy::SeedFirst),
            "seed_sma" | "sma" => Ok(WarmupPolicy::SeedSma),
            other => Err(format!(
                "unknown warmup policy '{other}' (expected seed_first or seed_sma)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedBar<'a> {
    pub bar: &'a Bar,
    pub ema: Option<f64>,
}

/// Pair every bar with its EMA value.
pub fn annotate(bars: &[Bar], span: usize, warmup: WarmupPolicy) -> Vec<AnnotatedBar<'_>> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let values = ema::calculate_ema(&closes, span, warmup);
    bars.iter()
        .zip(values)
        .map(|(bar, ema)| AnnotatedBar { bar, ema })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bars(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                instrument: "EURUSD".into(),
                timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(i as u32, 0, 0)
                    .unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 0.0,
            })
            .collect()
    }

    #[test]
    fn warmup_policy_parse() {
        assert_eq!("seed_first".parse::<WarmupPolicy>(), Ok(WarmupPolicy::SeedFirst));
        assert_eq!(" SEED_SMA ".parse::<WarmupPolicy>(), Ok(WarmupPolicy::SeedSma));
        assert!("lagged".parse::<WarmupPolicy>().is_err());
    }

    #[test]
    fn warmup_policy_display_round_trips() {
        for policy in [WarmupPolicy::SeedFirst, WarmupPolicy::SeedSma] {
            assert_eq!(policy.to_string().parse::<WarmupPolicy>(), Ok(policy));
        }
    }

    #[test]
    fn annotate_keeps_length_and_order() {
        let series = bars(&[1.0, 2.0, 3.0]);
        let annotated = annotate(&series, 5, WarmupPolicy::SeedFirst);
        assert_eq!(annotated.len(), 3);
        for (a, b) in annotated.iter().zip(&series) {
            assert_eq!(a.bar.timestamp, b.timestamp);
        }
        assert_eq!(annotated[0].ema, Some(1.0));
    }

    #[test]
    fn annotate_sma_warmup_leaves_gap() {
        let series = bars(&[1.0, 2.0, 3.0, 4.0]);
        let annotated = annotate(&series, 3, WarmupPolicy::SeedSma);
        assert!(annotated[0].ema.is_none());
        assert!(annotated[1].ema.is_none());
        assert_eq!(annotated[2].ema, Some(2.0));
        assert!(annotated[3].ema.is_some());
    }
}
