//! Lagged EMA entry signals over a 3-bar window.
//!
//! For each `(prev, curr, next)` window the decision uses only `prev`'s
//! relationship to its own EMA and `next`'s candle direction; entry is at
//! `next.open`. `curr` only advances the window.

use chrono::NaiveDateTime;
use std::fmt;

use crate::domain::indicator::AnnotatedBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Stop and target offsets as fractions of the entry price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalParams {
    pub stop_loss_pct: f64,
    pub target_pct: f64,
}

impl Default for SignalParams {
    fn default() -> Self {
        SignalParams {
            stop_loss_pct: 0.05,
            target_pct: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub side: Side,
    pub timestamp: NaiveDateTime,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub target: f64,
    /// Profit per unit if the target is reached.
    pub profit_per_unit: f64,
}

impl Signal {
    fn buy(timestamp: NaiveDateTime, entry_price: f64, params: &SignalParams) -> Self {
        let target = entry_price * (1.0 + params.target_pct);
        Signal {
            side: Side::Buy,
            timestamp,
            entry_price,
            stop_loss: entry_price * (1.0 - params.stop_loss_pct),
            target,
            profit_per_unit: target - entry_price,
        }
    }

    fn sell(timestamp: NaiveDateTime, entry_price: f64, params: &SignalParams) -> Self {
        let target = entry_price * (1.0 - params.target_pct);
        Signal {
            side: Side::Sell,
            timestamp,
            entry_price,
            stop_loss: entry_price * (1.0 + params.stop_loss_pct),
            target,
            profit_per_unit: entry_price - target,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WindowOutcome {
    Emit(Signal),
    /// `prev` has no indicator value yet.
    Skip,
    NoSignal,
}

pub fn evaluate_window(
    prev: &AnnotatedBar<'_>,
    _curr: &AnnotatedBar<'_>,
    next: &AnnotatedBar<'_>,
    params: &SignalParams,
) -> WindowOutcome {
    let Some(ema) = prev.ema else {
        return WindowOutcome::Skip;
    };

    let entry_price = next.bar.open;
    let timestamp = next.bar.timestamp;

    if prev.bar.low > ema && next.bar.is_bullish() {
        WindowOutcome::Emit(Signal::buy(timestamp, entry_price, params))
    } else if prev.bar.high < ema && next.bar.is_bearish() {
        WindowOutcome::Emit(Signal::sell(timestamp, entry_price, params))
    } else {
        WindowOutcome::NoSignal
    }
}

/// Evaluate every full window, in order. Windows are centred on bars
/// `1..=len-2`; series shorter than three bars produce nothing.
pub fn scan<'a>(
    bars: &'a [AnnotatedBar<'a>],
    params: &'a SignalParams,
) -> impl Iterator<Item = WindowOutcome> + 'a {
    bars.windows(3)
        .map(move |w| evaluate_window(&w[0], &w[1], &w[2], params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::Bar;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn bar(hour: u32, open: f64, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            instrument: "EURUSD".into(),
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            open,
            high,
            low,
            close,
            volume: 0.0,
        }
    }

    fn annotated(bar: &Bar, ema: Option<f64>) -> AnnotatedBar<'_> {
        AnnotatedBar { bar, ema }
    }

    #[test]
    fn buy_when_prev_low_above_ema_and_next_bullish() {
        let prev = bar(0, 1.10, 1.12, 1.09, 1.11);
        let curr = bar(1, 1.11, 1.12, 1.10, 1.11);
        let next = bar(2, 1.20, 1.25, 1.19, 1.24);
        let params = SignalParams::default();

        let outcome = evaluate_window(
            &annotated(&prev, Some(1.05)),
            &annotated(&curr, Some(1.06)),
            &annotated(&next, Some(1.08)),
            &params,
        );

        let WindowOutcome::Emit(signal) = outcome else {
            panic!("expected a signal, got {outcome:?}");
        };
        assert_eq!(signal.side, Side::Buy);
        assert_eq!(signal.timestamp, next.timestamp);
        assert_relative_eq!(signal.entry_price, 1.20);
        assert_relative_eq!(signal.stop_loss, 1.20 * 0.95, epsilon = 1e-9);
        assert_relative_eq!(signal.target, 1.20 * 1.15, epsilon = 1e-9);
        assert_relative_eq!(signal.profit_per_unit, signal.target - 1.20);
    }

    #[test]
    fn sell_when_prev_high_below_ema_and_next_bearish() {
        let prev = bar(0, 1.00, 1.01, 0.98, 0.99);
        let curr = bar(1, 0.99, 1.00, 0.97, 0.98);
        let next = bar(2, 0.97, 0.98, 0.94, 0.95);
        let params = SignalParams::default();

        let outcome = evaluate_window(
            &annotated(&prev, Some(1.05)),
            &annotated(&curr, Some(1.03)),
            &annotated(&next, Some(1.01)),
            &params,
        );

        let WindowOutcome::Emit(signal) = outcome else {
            panic!("expected a signal, got {outcome:?}");
        };
        assert_eq!(signal.side, Side::Sell);
        assert_relative_eq!(signal.stop_loss, 0.97 * 1.05, epsilon = 1e-9);
        assert_relative_eq!(signal.target, 0.97 * 0.85, epsilon = 1e-9);
        assert_relative_eq!(signal.profit_per_unit, 0.97 - signal.target);
    }

    #[test]
    fn undefined_prev_ema_skips() {
        let prev = bar(0, 1.10, 1.12, 1.09, 1.11);
        let next = bar(2, 1.20, 1.25, 1.19, 1.24);
        let outcome = evaluate_window(
            &annotated(&prev, None),
            &annotated(&prev, Some(1.0)),
            &annotated(&next, Some(1.0)),
            &SignalParams::default(),
        );
        assert_eq!(outcome, WindowOutcome::Skip);
    }

    #[test]
    fn condition_met_but_wrong_candle_direction() {
        let prev = bar(0, 1.10, 1.12, 1.09, 1.11);
        let next = bar(2, 1.24, 1.25, 1.19, 1.20);
        let outcome = evaluate_window(
            &annotated(&prev, Some(1.05)),
            &annotated(&prev, Some(1.05)),
            &annotated(&next, Some(1.05)),
            &SignalParams::default(),
        );
        assert_eq!(outcome, WindowOutcome::NoSignal);
    }

    #[test]
    fn prev_straddling_ema_is_no_signal() {
        let prev = bar(0, 1.10, 1.12, 1.04, 1.11);
        let next = bar(2, 1.20, 1.25, 1.19, 1.24);
        let outcome = evaluate_window(
            &annotated(&prev, Some(1.05)),
            &annotated(&prev, Some(1.05)),
            &annotated(&next, Some(1.05)),
            &SignalParams::default(),
        );
        assert_eq!(outcome, WindowOutcome::NoSignal);
    }

    #[test]
    fn decision_ignores_next_ema_and_curr() {
        let prev = bar(0, 1.10, 1.12, 1.09, 1.11);
        let wild = bar(1, 9.0, 9.5, 0.1, 0.2);
        let next = bar(2, 1.20, 1.25, 1.19, 1.24);
        let outcome = evaluate_window(
            &annotated(&prev, Some(1.05)),
            &annotated(&wild, None),
            &annotated(&next, None),
            &SignalParams::default(),
        );
        assert!(matches!(outcome, WindowOutcome::Emit(Signal { side: Side::Buy, .. })));
    }

    #[test]
    fn zero_offsets_put_stop_on_entry() {
        let prev = bar(0, 1.10, 1.12, 1.09, 1.11);
        let next = bar(2, 1.20, 1.25, 1.19, 1.24);
        let params = SignalParams {
            stop_loss_pct: 0.0,
            target_pct: 0.15,
        };
        let WindowOutcome::Emit(signal) = evaluate_window(
            &annotated(&prev, Some(1.05)),
            &annotated(&prev, Some(1.05)),
            &annotated(&next, Some(1.05)),
            &params,
        ) else {
            panic!("expected a signal");
        };
        assert_eq!(signal.stop_loss, signal.entry_price);
    }

    #[test]
    fn scan_covers_interior_bars_only() {
        let bars: Vec<Bar> = (0..5).map(|h| bar(h, 1.0, 1.1, 0.9, 1.0)).collect();
        let series: Vec<_> = bars.iter().map(|b| annotated(b, Some(1.0))).collect();
        let params = SignalParams::default();
        assert_eq!(scan(&series, &params).count(), 3);
        assert_eq!(scan(&series[..2], &params).count(), 0);
    }

    #[test]
    fn side_display() {
        assert_eq!(Side::Buy.to_string(), "BUY");
        assert_eq!(Side::Sell.to_string(), "SELL");
    }
}
