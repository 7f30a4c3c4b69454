//! Per-instrument bar series and the run's evaluation order.

use crate::domain::ohlcv::Bar;

#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentData {
    pub instrument: String,
    pub bars: Vec<Bar>,
}

impl InstrumentData {
    pub fn new(instrument: impl Into<String>, bars: Vec<Bar>) -> Self {
        Self {
            instrument: instrument.into(),
            bars,
        }
    }

    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// Lexicographic by instrument identifier; ties keep input order.
pub fn evaluation_order(instruments: &[InstrumentData]) -> Vec<&InstrumentData> {
    let mut ordered: Vec<&InstrumentData> = instruments.iter().collect();
    ordered.sort_by(|a, b| a.instrument.cmp(&b.instrument));
    ordered
}
