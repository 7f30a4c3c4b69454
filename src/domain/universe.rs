//! Instrument universe: which instruments a run covers and loading their bars.

use crate::domain::error::BacktestError;
use crate::domain::instrument_data::InstrumentData;
use crate::ports::data_port::DataPort;
use log::warn;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in instrument list")]
    EmptyToken,

    #[error("duplicate instrument: {0}")]
    DuplicateInstrument(String),
}

pub fn parse_instruments(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut instruments = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let instrument = trimmed.to_uppercase();
        if !seen.insert(instrument.clone()) {
            return Err(UniverseError::DuplicateInstrument(instrument));
        }
        instruments.push(instrument);
    }

    Ok(instruments)
}

#[derive(Debug, Clone)]
pub struct SkippedInstrument {
    pub instrument: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoadedUniverse {
    pub instruments: Vec<InstrumentData>,
    pub skipped: Vec<SkippedInstrument>,
}

/// Fetch bars for every instrument the port knows about, optionally limited
/// to an allow-list. Instruments whose fetch fails are skipped with a note.
/// Failing to list instruments is fatal, and so is every fetch failing: the
/// first fetch error is returned rather than reporting an empty universe.
pub fn load_universe(
    data_port: &dyn DataPort,
    allow_list: Option<&[String]>,
) -> Result<LoadedUniverse, BacktestError> {
    let mut available = data_port.list_instruments()?;
    if let Some(allowed) = allow_list {
        available.retain(|i| allowed.contains(i));
    }

    let mut loaded = LoadedUniverse::default();
    let mut first_error = None;
    for instrument in available {
        match data_port.fetch_bars(&instrument) {
            Ok(bars) => loaded.instruments.push(InstrumentData::new(instrument, bars)),
            Err(e) => {
                warn!("skipping {} ({})", instrument, e);
                loaded.skipped.push(SkippedInstrument {
                    instrument,
                    reason: e.to_string(),
                });
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    match first_error {
        Some(e) if loaded.instruments.is_empty() => Err(e),
        _ => Ok(loaded),
    }
}
