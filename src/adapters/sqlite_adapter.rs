//! SQLite bar store.
//!
//! Bars are keyed by `(instrument, timestamp)`; re-importing an overlapping
//! range only adds the timestamps not already stored.

use crate::domain::error::BacktestError;
use crate::domain::ohlcv::{parse_timestamp, Bar};
use crate::domain::report::TIMESTAMP_FORMAT;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn pool_error(e: r2d2::Error) -> BacktestError {
    BacktestError::Database {
        reason: e.to_string(),
    }
}

fn query_error(e: rusqlite::Error) -> BacktestError {
    BacktestError::DatabaseQuery {
        reason: e.to_string(),
    }
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, BacktestError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| BacktestError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4)?.clamp(1, 64) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(pool_error)?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    pub fn in_memory() -> Result<Self, BacktestError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_error)?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, BacktestError> {
        self.pool.get().map_err(pool_error)
    }

    pub fn initialize_schema(&self) -> Result<(), BacktestError> {
        self.conn()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS bars (
                    instrument TEXT NOT NULL,
                    timestamp TEXT NOT NULL,
                    open REAL NOT NULL,
                    high REAL NOT NULL,
                    low REAL NOT NULL,
                    close REAL NOT NULL,
                    volume REAL NOT NULL DEFAULT 0,
                    PRIMARY KEY (instrument, timestamp)
                );",
            )
            .map_err(query_error)
    }

    /// Store bars whose timestamp is not yet recorded for their instrument.
    /// Returns how many were new.
    pub fn insert_new_bars(&self, bars: &[Bar]) -> Result<usize, BacktestError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_error)?;

        let mut inserted = 0;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR IGNORE INTO bars (instrument, timestamp, open, high, low, close, volume)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )
                .map_err(query_error)?;

            for bar in bars {
                inserted += stmt
                    .execute(params![
                        bar.instrument,
                        bar.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                        bar.open,
                        bar.high,
                        bar.low,
                        bar.close,
                        bar.volume
                    ])
                    .map_err(query_error)?;
            }
        }

        tx.commit().map_err(query_error)?;
        Ok(inserted)
    }

    pub fn bar_count(&self, instrument: &str) -> Result<usize, BacktestError> {
        let count: i64 = self
            .conn()?
            .query_row(
                "SELECT COUNT(*) FROM bars WHERE instrument = ?1",
                params![instrument],
                |row| row.get(0),
            )
            .map_err(query_error)?;
        Ok(count as usize)
    }
}

impl DataPort for SqliteAdapter {
    fn list_instruments(&self) -> Result<Vec<String>, BacktestError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT instrument FROM bars ORDER BY instrument")
            .map_err(query_error)?;

        let rows = stmt
            .query_map([], |row| row.get(0))
            .map_err(query_error)?;

        rows.collect::<Result<Vec<String>, _>>().map_err(query_error)
    }

    fn fetch_bars(&self, instrument: &str) -> Result<Vec<Bar>, BacktestError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT timestamp, open, high, low, close, volume
                 FROM bars
                 WHERE instrument = ?1
                 ORDER BY timestamp ASC",
            )
            .map_err(query_error)?;

        let rows = stmt
            .query_map(params![instrument], |row| {
                let ts_str: String = row.get(0)?;
                let timestamp = parse_timestamp(&ts_str).ok_or_else(|| {
                    rusqlite::Error::FromSqlConversionFailure(
                        0,
                        rusqlite::types::Type::Text,
                        format!("invalid timestamp '{ts_str}'").into(),
                    )
                })?;
                Ok(Bar {
                    instrument: instrument.to_string(),
                    timestamp,
                    open: row.get(1)?,
                    high: row.get(2)?,
                    low: row.get(3)?,
                    close: row.get(4)?,
                    volume: row.get(5)?,
                })
            })
            .map_err(query_error)?;

        rows.collect::<Result<Vec<Bar>, _>>().map_err(query_error)
    }
}
