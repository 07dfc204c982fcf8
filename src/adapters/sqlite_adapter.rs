//! SQLite price source behind an r2d2 connection pool.

use crate::domain::error::TickerscopeError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::{DataPort, DataRange};
use chrono::NaiveDate;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::path::Path;
use tracing::debug;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn pool_error(e: r2d2::Error) -> TickerscopeError {
    TickerscopeError::DataSource {
        reason: e.to_string(),
    }
}

fn query_error(e: rusqlite::Error) -> TickerscopeError {
    TickerscopeError::DataQuery {
        reason: e.to_string(),
    }
}

fn parse_date(text: &str) -> Result<NaiveDate, TickerscopeError> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|e| TickerscopeError::DataQuery {
        reason: format!("invalid stored date '{}': {}", text, e),
    })
}

impl SqliteAdapter {
    pub fn open(path: &Path, pool_size: u32) -> Result<Self, TickerscopeError> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(pool_error)?;
        debug!(path = %path.display(), pool_size, "opened sqlite pool");
        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, TickerscopeError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_error)?;
        Ok(Self { pool })
    }

    pub fn initialize_schema(&self) -> Result<(), TickerscopeError> {
        let conn = self.pool.get().map_err(pool_error)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS ohlcv (
                code TEXT NOT NULL,
                market TEXT NOT NULL,
                date TEXT NOT NULL,
                open REAL NOT NULL,
                high REAL NOT NULL,
                low REAL NOT NULL,
                close REAL NOT NULL,
                volume INTEGER NOT NULL,
                PRIMARY KEY (code, market, date)
            );
            CREATE INDEX IF NOT EXISTS idx_ohlcv_code_market ON ohlcv(code, market);",
        )
        .map_err(query_error)
    }

    /// Upserts bars; a bar for an existing (code, market, date) replaces it.
    pub fn insert_bars(&self, bars: &[OhlcvBar]) -> Result<(), TickerscopeError> {
        let mut conn = self.pool.get().map_err(pool_error)?;
        let tx = conn.transaction().map_err(query_error)?;

        for bar in bars {
            tx.execute(
                "INSERT OR REPLACE INTO ohlcv (code, market, date, open, high, low, close, volume)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    bar.code,
                    bar.market,
                    bar.date.format(DATE_FORMAT).to_string(),
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close,
                    bar.volume
                ],
            )
            .map_err(query_error)?;
        }

        tx.commit().map_err(query_error)
    }
}

impl DataPort for SqliteAdapter {
    fn fetch_ohlcv(
        &self,
        code: &str,
        market: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, TickerscopeError> {
        let conn = self.pool.get().map_err(pool_error)?;

        let mut stmt = conn
            .prepare(
                "SELECT code, market, date, open, high, low, close, volume
                 FROM ohlcv
                 WHERE code = ?1 AND market = ?2 AND date >= ?3 AND date <= ?4
                 ORDER BY date ASC",
            )
            .map_err(query_error)?;

        let rows = stmt
            .query_map(
                params![
                    code,
                    market,
                    start_date.format(DATE_FORMAT).to_string(),
                    end_date.format(DATE_FORMAT).to_string()
                ],
                |row| {
                    let date: String = row.get(2)?;
                    Ok((
                        date,
                        OhlcvBar {
                            code: row.get(0)?,
                            market: row.get(1)?,
                            date: NaiveDate::MIN,
                            open: row.get(3)?,
                            high: row.get(4)?,
                            low: row.get(5)?,
                            close: row.get(6)?,
                            volume: row.get(7)?,
                        },
                    ))
                },
            )
            .map_err(query_error)?;

        let mut bars = Vec::new();
        for row in rows {
            let (date, mut bar) = row.map_err(query_error)?;
            bar.date = parse_date(&date)?;
            bars.push(bar);
        }

        Ok(bars)
    }

    fn list_symbols(&self, market: &str) -> Result<Vec<String>, TickerscopeError> {
        let conn = self.pool.get().map_err(pool_error)?;

        let mut stmt = conn
            .prepare("SELECT DISTINCT code FROM ohlcv WHERE market = ?1 ORDER BY code")
            .map_err(query_error)?;

        let rows = stmt
            .query_map(params![market], |row| row.get(0))
            .map_err(query_error)?;

        rows.collect::<Result<Vec<String>, _>>().map_err(query_error)
    }

    fn get_data_range(
        &self,
        code: &str,
        market: &str,
    ) -> Result<Option<DataRange>, TickerscopeError> {
        let conn = self.pool.get().map_err(pool_error)?;

        let (first, last, count): (Option<String>, Option<String>, i64) = conn
            .query_row(
                "SELECT MIN(date), MAX(date), COUNT(*) FROM ohlcv WHERE code = ?1 AND market = ?2",
                params![code, market],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(query_error)?;

        match (first, last) {
            (Some(first), Some(last)) if count > 0 => Ok(Some(DataRange {
                first: parse_date(&first)?,
                last: parse_date(&last)?,
                bars: count as usize,
            })),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn bar(code: &str, market: &str, day: u32, close: f64) -> OhlcvBar {
        OhlcvBar {
            code: code.to_string(),
            market: market.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close - 0.5,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000 + day as i64,
        }
    }

    fn seeded() -> SqliteAdapter {
        let adapter = SqliteAdapter::in_memory().unwrap();
        adapter.initialize_schema().unwrap();
        adapter
            .insert_bars(&[
                bar("AAPL", "US", 2, 101.5),
                bar("AAPL", "US", 1, 100.5),
                bar("AAPL", "US", 5, 102.5),
                bar("MSFT", "US", 1, 150.5),
                bar("0700", "HK", 1, 300.0),
            ])
            .unwrap();
        adapter
    }

    #[test]
    fn schema_is_idempotent() {
        let adapter = SqliteAdapter::in_memory().unwrap();
        adapter.initialize_schema().unwrap();
        adapter.initialize_schema().unwrap();
    }

    #[test]
    fn fetch_returns_bars_in_date_order() {
        let adapter = seeded();
        let fetched = adapter
            .fetch_ohlcv(
                "AAPL",
                "US",
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            )
            .unwrap();

        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched[0].code, "AAPL");
        assert_eq!(fetched[0].market, "US");
        assert_eq!(fetched[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(fetched[1].close, 101.5);
        assert_eq!(fetched[1].volume, 1002);
    }

    #[test]
    fn insert_replaces_existing_bar() {
        let adapter = seeded();
        adapter.insert_bars(&[bar("AAPL", "US", 1, 99.0)]).unwrap();

        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let fetched = adapter.fetch_ohlcv("AAPL", "US", day, day).unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].close, 99.0);
    }

    #[test]
    fn list_symbols_by_market() {
        let adapter = seeded();
        assert_eq!(adapter.list_symbols("US").unwrap(), vec!["AAPL", "MSFT"]);
        assert_eq!(adapter.list_symbols("HK").unwrap(), vec!["0700"]);
    }

    #[test]
    fn data_range() {
        let adapter = seeded();
        let range = adapter.get_data_range("AAPL", "US").unwrap().unwrap();
        assert_eq!(range.first, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(range.last, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(range.bars, 3);

        assert!(adapter.get_data_range("AAPL", "HK").unwrap().is_none());
    }

    #[test]
    fn file_database_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prices.db");
        {
            let adapter = SqliteAdapter::open(&path, 2).unwrap();
            adapter.initialize_schema().unwrap();
            adapter.insert_bars(&[bar("AAPL", "US", 1, 100.0)]).unwrap();
        }
        let adapter = SqliteAdapter::open(&path, 2).unwrap();
        assert_eq!(adapter.list_symbols("US").unwrap(), vec!["AAPL"]);
    }
}
