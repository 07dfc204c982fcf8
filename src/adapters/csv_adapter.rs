//! File-per-symbol CSV price source.
//!
//! Reads `{SYMBOL}_{MARKET}.csv` from a base directory. Columns are located
//! by header name (`date`, `open`, `high`, `low`, `close`, `volume`, case
//! insensitive), so exports with extra columns such as `adj close` load too.

use crate::domain::error::TickerscopeError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::{DataPort, DataRange};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const DATE_FORMAT: &str = "%Y-%m-%d";
const COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

/// Column positions resolved from the header row.
struct Layout([usize; 6]);

impl Layout {
    fn from_headers(headers: &csv::StringRecord, path: &Path) -> Result<Self, TickerscopeError> {
        let mut idx = [0usize; 6];
        for (slot, name) in idx.iter_mut().zip(COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| TickerscopeError::DataSource {
                    reason: format!("{}: missing '{}' column", path.display(), name),
                })?;
        }
        Ok(Self(idx))
    }

    fn field<'r>(
        &self,
        record: &'r csv::StringRecord,
        column: usize,
    ) -> Result<&'r str, TickerscopeError> {
        record
            .get(self.0[column])
            .map(str::trim)
            .ok_or_else(|| TickerscopeError::DataQuery {
                reason: format!("row too short for '{}' column", COLUMNS[column]),
            })
    }

    fn number<T: std::str::FromStr>(
        &self,
        record: &csv::StringRecord,
        column: usize,
    ) -> Result<T, TickerscopeError>
    where
        T::Err: std::fmt::Display,
    {
        let raw = self.field(record, column)?;
        raw.parse().map_err(|e: T::Err| TickerscopeError::DataQuery {
            reason: format!("invalid {} value '{}': {}", COLUMNS[column], raw, e),
        })
    }

    fn date(&self, record: &csv::StringRecord) -> Result<NaiveDate, TickerscopeError> {
        let raw = self.field(record, 0)?;
        // some exports append a time component
        let day = raw.split([' ', 'T']).next().unwrap_or(raw);
        NaiveDate::parse_from_str(day, DATE_FORMAT).map_err(|e| TickerscopeError::DataQuery {
            reason: format!("invalid date '{}': {}", raw, e),
        })
    }
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str, market: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", code, market))
    }

    fn read_bars(&self, code: &str, market: &str) -> Result<Vec<OhlcvBar>, TickerscopeError> {
        let path = self.csv_path(code, market);
        let mut rdr = csv::Reader::from_path(&path).map_err(|e| TickerscopeError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        let headers = rdr
            .headers()
            .map_err(|e| TickerscopeError::DataQuery {
                reason: format!("CSV header error in {}: {}", path.display(), e),
            })?
            .clone();
        let layout = Layout::from_headers(&headers, &path)?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| TickerscopeError::DataQuery {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            bars.push(OhlcvBar {
                code: code.to_string(),
                market: market.to_string(),
                date: layout.date(&record)?,
                open: layout.number(&record, 1)?,
                high: layout.number(&record, 2)?,
                low: layout.number(&record, 3)?,
                close: layout.number(&record, 4)?,
                volume: layout.number::<f64>(&record, 5)? as i64,
            });
        }

        bars.sort_by_key(|b| b.date);
        debug!(path = %path.display(), rows = bars.len(), "read csv");
        Ok(bars)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        code: &str,
        market: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, TickerscopeError> {
        let mut bars = self.read_bars(code, market)?;
        bars.retain(|b| b.date >= start_date && b.date <= end_date);
        Ok(bars)
    }

    fn list_symbols(&self, market: &str) -> Result<Vec<String>, TickerscopeError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| TickerscopeError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let suffix = format!("_{}.csv", market);
        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| TickerscopeError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(code) = name.strip_suffix(&suffix) {
                symbols.push(code.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        code: &str,
        market: &str,
    ) -> Result<Option<DataRange>, TickerscopeError> {
        if !self.csv_path(code, market).exists() {
            return Ok(None);
        }
        let bars = self.read_bars(code, market)?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some(DataRange {
                first: first.date,
                last: last.date,
                bars: bars.len(),
            }),
            _ => None,
        })
    }
}
