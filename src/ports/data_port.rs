//! Price data source port.

use crate::domain::error::TickerscopeError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;
use serde::Serialize;

/// Stored coverage for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DataRange {
    pub first: NaiveDate,
    pub last: NaiveDate,
    pub bars: usize,
}

/// Source of daily bars addressed by (symbol, market).
///
/// `fetch_ohlcv` returns bars sorted by date, inclusive of both bounds. An
/// unknown symbol is either an error or an empty vector depending on the
/// source; callers treat both as "no data".
pub trait DataPort {
    fn fetch_ohlcv(
        &self,
        code: &str,
        market: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, TickerscopeError>;

    fn list_symbols(&self, market: &str) -> Result<Vec<String>, TickerscopeError>;

    fn get_data_range(
        &self,
        code: &str,
        market: &str,
    ) -> Result<Option<DataRange>, TickerscopeError>;
}

impl<T: DataPort + ?Sized> DataPort for Box<T> {
    fn fetch_ohlcv(
        &self,
        code: &str,
        market: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, TickerscopeError> {
        (**self).fetch_ohlcv(code, market, start_date, end_date)
    }

    fn list_symbols(&self, market: &str) -> Result<Vec<String>, TickerscopeError> {
        (**self).list_symbols(market)
    }

    fn get_data_range(
        &self,
        code: &str,
        market: &str,
    ) -> Result<Option<DataRange>, TickerscopeError> {
        (**self).get_data_range(code, market)
    }
}
