//! Symbol universe for comparisons.
//!
//! Parses a comma separated symbol list and loads a validated price series
//! for each symbol, setting aside the ones with no usable data.

use crate::domain::error::TickerscopeError;
use crate::domain::ohlcv::PriceSeries;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fmt;
use tracing::{info, warn};

/// Fewest bars an asset needs to produce performance metrics.
pub const MIN_BARS: usize = 2;

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateCode(String),
}

pub fn parse_codes(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let code = trimmed.to_uppercase();
        if !seen.insert(code.clone()) {
            return Err(UniverseError::DuplicateCode(code));
        }
        codes.push(code);
    }

    Ok(codes)
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    FetchFailed(String),
    NoData,
    InsufficientBars { bars: usize },
    InvalidSeries(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::FetchFailed(reason) => write!(f, "fetch failed: {}", reason),
            SkipReason::NoData => f.write_str("no data"),
            SkipReason::InsufficientBars { bars } => {
                write!(f, "only {} bars, minimum {}", bars, MIN_BARS)
            }
            SkipReason::InvalidSeries(reason) => write!(f, "invalid series: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedCode {
    pub code: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone)]
pub struct LoadedUniverse {
    pub market: String,
    pub series: Vec<PriceSeries>,
    pub skipped: Vec<SkippedCode>,
}

impl LoadedUniverse {
    pub fn skipped_codes(&self) -> Vec<String> {
        self.skipped.iter().map(|s| s.code.clone()).collect()
    }
}

/// Fetches one symbol and validates it into a [`PriceSeries`].
pub fn fetch_series(
    data_port: &dyn DataPort,
    code: &str,
    market: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<PriceSeries, TickerscopeError> {
    let bars = data_port.fetch_ohlcv(code, market, start_date, end_date)?;
    if bars.is_empty() {
        return Err(TickerscopeError::NoData {
            code: code.to_string(),
            market: market.to_string(),
        });
    }
    PriceSeries::new(code, market, bars)
}

/// Loads every symbol, skipping (never failing on) those without usable data.
pub fn load_universe(
    data_port: &dyn DataPort,
    codes: &[String],
    market: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> LoadedUniverse {
    let mut series = Vec::new();
    let mut skipped = Vec::new();

    for code in codes {
        let reason = match fetch_series(data_port, code, market, start_date, end_date) {
            Ok(s) if s.len() >= MIN_BARS => {
                info!(code = %code, market, bars = s.len(), "loaded");
                series.push(s);
                continue;
            }
            Ok(s) => SkipReason::InsufficientBars { bars: s.len() },
            Err(TickerscopeError::NoData { .. }) => SkipReason::NoData,
            Err(TickerscopeError::InvalidSeries { reason, .. }) => {
                SkipReason::InvalidSeries(reason)
            }
            Err(e) => SkipReason::FetchFailed(e.to_string()),
        };
        warn!(code = %code, market, reason = %reason, "skipping symbol");
        skipped.push(SkippedCode {
            code: code.clone(),
            reason,
        });
    }

    if !skipped.is_empty() {
        info!(
            loaded = series.len(),
            requested = codes.len(),
            market,
            "some symbols were skipped"
        );
    }

    LoadedUniverse {
        market: market.to_string(),
        series,
        skipped,
    }
}
