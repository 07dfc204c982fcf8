#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use tickerscope::domain::error::TickerscopeError;
pub use tickerscope::domain::ohlcv::{OhlcvBar, PriceSeries};
use tickerscope::ports::data_port::{DataPort, DataRange};

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, code: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(code.to_string(), bars);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        code: &str,
        _market: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, TickerscopeError> {
        if let Some(reason) = self.errors.get(code) {
            return Err(TickerscopeError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(code)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_symbols(&self, _market: &str) -> Result<Vec<String>, TickerscopeError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        code: &str,
        _market: &str,
    ) -> Result<Option<DataRange>, TickerscopeError> {
        if let Some(reason) = self.errors.get(code) {
            return Err(TickerscopeError::DataSource {
                reason: reason.clone(),
            });
        }
        match self.data.get(code) {
            Some(bars) if !bars.is_empty() => Ok(Some(DataRange {
                first: bars.iter().map(|b| b.date).min().unwrap(),
                last: bars.iter().map(|b| b.date).max().unwrap(),
                bars: bars.len(),
            })),
            _ => Ok(None),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(code: &str, date: &str, close: f64) -> OhlcvBar {
    OhlcvBar {
        code: code.to_string(),
        market: "US".to_string(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000,
    }
}

/// One bar per calendar day from 2024-01-01, tight high/low around each close.
pub fn bars_from_closes(code: &str, closes: &[f64]) -> Vec<OhlcvBar> {
    let start = date(2024, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            code: code.to_string(),
            market: "US".to_string(),
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume: 1000,
        })
        .collect()
}

pub fn series_from_closes(code: &str, closes: &[f64]) -> PriceSeries {
    PriceSeries::new(code, "US", bars_from_closes(code, closes)).unwrap()
}

/// `count` closes stepping evenly from `from` to `to` inclusive.
pub fn linear_closes(from: f64, to: f64, count: usize) -> Vec<f64> {
    let step = (to - from) / (count - 1) as f64;
    (0..count).map(|i| from + step * i as f64).collect()
}

/// Deterministic closes with a drift and a bounded wobble.
pub fn wavy_closes(start: f64, drift: f64, amplitude: f64, count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            start + drift * t + amplitude * (t * 0.7).sin()
        })
        .collect()
}

pub fn write_csv(dir: &Path, code: &str, market: &str, bars: &[OhlcvBar]) {
    let mut file = std::fs::File::create(dir.join(format!("{}_{}.csv", code, market))).unwrap();
    writeln!(file, "date,open,high,low,close,volume").unwrap();
    for bar in bars {
        writeln!(
            file,
            "{},{},{},{},{},{}",
            bar.date, bar.open, bar.high, bar.low, bar.close, bar.volume
        )
        .unwrap();
    }
}
