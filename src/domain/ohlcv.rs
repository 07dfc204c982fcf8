//! OHLCV bar and validated price series.

use crate::domain::error::TickerscopeError;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OhlcvBar {
    pub code: String,
    pub market: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Time-ordered bars for one symbol.
///
/// Construction enforces strictly increasing dates and non-negative volume;
/// everything downstream relies on that ordering and never re-checks it.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    code: String,
    market: String,
    bars: Vec<OhlcvBar>,
}

impl PriceSeries {
    pub fn new(
        code: impl Into<String>,
        market: impl Into<String>,
        bars: Vec<OhlcvBar>,
    ) -> Result<Self, TickerscopeError> {
        let code = code.into();

        for pair in bars.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(TickerscopeError::InvalidSeries {
                    code,
                    reason: format!(
                        "dates must be strictly increasing ({} follows {})",
                        pair[1].date, pair[0].date
                    ),
                });
            }
        }

        if let Some(bar) = bars.iter().find(|b| b.volume < 0) {
            return Err(TickerscopeError::InvalidSeries {
                code,
                reason: format!("negative volume {} on {}", bar.volume, bar.date),
            });
        }

        Ok(Self {
            code,
            market: market.into(),
            bars,
        })
    }

    /// A series with no bars, the typed "no data" value.
    pub fn empty(code: impl Into<String>, market: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            market: market.into(),
            bars: Vec::new(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn market(&self) -> &str {
        &self.market
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&OhlcvBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&OhlcvBar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar(day: u32, volume: i64) -> OhlcvBar {
        OhlcvBar {
            code: "AAPL".into(),
            market: "US".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: 100.0,
            high: 110.0,
            low: 90.0,
            close: 105.0,
            volume,
        }
    }

    #[test]
    fn series_accepts_increasing_dates() {
        let series =
            PriceSeries::new("AAPL", "US", vec![sample_bar(1, 10), sample_bar(2, 20)]).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.last().unwrap().volume, 20);
        assert_eq!(series.code(), "AAPL");
    }

    #[test]
    fn series_rejects_duplicate_dates() {
        let result = PriceSeries::new("AAPL", "US", vec![sample_bar(2, 10), sample_bar(2, 20)]);
        assert!(matches!(
            result,
            Err(TickerscopeError::InvalidSeries { .. })
        ));
    }

    #[test]
    fn series_rejects_unordered_dates() {
        let result = PriceSeries::new("AAPL", "US", vec![sample_bar(3, 10), sample_bar(2, 20)]);
        assert!(result.is_err());
    }

    #[test]
    fn series_rejects_negative_volume() {
        let result = PriceSeries::new("AAPL", "US", vec![sample_bar(1, -5)]);
        match result {
            Err(TickerscopeError::InvalidSeries { code, reason }) => {
                assert_eq!(code, "AAPL");
                assert!(reason.contains("negative volume"));
            }
            other => panic!("expected InvalidSeries, got {other:?}"),
        }
    }

    #[test]
    fn empty_series() {
        let series = PriceSeries::empty("MSFT", "US");
        assert!(series.is_empty());
        assert!(series.last().is_none());
        assert_eq!(series.market(), "US");
    }
}
