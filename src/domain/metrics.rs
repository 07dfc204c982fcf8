//! Per-asset performance metrics derived from the price series alone.

use crate::domain::indicator::stddev::sample_stddev;
use crate::domain::ohlcv::PriceSeries;
use serde::Serialize;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub current_price: f64,
    /// Percent change from first to last close.
    pub total_return: f64,
    /// Annualised standard deviation of daily returns, in percent.
    pub volatility: f64,
    pub sharpe_ratio: f64,
    /// Worst peak-to-trough decline, in percent (zero or negative).
    pub max_drawdown: f64,
    pub high: f64,
    pub low: f64,
    /// Where the last close sits within [low, high], in percent.
    pub price_position: f64,
    pub avg_volume: f64,
    pub volume_ratio: f64,
}

/// Metrics with the default 2% annual risk-free rate.
pub fn compute_metrics(series: &PriceSeries) -> Option<PerformanceMetrics> {
    PerformanceMetrics::compute(series, DEFAULT_RISK_FREE_RATE)
}

impl PerformanceMetrics {
    /// `None` when the series has fewer than two bars.
    pub fn compute(series: &PriceSeries, risk_free_rate: f64) -> Option<Self> {
        if series.len() < 2 {
            return None;
        }
        let bars = series.bars();
        let first = series.first()?;
        let last = series.last()?;

        let current_price = last.close;
        let total_return = if first.close != 0.0 {
            (current_price / first.close - 1.0) * 100.0
        } else {
            0.0
        };

        let returns = daily_returns(&series.closes());
        let (volatility, sharpe_ratio) =
            compute_risk_adjusted(&returns, risk_free_rate / TRADING_DAYS_PER_YEAR);
        let max_drawdown = compute_drawdown(&returns);

        let high = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let low = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let range = high - low;
        let price_position = if range > 0.0 {
            (current_price - low) / range * 100.0
        } else {
            50.0
        };

        let avg_volume = bars.iter().map(|b| b.volume as f64).sum::<f64>() / bars.len() as f64;
        let volume_ratio = if avg_volume > 0.0 {
            last.volume as f64 / avg_volume
        } else {
            1.0
        };

        Some(Self {
            current_price,
            total_return,
            volatility,
            sharpe_ratio,
            max_drawdown,
            high,
            low,
            price_position,
            avg_volume,
            volume_ratio,
        })
    }
}

fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .map(|w| {
            let prev = w[0];
            let curr = w[1];
            if prev != 0.0 {
                (curr - prev) / prev
            } else {
                0.0
            }
        })
        .collect()
}

/// (annualised volatility %, annualised Sharpe), both 0 without variance.
fn compute_risk_adjusted(returns: &[f64], daily_rf: f64) -> (f64, f64) {
    let Some(stddev) = sample_stddev(returns) else {
        return (0.0, 0.0);
    };

    let volatility = stddev * TRADING_DAYS_PER_YEAR.sqrt() * 100.0;
    if stddev == 0.0 {
        return (volatility, 0.0);
    }

    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let sharpe = (mean - daily_rf) / stddev * TRADING_DAYS_PER_YEAR.sqrt();
    (volatility, sharpe)
}

/// Minimum of cumulative / running-max cumulative - 1, in percent.
fn compute_drawdown(returns: &[f64]) -> f64 {
    let mut cumulative = 1.0;
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;

    for r in returns {
        cumulative *= 1.0 + r;
        peak = peak.max(cumulative);
        if peak > 0.0 {
            max_dd = max_dd.min(cumulative / peak - 1.0);
        }
    }

    max_dd * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::OhlcvBar;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                code: "TEST".into(),
                market: "US".into(),
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000 + i as i64 * 100,
            })
            .collect();
        PriceSeries::new("TEST", "US", bars).unwrap()
    }

    #[test]
    fn metrics_need_two_bars() {
        assert!(compute_metrics(&PriceSeries::empty("TEST", "US")).is_none());
        assert!(compute_metrics(&make_series(&[100.0])).is_none());
    }

    #[test]
    fn metrics_total_return() {
        let m = compute_metrics(&make_series(&[100.0, 105.0, 110.0])).unwrap();
        assert_relative_eq!(m.total_return, 10.0, epsilon = 1e-9);
        assert_relative_eq!(m.current_price, 110.0);
    }

    #[test]
    fn metrics_total_return_negative() {
        let m = compute_metrics(&make_series(&[100.0, 90.0])).unwrap();
        assert_relative_eq!(m.total_return, -10.0, epsilon = 1e-9);
    }

    #[test]
    fn metrics_flat_series_has_no_risk() {
        let m = compute_metrics(&make_series(&[100.0; 30])).unwrap();
        assert_eq!(m.volatility, 0.0);
        assert_eq!(m.sharpe_ratio, 0.0);
        assert_eq!(m.max_drawdown, 0.0);
        assert_eq!(m.total_return, 0.0);
    }

    #[test]
    fn metrics_max_drawdown() {
        let m = compute_metrics(&make_series(&[100.0, 110.0, 90.0, 95.0, 80.0, 100.0])).unwrap();
        assert_relative_eq!(m.max_drawdown, (80.0 / 110.0 - 1.0) * 100.0, epsilon = 1e-9);
    }

    #[test]
    fn metrics_drawdown_ignores_initial_decline_before_first_peak() {
        // first return is the first cumulative point, so the peak starts there
        let m = compute_metrics(&make_series(&[100.0, 90.0, 95.0])).unwrap();
        assert_relative_eq!(m.max_drawdown, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn metrics_volatility_known_value() {
        // returns +10%, -10%: sample stddev = sqrt(0.02)
        let m = compute_metrics(&make_series(&[100.0, 110.0, 99.0])).unwrap();
        let expected = 0.02_f64.sqrt() * TRADING_DAYS_PER_YEAR.sqrt() * 100.0;
        assert_relative_eq!(m.volatility, expected, epsilon = 1e-9);
    }

    #[test]
    fn metrics_sharpe_positive_for_noisy_uptrend() {
        let closes: Vec<f64> = (0..100)
            .map(|i| 100.0 + i as f64 + if i % 2 == 0 { 0.5 } else { -0.5 })
            .collect();
        let m = compute_metrics(&make_series(&closes)).unwrap();
        assert!(m.sharpe_ratio > 0.0);
        assert!(m.volatility > 0.0);
    }

    #[test]
    fn metrics_single_return_has_no_volatility() {
        let m = compute_metrics(&make_series(&[100.0, 120.0])).unwrap();
        assert_eq!(m.volatility, 0.0);
        assert_eq!(m.sharpe_ratio, 0.0);
    }

    #[test]
    fn metrics_range_and_volume() {
        let m = compute_metrics(&make_series(&[10.0, 20.0, 15.0])).unwrap();
        assert_relative_eq!(m.high, 21.0);
        assert_relative_eq!(m.low, 9.0);
        assert_relative_eq!(m.price_position, 50.0);
        assert_relative_eq!(m.avg_volume, 1100.0);
        assert_relative_eq!(m.volume_ratio, 1200.0 / 1100.0);
    }
}
