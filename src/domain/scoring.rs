//! Composite 0-100 score for one asset.
//!
//! Starts from [`BASE_SCORE`], adds one adjustment per factor and clamps the
//! sum. Each factor checks its thresholds highest-first and takes the first
//! one satisfied.

use crate::domain::metrics::PerformanceMetrics;
use crate::domain::summary::{MacdSignal, TechnicalSummary, TrendSignal};
use serde::Serialize;
use std::fmt;

pub const BASE_SCORE: i32 = 50;
pub const MIN_SCORE: i32 = 0;
pub const MAX_SCORE: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    TotalReturn,
    SharpeRatio,
    RsiBalance,
    Trend,
    Volatility,
    Drawdown,
    Macd,
}

impl fmt::Display for ScoreFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScoreFactor::TotalReturn => "total return",
            ScoreFactor::SharpeRatio => "sharpe ratio",
            ScoreFactor::RsiBalance => "rsi balance",
            ScoreFactor::Trend => "trend",
            ScoreFactor::Volatility => "volatility",
            ScoreFactor::Drawdown => "drawdown",
            ScoreFactor::Macd => "macd",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreAdjustment {
    pub factor: ScoreFactor,
    pub points: i32,
}

/// A score together with the adjustments that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreCard {
    pub score: u8,
    /// Unclamped base + adjustments.
    pub raw: i32,
    pub adjustments: Vec<ScoreAdjustment>,
}

pub fn score(metrics: &PerformanceMetrics, summary: &TechnicalSummary) -> ScoreCard {
    let adjustments = vec![
        ScoreAdjustment {
            factor: ScoreFactor::TotalReturn,
            points: return_points(metrics.total_return),
        },
        ScoreAdjustment {
            factor: ScoreFactor::SharpeRatio,
            points: sharpe_points(metrics.sharpe_ratio),
        },
        ScoreAdjustment {
            factor: ScoreFactor::RsiBalance,
            points: rsi_points(summary.rsi_current),
        },
        ScoreAdjustment {
            factor: ScoreFactor::Trend,
            points: trend_points(summary.trend_signal),
        },
        ScoreAdjustment {
            factor: ScoreFactor::Volatility,
            points: volatility_points(metrics.volatility),
        },
        ScoreAdjustment {
            factor: ScoreFactor::Drawdown,
            points: drawdown_points(metrics.max_drawdown),
        },
        ScoreAdjustment {
            factor: ScoreFactor::Macd,
            points: macd_points(summary.macd_signal),
        },
    ];

    let raw = BASE_SCORE + adjustments.iter().map(|a| a.points).sum::<i32>();
    let score = raw.clamp(MIN_SCORE, MAX_SCORE) as u8;

    ScoreCard {
        score,
        raw,
        adjustments,
    }
}

fn return_points(total_return: f64) -> i32 {
    if total_return > 30.0 {
        25
    } else if total_return > 20.0 {
        20
    } else if total_return > 10.0 {
        15
    } else if total_return > 0.0 {
        10
    } else if total_return > -10.0 {
        5
    } else {
        -5
    }
}

fn sharpe_points(sharpe: f64) -> i32 {
    if sharpe > 2.0 {
        20
    } else if sharpe > 1.5 {
        15
    } else if sharpe > 1.0 {
        10
    } else if sharpe > 0.5 {
        5
    } else {
        0
    }
}

/// Rewards RSI close to 50.
fn rsi_points(rsi: f64) -> i32 {
    if rsi > 45.0 && rsi < 55.0 {
        10
    } else if rsi > 40.0 && rsi < 60.0 {
        7
    } else if rsi > 30.0 && rsi < 70.0 {
        3
    } else {
        0
    }
}

fn trend_points(trend: TrendSignal) -> i32 {
    match trend {
        TrendSignal::StrongUptrend => 5,
        TrendSignal::Uptrend => 3,
        TrendSignal::Downtrend | TrendSignal::StrongDowntrend => -3,
        TrendSignal::Sideways | TrendSignal::Neutral => 0,
    }
}

/// Lower annualised volatility scores higher.
fn volatility_points(volatility: f64) -> i32 {
    if volatility < 15.0 {
        15
    } else if volatility < 20.0 {
        10
    } else if volatility < 30.0 {
        5
    } else if volatility < 40.0 {
        2
    } else {
        0
    }
}

fn drawdown_points(max_drawdown: f64) -> i32 {
    if max_drawdown > -10.0 {
        10
    } else if max_drawdown > -15.0 {
        7
    } else if max_drawdown > -20.0 {
        5
    } else if max_drawdown > -30.0 {
        2
    } else {
        0
    }
}

fn macd_points(macd: MacdSignal) -> i32 {
    match macd {
        MacdSignal::Bullish => 5,
        MacdSignal::Bearish => -2,
        MacdSignal::Neutral => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(total_return: f64, volatility: f64, sharpe: f64, drawdown: f64) -> PerformanceMetrics {
        PerformanceMetrics {
            current_price: 100.0,
            total_return,
            volatility,
            sharpe_ratio: sharpe,
            max_drawdown: drawdown,
            high: 110.0,
            low: 90.0,
            price_position: 50.0,
            avg_volume: 1000.0,
            volume_ratio: 1.0,
        }
    }

    fn summary(rsi: f64, trend: TrendSignal, macd: MacdSignal) -> TechnicalSummary {
        TechnicalSummary {
            rsi_current: rsi,
            trend_signal: trend,
            macd_signal: macd,
            ..TechnicalSummary::default()
        }
    }

    #[test]
    fn neutral_inputs() {
        // return 0 → +5, sharpe 0, rsi 50 → +10, vol 25 → +5, dd -12 → +7
        let card = score(
            &metrics(0.0, 25.0, 0.0, -12.0),
            &summary(50.0, TrendSignal::Sideways, MacdSignal::Neutral),
        );
        assert_eq!(card.raw, 77);
        assert_eq!(card.score, 77);
        assert_eq!(card.adjustments.len(), 7);
    }

    #[test]
    fn strong_asset_is_clamped_to_100() {
        let card = score(
            &metrics(25.0, 12.0, 1.8, -8.0),
            &summary(50.0, TrendSignal::StrongUptrend, MacdSignal::Bullish),
        );
        // 50 + 20 + 15 + 10 + 5 + 15 + 10 + 5
        assert_eq!(card.raw, 130);
        assert_eq!(card.score, 100);
    }

    #[test]
    fn weak_asset_scores_low() {
        let card = score(
            &metrics(-40.0, 80.0, -1.0, -60.0),
            &summary(85.0, TrendSignal::StrongDowntrend, MacdSignal::Bearish),
        );
        // 50 - 5 + 0 + 0 - 3 + 0 + 0 - 2
        assert_eq!(card.score, 40);
    }

    #[test]
    fn extreme_metrics_stay_in_range() {
        let card = score(
            &metrics(1e6, 0.0, 1e6, 0.0),
            &summary(50.0, TrendSignal::StrongUptrend, MacdSignal::Bullish),
        );
        assert_eq!(card.score, 100);

        let card = score(
            &metrics(f64::NAN, f64::NAN, f64::NAN, f64::NAN),
            &summary(f64::NAN, TrendSignal::Neutral, MacdSignal::Neutral),
        );
        assert!(card.score <= 100);
    }

    #[test]
    fn return_thresholds_are_strict() {
        assert_eq!(return_points(30.0), 20);
        assert_eq!(return_points(30.1), 25);
        assert_eq!(return_points(0.0), 5);
        assert_eq!(return_points(-10.0), -5);
    }

    #[test]
    fn rsi_band_edges() {
        assert_eq!(rsi_points(45.0), 7);
        assert_eq!(rsi_points(54.9), 10);
        assert_eq!(rsi_points(60.0), 3);
        assert_eq!(rsi_points(70.0), 0);
        assert_eq!(rsi_points(29.0), 0);
    }

    #[test]
    fn trend_points_by_signal() {
        assert_eq!(trend_points(TrendSignal::StrongUptrend), 5);
        assert_eq!(trend_points(TrendSignal::Uptrend), 3);
        assert_eq!(trend_points(TrendSignal::Downtrend), -3);
        assert_eq!(trend_points(TrendSignal::StrongDowntrend), -3);
        assert_eq!(trend_points(TrendSignal::Neutral), 0);
    }

    #[test]
    fn volatility_and_drawdown_edges() {
        assert_eq!(volatility_points(15.0), 10);
        assert_eq!(volatility_points(40.0), 0);
        assert_eq!(drawdown_points(-10.0), 7);
        assert_eq!(drawdown_points(-30.0), 0);
    }

    #[test]
    fn factor_serializes_snake_case() {
        let json = serde_json::to_value(ScoreFactor::RsiBalance).unwrap();
        assert_eq!(json, "rsi_balance");
    }
}
