//! Categorical signals read from the latest row of an indicator panel.

use crate::domain::panel::{Column, IndicatorPanel};
use serde::Serialize;
use std::fmt;

pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;
pub const NEUTRAL_RSI: f64 = 50.0;
pub const HIGH_VOLUME_RATIO: f64 = 1.5;
pub const LOW_VOLUME_RATIO: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RsiSignal {
    Overbought,
    Oversold,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MacdSignal {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendSignal {
    #[serde(rename = "Strong Uptrend")]
    StrongUptrend,
    Uptrend,
    #[serde(rename = "Strong Downtrend")]
    StrongDowntrend,
    Downtrend,
    Sideways,
    /// Close or a moving average is undefined.
    Neutral,
}

impl TrendSignal {
    pub fn is_up(self) -> bool {
        matches!(self, TrendSignal::StrongUptrend | TrendSignal::Uptrend)
    }

    pub fn is_down(self) -> bool {
        matches!(self, TrendSignal::StrongDowntrend | TrendSignal::Downtrend)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VolumeSignal {
    #[serde(rename = "High Volume")]
    High,
    #[serde(rename = "Low Volume")]
    Low,
    #[serde(rename = "Normal Volume")]
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BollingerPosition {
    #[serde(rename = "Above Upper Band")]
    AboveUpper,
    #[serde(rename = "Below Lower Band")]
    BelowLower,
    #[serde(rename = "Within Bands")]
    Within,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OverallSignal {
    #[serde(rename = "Bullish - Consider buying on dips")]
    Bullish,
    #[serde(rename = "Bearish - Consider selling on rallies")]
    Bearish,
    #[serde(rename = "Neutral - Wait for clearer signals")]
    Neutral,
}

impl fmt::Display for RsiSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RsiSignal::Overbought => "Overbought",
            RsiSignal::Oversold => "Oversold",
            RsiSignal::Neutral => "Neutral",
        })
    }
}

impl fmt::Display for MacdSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MacdSignal::Bullish => "Bullish",
            MacdSignal::Bearish => "Bearish",
            MacdSignal::Neutral => "Neutral",
        })
    }
}

impl fmt::Display for TrendSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrendSignal::StrongUptrend => "Strong Uptrend",
            TrendSignal::Uptrend => "Uptrend",
            TrendSignal::StrongDowntrend => "Strong Downtrend",
            TrendSignal::Downtrend => "Downtrend",
            TrendSignal::Sideways => "Sideways",
            TrendSignal::Neutral => "Neutral",
        })
    }
}

impl fmt::Display for VolumeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VolumeSignal::High => "High Volume",
            VolumeSignal::Low => "Low Volume",
            VolumeSignal::Normal => "Normal Volume",
        })
    }
}

impl fmt::Display for BollingerPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BollingerPosition::AboveUpper => "Above Upper Band",
            BollingerPosition::BelowLower => "Below Lower Band",
            BollingerPosition::Within => "Within Bands",
        })
    }
}

impl fmt::Display for OverallSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OverallSignal::Bullish => "Bullish - Consider buying on dips",
            OverallSignal::Bearish => "Bearish - Consider selling on rallies",
            OverallSignal::Neutral => "Neutral - Wait for clearer signals",
        })
    }
}

/// Signals for the most recent bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicalSummary {
    /// Latest RSI, or 50 when undefined.
    pub rsi_current: f64,
    pub rsi_signal: RsiSignal,
    /// Momentum is read from RSI.
    pub momentum_signal: RsiSignal,
    pub macd_signal: MacdSignal,
    pub trend_signal: TrendSignal,
    pub volume_signal: VolumeSignal,
    pub bollinger_position: BollingerPosition,
    pub overall_signal: OverallSignal,
}

impl Default for TechnicalSummary {
    fn default() -> Self {
        Self {
            rsi_current: NEUTRAL_RSI,
            rsi_signal: RsiSignal::Neutral,
            momentum_signal: RsiSignal::Neutral,
            macd_signal: MacdSignal::Neutral,
            trend_signal: TrendSignal::Neutral,
            volume_signal: VolumeSignal::Normal,
            bollinger_position: BollingerPosition::Within,
            overall_signal: OverallSignal::Neutral,
        }
    }
}

pub fn summarize(panel: &IndicatorPanel) -> TechnicalSummary {
    let Some(row) = panel.last_row() else {
        return TechnicalSummary::default();
    };
    let close = Some(row.bar.close).filter(|c| c.is_finite());

    let rsi_current = row.value(Column::Rsi).unwrap_or(NEUTRAL_RSI);
    let rsi_signal = rsi_signal(rsi_current);

    let macd_signal = match (row.value(Column::Macd), row.value(Column::MacdSignal)) {
        (Some(line), Some(signal)) if line > signal => MacdSignal::Bullish,
        (Some(line), Some(signal)) if line < signal => MacdSignal::Bearish,
        _ => MacdSignal::Neutral,
    };

    let trend_signal = match (
        close,
        row.value(Column::SmaShort),
        row.value(Column::SmaLong),
    ) {
        (Some(close), Some(short), long) => trend_signal(close, short, long),
        _ => TrendSignal::Neutral,
    };

    let volume_signal = volume_signal(panel);

    let bollinger_position = match close {
        Some(close) if row.value(Column::BbUpper).is_some_and(|upper| close > upper) => {
            BollingerPosition::AboveUpper
        }
        Some(close) if row.value(Column::BbLower).is_some_and(|lower| close < lower) => {
            BollingerPosition::BelowLower
        }
        _ => BollingerPosition::Within,
    };

    let overall_signal = overall_signal(rsi_signal, macd_signal, trend_signal);

    TechnicalSummary {
        rsi_current,
        rsi_signal,
        momentum_signal: rsi_signal,
        macd_signal,
        trend_signal,
        volume_signal,
        bollinger_position,
        overall_signal,
    }
}

fn rsi_signal(rsi: f64) -> RsiSignal {
    if rsi > RSI_OVERBOUGHT {
        RsiSignal::Overbought
    } else if rsi < RSI_OVERSOLD {
        RsiSignal::Oversold
    } else {
        RsiSignal::Neutral
    }
}

/// First match wins; an undefined long SMA can only yield the weak trends.
fn trend_signal(close: f64, sma_short: f64, sma_long: Option<f64>) -> TrendSignal {
    let above_long = sma_long.is_some_and(|long| sma_short > long);
    let below_long = sma_long.is_some_and(|long| sma_short < long);

    if close > sma_short && above_long {
        TrendSignal::StrongUptrend
    } else if close > sma_short {
        TrendSignal::Uptrend
    } else if close < sma_short && below_long {
        TrendSignal::StrongDowntrend
    } else if close < sma_short {
        TrendSignal::Downtrend
    } else {
        TrendSignal::Sideways
    }
}

/// Latest volume against the trailing mean of the panel's volume column.
fn volume_signal(panel: &IndicatorPanel) -> VolumeSignal {
    let bars = panel.bars();
    let window = panel.config().volume_average;
    if bars.len() < 2 || window == 0 || bars.len() < window {
        return VolumeSignal::Normal;
    }

    let trailing = &bars[bars.len() - window..];
    let average = trailing.iter().map(|b| b.volume as f64).sum::<f64>() / window as f64;
    let current = bars[bars.len() - 1].volume as f64;

    if current > average * HIGH_VOLUME_RATIO {
        VolumeSignal::High
    } else if current < average * LOW_VOLUME_RATIO {
        VolumeSignal::Low
    } else {
        VolumeSignal::Normal
    }
}

fn overall_signal(rsi: RsiSignal, macd: MacdSignal, trend: TrendSignal) -> OverallSignal {
    let mut bullish = 0;
    let mut bearish = 0;

    match rsi {
        RsiSignal::Oversold => bullish += 1,
        RsiSignal::Overbought => bearish += 1,
        RsiSignal::Neutral => {}
    }
    match macd {
        MacdSignal::Bullish => bullish += 1,
        MacdSignal::Bearish => bearish += 1,
        MacdSignal::Neutral => {}
    }
    if trend.is_up() {
        bullish += 1;
    } else if trend.is_down() {
        bearish += 1;
    }

    match bullish.cmp(&bearish) {
        std::cmp::Ordering::Greater => OverallSignal::Bullish,
        std::cmp::Ordering::Less => OverallSignal::Bearish,
        std::cmp::Ordering::Equal => OverallSignal::Neutral,
    }
}
