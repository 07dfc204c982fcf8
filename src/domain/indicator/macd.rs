//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9. Because the EMAs seed on
//! the first sample, all three lines are defined from the first close.

use crate::domain::indicator::ema::{ema, ema_line};
use crate::domain::indicator::{require_period, zip_with, IndicatorError, IndicatorType, Line};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdLines {
    pub macd: Line,
    pub signal: Line,
    pub histogram: Line,
}

pub fn macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Result<MacdLines, IndicatorError> {
    let indicator = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };
    require_period(indicator, fast)?;
    require_period(indicator, slow)?;
    require_period(indicator, signal_period)?;

    let ema_fast = ema(closes, fast)?;
    let ema_slow = ema(closes, slow)?;

    let macd = zip_with(&ema_fast, &ema_slow, |f, s| f - s);
    let signal = ema_line(&macd, signal_period)?;
    let histogram = zip_with(&macd, &signal, |m, s| m - s);

    Ok(MacdLines {
        macd,
        signal,
        histogram,
    })
}
