//! Simple Moving Average.
//!
//! SMA(n)[i] = mean(x[i-n+1..=i]). Warmup: first (n-1) positions are `None`.

use crate::domain::indicator::{
    defined, mean, require_period, rolling, IndicatorError, IndicatorType, Line,
};

pub fn sma(values: &[f64], period: usize) -> Result<Line, IndicatorError> {
    sma_line(&defined(values), period)
}

/// SMA over an already-derived line (e.g. Stochastic %K).
pub fn sma_line(values: &[Option<f64>], period: usize) -> Result<Line, IndicatorError> {
    require_period(IndicatorType::Sma(period), period)?;
    Ok(rolling(values, period, mean))
}
