//! Exponential Moving Average.
//!
//! k = 2/(n+1), EMA[0] = x[0], then EMA[i] = x[i]*k + EMA[i-1]*(1-k).
//! There is no warmup: the first defined sample seeds the average.
//! Undefined samples produce `None` and leave the running average untouched.

use crate::domain::indicator::{defined, require_period, IndicatorError, IndicatorType, Line};

pub fn ema(values: &[f64], period: usize) -> Result<Line, IndicatorError> {
    ema_line(&defined(values), period)
}

pub fn ema_line(values: &[Option<f64>], period: usize) -> Result<Line, IndicatorError> {
    require_period(IndicatorType::Ema(period), period)?;

    let k = 2.0 / (period as f64 + 1.0);
    let mut state: Option<f64> = None;

    Ok(values
        .iter()
        .map(|value| match value {
            Some(x) if x.is_finite() => {
                let next = match state {
                    Some(prev) => x * k + prev * (1.0 - k),
                    None => *x,
                };
                state = Some(next);
                state
            }
            _ => None,
        })
        .collect())
}
