//! RSI (Relative Strength Index).
//!
//! Gains and losses are the positive and negated-negative close-to-close
//! changes. Both are averaged with a trailing simple mean over n changes:
//!
//! RSI = 100 - (100 / (1 + avg_gain / avg_loss)), and 100 when avg_loss == 0.
//!
//! Warmup: the first n positions are `None` (n changes need n+1 closes).

use crate::domain::indicator::{mean, require_period, rolling, IndicatorError, IndicatorType, Line};

pub const DEFAULT_PERIOD: usize = 14;

pub fn rsi(closes: &[f64], period: usize) -> Result<Line, IndicatorError> {
    require_period(IndicatorType::Rsi(period), period)?;

    let mut gains: Line = Vec::with_capacity(closes.len());
    let mut losses: Line = Vec::with_capacity(closes.len());

    for i in 0..closes.len() {
        let change = if i == 0 {
            None
        } else {
            Some(closes[i] - closes[i - 1]).filter(|c| c.is_finite())
        };
        gains.push(change.map(|c| c.max(0.0)));
        losses.push(change.map(|c| (-c).max(0.0)));
    }

    let avg_gain = rolling(&gains, period, mean);
    let avg_loss = rolling(&losses, period, mean);

    Ok(avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(gain, loss)| match (gain, loss) {
            (Some(_), Some(loss)) if *loss == 0.0 => Some(100.0),
            (Some(gain), Some(loss)) => Some(100.0 - 100.0 / (1.0 + gain / loss)),
            _ => None,
        })
        .collect())
}
