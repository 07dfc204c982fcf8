//! Rolling support and resistance levels.
//!
//! support = lowest low over n bars, resistance = highest high over n bars.

use crate::domain::indicator::{
    defined, require_len, require_period, rolling, IndicatorError, IndicatorType, Line,
};

pub const DEFAULT_PERIOD: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct SupportResistance {
    pub support: Line,
    pub resistance: Line,
}

pub fn support_resistance(
    high: &[f64],
    low: &[f64],
    period: usize,
) -> Result<SupportResistance, IndicatorError> {
    let indicator = IndicatorType::SupportResistance(period);
    require_period(indicator, period)?;
    require_len(indicator, high.len(), low.len())?;

    let support = rolling(&defined(low), period, |w| {
        w.iter().copied().fold(f64::INFINITY, f64::min)
    });
    let resistance = rolling(&defined(high), period, |w| {
        w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    });

    Ok(SupportResistance {
        support,
        resistance,
    })
}
