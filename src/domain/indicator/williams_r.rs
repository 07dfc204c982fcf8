//! Williams %R.
//!
//! %R = -100 × (highest high - close) / (highest high - lowest low) over n bars.
//! Range is -100..=0; a flat window falls back to the midpoint -50.

use crate::domain::indicator::stochastic::range_position;
use crate::domain::indicator::{require_len, require_period, IndicatorError, IndicatorType, Line};

pub const DEFAULT_PERIOD: usize = 14;
pub const FLAT_RANGE_R: f64 = -50.0;

pub fn williams_r(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    period: usize,
) -> Result<Line, IndicatorError> {
    let indicator = IndicatorType::WilliamsR(period);
    require_period(indicator, period)?;
    require_len(indicator, close.len(), high.len())?;
    require_len(indicator, close.len(), low.len())?;

    Ok(range_position(high, low, close, period, |close, lowest, highest| {
        let range = highest - lowest;
        if range == 0.0 {
            FLAT_RANGE_R
        } else {
            -100.0 * (highest - close) / range
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn williams_close_at_high_is_zero() {
        let high = [10.0, 12.0, 14.0];
        let low = [8.0, 9.0, 10.0];
        let close = [9.0, 11.0, 14.0];
        let line = williams_r(&high, &low, &close, 3).unwrap();
        assert!(line[2].unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn williams_close_at_low_is_minus_100() {
        let high = [10.0, 12.0, 14.0];
        let low = [8.0, 9.0, 10.0];
        let close = [9.0, 11.0, 8.0];
        let line = williams_r(&high, &low, &close, 3).unwrap();
        assert!((line[2].unwrap() + 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn williams_flat_range_is_neutral() {
        let flat = [42.0; 4];
        let line = williams_r(&flat, &flat, &flat, 2).unwrap();
        assert_eq!(line[0], None);
        assert_eq!(line[3], Some(FLAT_RANGE_R));
    }

    #[test]
    fn williams_zero_period() {
        assert!(williams_r(&[1.0], &[1.0], &[1.0], 0).is_err());
    }
}
