//! Stochastic Oscillator.
//!
//! %K = 100 × (close - lowest low) / (highest high - lowest low) over k bars
//! %D = SMA(%K, d)
//!
//! A flat window (highest high == lowest low) has no range; %K is then the
//! neutral midpoint 50.

use crate::domain::indicator::sma::sma_line;
use crate::domain::indicator::{
    defined, require_len, require_period, IndicatorError, IndicatorType, Line,
};

pub const DEFAULT_K_PERIOD: usize = 14;
pub const DEFAULT_D_PERIOD: usize = 3;
pub const FLAT_RANGE_K: f64 = 50.0;

#[derive(Debug, Clone, PartialEq)]
pub struct StochasticLines {
    pub k: Line,
    pub d: Line,
}

pub fn stochastic(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    k_period: usize,
    d_period: usize,
) -> Result<StochasticLines, IndicatorError> {
    let indicator = IndicatorType::Stochastic { k_period, d_period };
    require_period(indicator, k_period)?;
    require_period(indicator, d_period)?;
    require_len(indicator, close.len(), high.len())?;
    require_len(indicator, close.len(), low.len())?;

    let k = range_position(high, low, close, k_period, |close, lowest, highest| {
        let range = highest - lowest;
        if range == 0.0 {
            FLAT_RANGE_K
        } else {
            100.0 * (close - lowest) / range
        }
    });
    let d = sma_line(&k, d_period)?;

    Ok(StochasticLines { k, d })
}

/// Evaluates `f(close, lowest_low, highest_high)` over every full window.
///
/// Shared with Williams %R. Callers validate period and lengths.
pub(crate) fn range_position<F>(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    period: usize,
    f: F,
) -> Line
where
    F: Fn(f64, f64, f64) -> f64,
{
    let highs = defined(high);
    let lows = defined(low);

    (0..close.len())
        .map(|i| {
            if i + 1 < period || !close[i].is_finite() {
                return None;
            }
            let start = i + 1 - period;
            let mut highest = f64::NEG_INFINITY;
            let mut lowest = f64::INFINITY;
            for j in start..=i {
                highest = highest.max(highs[j]?);
                lowest = lowest.min(lows[j]?);
            }
            Some(f(close[i], lowest, highest))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stochastic_basic_k() {
        let high = [10.0, 12.0, 14.0];
        let low = [8.0, 9.0, 10.0];
        let close = [9.0, 11.0, 13.0];
        let lines = stochastic(&high, &low, &close, 3, 1).unwrap();

        // lowest 8, highest 14 → 100 * 5 / 6
        assert!((lines.k[2].unwrap() - 500.0 / 6.0).abs() < 1e-10);
        assert!(lines.k[1].is_none());
    }

    #[test]
    fn stochastic_d_is_sma_of_k() {
        let high = [10.0, 11.0, 12.0, 11.0, 13.0];
        let low = [9.0, 9.5, 10.0, 10.0, 11.0];
        let close = [9.5, 10.5, 11.5, 10.5, 12.5];
        let lines = stochastic(&high, &low, &close, 2, 2).unwrap();

        assert!(lines.d[1].is_none());
        let expected = (lines.k[1].unwrap() + lines.k[2].unwrap()) / 2.0;
        assert!((lines.d[2].unwrap() - expected).abs() < 1e-10);
    }

    #[test]
    fn stochastic_flat_range_is_neutral() {
        let flat = [100.0; 5];
        let lines = stochastic(&flat, &flat, &flat, 3, 2).unwrap();
        assert_eq!(lines.k[4], Some(FLAT_RANGE_K));
        assert_eq!(lines.d[4], Some(FLAT_RANGE_K));
    }

    #[test]
    fn stochastic_length_mismatch() {
        let result = stochastic(&[1.0, 2.0], &[1.0], &[1.0, 2.0], 2, 1);
        assert!(matches!(
            result,
            Err(IndicatorError::LengthMismatch { expected: 2, found: 1, .. })
        ));
    }

    #[test]
    fn stochastic_bounds() {
        let high = [11.0, 13.0, 12.0, 15.0, 14.0, 16.0];
        let low = [9.0, 10.0, 10.5, 12.0, 11.0, 13.0];
        let close = [10.0, 12.5, 11.0, 14.5, 11.5, 15.5];
        let lines = stochastic(&high, &low, &close, 3, 2).unwrap();
        for v in lines.k.into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v));
        }
    }
}
