//! Rolling sample standard deviation.
//!
//! STDDEV(n)[i] = sqrt(sum((x[i-j] - SMA(n)[i])^2 for j in 0..n) / (n - 1))
//! Warmup: first (n-1) positions are `None`. A window of one sample has no
//! sample deviation, so n = 1 yields an all-`None` line.

use crate::domain::indicator::{
    defined, require_period, rolling, IndicatorError, IndicatorType, Line,
};

pub fn rolling_stddev(values: &[f64], period: usize) -> Result<Line, IndicatorError> {
    require_period(IndicatorType::Stddev(period), period)?;
    if period < 2 {
        return Ok(vec![None; values.len()]);
    }
    Ok(rolling(&defined(values), period, |w| {
        sample_stddev(w).unwrap_or(0.0)
    }))
}

/// Sample standard deviation (divides by N-1); `None` below two samples.
pub fn sample_stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stddev_warmup() {
        let line = rolling_stddev(&[10.0, 20.0, 30.0, 40.0, 50.0], 3).unwrap();
        assert!(line[0].is_none());
        assert!(line[1].is_none());
        assert!(line[2].is_some());
    }

    #[test]
    fn stddev_constant_values() {
        let line = rolling_stddev(&[100.0; 5], 3).unwrap();
        assert!(line[2].unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn stddev_basic_calculation() {
        let line = rolling_stddev(&[10.0, 20.0, 30.0], 3).unwrap();
        // variance = (100 + 0 + 100) / 2 = 100
        assert!((line[2].unwrap() - 10.0).abs() < 1e-10);
    }

    #[test]
    fn sample_stddev_known_values() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        // population stddev is 2, sample stddev is sqrt(32 / 7)
        let expected = (32.0_f64 / 7.0).sqrt();
        assert!((sample_stddev(&values).unwrap() - expected).abs() < 1e-10);
    }

    #[test]
    fn sample_stddev_needs_two_values() {
        assert!(sample_stddev(&[1.0]).is_none());
        assert!(sample_stddev(&[]).is_none());
    }

    #[test]
    fn stddev_period_one_is_undefined() {
        assert_eq!(rolling_stddev(&[1.0, 2.0], 1).unwrap(), vec![None, None]);
    }
}
