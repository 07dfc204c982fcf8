//! Bollinger Bands.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is the sample standard deviation (divides by N-1) of the same
//! trailing window.
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) positions are `None`.

use crate::domain::indicator::sma::sma;
use crate::domain::indicator::stddev::rolling_stddev;
use crate::domain::indicator::{require_period, zip_with, IndicatorError, IndicatorType, Line};

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub upper: Line,
    pub middle: Line,
    pub lower: Line,
}

pub fn bollinger(
    closes: &[f64],
    period: usize,
    multiplier: f64,
) -> Result<BollingerBands, IndicatorError> {
    let indicator = IndicatorType::Bollinger {
        period,
        stddev_mult_x100: (multiplier * 100.0).round() as u32,
    };
    require_period(indicator, period)?;

    let middle = sma(closes, period)?;
    let stddev = rolling_stddev(closes, period)?;

    let upper = zip_with(&middle, &stddev, |m, s| m + multiplier * s);
    let lower = zip_with(&middle, &stddev, |m, s| m - multiplier * s);

    Ok(BollingerBands {
        upper,
        middle,
        lower,
    })
}
