//! Technical indicator library.
//!
//! Every indicator is a pure function over numeric slices that returns one
//! [`Line`] per output, aligned with its input. A position is `None` while the
//! trailing window is not yet full or when the window holds a non-finite
//! value. Bad *parameters* (zero period, mismatched slice lengths) are the
//! only thing reported as an [`IndicatorError`].

pub mod adx;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stddev;
pub mod stochastic;
pub mod support_resistance;
pub mod williams_r;

use std::fmt;

/// One indicator output, index-aligned with the input series.
pub type Line = Vec<Option<f64>>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IndicatorError {
    #[error("{indicator}: period must be positive")]
    InvalidPeriod { indicator: IndicatorType },

    #[error("{indicator}: expected {expected} values, found {found}")]
    LengthMismatch {
        indicator: IndicatorType,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Stddev(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
    Stochastic {
        k_period: usize,
        d_period: usize,
    },
    WilliamsR(usize),
    Adx(usize),
    SupportResistance(usize),
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Stddev(period) => write!(f, "STDDEV({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
            IndicatorType::Stochastic { k_period, d_period } => {
                write!(f, "STOCHASTIC({},{})", k_period, d_period)
            }
            IndicatorType::WilliamsR(period) => write!(f, "WILLIAMS_R({})", period),
            IndicatorType::Adx(period) => write!(f, "ADX({})", period),
            IndicatorType::SupportResistance(period) => write!(f, "SUPPORT_RESISTANCE({})", period),
        }
    }
}

pub(crate) fn require_period(indicator: IndicatorType, period: usize) -> Result<(), IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidPeriod { indicator });
    }
    Ok(())
}

pub(crate) fn require_len(
    indicator: IndicatorType,
    expected: usize,
    found: usize,
) -> Result<(), IndicatorError> {
    if expected != found {
        return Err(IndicatorError::LengthMismatch {
            indicator,
            expected,
            found,
        });
    }
    Ok(())
}

/// Lifts raw samples into a line, dropping non-finite values.
pub(crate) fn defined(values: &[f64]) -> Line {
    values
        .iter()
        .map(|v| if v.is_finite() { Some(*v) } else { None })
        .collect()
}

pub(crate) fn mean(window: &[f64]) -> f64 {
    window.iter().sum::<f64>() / window.len() as f64
}

/// Applies `reduce` to every trailing window of `period` defined values.
///
/// Callers guarantee `period > 0`.
pub(crate) fn rolling<F>(values: &[Option<f64>], period: usize, reduce: F) -> Line
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = Vec::with_capacity(values.len());
    let mut window: Vec<f64> = Vec::with_capacity(period);

    for i in 0..values.len() {
        if i + 1 < period {
            out.push(None);
            continue;
        }

        window.clear();
        for value in &values[i + 1 - period..=i] {
            match value {
                Some(v) if v.is_finite() => window.push(*v),
                _ => break,
            }
        }

        out.push(if window.len() == period {
            Some(reduce(&window))
        } else {
            None
        });
    }

    out
}

/// Element-wise combination of two lines; `None` wherever either side is.
pub(crate) fn zip_with<F>(a: &[Option<f64>], b: &[Option<f64>], f: F) -> Line
where
    F: Fn(f64, f64) -> f64,
{
    a.iter()
        .zip(b)
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some(f(*x, *y)),
            _ => None,
        })
        .collect()
}
