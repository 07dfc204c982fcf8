//! Average Directional Index.
//!
//! Calculation pipeline:
//!   1. True Range per bar; the first bar has no previous close, so TR = high - low.
//!   2. +DM = high - prev high, -DM = prev low - low. Each is kept only when it
//!      is positive and strictly greater than the opposing move, else 0.
//!   3. Smooth TR, +DM and -DM with a trailing simple mean over n bars.
//!   4. DI± = 100 × smoothed(DM±) / smoothed(TR), 0 when smoothed TR is 0.
//!   5. DX = 100 × |DI+ - DI-| / (DI+ + DI-), 0 when both DI are 0.
//!   6. ADX = trailing simple mean of DX over n bars.
//!
//! Warmup: first 2(n-1) positions are `None`.

use crate::domain::indicator::{
    mean, require_len, require_period, rolling, IndicatorError, IndicatorType, Line,
};

pub const DEFAULT_PERIOD: usize = 14;

pub fn adx(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    period: usize,
) -> Result<Line, IndicatorError> {
    let indicator = IndicatorType::Adx(period);
    require_period(indicator, period)?;
    require_len(indicator, close.len(), high.len())?;
    require_len(indicator, close.len(), low.len())?;

    let n = close.len();
    let mut tr: Line = Vec::with_capacity(n);
    let mut plus_dm: Line = Vec::with_capacity(n);
    let mut minus_dm: Line = Vec::with_capacity(n);

    for i in 0..n {
        if i == 0 {
            tr.push(Some(high[0] - low[0]).filter(|v| v.is_finite()));
            plus_dm.push(Some(0.0));
            minus_dm.push(Some(0.0));
            continue;
        }

        let hl = high[i] - low[i];
        let hc = (high[i] - close[i - 1]).abs();
        let lc = (low[i] - close[i - 1]).abs();
        tr.push(Some(hl.max(hc).max(lc)).filter(|v| v.is_finite()));

        let up_move = high[i] - high[i - 1];
        let down_move = low[i - 1] - low[i];
        if !up_move.is_finite() || !down_move.is_finite() {
            plus_dm.push(None);
            minus_dm.push(None);
            continue;
        }
        plus_dm.push(Some(if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        }));
        minus_dm.push(Some(if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        }));
    }

    let tr_smooth = rolling(&tr, period, mean);
    let plus_smooth = rolling(&plus_dm, period, mean);
    let minus_smooth = rolling(&minus_dm, period, mean);

    let dx: Line = (0..n)
        .map(|i| {
            let tr = tr_smooth[i]?;
            let (plus_di, minus_di) = if tr > 0.0 {
                (100.0 * plus_smooth[i]? / tr, 100.0 * minus_smooth[i]? / tr)
            } else {
                (0.0, 0.0)
            };
            let di_sum = plus_di + minus_di;
            Some(if di_sum == 0.0 {
                0.0
            } else {
                100.0 * (plus_di - minus_di).abs() / di_sum
            })
        })
        .collect();

    Ok(rolling(&dx, period, mean))
}
