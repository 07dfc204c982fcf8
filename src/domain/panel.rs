//! Indicator panel: one asset's bars with every indicator column aligned to them.

use crate::domain::indicator::adx::adx;
use crate::domain::indicator::bollinger::{bollinger, BollingerBands};
use crate::domain::indicator::ema::ema;
use crate::domain::indicator::macd::{macd, MacdLines};
use crate::domain::indicator::rsi::rsi;
use crate::domain::indicator::sma::sma;
use crate::domain::indicator::stochastic::{stochastic, StochasticLines};
use crate::domain::indicator::support_resistance::{support_resistance, SupportResistance};
use crate::domain::indicator::williams_r::williams_r;
use crate::domain::indicator::{IndicatorError, Line};
use crate::domain::ohlcv::{OhlcvBar, PriceSeries};
use chrono::NaiveDate;
use tracing::{debug, warn};

/// Window lengths used when building a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelConfig {
    pub sma_short: usize,
    pub sma_long: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub rsi: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_k: f64,
    pub stoch_k: usize,
    pub stoch_d: usize,
    pub williams_r: usize,
    pub adx: usize,
    pub support_resistance: usize,
    /// Trailing window for the average volume used by the summary.
    pub volume_average: usize,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            sma_short: 20,
            sma_long: 50,
            ema_fast: 12,
            ema_slow: 26,
            rsi: 14,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_k: 2.0,
            stoch_k: 14,
            stoch_d: 3,
            williams_r: 14,
            adx: 14,
            support_resistance: 20,
            volume_average: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    SmaShort,
    SmaLong,
    EmaFast,
    EmaSlow,
    Rsi,
    Macd,
    MacdSignal,
    MacdHistogram,
    BbUpper,
    BbMiddle,
    BbLower,
    StochK,
    StochD,
    WilliamsR,
    Adx,
    Support,
    Resistance,
}

impl Column {
    pub const COUNT: usize = 17;

    /// Columns in build order.
    pub const ALL: [Column; Column::COUNT] = [
        Column::SmaShort,
        Column::SmaLong,
        Column::EmaFast,
        Column::EmaSlow,
        Column::Rsi,
        Column::Macd,
        Column::MacdSignal,
        Column::MacdHistogram,
        Column::BbUpper,
        Column::BbMiddle,
        Column::BbLower,
        Column::StochK,
        Column::StochD,
        Column::WilliamsR,
        Column::Adx,
        Column::Support,
        Column::Resistance,
    ];

    /// Column header, e.g. `sma_20` for the short SMA under default config.
    pub fn name(self, config: &PanelConfig) -> String {
        match self {
            Column::SmaShort => format!("sma_{}", config.sma_short),
            Column::SmaLong => format!("sma_{}", config.sma_long),
            Column::EmaFast => format!("ema_{}", config.ema_fast),
            Column::EmaSlow => format!("ema_{}", config.ema_slow),
            Column::Rsi => "rsi".into(),
            Column::Macd => "macd".into(),
            Column::MacdSignal => "macd_signal".into(),
            Column::MacdHistogram => "macd_histogram".into(),
            Column::BbUpper => "bb_upper".into(),
            Column::BbMiddle => "bb_middle".into(),
            Column::BbLower => "bb_lower".into(),
            Column::StochK => "stoch_k".into(),
            Column::StochD => "stoch_d".into(),
            Column::WilliamsR => "williams_r".into(),
            Column::Adx => "adx".into(),
            Column::Support => "support".into(),
            Column::Resistance => "resistance".into(),
        }
    }
}

/// Read-only, time-indexed table of bars plus one column per indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPanel {
    config: PanelConfig,
    bars: Vec<OhlcvBar>,
    columns: Vec<Line>,
}

/// One panel row: the bar and every indicator value at that date.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelRow<'a> {
    pub bar: &'a OhlcvBar,
    values: [Option<f64>; Column::COUNT],
}

impl PanelRow<'_> {
    pub fn value(&self, column: Column) -> Option<f64> {
        self.values[column as usize]
    }

    pub fn date(&self) -> NaiveDate {
        self.bar.date
    }
}

impl IndicatorPanel {
    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn column(&self, column: Column) -> &[Option<f64>] {
        &self.columns[column as usize]
    }

    pub fn row(&self, index: usize) -> Option<PanelRow<'_>> {
        let bar = self.bars.get(index)?;
        let mut values = [None; Column::COUNT];
        for column in Column::ALL {
            values[column as usize] = self.columns[column as usize].get(index).copied().flatten();
        }
        Some(PanelRow { bar, values })
    }

    pub fn last_row(&self) -> Option<PanelRow<'_>> {
        self.row(self.bars.len().checked_sub(1)?)
    }

    pub fn rows(&self) -> impl Iterator<Item = PanelRow<'_>> {
        (0..self.bars.len()).filter_map(|i| self.row(i))
    }
}

/// Builds a panel with the default windows.
pub fn build_panel(series: &PriceSeries) -> IndicatorPanel {
    build_panel_with(series, &PanelConfig::default())
}

/// Builds a panel, computing each indicator independently.
///
/// An indicator that rejects its parameters leaves its columns as all-`None`
/// and the remaining indicators are still computed.
pub fn build_panel_with(series: &PriceSeries, config: &PanelConfig) -> IndicatorPanel {
    let n = series.len();
    debug!(code = series.code(), bars = n, "building indicator panel");

    let close = series.closes();
    let high = series.highs();
    let low = series.lows();
    let empty = || vec![None; n];

    let mut columns: Vec<Line> = vec![Vec::new(); Column::COUNT];
    let mut set = |column: Column, line: Line| columns[column as usize] = line;

    set(
        Column::SmaShort,
        isolate(series, sma(&close, config.sma_short), empty),
    );
    set(
        Column::SmaLong,
        isolate(series, sma(&close, config.sma_long), empty),
    );
    set(
        Column::EmaFast,
        isolate(series, ema(&close, config.ema_fast), empty),
    );
    set(
        Column::EmaSlow,
        isolate(series, ema(&close, config.ema_slow), empty),
    );
    set(Column::Rsi, isolate(series, rsi(&close, config.rsi), empty));

    let lines = isolate(
        series,
        macd(&close, config.ema_fast, config.ema_slow, config.macd_signal),
        || MacdLines {
            macd: empty(),
            signal: empty(),
            histogram: empty(),
        },
    );
    set(Column::Macd, lines.macd);
    set(Column::MacdSignal, lines.signal);
    set(Column::MacdHistogram, lines.histogram);

    let bands = isolate(
        series,
        bollinger(&close, config.bollinger_period, config.bollinger_k),
        || BollingerBands {
            upper: empty(),
            middle: empty(),
            lower: empty(),
        },
    );
    set(Column::BbUpper, bands.upper);
    set(Column::BbMiddle, bands.middle);
    set(Column::BbLower, bands.lower);

    let stoch = isolate(
        series,
        stochastic(&high, &low, &close, config.stoch_k, config.stoch_d),
        || StochasticLines {
            k: empty(),
            d: empty(),
        },
    );
    set(Column::StochK, stoch.k);
    set(Column::StochD, stoch.d);

    set(
        Column::WilliamsR,
        isolate(series, williams_r(&high, &low, &close, config.williams_r), empty),
    );
    set(
        Column::Adx,
        isolate(series, adx(&high, &low, &close, config.adx), empty),
    );

    let levels = isolate(
        series,
        support_resistance(&high, &low, config.support_resistance),
        || SupportResistance {
            support: empty(),
            resistance: empty(),
        },
    );
    set(Column::Support, levels.support);
    set(Column::Resistance, levels.resistance);

    IndicatorPanel {
        config: config.clone(),
        bars: series.bars().to_vec(),
        columns,
    }
}

fn isolate<T>(
    series: &PriceSeries,
    result: Result<T, IndicatorError>,
    fallback: impl FnOnce() -> T,
) -> T {
    result.unwrap_or_else(|e| {
        warn!(code = series.code(), error = %e, "indicator skipped");
        fallback()
    })
}
