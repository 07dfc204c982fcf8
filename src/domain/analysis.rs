//! Single-asset pipeline: panel, summary and metrics for one series.

use crate::domain::metrics::PerformanceMetrics;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::panel::{build_panel_with, IndicatorPanel, PanelConfig};
use crate::domain::summary::{summarize, TechnicalSummary};
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub code: String,
    pub market: String,
    pub panel: IndicatorPanel,
    pub summary: TechnicalSummary,
    /// `None` when the series is too short for return statistics.
    pub metrics: Option<PerformanceMetrics>,
}

pub fn analyze(series: &PriceSeries, config: &PanelConfig, risk_free_rate: f64) -> AnalysisReport {
    let panel = build_panel_with(series, config);
    let summary = summarize(&panel);
    let metrics = PerformanceMetrics::compute(series, risk_free_rate);

    info!(
        code = series.code(),
        market = series.market(),
        bars = series.len(),
        trend = %summary.trend_signal,
        "analysis complete"
    );

    AnalysisReport {
        code: series.code().to_string(),
        market: series.market().to_string(),
        panel,
        summary,
        metrics,
    }
}
