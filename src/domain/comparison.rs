//! Multi-asset ranking with templated rationale.
//!
//! Each asset is reduced to [`PerformanceMetrics`] plus its
//! [`TechnicalSummary`], scored, and ranked by descending score. Ties keep
//! input order. Assets with fewer than two bars are excluded. With no usable
//! assets a degraded result is returned instead of an error.

use crate::domain::metrics::{PerformanceMetrics, DEFAULT_RISK_FREE_RATE};
use crate::domain::ohlcv::PriceSeries;
use crate::domain::scoring::{score, ScoreCard};
use crate::domain::summary::{MacdSignal, TechnicalSummary, TrendSignal};
use serde::Serialize;
use tracing::{debug, info, warn};

pub const MAX_REASONS: usize = 4;

/// One asset submitted for comparison.
#[derive(Debug, Clone)]
pub struct AssetInput {
    pub id: String,
    pub series: PriceSeries,
    pub summary: TechnicalSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    pub asset: String,
    /// 1-based.
    pub rank: usize,
    pub score: u8,
    pub rationale: String,
    pub trend: TrendSignal,
    pub metrics: PerformanceMetrics,
    pub score_card: ScoreCard,
}

/// Best asset against the runner-up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonDelta {
    pub runner_up: String,
    pub return_margin: f64,
    pub volatility_margin: f64,
    pub sharpe_margin: f64,
    pub score_margin: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub insufficient_data: bool,
    pub best_choice: Option<String>,
    pub best_choice_reasons: Vec<String>,
    pub rankings: Vec<Ranking>,
    pub excluded: Vec<String>,
    pub delta: Option<ComparisonDelta>,
    pub risk_comparison: String,
    pub return_comparison: String,
    pub technical_comparison: String,
    pub recommendation: String,
    pub summary: String,
}

impl ComparisonResult {
    pub fn best(&self) -> Option<&Ranking> {
        self.rankings.first()
    }

    fn degraded(excluded: Vec<String>) -> Self {
        Self {
            insufficient_data: true,
            best_choice: None,
            best_choice_reasons: vec![
                "Insufficient data available for comprehensive analysis".into(),
                "Try different symbols or a longer lookback period".into(),
                "Check that each symbol is valid for its market".into(),
            ],
            rankings: Vec::new(),
            excluded,
            delta: None,
            risk_comparison: "Unable to perform risk comparison due to insufficient data".into(),
            return_comparison: "Unable to compare returns due to insufficient data".into(),
            technical_comparison: "Unable to perform technical comparison due to insufficient data"
                .into(),
            recommendation: "Select different symbols or verify that they are correct".into(),
            summary: "Analysis could not be completed due to insufficient data. \
                      Verify the symbols and try again."
                .into(),
        }
    }
}

pub fn rank_assets(assets: &[AssetInput]) -> ComparisonResult {
    rank_assets_with(assets, DEFAULT_RISK_FREE_RATE)
}

pub fn rank_assets_with(assets: &[AssetInput], risk_free_rate: f64) -> ComparisonResult {
    let mut excluded = Vec::new();
    let mut scored: Vec<(Ranking, &TechnicalSummary)> = Vec::with_capacity(assets.len());

    for asset in assets {
        let Some(metrics) = PerformanceMetrics::compute(&asset.series, risk_free_rate) else {
            warn!(asset = %asset.id, bars = asset.series.len(), "excluded from comparison");
            excluded.push(asset.id.clone());
            continue;
        };
        let card = score(&metrics, &asset.summary);
        debug!(asset = %asset.id, score = card.score, raw = card.raw, "scored");

        let ranking = Ranking {
            asset: asset.id.clone(),
            rank: 0,
            score: card.score,
            rationale: rationale(card.score, &metrics, asset.summary.trend_signal),
            trend: asset.summary.trend_signal,
            metrics,
            score_card: card,
        };
        scored.push((ranking, &asset.summary));
    }

    if scored.is_empty() {
        warn!(requested = assets.len(), "no asset has usable data");
        return ComparisonResult::degraded(excluded);
    }

    // stable: equal scores keep input order
    scored.sort_by(|a, b| b.0.score.cmp(&a.0.score));
    let best_summary = scored[0].1;
    let rankings: Vec<Ranking> = scored
        .into_iter()
        .enumerate()
        .map(|(i, (mut r, _))| {
            r.rank = i + 1;
            r
        })
        .collect();

    let best = &rankings[0];
    let runner_up = rankings.get(1);
    let delta = runner_up.map(|second| ComparisonDelta {
        runner_up: second.asset.clone(),
        return_margin: best.metrics.total_return - second.metrics.total_return,
        volatility_margin: best.metrics.volatility - second.metrics.volatility,
        sharpe_margin: best.metrics.sharpe_ratio - second.metrics.sharpe_ratio,
        score_margin: best.score as i32 - second.score as i32,
    });

    let narrative = Narrative {
        best,
        summary: best_summary,
        runner_up,
        requested: assets.len(),
    };
    let best_choice = Some(best.asset.clone());
    let best_choice_reasons = narrative.reasons();
    let risk_comparison = narrative.risk();
    let return_comparison = narrative.returns();
    let technical_comparison = narrative.technical();
    let recommendation = narrative.recommendation();
    let summary = narrative.summary();

    let result = ComparisonResult {
        insufficient_data: false,
        best_choice,
        best_choice_reasons,
        rankings,
        excluded,
        delta,
        risk_comparison,
        return_comparison,
        technical_comparison,
        recommendation,
        summary,
    };

    info!(
        best = result.best_choice.as_deref().unwrap_or_default(),
        ranked = result.rankings.len(),
        excluded = result.excluded.len(),
        "comparison complete"
    );
    result
}

fn rationale(score: u8, m: &PerformanceMetrics, trend: TrendSignal) -> String {
    format!(
        "Overall Score: {}/100. Return: {:.1}%, Volatility: {:.1}%, Sharpe: {:.2}, Trend: {}",
        score, m.total_return, m.volatility, m.sharpe_ratio, trend
    )
}

struct Narrative<'a> {
    best: &'a Ranking,
    summary: &'a TechnicalSummary,
    runner_up: Option<&'a Ranking>,
    requested: usize,
}

impl Narrative<'_> {
    fn reasons(&self) -> Vec<String> {
        let m = &self.best.metrics;
        let mut reasons = vec![format!(
            "Highest overall score ({}/100) based on returns, risk and technical factors",
            self.best.score
        )];

        if m.total_return > 0.0 {
            reasons.push(format!(
                "Superior return performance with {:.1}% total return over the analysis period",
                m.total_return
            ));
        } else {
            reasons.push(format!(
                "Best risk-adjusted performance with Sharpe ratio of {:.2}",
                m.sharpe_ratio
            ));
        }

        if m.sharpe_ratio > 0.5 {
            reasons.push(format!(
                "Strong risk-reward profile with Sharpe ratio of {:.2} and maximum drawdown of only {:.1}%",
                m.sharpe_ratio, m.max_drawdown
            ));
        } else {
            reasons.push(format!(
                "Favorable technical setup with {} trend and RSI at {:.1}",
                self.summary.trend_signal, self.summary.rsi_current
            ));
        }

        if let Some(second) = self.runner_up {
            reasons.push(comparative_reason(self.best, second));
        }

        reasons.truncate(MAX_REASONS);
        reasons
    }

    fn risk(&self) -> String {
        let m = &self.best.metrics;
        format!(
            "Risk analysis shows {} offers the best balance with {:.1}% volatility and {:.1}% \
             maximum drawdown. A Sharpe ratio of {:.2} indicates its risk-adjusted return \
             compared to the alternatives.",
            self.best.asset, m.volatility, m.max_drawdown, m.sharpe_ratio
        )
    }

    fn returns(&self) -> String {
        let mut text = format!(
            "{} demonstrates the strongest performance with {:.1}% total return.",
            self.best.asset, self.best.metrics.total_return
        );
        if let Some(second) = self.runner_up {
            text.push_str(&format!(
                " The runner-up {} returned {:.1}%.",
                second.asset, second.metrics.total_return
            ));
        }
        text
    }

    fn technical(&self) -> String {
        let outlook = if self.summary.trend_signal.is_up() {
            "continued upward momentum"
        } else {
            "stable price action"
        };
        format!(
            "Technical analysis favors {} with {} trend, {} MACD signal and RSI at {:.1}. \
             The setup suggests {}.",
            self.best.asset,
            self.summary.trend_signal,
            macd_label(self.summary.macd_signal),
            self.summary.rsi_current,
            outlook
        )
    }

    fn recommendation(&self) -> String {
        let tail = match self.runner_up {
            Some(second) => format!(
                "Consider 30-40% allocation to {} for diversification.",
                second.asset
            ),
            None => "Maintain cash reserves for entry opportunities.".into(),
        };
        format!(
            "Primary recommendation: allocate 60-70% to {} as the core holding. {}",
            self.best.asset, tail
        )
    }

    fn summary(&self) -> String {
        let m = &self.best.metrics;
        let condition = if self.summary.trend_signal.is_up() {
            "strong momentum"
        } else {
            "stable conditions"
        };
        format!(
            "Analysis across {} assets identifies {} as the best choice. With {:.1}% return, \
             {:.1}% volatility and a Sharpe ratio of {:.2}, {} shows the best combination of \
             performance and risk. The technical setup shows {} trend with RSI at {:.1}, \
             indicating {}. With an overall score of {}/100, {} is the best risk-reward \
             opportunity among the compared assets.",
            self.requested,
            self.best.asset,
            m.total_return,
            m.volatility,
            m.sharpe_ratio,
            self.best.asset,
            self.summary.trend_signal.to_string().to_lowercase(),
            self.summary.rsi_current,
            condition,
            self.best.score,
            self.best.asset
        )
    }
}

/// Return margin if favorable, else lower volatility, else score margin.
fn comparative_reason(best: &Ranking, second: &Ranking) -> String {
    let (bm, sm) = (&best.metrics, &second.metrics);
    if bm.total_return > sm.total_return {
        format!(
            "Outperforms {} by {:.1}% in total returns",
            second.asset,
            bm.total_return - sm.total_return
        )
    } else if bm.volatility < sm.volatility {
        format!(
            "Lower volatility ({:.1}%) compared to {} ({:.1}%), indicating more stable performance",
            bm.volatility, second.asset, sm.volatility
        )
    } else if best.score > second.score {
        format!(
            "Scores {} points above {} ({}/100 vs {}/100)",
            best.score - second.score,
            second.asset,
            best.score,
            second.score
        )
    } else {
        format!(
            "Ties {} at {}/100 and ranks ahead by listing order",
            second.asset, best.score
        )
    }
}

fn macd_label(signal: MacdSignal) -> &'static str {
    match signal {
        MacdSignal::Bullish => "bullish",
        MacdSignal::Bearish => "bearish",
        MacdSignal::Neutral => "neutral",
    }
}
