//! JSON report adapter implementing [`ReportPort`].
//!
//! Analysis documents carry the summary, metrics, the latest indicator
//! values and the full panel as one object per bar. Indicator keys use the
//! panel's column names (`sma_20`, `bb_upper`, ...); undefined values are
//! written as `null`.

use crate::domain::analysis::AnalysisReport;
use crate::domain::comparison::ComparisonResult;
use crate::domain::error::TickerscopeError;
use crate::domain::panel::{Column, IndicatorPanel, PanelRow};
use crate::ports::report_port::ReportPort;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;
use tracing::info;

pub struct JsonReportAdapter {
    pretty: bool,
}

impl JsonReportAdapter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn render<T: Serialize>(&self, value: &T) -> Result<String, TickerscopeError> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        rendered.map_err(|e| TickerscopeError::Report {
            reason: format!("JSON encoding failed: {}", e),
        })
    }

    fn write_file(&self, value: &Value, output_path: &Path) -> Result<(), TickerscopeError> {
        let text = self.render(value)?;
        fs::write(output_path, text).map_err(|e| TickerscopeError::Report {
            reason: format!("failed to write {}: {}", output_path.display(), e),
        })?;
        info!(path = %output_path.display(), "report written");
        Ok(())
    }
}

impl Default for JsonReportAdapter {
    fn default() -> Self {
        Self::new(true)
    }
}

/// JSON document for a single-asset analysis.
pub fn analysis_document(report: &AnalysisReport) -> Value {
    let panel = &report.panel;
    json!({
        "code": report.code,
        "market": report.market,
        "bars": panel.len(),
        "first_date": panel.bars().first().map(|b| b.date),
        "last_date": panel.bars().last().map(|b| b.date),
        "summary": report.summary,
        "metrics": report.metrics,
        "latest": panel.last_row().map(|row| indicator_values(panel, &row)),
        "panel": panel.rows().map(|row| row_document(panel, &row)).collect::<Vec<_>>(),
    })
}

fn indicator_values(panel: &IndicatorPanel, row: &PanelRow<'_>) -> Map<String, Value> {
    Column::ALL
        .iter()
        .map(|&column| (column.name(panel.config()), json!(row.value(column))))
        .collect()
}

fn row_document(panel: &IndicatorPanel, row: &PanelRow<'_>) -> Value {
    let bar = row.bar;
    let mut doc = Map::new();
    doc.insert("date".into(), json!(bar.date));
    doc.insert("open".into(), json!(bar.open));
    doc.insert("high".into(), json!(bar.high));
    doc.insert("low".into(), json!(bar.low));
    doc.insert("close".into(), json!(bar.close));
    doc.insert("volume".into(), json!(bar.volume));
    doc.extend(indicator_values(panel, row));
    Value::Object(doc)
}

impl ReportPort for JsonReportAdapter {
    fn write_analysis(
        &self,
        report: &AnalysisReport,
        output_path: &Path,
    ) -> Result<(), TickerscopeError> {
        self.write_file(&analysis_document(report), output_path)
    }

    fn write_comparison(
        &self,
        result: &ComparisonResult,
        output_path: &Path,
    ) -> Result<(), TickerscopeError> {
        let value = serde_json::to_value(result).map_err(|e| TickerscopeError::Report {
            reason: format!("JSON encoding failed: {}", e),
        })?;
        self.write_file(&value, output_path)
    }
}
