//! Report sink port.

use crate::domain::analysis::AnalysisReport;
use crate::domain::comparison::ComparisonResult;
use crate::domain::error::TickerscopeError;
use std::path::Path;

/// Writes finished results somewhere durable.
pub trait ReportPort {
    fn write_analysis(
        &self,
        report: &AnalysisReport,
        output_path: &Path,
    ) -> Result<(), TickerscopeError>;

    fn write_comparison(
        &self,
        result: &ComparisonResult,
        output_path: &Path,
    ) -> Result<(), TickerscopeError>;
}
