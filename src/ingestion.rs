use crate::error::Result;
use crate::schema::Report;
use log::debug;
use std::path::Path;

/// An unordered collection of sub-reports for one filing.
pub type ReportCollection = Vec<Report>;

/// Parses a report collection from the raw JSON array sent by the filing source.
///
/// Amounts are coerced to numbers here; a malformed amount fails the whole
/// collection rather than reaching the pipeline.
pub fn parse_reports(json: &str) -> Result<ReportCollection> {
    let reports: ReportCollection = serde_json::from_str(json)?;
    debug!("Parsed {} reports from JSON", reports.len());
    Ok(reports)
}

pub fn parse_reports_value(value: serde_json::Value) -> Result<ReportCollection> {
    Ok(serde_json::from_value(value)?)
}

pub fn read_reports_file(path: impl AsRef<Path>) -> Result<ReportCollection> {
    let contents = std::fs::read_to_string(path)?;
    parse_reports(&contents)
}
