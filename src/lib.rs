//! # Hometax Filing Summary
//!
//! Resolves the flat, unordered collection of sub-reports returned for one
//! electronic income tax filing into a single year-indexed summary, after
//! checking that the sub-reports the summary depends on are present and
//! well formed.
//!
//! ## Pipeline
//!
//! 1. **Locate** the first page (`납부계산서`) and derive the year index from
//!    its filing period start date relative to the caller's start year.
//! 2. **Validate** that the required sub-reports exist (only the first page
//!    for the base year, four more afterwards) and that their row lists are
//!    present.
//! 3. **Aggregate** the basic fields and, for subsequent years, business
//!    income, income deductions and the code-classified split of tax
//!    reductions and credits.
//!
//! Any failure short-circuits; no partial summary is returned.
//!
//! ## Example
//!
//! ```rust,ignore
//! use hometax_filing_summary::*;
//!
//! let reports = parse_reports(&raw_json)?;
//! let summary = process_filing(&reports, 2023)?;
//! let record = summary.to_keyed_fields();
//! println!("{:?}", record.get("total_income_year1"));
//! ```

pub mod aggregator;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod locator;
pub mod schema;
pub mod summary;
pub mod tax_codes;
pub mod utils;
pub mod validator;

pub use aggregator::FieldAggregator;
pub use config::ProcessorConfig;
pub use error::{ErrorCode, FilingError, Result, ValidationError};
pub use ingestion::*;
pub use locator::{find_kind, find_report};
pub use schema::*;
pub use summary::*;
pub use tax_codes::{CodeSet, TaxCodeTable};
pub use utils::*;
pub use validator::{ReportValidator, Requirement, REQUIRED_REPORTS};

use log::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct FilingProcessor {
    config: ProcessorConfig,
}

impl FilingProcessor {
    pub fn new(config: ProcessorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn process(&self, reports: &[Report], start_year: i32) -> Result<FilingSummary> {
        let first_page = find_kind(reports, ReportKind::PaymentComputation).ok_or_else(|| {
            FilingError::MissingReport {
                report: ReportKind::PaymentComputation.label().to_string(),
            }
        })?;

        let computation = first_page.tax_computation.as_ref().ok_or_else(|| {
            FilingError::Processing(format!(
                "Report '{}' is missing its tax computation (ttirnam101DVO) payload",
                first_page.name().unwrap_or_default()
            ))
        })?;

        let filing_year = parse_filing_year(&computation.filing_period_start_date)?;
        let year_index = year_index(filing_year, start_year)?;

        info!(
            "Processing filing for year {} (year index {}, start year {})",
            filing_year, year_index, start_year
        );
        debug!("Filing result contains {} reports", reports.len());

        ReportValidator::new(&self.config.business_income_code).validate(reports, year_index)?;

        FieldAggregator::new(&self.config).aggregate(reports, first_page, year_index)
    }

    pub fn process_outcome(&self, reports: &[Report], start_year: i32) -> FilingOutcome {
        self.process(reports, start_year).into()
    }

    /// Parses raw JSON and runs the pipeline; ingestion failures surface as
    /// `PROCESSING_ERROR`.
    pub fn process_json(&self, json: &str, start_year: i32) -> FilingOutcome {
        parse_reports(json)
            .and_then(|reports| self.process(&reports, start_year))
            .into()
    }

    /// Processes several filings into one history. Stops at the first failing filing.
    pub fn process_history<'r, I>(&self, filings: I, start_year: i32) -> Result<FilingHistory>
    where
        I: IntoIterator<Item = &'r [Report]>,
    {
        let mut history = FilingHistory::new();
        for reports in filings {
            let summary = self.process(reports, start_year)?;
            if let Some(replaced) = history.record(summary) {
                debug!(
                    "Replaced earlier summary for year index {}",
                    replaced.year_index
                );
            }
        }
        Ok(history)
    }
}

pub fn process_filing(reports: &[Report], start_year: i32) -> Result<FilingSummary> {
    FilingProcessor::default().process(reports, start_year)
}

pub fn process_filing_outcome(reports: &[Report], start_year: i32) -> FilingOutcome {
    FilingProcessor::default().process_outcome(reports, start_year)
}
