use crate::config::DEFAULT_BUSINESS_INCOME_CODE;
use crate::error::{FilingError, Result};
use crate::locator::find_kind;
use crate::schema::{Report, ReportKind};
use log::debug;

/// A report that must be present when `applies` holds for the year index.
pub struct Requirement {
    pub kind: ReportKind,
    pub applies: fn(i32) -> bool,
}

fn always(_year_index: i32) -> bool {
    true
}

fn subsequent_year(year_index: i32) -> bool {
    year_index > 0
}

/// Evaluated in order; the first unmet requirement is reported.
pub const REQUIRED_REPORTS: [Requirement; 5] = [
    Requirement {
        kind: ReportKind::PaymentComputation,
        applies: always,
    },
    Requirement {
        kind: ReportKind::BusinessIncomeStatement,
        applies: subsequent_year,
    },
    Requirement {
        kind: ReportKind::ComprehensiveIncome,
        applies: subsequent_year,
    },
    Requirement {
        kind: ReportKind::IncomeDeduction,
        applies: subsequent_year,
    },
    Requirement {
        kind: ReportKind::TaxCredit,
        applies: subsequent_year,
    },
];

pub struct ReportValidator<'a> {
    business_income_code: &'a str,
}

impl Default for ReportValidator<'_> {
    fn default() -> Self {
        Self::new(DEFAULT_BUSINESS_INCOME_CODE)
    }
}

impl<'a> ReportValidator<'a> {
    pub fn new(business_income_code: &'a str) -> Self {
        Self {
            business_income_code,
        }
    }

    pub fn validate(&self, reports: &[Report], year_index: i32) -> Result<()> {
        self.check_presence(reports, year_index)?;

        if subsequent_year(year_index) {
            self.check_structure(reports)?;
        }

        debug!("Report validation passed for year index {}", year_index);
        Ok(())
    }

    fn check_presence(&self, reports: &[Report], year_index: i32) -> Result<()> {
        for requirement in &REQUIRED_REPORTS {
            if (requirement.applies)(year_index) && find_kind(reports, requirement.kind).is_none()
            {
                return Err(FilingError::MissingReport {
                    report: requirement.kind.label().to_string(),
                });
            }
        }

        Ok(())
    }

    fn check_structure(&self, reports: &[Report]) -> Result<()> {
        if let Some(report) = find_kind(reports, ReportKind::ComprehensiveIncome) {
            let rows = report.income_rows().ok_or_else(|| FilingError::InvalidStructure {
                report: ReportKind::ComprehensiveIncome.label().to_string(),
                detail: "income classification rows are missing".to_string(),
            })?;

            let has_business_income = rows.iter().any(|row| {
                row.classification_code == self.business_income_code && row.amount.is_some()
            });

            if !has_business_income {
                return Err(FilingError::NoBusinessIncome {
                    report: ReportKind::ComprehensiveIncome.label().to_string(),
                });
            }
        }

        if let Some(report) = find_kind(reports, ReportKind::TaxCredit) {
            if report.credit_rows().is_none() {
                return Err(FilingError::InvalidStructure {
                    report: ReportKind::TaxCredit.label().to_string(),
                    detail: "tax credit breakdown rows are missing".to_string(),
                });
            }
        }

        if let Some(report) = find_kind(reports, ReportKind::IncomeDeduction) {
            if report.deduction_items().is_none() {
                return Err(FilingError::InvalidStructure {
                    report: ReportKind::IncomeDeduction.label().to_string(),
                    detail: "deduction items are missing".to_string(),
                });
            }
        }

        Ok(())
    }
}
