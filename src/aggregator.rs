use crate::config::ProcessorConfig;
use crate::error::{FilingError, Result};
use crate::locator::find_kind;
use crate::schema::{CreditRow, DeductionItem, Report, ReportKind};
use crate::summary::{BasicFields, FilingSummary, TaxAdjustments};
use crate::tax_codes::CodeSet;
use crate::utils::{is_base_year, parse_filing_year};
use log::debug;

/// Derives the summary fields of an already validated report collection.
pub struct FieldAggregator<'a> {
    config: &'a ProcessorConfig,
}

impl<'a> FieldAggregator<'a> {
    pub fn new(config: &'a ProcessorConfig) -> Self {
        Self { config }
    }

    pub fn aggregate(
        &self,
        reports: &[Report],
        first_page: &Report,
        year_index: i32,
    ) -> Result<FilingSummary> {
        let mut summary = self.initialize_basic_data(first_page, year_index)?;

        if !is_base_year(year_index) {
            self.process_business_income(reports, &mut summary);
            self.process_deductions(reports, &mut summary);
            self.process_tax_credits_and_reductions(reports, &mut summary);
        }

        Ok(summary)
    }

    pub fn initialize_basic_data(
        &self,
        first_page: &Report,
        year_index: i32,
    ) -> Result<FilingSummary> {
        let overview = first_page.filing_overview.as_ref().ok_or_else(|| {
            missing_payload(first_page, "filing overview (ttirndm001DVO)")
        })?;
        let computation = first_page.tax_computation.as_ref().ok_or_else(|| {
            missing_payload(first_page, "tax computation (ttirnam101DVO)")
        })?;

        let basic = BasicFields {
            account_duty: overview.bookkeeping_duty_code.clone(),
            filing_type: overview.filing_type_code.clone(),
            total_income: overview.total_income.value(),
            taxation_standard: computation.taxation_standard.value(),
            calculated_tax: computation.calculated_tax.value(),
            tax_reduction: computation.tax_reduction.value(),
            tax_credit: computation.tax_credit.value(),
            determined_tax: computation.determined_tax.value(),
            additional_tax: 0.0,
            pre_paid_tax: computation.pre_paid_tax.value(),
            paid_agricultural_tax: 0.0,
        };

        Ok(FilingSummary {
            year_index,
            filing_year: parse_filing_year(&computation.filing_period_start_date)?,
            filing_period_start: computation.filing_period_start(),
            basic,
            business_income: None,
            income_deduction: None,
            tax_adjustments: None,
        })
    }

    /// Takes the first business income row; only one is expected per filing.
    pub fn process_business_income(&self, reports: &[Report], summary: &mut FilingSummary) {
        let business_income = find_kind(reports, ReportKind::ComprehensiveIncome)
            .and_then(Report::income_rows)
            .and_then(|rows| {
                rows.iter()
                    .find(|row| row.classification_code == self.config.business_income_code)
            })
            .and_then(|row| row.amount)
            .map(|amount| amount.value())
            .unwrap_or(0.0);

        debug!(
            "Business income for year index {}: {}",
            summary.year_index, business_income
        );
        summary.business_income = Some(business_income);
    }

    pub fn process_deductions(&self, reports: &[Report], summary: &mut FilingSummary) {
        if let Some(items) =
            find_kind(reports, ReportKind::IncomeDeduction).and_then(Report::deduction_items)
        {
            summary.income_deduction = Some(sum_amounts(items));
        }
    }

    pub fn process_tax_credits_and_reductions(
        &self,
        reports: &[Report],
        summary: &mut FilingSummary,
    ) {
        let Some(rows) = find_kind(reports, ReportKind::TaxCredit).and_then(Report::credit_rows)
        else {
            return;
        };

        let codes = &self.config.tax_codes;
        let reduction_excluded = sum_by_code(rows, &codes.reduction);
        let credit_excluded = sum_by_code(rows, &codes.credit);

        summary.tax_adjustments = Some(TaxAdjustments {
            reduction_excluded,
            credit_excluded,
            reduction_included: summary.basic.tax_reduction - reduction_excluded,
            credit_included: summary.basic.tax_credit - credit_excluded,
        });
    }
}

fn missing_payload(report: &Report, payload: &str) -> FilingError {
    FilingError::Processing(format!(
        "Report '{}' is missing its {} payload",
        report.name().unwrap_or_default(),
        payload
    ))
}

pub fn sum_amounts(items: &[DeductionItem]) -> f64 {
    items.iter().map(|item| item.amount.value()).sum()
}

/// Sums rows whose entry code is a member of `codes`. Each table is applied
/// independently, so overlapping tables count a row twice.
pub fn sum_by_code(rows: &[CreditRow], codes: &CodeSet) -> f64 {
    rows.iter()
        .filter(|row| codes.contains(&row.entry_code))
        .map(|row| row.amount.value())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Amount, FilingOverview, IncomeRow, RowList, TaxComputation};
    use crate::tax_codes::TaxCodeTable;

    fn first_page() -> Report {
        Report {
            filing_overview: Some(FilingOverview {
                bookkeeping_duty_code: "02".to_string(),
                filing_type_code: "20".to_string(),
                total_income: Amount(80_000_000.0),
            }),
            tax_computation: Some(TaxComputation {
                filing_period_start_date: "20230101".to_string(),
                taxation_standard: Amount(70_000_000.0),
                calculated_tax: Amount(12_000_000.0),
                tax_reduction: Amount(500_000.0),
                tax_credit: Amount(400_000.0),
                determined_tax: Amount(11_100_000.0),
                pre_paid_tax: Amount(2_000_000.0),
            }),
            ..Report::named("납부계산서")
        }
    }

    fn credit_row(code: &str, amount: f64) -> CreditRow {
        CreditRow {
            entry_code: code.to_string(),
            amount: Amount(amount),
        }
    }

    fn income_row(code: &str, amount: f64) -> IncomeRow {
        IncomeRow {
            classification_code: code.to_string(),
            amount: Some(Amount(amount)),
        }
    }

    #[test]
    fn test_base_year_has_only_basic_fields() {
        let config = ProcessorConfig::default();
        let aggregator = FieldAggregator::new(&config);
        let reports = vec![first_page()];

        let summary = aggregator.aggregate(&reports, &reports[0], 0).unwrap();
        assert_eq!(summary.filing_year, 2023);
        assert_eq!(summary.basic.total_income, 80_000_000.0);
        assert_eq!(summary.basic.additional_tax, 0.0);
        assert_eq!(summary.basic.paid_agricultural_tax, 0.0);
        assert!(summary.business_income.is_none());
        assert!(summary.income_deduction.is_none());
        assert!(summary.tax_adjustments.is_none());
    }

    #[test]
    fn test_missing_first_page_payload() {
        let config = ProcessorConfig::default();
        let aggregator = FieldAggregator::new(&config);
        let page = Report::named("납부계산서");

        let err = aggregator.initialize_basic_data(&page, 1).unwrap_err();
        assert!(matches!(err, FilingError::Processing(_)));
    }

    #[test]
    fn test_business_income_takes_first_match() {
        let config = ProcessorConfig::default();
        let aggregator = FieldAggregator::new(&config);
        let reports = vec![Report {
            income_breakdown: Some(RowList::new(vec![
                income_row("10", 5_000.0),
                income_row("40", 30_000.0),
                income_row("40", 99_000.0),
            ])),
            ..Report::named("종합소득금액및결손금이월결손금공제명세서")
        }];
        let mut summary = aggregator.initialize_basic_data(&first_page(), 1).unwrap();

        aggregator.process_business_income(&reports, &mut summary);
        assert_eq!(summary.business_income, Some(30_000.0));
    }

    #[test]
    fn test_business_income_defaults_to_zero() {
        let config = ProcessorConfig::default();
        let aggregator = FieldAggregator::new(&config);
        let mut summary = aggregator.initialize_basic_data(&first_page(), 1).unwrap();

        aggregator.process_business_income(&[], &mut summary);
        assert_eq!(summary.business_income, Some(0.0));
    }

    #[test]
    fn test_deductions_sum_and_absence() {
        let config = ProcessorConfig::default();
        let aggregator = FieldAggregator::new(&config);
        let mut summary = aggregator.initialize_basic_data(&first_page(), 1).unwrap();

        aggregator.process_deductions(&[Report::named("소득공제명세서")], &mut summary);
        assert!(summary.income_deduction.is_none());

        let reports = vec![Report {
            deduction_items: Some(vec![
                DeductionItem { amount: Amount(1_500_000.0) },
                DeductionItem { amount: Amount(250_000.0) },
            ]),
            ..Report::named("소득공제명세서")
        }];
        aggregator.process_deductions(&reports, &mut summary);
        assert_eq!(summary.income_deduction, Some(1_750_000.0));
    }

    #[test]
    fn test_partition_excludes_unmatched_rows() {
        let config = ProcessorConfig::default();
        let aggregator = FieldAggregator::new(&config);
        let reports = vec![Report {
            credit_breakdown: Some(RowList::new(vec![
                credit_row("211", 100_000.0),
                credit_row("281", 150_000.0),
                credit_row("999", 75_000.0),
                credit_row("212", 50_000.0),
            ])),
            ..Report::named("세액공제명세서")
        }];
        let mut summary = aggregator.initialize_basic_data(&first_page(), 1).unwrap();

        aggregator.process_tax_credits_and_reductions(&reports, &mut summary);
        let adjustments = summary.tax_adjustments.unwrap();
        assert_eq!(adjustments.reduction_excluded, 150_000.0);
        assert_eq!(adjustments.credit_excluded, 150_000.0);
        assert_eq!(adjustments.reduction_included, 350_000.0);
        assert_eq!(adjustments.credit_included, 250_000.0);
    }

    #[test]
    fn test_included_amount_may_be_negative() {
        let config = ProcessorConfig::default();
        let aggregator = FieldAggregator::new(&config);
        let reports = vec![Report {
            credit_breakdown: Some(RowList::new(vec![credit_row("281", 900_000.0)])),
            ..Report::named("세액공제명세서")
        }];
        let mut summary = aggregator.initialize_basic_data(&first_page(), 1).unwrap();

        aggregator.process_tax_credits_and_reductions(&reports, &mut summary);
        assert_eq!(summary.tax_adjustments.unwrap().credit_included, -500_000.0);
    }

    #[test]
    fn test_overlapping_tables_count_twice() {
        let config = ProcessorConfig::default().with_tax_codes(TaxCodeTable::new(
            CodeSet::from_codes(["300"]),
            CodeSet::from_codes(["300"]),
        ));
        let rows = vec![credit_row("300", 10_000.0)];

        assert_eq!(sum_by_code(&rows, &config.tax_codes.reduction), 10_000.0);
        assert_eq!(sum_by_code(&rows, &config.tax_codes.credit), 10_000.0);
    }
}
