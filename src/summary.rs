use crate::error::{Result, ValidationError};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Fields read off the first page. Present for every year index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BasicFields {
    pub account_duty: String,
    pub filing_type: String,
    pub total_income: f64,
    pub taxation_standard: f64,
    pub calculated_tax: f64,
    pub tax_reduction: f64,
    pub tax_credit: f64,
    pub determined_tax: f64,
    /// Not derived yet; always zero.
    pub additional_tax: f64,
    pub pre_paid_tax: f64,
    /// Not derived yet; always zero.
    pub paid_agricultural_tax: f64,
}

/// Split of the first-page reduction and credit totals into the portions
/// explicitly classified by entry code (excluded) and the remainder (included).
///
/// Included amounts may be negative when the breakdown exceeds the total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TaxAdjustments {
    pub reduction_excluded: f64,
    pub credit_excluded: f64,
    pub reduction_included: f64,
    pub credit_included: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FilingSummary {
    pub year_index: i32,
    pub filing_year: i32,
    pub filing_period_start: Option<NaiveDate>,
    pub basic: BasicFields,
    pub business_income: Option<f64>,
    pub income_deduction: Option<f64>,
    pub tax_adjustments: Option<TaxAdjustments>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Code(String),
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Code(value.to_string())
    }
}

/// Flat `<field>_year<N>` record consumed by downstream renderers.
pub type ResultRecord = BTreeMap<String, FieldValue>;

impl FilingSummary {
    pub fn is_base_year(&self) -> bool {
        crate::utils::is_base_year(self.year_index)
    }

    pub fn to_keyed_fields(&self) -> ResultRecord {
        let mut record = ResultRecord::new();
        self.write_keyed_fields(&mut record);
        record
    }

    fn write_keyed_fields(&self, record: &mut ResultRecord) {
        let year = self.year_index;
        let mut put = |name: &str, value: FieldValue| {
            record.insert(format!("{}_year{}", name, year), value);
        };

        let basic = &self.basic;
        put("account_duty", basic.account_duty.as_str().into());
        // Downstream consumers expect this spelling.
        put("filling_type", basic.filing_type.as_str().into());
        put("total_income", basic.total_income.into());
        put("taxation_standard", basic.taxation_standard.into());
        put("calculated_tax", basic.calculated_tax.into());
        put("tax_reduction", basic.tax_reduction.into());
        put("tax_credit", basic.tax_credit.into());
        put("determined_tax", basic.determined_tax.into());
        put("additional_tax", basic.additional_tax.into());
        put("pre_paid_tax", basic.pre_paid_tax.into());
        put("paid_agricultural_tax", basic.paid_agricultural_tax.into());

        if let Some(business_income) = self.business_income {
            put("business_income", business_income.into());
        }

        if let Some(income_deduction) = self.income_deduction {
            put("income_deduction", income_deduction.into());
        }

        if let Some(adjustments) = &self.tax_adjustments {
            put("tax_reduction_excluded", adjustments.reduction_excluded.into());
            put("tax_credit_excluded", adjustments.credit_excluded.into());
            put("tax_reduction_included", adjustments.reduction_included.into());
            put("tax_credit_included", adjustments.credit_included.into());
        }
    }
}

/// Summaries of several filings for the same taxpayer, keyed by year index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FilingHistory {
    summaries: BTreeMap<i32, FilingSummary>,
}

impl FilingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a summary, returning the one it replaced for the same year index.
    pub fn record(&mut self, summary: FilingSummary) -> Option<FilingSummary> {
        match self.summaries.entry(summary.year_index) {
            Entry::Occupied(mut entry) => Some(entry.insert(summary)),
            Entry::Vacant(entry) => {
                entry.insert(summary);
                None
            }
        }
    }

    pub fn get(&self, year_index: i32) -> Option<&FilingSummary> {
        self.summaries.get(&year_index)
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilingSummary> {
        self.summaries.values()
    }

    pub fn year_indices(&self) -> Vec<i32> {
        self.summaries.keys().copied().collect()
    }

    pub fn to_keyed_fields(&self) -> ResultRecord {
        let mut record = ResultRecord::new();
        for summary in self.summaries.values() {
            summary.write_keyed_fields(&mut record);
        }
        record
    }
}

/// Wire form of one pipeline run. Exactly one of `data` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FilingOutcome {
    pub data: Option<ResultRecord>,
    pub error: Option<ValidationError>,
}

impl FilingOutcome {
    pub fn is_success(&self) -> bool {
        self.data.is_some()
    }
}

impl From<Result<FilingSummary>> for FilingOutcome {
    fn from(result: Result<FilingSummary>) -> Self {
        match result {
            Ok(summary) => Self {
                data: Some(summary.to_keyed_fields()),
                error: None,
            },
            Err(error) => Self {
                data: None,
                error: Some(error.into()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorCode, FilingError};

    fn summary(year_index: i32) -> FilingSummary {
        FilingSummary {
            year_index,
            filing_year: 2022 + year_index,
            filing_period_start: None,
            basic: BasicFields {
                account_duty: "01".to_string(),
                filing_type: "10".to_string(),
                total_income: 50_000_000.0,
                taxation_standard: 42_000_000.0,
                calculated_tax: 5_040_000.0,
                tax_reduction: 300_000.0,
                tax_credit: 200_000.0,
                determined_tax: 4_540_000.0,
                additional_tax: 0.0,
                pre_paid_tax: 1_000_000.0,
                paid_agricultural_tax: 0.0,
            },
            business_income: None,
            income_deduction: None,
            tax_adjustments: None,
        }
    }

    #[test]
    fn test_base_year_keys() {
        let record = summary(0).to_keyed_fields();
        assert_eq!(record.len(), 11);
        assert!(record.keys().all(|key| key.ends_with("_year0")));
        assert_eq!(
            record.get("account_duty_year0"),
            Some(&FieldValue::Code("01".to_string()))
        );
        assert_eq!(
            record.get("total_income_year0"),
            Some(&FieldValue::Number(50_000_000.0))
        );
    }

    #[test]
    fn test_extended_keys() {
        let mut s = summary(2);
        s.business_income = Some(30_000_000.0);
        s.income_deduction = Some(1_500_000.0);
        s.tax_adjustments = Some(TaxAdjustments {
            reduction_excluded: 100_000.0,
            credit_excluded: 250_000.0,
            reduction_included: 200_000.0,
            credit_included: -50_000.0,
        });

        let record = s.to_keyed_fields();
        assert_eq!(record.len(), 17);
        assert_eq!(
            record.get("tax_credit_included_year2"),
            Some(&FieldValue::Number(-50_000.0))
        );
        assert!(record.contains_key("business_income_year2"));
        assert!(record.contains_key("income_deduction_year2"));
    }

    #[test]
    fn test_history_merges_years() {
        let mut history = FilingHistory::new();
        assert!(history.record(summary(1)).is_none());
        assert!(history.record(summary(2)).is_none());
        assert!(history.record(summary(1)).is_some());

        assert_eq!(history.year_indices(), vec![1, 2]);
        let record = history.to_keyed_fields();
        assert!(record.contains_key("total_income_year1"));
        assert!(record.contains_key("total_income_year2"));
        assert_eq!(record.len(), 22);
    }

    #[test]
    fn test_outcome_has_exactly_one_side() {
        let ok: FilingOutcome = Ok(summary(1)).into();
        assert!(ok.data.is_some() && ok.error.is_none());

        let err: FilingOutcome = Err(FilingError::MissingReport {
            report: "납부계산서".to_string(),
        })
        .into();
        assert!(err.data.is_none());
        assert_eq!(err.error.unwrap().code, ErrorCode::MissingReport);
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome: FilingOutcome = Ok(summary(0)).into();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["error"], serde_json::Value::Null);
        assert_eq!(json["data"]["filling_type_year0"], "10");
        assert_eq!(json["data"]["additional_tax_year0"], 0.0);
    }
}
