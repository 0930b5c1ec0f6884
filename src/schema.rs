use crate::utils::parse_filing_period_start;
use chrono::NaiveDate;
use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const PAYMENT_COMPUTATION_LABEL: &str = "납부계산서";
pub const BUSINESS_INCOME_STATEMENT_LABEL: &str = "사업소득명세서";
pub const COMPREHENSIVE_INCOME_LABEL: &str = "종합소득금액및결손금이월결손금공제명세서";
pub const INCOME_DEDUCTION_LABEL: &str = "소득공제명세서";
pub const TAX_CREDIT_LABEL: &str = "세액공제명세서";

/// The sub-reports this crate knows how to locate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// First page of the filing result; carries the overview and tax computation payloads.
    PaymentComputation,
    BusinessIncomeStatement,
    /// Comprehensive income amount and loss carryforward deduction statement.
    ComprehensiveIncome,
    IncomeDeduction,
    TaxCredit,
}

impl ReportKind {
    pub const ALL: [ReportKind; 5] = [
        ReportKind::PaymentComputation,
        ReportKind::BusinessIncomeStatement,
        ReportKind::ComprehensiveIncome,
        ReportKind::IncomeDeduction,
        ReportKind::TaxCredit,
    ];

    /// Canonical name fragment used by the external source for this report.
    pub fn label(&self) -> &'static str {
        match self {
            ReportKind::PaymentComputation => PAYMENT_COMPUTATION_LABEL,
            ReportKind::BusinessIncomeStatement => BUSINESS_INCOME_STATEMENT_LABEL,
            ReportKind::ComprehensiveIncome => COMPREHENSIVE_INCOME_LABEL,
            ReportKind::IncomeDeduction => INCOME_DEDUCTION_LABEL,
            ReportKind::TaxCredit => TAX_CREDIT_LABEL,
        }
    }
}

/// A monetary amount, already coerced to a number at the ingestion boundary.
///
/// Deserializes from either a JSON number or a numeric string. Strings are
/// trimmed and an empty string is zero; no currency or grouping characters
/// are stripped.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(try_from = "RawAmount")]
pub struct Amount(pub f64);

impl Amount {
    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn parse(text: &str) -> Result<Self, String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Amount(0.0));
        }

        trimmed
            .parse::<f64>()
            .map(Amount)
            .map_err(|_| format!("Invalid amount '{}': expected a number", text))
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Amount(value)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

impl JsonSchema for Amount {
    fn schema_name() -> String {
        "Amount".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        RawAmount::json_schema(gen)
    }
}

/// An amount exactly as the source sends it.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
}

impl TryFrom<RawAmount> for Amount {
    type Error = String;

    fn try_from(raw: RawAmount) -> Result<Self, Self::Error> {
        match raw {
            RawAmount::Number(value) => Ok(Amount(value)),
            RawAmount::Text(text) => Amount::parse(&text),
        }
    }
}

/// Like `Amount`, but a value the source uses to mean "no amount" becomes `None`:
/// null, the empty string, or the number zero. A blank but non-empty string
/// still counts as an amount of zero.
fn deserialize_optional_amount<'de, D>(deserializer: D) -> Result<Option<Amount>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawAmount>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawAmount::Text(text)) if text.is_empty() => Ok(None),
        Some(RawAmount::Number(value)) if value == 0.0 => Ok(None),
        Some(raw) => Amount::try_from(raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Filing overview payload of the first page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FilingOverview {
    /// Bookkeeping duty classification code.
    #[serde(rename = "bkpDutyClCd")]
    pub bookkeeping_duty_code: String,

    /// Income tax return type code.
    #[serde(rename = "inctxRtnTypeCd")]
    pub filing_type_code: String,

    /// Total (aggregate) income amount.
    #[serde(rename = "agiAmt")]
    pub total_income: Amount,
}

/// Tax computation payload of the first page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TaxComputation {
    /// Filing period start date, `YYYYMMDD`.
    #[serde(rename = "txnrmStrtDt")]
    pub filing_period_start_date: String,

    #[serde(rename = "stasAmt")]
    pub taxation_standard: Amount,

    #[serde(rename = "cmptTxamt")]
    pub calculated_tax: Amount,

    #[serde(rename = "reTxamt")]
    pub tax_reduction: Amount,

    #[serde(rename = "ddcTxamt")]
    pub tax_credit: Amount,

    #[serde(rename = "dcsTxamt")]
    pub determined_tax: Amount,

    #[serde(rename = "ppmTxamt")]
    pub pre_paid_tax: Amount,
}

impl TaxComputation {
    pub fn filing_period_start(&self) -> Option<NaiveDate> {
        parse_filing_period_start(&self.filing_period_start_date)
    }
}

/// A nested list payload. The source may send the wrapper without its rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RowList<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<T>>,
}

impl<T> RowList<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self { rows: Some(rows) }
    }
}

/// Row of the comprehensive income statement, keyed by income classification code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IncomeRow {
    #[serde(rename = "incClCd")]
    pub classification_code: String,

    #[serde(
        rename = "incAmt",
        default,
        deserialize_with = "deserialize_optional_amount",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<Amount>")]
    pub amount: Option<Amount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DeductionItem {
    #[serde(rename = "Amount")]
    pub amount: Amount,
}

/// Row of the tax credit breakdown, keyed by entry code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CreditRow {
    #[serde(rename = "ereCd")]
    pub entry_code: String,

    #[serde(rename = "ereAmt")]
    pub amount: Amount,
}

/// One named section of a filing result. Only the payload matching the
/// report's kind is populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Report {
    #[serde(rename = "ReportName", default, skip_serializing_if = "Option::is_none")]
    pub report_name: Option<String>,

    #[serde(rename = "ttirndm001DVO", default, skip_serializing_if = "Option::is_none")]
    pub filing_overview: Option<FilingOverview>,

    #[serde(rename = "ttirnam101DVO", default, skip_serializing_if = "Option::is_none")]
    pub tax_computation: Option<TaxComputation>,

    #[serde(rename = "ttirndl012DVOList", default, skip_serializing_if = "Option::is_none")]
    pub income_breakdown: Option<RowList<IncomeRow>>,

    #[serde(rename = "Items", default, skip_serializing_if = "Option::is_none")]
    pub deduction_items: Option<Vec<DeductionItem>>,

    #[serde(
        rename = "txamtDdcReSpecBrkdDVOList",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub credit_breakdown: Option<RowList<CreditRow>>,
}

impl Report {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            report_name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.report_name.as_deref()
    }

    pub fn income_rows(&self) -> Option<&[IncomeRow]> {
        self.income_breakdown.as_ref()?.rows.as_deref()
    }

    pub fn credit_rows(&self) -> Option<&[CreditRow]> {
        self.credit_breakdown.as_ref()?.rows.as_deref()
    }

    pub fn deduction_items(&self) -> Option<&[DeductionItem]> {
        self.deduction_items.as_deref()
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(Vec<Report>)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
