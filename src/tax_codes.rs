use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder reduction entry codes used when no table is configured.
/// Deployments are expected to supply the real table through `ProcessorConfig.tax_codes`.
pub const DEFAULT_REDUCTION_CODES: &[&str] = &["211", "212", "213", "214", "215", "216"];

/// Placeholder credit entry codes used when no table is configured.
/// Deployments are expected to supply the real table through `ProcessorConfig.tax_codes`.
pub const DEFAULT_CREDIT_CODES: &[&str] = &["281", "282", "283", "284", "291", "292"];

/// Membership table mapping an entry code to whether it belongs to the set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct CodeSet(BTreeMap<String, bool>);

impl CodeSet {
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(codes.into_iter().map(|code| (code.into(), true)).collect())
    }

    /// A code is a member only if it is mapped to `true`.
    pub fn contains(&self, code: &str) -> bool {
        self.0.get(code).copied().unwrap_or(false)
    }

    pub fn insert(&mut self, code: impl Into<String>, member: bool) {
        self.0.insert(code.into(), member);
    }

    pub fn is_empty(&self) -> bool {
        !self.0.values().any(|member| *member)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, member)| **member)
            .map(|(code, _)| code.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TaxCodeTable {
    #[schemars(description = "Entry codes classified as tax reductions excluded from the first-page total")]
    #[serde(default = "default_reduction")]
    pub reduction: CodeSet,

    #[schemars(description = "Entry codes classified as tax credits excluded from the first-page total")]
    #[serde(default = "default_credit")]
    pub credit: CodeSet,
}

fn default_reduction() -> CodeSet {
    CodeSet::from_codes(DEFAULT_REDUCTION_CODES.iter().copied())
}

fn default_credit() -> CodeSet {
    CodeSet::from_codes(DEFAULT_CREDIT_CODES.iter().copied())
}

impl Default for TaxCodeTable {
    fn default() -> Self {
        Self {
            reduction: default_reduction(),
            credit: default_credit(),
        }
    }
}

impl TaxCodeTable {
    pub fn new(reduction: CodeSet, credit: CodeSet) -> Self {
        Self { reduction, credit }
    }

    /// Codes present in both tables. Rows with these codes count towards both excluded sums.
    pub fn overlapping_codes(&self) -> Vec<String> {
        self.reduction
            .codes()
            .filter(|code| self.credit.contains(code))
            .map(str::to_string)
            .collect()
    }
}
