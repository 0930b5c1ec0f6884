use crate::error::Result;
use crate::tax_codes::TaxCodeTable;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BUSINESS_INCOME_CODE: &str = "40";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProcessorConfig {
    #[schemars(description = "Code tables used to partition tax credit breakdown rows")]
    #[serde(default)]
    pub tax_codes: TaxCodeTable,

    #[schemars(description = "Income classification code of business income rows. Defaults to \"40\".")]
    #[serde(default = "default_business_income_code")]
    pub business_income_code: String,
}

fn default_business_income_code() -> String {
    DEFAULT_BUSINESS_INCOME_CODE.to_string()
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            tax_codes: TaxCodeTable::default(),
            business_income_code: default_business_income_code(),
        }
    }
}

impl ProcessorConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn with_tax_codes(mut self, tax_codes: TaxCodeTable) -> Self {
        self.tax_codes = tax_codes;
        self
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = schemars::schema_for!(ProcessorConfig);
        serde_json::to_string_pretty(&schema)
    }
}
