use crate::error::{FilingError, Result};
use chrono::NaiveDate;

/// Extracts the filing year from the first four characters of a `YYYYMMDD` date.
pub fn parse_filing_year(filing_period_start_date: &str) -> Result<i32> {
    let year_str = filing_period_start_date.get(..4).ok_or_else(|| {
        FilingError::Processing(format!(
            "Invalid filing period start date '{}': expected YYYYMMDD",
            filing_period_start_date
        ))
    })?;

    year_str.parse::<i32>().map_err(|_| {
        FilingError::Processing(format!(
            "Invalid filing year '{}' in filing period start date '{}'",
            year_str, filing_period_start_date
        ))
    })
}

/// Ordinal position of a filing year relative to the caller's baseline.
/// Values <= 0 denote the base year.
pub fn year_index(filing_year: i32, start_year: i32) -> Result<i32> {
    filing_year
        .checked_sub(start_year)
        .and_then(|offset| offset.checked_add(1))
        .ok_or_else(|| {
            FilingError::Processing(format!(
                "Year index out of range for filing year {} and start year {}",
                filing_year, start_year
            ))
        })
}

pub fn is_base_year(year_index: i32) -> bool {
    year_index <= 0
}

/// Parses the full `YYYYMMDD` start date, if the source sent one.
pub fn parse_filing_period_start(filing_period_start_date: &str) -> Option<NaiveDate> {
    let date = filing_period_start_date.get(..8)?;
    NaiveDate::parse_from_str(date, "%Y%m%d").ok()
}
