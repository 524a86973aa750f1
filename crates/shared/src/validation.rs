//! Common validation utilities for submitted form fields.

use chrono::NaiveDate;
use validator::ValidationError;

/// Wire format of log dates.
pub const LOG_DATE_FORMAT: &str = "%Y-%m-%d";

/// Largest accepted terminal success count.
pub const MAX_SUCCESS_COUNT: i64 = 1_000_000_000;

/// Checkbox values treated as "checked".
const CHECKED_VALUES: [&str; 4] = ["on", "true", "1", "yes"];

/// Validates that a text field is not blank after trimming.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Parses an ISO `YYYY-MM-DD` date.
pub fn parse_log_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        let mut err = ValidationError::new("log_date_missing");
        err.message = Some("Log date is required".into());
        return Err(err);
    }

    NaiveDate::parse_from_str(value, LOG_DATE_FORMAT).map_err(|_| {
        let mut err = ValidationError::new("log_date_format");
        err.message = Some("Log date must be formatted as YYYY-MM-DD".into());
        err
    })
}

/// Parses an integer count in `0..=MAX_SUCCESS_COUNT`.
pub fn parse_success_count(value: &str) -> Result<i64, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        let mut err = ValidationError::new("terminal_success_missing");
        err.message = Some("Terminal success count is required".into());
        return Err(err);
    }

    match value.parse::<i64>() {
        Ok(count) if (0..=MAX_SUCCESS_COUNT).contains(&count) => Ok(count),
        Ok(count) if count > MAX_SUCCESS_COUNT => {
            let mut err = ValidationError::new("terminal_success_range");
            err.message = Some("Terminal success count is too large".into());
            Err(err)
        }
        Ok(_) => {
            let mut err = ValidationError::new("terminal_success_range");
            err.message = Some("Terminal success count must be non-negative".into());
            Err(err)
        }
        Err(_) => {
            let mut err = ValidationError::new("terminal_success_integer");
            err.message = Some("Terminal success count must be a whole number".into());
            Err(err)
        }
    }
}

/// Interprets an HTML checkbox value. Absent fields are unchecked.
pub fn is_checked(value: Option<&str>) -> bool {
    value
        .map(|v| {
            let v = v.trim();
            CHECKED_VALUES.iter().any(|c| v.eq_ignore_ascii_case(c))
        })
        .unwrap_or(false)
}
