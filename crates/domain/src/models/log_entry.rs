//! Log entry domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::validation::{
    is_checked, parse_log_date, parse_success_count, validate_not_blank, LOG_DATE_FORMAT,
};
use validator::{Validate, ValidationError};

use crate::error::LogError;
use crate::models::location::{canonical_location, Location};

/// A stored campaign log for a single location on a single date.
///
/// `location` and `log_date` are kept as text: records written before the
/// location list was enforced may hold free-text names or malformed dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: i64,
    pub location: String,
    pub campaign_number: String,
    pub log_date: String,
    pub terminal_success: i64,
    pub abnormal: bool,
    pub errors: String,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    /// The log date, if it is a valid ISO date.
    pub fn parsed_log_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.log_date.trim(), LOG_DATE_FORMAT).ok()
    }

    /// The known location the stored name resolves to.
    pub fn canonical_location(&self) -> Option<Location> {
        canonical_location(Some(&self.location))
    }

    pub fn status(&self) -> LogStatus {
        if self.abnormal {
            LogStatus::Abnormal
        } else {
            LogStatus::Normal
        }
    }
}

/// Outcome status of a log. Exactly one holds for every entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Normal,
    Abnormal,
}

impl LogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogStatus::Normal => "normal",
            LogStatus::Abnormal => "abnormal",
        }
    }

    /// Parses the listing filter value; anything else is no filter.
    pub fn parse_filter(s: &str) -> Option<Self> {
        match s.trim() {
            "normal" => Some(LogStatus::Normal),
            "abnormal" => Some(LogStatus::Abnormal),
            _ => None,
        }
    }

    pub fn is_abnormal(&self) -> bool {
        matches!(self, LogStatus::Abnormal)
    }
}

/// Validated content of one log, ready to be stored under an id.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct LogDetails {
    pub location: Location,

    #[validate(length(min = 1, message = "Campaign Number is required"))]
    pub campaign_number: String,

    pub log_date: NaiveDate,

    #[validate(range(
        min = 0,
        max = 1_000_000_000,
        message = "Terminal success count must be between 0 and 1000000000"
    ))]
    pub terminal_success: i64,

    pub abnormal: bool,

    pub errors: String,
}

impl LogDetails {
    /// ISO form of the log date, as stored.
    pub fn log_date_string(&self) -> String {
        self.log_date.format(LOG_DATE_FORMAT).to_string()
    }

    /// Builds the stored record. Replaces every field of an existing entry.
    pub fn into_entry(self, id: i64, timestamp: DateTime<Utc>) -> LogEntry {
        let log_date = self.log_date_string();
        LogEntry {
            id,
            location: self.location.as_str().to_string(),
            campaign_number: self.campaign_number,
            log_date,
            terminal_success: self.terminal_success,
            abnormal: self.abnormal,
            errors: self.errors,
            timestamp,
        }
    }
}

/// Form payload for submitting logs for one or more locations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitLogForm {
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub campaign_number: String,
    #[serde(default)]
    pub errors: String,
    pub terminal_success: Option<String>,
    pub log_date: Option<String>,
    pub status_normal: Option<String>,
    pub status_abnormal: Option<String>,
}

impl SubmitLogForm {
    /// Validates the submission into one [`LogDetails`] per selected location.
    ///
    /// Selections that are not known location names are ignored; repeated
    /// selections collapse to one. At least one known location must remain.
    pub fn into_details(self) -> Result<Vec<LogDetails>, LogError> {
        let mut problems = Vec::new();

        let mut locations: Vec<Location> = Vec::new();
        for name in &self.locations {
            match Location::from_name(name.trim()) {
                Some(location) if !locations.contains(&location) => locations.push(location),
                Some(_) => {}
                None => tracing::warn!(location = %name, "Ignoring unknown location selection"),
            }
        }
        if locations.is_empty() {
            problems.push("locations: Select at least one valid location".to_string());
        }

        let fields = CommonFields::parse(
            &mut problems,
            &self.campaign_number,
            &self.errors,
            self.terminal_success.as_deref(),
            self.log_date.as_deref(),
            self.status_normal.as_deref(),
            self.status_abnormal.as_deref(),
        );

        match fields {
            Some(fields) if problems.is_empty() => locations
                .into_iter()
                .map(|location| fields.clone().with_location(location))
                .collect(),
            _ => Err(LogError::Validation(problems.join(", "))),
        }
    }
}

/// Form payload for replacing a single log.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLogForm {
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub campaign_number: String,
    #[serde(default)]
    pub errors: String,
    pub terminal_success: Option<String>,
    pub log_date: Option<String>,
    pub status_normal: Option<String>,
    pub status_abnormal: Option<String>,
}

impl UpdateLogForm {
    /// Validates the replacement content. The location must be a known name.
    pub fn into_details(self) -> Result<LogDetails, LogError> {
        let mut problems = Vec::new();

        let location = Location::from_name(self.location.trim());
        if location.is_none() {
            problems.push("location: Select a valid location".to_string());
        }

        let fields = CommonFields::parse(
            &mut problems,
            &self.campaign_number,
            &self.errors,
            self.terminal_success.as_deref(),
            self.log_date.as_deref(),
            self.status_normal.as_deref(),
            self.status_abnormal.as_deref(),
        );

        match (location, fields) {
            (Some(location), Some(fields)) if problems.is_empty() => {
                fields.with_location(location)
            }
            _ => Err(LogError::Validation(problems.join(", "))),
        }
    }
}

/// Fields shared by the submit and edit forms.
#[derive(Debug, Clone)]
struct CommonFields {
    campaign_number: String,
    errors: String,
    terminal_success: i64,
    log_date: NaiveDate,
    abnormal: bool,
}

impl CommonFields {
    fn parse(
        problems: &mut Vec<String>,
        campaign_number: &str,
        errors: &str,
        terminal_success: Option<&str>,
        log_date: Option<&str>,
        status_normal: Option<&str>,
        status_abnormal: Option<&str>,
    ) -> Option<Self> {
        let campaign = record(
            problems,
            "campaign_number",
            validate_not_blank(campaign_number),
        );
        let count = record(
            problems,
            "terminal_success",
            parse_success_count(terminal_success.unwrap_or_default()),
        );
        let date = record(
            problems,
            "log_date",
            parse_log_date(log_date.unwrap_or_default()),
        );
        let abnormal = record(
            problems,
            "status",
            resolve_status(status_normal, status_abnormal),
        );

        campaign?;
        Some(Self {
            campaign_number: campaign_number.trim().to_string(),
            errors: errors.trim().to_string(),
            terminal_success: count?,
            log_date: date?,
            abnormal: abnormal?.is_abnormal(),
        })
    }

    fn with_location(self, location: Location) -> Result<LogDetails, LogError> {
        let details = LogDetails {
            location,
            campaign_number: self.campaign_number,
            log_date: self.log_date,
            terminal_success: self.terminal_success,
            abnormal: self.abnormal,
            errors: self.errors,
        };
        details.validate()?;
        Ok(details)
    }
}

/// Resolves the two mutually exclusive status checkboxes.
fn resolve_status(
    status_normal: Option<&str>,
    status_abnormal: Option<&str>,
) -> Result<LogStatus, ValidationError> {
    match (is_checked(status_normal), is_checked(status_abnormal)) {
        (true, false) => Ok(LogStatus::Normal),
        (false, true) => Ok(LogStatus::Abnormal),
        (true, true) => {
            let mut err = ValidationError::new("status_ambiguous");
            err.message = Some("Select either Normal or Abnormal, not both".into());
            Err(err)
        }
        (false, false) => {
            let mut err = ValidationError::new("status_missing");
            err.message = Some("Select Normal or Abnormal".into());
            Err(err)
        }
    }
}

fn record<T>(
    problems: &mut Vec<String>,
    field: &str,
    result: Result<T, ValidationError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            let message = err
                .message
                .map(|m| m.to_string())
                .unwrap_or_else(|| err.code.to_string());
            problems.push(format!("{}: {}", field, message));
            None
        }
    }
}

/// Query parameters for the log listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListLogsQuery {
    #[serde(default)]
    pub location: Vec<String>,
    #[serde(default)]
    pub campaign: Vec<String>,
    pub log_date: Option<String>,
    pub abnormal: Option<String>,
}

/// Response payload for a single log.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntryResponse {
    pub id: i64,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_location: Option<Location>,
    pub campaign_number: String,
    pub log_date: String,
    pub terminal_success: i64,
    pub abnormal: bool,
    pub status: LogStatus,
    pub errors: String,
    pub timestamp: DateTime<Utc>,
}

impl From<LogEntry> for LogEntryResponse {
    fn from(entry: LogEntry) -> Self {
        Self {
            canonical_location: entry.canonical_location(),
            status: entry.status(),
            id: entry.id,
            location: entry.location,
            campaign_number: entry.campaign_number,
            log_date: entry.log_date,
            terminal_success: entry.terminal_success,
            abnormal: entry.abnormal,
            errors: entry.errors,
            timestamp: entry.timestamp,
        }
    }
}

/// Response payload for create and update.
#[derive(Debug, Clone, Serialize)]
pub struct LogMutationResponse {
    pub message: String,
    pub logs: Vec<LogEntryResponse>,
}

/// Response payload for delete.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteLogResponse {
    pub message: String,
    pub id: i64,
}
