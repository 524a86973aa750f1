//! Duplicate detection for (campaign, location, date) triples.
//!
//! The check is advisory: it reads before the caller writes, so two
//! concurrent submissions for the same triple can both pass.

use crate::error::{LogError, StoreError};
use crate::models::{LogDetails, LogEntry, Location};
use crate::services::store::LogStore;

/// Returns the first candidate, other than `exclude_id`, whose stored
/// location resolves to `location`.
pub fn first_duplicate<'a>(
    candidates: &'a [LogEntry],
    location: Location,
    exclude_id: Option<i64>,
) -> Option<&'a LogEntry> {
    candidates
        .iter()
        .filter(|candidate| Some(candidate.id) != exclude_id)
        .find(|candidate| candidate.canonical_location() == Some(location))
}

/// Looks for an existing entry with the same campaign, location and date.
///
/// A location that does not resolve to a known one cannot be verified and
/// is reported as having no duplicate.
pub async fn find_duplicate(
    store: &dyn LogStore,
    campaign_number: &str,
    location: &str,
    log_date: &str,
    exclude_id: Option<i64>,
) -> Result<Option<LogEntry>, StoreError> {
    let Some(location) = Location::canonicalize(location) else {
        return Ok(None);
    };

    let candidates = store
        .find_by_campaign_and_date(campaign_number, log_date)
        .await?;

    Ok(first_duplicate(&candidates, location, exclude_id).cloned())
}

/// Fails with [`LogError::Duplicate`] when `details` collides with a stored
/// entry other than `exclude_id`.
pub async fn ensure_unique(
    store: &dyn LogStore,
    details: &LogDetails,
    exclude_id: Option<i64>,
) -> Result<(), LogError> {
    let log_date = details.log_date_string();
    let existing = find_duplicate(
        store,
        &details.campaign_number,
        details.location.as_str(),
        &log_date,
        exclude_id,
    )
    .await?;

    match existing {
        Some(existing) => {
            tracing::info!(
                existing_id = existing.id,
                campaign_number = %details.campaign_number,
                location = %details.location,
                log_date = %log_date,
                "Duplicate log rejected"
            );
            Err(LogError::Duplicate {
                campaign_number: details.campaign_number.clone(),
                location: details.location.to_string(),
                log_date,
            })
        }
        None => Ok(()),
    }
}
