//! Filtering, ordering and aggregation for the log listing.
//!
//! Everything here is pure: callers pass the entries and "today" in, which
//! keeps date-window behavior independent of the wall clock.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::models::location::{locations_match, unique_locations, Location, MATCH_THRESHOLD};
use crate::models::log_entry::{ListLogsQuery, LogEntryResponse};
use crate::models::{LogEntry, LogStatus};

/// Days covered by the default listing.
pub const DEFAULT_RECENT_DAYS: u32 = 8;

/// Optional predicates over log entries. Empty fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    /// Selected location names; an entry matches any of them.
    pub locations: Vec<String>,
    /// Selected campaign numbers; exact membership.
    pub campaigns: Vec<String>,
    pub log_date: Option<String>,
    pub status: Option<LogStatus>,
}

impl From<ListLogsQuery> for LogFilter {
    fn from(query: ListLogsQuery) -> Self {
        fn non_blank(values: Vec<String>) -> Vec<String> {
            values
                .into_iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect()
        }

        Self {
            locations: non_blank(query.location),
            campaigns: non_blank(query.campaign),
            log_date: query
                .log_date
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            status: query.abnormal.as_deref().and_then(LogStatus::parse_filter),
        }
    }
}

impl LogFilter {
    /// True when no predicate is active.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
            && self.campaigns.is_empty()
            && self.log_date.is_none()
            && self.status.is_none()
    }

    pub fn matches(&self, entry: &LogEntry) -> bool {
        if !self.locations.is_empty()
            && !self
                .locations
                .iter()
                .any(|selected| locations_match(&entry.location, selected, MATCH_THRESHOLD))
        {
            return false;
        }

        if !self.campaigns.is_empty()
            && !self
                .campaigns
                .iter()
                .any(|c| c == entry.campaign_number.trim())
        {
            return false;
        }

        if let Some(ref log_date) = self.log_date {
            if entry.log_date.trim() != log_date {
                return false;
            }
        }

        if let Some(status) = self.status {
            if entry.status() != status {
                return false;
            }
        }

        true
    }

    pub fn apply(&self, entries: Vec<LogEntry>) -> Vec<LogEntry> {
        entries.into_iter().filter(|e| self.matches(e)).collect()
    }
}

/// Inclusive date span of the trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecentWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: u32,
}

impl RecentWindow {
    /// The `days` days ending with `today`. A zero-day window is widened to
    /// today alone.
    pub fn ending(today: NaiveDate, days: u32) -> Self {
        let days = days.max(1);
        Self {
            start: today
                .checked_sub_signed(Duration::days(i64::from(days) - 1))
                .unwrap_or(NaiveDate::MIN),
            end: today,
            days,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Keeps entries dated within the window ending `today`.
///
/// Entries without a parsable date are dropped.
pub fn within_recent_window(entries: Vec<LogEntry>, today: NaiveDate, days: u32) -> Vec<LogEntry> {
    let window = RecentWindow::ending(today, days);
    entries
        .into_iter()
        .filter(|e| e.parsed_log_date().is_some_and(|d| window.contains(d)))
        .collect()
}

/// Monday and Saturday of the week containing `today`.
pub fn current_week(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
    (monday, monday + Duration::days(5))
}

/// Sum of terminal successes logged Monday through Saturday of this week.
///
/// Saturates at `i64::MAX` rather than overflowing.
pub fn weekly_success_total(entries: &[LogEntry], today: NaiveDate) -> i64 {
    let (monday, saturday) = current_week(today);
    entries
        .iter()
        .filter(|e| {
            e.parsed_log_date()
                .is_some_and(|d| monday <= d && d <= saturday)
        })
        .fold(0i64, |total, e| total.saturating_add(e.terminal_success))
}

/// Abnormal entries first, then oldest timestamp first.
pub fn sort_for_display(entries: &mut [LogEntry]) {
    entries.sort_by(|a, b| {
        b.abnormal
            .cmp(&a.abnormal)
            .then_with(|| a.timestamp.cmp(&b.timestamp))
    });
}

/// Locations with no log for a campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignGap {
    pub campaign_number: String,
    pub missing_locations: Vec<Location>,
}

/// For each campaign present, the known locations it has no entry for.
///
/// Every campaign is reported, in sorted order; a fully covered campaign
/// has an empty `missing_locations`. Missing locations keep enumeration
/// order.
pub fn campaign_gaps(entries: &[LogEntry]) -> Vec<CampaignGap> {
    let mut covered: BTreeMap<&str, BTreeSet<Location>> = BTreeMap::new();
    for entry in entries {
        let campaign = entry.campaign_number.trim();
        if campaign.is_empty() {
            continue;
        }
        let locations = covered.entry(campaign).or_default();
        if let Some(location) = entry.canonical_location() {
            locations.insert(location);
        }
    }

    covered
        .into_iter()
        .map(|(campaign, present)| CampaignGap {
            campaign_number: campaign.to_string(),
            missing_locations: Location::ALL
                .into_iter()
                .filter(|l| !present.contains(l))
                .collect(),
        })
        .collect()
}

/// Distinct non-blank campaign numbers, sorted.
pub fn unique_campaigns(entries: &[LogEntry]) -> Vec<String> {
    distinct_sorted(entries.iter().map(|e| e.campaign_number.trim()))
}

/// Distinct non-blank log dates, sorted.
pub fn unique_dates(entries: &[LogEntry]) -> Vec<String> {
    distinct_sorted(entries.iter().map(|e| e.log_date.trim()))
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// The computed listing view.
#[derive(Debug, Clone, PartialEq)]
pub struct LogListing {
    /// Entries to show, in display order.
    pub logs: Vec<LogEntry>,
    /// Location filter options, drawn from the entries before filtering.
    pub unique_locations: Vec<String>,
    pub unique_campaigns: Vec<String>,
    pub unique_dates: Vec<String>,
    pub weekly_success_total: i64,
    /// Only computed for the unfiltered view.
    pub campaign_gaps: Option<Vec<CampaignGap>>,
    /// Set when the listing was bounded to the recent window.
    pub recent_window: Option<RecentWindow>,
}

/// Builds the listing for `filter`.
///
/// With no active filter the listing is the recent window ending `today`
/// and includes the campaign gap report. With any filter active, the filter
/// runs over every entry and no gap report is produced.
pub fn build_listing(
    entries: Vec<LogEntry>,
    filter: &LogFilter,
    today: NaiveDate,
    recent_days: u32,
) -> LogListing {
    let unfiltered = filter.is_empty();

    let (base, recent_window) = if unfiltered {
        (
            within_recent_window(entries, today, recent_days),
            Some(RecentWindow::ending(today, recent_days)),
        )
    } else {
        (entries, None)
    };

    let unique_locations = unique_locations(base.iter().map(|e| e.location.as_str()));
    let mut logs = filter.apply(base);

    let campaign_gaps = unfiltered.then(|| campaign_gaps(&logs));
    let unique_campaigns = unique_campaigns(&logs);
    let unique_dates = unique_dates(&logs);
    let weekly_success_total = weekly_success_total(&logs, today);

    sort_for_display(&mut logs);

    LogListing {
        logs,
        unique_locations,
        unique_campaigns,
        unique_dates,
        weekly_success_total,
        campaign_gaps,
        recent_window,
    }
}

/// Response payload for the log listing.
#[derive(Debug, Clone, Serialize)]
pub struct ListLogsResponse {
    pub logs: Vec<LogEntryResponse>,
    pub total: usize,
    pub unique_locations: Vec<String>,
    pub unique_campaigns: Vec<String>,
    pub unique_dates: Vec<String>,
    pub weekly_success_total: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_gaps: Option<Vec<CampaignGap>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_window: Option<RecentWindow>,
}

impl From<LogListing> for ListLogsResponse {
    fn from(listing: LogListing) -> Self {
        let logs: Vec<LogEntryResponse> = listing.logs.into_iter().map(Into::into).collect();
        Self {
            total: logs.len(),
            logs,
            unique_locations: listing.unique_locations,
            unique_campaigns: listing.unique_campaigns,
            unique_dates: listing.unique_dates,
            weekly_success_total: listing.weekly_success_total,
            campaign_gaps: listing.campaign_gaps,
            recent_window: listing.recent_window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, hour, 0, 0).unwrap()
    }

    fn entry(id: i64, campaign: &str, location: &str, log_date: &str) -> LogEntry {
        LogEntry {
            id,
            location: location.to_string(),
            campaign_number: campaign.to_string(),
            log_date: log_date.to_string(),
            terminal_success: 10,
            abnormal: false,
            errors: String::new(),
            timestamp: at(9),
        }
    }

    // a Wednesday
    fn today() -> NaiveDate {
        date(2024, 6, 5)
    }

    // ===========================================
    // Filter Tests
    // ===========================================

    #[test]
    fn test_filter_from_query_drops_blanks() {
        let filter = LogFilter::from(ListLogsQuery {
            location: vec!["  ".to_string(), " Diss ".to_string()],
            campaign: vec![String::new()],
            log_date: Some(" ".to_string()),
            abnormal: Some("sometimes".to_string()),
        });
        assert_eq!(filter.locations, vec!["Diss".to_string()]);
        assert!(filter.campaigns.is_empty());
        assert_eq!(filter.log_date, None);
        assert_eq!(filter.status, None);
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = LogFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches(&entry(1, "C1", "Atlantis", "")));
    }

    #[test]
    fn test_location_filter_fuzzy_or_semantics() {
        let filter = LogFilter {
            locations: vec!["cambridge".to_string(), "Norwich".to_string()],
            ..Default::default()
        };
        assert!(filter.matches(&entry(1, "C1", "Cambrige", "2024-06-03")));
        assert!(filter.matches(&entry(2, "C1", "NORWICH ", "2024-06-03")));
        assert!(!filter.matches(&entry(3, "C1", "Diss", "2024-06-03")));
    }

    #[test]
    fn test_campaign_filter_exact_membership() {
        let filter = LogFilter {
            campaigns: vec!["C1".to_string(), "C3".to_string()],
            ..Default::default()
        };
        assert!(filter.matches(&entry(1, " C1", "Diss", "2024-06-03")));
        assert!(filter.matches(&entry(2, "C3", "Diss", "2024-06-03")));
        assert!(!filter.matches(&entry(3, "C2", "Diss", "2024-06-03")));
        assert!(!filter.matches(&entry(4, "c1", "Diss", "2024-06-03")));
    }

    #[test]
    fn test_date_and_status_filters() {
        let filter = LogFilter {
            log_date: Some("2024-06-03".to_string()),
            status: Some(LogStatus::Abnormal),
            ..Default::default()
        };
        let mut abnormal = entry(1, "C1", "Diss", "2024-06-03");
        abnormal.abnormal = true;
        assert!(filter.matches(&abnormal));
        assert!(!filter.matches(&entry(2, "C1", "Diss", "2024-06-03")));

        abnormal.log_date = "2024-06-04".to_string();
        assert!(!filter.matches(&abnormal));
    }

    // ===========================================
    // Recent Window Tests
    // ===========================================

    #[test]
    fn test_recent_window_bounds() {
        let entries = vec![
            entry(1, "C1", "Diss", "2024-06-05"),
            entry(2, "C1", "Diss", "2024-05-29"),
            entry(3, "C1", "Diss", "2024-05-28"),
        ];
        let kept = within_recent_window(entries, today(), 8);
        let ids: Vec<i64> = kept.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_recent_window_drops_future_and_unparsable() {
        let entries = vec![
            entry(1, "C1", "Diss", "2024-06-06"),
            entry(2, "C1", "Diss", ""),
            entry(3, "C1", "Diss", "05/06/2024"),
            entry(4, "C1", "Diss", " 2024-06-04 "),
        ];
        let kept = within_recent_window(entries, today(), 8);
        let ids: Vec<i64> = kept.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![4]);
    }

    #[test]
    fn test_recent_window_zero_days_is_today() {
        let window = RecentWindow::ending(today(), 0);
        assert_eq!(window.start, today());
        assert_eq!(window.end, today());
        assert_eq!(window.days, 1);
    }

    #[test]
    fn test_recent_window_huge_span_clamps_to_earliest_date() {
        let window = RecentWindow::ending(today(), u32::MAX);
        assert_eq!(window.start, NaiveDate::MIN);
        assert_eq!(window.end, today());
        assert!(window.contains(date(1970, 1, 1)));
    }

    // ===========================================
    // Weekly Aggregate Tests
    // ===========================================

    #[test]
    fn test_current_week() {
        let (monday, saturday) = current_week(today());
        assert_eq!(monday, date(2024, 6, 3));
        assert_eq!(saturday, date(2024, 6, 8));

        // Sunday belongs to the week that started six days earlier
        let (monday, saturday) = current_week(date(2024, 6, 9));
        assert_eq!(monday, date(2024, 6, 3));
        assert_eq!(saturday, date(2024, 6, 8));

        assert_eq!(current_week(date(2024, 6, 3)).0, date(2024, 6, 3));
    }

    #[test]
    fn test_weekly_total_monday_to_saturday() {
        let mut entries = vec![
            entry(1, "C1", "Diss", "2024-06-03"),
            entry(2, "C1", "Diss", "2024-06-08"),
            entry(3, "C1", "Diss", "2024-06-09"),
            entry(4, "C1", "Diss", "2024-06-02"),
            entry(5, "C1", "Diss", "not a date"),
        ];
        entries[0].terminal_success = 4;
        entries[1].terminal_success = 6;
        entries[2].terminal_success = 100;
        entries[3].terminal_success = 1000;

        // Sunday 2024-06-09 sits in the same trailing window but is excluded
        assert_eq!(weekly_success_total(&entries, date(2024, 6, 9)), 10);
        assert_eq!(weekly_success_total(&entries, today()), 10);
    }

    #[test]
    fn test_weekly_total_saturates_on_maximal_counts() {
        let mut entries = vec![
            entry(1, "C1", "Diss", "2024-06-03"),
            entry(2, "C1", "Cromer", "2024-06-04"),
        ];
        entries[0].terminal_success = i64::MAX;
        entries[1].terminal_success = i64::MAX;

        assert_eq!(weekly_success_total(&entries, today()), i64::MAX);

        let listing = build_listing(entries, &LogFilter::default(), today(), 8);
        assert_eq!(listing.weekly_success_total, i64::MAX);
    }

    // ===========================================
    // Ordering Tests
    // ===========================================

    #[test]
    fn test_sort_abnormal_first_then_timestamp() {
        let mut normal_nine = entry(1, "C1", "Diss", "2024-06-03");
        normal_nine.timestamp = at(9);
        let mut abnormal_ten = entry(2, "C1", "Diss", "2024-06-03");
        abnormal_ten.abnormal = true;
        abnormal_ten.timestamp = at(10);
        let mut abnormal_eight = entry(3, "C1", "Diss", "2024-06-03");
        abnormal_eight.abnormal = true;
        abnormal_eight.timestamp = at(8);

        let mut entries = vec![normal_nine, abnormal_ten, abnormal_eight];
        sort_for_display(&mut entries);

        let ids: Vec<i64> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    // ===========================================
    // Campaign Gap Tests
    // ===========================================

    #[test]
    fn test_campaign_gap_single_location() {
        let gaps = campaign_gaps(&[entry(1, "C2", "Norwich", "2024-06-03")]);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].campaign_number, "C2");
        assert_eq!(gaps[0].missing_locations.len(), 11);
        assert!(!gaps[0].missing_locations.contains(&Location::Norwich));
        assert_eq!(gaps[0].missing_locations[0], Location::GreatYarmouth);
    }

    #[test]
    fn test_campaign_gaps_sorted_and_canonicalized() {
        let mut entries: Vec<LogEntry> = Location::ALL
            .iter()
            .enumerate()
            .map(|(i, l)| entry(i as i64 + 1, "C9", &l.as_str().to_uppercase(), "2024-06-03"))
            .collect();
        entries.push(entry(50, "C3", "cambrige", "2024-06-03"));
        entries.push(entry(51, "C3", "Atlantis", "2024-06-03"));

        let gaps = campaign_gaps(&entries);
        assert_eq!(gaps.len(), 2);
        assert_eq!(gaps[0].campaign_number, "C3");
        assert_eq!(gaps[0].missing_locations.len(), 11);
        assert!(!gaps[0].missing_locations.contains(&Location::Cambridge));
        // C9 covers every location
        assert_eq!(gaps[1].campaign_number, "C9");
        assert!(gaps[1].missing_locations.is_empty());
    }

    #[test]
    fn test_campaign_gaps_order() {
        let gaps = campaign_gaps(&[
            entry(1, "B", "Diss", "2024-06-03"),
            entry(2, "A", "Diss", "2024-06-03"),
        ]);
        let campaigns: Vec<&str> = gaps.iter().map(|g| g.campaign_number.as_str()).collect();
        assert_eq!(campaigns, vec!["A", "B"]);
    }

    // ===========================================
    // Option Lists
    // ===========================================

    #[test]
    fn test_unique_campaigns_and_dates() {
        let entries = vec![
            entry(1, "C2", "Diss", "2024-06-04"),
            entry(2, "C1", "Diss", "2024-06-03"),
            entry(3, "C2", "Diss", "2024-06-03"),
            entry(4, "", "Diss", ""),
        ];
        assert_eq!(unique_campaigns(&entries), vec!["C1", "C2"]);
        assert_eq!(unique_dates(&entries), vec!["2024-06-03", "2024-06-04"]);
    }

    // ===========================================
    // Listing Tests
    // ===========================================

    #[test]
    fn test_unfiltered_listing_is_recent_window_with_gaps() {
        let mut abnormal = entry(2, "C1", "Cromer", "2024-06-04");
        abnormal.abnormal = true;
        let entries = vec![
            entry(1, "C1", "Diss", "2024-06-05"),
            abnormal,
            entry(3, "C0", "Diss", "2024-05-01"),
        ];

        let listing = build_listing(entries, &LogFilter::default(), today(), 8);

        let ids: Vec<i64> = listing.logs.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(listing.unique_locations, vec!["Cromer", "Diss"]);
        assert_eq!(listing.unique_campaigns, vec!["C1"]);
        assert_eq!(listing.weekly_success_total, 20);
        let gaps = listing.campaign_gaps.unwrap();
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].missing_locations.len(), 10);
        assert_eq!(
            listing.recent_window,
            Some(RecentWindow {
                start: date(2024, 5, 29),
                end: today(),
                days: 8
            })
        );
    }

    #[test]
    fn test_filtered_listing_spans_all_entries_without_gaps() {
        let entries = vec![
            entry(1, "C1", "Diss", "2024-06-05"),
            entry(2, "C0", "Diss", "2024-05-01"),
            entry(3, "C0", "Cromer", "2024-05-01"),
        ];
        let filter = LogFilter {
            campaigns: vec!["C0".to_string()],
            ..Default::default()
        };

        let listing = build_listing(entries, &filter, today(), 8);

        let ids: Vec<i64> = listing.logs.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(listing.unique_locations, vec!["Cromer", "Diss"]);
        assert_eq!(listing.unique_dates, vec!["2024-05-01"]);
        assert_eq!(listing.weekly_success_total, 0);
        assert!(listing.campaign_gaps.is_none());
        assert!(listing.recent_window.is_none());
    }

    #[test]
    fn test_list_response_from_listing() {
        let listing = build_listing(
            vec![entry(1, "C1", "Diss", "2024-06-05")],
            &LogFilter::default(),
            today(),
            8,
        );
        let response = ListLogsResponse::from(listing);
        assert_eq!(response.total, 1);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["logs"][0]["location"], "Diss");
        assert_eq!(json["campaign_gaps"][0]["campaign_number"], "C1");
        assert_eq!(json["recent_window"]["start"], "2024-05-29");
    }
}
