//! Domain services for Campaign Logs.
//!
//! Services contain business logic that operates on domain models.

pub mod duplicate;
pub mod listing;
pub mod store;

pub use duplicate::{ensure_unique, find_duplicate};
pub use listing::{
    build_listing, campaign_gaps, sort_for_display, weekly_success_total, within_recent_window,
    CampaignGap, ListLogsResponse, LogFilter, LogListing, RecentWindow, DEFAULT_RECENT_DAYS,
};
pub use store::{InMemoryLogStore, LogStore};
