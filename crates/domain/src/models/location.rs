//! Location domain model.
//!
//! Sites are a fixed, ordered enumeration. Free-text location names coming
//! from forms, query strings or older records are resolved against it with
//! approximate matching.

use serde::{Deserialize, Serialize};
use shared::similarity::is_similar;

/// Minimum ratio for a free-text value to denote a known location.
pub const MATCH_THRESHOLD: f64 = 0.8;

/// Minimum ratio for two observed values to be treated as the same place.
pub const DEDUP_THRESHOLD: f64 = 0.85;

/// A campaign site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Location {
    #[serde(rename = "Great Yarmouth")]
    GreatYarmouth,
    Ipswich,
    Kingslynn,
    Peterborough,
    Cambridge,
    Chelmsford,
    Norwich,
    Colchester,
    Diss,
    #[serde(rename = "Clacton on Sea")]
    ClactonOnSea,
    Cromer,
    Halesworth,
}

impl Location {
    /// Every location, in enumeration order. Ties during matching resolve to
    /// the earliest entry.
    pub const ALL: [Location; 12] = [
        Location::GreatYarmouth,
        Location::Ipswich,
        Location::Kingslynn,
        Location::Peterborough,
        Location::Cambridge,
        Location::Chelmsford,
        Location::Norwich,
        Location::Colchester,
        Location::Diss,
        Location::ClactonOnSea,
        Location::Cromer,
        Location::Halesworth,
    ];

    /// Display name, as stored and shown in forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::GreatYarmouth => "Great Yarmouth",
            Location::Ipswich => "Ipswich",
            Location::Kingslynn => "Kingslynn",
            Location::Peterborough => "Peterborough",
            Location::Cambridge => "Cambridge",
            Location::Chelmsford => "Chelmsford",
            Location::Norwich => "Norwich",
            Location::Colchester => "Colchester",
            Location::Diss => "Diss",
            Location::ClactonOnSea => "Clacton on Sea",
            Location::Cromer => "Cromer",
            Location::Halesworth => "Halesworth",
        }
    }

    /// Exact lookup by display name, as submitted by a form select.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.as_str() == name)
    }

    /// Resolves free text to a known location.
    ///
    /// Returns the first location, in enumeration order, whose name matches
    /// at [`MATCH_THRESHOLD`]. Blank input never matches.
    pub fn canonicalize(input: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|l| is_similar(input, l.as_str(), MATCH_THRESHOLD))
    }

    /// Whether `input` resolves to this location.
    pub fn matches(&self, input: &str) -> bool {
        Self::canonicalize(input) == Some(*self)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// [`Location::canonicalize`] for optional input; `None` never matches.
pub fn canonical_location(input: Option<&str>) -> Option<Location> {
    input.and_then(Location::canonicalize)
}

/// Whether two free-text location names denote the same place.
pub fn locations_match(value: &str, other: &str, threshold: f64) -> bool {
    is_similar(value, other, threshold)
}

/// Distinct observed location names, sorted.
///
/// Values within [`DEDUP_THRESHOLD`] of an already kept value are folded into
/// it; the first spelling seen is the one kept.
pub fn unique_locations<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut unique: Vec<String> = Vec::new();
    for value in values {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        if !unique
            .iter()
            .any(|existing| locations_match(value, existing, DEDUP_THRESHOLD))
        {
            unique.push(value.to_string());
        }
    }
    unique.sort();
    unique
}
