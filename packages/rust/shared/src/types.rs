//! Core domain types: the canonical entity, the search query, and the
//! response envelope.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::SubjektError;

// ---------------------------------------------------------------------------
// Sector
// ---------------------------------------------------------------------------

/// Industry sector of an entity. Always resolved; [`Sector::Other`] is the
/// fallback when no classifier signal fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sector {
    #[serde(rename = "IT")]
    It,
    Finance,
    Healthcare,
    Manufacturing,
    Retail,
    #[default]
    Other,
}

impl Sector {
    /// All sectors in result ordering priority.
    pub const PRIORITY: [Sector; 6] = [
        Sector::It,
        Sector::Finance,
        Sector::Healthcare,
        Sector::Manufacturing,
        Sector::Retail,
        Sector::Other,
    ];

    /// Position in [`Sector::PRIORITY`]; lower sorts first and wins ties.
    pub fn rank(self) -> usize {
        match self {
            Self::It => 0,
            Self::Finance => 1,
            Self::Healthcare => 2,
            Self::Manufacturing => 3,
            Self::Retail => 4,
            Self::Other => 5,
        }
    }

    /// Wire label (`"IT"`, `"Finance"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::It => "IT",
            Self::Finance => "Finance",
            Self::Healthcare => "Healthcare",
            Self::Manufacturing => "Manufacturing",
            Self::Retail => "Retail",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sector {
    type Err = SubjektError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Sector::PRIORITY
            .into_iter()
            .find(|sector| sector.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SubjektError::invalid_request(format!("unknown sector '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// Accepted employee-count labels.
pub const EMPLOYEE_BANDS: [&str; 3] = ["1-10", "11-50", "50+"];

/// Postal address fragment. Empty strings mean "unknown".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub city: String,
    pub street: String,
    /// Always `"XXX YY"` when non-empty.
    pub postal_code: String,
}

/// Contact channels. Empty strings mean "unknown".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub email: String,
    pub phone: String,
    pub website: String,
}

impl Contact {
    /// Fill empty fields from `other`, keeping values already present.
    pub fn fill_from(&mut self, other: Contact) {
        if self.email.is_empty() {
            self.email = other.email;
        }
        if self.phone.is_empty() {
            self.phone = other.phone;
        }
        if self.website.is_empty() {
            self.website = other.website;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_empty() && self.phone.is_empty() && self.website.is_empty()
    }
}

/// Canonical business record emitted by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Unique within one response: source-native identifier, else the name.
    pub id: String,
    /// Never empty.
    pub name: String,
    /// National business identifier (IČO); empty when the source lacks one.
    pub registry_id: String,
    pub location: Location,
    /// One of [`EMPLOYEE_BANDS`] or empty.
    pub employee_count_band: String,
    pub sector: Sector,
    pub contact: Contact,
    /// Platform name → profile URL.
    pub social_links: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Search query. All fields optional; blank strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub keyword: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "sector_or_none")]
    pub sector: Option<Sector>,
    #[serde(default, alias = "employeeCount", deserialize_with = "band_or_none")]
    pub employee_count_band: Option<String>,
}

impl Query {
    /// Trimmed keyword, if any.
    pub fn keyword(&self) -> Option<&str> {
        non_blank(self.keyword.as_deref())
    }

    /// Trimmed location, if any.
    pub fn location(&self) -> Option<&str> {
        non_blank(self.location.as_deref())
    }

    /// Employee band filter; `"all"` disables it.
    pub fn employee_band(&self) -> Option<&str> {
        non_blank(self.employee_count_band.as_deref()).filter(|b| !b.eq_ignore_ascii_case("all"))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn blank_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

/// `"all"` (any case) or one of [`EMPLOYEE_BANDS`].
fn band_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = blank_as_none(deserializer)? else {
        return Ok(None);
    };
    let band = raw.trim();
    if band.eq_ignore_ascii_case("all") || EMPLOYEE_BANDS.contains(&band) {
        Ok(Some(band.to_string()))
    } else {
        Err(serde::de::Error::custom(format!(
            "unknown employee band `{band}`, expected one of {} or all",
            EMPLOYEE_BANDS.join(", ")
        )))
    }
}

fn sector_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<Sector>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw
            .parse::<Sector>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// SearchResponse
// ---------------------------------------------------------------------------

/// `{data, error?}` envelope returned by `/search`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub data: Vec<Entity>,
    /// Human-readable advisory, or the failure message on error responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResponse {
    pub fn advisory(message: impl Into<String>) -> Self {
        Self {
            data: Vec::new(),
            error: Some(message.into()),
        }
    }
}
