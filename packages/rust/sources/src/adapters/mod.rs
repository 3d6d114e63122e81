//! Source adapter traits and the candidate records they emit.
//!
//! Every upstream (registry API, HTML directory, sample dataset) sits behind
//! [`SourceAdapter`]; raw upstream shapes never leave the adapter. Adapters
//! hand back [`Candidate`]s: a normalized entity plus the signal the
//! dispatcher uses to resolve its sector.

mod contact;
mod directory;
mod jsonld;
mod mock;
mod registry;

use async_trait::async_trait;
use subjekt_shared::{Contact, Entity, Query, Result, Sector};

use crate::normalize::is_registry_id;

pub use contact::{ContactScraper, extract_contact};
pub use directory::DirectoryAdapter;
pub use jsonld::{BusinessRecord, extract_businesses};
pub use mock::MockAdapter;
pub use registry::{RegistryAdapter, SEARCH_UNAVAILABLE};

// ---------------------------------------------------------------------------
// Candidate
// ---------------------------------------------------------------------------

/// Evidence for the sector classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectorSignal {
    /// Free text (name + description), scored by keyword.
    Text(String),
    /// Industry classification codes (CZ-NACE), scored by weighted prefix.
    Codes(Vec<String>),
    /// The source already states the sector.
    Known(Sector),
}

/// A normalized entity whose sector is not yet resolved.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub entity: Entity,
    pub signal: SectorSignal,
}

/// What one adapter produced for one query.
#[derive(Debug, Clone, Default)]
pub struct SourceBatch {
    pub candidates: Vec<Candidate>,
    /// Set when the adapter degraded in a way the caller should hear about.
    pub advisory: Option<String>,
}

impl SourceBatch {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            advisory: None,
        }
    }

    pub fn advisory(message: impl Into<String>) -> Self {
        Self {
            candidates: Vec::new(),
            advisory: Some(message.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// Query shapes an adapter can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Exact lookup by 8-digit registry identifier.
    pub identifier_lookup: bool,
    /// Free-text keyword matching on names.
    pub keyword_search: bool,
    /// Listing by locality without a keyword.
    pub location_listing: bool,
}

impl Capabilities {
    /// Whether the adapter can do something useful with `query`.
    pub fn serves(&self, query: &Query) -> bool {
        match query.keyword() {
            Some(keyword) if is_registry_id(keyword) => {
                self.identifier_lookup || self.keyword_search
            }
            Some(_) => self.keyword_search || (self.location_listing && query.location().is_some()),
            None => self.location_listing && query.location().is_some(),
        }
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A source of business entities.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Human-readable adapter name for tracing.
    fn name(&self) -> &str;

    fn capabilities(&self) -> Capabilities;

    /// Answer `query`. Upstream trouble degrades to an empty or partial
    /// batch; this never fails.
    async fn search(&self, query: &Query) -> SourceBatch;
}

/// Secondary per-entity contact lookup keyed by registry identifier.
#[async_trait]
pub trait ContactEnricher: Send + Sync {
    /// Human-readable enricher name for tracing.
    fn name(&self) -> &str;

    /// Look up contact fields for `registry_id`. Fields not found are empty.
    async fn enrich(&self, registry_id: &str) -> Result<Contact>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(keyword: Option<&str>, location: Option<&str>) -> Query {
        Query {
            keyword: keyword.map(String::from),
            location: location.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn registry_capabilities() {
        let caps = Capabilities {
            identifier_lookup: true,
            keyword_search: true,
            location_listing: false,
        };
        assert!(caps.serves(&query(Some("12345678"), None)));
        assert!(caps.serves(&query(Some("Acme"), Some("Praha"))));
        assert!(!caps.serves(&query(None, Some("Praha"))));
    }

    #[test]
    fn directory_capabilities() {
        let caps = Capabilities {
            location_listing: true,
            ..Default::default()
        };
        assert!(caps.serves(&query(None, Some("Brno"))));
        assert!(caps.serves(&query(Some("Acme"), Some("Brno"))));
        assert!(!caps.serves(&query(Some("Acme"), None)));
        assert!(!caps.serves(&query(Some("12345678"), None)));
    }

    #[test]
    fn nothing_serves_an_empty_query() {
        let caps = Capabilities {
            identifier_lookup: true,
            keyword_search: true,
            location_listing: true,
        };
        assert!(!caps.serves(&Query::default()));
    }
}
