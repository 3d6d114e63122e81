//! Upstream source adapters and field normalization.
//!
//! This crate provides:
//! - [`adapters`]: registry API, directory scraper, contact scraper, sample data
//! - [`SourceAdapter`] / [`ContactEnricher`]: the seams the dispatcher talks to
//! - [`normalize`]: pure helpers shaping raw fields into entity fields

pub mod adapters;
mod http;
pub mod normalize;

pub use adapters::{
    BusinessRecord, Candidate, Capabilities, ContactEnricher, ContactScraper, DirectoryAdapter,
    MockAdapter, RegistryAdapter, SEARCH_UNAVAILABLE, SectorSignal, SourceAdapter, SourceBatch,
    extract_businesses, extract_contact,
};
pub use normalize::{is_registry_id, normalize_postal_code};
