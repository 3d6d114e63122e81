//! Search orchestration and domain logic for Subjekt.
//!
//! This crate turns a [`Query`](subjekt_shared::Query) into an ordered list
//! of entities: it routes to source adapters, resolves sectors, applies the
//! post-filters and merges contact enrichment.

pub mod classifier;
pub mod dispatcher;
pub mod ordering;

pub use classifier::{classify, classify_codes, classify_text};
pub use dispatcher::{DIRECTORY_NEEDS_LOCATION, Dispatcher, EMPTY_QUERY, REGISTRY_NEEDS_KEYWORD};
