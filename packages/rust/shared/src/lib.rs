//! Shared types, error model, and configuration for Subjekt.
//!
//! This crate is the foundation depended on by all other Subjekt crates.
//! It provides:
//! - [`SubjektError`]: the unified error type
//! - Domain types ([`Entity`], [`Query`], [`Sector`], [`SearchResponse`])
//! - Configuration ([`AppConfig`], config loading)
//! - [`with_timeout`]: deadline wrapper for upstream calls

pub mod config;
pub mod error;
pub mod timeout;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DirectoryConfig, EnrichmentConfig, GeocodeConfig, RegistryConfig, SearchConfig,
    SearchStrategy, ServerConfig, config_dir, config_file_path, init_config, load_config,
    load_config_from,
};
pub use error::{Result, SubjektError};
pub use timeout::with_timeout;
pub use types::{Contact, EMPLOYEE_BANDS, Entity, Location, Query, SearchResponse, Sector};
