//! Search dispatcher: query → source adapter → classified, filtered,
//! enriched, ordered entities.
//!
//! Phases run in a fixed order for every query:
//! 1. validate (empty queries stop here, no upstream calls)
//! 2. route to a source adapter
//! 3. classify each candidate's sector
//! 4. post-filter by sector, location and employee band
//! 5. enrich contacts (bounded concurrent fan-out)
//! 6. dedup by id, then stable sort

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use subjekt_shared::{AppConfig, Contact, Entity, Query, Result, SearchResponse, SearchStrategy};
use subjekt_sources::{
    Candidate, ContactEnricher, ContactScraper, DirectoryAdapter, MockAdapter, RegistryAdapter,
    SourceAdapter,
};

use crate::classifier::classify;
use crate::ordering::{dedup_by_id, sort_entities};

/// Advisory for a query with neither keyword nor location.
pub const EMPTY_QUERY: &str = "Enter a keyword, registry identifier (IČO) or location to search.";

/// Advisory when the registry-only strategy gets a location-only query.
pub const REGISTRY_NEEDS_KEYWORD: &str = "Registry search requires a keyword.";

/// Advisory when the directory-only strategy gets a query without location.
pub const DIRECTORY_NEEDS_LOCATION: &str = "Directory search requires a location.";

/// How queries are mapped onto adapters.
enum Route {
    /// Keywords (including identifiers) go to one adapter, location-only
    /// queries to another.
    Split {
        keyword: Arc<dyn SourceAdapter>,
        location: Arc<dyn SourceAdapter>,
    },
    /// Everything goes to one adapter; queries it cannot serve get `unserved`.
    Single {
        adapter: Arc<dyn SourceAdapter>,
        unserved: &'static str,
    },
}

/// Runs one query end to end. Holds only immutable, shareable state.
pub struct Dispatcher {
    route: Route,
    enricher: Option<Arc<dyn ContactEnricher>>,
    enrich_concurrency: usize,
}

impl Dispatcher {
    /// Route keyword queries to `keyword` and location-only queries to
    /// `location`.
    pub fn routed(keyword: Arc<dyn SourceAdapter>, location: Arc<dyn SourceAdapter>) -> Self {
        Self {
            route: Route::Split { keyword, location },
            enricher: None,
            enrich_concurrency: 1,
        }
    }

    /// Send every query to `adapter`, answering with `unserved` when its
    /// capabilities do not cover the query.
    pub fn single(adapter: Arc<dyn SourceAdapter>, unserved: &'static str) -> Self {
        Self {
            route: Route::Single { adapter, unserved },
            enricher: None,
            enrich_concurrency: 1,
        }
    }

    /// Enable contact enrichment with at most `concurrency` lookups in flight.
    pub fn with_enricher(mut self, enricher: Arc<dyn ContactEnricher>, concurrency: usize) -> Self {
        self.enricher = Some(enricher);
        self.enrich_concurrency = concurrency.max(1);
        self
    }

    /// Build the adapters selected by `config.search.strategy`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let dispatcher = match config.search.strategy {
            SearchStrategy::Routed => Self::routed(
                Arc::new(RegistryAdapter::new(config.registry.clone())?),
                Arc::new(DirectoryAdapter::new(config.directory.clone())?),
            ),
            SearchStrategy::Registry => Self::single(
                Arc::new(RegistryAdapter::new(config.registry.clone())?),
                REGISTRY_NEEDS_KEYWORD,
            ),
            SearchStrategy::Directory => Self::single(
                Arc::new(DirectoryAdapter::new(config.directory.clone())?),
                DIRECTORY_NEEDS_LOCATION,
            ),
            // Serves every non-empty query, so the advisory is unreachable.
            SearchStrategy::Mock => Self::single(Arc::new(MockAdapter), EMPTY_QUERY),
        };

        // Sample entities carry complete contacts; enriching them would only
        // send requests for made-up identifiers.
        let enrich = config.search.enrich_contacts && config.search.strategy != SearchStrategy::Mock;
        if enrich {
            let scraper = ContactScraper::new(config.enrichment.clone())?;
            Ok(dispatcher.with_enricher(Arc::new(scraper), config.enrichment.concurrency))
        } else {
            Ok(dispatcher)
        }
    }

    /// Answer `query`. Upstream failures degrade to fewer results or an
    /// advisory; this never fails.
    #[instrument(
        skip_all,
        fields(
            keyword = query.keyword().unwrap_or(""),
            location = query.location().unwrap_or(""),
        )
    )]
    pub async fn search(&self, query: &Query) -> SearchResponse {
        // --- Phase 1: Validate ---
        if query.keyword().is_none() && query.location().is_none() {
            debug!("empty query, nothing to route");
            return SearchResponse::advisory(EMPTY_QUERY);
        }

        // --- Phase 2: Route ---
        let adapter = match &self.route {
            Route::Split { keyword, location } => {
                if query.keyword().is_some() {
                    keyword
                } else {
                    location
                }
            }
            Route::Single { adapter, unserved } => {
                if !adapter.capabilities().serves(query) {
                    info!(adapter = adapter.name(), "query not served by strategy");
                    return SearchResponse::advisory(*unserved);
                }
                adapter
            }
        };
        info!(adapter = adapter.name(), "routing query");
        let batch = adapter.search(query).await;
        let raw_count = batch.candidates.len();

        // --- Phase 3: Classify ---
        let entities = batch.candidates.into_iter().map(classified);

        // --- Phase 4: Filter ---
        let entities: Vec<Entity> = entities.filter(|e| passes_filters(e, query)).collect();

        // --- Phase 5: Enrich ---
        let entities = self.enrich_contacts(entities).await;

        // --- Phase 6: Dedup and sort ---
        let mut entities = dedup_by_id(entities);
        sort_entities(&mut entities);

        info!(raw = raw_count, returned = entities.len(), "search finished");

        SearchResponse {
            data: entities,
            error: batch.advisory,
        }
    }

    /// One enrichment call per entity with a registry identifier, at most
    /// `enrich_concurrency` in flight. Results merge back by position; a
    /// failed call leaves its entity untouched.
    async fn enrich_contacts(&self, entities: Vec<Entity>) -> Vec<Entity> {
        let Some(enricher) = &self.enricher else {
            return entities;
        };

        // Owned ids keep the lookup futures free of borrows into `entities`.
        let registry_ids: Vec<String> = entities.iter().map(|e| e.registry_id.clone()).collect();
        let lookups = registry_ids.into_iter().map(|registry_id| {
            let enricher = Arc::clone(enricher);
            async move {
                if registry_id.is_empty() {
                    return None;
                }
                let task = tokio::spawn(async move {
                    let outcome = enricher.enrich(&registry_id).await;
                    (enricher, registry_id, outcome)
                });
                match task.await {
                    Ok((_, _, Ok(contact))) => Some(contact),
                    Ok((enricher, registry_id, Err(e))) => {
                        warn!(
                            enricher = enricher.name(),
                            %registry_id,
                            error = %e,
                            "contact enrichment failed"
                        );
                        None
                    }
                    Err(e) => {
                        warn!(error = %e, "contact enrichment task aborted");
                        None
                    }
                }
            }
        });

        let contacts: Vec<Option<Contact>> = stream::iter(lookups)
            .buffered(self.enrich_concurrency)
            .collect()
            .await;

        let enriched = contacts.iter().filter(|c| c.is_some()).count();
        debug!(enriched, total = entities.len(), "contact enrichment finished");

        entities
            .into_iter()
            .zip(contacts)
            .map(|(mut entity, contact)| {
                if let Some(contact) = contact {
                    entity.contact.fill_from(contact);
                }
                entity
            })
            .collect()
    }
}

fn classified(candidate: Candidate) -> Entity {
    let mut entity = candidate.entity;
    entity.sector = classify(&candidate.signal);
    entity
}

fn passes_filters(entity: &Entity, query: &Query) -> bool {
    if let Some(sector) = query.sector {
        if entity.sector != sector {
            return false;
        }
    }
    if let Some(location) = query.location() {
        if !entity
            .location
            .city
            .to_lowercase()
            .contains(&location.to_lowercase())
        {
            return false;
        }
    }
    if let Some(band) = query.employee_band() {
        if !entity.employee_count_band.is_empty() && entity.employee_count_band != band {
            return false;
        }
    }
    true
}
