//! Business registry REST adapter (ARES-shaped API).
//!
//! Two operations: direct lookup by IČO and full-text name search. Both run
//! under the configured deadline and degrade to empty results on any
//! upstream trouble.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use subjekt_shared::{
    Contact, Entity, Location, Query, RegistryConfig, Result, Sector, SubjektError, with_timeout,
};

use super::{Candidate, Capabilities, SectorSignal, SourceAdapter, SourceBatch};
use crate::http::{USER_AGENT, build_client, send_for_text};
use crate::normalize::{house_number, is_registry_id, join_street, normalize_postal_code};

/// Advisory surfaced when full-text search degrades.
pub const SEARCH_UNAVAILABLE: &str = "Registry search is temporarily unavailable.";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One economic subject as returned by the registry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistrySubject {
    #[serde(default)]
    ico: Option<String>,
    #[serde(default)]
    obchodni_jmeno: Option<String>,
    #[serde(default)]
    sidlo: Option<RegistryAddress>,
    #[serde(default)]
    cz_nace: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistryAddress {
    #[serde(default)]
    nazev_obce: Option<String>,
    #[serde(default)]
    nazev_casti_obce: Option<String>,
    #[serde(default)]
    nazev_ulice: Option<String>,
    #[serde(default)]
    cislo_domovni: Option<u32>,
    #[serde(default)]
    cislo_orientacni: Option<u32>,
    #[serde(default)]
    cislo_orientacni_pismeno: Option<String>,
    /// Integer in practice; some records carry it as a string.
    #[serde(default)]
    psc: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResults {
    #[serde(default)]
    ekonomicke_subjekty: Vec<RegistrySubject>,
    #[serde(default)]
    pocet_celkem: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchFilter<'a> {
    start: u32,
    pocet: u32,
    obchodni_jmeno: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sidlo: Option<LocalityFilter<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LocalityFilter<'a> {
    textova_adresa: &'a str,
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

/// Registry API client.
pub struct RegistryAdapter {
    client: Client,
    config: RegistryConfig,
}

impl RegistryAdapter {
    pub fn new(config: RegistryConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = build_client(USER_AGENT, headers)?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Look up one subject by IČO. Any non-success outcome (including
    /// "not found") yields no candidate.
    #[instrument(skip_all, fields(ico = %ico))]
    pub async fn lookup(&self, ico: &str) -> Option<Candidate> {
        let url = self.endpoint(&format!("ekonomicke-subjekty/{ico}"));
        let outcome = with_timeout(self.config.timeout(), async {
            let body = send_for_text(self.client.get(&url), &url).await?;
            serde_json::from_str::<RegistrySubject>(&body)
                .map_err(|e| SubjektError::parse(format!("{url}: {e}")))
        })
        .await;

        match outcome {
            Ok(subject) => {
                let candidate = subject_to_candidate(subject);
                debug!(found = candidate.is_some(), "registry lookup finished");
                candidate
            }
            Err(SubjektError::UpstreamStatus { status, .. }) => {
                debug!(status, "registry lookup: subject not found");
                None
            }
            Err(e) => {
                warn!(error = %e, "registry lookup degraded to empty result");
                None
            }
        }
    }

    /// Full-text search by name with an optional locality hint.
    #[instrument(skip_all, fields(name = %name, locality = locality.unwrap_or("")))]
    pub async fn search_text(&self, name: &str, locality: Option<&str>) -> SourceBatch {
        let url = self.endpoint("ekonomicke-subjekty/vyhledat");
        let filter = SearchFilter {
            start: 0,
            pocet: self.config.page_size,
            obchodni_jmeno: name,
            sidlo: locality.map(|textova_adresa| LocalityFilter { textova_adresa }),
        };

        let outcome = with_timeout(self.config.timeout(), async {
            let body = send_for_text(self.client.post(&url).json(&filter), &url).await?;
            serde_json::from_str::<SearchResults>(&body)
                .map_err(|e| SubjektError::parse(format!("{url}: {e}")))
        })
        .await;

        match outcome {
            Ok(results) => {
                let candidates: Vec<Candidate> = results
                    .ekonomicke_subjekty
                    .into_iter()
                    .filter_map(subject_to_candidate)
                    .collect();
                info!(
                    returned = candidates.len(),
                    total = results.pocet_celkem.unwrap_or(0),
                    "registry search finished"
                );
                SourceBatch::new(candidates)
            }
            Err(e) => {
                warn!(error = %e, "registry search degraded to empty result");
                SourceBatch::advisory(SEARCH_UNAVAILABLE)
            }
        }
    }
}

#[async_trait]
impl SourceAdapter for RegistryAdapter {
    fn name(&self) -> &str {
        "registry"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            identifier_lookup: true,
            keyword_search: true,
            location_listing: false,
        }
    }

    async fn search(&self, query: &Query) -> SourceBatch {
        match query.keyword() {
            Some(keyword) if is_registry_id(keyword) => {
                SourceBatch::new(self.lookup(keyword).await.into_iter().collect())
            }
            Some(keyword) => self.search_text(keyword, query.location()).await,
            None => SourceBatch::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

fn subject_to_candidate(subject: RegistrySubject) -> Option<Candidate> {
    let name = subject.obchodni_jmeno.as_deref().unwrap_or("").trim().to_string();
    if name.is_empty() {
        return None;
    }
    let registry_id = subject.ico.as_deref().unwrap_or("").trim().to_string();
    let id = if registry_id.is_empty() {
        name.clone()
    } else {
        registry_id.clone()
    };

    let location = subject.sidlo.map(address_to_location).unwrap_or_default();

    Some(Candidate {
        entity: Entity {
            id,
            name,
            registry_id,
            location,
            employee_count_band: String::new(),
            sector: Sector::Other,
            contact: Contact::default(),
            social_links: Default::default(),
        },
        signal: SectorSignal::Codes(subject.cz_nace),
    })
}

fn address_to_location(address: RegistryAddress) -> Location {
    let number = house_number(
        address.cislo_domovni,
        address.cislo_orientacni,
        address.cislo_orientacni_pismeno.as_deref(),
    );
    // Villages without named streets are addressed by the municipal part.
    let street_name = address
        .nazev_ulice
        .as_deref()
        .or(address.nazev_casti_obce.as_deref())
        .unwrap_or("");

    let postal_code = match address.psc {
        Some(serde_json::Value::Number(n)) => normalize_postal_code(&n.to_string()),
        Some(serde_json::Value::String(s)) => normalize_postal_code(&s),
        _ => String::new(),
    };

    Location {
        city: address.nazev_obce.unwrap_or_default().trim().to_string(),
        street: join_street(street_name, &number),
        postal_code,
    }
}
