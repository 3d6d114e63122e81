//! HTML business directory scraper (firmy.cz-shaped listing pages).
//!
//! Listing pages 1 and 2 are fetched concurrently and merged in page order
//! through a running seen-set; page 3 is fetched only when the merged set is
//! still short of the target. A failed or timed-out page contributes nothing
//! but never discards the other pages' records.

use std::collections::HashSet;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use tracing::{debug, info, instrument, warn};
use url::Url;

use subjekt_shared::{
    Contact, DirectoryConfig, Entity, Location, Query, Result, Sector, SubjektError, with_timeout,
};

use super::jsonld::{AddressField, BusinessRecord, extract_businesses};
use super::{Candidate, Capabilities, SectorSignal, SourceAdapter, SourceBatch};
use crate::http::{build_client, send_for_text};
use crate::normalize::{
    city_from_locality, collapse_whitespace, is_registry_id, normalize_postal_code, split_links,
};

/// Numeric detail-page identifier preceding the slug: `/detail/12345-acme.html`.
static DETAIL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/detail/(\d+)-").expect("detail id regex"));

/// Outcome of one listing page fetch.
#[derive(Debug, Default)]
struct PageOutcome {
    records: Vec<BusinessRecord>,
    /// False when the page failed; distinguishes "upstream error" from
    /// "page exists but lists nobody".
    fetched: bool,
}

/// Directory listing scraper.
pub struct DirectoryAdapter {
    client: Client,
    config: DirectoryConfig,
    base: Url,
}

impl DirectoryAdapter {
    pub fn new(config: DirectoryConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url).map_err(|e| {
            SubjektError::config(format!("invalid directory base_url '{}': {e}", config.base_url))
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("cs-CZ,cs;q=0.9,en;q=0.8"),
        );
        let client = build_client(&config.user_agent, headers)?;

        Ok(Self {
            client,
            config,
            base,
        })
    }

    /// Collect up to `target_count` unique businesses listed for `locality`
    /// (more if the fetched pages hold more).
    #[instrument(skip_all, fields(locality = %locality))]
    pub async fn list(&self, locality: &str) -> Vec<Candidate> {
        let target = self.config.target_count;

        let (first, second) = tokio::join!(
            self.fetch_page(locality, 1),
            self.fetch_page(locality, 2),
        );

        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        merge_unique(&mut seen, &mut merged, first.records);
        let second_had_records = !second.records.is_empty();
        merge_unique(&mut seen, &mut merged, second.records);

        // An empty or failed page 2 means there is nothing further to walk.
        if merged.len() < target && second.fetched && second_had_records {
            let third = self.fetch_page(locality, 3).await;
            merge_unique(&mut seen, &mut merged, third.records);
        }

        info!(
            unique = merged.len(),
            target,
            page1_ok = first.fetched,
            page2_ok = second.fetched,
            "directory listing collected"
        );

        merged
            .into_iter()
            .map(|record| record_to_candidate(record, self.own_domain()))
            .collect()
    }

    fn own_domain(&self) -> &str {
        self.base.host_str().unwrap_or("")
    }

    fn page_url(&self, locality: &str, page: u32) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("q", locality)
            .append_pair("page", &page.to_string());
        url
    }

    async fn fetch_page(&self, locality: &str, page: u32) -> PageOutcome {
        let url = self.page_url(locality, page);
        debug!(%url, page, "fetching directory page");

        let outcome = with_timeout(self.config.timeout(), async {
            send_for_text(self.client.get(url.as_str()), url.as_str()).await
        })
        .await;

        match outcome {
            Ok(html) => {
                let records = extract_businesses(&html);
                debug!(page, records = records.len(), "directory page parsed");
                PageOutcome {
                    records,
                    fetched: true,
                }
            }
            Err(e) => {
                warn!(page, error = %e, "directory page degraded to empty");
                PageOutcome::default()
            }
        }
    }
}

#[async_trait]
impl SourceAdapter for DirectoryAdapter {
    fn name(&self) -> &str {
        "directory"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            location_listing: true,
            ..Default::default()
        }
    }

    async fn search(&self, query: &Query) -> SourceBatch {
        match query.location() {
            Some(locality) => SourceBatch::new(self.list(locality).await),
            None => SourceBatch::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Merging and mapping
// ---------------------------------------------------------------------------

/// Append records whose dedup key has not been seen yet, preserving order.
fn merge_unique(
    seen: &mut HashSet<String>,
    merged: &mut Vec<BusinessRecord>,
    page: Vec<BusinessRecord>,
) {
    for record in page {
        if seen.insert(record.dedup_key()) {
            merged.push(record);
        }
    }
}

fn detail_id(link: &str) -> Option<String> {
    DETAIL_ID_RE
        .captures(link)
        .map(|caps| caps[1].to_string())
}

fn registry_id_of(record: &BusinessRecord) -> String {
    let from_identifier = record.identifier.as_ref().and_then(|v| match v {
        serde_json::Value::String(s) => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Object(map) => map
            .get("value")
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string()),
        _ => None,
    });

    // A Czech VAT number is the IČO behind a "CZ" prefix.
    record
        .tax_id
        .as_deref()
        .map(|s| s.trim().trim_start_matches("CZ").to_string())
        .into_iter()
        .chain(from_identifier)
        .find(|id| is_registry_id(id))
        .unwrap_or_default()
}

fn record_to_candidate(record: BusinessRecord, own_domain: &str) -> Candidate {
    let name = collapse_whitespace(&record.name);
    let description = record.description.as_deref().map(collapse_whitespace).unwrap_or_default();

    let id = [record.url.as_deref(), record.node_id.as_deref()]
        .into_iter()
        .flatten()
        .find_map(detail_id)
        .unwrap_or_else(|| name.clone());

    let links = record
        .url
        .iter()
        .chain(record.same_as.iter())
        .map(String::as_str);
    let (website, social_links) = split_links(links, own_domain);

    let location = match &record.address {
        Some(AddressField::Structured(address)) => Location {
            city: address
                .address_locality
                .as_deref()
                .map(city_from_locality)
                .unwrap_or_default(),
            street: address
                .street_address
                .as_deref()
                .map(collapse_whitespace)
                .unwrap_or_default(),
            postal_code: match &address.postal_code {
                Some(serde_json::Value::String(s)) => normalize_postal_code(s),
                Some(serde_json::Value::Number(n)) => normalize_postal_code(&n.to_string()),
                _ => String::new(),
            },
        },
        Some(AddressField::Text(text)) => Location {
            city: city_from_locality(text),
            ..Default::default()
        },
        None => Location::default(),
    };

    let contact = Contact {
        email: record
            .email
            .as_deref()
            .map(|e| e.trim().trim_start_matches("mailto:").to_string())
            .unwrap_or_default(),
        phone: record.telephone.as_deref().map(collapse_whitespace).unwrap_or_default(),
        website,
    };

    let signal = SectorSignal::Text(format!("{name} {description}"));

    Candidate {
        entity: Entity {
            id,
            name,
            registry_id: registry_id_of(&record),
            location,
            employee_count_band: String::new(),
            sector: Sector::Other,
            contact,
            social_links,
        },
        signal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use wiremock::matchers::{header_regex, headers, method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fixture(name: &str) -> String {
        let path = format!("../../../fixtures/html/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    fn listing(names: &[&str]) -> String {
        let blocks: String = names
            .iter()
            .map(|n| {
                format!(r#"<script type="application/ld+json">{{"@type":"LocalBusiness","name":"{n}"}}</script>"#)
            })
            .collect();
        format!("<html><head>{blocks}</head><body></body></html>")
    }

    fn adapter_for(server: &MockServer, target_count: usize, timeout_secs: u64) -> DirectoryAdapter {
        DirectoryAdapter::new(DirectoryConfig {
            base_url: format!("{}/", server.uri()),
            timeout_secs,
            target_count,
            user_agent: DirectoryConfig::default().user_agent,
        })
        .unwrap()
    }

    async fn mount_page(server: &MockServer, page: &str, body: String) {
        Mock::given(method("GET"))
            .and(query_param("page", page))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    #[test]
    fn maps_fixture_record() {
        let records = extract_businesses(&fixture("directory-praha-1.html"));
        let candidate = record_to_candidate(records[0].clone(), "www.firmy.cz");
        let entity = &candidate.entity;

        assert_eq!(entity.id, "2468135");
        assert_eq!(entity.name, "Pražská Investiční Banka a.s.");
        assert_eq!(entity.registry_id, "27074358");
        assert_eq!(entity.location.city, "Praha 1");
        assert_eq!(entity.location.street, "Na Příkopě 20");
        assert_eq!(entity.location.postal_code, "110 00");
        assert_eq!(entity.contact.website, "https://www.pib-banka.cz/");
        assert_eq!(entity.contact.email, "info@pib-banka.cz");
        assert_eq!(
            entity.social_links.get("linkedin").map(String::as_str),
            Some("https://www.linkedin.com/company/pib-banka")
        );
        assert!(matches!(candidate.signal, SectorSignal::Text(ref t) if t.contains("investice")));
    }

    #[test]
    fn id_falls_back_to_name() {
        let record = BusinessRecord {
            name: "Bez Detailu s.r.o.".into(),
            url: Some("https://elsewhere.cz/".into()),
            ..Default::default()
        };
        let candidate = record_to_candidate(record, "www.firmy.cz");
        assert_eq!(candidate.entity.id, "Bez Detailu s.r.o.");
        assert_eq!(candidate.entity.contact.website, "https://elsewhere.cz/");
    }

    #[test]
    fn merge_keeps_first_seen_order() {
        let rec = |n: &str| BusinessRecord {
            name: n.into(),
            ..Default::default()
        };
        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        merge_unique(&mut seen, &mut merged, vec![rec("A"), rec("B"), rec("a")]);
        merge_unique(&mut seen, &mut merged, vec![rec("C"), rec("B"), rec("D")]);
        let names: Vec<&str> = merged.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D"]);
    }

    #[tokio::test]
    async fn merges_overlapping_pages_in_page_order() {
        let server = MockServer::start().await;
        mount_page(&server, "1", listing(&["Alfa", "Beta", "Gama"])).await;
        mount_page(&server, "2", listing(&["Gama", "Delta", "Alfa"])).await;
        mount_page(&server, "3", listing(&["Epsilon"])).await;

        let candidates = adapter_for(&server, 4, 5).list("Praha").await;
        let names: Vec<&str> = candidates.iter().map(|c| c.entity.name.as_str()).collect();
        assert_eq!(names, vec!["Alfa", "Beta", "Gama", "Delta"]);
    }

    #[tokio::test]
    async fn fetches_page_three_when_short() {
        let server = MockServer::start().await;
        mount_page(&server, "1", listing(&["Alfa"])).await;
        mount_page(&server, "2", listing(&["Beta"])).await;
        mount_page(&server, "3", listing(&["Gama", "Alfa"])).await;

        let candidates = adapter_for(&server, 25, 5).list("Brno").await;
        let names: Vec<&str> = candidates.iter().map(|c| c.entity.name.as_str()).collect();
        assert_eq!(names, vec!["Alfa", "Beta", "Gama"]);
    }

    #[tokio::test]
    async fn empty_page_two_stops_pagination() {
        let server = MockServer::start().await;
        mount_page(&server, "1", listing(&["Alfa"])).await;
        mount_page(&server, "2", listing(&[])).await;
        Mock::given(method("GET"))
            .and(query_param("page", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_string(listing(&["Never"])))
            .expect(0)
            .mount(&server)
            .await;

        let candidates = adapter_for(&server, 25, 5).list("Kolín").await;
        assert_eq!(candidates.len(), 1);
    }

    #[tokio::test]
    async fn failed_page_keeps_other_pages() {
        let server = MockServer::start().await;
        mount_page(&server, "1", listing(&["Alfa", "Beta"])).await;
        Mock::given(method("GET"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let candidates = adapter_for(&server, 25, 5).list("Ostrava").await;
        assert_eq!(candidates.len(), 2);
    }

    #[tokio::test]
    async fn slow_page_times_out_without_blocking_siblings() {
        let server = MockServer::start().await;
        mount_page(&server, "1", listing(&["Alfa"])).await;
        Mock::given(method("GET"))
            .and(query_param("page", "2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(listing(&["Slow"]))
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&server)
            .await;

        let start = Instant::now();
        let candidates = adapter_for(&server, 25, 1).list("Plzeň").await;
        assert!(start.elapsed() < Duration::from_secs(4));
        let names: Vec<&str> = candidates.iter().map(|c| c.entity.name.as_str()).collect();
        assert_eq!(names, vec!["Alfa"]);
    }

    #[tokio::test]
    async fn sends_locale_headers_and_locality_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "Praha"))
            .and(headers("accept-language", vec!["cs-CZ", "cs;q=0.9", "en;q=0.8"]))
            .and(header_regex("user-agent", r"^Mozilla/5\.0 .*Chrome/\d+"))
            .respond_with(ResponseTemplate::new(200).set_body_string(listing(&["Alfa"])))
            .expect(1..)
            .mount(&server)
            .await;

        let batch = adapter_for(&server, 25, 5)
            .search(&Query {
                location: Some("Praha".into()),
                ..Default::default()
            })
            .await;
        assert_eq!(batch.candidates.len(), 1);
    }
}
