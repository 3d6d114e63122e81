//! Contact scraper over the registry-enrichment site.
//!
//! Fetches `<base>/<ico>/` and pulls website, e-mail and phone out of the
//! HTML with label-anchored patterns: the label's text node, then the value
//! within a bounded window after it. Missing fields stay empty; any failure
//! degrades to an empty [`Contact`].

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use tracing::{debug, instrument, warn};

use subjekt_shared::{Contact, EnrichmentConfig, Result, with_timeout};

use super::ContactEnricher;
use crate::http::{USER_AGENT, build_client, send_for_text};
use crate::normalize::collapse_whitespace;

static WEBSITE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)>\s*(?:web|www|webové stránky|internetové stránky)\s*:?\s*<.{0,300}?href\s*=\s*["'](https?://[^"'\s>]+)["']"#,
    )
    .expect("website regex")
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)>\s*e-?mail\s*:?\s*<.{0,300}?([a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,})",
    )
    .expect("email regex")
});

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)>\s*telefon\s*:?\s*<.{0,300}?>\s*(\+?[0-9][0-9 ]{7,}[0-9])\s*<")
        .expect("phone regex")
});

/// Extract contact fields from an enrichment page.
pub fn extract_contact(html: &str) -> Contact {
    let capture = |re: &Regex| {
        re.captures(html)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    };

    Contact {
        website: capture(&WEBSITE_RE),
        email: capture(&EMAIL_RE),
        phone: collapse_whitespace(&capture(&PHONE_RE)),
    }
}

/// Scrapes contact details for one registry identifier at a time.
pub struct ContactScraper {
    client: Client,
    config: EnrichmentConfig,
}

impl ContactScraper {
    pub fn new(config: EnrichmentConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/html"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("cs-CZ,cs;q=0.9"));
        let client = build_client(USER_AGENT, headers)?;
        Ok(Self { client, config })
    }

    fn page_url(&self, registry_id: &str) -> String {
        format!("{}/{registry_id}/", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ContactEnricher for ContactScraper {
    fn name(&self) -> &str {
        "contact-scraper"
    }

    #[instrument(skip_all, fields(registry_id = %registry_id))]
    async fn enrich(&self, registry_id: &str) -> Result<Contact> {
        let url = self.page_url(registry_id);
        let outcome = with_timeout(self.config.timeout(), async {
            send_for_text(self.client.get(&url), &url).await
        })
        .await;

        match outcome {
            Ok(html) => {
                let contact = extract_contact(&html);
                debug!(
                    website = !contact.website.is_empty(),
                    email = !contact.email.is_empty(),
                    phone = !contact.phone.is_empty(),
                    "contact page scraped"
                );
                Ok(contact)
            }
            Err(e) => {
                warn!(error = %e, "contact enrichment degraded to empty");
                Ok(Contact::default())
            }
        }
    }
}
