//! Built-in sample dataset.
//!
//! Serves five fixed companies without touching the network. Unlike the
//! registry strategy it matches keywords as substrings of either the name or
//! the registry identifier, so partial IČO input still finds a company.

use async_trait::async_trait;
use subjekt_shared::{Contact, Entity, Location, Query, Sector};

use super::{Candidate, Capabilities, SectorSignal, SourceAdapter, SourceBatch};

/// Sample-data adapter.
#[derive(Debug, Default)]
pub struct MockAdapter;

struct Sample {
    id: &'static str,
    name: &'static str,
    ico: &'static str,
    city: &'static str,
    street: &'static str,
    postal_code: &'static str,
    band: &'static str,
    sector: Sector,
    email: &'static str,
    phone: &'static str,
    website: &'static str,
    social: &'static [(&'static str, &'static str)],
}

const SAMPLES: &[Sample] = &[
    Sample {
        id: "uuid-1",
        name: "TechNova Solutions s.r.o.",
        ico: "12345678",
        city: "Praha",
        street: "Václavské náměstí 1",
        postal_code: "110 00",
        band: "11-50",
        sector: Sector::It,
        email: "info@technova.cz",
        phone: "+420 123 456 789",
        website: "https://technova.example.com",
        social: &[("linkedin", "https://linkedin.com/company/technova-solutions")],
    },
    Sample {
        id: "uuid-2",
        name: "FinSecure a.s.",
        ico: "87654321",
        city: "Brno",
        street: "Česká 10",
        postal_code: "602 00",
        band: "50+",
        sector: Sector::Finance,
        email: "kontakt@finsecure.cz",
        phone: "+420 987 654 321",
        website: "https://finsecure.example.com",
        social: &[],
    },
    Sample {
        id: "uuid-3",
        name: "Kovosport Praha",
        ico: "11223344",
        city: "Praha",
        street: "Sportovní 5",
        postal_code: "140 00",
        band: "1-10",
        sector: Sector::Other,
        email: "info@kovosport.cz",
        phone: "+420 111 222 333",
        website: "https://kovosport.example.com",
        social: &[("twitter", "https://twitter.com/kovosport")],
    },
    Sample {
        id: "uuid-4",
        name: "DataMinds CZ",
        ico: "99887766",
        city: "Ostrava",
        street: "Porubská 120",
        postal_code: "708 00",
        band: "11-50",
        sector: Sector::It,
        email: "hello@dataminds.cz",
        phone: "+420 555 666 777",
        website: "https://dataminds.example.com",
        social: &[("linkedin", "https://linkedin.com/company/dataminds")],
    },
    Sample {
        id: "uuid-5",
        name: "MediCare Plus",
        ico: "55443322",
        city: "Praha",
        street: "Nemocniční 8",
        postal_code: "120 00",
        band: "50+",
        sector: Sector::Healthcare,
        email: "recepce@medicareplus.cz",
        phone: "+420 222 333 444",
        website: "https://medicareplus.example.com",
        social: &[],
    },
];

impl Sample {
    fn matches(&self, query: &Query) -> bool {
        if let Some(keyword) = query.keyword() {
            let hit = self.name.to_lowercase().contains(&keyword.to_lowercase())
                || self.ico.contains(keyword);
            if !hit {
                return false;
            }
        }
        if let Some(location) = query.location() {
            if !self.city.to_lowercase().contains(&location.to_lowercase()) {
                return false;
            }
        }
        true
    }

    fn to_candidate(&self) -> Candidate {
        Candidate {
            entity: Entity {
                id: self.id.into(),
                name: self.name.into(),
                registry_id: self.ico.into(),
                location: Location {
                    city: self.city.into(),
                    street: self.street.into(),
                    postal_code: self.postal_code.into(),
                },
                employee_count_band: self.band.into(),
                sector: self.sector,
                contact: Contact {
                    email: self.email.into(),
                    phone: self.phone.into(),
                    website: self.website.into(),
                },
                social_links: self
                    .social
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            },
            signal: SectorSignal::Known(self.sector),
        }
    }
}

#[async_trait]
impl SourceAdapter for MockAdapter {
    fn name(&self) -> &str {
        "mock"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            identifier_lookup: true,
            keyword_search: true,
            location_listing: true,
        }
    }

    async fn search(&self, query: &Query) -> SourceBatch {
        SourceBatch::new(
            SAMPLES
                .iter()
                .filter(|s| s.matches(query))
                .map(Sample::to_candidate)
                .collect(),
        )
    }
}
