//! Embedded structured-data (JSON-LD) extraction.
//!
//! Directory pages describe each listed business in
//! `<script type="application/ld+json">` blocks. This module pulls out the
//! blocks typed `LocalBusiness` or `Organization`, flattening `@graph`
//! containers and top-level arrays. A malformed block is skipped on its own.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Accepted `@type` values.
const BUSINESS_TYPES: [&str; 2] = ["LocalBusiness", "Organization"];

static LD_JSON_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("ld+json selector")
});

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A business as described by one structured-data object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessRecord {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Canonical URL, usually the directory's detail page.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "@id")]
    pub node_id: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub same_as: Vec<String>,
    #[serde(default)]
    pub address: Option<AddressField>,
    #[serde(default)]
    pub telephone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "taxID")]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub identifier: Option<Value>,
}

/// `address` is either a `PostalAddress` object or a plain string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AddressField {
    Structured(PostalAddress),
    Text(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostalAddress {
    #[serde(default)]
    pub street_address: Option<String>,
    #[serde(default)]
    pub address_locality: Option<String>,
    /// Usually a string; tolerate numbers.
    #[serde(default)]
    pub postal_code: Option<Value>,
}

impl BusinessRecord {
    /// Dedup key: the name, falling back to the canonical URL.
    pub fn dedup_key(&self) -> String {
        let name = self.name.trim().to_lowercase();
        if !name.is_empty() {
            return name;
        }
        self.url.as_deref().unwrap_or("").trim().to_string()
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extract business records from a full HTML page in document order.
pub fn extract_businesses(html: &str) -> Vec<BusinessRecord> {
    let doc = Html::parse_document(html);
    let mut records = Vec::new();

    for (index, script) in doc.select(&LD_JSON_SEL).enumerate() {
        let raw = script.text().collect::<String>();
        let value: Value = match serde_json::from_str(raw.trim()) {
            Ok(v) => v,
            Err(e) => {
                warn!(block = index, error = %e, "skipping malformed ld+json block");
                continue;
            }
        };

        let mut nodes = Vec::new();
        flatten_nodes(value, &mut nodes);

        for node in nodes.into_iter().filter(is_business) {
            match serde_json::from_value::<BusinessRecord>(node) {
                Ok(record) if !record.name.trim().is_empty() => records.push(record),
                Ok(_) => debug!(block = index, "skipping business without a name"),
                Err(e) => debug!(block = index, error = %e, "skipping unusable business node"),
            }
        }
    }

    records
}

/// Expand arrays and `@graph` containers into individual nodes.
fn flatten_nodes(value: Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_nodes(item, out);
            }
        }
        Value::Object(mut map) => {
            if let Some(graph) = map.remove("@graph") {
                flatten_nodes(graph, out);
            }
            if map.contains_key("@type") {
                out.push(Value::Object(map));
            }
        }
        _ => {}
    }
}

fn is_business(node: &Value) -> bool {
    match node.get("@type") {
        Some(Value::String(t)) => BUSINESS_TYPES.contains(&t.as_str()),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|t| BUSINESS_TYPES.contains(&t)),
        _ => false,
    }
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<Value>),
        Other(serde::de::IgnoredAny),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(items) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect(),
        OneOrMany::Other(_) => Vec::new(),
    })
}
