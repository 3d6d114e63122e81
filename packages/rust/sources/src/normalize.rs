//! Field normalization shared by all source adapters.
//!
//! Pure functions that turn raw upstream fields (postal codes, street and
//! house-number parts, locality strings, URL lists) into the shapes the
//! canonical [`Entity`](subjekt_shared::Entity) expects.

use std::collections::BTreeMap;

use url::Url;

/// Length of a Czech business identifier (IČO).
pub const REGISTRY_ID_LEN: usize = 8;

/// Host suffix → platform key used in `socialLinks`.
const SOCIAL_PLATFORMS: &[(&str, &str)] = &[
    ("facebook.com", "facebook"),
    ("linkedin.com", "linkedin"),
    ("instagram.com", "instagram"),
    ("twitter.com", "twitter"),
    ("x.com", "twitter"),
    ("youtube.com", "youtube"),
];

/// Whether `value` is exactly an 8-digit registry identifier.
pub fn is_registry_id(value: &str) -> bool {
    value.len() == REGISTRY_ID_LEN && value.bytes().all(|b| b.is_ascii_digit())
}

/// Normalize a postal code to `"XXX YY"`.
///
/// Non-digits are dropped and the rest is zero-padded to five digits, so
/// `"1100"` becomes `"011 00"`. Inputs with no digits or more than five
/// yield an empty string.
pub fn normalize_postal_code(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() || digits.len() > 5 {
        return String::new();
    }
    let padded = format!("{digits:0>5}");
    format!("{} {}", &padded[..3], &padded[3..])
}

/// Build a Czech house number: `"descriptive/orientation"` with an optional
/// orientation letter (`846/1a`). Missing parts are left out.
pub fn house_number(
    descriptive: Option<u32>,
    orientation: Option<u32>,
    orientation_letter: Option<&str>,
) -> String {
    let letter = orientation_letter.map(str::trim).unwrap_or("");
    let orientation = orientation.map(|n| format!("{n}{letter}"));
    match (descriptive, orientation) {
        (Some(d), Some(o)) => format!("{d}/{o}"),
        (Some(d), None) => d.to_string(),
        (None, Some(o)) => o,
        (None, None) => String::new(),
    }
}

/// Join a street name and house number with a single space, tolerating
/// either being empty.
pub fn join_street(street: &str, number: &str) -> String {
    match (street.trim(), number.trim()) {
        ("", n) => n.to_string(),
        (s, "") => s.to_string(),
        (s, n) => format!("{s} {n}"),
    }
}

/// First comma-delimited segment of a locality string
/// (`"Praha 1, Staré Město"` → `"Praha 1"`).
pub fn city_from_locality(raw: &str) -> String {
    raw.split(',').next().unwrap_or("").trim().to_string()
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Platform key for a social profile URL, if the host is a known network.
pub fn social_platform(link: &str) -> Option<&'static str> {
    let host = host_of(link)?;
    SOCIAL_PLATFORMS
        .iter()
        .find(|(suffix, _)| host_matches(&host, suffix))
        .map(|(_, platform)| *platform)
}

/// Split a list of links into the entity's website and social profiles.
///
/// The website is the first http(s) link that is neither on `own_domain`
/// (the source site itself) nor a social network. The first link seen per
/// platform wins.
pub fn split_links<'a, I>(links: I, own_domain: &str) -> (String, BTreeMap<String, String>)
where
    I: IntoIterator<Item = &'a str>,
{
    let own = strip_www(own_domain).to_ascii_lowercase();
    let mut website = String::new();
    let mut social = BTreeMap::new();

    for link in links {
        let link = link.trim();
        let Some(host) = host_of(link) else {
            continue;
        };
        if let Some(platform) = social_platform(link) {
            social
                .entry(platform.to_string())
                .or_insert_with(|| link.to_string());
            continue;
        }
        if !own.is_empty() && host_matches(&host, &own) {
            continue;
        }
        if website.is_empty() {
            website = link.to_string();
        }
    }

    (website, social)
}

/// Lowercased host of an http(s) URL.
fn host_of(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.host_str().map(|h| h.to_ascii_lowercase())
}

fn host_matches(host: &str, domain: &str) -> bool {
    let host = strip_www(host);
    host == domain || host.ends_with(&format!(".{domain}"))
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postal_code_pads_then_groups() {
        assert_eq!(normalize_postal_code("1100"), "011 00");
        assert_eq!(normalize_postal_code("11000"), "110 00");
        assert_eq!(normalize_postal_code("602 00"), "602 00");
        assert_eq!(normalize_postal_code("7"), "000 07");
    }

    #[test]
    fn postal_code_is_idempotent() {
        for raw in ["1", "70800", "140 00", "PSČ 12000"] {
            let once = normalize_postal_code(raw);
            assert_eq!(normalize_postal_code(&once), once);
            assert_eq!(once.len(), 6);
            assert_eq!(&once[3..4], " ");
        }
    }

    #[test]
    fn postal_code_rejects_unusable_input() {
        assert_eq!(normalize_postal_code(""), "");
        assert_eq!(normalize_postal_code("abc"), "");
        assert_eq!(normalize_postal_code("1234567"), "");
    }

    #[test]
    fn registry_id_shape() {
        assert!(is_registry_id("12345678"));
        assert!(!is_registry_id("1234567"));
        assert!(!is_registry_id("1234567a"));
        assert!(!is_registry_id("123456789"));
    }

    #[test]
    fn house_number_variants() {
        assert_eq!(house_number(Some(846), Some(1), None), "846/1");
        assert_eq!(house_number(Some(846), Some(1), Some("a")), "846/1a");
        assert_eq!(house_number(Some(12), None, None), "12");
        assert_eq!(house_number(None, Some(5), Some("b")), "5b");
        assert_eq!(house_number(None, None, None), "");
    }

    #[test]
    fn street_joining() {
        assert_eq!(join_street("Václavské náměstí", "846/1"), "Václavské náměstí 846/1");
        assert_eq!(join_street("", "12"), "12");
        assert_eq!(join_street("Dlouhá", ""), "Dlouhá");
    }

    #[test]
    fn city_is_first_locality_segment() {
        assert_eq!(city_from_locality("Praha 1, Staré Město"), "Praha 1");
        assert_eq!(city_from_locality("  Brno "), "Brno");
        assert_eq!(city_from_locality(""), "");
    }

    #[test]
    fn links_split_into_website_and_social() {
        let links = [
            "https://www.firmy.cz/detail/123-acme.html",
            "https://www.facebook.com/acme",
            "mailto:info@acme.cz",
            "https://acme.cz/",
            "https://linkedin.com/company/acme",
            "https://acme-shop.cz/",
        ];
        let (website, social) = split_links(links, "www.firmy.cz");
        assert_eq!(website, "https://acme.cz/");
        assert_eq!(social.get("facebook").unwrap(), "https://www.facebook.com/acme");
        assert_eq!(social.get("linkedin").unwrap(), "https://linkedin.com/company/acme");
        assert_eq!(social.len(), 2);
    }

    #[test]
    fn x_dot_com_counts_as_twitter() {
        assert_eq!(social_platform("https://x.com/acme"), Some("twitter"));
        assert_eq!(social_platform("https://box.com/acme"), None);
    }
}
