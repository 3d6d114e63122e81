//! Reverse-geocoding proxy.
//!
//! Validates coordinates locally, then forwards to a Nominatim-style
//! `reverse` endpoint and relays its JSON.

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};

use subjekt_shared::{GeocodeConfig, Result, SubjektError, with_timeout};

pub(crate) const COORDINATES_REQUIRED: &str = "lat and lon are required";
pub(crate) const INVALID_COORDINATES: &str = "Invalid coordinates";

/// Parse `lat`/`lon` query values. Missing or blank values and
/// non-numeric or non-finite numbers are rejected.
pub(crate) fn parse_coordinates(lat: Option<&str>, lon: Option<&str>) -> Result<(f64, f64)> {
    let (Some(lat), Some(lon)) = (
        lat.map(str::trim).filter(|v| !v.is_empty()),
        lon.map(str::trim).filter(|v| !v.is_empty()),
    ) else {
        return Err(SubjektError::invalid_request(COORDINATES_REQUIRED));
    };

    let parse = |raw: &str| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| SubjektError::invalid_request(INVALID_COORDINATES))
    };
    Ok((parse(lat)?, parse(lon)?))
}

/// Upstream reverse-geocoding client.
pub(crate) struct GeocodeClient {
    client: Client,
    config: GeocodeConfig,
}

impl GeocodeClient {
    pub(crate) fn new(config: GeocodeConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| SubjektError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Resolve coordinates to an address document.
    ///
    /// Non-success upstream statuses surface as
    /// [`SubjektError::UpstreamStatus`] so callers can relay the status.
    #[instrument(skip(self))]
    pub(crate) async fn reverse(&self, lat: f64, lon: f64) -> Result<Value> {
        let url = self.config.base_url.as_str();
        with_timeout(self.config.timeout(), async {
            let response = self
                .client
                .get(url)
                .query(&[
                    ("lat", lat.to_string()),
                    ("lon", lon.to_string()),
                    ("format", "json".to_string()),
                    ("accept-language", "cs".to_string()),
                ])
                .send()
                .await
                .map_err(|e| SubjektError::Network(format!("{url}: {e}")))?;

            let status = response.status();
            debug!(status = status.as_u16(), "geocoding upstream responded");
            if !status.is_success() {
                return Err(SubjektError::UpstreamStatus {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            response
                .json::<Value>()
                .await
                .map_err(|e| SubjektError::parse(format!("{url}: {e}")))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_numeric_coordinates() {
        let (lat, lon) = parse_coordinates(Some("50.08"), Some(" 14.42 ")).unwrap();
        assert_eq!(lat, 50.08);
        assert_eq!(lon, 14.42);
    }

    #[test]
    fn missing_or_blank_is_required_error() {
        for (lat, lon) in [(None, Some("14.4")), (Some("50"), None), (Some(""), Some("14.4"))] {
            let err = parse_coordinates(lat, lon).unwrap_err();
            assert!(err.to_string().contains(COORDINATES_REQUIRED), "{err}");
        }
    }

    #[test]
    fn non_numeric_or_non_finite_is_invalid() {
        for (lat, lon) in [("abc", "14.4"), ("50", "NaN"), ("inf", "14.4")] {
            let err = parse_coordinates(Some(lat), Some(lon)).unwrap_err();
            assert!(err.to_string().contains(INVALID_COORDINATES), "{err}");
        }
    }
}
