//! Nominatim / `OpenStreetMap` geocoder client.
//!
//! Issues one free-text search per address and takes the first candidate
//! that carries both `lat` and `lon`, in response order. No re-ranking,
//! no retries; the caller decides whether to try again.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use tamaod_models::{Coordinate, RetrievalError, Service};

use crate::{CoordinateResolver, NominatimConfig};

/// Resolver backed by a live Nominatim instance.
pub struct NominatimResolver {
    client: reqwest::Client,
    config: NominatimConfig,
}

impl NominatimResolver {
    /// Creates a resolver with its own HTTP client.
    #[must_use]
    pub fn new(config: NominatimConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Creates a resolver configured from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`tamaod_models::ConfigError`] if the required contact
    /// headers are not configured.
    pub fn from_env() -> Result<Self, tamaod_models::ConfigError> {
        NominatimConfig::from_env().map(Self::new)
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &NominatimConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl CoordinateResolver for NominatimResolver {
    async fn fetch(&self, street: &str, house_number: &str) -> Result<Coordinate, RetrievalError> {
        let query = build_query(street, house_number, &self.config.city_qualifier);
        log::debug!("Nominatim: searching '{query}' at {}", self.config.base_url);

        let resp = self
            .client
            .get(&self.config.base_url)
            .query(&[("q", query.as_str()), ("format", "json")])
            .header(reqwest::header::USER_AGENT, &self.config.user_agent)
            .header(reqwest::header::REFERER, &self.config.referer)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(request_failed)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RetrievalError::Status {
                service: Service::Nominatim,
                status: status.as_u16(),
                detail: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = resp.text().await.map_err(request_failed)?;
        parse_response(&body)
    }

    fn label(&self) -> &'static str {
        "nominatim"
    }
}

/// Joins street, house number and the city qualifier into the `q` value.
#[must_use]
pub fn build_query(street: &str, house_number: &str, city_qualifier: &str) -> String {
    [street.trim(), house_number.trim(), city_qualifier.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn request_failed(e: reqwest::Error) -> RetrievalError {
    RetrievalError::Request {
        service: Service::Nominatim,
        message: e.to_string(),
    }
}

/// Parses a Nominatim `format=json` body into the first usable coordinate.
///
/// Candidates whose `lat` or `lon` is missing, blank, or not a finite
/// number are skipped.
///
/// # Errors
///
/// * [`RetrievalError::InvalidResponse`] if the body is not a JSON array.
/// * [`RetrievalError::AddressNotFound`] if the array is empty.
/// * [`RetrievalError::NoCoordinates`] if no candidate has usable
///   `lat`/`lon`.
pub fn parse_response(body: &str) -> Result<Coordinate, RetrievalError> {
    let invalid = |message: String| RetrievalError::InvalidResponse {
        service: Service::Nominatim,
        message,
    };

    let json: serde_json::Value = serde_json::from_str(body).map_err(|e| invalid(e.to_string()))?;
    let candidates = json
        .as_array()
        .ok_or_else(|| invalid("response is not an array".to_string()))?;

    if candidates.is_empty() {
        return Err(RetrievalError::AddressNotFound);
    }

    let first = candidates.iter().find_map(|candidate| {
        let lat = parse_degrees(candidate.get("lat"))?;
        let lon = parse_degrees(candidate.get("lon"))?;
        Some(Coordinate::new(lon, lat))
    });

    match first {
        Some(coordinate) => {
            log::debug!(
                "Nominatim: {} candidate(s), using {coordinate}",
                candidates.len()
            );
            Ok(coordinate)
        }
        None => {
            log::warn!(
                "Nominatim: none of {} candidate(s) carried lat/lon",
                candidates.len()
            );
            Err(RetrievalError::NoCoordinates {
                service: Service::Nominatim,
            })
        }
    }
}

fn parse_degrees(value: Option<&serde_json::Value>) -> Option<f64> {
    value?
        .as_str()?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_candidate_as_lon_lat() {
        let body = serde_json::json!([{
            "place_id": 194_616_086,
            "lat": "32.0698820",
            "lon": "34.7735910",
            "display_name": "23, מרכז בעלי מלאכה, תל־אביב–יפו, ישראל"
        }, {
            "lat": "32.1",
            "lon": "34.8"
        }])
        .to_string();

        let coordinate = parse_response(&body).unwrap();
        assert_eq!(coordinate, Coordinate::new(34.773_591_0, 32.069_882_0));
    }

    #[test]
    fn skips_candidates_without_coordinates() {
        let body = serde_json::json!([
            { "place_id": 1, "display_name": "Place without coords" },
            { "place_id": 2, "lat": "", "lon": "34.1" },
            { "place_id": 3, "lat": "32.0698820", "lon": "34.7735910" }
        ])
        .to_string();

        assert_eq!(
            parse_response(&body).unwrap(),
            Coordinate::new(34.773_591_0, 32.069_882_0)
        );
    }

    #[test]
    fn empty_array_is_address_not_found() {
        let err = parse_response("[]").unwrap_err();
        assert_eq!(err, RetrievalError::AddressNotFound);
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn no_usable_candidate_is_an_error() {
        let body = serde_json::json!([{ "place_id": 1, "display_name": "Some Place" }]).to_string();
        let err = parse_response(&body).unwrap_err();
        assert_eq!(
            err,
            RetrievalError::NoCoordinates {
                service: Service::Nominatim
            }
        );
        assert!(err.to_string().contains("no valid coordinates found"));
    }

    #[test]
    fn malformed_body_is_invalid_response() {
        for body in ["{ not valid json", "{\"error\": \"Unable to geocode\"}"] {
            let err = parse_response(body).unwrap_err();
            assert!(
                matches!(err, RetrievalError::InvalidResponse { .. }),
                "unexpected error for {body}: {err:?}"
            );
            assert!(err.to_string().contains("invalid JSON response from Nominatim"));
        }
    }

    #[test]
    fn query_joins_street_number_and_city() {
        assert_eq!(build_query("Herzl", "10", "תל אביב"), "Herzl 10 תל אביב");
        assert_eq!(build_query(" Herzl ", "10A ", ""), "Herzl 10A");
    }
}
