//! Fixture-backed resolver for running without network access.

use tamaod_models::{Coordinate, RetrievalError};

use crate::CoordinateResolver;
use crate::nominatim::parse_response;

/// Sample Nominatim response for "שדרות רוטשילד 12".
const FIXTURE: &str = include_str!("../fixtures/nominatim.json");

/// Resolver that returns the same outcome for every address.
#[derive(Debug, Clone)]
pub struct MockResolver {
    outcome: Result<Coordinate, RetrievalError>,
}

impl MockResolver {
    /// Always resolves to `coordinate`.
    #[must_use]
    pub const fn new(coordinate: Coordinate) -> Self {
        Self {
            outcome: Ok(coordinate),
        }
    }

    /// Always fails with `error`.
    #[must_use]
    pub const fn failing(error: RetrievalError) -> Self {
        Self {
            outcome: Err(error),
        }
    }

    /// Replays a raw Nominatim response body through the real parser.
    #[must_use]
    pub fn from_response(body: &str) -> Self {
        Self {
            outcome: parse_response(body),
        }
    }
}

impl Default for MockResolver {
    /// Resolves to the first candidate of the embedded sample response.
    ///
    /// # Panics
    ///
    /// Panics if the embedded fixture does not parse to a coordinate.
    fn default() -> Self {
        let coordinate = parse_response(FIXTURE)
            .unwrap_or_else(|e| panic!("Embedded Nominatim fixture is unusable: {e}"));
        Self::new(coordinate)
    }
}

#[async_trait::async_trait]
impl CoordinateResolver for MockResolver {
    async fn fetch(&self, street: &str, house_number: &str) -> Result<Coordinate, RetrievalError> {
        log::debug!("Mock geocoder: resolving '{street} {house_number}'");
        self.outcome.clone()
    }

    fn label(&self) -> &'static str {
        "mock-nominatim"
    }
}
