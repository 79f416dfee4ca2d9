//! Fixture-backed feature query for running without network access.

use tamaod_models::{AxisOrder, Coordinate, Feature, Radius, RetrievalError};

use crate::AreaFeatureQuery;
use crate::gisn::parse_response;

/// Sample layer response: 13 buildings around Rothschild Blvd / Herzl St,
/// one of them under construction.
const FIXTURE: &str = include_str!("../fixtures/gisn.json");

/// Feature query that returns the same outcome for every point and radius.
#[derive(Debug, Clone)]
pub struct MockQuery {
    outcome: Result<Vec<Feature>, RetrievalError>,
    ring_axis_order: AxisOrder,
}

impl MockQuery {
    /// Always returns `features`.
    #[must_use]
    pub const fn new(features: Vec<Feature>) -> Self {
        Self {
            outcome: Ok(features),
            ring_axis_order: AxisOrder::LatLon,
        }
    }

    /// Always fails with `error`.
    #[must_use]
    pub const fn failing(error: RetrievalError) -> Self {
        Self {
            outcome: Err(error),
            ring_axis_order: AxisOrder::LatLon,
        }
    }

    /// Replays a raw layer response body through the real parser.
    #[must_use]
    pub fn from_response(body: &str) -> Self {
        Self {
            outcome: parse_response(body),
            ring_axis_order: AxisOrder::LatLon,
        }
    }

    /// Declares the axis order of the rings in the replayed features.
    #[must_use]
    pub fn with_ring_axis_order(mut self, order: AxisOrder) -> Self {
        self.ring_axis_order = order;
        self
    }
}

impl Default for MockQuery {
    /// Returns the features of the embedded sample response.
    ///
    /// # Panics
    ///
    /// Panics if the embedded fixture does not parse.
    fn default() -> Self {
        let features = parse_response(FIXTURE)
            .unwrap_or_else(|e| panic!("Embedded GISN fixture is unusable: {e}"));
        Self::new(features)
    }
}

#[async_trait::async_trait]
impl AreaFeatureQuery for MockQuery {
    async fn fetch(
        &self,
        coordinate: Coordinate,
        radius: Radius,
    ) -> Result<Vec<Feature>, RetrievalError> {
        log::debug!("Mock GISN: features around {coordinate} within {radius} m");
        self.outcome.clone()
    }

    fn ring_axis_order(&self) -> AxisOrder {
        self.ring_axis_order
    }

    fn label(&self) -> &'static str {
        "mock-gisn"
    }
}
