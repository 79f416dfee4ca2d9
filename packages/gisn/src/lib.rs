#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Building records around a point, from the Tel Aviv municipal GIS.
//!
//! The [`AreaFeatureQuery`] trait returns every [`Feature`] intersecting a
//! circle of a given radius around a [`Coordinate`]. Implementations:
//!
//! 1. [`gisn::GisnQuery`]: spatial query against the `ArcGIS` `MapServer`
//!    layer configured in the embedded `services/gisn.toml`.
//! 2. [`mock::MockQuery`]: replays an embedded sample response of 13
//!    buildings on Rothschild Boulevard.

pub mod config;
pub mod gisn;
pub mod mock;

use tamaod_models::{AxisOrder, Coordinate, Feature, Radius, RetrievalError};

pub use config::GisnConfig;
pub use gisn::GisnQuery;
pub use mock::MockQuery;

/// Retrieves building features within a radius of a point.
#[async_trait::async_trait]
pub trait AreaFeatureQuery: Send + Sync {
    /// Returns the features intersecting `radius` meters around
    /// `coordinate`, in the order the backend produced them.
    ///
    /// A successful response without any features yields an empty list;
    /// transport failures never do.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError`] if the service is unreachable, answers
    /// with an error status, or returns a malformed body.
    async fn fetch(
        &self,
        coordinate: Coordinate,
        radius: Radius,
    ) -> Result<Vec<Feature>, RetrievalError>;

    /// Axis order of the positions inside returned polygon rings.
    fn ring_axis_order(&self) -> AxisOrder {
        AxisOrder::LatLon
    }

    /// Short backend name for log messages.
    fn label(&self) -> &'static str;
}
