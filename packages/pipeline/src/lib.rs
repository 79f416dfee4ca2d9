#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Address to construction-risk pipeline.
//!
//! For one address:
//!
//! 1. Resolve it to a coordinate with the selected [`CoordinateResolver`].
//! 2. Fetch every building feature within the radius with the selected
//!    [`AreaFeatureQuery`].
//! 3. Keep the features in a dangerous construction stage
//!    ([`risk::RiskFilter`]), with rings converted to `[lon, lat]`.
//!
//! Any retrieval failure aborts the run; there is no partial output.

pub mod risk;
pub mod services;

use tamaod_geocoder::CoordinateResolver;
use tamaod_gisn::AreaFeatureQuery;
use tamaod_models::{Coordinate, Radius, RetrievalError, RiskResult, ValidatedRequest};
use thiserror::Error;

pub use risk::{DANGEROUS_STAGES, RiskFilter, assess};
pub use services::{BackendSelection, Services};

/// A failed pipeline run, tagged with the stage that failed.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The address could not be resolved.
    #[error("{} error: {source}", .source.service())]
    Geocode {
        #[source]
        source: RetrievalError,
    },

    /// The surrounding features could not be retrieved.
    #[error("{} error: {source}", .source.service())]
    Features {
        #[source]
        source: RetrievalError,
    },

    /// The resolver produced a point outside WGS84 bounds.
    #[error("Invalid coordinate format from geocoder: {coordinate}")]
    InvalidCoordinate {
        /// The point the resolver returned.
        coordinate: Coordinate,
    },
}

impl PipelineError {
    /// HTTP-style status describing the failure.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Geocode { source } | Self::Features { source } => source.status_code(),
            Self::InvalidCoordinate { .. } => 500,
        }
    }
}

/// Runs the pipeline for one address.
///
/// Performs exactly one geocoder call and, if it succeeds with a valid
/// coordinate, exactly one feature query.
///
/// # Errors
///
/// * [`PipelineError::Geocode`] if the address cannot be resolved
/// * [`PipelineError::InvalidCoordinate`] if the resolved point is not a
///   finite WGS84 position
/// * [`PipelineError::Features`] if the feature query fails
pub async fn handle_address(
    services: &Services,
    street: &str,
    house_number: &str,
    radius: Radius,
) -> Result<Vec<RiskResult>, PipelineError> {
    let resolver = services.resolver();
    log::info!(
        "Resolving '{street} {house_number}' with {}",
        resolver.label()
    );
    let coordinate = resolver
        .fetch(street, house_number)
        .await
        .map_err(|source| PipelineError::Geocode { source })?;

    if !coordinate.is_valid() {
        return Err(PipelineError::InvalidCoordinate { coordinate });
    }
    log::info!("Resolved to {coordinate}");

    let query = services.query();
    let features = query
        .fetch(coordinate, radius)
        .await
        .map_err(|source| PipelineError::Features { source })?;
    log::info!(
        "{} returned {} feature(s) within {radius} m",
        query.label(),
        features.len()
    );

    let results = RiskFilter::new(query.ring_axis_order()).assess(&features);
    log::info!("{} building(s) under construction", results.len());

    Ok(results)
}

/// Runs [`handle_address`] for an already validated request.
///
/// # Errors
///
/// Same as [`handle_address`].
pub async fn analyze(
    services: &Services,
    request: &ValidatedRequest,
) -> Result<Vec<RiskResult>, PipelineError> {
    handle_address(
        services,
        &request.street,
        &request.house_number,
        request.radius,
    )
    .await
}
