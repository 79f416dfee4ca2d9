#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Address to coordinate resolution.
//!
//! Turns a `(street, house number)` pair into a single WGS84
//! [`Coordinate`] through the [`CoordinateResolver`] trait. Two
//! implementations are provided:
//!
//! 1. [`nominatim::NominatimResolver`]: calls the public Nominatim /
//!    `OpenStreetMap` search endpoint, configured by the embedded
//!    `services/nominatim.toml` plus the `USER_AGENT` / `REFERRER`
//!    environment variables required by the Nominatim usage policy.
//! 2. [`mock::MockResolver`]: returns a fixed coordinate parsed from an
//!    embedded sample response, for running without network access.

pub mod config;
pub mod mock;
pub mod nominatim;

use tamaod_models::{Coordinate, RetrievalError};

pub use config::NominatimConfig;
pub use mock::MockResolver;
pub use nominatim::NominatimResolver;

/// Resolves an address inside the configured city to a coordinate.
#[async_trait::async_trait]
pub trait CoordinateResolver: Send + Sync {
    /// Resolves `street` + `house_number` to a `(longitude, latitude)` point.
    ///
    /// Never returns a partial or placeholder coordinate; any failure to
    /// produce a real one is an error.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError`] if the provider is unreachable, answers
    /// with an error status or malformed body, or has no usable candidate.
    async fn fetch(&self, street: &str, house_number: &str) -> Result<Coordinate, RetrievalError>;

    /// Short backend name for log messages.
    fn label(&self) -> &'static str;
}
