//! Backend selection and the service set handed to the pipeline.
//!
//! Each backend (geocoder, feature query) is either the live service or
//! its fixture-backed mock, chosen independently once at startup.

use std::fmt;
use std::sync::Arc;

use tamaod_geocoder::{CoordinateResolver, MockResolver, NominatimConfig, NominatimResolver};
use tamaod_gisn::{AreaFeatureQuery, GisnConfig, GisnQuery, MockQuery};
use tamaod_models::ConfigError;

/// Selects the mock geocoder when truthy.
pub const MOCK_GEOCODER_VAR: &str = "USE_MOCK_NOMINATIVE";

/// Selects the mock feature query when truthy.
pub const MOCK_FEATURES_VAR: &str = "USE_MOCK_GISN";

/// Which backends run against fixtures instead of the network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendSelection {
    /// Replay the Nominatim fixture instead of calling Nominatim.
    pub mock_geocoder: bool,
    /// Replay the GISN fixture instead of querying the layer.
    pub mock_features: bool,
}

impl BackendSelection {
    /// Both backends live.
    pub const LIVE: Self = Self {
        mock_geocoder: false,
        mock_features: false,
    };

    /// Both backends mocked.
    pub const MOCK: Self = Self {
        mock_geocoder: true,
        mock_features: true,
    };

    /// Reads `USE_MOCK_NOMINATIVE` and `USE_MOCK_GISN`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Reads the selection flags through an arbitrary variable lookup.
    #[must_use]
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |name: &str| lookup(name).is_some_and(|value| is_truthy(&value));
        Self {
            mock_geocoder: flag(MOCK_GEOCODER_VAR),
            mock_features: flag(MOCK_FEATURES_VAR),
        }
    }
}

/// `1`, `true`, `yes` or `on`, ignoring case and surrounding whitespace.
#[must_use]
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// The backends one pipeline run talks to.
#[derive(Clone)]
pub struct Services {
    resolver: Arc<dyn CoordinateResolver>,
    query: Arc<dyn AreaFeatureQuery>,
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("resolver", &self.resolver.label())
            .field("query", &self.query.label())
            .finish()
    }
}

impl Services {
    /// Wraps an already constructed backend pair.
    #[must_use]
    pub fn new(resolver: Arc<dyn CoordinateResolver>, query: Arc<dyn AreaFeatureQuery>) -> Self {
        Self { resolver, query }
    }

    /// Both backends replaying their embedded fixtures.
    #[must_use]
    pub fn mock() -> Self {
        Self::new(
            Arc::new(MockResolver::default()),
            Arc::new(MockQuery::default()),
        )
    }

    /// Selection and live-backend settings taken from the process
    /// environment.
    ///
    /// # Errors
    ///
    /// * If the live geocoder is selected and `USER_AGENT` or `REFERRER`
    ///   is missing
    /// * If `NOMINATIM_URL` or `GISN_URL` is set to a non-HTTP(S) value
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::build(BackendSelection::from_env(), |name| std::env::var(name).ok())
    }

    /// Builds the service set for `selection`, configuring live backends
    /// through `lookup`.
    ///
    /// # Errors
    ///
    /// * If the live geocoder is selected and its identification settings
    ///   are missing or blank
    /// * If a live backend's endpoint override is not an HTTP(S) URL
    pub fn build(
        selection: BackendSelection,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let resolver: Arc<dyn CoordinateResolver> = if selection.mock_geocoder {
            Arc::new(MockResolver::default())
        } else {
            Arc::new(NominatimResolver::new(NominatimConfig::from_vars(&lookup)?))
        };

        let query: Arc<dyn AreaFeatureQuery> = if selection.mock_features {
            Arc::new(MockQuery::default())
        } else {
            Arc::new(GisnQuery::new(GisnConfig::from_vars(&lookup)?))
        };

        log::info!(
            "Backends: geocoder={}, features={}",
            resolver.label(),
            query.label()
        );

        Ok(Self::new(resolver, query))
    }

    /// The active address resolver.
    #[must_use]
    pub fn resolver(&self) -> &dyn CoordinateResolver {
        self.resolver.as_ref()
    }

    /// The active feature query.
    #[must_use]
    pub fn query(&self) -> &dyn AreaFeatureQuery {
        self.query.as_ref()
    }
}
