//! GISN layer configuration, embedded from `services/gisn.toml`.

use std::time::Duration;

use serde::Deserialize;
use tamaod_models::{AxisOrder, ConfigError};

const SERVICE_TOML: &str = include_str!("../services/gisn.toml");

/// Optional environment override for the layer query URL.
pub const QUERY_URL_VAR: &str = "GISN_URL";

/// The embedded service definition.
#[derive(Debug, Clone, Deserialize)]
pub struct GisnService {
    /// Unique identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Layer `query` endpoint.
    pub query_url: String,
    /// Attribute fields to request.
    pub out_fields: Vec<String>,
    /// Esri unit name for the search distance.
    pub distance_units: String,
    /// Spatial reference of the input point.
    pub in_sr: u32,
    /// Spatial reference of returned geometry.
    pub out_sr: u32,
    /// Whether to ask for polygon geometry.
    pub return_geometry: bool,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Axis order of positions in returned rings.
    #[serde(default)]
    pub ring_axis_order: AxisOrder,
}

/// Returns the embedded service definition.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed.
#[must_use]
pub fn embedded_service() -> GisnService {
    toml::de::from_str(SERVICE_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse embedded GISN service: {e}"))
}

/// Runtime configuration for [`crate::GisnQuery`].
#[derive(Debug, Clone)]
pub struct GisnConfig {
    /// Layer `query` endpoint.
    pub query_url: String,
    /// Attribute fields to request.
    pub out_fields: Vec<String>,
    /// Esri unit name for the search distance.
    pub distance_units: String,
    /// Spatial reference of the input point.
    pub in_sr: u32,
    /// Spatial reference of returned geometry.
    pub out_sr: u32,
    /// Whether to ask for polygon geometry.
    pub return_geometry: bool,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Axis order of positions in returned rings.
    pub ring_axis_order: AxisOrder,
}

impl Default for GisnConfig {
    fn default() -> Self {
        let service = embedded_service();
        Self {
            query_url: service.query_url,
            out_fields: service.out_fields,
            distance_units: service.distance_units,
            in_sr: service.in_sr,
            out_sr: service.out_sr,
            return_geometry: service.return_geometry,
            timeout: Duration::from_secs(service.timeout_secs),
            ring_axis_order: service.ring_axis_order,
        }
    }
}

impl GisnConfig {
    /// Embedded defaults with the `GISN_URL` override applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `GISN_URL` is not an HTTP(S) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Embedded defaults with overrides from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let url = lookup(QUERY_URL_VAR).map(|u| u.trim().to_string());
        match url.as_deref() {
            None | Some("") => {}
            Some(u) if u.starts_with("http://") || u.starts_with("https://") => {
                config.query_url = u.to_string();
            }
            Some(u) => {
                return Err(ConfigError::Invalid {
                    name: QUERY_URL_VAR.to_string(),
                    message: format!("expected an http(s) URL, got '{u}'"),
                });
            }
        }
        Ok(config)
    }

    /// Overrides the query endpoint.
    #[must_use]
    pub fn with_query_url(mut self, query_url: impl Into<String>) -> Self {
        self.query_url = query_url.into();
        self
    }

    /// Overrides the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
