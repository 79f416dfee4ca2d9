//! Nominatim service configuration.
//!
//! Endpoint defaults come from `services/nominatim.toml`, embedded at
//! compile time. The identifying `User-Agent` and `Referer` required by
//! the Nominatim usage policy are read from `USER_AGENT` and `REFERRER`.

use std::time::Duration;

use serde::Deserialize;
use tamaod_models::ConfigError;

const SERVICE_TOML: &str = include_str!("../services/nominatim.toml");

/// Environment variable holding the `User-Agent` header value.
pub const USER_AGENT_VAR: &str = "USER_AGENT";
/// Environment variable holding the `Referer` header value.
pub const REFERRER_VAR: &str = "REFERRER";
/// Optional environment override for the search endpoint.
pub const BASE_URL_VAR: &str = "NOMINATIM_URL";

/// The embedded service definition.
#[derive(Debug, Clone, Deserialize)]
pub struct NominatimService {
    /// Unique identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Search endpoint URL.
    pub base_url: String,
    /// City appended to every free-text query.
    pub city_qualifier: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Returns the embedded service definition.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed.
#[must_use]
pub fn embedded_service() -> NominatimService {
    toml::de::from_str(SERVICE_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse embedded Nominatim service: {e}"))
}

/// Runtime configuration for [`crate::NominatimResolver`].
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    /// Search endpoint URL.
    pub base_url: String,
    /// City appended to every free-text query.
    pub city_qualifier: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// `User-Agent` header value. Never empty.
    pub user_agent: String,
    /// `Referer` header value. Never empty.
    pub referer: String,
}

impl NominatimConfig {
    /// Builds a configuration from the embedded defaults and the given
    /// contact details.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if either value is blank.
    pub fn new(user_agent: &str, referer: &str) -> Result<Self, ConfigError> {
        let user_agent = non_empty(USER_AGENT_VAR, Some(user_agent))?;
        let referer = non_empty(REFERRER_VAR, Some(referer))?;
        let service = embedded_service();

        Ok(Self {
            base_url: service.base_url,
            city_qualifier: service.city_qualifier,
            timeout: Duration::from_secs(service.timeout_secs),
            user_agent,
            referer,
        })
    }

    /// Builds a configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if `USER_AGENT` or `REFERRER` is
    /// unset or blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`], plus [`ConfigError::Invalid`] if
    /// `NOMINATIM_URL` is set to something other than an HTTP(S) URL.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let user_agent = non_empty(USER_AGENT_VAR, lookup(USER_AGENT_VAR).as_deref())?;
        let referer = non_empty(REFERRER_VAR, lookup(REFERRER_VAR).as_deref())?;
        let mut config = Self::new(&user_agent, &referer)?;

        if let Some(url) = endpoint_override(BASE_URL_VAR, lookup(BASE_URL_VAR))? {
            config.base_url = url;
        }

        Ok(config)
    }

    /// Overrides the search endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn non_empty(name: &'static str, value: Option<&str>) -> Result<String, ConfigError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .ok_or(ConfigError::Missing { name })
}

fn endpoint_override(
    name: &'static str,
    value: Option<String>,
) -> Result<Option<String>, ConfigError> {
    let Some(url) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(Some(url))
    } else {
        Err(ConfigError::Invalid {
            name: name.to_string(),
            message: format!("expected an http(s) URL, got '{url}'"),
        })
    }
}
