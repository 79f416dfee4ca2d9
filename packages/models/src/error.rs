//! Error types shared across the pipeline crates.

use std::fmt;

use thiserror::Error;

/// An external service the pipeline talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Nominatim / `OpenStreetMap` geocoder.
    Nominatim,
    /// Tel Aviv municipal GIS (`ArcGIS` `MapServer`).
    Gisn,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Nominatim => "Nominatim",
            Self::Gisn => "GISN",
        })
    }
}

/// A failed call to an external service.
///
/// The variant is the machine-readable kind; [`Self::status_code`] gives the
/// HTTP-like status a presentation layer should respond with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetrievalError {
    /// The service answered with a non-2xx status.
    #[error("{service} API error: {status} {detail}")]
    Status {
        /// Service that answered.
        service: Service,
        /// Upstream HTTP status code.
        status: u16,
        /// Reason phrase or response body.
        detail: String,
    },

    /// The request never produced a response (timeout, refused, DNS...).
    #[error("{service} request failed: {message}")]
    Request {
        /// Service that was being called.
        service: Service,
        /// Transport error description.
        message: String,
    },

    /// The body was not the JSON shape the service documents.
    #[error("invalid JSON response from {service}: {message}")]
    InvalidResponse {
        /// Service that answered.
        service: Service,
        /// Parser error description.
        message: String,
    },

    /// The geocoder returned no candidates at all.
    #[error("could not locate address")]
    AddressNotFound,

    /// The geocoder returned candidates, none with usable `lat`/`lon`.
    #[error("no valid coordinates found in {service} results")]
    NoCoordinates {
        /// Service that answered.
        service: Service,
    },
}

impl RetrievalError {
    /// HTTP-like status code for this failure.
    ///
    /// Upstream statuses pass through. Transport failures against the GIS
    /// service map to 503; everything else maps to 500.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Status { status, .. } => *status,
            Self::Request {
                service: Service::Gisn,
                ..
            } => 503,
            Self::Request { .. }
            | Self::InvalidResponse { .. }
            | Self::AddressNotFound
            | Self::NoCoordinates { .. } => 500,
        }
    }

    /// The service the failure came from.
    #[must_use]
    pub const fn service(&self) -> Service {
        match self {
            Self::Status { service, .. }
            | Self::Request { service, .. }
            | Self::InvalidResponse { service, .. }
            | Self::NoCoordinates { service } => *service,
            Self::AddressNotFound => Service::Nominatim,
        }
    }
}

/// Rejected user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Street was absent or blank.
    #[error("Missing 'street' field")]
    MissingStreet,

    /// House number was absent or blank.
    #[error("Missing 'house number' field")]
    MissingHouseNumber,

    /// House number has no digits at all (e.g. `"abc"`).
    #[error("House number must contain at least one digit")]
    HouseNumberWithoutDigit,

    /// Radius outside the accepted range.
    #[error("Radius must be between {min} and {max} meters, got {value}")]
    RadiusOutOfRange {
        /// The rejected value.
        value: i64,
        /// Smallest accepted radius.
        min: u32,
        /// Largest accepted radius.
        max: u32,
    },
}

/// Missing or malformed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required setting was not provided or was empty.
    #[error("Missing required setting: {name}")]
    Missing {
        /// Environment variable or key name.
        name: &'static str,
    },

    /// A setting was present but could not be used.
    #[error("Invalid configuration for {name}: {message}")]
    Invalid {
        /// Environment variable or key name.
        name: String,
        /// Why it was rejected.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_message_and_code() {
        let err = RetrievalError::Status {
            service: Service::Nominatim,
            status: 502,
            detail: "Bad Gateway".to_string(),
        };
        assert_eq!(err.to_string(), "Nominatim API error: 502 Bad Gateway");
        assert_eq!(err.status_code(), 502);
    }

    #[test]
    fn transport_failures_map_per_service() {
        let geocoder = RetrievalError::Request {
            service: Service::Nominatim,
            message: "timed out".to_string(),
        };
        let gis = RetrievalError::Request {
            service: Service::Gisn,
            message: "timed out".to_string(),
        };
        assert_eq!(geocoder.status_code(), 500);
        assert_eq!(gis.status_code(), 503);
        assert_eq!(gis.to_string(), "GISN request failed: timed out");
    }

    #[test]
    fn address_not_found_is_a_geocoder_failure() {
        let err = RetrievalError::AddressNotFound;
        assert_eq!(err.service(), Service::Nominatim);
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("could not locate address"));
    }
}
