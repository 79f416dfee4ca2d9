//! Analyze request input and its validation.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::ValidationError;

/// Smallest accepted search radius.
pub const MIN_RADIUS_METERS: u32 = 10;
/// Largest accepted search radius.
pub const MAX_RADIUS_METERS: u32 = 5000;
/// Radius used when the caller does not supply one.
pub const DEFAULT_RADIUS_METERS: u32 = 100;

/// A search radius in meters, guaranteed to be within
/// [`MIN_RADIUS_METERS`]..=[`MAX_RADIUS_METERS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Radius(u32);

impl Radius {
    /// Validates a radius in meters.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::RadiusOutOfRange`] if `meters` is outside
    /// the accepted range.
    pub fn new(meters: i64) -> Result<Self, ValidationError> {
        u32::try_from(meters)
            .ok()
            .filter(|m| (MIN_RADIUS_METERS..=MAX_RADIUS_METERS).contains(m))
            .map(Self)
            .ok_or(ValidationError::RadiusOutOfRange {
                value: meters,
                min: MIN_RADIUS_METERS,
                max: MAX_RADIUS_METERS,
            })
    }

    /// The radius in meters.
    #[must_use]
    pub const fn meters(self) -> u32 {
        self.0
    }
}

impl Default for Radius {
    fn default() -> Self {
        Self(DEFAULT_RADIUS_METERS)
    }
}

impl TryFrom<i64> for Radius {
    type Error = ValidationError;

    fn try_from(meters: i64) -> Result<Self, Self::Error> {
        Self::new(meters)
    }
}

impl fmt::Display for Radius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw analyze input, as a client would post it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// Street name.
    pub street: Option<String>,
    /// House number; clients send it either as a string or a number.
    #[serde(default, deserialize_with = "string_or_number")]
    pub house_number: Option<String>,
    /// Search radius in meters.
    pub radius: Option<i64>,
}

/// Input that passed [`AnalyzeRequest::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    /// Trimmed street name.
    pub street: String,
    /// Trimmed house number, containing at least one digit.
    pub house_number: String,
    /// Search radius.
    pub radius: Radius,
}

impl AnalyzeRequest {
    /// Checks the request and produces pipeline-ready input.
    ///
    /// Alphanumeric house numbers such as `10A` are accepted. A missing
    /// radius falls back to [`DEFAULT_RADIUS_METERS`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for a blank street, a blank or digitless
    /// house number, or an out-of-range radius.
    pub fn validate(&self) -> Result<ValidatedRequest, ValidationError> {
        let street = self
            .street
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ValidationError::MissingStreet)?;

        let house_number = self
            .house_number
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ValidationError::MissingHouseNumber)?;

        if !house_number.chars().any(|c| c.is_ascii_digit()) {
            return Err(ValidationError::HouseNumberWithoutDigit);
        }

        let radius = self.radius.map_or_else(|| Ok(Radius::default()), Radius::new)?;

        Ok(ValidatedRequest {
            street: street.to_string(),
            house_number: house_number.to_string(),
            radius,
        })
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(
        match Option::<serde_json::Value>::deserialize(deserializer)? {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        },
    )
}
