#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared domain types for the `TamaOd` construction-risk pipeline.
//!
//! The pipeline resolves an address to a [`Coordinate`], asks the municipal
//! GIS service for every [`Feature`] within a radius of it, and keeps the
//! ones whose construction stage is flagged as dangerous as
//! [`RiskResult`]s. These types are shared by the geocoder, the feature
//! query, and the pipeline crates so that none of them depends on another
//! for its vocabulary.

mod error;
mod request;

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

pub use error::{ConfigError, RetrievalError, Service, ValidationError};
pub use request::{
    AnalyzeRequest, DEFAULT_RADIUS_METERS, MAX_RADIUS_METERS, MIN_RADIUS_METERS, Radius,
    ValidatedRequest,
};

/// A WGS84 (EPSG:4326) point.
///
/// Always longitude first. Geocoders hand back `lat`/`lon` fields and GIS
/// services disagree on axis order, so every producer converts into this
/// type at its boundary and nothing downstream ever sees a bare tuple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Latitude in decimal degrees.
    pub latitude: f64,
}

impl Coordinate {
    /// Creates a coordinate from a longitude and a latitude, in that order.
    #[must_use]
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Returns `true` when both components are finite and inside the WGS84
    /// longitude/latitude ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.longitude.is_finite()
            && self.latitude.is_finite()
            && (-180.0..=180.0).contains(&self.longitude)
            && (-90.0..=90.0).contains(&self.latitude)
    }

    /// Returns the coordinate as a `(longitude, latitude)` pair.
    #[must_use]
    pub const fn as_lon_lat(&self) -> (f64, f64) {
        (self.longitude, self.latitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.longitude, self.latitude)
    }
}

/// Descriptive attributes of a building record.
///
/// The GIS layer returns a flat JSON object per feature. Values are kept
/// as strings; numbers and booleans are coerced to their textual form and
/// `null` values are dropped on ingest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, String>);

impl Attributes {
    /// Field holding the comma-separated address label(s).
    pub const ADDRESS: &'static str = "addresses";
    /// Field holding the construction-stage label.
    pub const BUILDING_STAGE: &'static str = "building_stage";
    /// Field holding the statutory urban-renewal (TAMA 38) flag.
    pub const TAMA_38: &'static str = "sw_tama_38";

    /// Creates an empty attribute set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Looks up an attribute value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Inserts an attribute, returning the previous value if there was one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// The address label, if present.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.get(Self::ADDRESS)
    }

    /// The construction-stage label, if present.
    #[must_use]
    pub fn building_stage(&self) -> Option<&str> {
        self.get(Self::BUILDING_STAGE)
    }

    /// The TAMA 38 flag, if present.
    #[must_use]
    pub fn tama_38(&self) -> Option<&str> {
        self.get(Self::TAMA_38)
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(Self(
            raw.into_iter()
                .filter_map(|(key, value)| scalar_to_string(value).map(|value| (key, value)))
                .collect(),
        ))
    }
}

fn scalar_to_string(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        other @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
            Some(other.to_string())
        }
    }
}

/// A single `(x, y)` pair in whatever axis order its producer uses.
pub type Position = [f64; 2];

/// An ordered, closed sequence of positions describing a polygon boundary.
pub type Ring = Vec<Position>;

/// Polygon geometry in Esri JSON form (`{ "rings": [...] }`).
///
/// Any other geometry object (a point's `x`/`y`, an empty object, or
/// `"rings": null`) deserializes with no rings and is treated as "no
/// shape". Positions with extra ordinates (`[y, x, z]`, `[y, x, z, m]`)
/// keep their first two values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Geometry {
    /// Polygon rings. Outer and inner rings are not distinguished.
    pub rings: Vec<Ring>,
}

#[derive(Deserialize)]
struct RawGeometry {
    #[serde(default)]
    rings: Option<Vec<Vec<Vec<f64>>>>,
}

impl<'de> Deserialize<'de> for Geometry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawGeometry::deserialize(deserializer)?;
        let rings = raw
            .rings
            .unwrap_or_default()
            .into_iter()
            .map(|ring| {
                ring.into_iter()
                    .map(|position| match position[..] {
                        [a, b, ..] => Ok([a, b]),
                        _ => Err(D::Error::custom(format!(
                            "ring position needs at least 2 ordinates, got {}",
                            position.len()
                        ))),
                    })
                    .collect::<Result<Ring, _>>()
            })
            .collect::<Result<Vec<Ring>, _>>()?;
        Ok(Self { rings })
    }
}

impl Geometry {
    /// Creates a geometry from a set of rings.
    #[must_use]
    pub const fn new(rings: Vec<Ring>) -> Self {
        Self { rings }
    }

    /// Whether the geometry carries at least one ring.
    #[must_use]
    pub fn has_rings(&self) -> bool {
        !self.rings.is_empty()
    }
}

/// Axis order of the positions a feature backend returns in its rings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisOrder {
    /// `[latitude, longitude]`.
    #[default]
    LatLon,
    /// `[longitude, latitude]`.
    LonLat,
}

impl AxisOrder {
    /// Converts a position in this axis order into `[longitude, latitude]`.
    #[must_use]
    pub const fn to_lon_lat(self, position: Position) -> Position {
        match self {
            Self::LatLon => [position[1], position[0]],
            Self::LonLat => position,
        }
    }

    /// Converts every position of a ring into `[longitude, latitude]`.
    #[must_use]
    pub fn ring_to_lon_lat(self, ring: &[Position]) -> Ring {
        ring.iter().map(|&p| self.to_lon_lat(p)).collect()
    }
}

/// Swaps the two axes of every position in a ring.
///
/// Applying it twice returns the original ring.
#[must_use]
pub fn swap_axes(ring: &[Position]) -> Ring {
    ring.iter().map(|&[a, b]| [b, a]).collect()
}

/// One building record returned by a geospatial query.
///
/// Deserializes from either `{ "attributes": {...}, "geometry": {...} }`
/// or a bare attributes object; see [`RawFeature`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    /// Descriptive attributes.
    pub attributes: Attributes,
    /// Polygon geometry in the backend's native axis order, if returned.
    pub geometry: Option<Geometry>,
}

impl Feature {
    /// Creates a feature without geometry.
    #[must_use]
    pub const fn new(attributes: Attributes) -> Self {
        Self {
            attributes,
            geometry: None,
        }
    }

    /// Attaches geometry to the feature.
    #[must_use]
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }
}

/// The shapes a feature may arrive in from upstream.
///
/// Esri query responses wrap attributes and geometry; some fixtures and
/// older payloads carry only the attributes object. The shape is picked
/// by the presence of an `attributes` key, so a wrapped feature with a
/// broken geometry is an error rather than a bare attribute map.
#[derive(Debug, Clone)]
pub enum RawFeature {
    /// `{ "attributes": {...}, "geometry": {...} }`.
    Wrapped {
        /// Descriptive attributes.
        attributes: Attributes,
        /// Optional geometry.
        geometry: Option<Geometry>,
    },
    /// A bare attributes object.
    Bare(Attributes),
}

#[derive(Deserialize)]
struct WrappedFeature {
    attributes: Attributes,
    #[serde(default)]
    geometry: Option<Geometry>,
}

impl<'de> Deserialize<'de> for RawFeature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        if value.get("attributes").is_some() {
            let wrapped: WrappedFeature =
                serde_json::from_value(value).map_err(D::Error::custom)?;
            Ok(Self::Wrapped {
                attributes: wrapped.attributes,
                geometry: wrapped.geometry,
            })
        } else {
            serde_json::from_value(value)
                .map(Self::Bare)
                .map_err(D::Error::custom)
        }
    }
}

impl From<RawFeature> for Feature {
    fn from(raw: RawFeature) -> Self {
        match raw {
            RawFeature::Wrapped {
                attributes,
                geometry,
            } => Self {
                attributes,
                geometry,
            },
            RawFeature::Bare(attributes) => Self::new(attributes),
        }
    }
}

impl<'de> Deserialize<'de> for Feature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawFeature::deserialize(deserializer).map(Into::into)
    }
}

/// A feature flagged as dangerous, ready for a web map.
///
/// `geometry` is always serialized; `null` means no shape is available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    /// The feature's original attributes.
    pub attributes: Attributes,
    /// Polygon rings in `[longitude, latitude]` order.
    pub geometry: Option<Geometry>,
}
