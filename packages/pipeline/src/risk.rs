//! Risk filter: keeps buildings in a dangerous construction stage.
//!
//! A feature is dangerous iff its `building_stage` attribute exactly
//! matches one of [`DANGEROUS_STAGES`]. Dangerous features keep their
//! attributes untouched; their polygon rings are converted into
//! `[longitude, latitude]` order for the map. Input order is preserved.

use tamaod_models::{AxisOrder, Feature, Geometry, RiskResult};

/// Stage label of a building under active construction.
pub const UNDER_CONSTRUCTION: &str = "בבניה";

/// Construction stages flagged as elevated risk.
pub const DANGEROUS_STAGES: &[&str] = &[UNDER_CONSTRUCTION];

/// Stage predicate plus the axis convention of the incoming rings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskFilter {
    stages: Vec<String>,
    ring_axis_order: AxisOrder,
}

impl Default for RiskFilter {
    fn default() -> Self {
        Self::new(AxisOrder::default())
    }
}

impl RiskFilter {
    /// Filter over [`DANGEROUS_STAGES`] for rings in `ring_axis_order`.
    #[must_use]
    pub fn new(ring_axis_order: AxisOrder) -> Self {
        Self {
            stages: DANGEROUS_STAGES.iter().map(ToString::to_string).collect(),
            ring_axis_order,
        }
    }

    /// Replaces the flagged stage set.
    #[must_use]
    pub fn with_stages<I, S>(mut self, stages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stages = stages.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `feature` is in a flagged stage.
    #[must_use]
    pub fn is_dangerous(&self, feature: &Feature) -> bool {
        feature
            .attributes
            .building_stage()
            .is_some_and(|stage| self.stages.iter().any(|s| s == stage))
    }

    /// Returns one [`RiskResult`] per dangerous feature, in input order.
    #[must_use]
    pub fn assess(&self, features: &[Feature]) -> Vec<RiskResult> {
        features
            .iter()
            .filter(|feature| self.is_dangerous(feature))
            .map(|feature| RiskResult {
                attributes: feature.attributes.clone(),
                geometry: self.convert_geometry(feature.geometry.as_ref()),
            })
            .collect()
    }

    /// `None` unless the geometry carries at least one ring.
    fn convert_geometry(&self, geometry: Option<&Geometry>) -> Option<Geometry> {
        let geometry = geometry.filter(|g| g.has_rings())?;
        Some(Geometry::new(
            geometry
                .rings
                .iter()
                .map(|ring| self.ring_axis_order.ring_to_lon_lat(ring))
                .collect(),
        ))
    }
}

/// Runs the default filter over features whose rings are `[lat, lon]`.
#[must_use]
pub fn assess(features: &[Feature]) -> Vec<RiskResult> {
    RiskFilter::default().assess(features)
}
