//! `ArcGIS` `MapServer` layer query for buildings around a point.
//!
//! Sends a single point-buffer query (`esriSpatialRelIntersects` with a
//! `distance`) and returns the `features` array. Unlike bulk layer
//! downloads there is no pagination: a radius of at most 5 km around one
//! address stays well below the layer's transfer limit.

use tamaod_models::{AxisOrder, ConfigError, Coordinate, Feature, Radius, RetrievalError, Service};

use crate::{AreaFeatureQuery, GisnConfig};

/// Feature query backed by the live GISN layer.
pub struct GisnQuery {
    client: reqwest::Client,
    config: GisnConfig,
}

impl GisnQuery {
    /// Creates a query client with its own HTTP client.
    #[must_use]
    pub fn new(config: GisnConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Creates a query client configured from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the `GISN_URL` override is unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(GisnConfig::from_env()?))
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &GisnConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl AreaFeatureQuery for GisnQuery {
    async fn fetch(
        &self,
        coordinate: Coordinate,
        radius: Radius,
    ) -> Result<Vec<Feature>, RetrievalError> {
        let params = query_params(&self.config, coordinate, radius);
        log::debug!(
            "GISN: querying {} around {coordinate} within {radius} m",
            self.config.query_url
        );

        let resp = self
            .client
            .get(&self.config.query_url)
            .query(&params)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(request_failed)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail = match body.trim() {
                "" => status.canonical_reason().unwrap_or("Unknown").to_string(),
                text => text.to_string(),
            };
            return Err(RetrievalError::Status {
                service: Service::Gisn,
                status: status.as_u16(),
                detail,
            });
        }

        let body = resp.text().await.map_err(request_failed)?;
        parse_response(&body)
    }

    fn ring_axis_order(&self) -> AxisOrder {
        self.config.ring_axis_order
    }

    fn label(&self) -> &'static str {
        "gisn"
    }
}

fn request_failed(e: reqwest::Error) -> RetrievalError {
    RetrievalError::Request {
        service: Service::Gisn,
        message: e.to_string(),
    }
}

/// Builds the layer query parameters for a point-buffer search.
#[must_use]
pub fn query_params(
    config: &GisnConfig,
    coordinate: Coordinate,
    radius: Radius,
) -> Vec<(&'static str, String)> {
    let geometry = serde_json::json!({
        "x": coordinate.longitude,
        "y": coordinate.latitude,
    });

    vec![
        ("where", "1=1".to_string()),
        ("geometry", geometry.to_string()),
        ("geometryType", "esriGeometryPoint".to_string()),
        ("inSR", config.in_sr.to_string()),
        ("spatialRel", "esriSpatialRelIntersects".to_string()),
        ("distance", radius.meters().to_string()),
        ("units", config.distance_units.clone()),
        ("outFields", config.out_fields.join(",")),
        ("returnGeometry", config.return_geometry.to_string()),
        ("outSR", config.out_sr.to_string()),
        ("f", "json".to_string()),
    ]
}

/// Parses a layer query response body into features.
///
/// Accepts the standard `{ "features": [...] }` object as well as a bare
/// array of features. An object without a `features` key means no
/// buildings matched and yields an empty list.
///
/// # Errors
///
/// * [`RetrievalError::Status`] if the body is an `ArcGIS` error object
///   (the server reports those with HTTP 200).
/// * [`RetrievalError::InvalidResponse`] if the body is not JSON or the
///   features are not in a recognised shape.
pub fn parse_response(body: &str) -> Result<Vec<Feature>, RetrievalError> {
    let invalid = |message: String| RetrievalError::InvalidResponse {
        service: Service::Gisn,
        message,
    };

    let json: serde_json::Value = serde_json::from_str(body).map_err(|e| invalid(e.to_string()))?;

    if let Some(error) = json.get("error") {
        let status = error
            .get("code")
            .and_then(serde_json::Value::as_u64)
            .and_then(|code| u16::try_from(code).ok())
            .unwrap_or(500);
        let message = error
            .get("message")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unknown error");
        return Err(RetrievalError::Status {
            service: Service::Gisn,
            status,
            detail: message.to_string(),
        });
    }

    let features = match json {
        serde_json::Value::Array(items) => serde_json::Value::Array(items),
        serde_json::Value::Object(mut map) => match map.remove("features") {
            Some(serde_json::Value::Null) | None => {
                log::warn!("GISN: response has no 'features' key, treating as empty");
                return Ok(Vec::new());
            }
            Some(features) => features,
        },
        other => return Err(invalid(format!("unexpected response type: {other}"))),
    };

    let features: Vec<Feature> =
        serde_json::from_value(features).map_err(|e| invalid(e.to_string()))?;
    log::debug!("GISN: {} feature(s) in radius", features.len());
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tamaod_models::Geometry;

    #[test]
    fn parses_wrapped_features_in_order() {
        let body = serde_json::json!({
            "features": [
                { "attributes": { "addresses": "מרכז בעלי מלאכה 19א", "building_stage": "קיים היתר", "sw_tama_38": "כן" } },
                {
                    "attributes": { "addresses": "העבודה 19", "building_stage": "בבניה", "sw_tama_38": "כן" },
                    "geometry": { "rings": [[[32.07, 34.77], [32.08, 34.78], [32.07, 34.77]]] }
                }
            ]
        })
        .to_string();

        let features = parse_response(&body).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].attributes.address(), Some("מרכז בעלי מלאכה 19א"));
        assert!(features[0].geometry.is_none());
        assert_eq!(
            features[1].geometry,
            Some(Geometry::new(vec![vec![
                [32.07, 34.77],
                [32.08, 34.78],
                [32.07, 34.77]
            ]]))
        );
    }

    #[test]
    fn empty_features_is_empty() {
        assert!(parse_response(r#"{"features": []}"#).unwrap().is_empty());
    }

    #[test]
    fn missing_features_key_is_empty() {
        assert!(
            parse_response(r#"{"some_other_key": "value"}"#)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn bare_array_is_accepted() {
        let features =
            parse_response(r#"[{"attributes": {"building_stage": "בבניה"}}, {"building_stage": "קיים היתר"}]"#)
                .unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[1].attributes.building_stage(), Some("קיים היתר"));
    }

    #[test]
    fn wrapped_feature_keeps_stage_with_odd_geometry() {
        for geometry in [
            r#"{"rings": [[[32.07, 34.77, 0.0], [32.08, 34.78, 0.0]]]}"#,
            r#"{"rings": null}"#,
        ] {
            let body = format!(
                r#"{{"features": [{{"attributes": {{"addresses": "העבודה 19", "building_stage": "בבניה"}}, "geometry": {geometry}}}]}}"#
            );
            let features = parse_response(&body).unwrap();
            assert_eq!(features.len(), 1);
            assert_eq!(features[0].attributes.building_stage(), Some("בבניה"));
            assert_eq!(features[0].attributes.address(), Some("העבודה 19"));
            assert_eq!(features[0].attributes.get("attributes"), None);
        }
    }

    #[test]
    fn unreadable_ring_position_is_invalid_response() {
        let err = parse_response(
            r#"{"features": [{"attributes": {"building_stage": "בבניה"}, "geometry": {"rings": [[[32.07]]]}}]}"#,
        )
        .unwrap_err();
        assert!(
            matches!(err, RetrievalError::InvalidResponse { .. }),
            "{err:?}"
        );
    }

    #[test]
    fn arcgis_error_object_is_a_status_error() {
        let err = parse_response(
            r#"{"error": {"code": 400, "message": "Unable to complete operation.", "details": []}}"#,
        )
        .unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(
            err.to_string(),
            "GISN API error: 400 Unable to complete operation."
        );
    }

    #[test]
    fn malformed_body_is_invalid_response() {
        for body in ["<html>busy</html>", "42", r#"{"features": "nope"}"#] {
            let err = parse_response(body).unwrap_err();
            assert!(
                matches!(err, RetrievalError::InvalidResponse { .. }),
                "unexpected error for {body}: {err:?}"
            );
        }
    }

    #[test]
    fn params_describe_point_buffer_query() {
        let config = GisnConfig::default();
        let params = query_params(
            &config,
            Coordinate::new(34.773_591, 32.069_882),
            Radius::new(100).unwrap(),
        );
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("geometry"), Some(r#"{"x":34.773591,"y":32.069882}"#));
        assert_eq!(get("geometryType"), Some("esriGeometryPoint"));
        assert_eq!(get("spatialRel"), Some("esriSpatialRelIntersects"));
        assert_eq!(get("distance"), Some("100"));
        assert_eq!(get("units"), Some("esriSRUnit_Meter"));
        assert_eq!(get("outFields"), Some("addresses,building_stage,sw_tama_38"));
        assert_eq!(get("inSR"), Some("4326"));
        assert_eq!(get("outSR"), Some("4326"));
        assert_eq!(get("f"), Some("json"));
    }
}
