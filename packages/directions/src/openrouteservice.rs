//! `OpenRouteService` directions client.
//!
//! Requests are `POST {base_url}/v2/directions/{profile}` with the API key
//! in the `Authorization` header and a body of the form
//!
//! ```json
//! {
//!   "coordinates": [[lon, lat], [lon, lat]],
//!   "format": "geojson",
//!   "options": { "avoid_polygons": { "type": "MultiPolygon", "coordinates": [...] } }
//! }
//! ```
//!
//! `options` is omitted for unconstrained requests.

use std::time::Duration;

use geo::{CoordsIter, MultiPolygon};
use safer_route_models::{LngLat, ProviderRoute, RouteError};
use serde::Serialize;

use crate::{DirectionsConfig, DirectionsError, DirectionsProvider};

/// HTTP client for the `OpenRouteService` directions API.
pub struct OpenRouteServiceClient {
    api_key: String,
    config: DirectionsConfig,
    client: reqwest::Client,
}

impl OpenRouteServiceClient {
    /// Creates a client with a per-request timeout of
    /// [`DirectionsConfig::timeout_secs`].
    ///
    /// # Errors
    ///
    /// Returns [`DirectionsError::Config`] if `api_key` is empty, or
    /// [`DirectionsError::Http`] if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, config: DirectionsConfig) -> Result<Self, DirectionsError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(DirectionsError::Config {
                message: "API key is empty".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            api_key,
            config,
            client,
        })
    }

    /// The directions endpoint for the configured profile.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v2/directions/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile
        )
    }
}

#[derive(Serialize)]
struct DirectionsRequest {
    coordinates: [[f64; 2]; 2],
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<RequestOptions>,
}

#[derive(Serialize)]
struct RequestOptions {
    avoid_polygons: geojson::Geometry,
}

/// Builds the JSON request body.
///
/// An empty `avoid` collection is treated like `None`.
///
/// # Errors
///
/// Returns [`RouteError::Serialization`] if a polygon has non-finite
/// coordinates or the body cannot be serialized.
pub fn build_request_body(
    departure: LngLat,
    destination: LngLat,
    avoid: Option<&MultiPolygon<f64>>,
) -> Result<serde_json::Value, RouteError> {
    let options = match avoid {
        Some(polygons) if !polygons.0.is_empty() => {
            if polygons.coords_iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
                return Err(RouteError::Serialization {
                    message: "avoidance polygon has non-finite coordinates".to_string(),
                });
            }
            Some(RequestOptions {
                avoid_polygons: geojson::Geometry::new(geojson::Value::from(polygons)),
            })
        }
        _ => None,
    };

    let request = DirectionsRequest {
        coordinates: [departure.to_array(), destination.to_array()],
        format: "geojson",
        options,
    };

    serde_json::to_value(&request).map_err(|e| RouteError::Serialization {
        message: e.to_string(),
    })
}

/// Maps a provider response to a route or an error.
///
/// # Errors
///
/// Returns [`RouteError::Provider`] for a non-success `status`, with the
/// body truncated to [`DirectionsConfig::error_body_preview_len`]
/// characters, and [`RouteError::Transport`] if a success body is not JSON.
pub fn parse_response(
    status: u16,
    body: &str,
    config: &DirectionsConfig,
) -> Result<ProviderRoute, RouteError> {
    if !(200..300).contains(&status) {
        return Err(RouteError::provider(
            &config.provider_name,
            status,
            body,
            config.error_body_preview_len,
        ));
    }

    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| RouteError::Transport {
            message: format!("invalid {} response: {e}", config.provider_name),
        })?;

    Ok(ProviderRoute::from_body(value))
}

fn transport_error(e: &reqwest::Error, timeout_secs: u64) -> RouteError {
    let message = if e.is_timeout() {
        format!("request timed out after {timeout_secs}s")
    } else {
        e.to_string()
    };
    RouteError::Transport { message }
}

#[async_trait::async_trait]
impl DirectionsProvider for OpenRouteServiceClient {
    async fn get_route_avoiding(
        &self,
        departure: LngLat,
        destination: LngLat,
        avoid: Option<&MultiPolygon<f64>>,
    ) -> Result<ProviderRoute, RouteError> {
        let body = build_request_body(departure, destination, avoid)?;

        log::debug!(
            "Requesting {} route with {} avoidance polygons",
            self.config.profile,
            avoid.map_or(0, |p| p.0.len())
        );

        let resp = self
            .client
            .post(self.endpoint())
            .header("Authorization", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(&e, self.config.timeout_secs))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| transport_error(&e, self.config.timeout_secs))?;

        if !status.is_success() {
            log::warn!(
                "{} returned HTTP {status} for a {} request",
                self.config.provider_name,
                self.config.profile
            );
        }

        parse_response(status.as_u16(), &text, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, Polygon};

    fn square(lng: f64, lat: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (lng, lat),
                (lng + 0.001, lat),
                (lng + 0.001, lat + 0.001),
                (lng, lat + 0.001),
                (lng, lat),
            ]),
            vec![],
        )
    }

    #[test]
    fn unconstrained_body_has_no_options() {
        let body = build_request_body(
            LngLat::new(-73.99, 40.73),
            LngLat::new(-73.98, 40.75),
            None,
        )
        .unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "coordinates": [[-73.99, 40.73], [-73.98, 40.75]],
                "format": "geojson",
            })
        );
    }

    #[test]
    fn avoid_polygons_are_geojson_multipolygon() {
        let polygons = MultiPolygon::new(vec![square(-73.99, 40.74), square(-73.98, 40.74)]);
        let body = build_request_body(
            LngLat::new(-73.99, 40.73),
            LngLat::new(-73.98, 40.75),
            Some(&polygons),
        )
        .unwrap();

        let avoid = &body["options"]["avoid_polygons"];
        assert_eq!(avoid["type"], "MultiPolygon");
        let coords = avoid["coordinates"].as_array().unwrap();
        assert_eq!(coords.len(), 2);
        // polygon -> first ring -> first position, in [lon, lat] order
        assert_eq!(coords[0][0][0], serde_json::json!([-73.99, 40.74]));
    }

    #[test]
    fn empty_avoidance_is_unconstrained() {
        let polygons = MultiPolygon::<f64>::new(vec![]);
        let body = build_request_body(
            LngLat::new(-73.99, 40.73),
            LngLat::new(-73.98, 40.75),
            Some(&polygons),
        )
        .unwrap();
        assert!(body.get("options").is_none());
    }

    #[test]
    fn non_finite_polygon_is_a_serialization_error() {
        let polygons = MultiPolygon::new(vec![square(f64::NAN, 40.74)]);
        let err = build_request_body(
            LngLat::new(-73.99, 40.73),
            LngLat::new(-73.98, 40.75),
            Some(&polygons),
        )
        .unwrap_err();

        assert!(matches!(err, RouteError::Serialization { .. }));
        assert!(
            err.to_string()
                .starts_with("Error processing route request: failed to serialize")
        );
    }

    #[test]
    fn non_success_status_maps_to_provider_error() {
        let config = DirectionsConfig::default();
        let body = format!("{{\"error\":\"{}\"}}", "y".repeat(400));
        let err = parse_response(404, &body, &config).unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("OpenRouteService API error: 404 - {\"error\":"));
        let preview = message.trim_start_matches("OpenRouteService API error: 404 - ");
        assert_eq!(preview.chars().count(), 200);
    }

    #[test]
    fn success_body_is_kept_opaque() {
        let config = DirectionsConfig::default();
        let route = parse_response(
            200,
            r#"{"routes":[{"geometry":"_p~iF~ps|U","summary":{"distance":812.4}}]}"#,
            &config,
        )
        .unwrap();

        assert_eq!(route.encoded_geometry(), Some("_p~iF~ps|U"));
        assert_eq!(route.body()["routes"][0]["summary"]["distance"], 812.4);
    }

    #[test]
    fn malformed_success_body_is_transport_error() {
        let err = parse_response(200, "<html>", &DirectionsConfig::default()).unwrap_err();
        assert!(matches!(err, RouteError::Transport { .. }));
    }

    #[test]
    fn endpoint_includes_profile() {
        let client = OpenRouteServiceClient::new(
            "key",
            DirectionsConfig {
                base_url: "https://ors.example.com/".to_string(),
                ..DirectionsConfig::default()
            },
        )
        .unwrap();
        assert_eq!(
            client.endpoint(),
            "https://ors.example.com/v2/directions/foot-walking"
        );
    }

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(matches!(
            OpenRouteServiceClient::new("  ", DirectionsConfig::default()),
            Err(DirectionsError::Config { .. })
        ));
    }

    #[tokio::test]
    async fn unreachable_provider_is_transport_error() {
        let client = OpenRouteServiceClient::new(
            "key",
            DirectionsConfig {
                base_url: "http://127.0.0.1:1".to_string(),
                timeout_secs: 5,
                ..DirectionsConfig::default()
            },
        )
        .unwrap();

        let err = client
            .get_route(LngLat::new(-73.99, 40.73), LngLat::new(-73.98, 40.75))
            .await
            .unwrap_err();

        assert!(matches!(err, RouteError::Transport { .. }));
        assert!(err.to_string().starts_with("Error processing route request: "));
    }
}
