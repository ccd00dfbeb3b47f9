#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the safer-route server.
//!
//! Route endpoints are given as `[latitude, longitude]` pairs, the order
//! users and map widgets expect. Handlers convert them to the internal
//! `[longitude, latitude]` order exactly once.

use safer_route_models::{LatLng, LngLat};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/route`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApiRouteRequest {
    /// Start point as `[latitude, longitude]`.
    pub departure: LatLng,
    /// End point as `[latitude, longitude]`.
    pub destination: LatLng,
}

impl ApiRouteRequest {
    /// The endpoints in `[longitude, latitude]` order.
    #[must_use]
    pub fn endpoints(&self) -> (LngLat, LngLat) {
        (self.departure.into(), self.destination.into())
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// User-visible message.
    pub error: String,
}

impl ApiError {
    /// Creates an error body.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_request_is_lat_lng() {
        let request: ApiRouteRequest = serde_json::from_str(
            r#"{"departure": [40.7308, -73.9973], "destination": [40.7484, -73.9857]}"#,
        )
        .unwrap();

        let (departure, destination) = request.endpoints();
        assert_eq!(departure, LngLat::new(-73.9973, 40.7308));
        assert_eq!(destination, LngLat::new(-73.9857, 40.7484));
    }

    #[test]
    fn error_body_shape() {
        let json = serde_json::to_value(ApiError::new("provider returned no route")).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "provider returned no route" }));
    }
}
