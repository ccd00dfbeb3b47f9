#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Shared types for the safer-route engine.
//!
//! Axis order is the main hazard in this system. External interfaces
//! (the directions provider, `GeoJSON`, encoded polylines) use
//! `[longitude, latitude]`, while user-facing input uses
//! `[latitude, longitude]`. The two orders are kept as distinct types,
//! [`LngLat`] and [`LatLng`], and the only conversion between them is the
//! explicit [`From`] impl.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// A WGS84 position in `[longitude, latitude]` order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LngLat {
    /// Longitude in degrees.
    pub lng: f64,
    /// Latitude in degrees.
    pub lat: f64,
}

impl LngLat {
    /// Creates a position from longitude and latitude.
    #[must_use]
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Returns the `[longitude, latitude]` wire representation.
    #[must_use]
    pub const fn to_array(self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    /// Whether both components are finite numbers.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }
}

impl From<[f64; 2]> for LngLat {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self { lng, lat }
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(value: LngLat) -> Self {
        value.to_array()
    }
}

/// A WGS84 position in user-facing `[latitude, longitude]` order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl LatLng {
    /// Creates a position from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for LatLng {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<LatLng> for [f64; 2] {
    fn from(value: LatLng) -> Self {
        [value.lat, value.lng]
    }
}

impl From<LatLng> for LngLat {
    fn from(value: LatLng) -> Self {
        Self {
            lng: value.lng,
            lat: value.lat,
        }
    }
}

impl From<LngLat> for LatLng {
    fn from(value: LngLat) -> Self {
        Self {
            lat: value.lat,
            lng: value.lng,
        }
    }
}

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Whether `point` lies inside the box (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: LngLat) -> bool {
        point.lng >= self.west
            && point.lng <= self.east
            && point.lat >= self.south
            && point.lat <= self.north
    }
}

/// A ranked incident concentration near a route corridor.
///
/// Produced per request by the hotspot query and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Number of complaints recorded at this location.
    pub complaint_count: u32,
    /// Planar distance from the corridor, in degrees.
    pub distance: f64,
}

impl Hotspot {
    /// Returns the hotspot position in `[longitude, latitude]` order.
    #[must_use]
    pub const fn position(&self) -> LngLat {
        LngLat::new(self.longitude, self.latitude)
    }
}

/// Which avoidance pass produced a route.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
pub enum Phase {
    /// Avoids hotspots found along the baseline route.
    #[serde(rename = "Phase 1")]
    #[strum(to_string = "Phase 1")]
    Phase1,
    /// Additionally avoids hotspots found along the Phase 1 route.
    #[serde(rename = "Phase 2")]
    #[strum(to_string = "Phase 2")]
    Phase2,
}

/// Metadata attached to a successfully refined route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvoidanceMetadata {
    /// The pass that produced the route.
    pub phase: Phase,
    /// Total hotspots the route was asked to avoid.
    pub avoided_hotspots: usize,
}

/// A route as returned by the directions provider.
///
/// The body is kept opaque apart from the encoded geometry of the first
/// route, which the router decodes to build the next corridor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderRoute {
    body: serde_json::Value,
}

impl ProviderRoute {
    /// Wraps a provider response body.
    #[must_use]
    pub const fn from_body(body: serde_json::Value) -> Self {
        Self { body }
    }

    /// Returns the encoded polyline of `routes[0].geometry`, if present.
    #[must_use]
    pub fn encoded_geometry(&self) -> Option<&str> {
        self.body
            .get("routes")?
            .get(0)?
            .get("geometry")?
            .as_str()
            .filter(|s| !s.is_empty())
    }

    /// Returns the raw provider body.
    #[must_use]
    pub const fn body(&self) -> &serde_json::Value {
        &self.body
    }

    /// Consumes the route and returns the raw provider body.
    #[must_use]
    pub fn into_body(self) -> serde_json::Value {
        self.body
    }
}

/// A route that went through hotspot avoidance, with its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct SaferRoute {
    /// The provider's route.
    pub route: ProviderRoute,
    /// Which pass produced it and how many hotspots it avoids.
    pub metadata: AvoidanceMetadata,
}

impl SaferRoute {
    /// Renders the route for the calling layer: the provider body with a
    /// top-level `metadata` object set to the avoidance metadata.
    ///
    /// Non-object bodies are wrapped as `{"route": <body>, "metadata": ..}`.
    #[must_use]
    pub fn into_json(self) -> serde_json::Value {
        let metadata = serde_json::json!({
            "phase": self.metadata.phase,
            "avoided_hotspots": self.metadata.avoided_hotspots,
        });

        match self.route.into_body() {
            serde_json::Value::Object(mut map) => {
                map.insert("metadata".to_string(), metadata);
                serde_json::Value::Object(map)
            }
            other => serde_json::json!({ "route": other, "metadata": metadata }),
        }
    }
}

/// Why a route request failed.
///
/// The [`Display`](std::fmt::Display) output is the user-visible error
/// message handed to the calling layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// The provider answered with a non-success HTTP status.
    #[error("{provider} API error: {status} - {body}")]
    Provider {
        /// Provider display name.
        provider: String,
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The request never produced a response (connect failure, timeout, ..).
    #[error("Error processing route request: {message}")]
    Transport {
        /// Transport-level detail.
        message: String,
    },

    /// Avoidance geometry could not be converted to the wire format.
    #[error("Error processing route request: failed to serialize avoidance polygons: {message}")]
    Serialization {
        /// Serializer detail.
        message: String,
    },

    /// The provider answered successfully but without a route geometry.
    #[error("Error processing route request: provider returned no route")]
    NoRoute,

    /// A route geometry could not be decoded into coordinates.
    #[error("Error processing route request: invalid route geometry: {message}")]
    Decode {
        /// Decoder detail.
        message: String,
    },
}

impl RouteError {
    /// Builds a [`RouteError::Provider`], keeping at most `preview_len`
    /// characters of the response body.
    #[must_use]
    pub fn provider(provider: &str, status: u16, body: &str, preview_len: usize) -> Self {
        Self::Provider {
            provider: provider.to_string(),
            status,
            body: body.chars().take(preview_len).collect(),
        }
    }
}

/// Outcome of a routing request: a refined route or an error, never both.
pub type RouteResult = Result<SaferRoute, RouteError>;
