#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Walking-directions provider abstraction.
//!
//! [`DirectionsProvider`] is the seam the router talks to. The only
//! production implementation is [`openrouteservice::OpenRouteServiceClient`].
//!
//! Providers report every failure as a [`RouteError`] value. A failed
//! constrained request is never retried without its avoidance polygons;
//! falling back is the router's decision.

pub mod openrouteservice;

use geo::MultiPolygon;
use safer_route_models::{LngLat, ProviderRoute, RouteError};
use serde::{Deserialize, Serialize};

pub use openrouteservice::OpenRouteServiceClient;

/// Errors constructing a provider client.
#[derive(Debug, thiserror::Error)]
pub enum DirectionsError {
    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// A required setting is missing or invalid.
    #[error("Invalid directions configuration: {message}")]
    Config {
        /// What was wrong.
        message: String,
    },
}

/// Provider connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionsConfig {
    /// Name used in error messages.
    pub provider_name: String,
    /// API root, without a trailing slash.
    pub base_url: String,
    /// Routing profile, e.g. `foot-walking`.
    pub profile: String,
    /// Upper bound on one request, in seconds.
    pub timeout_secs: u64,
    /// Characters of an error response body kept in the error message.
    pub error_body_preview_len: usize,
}

impl Default for DirectionsConfig {
    fn default() -> Self {
        Self {
            provider_name: "OpenRouteService".to_string(),
            base_url: "https://api.openrouteservice.org".to_string(),
            profile: "foot-walking".to_string(),
            timeout_secs: 30,
            error_body_preview_len: 200,
        }
    }
}

/// A directions service that can route around polygons.
#[async_trait::async_trait]
pub trait DirectionsProvider: Send + Sync {
    /// Requests the unconstrained route from `departure` to `destination`.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] describing the provider or transport failure.
    async fn get_route(
        &self,
        departure: LngLat,
        destination: LngLat,
    ) -> Result<ProviderRoute, RouteError> {
        self.get_route_avoiding(departure, destination, None).await
    }

    /// Requests a route that avoids `avoid`, or an unconstrained one when
    /// `avoid` is `None`.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] describing the provider, transport, or
    /// serialization failure.
    async fn get_route_avoiding(
        &self,
        departure: LngLat,
        destination: LngLat,
        avoid: Option<&MultiPolygon<f64>>,
    ) -> Result<ProviderRoute, RouteError>;
}
