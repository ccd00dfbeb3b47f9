//! The two-phase avoidance router.
//!
//! ```text
//! initial route --decode--> corridor --query--> phase-1 hotspots
//!     --polygons--> phase-1 route --decode--> corridor --query (excluding phase 1)-->
//!     phase-2 hotspots --polygons (phase 1 + phase 2)--> phase-2 route
//! ```
//!
//! A failed Phase-1 request is the final answer. A failed Phase-2 request
//! falls back to the Phase-1 route.

use std::sync::Arc;

use geo::MultiPolygon;
use safer_route_directions::DirectionsProvider;
use safer_route_geometry::polyline::PROVIDER_PRECISION;
use safer_route_geometry::{Corridor, UtmProjection};
use safer_route_hotspots::HotspotQueryService;
use safer_route_models::{
    AvoidanceMetadata, Hotspot, LngLat, Phase, ProviderRoute, RouteError, RouteResult, SaferRoute,
};
use safer_route_spatial::HotspotStore;

use crate::avoidance::{AvoidanceConfig, build_avoid_polygons};
use crate::config::{ConfigError, PhaseConfig, RouterConfig};

/// Plans routes that steer around complaint hotspots.
///
/// Holds only read-only state, so one instance can serve concurrent
/// requests.
pub struct SaferRouter {
    hotspots: HotspotQueryService,
    directions: Arc<dyn DirectionsProvider>,
    projection: UtmProjection,
    phases: PhaseConfig,
    avoidance: AvoidanceConfig,
}

impl SaferRouter {
    /// Creates a router over a hotspot store and a directions provider.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` is invalid, including an
    /// unusable projection.
    pub fn new(
        store: Arc<dyn HotspotStore>,
        directions: Arc<dyn DirectionsProvider>,
        config: &RouterConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let projection = UtmProjection::from_config(&config.projection)?;

        Ok(Self {
            hotspots: HotspotQueryService::new(store, config.ranking, config.search),
            directions,
            projection,
            phases: config.phases,
            avoidance: config.avoidance,
        })
    }

    /// Fetches the unconstrained route between two points and refines it.
    ///
    /// # Errors
    ///
    /// Returns the baseline request's error, or any error of
    /// [`Self::route_from_initial`].
    pub async fn plan(&self, departure: LngLat, destination: LngLat) -> RouteResult {
        let baseline = self.directions.get_route(departure, destination).await?;
        self.route_from_initial(&baseline).await
    }

    /// Refines an already-fetched route in two avoidance passes.
    ///
    /// # Errors
    ///
    /// * [`RouteError::NoRoute`] or [`RouteError::Decode`] if `initial` has
    ///   no usable geometry.
    /// * [`RouteError::Serialization`] if the Phase-1 polygons cannot be
    ///   built.
    /// * The Phase-1 provider error, unchanged.
    ///
    /// Phase-2 failures never surface; the Phase-1 route is returned.
    pub async fn route_from_initial(&self, initial: &ProviderRoute) -> RouteResult {
        let corridor = decode_corridor(initial)?;
        let departure = corridor.departure();
        let destination = corridor.destination();

        let phase1 = self
            .hotspots
            .query_hotspots(&corridor, self.phases.phase1_limit)
            .await;
        log::info!("Phase 1: found {} hotspots to avoid", phase1.len());

        let avoid = self
            .avoid_polygons(&phase1)
            .map_err(|e| RouteError::Serialization {
                message: e.to_string(),
            })?;
        let route = self
            .directions
            .get_route_avoiding(departure, destination, avoid.as_ref())
            .await
            .inspect_err(|e| log::warn!("Phase 1 route request failed: {e}"))?;
        if route.encoded_geometry().is_none() {
            return Err(RouteError::NoRoute);
        }

        let fallback = SaferRoute {
            route,
            metadata: AvoidanceMetadata {
                phase: Phase::Phase1,
                avoided_hotspots: phase1.len(),
            },
        };

        let corridor = match decode_corridor(&fallback.route) {
            Ok(corridor) => corridor,
            Err(e) => {
                log::warn!("Phase 2 skipped, Phase 1 route geometry unusable: {e}");
                return Ok(fallback);
            }
        };

        let phase2 = self
            .hotspots
            .query_additional_hotspots(
                &corridor,
                &phase1,
                self.phases.phase2_limit,
                self.phases.min_exclusion_distance_degrees,
            )
            .await;
        log::info!("Phase 2: found {} additional hotspots", phase2.len());

        let combined: Vec<Hotspot> = phase1.iter().chain(&phase2).copied().collect();
        let avoid = match self.avoid_polygons(&combined) {
            Ok(avoid) => avoid,
            Err(e) => {
                log::warn!("Phase 2 polygons failed, returning Phase 1 route: {e}");
                return Ok(fallback);
            }
        };

        match self
            .directions
            .get_route_avoiding(departure, destination, avoid.as_ref())
            .await
        {
            Ok(route) if route.encoded_geometry().is_some() => Ok(SaferRoute {
                route,
                metadata: AvoidanceMetadata {
                    phase: Phase::Phase2,
                    avoided_hotspots: combined.len(),
                },
            }),
            Ok(_) => {
                log::warn!("Phase 2 returned no route, returning Phase 1 route");
                Ok(fallback)
            }
            Err(e) => {
                log::warn!("Phase 2 route request failed, returning Phase 1 route: {e}");
                Ok(fallback)
            }
        }
    }

    fn avoid_polygons(
        &self,
        hotspots: &[Hotspot],
    ) -> Result<Option<MultiPolygon<f64>>, safer_route_geometry::GeometryError> {
        build_avoid_polygons(hotspots, &self.projection, &self.avoidance)
    }
}

fn decode_corridor(route: &ProviderRoute) -> Result<Corridor, RouteError> {
    let encoded = route.encoded_geometry().ok_or(RouteError::NoRoute)?;
    Corridor::from_encoded(encoded, PROVIDER_PRECISION).map_err(|e| RouteError::Decode {
        message: e.to_string(),
    })
}
