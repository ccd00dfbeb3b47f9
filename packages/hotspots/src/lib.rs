#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Ranked hotspot queries along route corridors.
//!
//! [`HotspotQueryService`] asks a [`HotspotStore`] for significant incident
//! locations near a corridor, ranks them with [`ranking::score`], and keeps
//! the top `limit`. The second routing pass uses
//! [`HotspotQueryService::query_additional_hotspots`], which also drops
//! candidates close to hotspots already avoided.
//!
//! Store failures and timeouts are logged and yield no hotspots.

pub mod ranking;

use std::sync::Arc;
use std::time::Duration;

use safer_route_geometry::Corridor;
use safer_route_models::Hotspot;
use safer_route_spatial::HotspotStore;
use serde::{Deserialize, Serialize};

pub use ranking::RankingConfig;

/// How far from a corridor to look, and how long to wait for the store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum corridor distance of a candidate, in degrees.
    pub search_radius_degrees: f64,
    /// Upper bound on a single store query, in milliseconds.
    pub query_timeout_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            search_radius_degrees: 0.01,
            query_timeout_ms: 5_000,
        }
    }
}

/// Ranked hotspot lookups over a shared, read-only store.
#[derive(Clone)]
pub struct HotspotQueryService {
    store: Arc<dyn HotspotStore>,
    ranking: RankingConfig,
    search: SearchConfig,
}

impl HotspotQueryService {
    /// Creates a service over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn HotspotStore>, ranking: RankingConfig, search: SearchConfig) -> Self {
        Self {
            store,
            ranking,
            search,
        }
    }

    /// Returns at most `limit` hotspots near `corridor`, best score first.
    ///
    /// Never fails: a store error or timeout yields an empty list.
    pub async fn query_hotspots(&self, corridor: &Corridor, limit: usize) -> Vec<Hotspot> {
        let candidates = self.fetch_candidates(corridor).await;
        ranking::select_hotspots(candidates, &[], limit, 0.0, &self.ranking)
    }

    /// Like [`Self::query_hotspots`], but drops every candidate within
    /// `min_exclusion_distance` degrees of a hotspot in `exclude`.
    ///
    /// Never fails: a store error or timeout yields an empty list.
    pub async fn query_additional_hotspots(
        &self,
        corridor: &Corridor,
        exclude: &[Hotspot],
        limit: usize,
        min_exclusion_distance: f64,
    ) -> Vec<Hotspot> {
        let candidates = self.fetch_candidates(corridor).await;
        ranking::select_hotspots(
            candidates,
            exclude,
            limit,
            min_exclusion_distance,
            &self.ranking,
        )
    }

    async fn fetch_candidates(&self, corridor: &Corridor) -> Vec<Hotspot> {
        let timeout = Duration::from_millis(self.search.query_timeout_ms);
        let query = self.store.near_corridor(
            corridor,
            self.ranking.min_complaint_count,
            self.search.search_radius_degrees,
        );

        match tokio::time::timeout(timeout, query).await {
            Ok(Ok(candidates)) => {
                log::debug!(
                    "Hotspot store returned {} candidates for a {}-point corridor",
                    candidates.len(),
                    corridor.len()
                );
                candidates
            }
            Ok(Err(e)) => {
                log::error!("Hotspot query failed, continuing without avoidance: {e}");
                Vec::new()
            }
            Err(_) => {
                log::warn!(
                    "Hotspot query timed out after {timeout:?}, continuing without avoidance"
                );
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use safer_route_models::LngLat;
    use safer_route_spatial::{IncidentIndex, SpatialError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingStore {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl HotspotStore for FailingStore {
        async fn near_corridor(
            &self,
            _corridor: &Corridor,
            _min_complaint_count: u32,
            _search_radius: f64,
        ) -> Result<Vec<Hotspot>, SpatialError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(SpatialError::Unavailable {
                message: "connection refused".to_string(),
            })
        }
    }

    struct SlowStore;

    #[async_trait::async_trait]
    impl HotspotStore for SlowStore {
        async fn near_corridor(
            &self,
            _corridor: &Corridor,
            _min_complaint_count: u32,
            _search_radius: f64,
        ) -> Result<Vec<Hotspot>, SpatialError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![Hotspot {
                latitude: 40.75,
                longitude: -74.0,
                complaint_count: 50,
                distance: 0.0,
            }])
        }
    }

    fn corridor() -> Corridor {
        Corridor::from_points(&[LngLat::new(-74.00, 40.70), LngLat::new(-74.00, 40.80)]).unwrap()
    }

    fn service(store: Arc<dyn HotspotStore>) -> HotspotQueryService {
        HotspotQueryService::new(store, RankingConfig::default(), SearchConfig::default())
    }

    #[tokio::test]
    async fn ranks_and_limits_index_results() {
        let index = IncidentIndex::from_points([
            (LngLat::new(-74.0005, 40.72), 10),
            (LngLat::new(-74.0080, 40.74), 90),
            (LngLat::new(-74.0010, 40.76), 40),
            (LngLat::new(-74.0010, 40.78), 3),
        ]);
        let hotspots = service(Arc::new(index)).query_hotspots(&corridor(), 2).await;

        // The close moderate hotspots outrank the far extreme one.
        assert_eq!(hotspots.len(), 2);
        assert_eq!(hotspots[0].complaint_count, 40);
        assert_eq!(hotspots[1].complaint_count, 10);
    }

    #[tokio::test]
    async fn store_failure_degrades_to_empty() {
        let store = Arc::new(FailingStore {
            calls: AtomicUsize::new(0),
        });
        let svc = service(store.clone());

        assert!(svc.query_hotspots(&corridor(), 7).await.is_empty());
        assert!(
            svc.query_additional_hotspots(&corridor(), &[], 7, 0.005)
                .await
                .is_empty()
        );
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn store_timeout_degrades_to_empty() {
        let svc = HotspotQueryService::new(
            Arc::new(SlowStore),
            RankingConfig::default(),
            SearchConfig {
                query_timeout_ms: 250,
                ..SearchConfig::default()
            },
        );
        assert!(svc.query_hotspots(&corridor(), 7).await.is_empty());
    }

    #[tokio::test]
    async fn additional_query_skips_points_near_excluded() {
        let index = IncidentIndex::from_points([
            (LngLat::new(-74.0005, 40.72), 30),
            (LngLat::new(-74.0005, 40.722), 25),
            (LngLat::new(-74.0005, 40.76), 12),
        ]);
        let svc = service(Arc::new(index));

        let first = svc.query_hotspots(&corridor(), 1).await;
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].complaint_count, 30);

        let second = svc
            .query_additional_hotspots(&corridor(), &first, 7, 0.005)
            .await;
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].complaint_count, 12);
    }
}
