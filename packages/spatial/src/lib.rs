#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Incident store for hotspot lookups along route corridors.
//!
//! [`HotspotStore`] is the narrow interface the hotspot query service needs
//! from a spatial data store: every significant incident location within a
//! search radius of a corridor, with its distance. [`IncidentIndex`] is the
//! in-memory implementation. It loads geo-tagged complaint points from
//! `GeoJSON` at startup, builds an R-tree, and answers corridor queries
//! with an envelope pre-filter followed by an exact point-to-line distance.
//!
//! Distances are planar degrees, the same unit a geographic-SRID spatial
//! database reports for `ST_Distance` on geometries.

use std::path::Path;

use geo::{BoundingRect, Closest, ClosestPoint, Point};
use geojson::GeoJson;
use rstar::{AABB, RTree, RTreeObject};
use safer_route_geometry::Corridor;
use safer_route_models::{Hotspot, LngLat};
use thiserror::Error;

/// Property holding the complaint count on each incident feature.
pub const COMPLAINT_COUNT_PROPERTY: &str = "complaint_count";

/// Errors from spatial store operations.
#[derive(Debug, Error)]
pub enum SpatialError {
    /// Reading the incident file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The incident file is not usable `GeoJSON`.
    #[error("GeoJSON error: {message}")]
    GeoJson {
        /// Description of the parsing failure.
        message: String,
    },

    /// The backing store could not answer the query.
    #[error("Spatial store unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },
}

/// A spatial store of incident locations.
#[async_trait::async_trait]
pub trait HotspotStore: Send + Sync {
    /// Returns every incident location with at least `min_complaint_count`
    /// complaints lying within `search_radius` degrees of `corridor`, with
    /// [`Hotspot::distance`] set to its distance from the corridor.
    ///
    /// Results are unordered; ranking and limits are the caller's concern.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError`] if the store cannot be queried.
    async fn near_corridor(
        &self,
        corridor: &Corridor,
        min_complaint_count: u32,
        search_radius: f64,
    ) -> Result<Vec<Hotspot>, SpatialError>;
}

/// An incident location stored in the R-tree.
#[derive(Debug, Clone, Copy)]
struct IncidentEntry {
    /// `[longitude, latitude]`
    location: [f64; 2],
    complaint_count: u32,
}

impl RTreeObject for IncidentEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.location)
    }
}

/// In-memory R-tree of incident locations.
///
/// Constructed once and shared read-only across requests.
pub struct IncidentIndex {
    incidents: RTree<IncidentEntry>,
}

impl IncidentIndex {
    /// Builds an index from `(position, complaint_count)` pairs.
    ///
    /// Positions with non-finite coordinates are skipped.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = (LngLat, u32)>) -> Self {
        let entries: Vec<IncidentEntry> = points
            .into_iter()
            .filter(|(position, _)| position.is_finite())
            .map(|(position, complaint_count)| IncidentEntry {
                location: position.to_array(),
                complaint_count,
            })
            .collect();

        Self {
            incidents: RTree::bulk_load(entries),
        }
    }

    /// Loads incident points from a `GeoJSON` file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a `GeoJSON`
    /// `FeatureCollection`.
    pub fn load_geojson(path: &Path) -> Result<Self, SpatialError> {
        let contents = std::fs::read_to_string(path)?;
        let index = Self::from_geojson_str(&contents)?;
        log::info!(
            "Loaded {} incident locations into spatial index from {}",
            index.len(),
            path.display()
        );
        Ok(index)
    }

    /// Parses a `GeoJSON` `FeatureCollection` of `Point` features.
    ///
    /// Each feature's [`COMPLAINT_COUNT_PROPERTY`] gives its complaint
    /// count; features without one count as a single complaint. Features
    /// that are not points are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::GeoJson`] if the input is not a
    /// `FeatureCollection`.
    pub fn from_geojson_str(contents: &str) -> Result<Self, SpatialError> {
        let geojson: GeoJson = contents.parse().map_err(|e| SpatialError::GeoJson {
            message: format!("{e}"),
        })?;

        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(SpatialError::GeoJson {
                message: "expected a FeatureCollection".to_string(),
            });
        };

        let mut points = Vec::with_capacity(collection.features.len());
        let mut skipped = 0usize;

        for feature in &collection.features {
            let Some(position) = feature.geometry.as_ref().and_then(parse_point) else {
                skipped += 1;
                continue;
            };

            let complaint_count = feature
                .property(COMPLAINT_COUNT_PROPERTY)
                .and_then(parse_complaint_count)
                .unwrap_or(1);

            points.push((position, complaint_count));
        }

        if skipped > 0 {
            log::warn!("Skipped {skipped} incident features without a valid point geometry");
        }

        Ok(Self::from_points(points))
    }

    /// Number of indexed incident locations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.incidents.size()
    }

    /// Whether the index holds no incidents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.incidents.size() == 0
    }

    /// Synchronous form of [`HotspotStore::near_corridor`].
    #[must_use]
    pub fn query_corridor(
        &self,
        corridor: &Corridor,
        min_complaint_count: u32,
        search_radius: f64,
    ) -> Vec<Hotspot> {
        let envelope = compute_envelope(corridor, search_radius);

        self.incidents
            .locate_in_envelope(&envelope)
            .filter(|entry| entry.complaint_count >= min_complaint_count)
            .filter_map(|entry| {
                let [lng, lat] = entry.location;
                let distance = distance_to_corridor(Point::new(lng, lat), corridor);
                (distance <= search_radius).then_some(Hotspot {
                    latitude: lat,
                    longitude: lng,
                    complaint_count: entry.complaint_count,
                    distance,
                })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl HotspotStore for IncidentIndex {
    async fn near_corridor(
        &self,
        corridor: &Corridor,
        min_complaint_count: u32,
        search_radius: f64,
    ) -> Result<Vec<Hotspot>, SpatialError> {
        Ok(self.query_corridor(corridor, min_complaint_count, search_radius))
    }
}

/// Planar distance in degrees from `point` to the nearest point of the
/// corridor.
///
/// A corridor with no segment of non-zero length is measured from its
/// departure.
fn distance_to_corridor(point: Point<f64>, corridor: &Corridor) -> f64 {
    match corridor.line().closest_point(&point) {
        Closest::Intersection(_) => 0.0,
        Closest::SinglePoint(nearest) => (nearest.x() - point.x()).hypot(nearest.y() - point.y()),
        Closest::Indeterminate => {
            let departure = corridor.departure();
            (departure.lng - point.x()).hypot(departure.lat - point.y())
        }
    }
}

/// Corridor bounding box grown by `search_radius` on every side.
fn compute_envelope(corridor: &Corridor, search_radius: f64) -> AABB<[f64; 2]> {
    let pad = search_radius.max(0.0);

    corridor.line().bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| {
            AABB::from_corners(
                [rect.min().x - pad, rect.min().y - pad],
                [rect.max().x + pad, rect.max().y + pad],
            )
        },
    )
}

/// Extracts a finite `[longitude, latitude]` from a `Point` geometry.
fn parse_point(geometry: &geojson::Geometry) -> Option<LngLat> {
    match &geometry.value {
        geojson::Value::Point(coords) if coords.len() >= 2 => {
            let position = LngLat::new(coords[0], coords[1]);
            position.is_finite().then_some(position)
        }
        _ => None,
    }
}

/// Accepts integer or float counts; negative values clamp to zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_complaint_count(value: &serde_json::Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return Some(u32::try_from(n).unwrap_or(u32::MAX));
    }
    value
        .as_f64()
        .filter(|n| n.is_finite())
        .map(|n| n.max(0.0).min(f64::from(u32::MAX)).round() as u32)
}
