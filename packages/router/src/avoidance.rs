//! Avoidance polygons around hotspots.
//!
//! Each hotspot gets one circle whose radius grows linearly with its
//! complaint count, from `min_radius_meters` up to `max_radius_meters` at
//! `complaint_saturation` complaints. The defaults size a circle to roughly
//! one city block. Circles are not merged; overlapping polygons are
//! accepted by the directions provider.

use geo::{MultiPolygon, Polygon};
use safer_route_geometry::buffer::{DEFAULT_SEGMENTS_PER_QUADRANT, buffer_and_simplify};
use safer_route_geometry::{GeometryError, UtmProjection};
use safer_route_models::Hotspot;
use serde::{Deserialize, Serialize};

/// Avoidance circle sizing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvoidanceConfig {
    /// Radius used for every hotspot when `severity_scaling` is off.
    pub base_radius_meters: f64,
    /// Radius of a hotspot with no complaints.
    pub min_radius_meters: f64,
    /// Radius of a hotspot at or above `complaint_saturation`.
    pub max_radius_meters: f64,
    /// Complaint count at which the radius stops growing.
    pub complaint_saturation: u32,
    /// Scale radii by complaint count.
    pub severity_scaling: bool,
    /// Douglas-Peucker tolerance applied to each circle, in degrees.
    pub simplify_tolerance_degrees: f64,
    /// Circle resolution.
    pub circle_segments_per_quadrant: usize,
}

impl Default for AvoidanceConfig {
    fn default() -> Self {
        Self {
            base_radius_meters: 100.0,
            min_radius_meters: 80.0,
            max_radius_meters: 200.0,
            complaint_saturation: 100,
            severity_scaling: true,
            simplify_tolerance_degrees: 0.0001,
            circle_segments_per_quadrant: DEFAULT_SEGMENTS_PER_QUADRANT,
        }
    }
}

/// Radius in metres of the avoidance circle for a hotspot with
/// `complaint_count` complaints.
#[must_use]
pub fn scaled_radius(complaint_count: u32, config: &AvoidanceConfig) -> f64 {
    if !config.severity_scaling {
        return config.base_radius_meters;
    }

    let saturation = f64::from(config.complaint_saturation.max(1));
    let factor = (f64::from(complaint_count) / saturation).min(1.0);
    (config.max_radius_meters - config.min_radius_meters).mul_add(factor, config.min_radius_meters)
}

/// Builds one avoidance polygon per hotspot.
///
/// Returns `Ok(None)` for an empty hotspot list, meaning no avoidance is
/// needed.
///
/// # Errors
///
/// Returns [`GeometryError::Buffer`] if a circle cannot be built, e.g. for
/// a hotspot with non-finite coordinates, or [`GeometryError::Transform`]
/// if it cannot be projected.
pub fn build_avoid_polygons(
    hotspots: &[Hotspot],
    projection: &UtmProjection,
    config: &AvoidanceConfig,
) -> Result<Option<MultiPolygon<f64>>, GeometryError> {
    if hotspots.is_empty() {
        return Ok(None);
    }

    let polygons = hotspots
        .iter()
        .map(|hotspot| {
            let position = hotspot.position();
            if !position.is_finite() {
                return Err(GeometryError::Buffer {
                    message: format!(
                        "hotspot position is not finite: ({}, {})",
                        position.lng, position.lat
                    ),
                });
            }
            buffer_and_simplify(
                projection,
                projection.to_projected(position)?,
                scaled_radius(hotspot.complaint_count, config),
                config.simplify_tolerance_degrees,
                config.circle_segments_per_quadrant,
            )
        })
        .collect::<Result<Vec<Polygon<f64>>, _>>()?;

    log::debug!("Built {} avoidance polygons", polygons.len());

    Ok(Some(MultiPolygon::new(polygons)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Contains, Point};
    use proptest::prelude::*;
    use safer_route_geometry::Hemisphere;

    fn projection() -> UtmProjection {
        UtmProjection::new(18, Hemisphere::North).unwrap()
    }

    fn hotspot(longitude: f64, latitude: f64, complaint_count: u32) -> Hotspot {
        Hotspot {
            latitude,
            longitude,
            complaint_count,
            distance: 0.0,
        }
    }

    #[test]
    fn radius_is_clamped() {
        let config = AvoidanceConfig::default();
        assert!((scaled_radius(0, &config) - 80.0).abs() < 1e-9);
        assert!((scaled_radius(50, &config) - 140.0).abs() < 1e-9);
        assert!((scaled_radius(100, &config) - 200.0).abs() < 1e-9);
        assert!((scaled_radius(10_000, &config) - 200.0).abs() < 1e-9);
    }

    #[test]
    fn radius_without_scaling_is_base() {
        let config = AvoidanceConfig {
            severity_scaling: false,
            ..AvoidanceConfig::default()
        };
        assert!((scaled_radius(3, &config) - 100.0).abs() < 1e-9);
        assert!((scaled_radius(300, &config) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn no_hotspots_means_no_polygons() {
        let polygons =
            build_avoid_polygons(&[], &projection(), &AvoidanceConfig::default()).unwrap();
        assert!(polygons.is_none());
    }

    #[test]
    fn one_polygon_per_hotspot_even_when_overlapping() {
        let hotspots = [
            hotspot(-73.9900, 40.7300, 12),
            hotspot(-73.9901, 40.7301, 40),
            hotspot(-73.9800, 40.7400, 150),
        ];
        let polygons = build_avoid_polygons(&hotspots, &projection(), &AvoidanceConfig::default())
            .unwrap()
            .unwrap();

        assert_eq!(polygons.0.len(), hotspots.len());
        for (polygon, h) in polygons.0.iter().zip(&hotspots) {
            assert!(polygon.contains(&Point::new(h.longitude, h.latitude)));
        }
    }

    #[test]
    fn non_finite_hotspot_is_an_error() {
        let result = build_avoid_polygons(
            &[hotspot(f64::NAN, 40.73, 10)],
            &projection(),
            &AvoidanceConfig::default(),
        );
        assert!(matches!(result, Err(GeometryError::Buffer { .. })));
    }

    proptest! {
        #[test]
        fn radius_is_monotonic_in_complaints(
            mut counts in prop::collection::vec(0u32..1_000, 2..30)
        ) {
            let config = AvoidanceConfig::default();
            counts.sort_unstable();
            let radii: Vec<f64> = counts.iter().map(|&c| scaled_radius(c, &config)).collect();
            for pair in radii.windows(2) {
                prop_assert!(pair[0] <= pair[1]);
            }
            for r in radii {
                prop_assert!((config.min_radius_meters..=config.max_radius_meters).contains(&r));
            }
        }
    }
}
