//! Metric circular buffers around projected points.

use std::f64::consts::FRAC_PI_2;

use geo::algorithm::buffer::{Buffer, BufferStyle, LineCap};
use geo::{Coord, MapCoords, Point, Polygon, Simplify};

use crate::GeometryError;
use crate::projection::UtmProjection;

/// Segments per quarter circle used when approximating a buffer.
pub const DEFAULT_SEGMENTS_PER_QUADRANT: usize = 16;

/// Builds a circle of `radius_m` metres around a projected point,
/// transforms it back to WGS84, and simplifies the result with a
/// Douglas-Peucker tolerance of `tolerance_deg` degrees.
///
/// The simplification bounds the vertex count sent to the directions
/// provider. If simplifying would collapse the ring below a triangle, the
/// unsimplified ring is returned instead.
///
/// # Errors
///
/// Returns [`GeometryError::Buffer`] if the radius or tolerance is not a
/// finite positive number, or if `segments_per_quadrant` is zero, and
/// [`GeometryError::Transform`] if a ring vertex cannot be transformed
/// back to WGS84.
pub fn buffer_and_simplify(
    projection: &UtmProjection,
    center: Coord<f64>,
    radius_m: f64,
    tolerance_deg: f64,
    segments_per_quadrant: usize,
) -> Result<Polygon<f64>, GeometryError> {
    if !radius_m.is_finite() || radius_m <= 0.0 {
        return Err(GeometryError::Buffer {
            message: format!("radius must be a positive number of metres, got {radius_m}"),
        });
    }
    if !tolerance_deg.is_finite() || tolerance_deg < 0.0 {
        return Err(GeometryError::Buffer {
            message: format!("simplify tolerance must be non-negative, got {tolerance_deg}"),
        });
    }
    if segments_per_quadrant == 0 {
        return Err(GeometryError::Buffer {
            message: "segments_per_quadrant must be at least 1".to_string(),
        });
    }
    if !center.x.is_finite() || !center.y.is_finite() {
        return Err(GeometryError::Buffer {
            message: format!("buffer centre is not finite: ({}, {})", center.x, center.y),
        });
    }

    #[allow(clippy::cast_precision_loss)]
    let step = FRAC_PI_2 / segments_per_quadrant as f64;
    let style = BufferStyle::new(radius_m).line_cap(LineCap::Round(step));

    let circle = Point::from(center)
        .buffer_with_style(style)
        .0
        .into_iter()
        .next()
        .ok_or_else(|| GeometryError::Buffer {
            message: format!("buffering produced no polygon for radius {radius_m}"),
        })?;

    let polygon = circle.try_map_coords(|projected| {
        projection
            .to_geographic(projected)
            .map(|geographic| Coord {
                x: geographic.lng,
                y: geographic.lat,
            })
    })?;
    let simplified = polygon.simplify(tolerance_deg);

    // A valid ring needs 3 distinct vertices plus the closing one.
    if simplified.exterior().0.len() < 4 {
        log::debug!(
            "Simplification collapsed a {radius_m} m buffer; keeping {} vertices",
            polygon.exterior().0.len()
        );
        return Ok(polygon);
    }

    Ok(simplified)
}
