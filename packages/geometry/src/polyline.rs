//! Encoded polyline codec.
//!
//! The encoded format stores latitude first, but decoding yields
//! coordinates with `x = longitude, y = latitude`, which is the order every
//! other part of this crate uses.

use geo::Coord;
use safer_route_models::LngLat;

use crate::GeometryError;

/// Precision (decimal places) of polylines returned by the directions
/// provider.
pub const PROVIDER_PRECISION: u32 = 5;

/// Decodes an encoded polyline into `[longitude, latitude]` positions.
///
/// # Errors
///
/// Returns [`GeometryError::Polyline`] if the string is not a valid
/// encoded polyline.
pub fn decode(encoded: &str, precision: u32) -> Result<Vec<LngLat>, GeometryError> {
    let line = ::polyline::decode_polyline(encoded, precision).map_err(|e| {
        GeometryError::Polyline {
            message: e.to_string(),
        }
    })?;

    Ok(line.0.into_iter().map(|c| LngLat::new(c.x, c.y)).collect())
}

/// Encodes `[longitude, latitude]` positions as a polyline.
///
/// # Errors
///
/// Returns [`GeometryError::Polyline`] if any coordinate is out of the
/// valid WGS84 range.
pub fn encode(points: &[LngLat], precision: u32) -> Result<String, GeometryError> {
    ::polyline::encode_coordinates(
        points.iter().map(|p| Coord { x: p.lng, y: p.lat }),
        precision,
    )
    .map_err(|e| GeometryError::Polyline {
        message: e.to_string(),
    })
}
