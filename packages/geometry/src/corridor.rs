//! Route corridors: the line geometry of a candidate route.

use geo::{Coord, LineString};
use safer_route_models::LngLat;

use crate::{GeometryError, polyline};

/// An immutable, non-empty sequence of route coordinates used as the anchor
/// for spatial hotspot queries.
#[derive(Debug, Clone, PartialEq)]
pub struct Corridor {
    line: LineString<f64>,
}

impl Corridor {
    /// Builds a corridor from `[longitude, latitude]` positions.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::EmptyGeometry`] if `points` is empty.
    pub fn from_points(points: &[LngLat]) -> Result<Self, GeometryError> {
        if points.is_empty() {
            return Err(GeometryError::EmptyGeometry);
        }

        let coords: Vec<Coord<f64>> = points.iter().map(|p| Coord { x: p.lng, y: p.lat }).collect();
        Ok(Self {
            line: LineString::new(coords),
        })
    }

    /// Decodes a provider polyline into a corridor.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Polyline`] if decoding fails, or
    /// [`GeometryError::EmptyGeometry`] if it yields no coordinates.
    pub fn from_encoded(encoded: &str, precision: u32) -> Result<Self, GeometryError> {
        Self::from_points(&polyline::decode(encoded, precision)?)
    }

    /// The corridor as a `geo` line string (`x = longitude`).
    #[must_use]
    pub const fn line(&self) -> &LineString<f64> {
        &self.line
    }

    /// Number of coordinates in the corridor.
    #[must_use]
    pub fn len(&self) -> usize {
        self.line.0.len()
    }

    /// Always `false`; corridors are non-empty by construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.line.0.is_empty()
    }

    /// First coordinate (the route's departure).
    #[must_use]
    pub fn departure(&self) -> LngLat {
        let c = self.line.0[0];
        LngLat::new(c.x, c.y)
    }

    /// Last coordinate (the route's destination).
    #[must_use]
    pub fn destination(&self) -> LngLat {
        let c = self.line.0[self.line.0.len() - 1];
        LngLat::new(c.x, c.y)
    }
}
