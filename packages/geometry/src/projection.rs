//! WGS84 ⇄ UTM transverse Mercator projection.
//!
//! Buffers built directly in degrees are anisotropic (a degree of
//! longitude shrinks with latitude), so avoidance circles are drawn in a
//! single fixed UTM zone chosen for the service region and projected back.
//! The transforms are done by `proj4rs`.

use std::fmt;

use geo::Coord;
use proj4rs::proj::Proj;
use safer_route_models::LngLat;
use serde::{Deserialize, Serialize};

use crate::GeometryError;

const WGS84_GEOGRAPHIC: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// Which half of the UTM grid a zone refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hemisphere {
    /// Northern hemisphere (no false northing).
    #[default]
    North,
    /// Southern hemisphere (10 000 km false northing).
    South,
}

/// Projection settings, read once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// UTM zone number, 1 through 60.
    pub utm_zone: u8,
    /// Hemisphere of the zone.
    pub hemisphere: Hemisphere,
}

impl Default for ProjectionConfig {
    /// UTM zone 18N (New York City).
    fn default() -> Self {
        Self {
            utm_zone: 18,
            hemisphere: Hemisphere::North,
        }
    }
}

/// `proj` definition string for a UTM zone on WGS84.
#[must_use]
pub fn utm_definition(zone: u8, hemisphere: Hemisphere) -> String {
    match hemisphere {
        Hemisphere::North => format!("+proj=utm +zone={zone} +datum=WGS84 +units=m +no_defs"),
        Hemisphere::South => {
            format!("+proj=utm +zone={zone} +south +datum=WGS84 +units=m +no_defs")
        }
    }
}

/// A fixed UTM zone projection on the WGS84 ellipsoid.
pub struct UtmProjection {
    zone: u8,
    hemisphere: Hemisphere,
    geographic: Proj,
    projected: Proj,
}

impl fmt::Debug for UtmProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UtmProjection")
            .field("zone", &self.zone)
            .field("hemisphere", &self.hemisphere)
            .finish_non_exhaustive()
    }
}

impl UtmProjection {
    /// Creates the projection for a UTM zone.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Projection`] if `zone` is not in `1..=60`
    /// or if either coordinate system fails to initialize.
    pub fn new(zone: u8, hemisphere: Hemisphere) -> Result<Self, GeometryError> {
        if !(1..=60).contains(&zone) {
            return Err(GeometryError::Projection {
                message: format!("UTM zone {zone} is out of range (expected 1-60)"),
            });
        }

        Ok(Self {
            zone,
            hemisphere,
            geographic: init(WGS84_GEOGRAPHIC)?,
            projected: init(&utm_definition(zone, hemisphere))?,
        })
    }

    /// Creates the projection described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Projection`] if the configured zone is
    /// invalid.
    pub fn from_config(config: &ProjectionConfig) -> Result<Self, GeometryError> {
        Self::new(config.utm_zone, config.hemisphere)
    }

    /// The UTM zone number.
    #[must_use]
    pub const fn zone(&self) -> u8 {
        self.zone
    }

    /// The zone's hemisphere.
    #[must_use]
    pub const fn hemisphere(&self) -> Hemisphere {
        self.hemisphere
    }

    /// Projects a geographic point to UTM easting (`x`) / northing (`y`)
    /// in metres.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Transform`] if the point cannot be
    /// projected.
    pub fn to_projected(&self, point: LngLat) -> Result<Coord<f64>, GeometryError> {
        let mut xyz = (point.lng.to_radians(), point.lat.to_radians(), 0.0);
        proj4rs::transform::transform(&self.geographic, &self.projected, &mut xyz).map_err(
            |e| GeometryError::Transform {
                message: format!("({}, {}) to UTM: {e}", point.lng, point.lat),
            },
        )?;

        Ok(Coord { x: xyz.0, y: xyz.1 })
    }

    /// Converts a UTM easting (`x`) / northing (`y`) back to a geographic
    /// point.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Transform`] if the coordinate cannot be
    /// inverted.
    pub fn to_geographic(&self, projected: Coord<f64>) -> Result<LngLat, GeometryError> {
        let mut xyz = (projected.x, projected.y, 0.0);
        proj4rs::transform::transform(&self.projected, &self.geographic, &mut xyz).map_err(
            |e| GeometryError::Transform {
                message: format!("({}, {}) from UTM: {e}", projected.x, projected.y),
            },
        )?;

        Ok(LngLat::new(xyz.0.to_degrees(), xyz.1.to_degrees()))
    }
}

fn init(definition: &str) -> Result<Proj, GeometryError> {
    Proj::from_proj_string(definition).map_err(|e| GeometryError::Projection {
        message: format!("cannot initialize '{definition}': {e}"),
    })
}
