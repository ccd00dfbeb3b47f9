#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Geometry utilities for the safer-route engine.
//!
//! Avoidance circles are sized in metres, so they are built in a projected
//! metric system ([`projection::UtmProjection`]) and transformed back to
//! WGS84 before being simplified ([`buffer`]). Route geometries arrive as
//! encoded polylines and are decoded into [`corridor::Corridor`]s via the
//! [`polyline`] codec.

pub mod buffer;
pub mod corridor;
pub mod polyline;
pub mod projection;

pub use corridor::Corridor;
pub use projection::{Hemisphere, ProjectionConfig, UtmProjection};

use thiserror::Error;

/// Errors from geometry operations.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// The projection could not be constructed from its configuration.
    #[error("Projection error: {message}")]
    Projection {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A coordinate could not be transformed between systems.
    #[error("Transform error: {message}")]
    Transform {
        /// Description of the failed transform.
        message: String,
    },

    /// A buffer could not be built.
    #[error("Buffer error: {message}")]
    Buffer {
        /// Description of the failure.
        message: String,
    },

    /// Encoding or decoding a polyline failed.
    #[error("Polyline error: {message}")]
    Polyline {
        /// Codec detail.
        message: String,
    },

    /// A route geometry decoded to zero coordinates.
    #[error("Route geometry contains no coordinates")]
    EmptyGeometry,
}
