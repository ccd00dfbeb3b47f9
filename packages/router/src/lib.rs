#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Two-phase hotspot-avoiding route planning.
//!
//! [`SaferRouter`] takes a baseline walking route, finds the worst
//! complaint hotspots along it, and asks the directions provider for a
//! route around circles drawn at those hotspots. It then repeats the
//! search along the new route, skipping hotspots near ones already
//! avoided, and asks for a route around both sets. If the second request
//! fails, the first avoiding route is returned instead.
//!
//! All tunables live in [`RouterConfig`].

pub mod avoidance;
pub mod config;
pub mod two_phase;

pub use avoidance::{AvoidanceConfig, build_avoid_polygons, scaled_radius};
pub use config::{ConfigError, PhaseConfig, RouterConfig};
pub use two_phase::SaferRouter;
