#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line tools for planning safer walking routes.
//!
//! `route` runs the full two-phase planner against the directions
//! provider and prints the resulting JSON. `hotspots` only queries the
//! local incident index along the straight line between two points.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use safer_route_directions::OpenRouteServiceClient;
use safer_route_geometry::Corridor;
use safer_route_hotspots::HotspotQueryService;
use safer_route_models::{LatLng, LngLat};
use safer_route_router::{RouterConfig, SaferRouter};
use safer_route_spatial::IncidentIndex;

const DEFAULT_INCIDENTS_PATH: &str = "data/hotspots.geojson";

#[derive(Parser)]
#[command(name = "safer_route_cli", about = "Safer walking route tools")]
struct Cli {
    /// Incident `GeoJSON` file (overrides `INCIDENTS_PATH`)
    #[arg(long, global = true)]
    incidents: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a route that avoids complaint hotspots (requires `ORS_API_KEY`)
    Route {
        /// Departure as `LAT,LON`
        #[arg(long, value_parser = parse_lat_lng, allow_hyphen_values = true)]
        from: LatLng,
        /// Destination as `LAT,LON`
        #[arg(long, value_parser = parse_lat_lng, allow_hyphen_values = true)]
        to: LatLng,
    },
    /// List the ranked hotspots along the straight line between two points
    Hotspots {
        /// Start as `LAT,LON`
        #[arg(long, value_parser = parse_lat_lng, allow_hyphen_values = true)]
        from: LatLng,
        /// End as `LAT,LON`
        #[arg(long, value_parser = parse_lat_lng, allow_hyphen_values = true)]
        to: LatLng,
        /// Maximum number of hotspots to list
        #[arg(long, default_value = "7")]
        limit: usize,
    },
}

/// Parses `"LAT,LON"`.
fn parse_lat_lng(s: &str) -> Result<LatLng, String> {
    let (lat, lng) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got '{s}'"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("invalid latitude '{lat}': {e}"))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|e| format!("invalid longitude '{lng}': {e}"))?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(format!("coordinates out of range: {lat},{lng}"));
    }
    Ok(LatLng::new(lat, lng))
}

fn incidents_path(arg: Option<PathBuf>) -> PathBuf {
    arg.unwrap_or_else(|| {
        std::env::var("INCIDENTS_PATH")
            .unwrap_or_else(|_| DEFAULT_INCIDENTS_PATH.to_string())
            .into()
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let config = RouterConfig::from_env()?;
    let path = incidents_path(cli.incidents);
    log::info!("Loading incident index from {}...", path.display());
    let index = Arc::new(IncidentIndex::load_geojson(&path)?);

    match cli.command {
        Commands::Route { from, to } => {
            let api_key = std::env::var("ORS_API_KEY").map_err(|_| "ORS_API_KEY must be set")?;
            let directions = OpenRouteServiceClient::new(api_key, config.directions.clone())?;
            let router = SaferRouter::new(index, Arc::new(directions), &config)?;

            let route = router.plan(LngLat::from(from), LngLat::from(to)).await?;
            log::info!(
                "{}: avoided {} hotspots",
                route.metadata.phase,
                route.metadata.avoided_hotspots
            );
            println!("{}", serde_json::to_string_pretty(&route.into_json())?);
        }
        Commands::Hotspots { from, to, limit } => {
            let corridor = Corridor::from_points(&[LngLat::from(from), LngLat::from(to)])?;
            let service = HotspotQueryService::new(index, config.ranking, config.search);
            let hotspots = service.query_hotspots(&corridor, limit).await;

            println!("{:>10} {:>11} {:>10} {:>10}", "LAT", "LON", "COMPLAINTS", "DISTANCE");
            println!("{}", "-".repeat(44));
            for h in &hotspots {
                println!(
                    "{:>10.5} {:>11.5} {:>10} {:>10.5}",
                    h.latitude, h.longitude, h.complaint_count, h.distance
                );
            }
            println!("{} hotspot(s)", hotspots.len());
        }
    }

    Ok(())
}
