#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for safer walking routes.
//!
//! Loads the incident index and router configuration once at startup and
//! serves `POST /api/route` and `GET /api/health`. Startup failures
//! (bad configuration, missing API key, unreadable incident file) abort
//! the process.

mod handlers;

use std::path::Path;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use safer_route_directions::OpenRouteServiceClient;
use safer_route_models::BoundingBox;
use safer_route_router::{RouterConfig, SaferRouter};
use safer_route_spatial::IncidentIndex;

/// Incident file used when `INCIDENTS_PATH` is unset.
pub const DEFAULT_INCIDENTS_PATH: &str = "data/hotspots.geojson";

/// Shared application state.
pub struct AppState {
    /// Two-phase router shared by all workers.
    pub router: Arc<SaferRouter>,
    /// Requests with an endpoint outside this box are rejected.
    pub service_area: Option<BoundingBox>,
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/route", web::post().to(handlers::route)),
    );
}

/// Parses a bounding box string `"west,south,east,north"` into a
/// [`BoundingBox`].
#[must_use]
pub fn parse_bbox(s: &str) -> Option<BoundingBox> {
    let parts: Vec<f64> = s.split(',').filter_map(|p| p.trim().parse().ok()).collect();
    match parts[..] {
        [west, south, east, north] if west < east && south < north => {
            Some(BoundingBox::new(west, south, east, north))
        }
        _ => None,
    }
}

/// Starts the safer-route API server.
///
/// This is a regular async function; the caller provides the runtime
/// (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
///
/// # Panics
///
/// Panics if the router configuration is invalid, `ORS_API_KEY` is unset,
/// the incident index cannot be loaded, or `SERVICE_AREA_BBOX` is
/// malformed.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = RouterConfig::from_env().expect("Failed to load router configuration");

    let api_key = std::env::var("ORS_API_KEY").expect("ORS_API_KEY must be set");
    let directions = OpenRouteServiceClient::new(api_key, config.directions.clone())
        .expect("Failed to create directions client");

    let incidents_path =
        std::env::var("INCIDENTS_PATH").unwrap_or_else(|_| DEFAULT_INCIDENTS_PATH.to_string());
    log::info!("Loading incident index from {incidents_path}...");
    let index = IncidentIndex::load_geojson(Path::new(&incidents_path))
        .expect("Failed to load incident index");

    let router = SaferRouter::new(Arc::new(index), Arc::new(directions), &config)
        .expect("Invalid router configuration");

    let service_area = std::env::var("SERVICE_AREA_BBOX").ok().map(|s| {
        parse_bbox(&s).expect("SERVICE_AREA_BBOX must be `west,south,east,north`")
    });
    if let Some(area) = service_area {
        log::info!("Restricting routes to {area:?}");
    }

    let state = web::Data::new(AppState {
        router: Arc::new(router),
        service_area,
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
