//! HTTP handler functions for the safer-route API.

use actix_web::{HttpResponse, web};
use safer_route_server_models::{ApiError, ApiHealth, ApiRouteRequest};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /api/route`
///
/// Plans a hotspot-avoiding walking route. Returns the provider's route
/// body with a `metadata` object, or `{"error": ..}` with `502 Bad
/// Gateway` when no route could be produced.
pub async fn route(state: web::Data<AppState>, body: web::Json<ApiRouteRequest>) -> HttpResponse {
    let (departure, destination) = body.endpoints();

    if !departure.is_finite() || !destination.is_finite() {
        return HttpResponse::BadRequest().json(ApiError::new("Coordinates must be finite numbers"));
    }
    let outside = state
        .service_area
        .is_some_and(|area| !area.contains(departure) || !area.contains(destination));
    if outside {
        return HttpResponse::BadRequest().json(ApiError::new(
            "Departure and destination must be inside the service area",
        ));
    }

    match state.router.plan(departure, destination).await {
        Ok(route) => {
            log::debug!(
                "Route planned ({}, {} hotspots avoided)",
                route.metadata.phase,
                route.metadata.avoided_hotspots
            );
            HttpResponse::Ok().json(route.into_json())
        }
        Err(e) => {
            log::error!("Failed to plan route: {e}");
            HttpResponse::BadGateway().json(ApiError::new(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test};
    use geo::MultiPolygon;
    use safer_route_directions::DirectionsProvider;
    use safer_route_geometry::polyline::{PROVIDER_PRECISION, encode};
    use safer_route_models::{BoundingBox, LngLat, ProviderRoute, RouteError};
    use safer_route_router::{RouterConfig, SaferRouter};
    use safer_route_spatial::IncidentIndex;

    use crate::{AppState, configure};

    /// Answers every request with a straight line between the endpoints.
    struct StraightLine;

    #[async_trait::async_trait]
    impl DirectionsProvider for StraightLine {
        async fn get_route_avoiding(
            &self,
            departure: LngLat,
            destination: LngLat,
            _avoid: Option<&MultiPolygon<f64>>,
        ) -> Result<ProviderRoute, RouteError> {
            let geometry = encode(&[departure, destination], PROVIDER_PRECISION)
                .map_err(|e| RouteError::Decode {
                    message: e.to_string(),
                })?;
            Ok(ProviderRoute::from_body(serde_json::json!({
                "routes": [{ "geometry": geometry }]
            })))
        }
    }

    struct Unavailable;

    #[async_trait::async_trait]
    impl DirectionsProvider for Unavailable {
        async fn get_route_avoiding(
            &self,
            _departure: LngLat,
            _destination: LngLat,
            _avoid: Option<&MultiPolygon<f64>>,
        ) -> Result<ProviderRoute, RouteError> {
            Err(RouteError::provider("OpenRouteService", 503, "maintenance", 200))
        }
    }

    fn state(
        directions: Arc<dyn DirectionsProvider>,
        service_area: Option<BoundingBox>,
    ) -> actix_web::web::Data<AppState> {
        let index = IncidentIndex::from_points([(LngLat::new(-73.9905, 40.7400), 25)]);
        let router = SaferRouter::new(Arc::new(index), directions, &RouterConfig::default()).unwrap();
        actix_web::web::Data::new(AppState {
            router: Arc::new(router),
            service_area,
        })
    }

    fn route_request() -> serde_json::Value {
        serde_json::json!({ "departure": [40.7300, -73.9900], "destination": [40.7500, -73.9900] })
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let app = test::init_service(
            App::new()
                .app_data(state(Arc::new(StraightLine), None))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["healthy"], true);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn route_returns_body_with_metadata() {
        let app = test::init_service(
            App::new()
                .app_data(state(Arc::new(StraightLine), None))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/route")
            .set_json(route_request())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["routes"][0]["geometry"].is_string());
        assert_eq!(body["metadata"]["phase"], "Phase 2");
        assert_eq!(body["metadata"]["avoided_hotspots"], 1);
    }

    #[actix_web::test]
    async fn provider_failure_is_bad_gateway() {
        let app = test::init_service(
            App::new()
                .app_data(state(Arc::new(Unavailable), None))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/route")
            .set_json(route_request())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "OpenRouteService API error: 503 - maintenance");
    }

    #[actix_web::test]
    async fn outside_service_area_is_rejected() {
        let area = BoundingBox::new(-74.03, 40.68, -73.90, 40.74);
        let app = test::init_service(
            App::new()
                .app_data(state(Arc::new(StraightLine), Some(area)))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/route")
            .set_json(route_request())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
