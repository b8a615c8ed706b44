pub mod error;
pub mod tomtom;

use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use tower_http::cors::{Any, CorsLayer};

use crate::error::UpstreamError;
use crate::tomtom::TomTomClient;
use shared::{
    ApiError, KeyCheckRequest, KeyCheckResponse, LocationCandidate, RoutePlan, RouteQuery,
    SuggestRequest,
};

#[derive(Clone)]
pub struct AppState {
    pub tomtom: Arc<TomTomClient>,
}

pub fn create_router(state: AppState) -> Router {
    // The frontend is served from its own origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/key", post(key_handler))
        .route("/api/suggest", post(suggest_handler))
        .route("/api/route", post(route_handler))
        .layer(cors)
        .with_state(state)
}

/// Validates the session credential. Always answers 200; any upstream
/// rejection or network failure leaves the session unauthenticated.
async fn key_handler(
    State(state): State<AppState>,
    Json(req): Json<KeyCheckRequest>,
) -> Json<KeyCheckResponse> {
    if req.key.trim().is_empty() {
        return Json(KeyCheckResponse {
            valid: false,
            message: Some("Please enter your API key.".to_string()),
        });
    }

    match state.tomtom.validate_key(&req.key).await {
        Ok(true) => Json(KeyCheckResponse {
            valid: true,
            message: None,
        }),
        Ok(false) => Json(KeyCheckResponse {
            valid: false,
            message: Some("The routing service rejected this API key.".to_string()),
        }),
        Err(err) => {
            tracing::error!("key validation call failed: {err}");
            Json(KeyCheckResponse {
                valid: false,
                message: Some(format!("Error contacting the routing service: {err}")),
            })
        }
    }
}

async fn suggest_handler(
    State(state): State<AppState>,
    Json(req): Json<SuggestRequest>,
) -> Result<Json<Vec<LocationCandidate>>, (StatusCode, Json<ApiError>)> {
    if req.query.trim().is_empty() {
        return Ok(Json(Vec::new()));
    }

    state
        .tomtom
        .suggest(&req.query, &req.key)
        .await
        .map(Json)
        .map_err(upstream_error)
}

async fn route_handler(
    State(state): State<AppState>,
    Json(req): Json<RouteQuery>,
) -> Result<Json<RoutePlan>, (StatusCode, Json<ApiError>)> {
    match state.tomtom.calculate_route(&req).await {
        Ok(Some(plan)) => Ok(Json(plan)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiError {
                message: "No route found between the selected locations.".to_string(),
            }),
        )),
        Err(err) => Err(upstream_error(err)),
    }
}

fn upstream_error(err: UpstreamError) -> (StatusCode, Json<ApiError>) {
    tracing::error!("upstream call failed: {err}");
    (
        StatusCode::BAD_GATEWAY,
        Json(ApiError {
            message: err.to_string(),
        }),
    )
}
