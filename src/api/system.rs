use axum::{Json, extract::State, http::Uri};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, HealthStatus};

pub const GREETING: &str = "Hello, Welcome to Eva's Closet";

/// `GET /`
pub async fn index() -> &'static str {
    GREETING
}

/// `GET /api/health`
///
/// Reports whether the database answers a trivial query. Returns 503 when it
/// does not.
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<HealthStatus>>, ApiError> {
    state
        .store()
        .ping()
        .await
        .map_err(|err| ApiError::ServiceUnavailable(format!("{err:#}")))?;

    Ok(Json(ApiResponse::success(HealthStatus {
        status: "ok",
        database: true,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })))
}

/// Fallback for every unrouted path.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
