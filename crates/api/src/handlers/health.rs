use axum::Json;

use crate::dto::response::HealthResponse;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
