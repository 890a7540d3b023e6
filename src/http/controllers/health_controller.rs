use axum::{http::StatusCode, Json};

/// Handler for GET /
pub async fn root_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "API is running"
    }))
}

/// Handler for GET /health
pub async fn health_handler() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": "datadeck"
        })),
    )
}
