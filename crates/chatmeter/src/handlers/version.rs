use axum::Json;
use serde::Serialize;

use crate::build_info;

#[derive(Serialize)]
pub struct VersionResponse {
    version: &'static str,
}

/// GET /version
pub async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: build_info::VERSION,
    })
}
