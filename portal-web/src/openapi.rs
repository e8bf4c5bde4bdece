//! OpenAPI specification for the portal JSON endpoints

use axum::response::Json;
use utoipa::OpenApi;

use crate::handlers::{HealthResponse, SessionResponse};

/// OpenAPI document for the portal API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "MNGDP Portal API",
        version = "0.1.0",
        description = "Session and health endpoints of the unified portal",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        crate::handlers::health_check,
        crate::handlers::session_status,
    ),
    components(
        schemas(
            HealthResponse,
            SessionResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Session", description = "Session inspection"),
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
