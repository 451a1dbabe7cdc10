//! HTTP API 路由

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use omega_core::OmegaError;
use omega_search::{SearchRequest, SearchResponse};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/search", post(search_handler))
        .with_state(state)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub search_module: bool,
    pub version: String,
}

/// 健康检查
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        search_module: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// 把领域错误映射为 HTTP 状态码
pub struct ApiError(OmegaError);

impl From<OmegaError> for ApiError {
    fn from(err: OmegaError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self.0 {
            OmegaError::InvalidInput(reason) => {
                warn!("Rejected search request: {}", reason);
                (StatusCode::UNPROCESSABLE_ENTITY, reason.clone())
            }
            // 上游错误细节只写日志，响应里只说明哪个服务不可用
            OmegaError::UpstreamUnavailable { service, message } => {
                error!("Upstream {} unavailable: {}", service, message);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("{} service unavailable", service),
                )
            }
            other => {
                error!("Search failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

async fn search_handler(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    // 请求体解析失败也按 {"detail"} 返回 422
    let Json(request) =
        payload.map_err(|rejection| OmegaError::invalid_input(rejection.body_text()))?;
    let response = state.engine.search(request).await?;
    Ok(Json(response))
}
