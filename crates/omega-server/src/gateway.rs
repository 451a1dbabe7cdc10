//! 网关服务

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::http::{HeaderValue, Request};
use omega_core::{Config, OmegaError, Result, ServerConfig};
use omega_search::SearchEngine;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info_span;

use crate::api::create_router;
use crate::state::{AppState, build_engine};

pub struct Gateway {
    config: Config,
}

impl Gateway {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// 启动服务
    pub async fn start(&self) -> Result<()> {
        let engine = build_engine(&self.config)?;
        self.serve(engine).await
    }

    /// 使用已构建的引擎启动服务
    pub async fn serve(&self, engine: SearchEngine) -> Result<()> {
        let server = &self.config.server;
        let app = build_app(AppState::new(engine), server)?;

        let addr: SocketAddr = format!("{}:{}", server.host, server.port)
            .parse()
            .map_err(|e| OmegaError::Config(format!("无效的监听地址: {}", e)))?;

        tracing::info!("Omega search service starting on {}", addr);
        tracing::info!(
            "CORS origins: {:?}, request timeout: {}s",
            server.cors_origins,
            server.request_timeout_secs
        );

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| OmegaError::Config(format!("绑定地址失败: {}", e)))?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Omega search service stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => tracing::warn!("Failed to listen for shutdown signal: {}", e),
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// 路由加上 CORS、超时和请求追踪
pub fn build_app(state: AppState, server: &ServerConfig) -> Result<Router> {
    Ok(create_router(state)
        .layer(TimeoutLayer::new(Duration::from_secs(server.request_timeout_secs)))
        .layer(cors_layer(&server.cors_origins)?)
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
            info_span!(
                "http_request",
                request_id = %uuid::Uuid::new_v4(),
                method = %request.method(),
                uri = %request.uri(),
            )
        })))
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            // 携带凭据时浏览器不接受通配来源
            if origin.trim() == "*" {
                return Err(OmegaError::Config(
                    "CORS 来源不能为 \"*\"，请列出具体来源".to_string(),
                ));
            }
            HeaderValue::from_str(origin)
                .map_err(|e| OmegaError::Config(format!("无效的 CORS 来源 {}: {}", origin, e)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{StatusCode, header};
    use omega_core::SearchConfig;
    use omega_search::SparseVectorBuilder;
    use omega_testing::ai::{MockEmbedder, MockTokenizer};
    use omega_testing::index::MockIndex;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn state() -> AppState {
        AppState::new(SearchEngine::new(
            Arc::new(MockEmbedder::new()),
            SparseVectorBuilder::new(Arc::new(MockTokenizer::new())),
            Arc::new(MockIndex::new()),
            SearchConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let app = build_app(state(), &ServerConfig::default()).unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/search")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST");
    }

    #[tokio::test]
    async fn test_cors_ignores_unknown_origin() {
        let app = build_app(state(), &ServerConfig::default()).unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "http://evil.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
    }

    #[test]
    fn test_invalid_cors_origin_is_config_error() {
        let server = ServerConfig {
            cors_origins: vec!["bad\norigin".to_string()],
            ..ServerConfig::default()
        };
        assert!(matches!(build_app(state(), &server), Err(OmegaError::Config(_))));
    }

    #[test]
    fn test_wildcard_cors_origin_is_config_error() {
        let server = ServerConfig {
            cors_origins: vec!["http://localhost:3000".to_string(), "*".to_string()],
            ..ServerConfig::default()
        };
        let err = build_app(state(), &server).err().unwrap();
        assert!(matches!(err, OmegaError::Config(_)));
        assert!(err.to_string().contains("*"));
    }
}
