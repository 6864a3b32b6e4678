pub mod handlers;
pub mod models;
pub mod store;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use relaypanel_grants::ServerInfo;
use store::GrantStore;

/// Application state shared across handlers
pub struct AppState {
    pub store: GrantStore,
    pub dashboards: Vec<ServerInfo>,
    pub current_index: usize,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Relay Panel API",
        version = "0.1.0",
        description = "REST API for managing proxy-user access grants",
        contact(
            name = "Relay Panel Team",
            email = "team@relaypanel.dev"
        )
    ),
    paths(
        handlers::list_tokens,
        handlers::add_token,
        handlers::update_tokens,
        handlers::remove_tokens,
        handlers::enable_tokens,
        handlers::disable_tokens,
        handlers::get_max_port,
        handlers::get_all_max_ports,
        handlers::list_dashboards,
    ),
    components(
        schemas(
            models::Grant,
            models::GrantUpdate,
            models::ServerInfo,
            models::GrantQuery,
            models::MaxPortQuery,
            models::TokenListResponse,
            models::OperationResponse,
            models::MaxPortResponse,
            models::AllMaxPortsResponse,
            models::DashboardsResponse,
            models::BulkRequest,
            relaypanel_grants::PortValue,
        )
    ),
    tags(
        (name = "grants", description = "Grant record management endpoints"),
        (name = "ports", description = "Port high-water-mark queries"),
        (name = "servers", description = "Backend server listing")
    )
)]
struct ApiDoc;

/// API server configuration
pub struct ApiServerConfig {
    /// Address to bind the API server
    pub bind_addr: SocketAddr,
    /// Enable CORS (for development)
    pub enable_cors: bool,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".parse().unwrap(),
            enable_cors: true,
        }
    }
}

/// API Server
pub struct ApiServer {
    config: ApiServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(
        config: ApiServerConfig,
        store: GrantStore,
        dashboards: Vec<ServerInfo>,
        current_index: usize,
    ) -> Self {
        let state = Arc::new(AppState {
            store,
            dashboards,
            current_index,
        });

        Self { config, state }
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let api_doc = ApiDoc::openapi();

        let api_router = Router::new()
            .route("/tokens", get(handlers::list_tokens))
            .route("/add", post(handlers::add_token))
            .route("/update", post(handlers::update_tokens))
            .route("/remove", post(handlers::remove_tokens))
            .route("/enable", post(handlers::enable_tokens))
            .route("/disable", post(handlers::disable_tokens))
            .route("/get_max_port", get(handlers::get_max_port))
            .route("/get_all_max_ports", get(handlers::get_all_max_ports))
            .route("/dashboards", get(handlers::list_dashboards))
            .with_state(self.state.clone());

        let router = Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", api_doc))
            .merge(api_router);

        let cors = if self.config.enable_cors {
            use tower_http::cors::AllowOrigin;

            let cors_layer = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE])
                .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
                    let origin_str = origin.to_str().unwrap_or("");
                    origin_str.starts_with("http://localhost:")
                        || origin_str.starts_with("http://127.0.0.1:")
                        || origin_str.starts_with("https://localhost:")
                        || origin_str.starts_with("https://127.0.0.1:")
                }));

            Some(cors_layer)
        } else {
            None
        };

        let mut router = router.layer(TraceLayer::new_for_http());

        if let Some(cors) = cors {
            router = router.layer(cors);
        }

        router
    }

    /// Start the API server
    pub async fn start(self) -> Result<(), anyhow::Error> {
        let router = self.build_router();

        info!("Starting panel API server on {}", self.config.bind_addr);
        info!(
            "OpenAPI spec: http://{}/api/openapi.json",
            self.config.bind_addr
        );

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        axum::serve(listener, router)
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        // Ensure OpenAPI spec can be generated without panics
        let _api_doc = ApiDoc::openapi();
    }
}
