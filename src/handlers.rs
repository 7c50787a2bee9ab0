use crate::config::Config;
use crate::constants::MAX_BODY_SIZE;
use crate::error::{AppError, Result};
use crate::models::*;
use crate::services::ClipboardService;
use axum::{
    async_trait,
    extract::{DefaultBodyLimit, FromRequestParts, State},
    http::{request::Parts, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Header the auth gateway uses to forward the authenticated user id.
pub const OWNER_HEADER: &str = "x-user-id";

pub struct AppState {
    pub config: Config,
    pub service: ClipboardService,
}

/// Authenticated owner of the request.
///
/// Authentication itself happens upstream; by the time a request reaches
/// this service the gateway has validated credentials and put the user id
/// in the `x-user-id` header. A missing or empty header is rejected.
pub struct Owner(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for Owner
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let owner = parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(AppError::Unauthorized)?;

        Ok(Owner(owner.to_string()))
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, list_messages, append_text, append_file, clear_messages),
    components(schemas(
        HealthResponse,
        ItemKind,
        MessageView,
        AppendTextRequest,
        AppendFileRequest,
        AppendResponse,
        ClearResponse
    )),
    tags(
        (name = "clipbridge", description = "Per-user expiring clipboard")
    ),
    info(
        title = "clipbridge API",
        version = "0.1.0",
        description = "Authenticated clipboard for moving snippets and files between devices.\n\n\
                      Every stored item is visible only to its owner and is deleted \
                      24 hours after creation. Authentication and file upload are \
                      handled upstream; this service stores text and file references.",
        license(name = "MIT"),
    )
)]
pub struct ApiDoc;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "clipbridge",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        retention_hours: state.config.retention_hours,
    })
}

/// List the caller's non-expired items, newest first
#[utoipa::path(
    get,
    path = "/api/messages",
    tag = "clipbridge",
    params(
        ("x-user-id" = String, Header, description = "Authenticated user id")
    ),
    responses(
        (status = 200, description = "Items owned by the caller", body = [MessageView]),
        (status = 401, description = "Missing user identity")
    )
)]
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
) -> Result<Json<Vec<MessageView>>> {
    let messages = state.service.list(&owner).await?;
    Ok(Json(messages))
}

/// Store a text snippet
#[utoipa::path(
    post,
    path = "/api/messages/text",
    tag = "clipbridge",
    params(
        ("x-user-id" = String, Header, description = "Authenticated user id")
    ),
    request_body = AppendTextRequest,
    responses(
        (status = 201, description = "Item stored", body = AppendResponse),
        (status = 400, description = "Empty message"),
        (status = 401, description = "Missing user identity")
    )
)]
pub async fn append_text(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Json(req): Json<AppendTextRequest>,
) -> Result<(StatusCode, Json<AppendResponse>)> {
    let item = state.service.append_text(&owner, &req.message).await?;

    Ok((
        StatusCode::CREATED,
        Json(AppendResponse {
            id: item.id,
            created_at: item.created_at,
            expires_at: state.service.expiry_of(item.created_at),
        }),
    ))
}

/// Record an uploaded file
///
/// The upload handler has already written the file under the caller's
/// upload directory; this endpoint records the returned filename.
#[utoipa::path(
    post,
    path = "/api/messages/file",
    tag = "clipbridge",
    params(
        ("x-user-id" = String, Header, description = "Authenticated user id")
    ),
    request_body = AppendFileRequest,
    responses(
        (status = 201, description = "File reference stored", body = AppendResponse),
        (status = 401, description = "Missing user identity")
    )
)]
pub async fn append_file(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Json(req): Json<AppendFileRequest>,
) -> Result<(StatusCode, Json<AppendResponse>)> {
    let item = state.service.append_file(&owner, &req.filename).await?;

    Ok((
        StatusCode::CREATED,
        Json(AppendResponse {
            id: item.id,
            created_at: item.created_at,
            expires_at: state.service.expiry_of(item.created_at),
        }),
    ))
}

/// Delete all of the caller's items
#[utoipa::path(
    delete,
    path = "/api/messages/clear",
    tag = "clipbridge",
    params(
        ("x-user-id" = String, Header, description = "Authenticated user id")
    ),
    responses(
        (status = 200, description = "Items removed", body = ClearResponse),
        (status = 401, description = "Missing user identity")
    )
)]
pub async fn clear_messages(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
) -> Result<Json<ClearResponse>> {
    let cleared = state.service.clear(&owner).await?;
    Ok(Json(ClearResponse { cleared }))
}

/// API routes plus swagger docs, without middleware layers.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/messages", get(list_messages))
        .route("/api/messages/text", post(append_text))
        .route("/api/messages/file", post(append_file))
        .route("/api/messages/clear", delete(clear_messages))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}

/// Full application: routes plus body-limit, tracing, and per-IP rate-limit
/// layers. The rate limiter keys on the peer address, so the server must be
/// started with connect info (see `main`).
pub fn app(state: Arc<AppState>) -> anyhow::Result<Router> {
    let rate_limit_config = GovernorConfigBuilder::default()
        .per_second(2)
        .burst_size(10)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("Failed to build rate limit config"))?;

    let rate_limit_layer = GovernorLayer {
        config: Arc::new(rate_limit_config),
    };

    Ok(router(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(rate_limit_layer))
}
