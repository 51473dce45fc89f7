//! HTTP API for second-brain.
//!
//! The router is assembled here so the binary and the integration tests
//! share one construction path.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod services;
pub mod state;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

pub use auth::RequireAuth;
pub use config::ServerConfig;
pub use error::ApiError;
pub use state::{AppState, GlobalRateLimiter};

use handlers::{cards, dashboard, import, onboarding, settings, topics};

/// OpenAPI document served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Second Brain API",
        description = "Cards, a numbered topic tree and paragraph import triage"
    ),
    paths(
        cards::list_cards,
        cards::card_board,
        cards::create_card,
        cards::get_card,
        cards::update_card,
        cards::delete_card,
        topics::list_topics,
        topics::create_topic,
        topics::next_topic_number,
        topics::get_topic,
        topics::update_topic,
        topics::delete_topic,
        dashboard::dashboard,
        settings::get_settings,
        settings::put_settings,
        onboarding::get_onboarding,
        onboarding::post_onboarding,
        import::upload_import,
        import::get_import,
        import::edit_draft,
        import::approve_draft,
        import::skip_draft,
        import::reset_import,
    ),
    components(schemas(
        brain_core::Card,
        brain_core::CardInput,
        brain_core::Category,
        brain_core::CardStatus,
        brain_core::SourceType,
        brain_core::KanbanBoard,
        brain_core::KanbanColumn,
        brain_core::Topic,
        brain_core::TopicForm,
        brain_core::TopicDetail,
        brain_core::DashboardStats,
        brain_core::CategoryCount,
        brain_core::Settings,
        brain_core::ViewMode,
        brain_core::UserProfile,
        brain_core::OnboardingTemplate,
        brain_core::CandidateCard,
        brain_core::DraftEdit,
        brain_core::TriagePhase,
        brain_core::TriageView,
        topics::CreateTopicRequest,
        topics::NextNumberResponse,
        topics::DeleteTopicResponse,
        onboarding::CompleteOnboardingRequest,
        import::ApproveResponse,
    )),
    tags(
        (name = "Cards", description = "Captured notes"),
        (name = "Topics", description = "Numbered topic tree"),
        (name = "Dashboard", description = "Counters"),
        (name = "Settings", description = "View preferences"),
        (name = "Onboarding", description = "First-run setup"),
        (name = "Import", description = "Document upload and triage"),
    )
)]
pub struct ApiDoc;

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Parse configured CORS origins, skipping invalid entries.
pub fn parse_allowed_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect()
}

async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            tracing::warn!("Rate limit exceeded");
            return Err(ApiError::TooManyRequests(
                "Too many requests. Please wait before retrying.".to_string(),
            ));
        }
    }
    Ok(next.run(request).await)
}

async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

/// Build the application router with all middleware layers.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let api = Router::new()
        .route("/api/v1/cards", get(cards::list_cards).post(cards::create_card))
        .route("/api/v1/cards/board", get(cards::card_board))
        .route(
            "/api/v1/cards/:id",
            get(cards::get_card)
                .put(cards::update_card)
                .delete(cards::delete_card),
        )
        .route(
            "/api/v1/topics",
            get(topics::list_topics).post(topics::create_topic),
        )
        .route("/api/v1/topics/next-number", get(topics::next_topic_number))
        .route(
            "/api/v1/topics/:id",
            get(topics::get_topic)
                .put(topics::update_topic)
                .delete(topics::delete_topic),
        )
        .route("/api/v1/dashboard", get(dashboard::dashboard))
        .route(
            "/api/v1/settings",
            get(settings::get_settings).put(settings::put_settings),
        )
        .route(
            "/api/v1/onboarding",
            get(onboarding::get_onboarding).post(onboarding::post_onboarding),
        )
        .route(
            "/api/v1/import",
            get(import::get_import).post(import::upload_import),
        )
        .route("/api/v1/import/draft", patch(import::edit_draft))
        .route("/api/v1/import/approve", post(import::approve_draft))
        .route("/api/v1/import/skip", post(import::skip_draft))
        .route("/api/v1/import/reset", post(import::reset_import))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(parse_allowed_origins(
                    &config.allowed_origins,
                )))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(3600)),
        )
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(RequestBodyLimitLayer::new(config.max_upload_bytes))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_origins_skipped() {
        let origins = vec![
            "http://localhost:3000".to_string(),
            "bad\norigin".to_string(),
        ];
        let parsed = parse_allowed_origins(&origins);
        assert_eq!(parsed, vec![HeaderValue::from_static("http://localhost:3000")]);
    }

    #[test]
    fn test_openapi_lists_import_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/import/approve"));
        assert!(doc.paths.paths.contains_key("/api/v1/topics/{id}"));
    }
}
