// region:    --- Imports
use crate::handlers::{self, AppState};
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

// endregion: --- Imports

// 요청 본문 최대 크기 (10MB)
const BODY_LIMIT: usize = 1024 * 1024 * 10;

/// cors 설정. 허용 origin이 비어 있으면 모두 허용
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("{:<12} --> 잘못된 CORS origin 무시: {}", "Router", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// 라우터 설정
pub fn create_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(handlers::handle_health))
        .route("/api/auth/register", post(handlers::handle_register))
        .route("/api/auth/login", post(handlers::handle_login))
        .route("/api/auth/profile", get(handlers::handle_profile))
        .route(
            "/api/items",
            get(handlers::handle_get_items).post(handlers::handle_create_item),
        )
        .route("/api/items/:id", get(handlers::handle_get_item))
        .route(
            "/api/bookings",
            get(handlers::handle_get_all_bookings).post(handlers::handle_create_booking),
        )
        .route(
            "/api/bookings/user/:user_id",
            get(handlers::handle_get_user_bookings),
        )
        .route(
            "/api/bookings/:id",
            get(handlers::handle_get_booking).delete(handlers::handle_delete_booking),
        )
        .route(
            "/api/bookings/:id/cancel",
            post(handlers::handle_cancel_booking),
        )
        .route("/api/reviews", post(handlers::handle_add_review))
        .route(
            "/api/reviews/item/:item_id",
            get(handlers::handle_get_item_reviews),
        )
        .route("/api/admin/users", get(handlers::handle_get_users))
        .route("/api/admin/items", get(handlers::handle_get_items))
        .route("/api/admin/items/:id", delete(handlers::handle_delete_item))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}
