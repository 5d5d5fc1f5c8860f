// region:    --- Imports
use crate::auth::extractor::AuthorizedUser;
use crate::auth::{self, Credentials, RegisterCommand, TokenIssuer};
use crate::booking::commands::BookingEngine;
use crate::booking::model::SubmitBookingCommand;
use crate::booking::BookingStore;
use crate::catalog::model::{Category, CreateItemCommand};
use crate::catalog::Catalog;
use crate::directory::model::Role;
use crate::directory::UserDirectory;
use crate::error::{AppError, AppResult};
use crate::query;
use crate::review::model::AddReviewCommand;
use crate::review::{self, ReviewStore};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

// endregion: --- Imports

// region:    --- App State
/// 핸들러 공유 상태
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<BookingEngine>,
    pub catalog: Arc<dyn Catalog>,
    pub directory: Arc<dyn UserDirectory>,
    pub bookings: Arc<dyn BookingStore>,
    pub reviews: Arc<dyn ReviewStore>,
    pub tokens: Arc<TokenIssuer>,
}

impl AppState {
    /// 하나의 저장소 구현체로 모든 협력자를 구성
    pub fn new<S>(store: Arc<S>, tokens: TokenIssuer) -> Self
    where
        S: Catalog + UserDirectory + BookingStore + ReviewStore + 'static,
    {
        let catalog: Arc<dyn Catalog> = store.clone();
        let directory: Arc<dyn UserDirectory> = store.clone();
        let bookings: Arc<dyn BookingStore> = store.clone();
        let reviews: Arc<dyn ReviewStore> = store;
        let engine = Arc::new(BookingEngine::new(
            Arc::clone(&catalog),
            Arc::clone(&directory),
            Arc::clone(&bookings),
        ));
        Self {
            engine,
            catalog,
            directory,
            bookings,
            reviews,
            tokens: Arc::new(tokens),
        }
    }
}
// endregion: --- App State

// region:    --- Helpers
// 요청 본문에서 받는 필드 이름
const REQUEST_FIELDS: &[&str] = &[
    "itemId",
    "userId",
    "startDate",
    "endDate",
    "name",
    "email",
    "password",
    "category",
    "price",
    "location",
    "description",
    "ownerName",
    "ownerContact",
    "image",
    "rating",
    "comment",
];

/// 역직렬화 에러 메시지의 경로("itemId: invalid type ...")에서 필드 이름 추출
fn malformed_field(detail: &str) -> &'static str {
    let detail = detail
        .split_once("target type: ")
        .map_or(detail, |(_, rest)| rest);
    let Some((path, _)) = detail.split_once(": ") else {
        return "body";
    };
    let leading = path
        .split(|c: char| c == '.' || c == '[')
        .next()
        .unwrap_or_default();
    REQUEST_FIELDS
        .iter()
        .copied()
        .find(|field| *field == leading)
        .unwrap_or("body")
}

/// JSON 본문 파싱 실패를 ValidationError로 변환
fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        let detail = rejection.body_text();
        let field = match rejection {
            JsonRejection::JsonDataError(_) => malformed_field(&detail),
            _ => "body",
        };
        AppError::validation(field, detail)
    })
}

fn require_admin(user: &AuthorizedUser) -> AppResult<()> {
    if user.acting().is_admin() {
        Ok(())
    } else {
        Err(AppError::Authorization(
            "관리자만 접근할 수 있습니다.".to_string(),
        ))
    }
}

#[derive(Debug, Deserialize)]
pub struct ItemFilter {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserFilter {
    pub role: Option<String>,
}
// endregion: --- Helpers

/// 상태 확인
pub async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "Rental service is running" }))
}

// region:    --- Auth Handlers

/// 회원 가입
pub async fn handle_register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterCommand>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let cmd = parse_body(payload)?;
    let user = auth::register(state.directory.as_ref(), cmd).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// 로그인
pub async fn handle_login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let credentials = parse_body(payload)?;
    let user = auth::authenticate(state.directory.as_ref(), &credentials).await?;
    let token = state.tokens.issue(&user)?;
    info!("{:<12} --> 로그인 성공 id: {}", "Auth", user.id);
    Ok(Json(serde_json::json!({ "token": token, "user": user })))
}

/// 내 정보 조회
pub async fn handle_profile(user: AuthorizedUser) -> impl IntoResponse {
    Json(user.user)
}

// endregion: --- Auth Handlers

// region:    --- Item Handlers

/// 상품 목록 조회 (카테고리 필터)
pub async fn handle_get_items(
    State(state): State<AppState>,
    Query(filter): Query<ItemFilter>,
) -> AppResult<impl IntoResponse> {
    info!("{:<12} --> 상품 목록 조회: {:?}", "HandlerQuery", filter);
    let category = filter
        .category
        .as_deref()
        .map(str::parse::<Category>)
        .transpose()
        .map_err(|e| AppError::validation("category", e.to_string()))?;
    Ok(Json(state.catalog.list_items(category).await?))
}

/// 상품 조회
pub async fn handle_get_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    info!("{:<12} --> 상품 조회 id: {}", "HandlerQuery", item_id);
    let item = state
        .catalog
        .find_item_by_id(item_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(
                "itemId",
                format!("상품을 찾을 수 없습니다. itemId: {}", item_id),
            )
        })?;
    Ok(Json(item))
}

/// 상품 등록 (관리자)
pub async fn handle_create_item(
    State(state): State<AppState>,
    user: AuthorizedUser,
    payload: Result<Json<CreateItemCommand>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    require_admin(&user)?;
    let new_item = parse_body(payload)?.validate()?;
    let item = state.catalog.create_item(new_item).await?;
    info!("{:<12} --> 상품 등록 id: {}", "Command", item.id);
    Ok((StatusCode::CREATED, Json(item)))
}

/// 상품 삭제 (관리자)
pub async fn handle_delete_item(
    State(state): State<AppState>,
    user: AuthorizedUser,
    Path(item_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    require_admin(&user)?;
    if !state.catalog.delete_item(item_id).await? {
        return Err(AppError::not_found(
            "itemId",
            format!("상품을 찾을 수 없습니다. itemId: {}", item_id),
        ));
    }
    info!("{:<12} --> 상품 삭제 id: {}", "Command", item_id);
    Ok(Json(serde_json::json!({
        "message": "상품이 삭제되었습니다.",
        "id": item_id
    })))
}

// endregion: --- Item Handlers

// region:    --- Booking Handlers

/// 예약 요청 처리
pub async fn handle_create_booking(
    State(state): State<AppState>,
    payload: Result<Json<SubmitBookingCommand>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let cmd = parse_body(payload)?;
    let booking = state.engine.submit_booking(cmd).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// 전체 예약 조회 (관리자)
pub async fn handle_get_all_bookings(
    State(state): State<AppState>,
    user: AuthorizedUser,
) -> AppResult<impl IntoResponse> {
    let bookings =
        query::handlers::get_all_bookings(state.bookings.as_ref(), &user.acting()).await?;
    Ok(Json(bookings))
}

/// 사용자별 예약 조회
pub async fn handle_get_user_bookings(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let bookings = query::handlers::get_user_bookings(
        state.directory.as_ref(),
        state.bookings.as_ref(),
        user_id,
    )
    .await?;
    Ok(Json(bookings))
}

/// 예약 단건 조회
pub async fn handle_get_booking(
    State(state): State<AppState>,
    user: AuthorizedUser,
    Path(booking_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    info!("{:<12} --> 예약 조회 id: {}", "HandlerQuery", booking_id);
    let booking = state.engine.get_booking(booking_id, &user.acting()).await?;
    Ok(Json(booking))
}

/// 예약 취소
pub async fn handle_cancel_booking(
    State(state): State<AppState>,
    user: AuthorizedUser,
    Path(booking_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let booking = state
        .engine
        .cancel_booking(booking_id, &user.acting())
        .await?;
    Ok(Json(booking))
}

/// 예약 삭제 (관리자)
pub async fn handle_delete_booking(
    State(state): State<AppState>,
    user: AuthorizedUser,
    Path(booking_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    state
        .engine
        .delete_booking(booking_id, &user.acting())
        .await?;
    Ok(Json(serde_json::json!({
        "message": "예약이 삭제되었습니다.",
        "id": booking_id
    })))
}

// endregion: --- Booking Handlers

// region:    --- Review Handlers

/// 리뷰 작성
pub async fn handle_add_review(
    State(state): State<AppState>,
    user: AuthorizedUser,
    payload: Result<Json<AddReviewCommand>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let cmd = parse_body(payload)?;
    let review = review::add_review(
        state.catalog.as_ref(),
        state.reviews.as_ref(),
        &user.acting(),
        cmd,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// 상품 리뷰 조회
pub async fn handle_get_item_reviews(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    info!("{:<12} --> 상품 리뷰 조회 id: {}", "HandlerQuery", item_id);
    let reviews =
        review::list_reviews(state.catalog.as_ref(), state.reviews.as_ref(), item_id).await?;
    Ok(Json(reviews))
}

// endregion: --- Review Handlers

// region:    --- Admin Handlers

/// 사용자 목록 조회 (관리자, 역할 필터)
pub async fn handle_get_users(
    State(state): State<AppState>,
    user: AuthorizedUser,
    Query(filter): Query<UserFilter>,
) -> AppResult<impl IntoResponse> {
    require_admin(&user)?;
    let role = filter
        .role
        .as_deref()
        .map(str::parse::<Role>)
        .transpose()
        .map_err(|e| AppError::validation("role", e.to_string()))?;
    Ok(Json(state.directory.list_users(role).await?))
}

// endregion: --- Admin Handlers
