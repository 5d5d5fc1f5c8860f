// region:    --- Imports
use crate::auth::ActingUser;
use crate::booking::model::{AdminBookingView, UserBookingView};
use crate::booking::BookingStore;
use crate::directory::UserDirectory;
use crate::error::{AppError, AppResult};
use tracing::info;

// endregion: --- Imports

// region:    --- Query Handlers

/// 사용자별 예약 조회 (최신순)
/// 사용자가 없을 때만 NotFound, 빈 목록은 정상 결과
pub async fn get_user_bookings(
    directory: &dyn UserDirectory,
    store: &dyn BookingStore,
    user_id: i64,
) -> AppResult<Vec<UserBookingView>> {
    info!("{:<12} --> 사용자 예약 조회 id: {}", "Query", user_id);
    if directory.find_user_by_id(user_id).await?.is_none() {
        return Err(AppError::not_found(
            "userId",
            format!("사용자를 찾을 수 없습니다. userId: {}", user_id),
        ));
    }
    store.list_bookings_for_user(user_id).await
}

/// 전체 예약 조회 (관리자 전용, 최신순)
pub async fn get_all_bookings(
    store: &dyn BookingStore,
    actor: &ActingUser,
) -> AppResult<Vec<AdminBookingView>> {
    info!("{:<12} --> 전체 예약 조회 요청자: {}", "Query", actor.id);
    if !actor.is_admin() {
        return Err(AppError::Authorization(
            "관리자만 전체 예약을 조회할 수 있습니다.".to_string(),
        ));
    }
    store.list_all_bookings().await
}

// endregion: --- Query Handlers
