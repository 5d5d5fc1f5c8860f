// region:    --- Imports
use crate::error::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use model::{Admission, AdminBookingView, Booking, BookingStatus, NewBooking, UserBookingView};

// endregion: --- Imports

pub mod commands;
pub mod conflict;
pub mod model;
pub mod pricing;

// region:    --- Booking Store Trait
/// 예약 저장소 트레이트
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// 같은 상품에 대한 충돌 검사와 삽입을 하나의 원자적 단위로 수행
    async fn insert_if_available(&self, booking: NewBooking) -> AppResult<Admission>;

    async fn find_booking(&self, booking_id: i64) -> AppResult<Option<Booking>>;

    /// 현재 상태가 from 중 하나일 때만 to로 변경, 변경되지 않았으면 None
    async fn update_status(
        &self,
        booking_id: i64,
        from: &[BookingStatus],
        to: BookingStatus,
    ) -> AppResult<Option<Booking>>;

    /// 삭제된 행이 없으면 false
    async fn delete_booking(&self, booking_id: i64) -> AppResult<bool>;

    /// 최신순
    async fn list_bookings_for_user(&self, user_id: i64) -> AppResult<Vec<UserBookingView>>;

    /// 최신순
    async fn list_all_bookings(&self) -> AppResult<Vec<AdminBookingView>>;

    /// 종료일이 지난 confirmed 예약을 completed로 변경하고 변경 건수 반환
    async fn complete_elapsed(&self, now: DateTime<Utc>) -> AppResult<u64>;
}
// endregion: --- Booking Store Trait
