/// 예약 관련 커맨드 처리
/// 1. 예약 접수 (검증, 가격 산정, 충돌 검사)
/// 2. 예약 취소
/// 3. 예약 삭제 (관리자)
/// 4. 예약 완료 처리
// region:    --- Imports
use super::model::{
    Admission, Booking, BookingStatus, DateRange, NewBooking, SubmitBookingCommand, Transition,
};
use super::{pricing, BookingStore};
use crate::auth::ActingUser;
use crate::catalog::Catalog;
use crate::directory::UserDirectory;
use crate::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Validated Request
/// 검증을 통과한 예약 요청
#[derive(Debug, Clone)]
pub struct ValidatedBooking {
    pub item_id: i64,
    pub user_id: i64,
    pub range: DateRange,
}

impl SubmitBookingCommand {
    /// 필수 항목 누락, 날짜 형식, 기간 검증
    pub fn validate(&self) -> AppResult<ValidatedBooking> {
        let item_id = self
            .item_id
            .ok_or_else(|| AppError::validation("itemId", "itemId 항목은 필수입니다."))?;
        let user_id = self
            .user_id
            .ok_or_else(|| AppError::validation("userId", "userId 항목은 필수입니다."))?;
        let start_raw = self
            .start_date
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| AppError::validation("startDate", "startDate 항목은 필수입니다."))?;
        let end_raw = self
            .end_date
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| AppError::validation("endDate", "endDate 항목은 필수입니다."))?;

        let start = pricing::parse_booking_date(start_raw, "startDate")?;
        let end = pricing::parse_booking_date(end_raw, "endDate")?;
        let range = DateRange::new(start, end).ok_or_else(|| {
            AppError::validation("endDate", "종료일은 시작일보다 뒤여야 합니다.")
        })?;

        Ok(ValidatedBooking {
            item_id,
            user_id,
            range,
        })
    }
}
// endregion: --- Validated Request

// region:    --- Booking Engine
/// 예약 접수 및 가격 산정 엔진
/// 모든 상태는 저장소에 있으며 엔진은 공유 가변 상태를 갖지 않는다.
pub struct BookingEngine {
    catalog: Arc<dyn Catalog>,
    directory: Arc<dyn UserDirectory>,
    store: Arc<dyn BookingStore>,
}

impl BookingEngine {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        directory: Arc<dyn UserDirectory>,
        store: Arc<dyn BookingStore>,
    ) -> Self {
        Self {
            catalog,
            directory,
            store,
        }
    }

    /// 1. 예약 접수
    pub async fn submit_booking(&self, cmd: SubmitBookingCommand) -> AppResult<Booking> {
        info!("{:<12} --> 예약 요청 처리 시작: {:?}", "Command", cmd);
        let request = cmd.validate()?;

        let item = self
            .catalog
            .find_item_by_id(request.item_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(
                    "itemId",
                    format!("상품을 찾을 수 없습니다. itemId: {}", request.item_id),
                )
            })?;

        if self
            .directory
            .find_user_by_id(request.user_id)
            .await?
            .is_none()
        {
            return Err(AppError::not_found(
                "userId",
                format!("사용자를 찾을 수 없습니다. userId: {}", request.user_id),
            ));
        }

        let total_price = pricing::total_price(&request.range, item.price)?;

        let new_booking = NewBooking {
            item_id: item.id,
            user_id: request.user_id,
            range: request.range,
            total_price,
            status: BookingStatus::Confirmed,
            created_at: Utc::now(),
        };

        match self.store.insert_if_available(new_booking).await? {
            Admission::Admitted(booking) => {
                info!(
                    "{:<12} --> 예약 확정 id: {}, 총 가격: {}",
                    "Command", booking.id, booking.total_price
                );
                Ok(booking)
            }
            Admission::Rejected(existing) => {
                warn!(
                    "{:<12} --> 예약 기간 충돌: 기존 예약 id {}",
                    "Command", existing.id
                );
                Err(AppError::Conflict {
                    booking_id: existing.id,
                    start_date: existing.start_date,
                    end_date: existing.end_date,
                })
            }
        }
    }

    /// 예약 단건 조회 (본인 또는 관리자)
    pub async fn get_booking(&self, booking_id: i64, actor: &ActingUser) -> AppResult<Booking> {
        let booking = self.load(booking_id).await?;
        ensure_owner_or_admin(&booking, actor)?;
        Ok(booking)
    }

    /// 2. 예약 취소
    /// 이미 취소된 예약은 그대로 반환, 완료된 예약은 InvalidState
    pub async fn cancel_booking(&self, booking_id: i64, actor: &ActingUser) -> AppResult<Booking> {
        info!(
            "{:<12} --> 예약 취소 요청 id: {}, 요청자: {}",
            "Command", booking_id, actor.id
        );
        let booking = self.load(booking_id).await?;
        ensure_owner_or_admin(&booking, actor)?;
        self.transition(booking, BookingStatus::Cancelled).await
    }

    /// 3. 예약 삭제 (관리자 전용, 상태와 무관하게 삭제)
    pub async fn delete_booking(&self, booking_id: i64, actor: &ActingUser) -> AppResult<()> {
        info!(
            "{:<12} --> 예약 삭제 요청 id: {}, 요청자: {}",
            "Command", booking_id, actor.id
        );
        if !actor.is_admin() {
            return Err(AppError::Authorization(
                "관리자만 예약을 삭제할 수 있습니다.".to_string(),
            ));
        }
        if !self.store.delete_booking(booking_id).await? {
            return Err(booking_not_found(booking_id));
        }
        Ok(())
    }

    /// 4. 예약 완료 처리 (confirmed -> completed)
    pub async fn complete_booking(&self, booking_id: i64) -> AppResult<Booking> {
        let booking = self.load(booking_id).await?;
        self.transition(booking, BookingStatus::Completed).await
    }

    /// 종료일이 지난 확정 예약 일괄 완료
    pub async fn complete_elapsed(&self, now: DateTime<Utc>) -> AppResult<u64> {
        self.store.complete_elapsed(now).await
    }

    async fn load(&self, booking_id: i64) -> AppResult<Booking> {
        self.store
            .find_booking(booking_id)
            .await?
            .ok_or_else(|| booking_not_found(booking_id))
    }

    /// 조건부 상태 변경
    /// 다른 요청이 먼저 상태를 바꾼 경우 다시 읽어서 판정한다
    async fn transition(&self, mut booking: Booking, target: BookingStatus) -> AppResult<Booking> {
        loop {
            match booking.status.transition_to(target) {
                Some(Transition::NoOp) => return Ok(booking),
                None => {
                    return Err(AppError::InvalidState(format!(
                        "{} 상태의 예약은 {} 상태로 변경할 수 없습니다.",
                        booking.status, target
                    )))
                }
                Some(Transition::Apply) => {}
            }

            if let Some(updated) = self
                .store
                .update_status(booking.id, &[booking.status], target)
                .await?
            {
                info!(
                    "{:<12} --> 예약 상태 변경 id: {}, {} -> {}",
                    "Command", updated.id, booking.status, target
                );
                return Ok(updated);
            }

            booking = self.load(booking.id).await?;
        }
    }
}

fn ensure_owner_or_admin(booking: &Booking, actor: &ActingUser) -> AppResult<()> {
    if actor.is_admin() || booking.user_id == actor.id {
        Ok(())
    } else {
        Err(AppError::Authorization(
            "본인의 예약만 처리할 수 있습니다.".to_string(),
        ))
    }
}

fn booking_not_found(booking_id: i64) -> AppError {
    AppError::not_found(
        "bookingId",
        format!("예약을 찾을 수 없습니다. bookingId: {}", booking_id),
    )
}
// endregion: --- Booking Engine
