use crate::catalog::model::Category;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// region:    --- Booking Status
/// 예약 상태
/// confirmed -> completed, {pending, confirmed} -> cancelled 만 허용
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

/// 상태 전이 판정 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Apply,
    NoOp,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }

    /// 충돌 검사 대상 여부 (취소된 예약은 기간을 점유하지 않음)
    pub fn blocks_dates(&self) -> bool {
        *self != BookingStatus::Cancelled
    }

    /// 현재 상태에서 target으로의 전이 가능 여부
    /// 같은 상태로의 전이는 NoOp, 허용되지 않으면 None
    pub fn transition_to(self, target: BookingStatus) -> Option<Transition> {
        use BookingStatus::*;
        match (self, target) {
            (from, to) if from == to => Some(Transition::NoOp),
            (Pending, Confirmed) | (Confirmed, Completed) => Some(Transition::Apply),
            (Pending | Confirmed, Cancelled) => Some(Transition::Apply),
            _ => None,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("알 수 없는 예약 상태입니다: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for BookingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

impl TryFrom<String> for BookingStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
// endregion: --- Booking Status

// region:    --- Date Range
/// 반개구간 [start, end) 예약 기간
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    /// start < end 인 경우에만 생성
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}
// endregion: --- Date Range

// region:    --- Booking
// 예약 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub item_id: i64,
    pub user_id: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_price: i64,
    #[sqlx(try_from = "String")]
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }
}

// 예약 생성 요청
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBookingCommand {
    pub item_id: Option<i64>,
    pub user_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

// 저장소에 기록할 신규 예약
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub item_id: i64,
    pub user_id: i64,
    pub range: DateRange,
    pub total_price: i64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// 충돌 검사와 삽입을 묶은 결과
#[derive(Debug, Clone)]
pub enum Admission {
    Admitted(Booking),
    Rejected(Booking),
}
// endregion: --- Booking

// region:    --- Views
// 예약에 표시할 상품 정보
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    pub name: String,
    pub category: Category,
    pub price: i64,
    pub location: String,
    pub image: String,
}

// 예약에 표시할 사용자 정보
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub name: String,
    pub email: String,
}

// 사용자별 예약 조회 결과
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub item: ItemSummary,
}

// 관리자 전체 예약 조회 결과
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminBookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub item: ItemSummary,
    pub user: UserSummary,
}
// endregion: --- Views
