/// 예약 기간 계산 및 가격 산정
// region:    --- Imports
use super::model::DateRange;
use crate::error::{AppError, AppResult};
use chrono::{DateTime, Duration, NaiveDate, Utc};

// endregion: --- Imports

// region:    --- Dates
/// 예약 날짜 파싱
/// "YYYY-MM-DD"는 UTC 자정으로, 그 외에는 RFC 3339 타임스탬프로 해석
pub fn parse_booking_date(raw: &str, field: &'static str) -> AppResult<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            AppError::validation(
                field,
                format!("{} 값이 올바른 날짜가 아닙니다: {}", field, raw),
            )
        })
}
// endregion: --- Dates

// region:    --- Pricing
/// 대여 일수. 24시간 미만의 나머지는 하루로 올림
pub fn billable_days(range: &DateRange) -> i64 {
    let span = range.end() - range.start();
    let days = span.num_days();
    if span > Duration::days(days) {
        days + 1
    } else {
        days
    }
}

/// 총 가격 = 대여 일수 * 일일 가격
pub fn total_price(range: &DateRange, daily_price: i64) -> AppResult<i64> {
    billable_days(range)
        .checked_mul(daily_price)
        .ok_or_else(|| AppError::validation("endDate", "예약 기간이 너무 깁니다."))
}
// endregion: --- Pricing
