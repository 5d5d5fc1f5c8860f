// region:    --- Imports
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, warn};

// endregion: --- Imports

// region:    --- App Error
/// 요청 경계에서 응답으로 변환되는 에러 분류
#[derive(Error, Debug)]
pub enum AppError {
    /// 요청 필드 누락 또는 형식 오류
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    /// 참조한 상품/사용자/예약이 존재하지 않음
    #[error("{message}")]
    NotFound { field: &'static str, message: String },

    /// 같은 상품에 대해 기간이 겹치는 예약이 이미 존재
    #[error("예약 기간이 기존 예약({booking_id}: {start_date} ~ {end_date})과 겹칩니다.")]
    Conflict {
        booking_id: i64,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    },

    #[error("로그인이 필요합니다.")]
    Unauthenticated,

    #[error("{0}")]
    Authorization(String),

    /// 허용되지 않는 상태 전이
    #[error("{0}")]
    InvalidState(String),

    /// 저장소 타임아웃/일시적 장애. 재시도 가능
    #[error("저장소를 일시적으로 사용할 수 없습니다. 잠시 후 다시 시도해 주세요.")]
    Transient(#[source] sqlx::Error),

    #[error("데이터베이스 처리 중 오류가 발생했습니다.")]
    Database(#[source] sqlx::Error),

    #[error("{0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(field: &'static str, message: impl Into<String>) -> Self {
        AppError::NotFound {
            field,
            message: message.into(),
        }
    }

    /// 에러 종류 코드
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::NotFound { .. } => "NOT_FOUND",
            AppError::Conflict { .. } => "CONFLICT",
            AppError::Unauthenticated => "UNAUTHENTICATED",
            AppError::Authorization(_) => "FORBIDDEN",
            AppError::InvalidState(_) => "INVALID_STATE",
            AppError::Transient(_) => "TRANSIENT",
            AppError::Database(_) | AppError::Internal(_) => "INTERNAL",
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::Transient(_))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::InvalidState(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// 타임아웃, 직렬화 실패, 데드락은 재시도 가능한 일시적 에러로 분류
impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::Transient(e)
            }
            sqlx::Error::Database(db)
                if matches!(db.code().as_deref(), Some("40001" | "40P01" | "57014")) =>
            {
                AppError::Transient(e)
            }
            _ => AppError::Database(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        let body = match &self {
            AppError::Validation { field, message } | AppError::NotFound { field, message } => {
                serde_json::json!({ "error": message, "code": code, "field": field })
            }
            AppError::Conflict {
                booking_id,
                start_date,
                end_date,
            } => serde_json::json!({
                "error": self.to_string(),
                "code": code,
                "conflictingBooking": {
                    "id": booking_id,
                    "startDate": start_date,
                    "endDate": end_date,
                }
            }),
            AppError::Transient(e) => {
                warn!("{:<12} --> 일시적 저장소 오류: {:?}", "Error", e);
                serde_json::json!({ "error": self.to_string(), "code": code })
            }
            AppError::Database(e) => {
                error!("{:<12} --> 예기치 못한 데이터베이스 오류: {:?}", "Error", e);
                serde_json::json!({ "error": "서버 내부 오류가 발생했습니다.", "code": code })
            }
            AppError::Internal(detail) => {
                error!("{:<12} --> 예기치 못한 오류: {}", "Error", detail);
                serde_json::json!({ "error": "서버 내부 오류가 발생했습니다.", "code": code })
            }
            _ => serde_json::json!({ "error": self.to_string(), "code": code }),
        };

        if self.is_transient() {
            return (status, [(header::RETRY_AFTER, "1")], Json(body)).into_response();
        }
        (status, Json(body)).into_response()
    }
}
// endregion: --- App Error

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_timeout_is_transient() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        assert!(err.is_transient());
        assert_eq!(err.code(), "TRANSIENT");
    }

    #[test]
    fn row_not_found_is_internal() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert!(!err.is_transient());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn conflict_maps_to_409() {
        let now = Utc::now();
        let err = AppError::Conflict {
            booking_id: 7,
            start_date: now,
            end_date: now,
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(err.to_string().contains('7'));
    }
}
