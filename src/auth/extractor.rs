// region:    --- Imports
use super::ActingUser;
use crate::directory::model::User;
use crate::error::AppError;
use crate::handlers::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::RequestPartsExt;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;

// endregion: --- Imports

/// Bearer 토큰을 검증한 요청자
pub struct AuthorizedUser {
    pub user: User,
}

impl AuthorizedUser {
    pub fn acting(&self) -> ActingUser {
        ActingUser::from(&self.user)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthorizedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::Unauthenticated)?;

        let claims = state.tokens.verify(bearer.token())?;

        // 토큰 발급 이후 삭제된 사용자는 거부
        let user = state
            .directory
            .find_user_by_id(claims.sub)
            .await?
            .ok_or(AppError::Unauthenticated)?;

        Ok(Self { user })
    }
}
