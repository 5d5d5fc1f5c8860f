// region:    --- Imports
use crate::error::AppResult;
use async_trait::async_trait;
use model::{NewUser, Role, User};

// endregion: --- Imports

pub mod model;

// region:    --- User Directory Trait
/// 사용자 디렉터리 트레이트
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user_by_id(&self, user_id: i64) -> AppResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;
    /// 이메일이 이미 존재하면 ValidationError
    async fn create_user(&self, user: NewUser) -> AppResult<User>;
    async fn update_credentials(
        &self,
        user_id: i64,
        password_hash: String,
        role: Role,
    ) -> AppResult<User>;
    /// 역할 필터 조회 (None이면 전체)
    async fn list_users(&self, role: Option<Role>) -> AppResult<Vec<User>>;
}
// endregion: --- User Directory Trait
