/// 인증 처리
/// 1. 비밀번호 해시 (Argon2id)
/// 2. 액세스 토큰 발급/검증 (HS256 JWT)
/// 3. 회원 가입, 로그인, 관리자 계정 시드
// region:    --- Imports
use crate::config::AdminSeed;
use crate::directory::model::{NewUser, Role, User};
use crate::directory::UserDirectory;
use crate::error::{AppError, AppResult};
use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::info;

// endregion: --- Imports

pub mod extractor;

// region:    --- Acting User
/// 권한 검사에 사용하는 요청자 정보
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingUser {
    pub id: i64,
    pub role: Role,
}

impl ActingUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for ActingUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
        }
    }
}
// endregion: --- Acting User

// region:    --- Password
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("비밀번호 해시 실패: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
// endregion: --- Password

// region:    --- Token
/// 액세스 토큰 클레임
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub role: Role,
    pub exp: i64,
}

/// 토큰 발급/검증기
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn issue(&self, user: &User) -> AppResult<String> {
        let claims = Claims {
            sub: user.id,
            role: user.role,
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("토큰 발급 실패: {}", e)))
    }

    /// 서명 또는 만료 검증 실패 시 Unauthenticated
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthenticated)
    }
}
// endregion: --- Token

// region:    --- Account Commands
/// 회원 가입 요청
#[derive(Debug, Deserialize)]
pub struct RegisterCommand {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// 로그인 요청
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<String>,
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> AppResult<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::validation(field, format!("{} 항목은 필수입니다.", field)))
}

/// 회원 가입. 역할은 항상 user
pub async fn register(directory: &dyn UserDirectory, cmd: RegisterCommand) -> AppResult<User> {
    let name = required(&cmd.name, "name")?;
    let email = required(&cmd.email, "email")?.to_ascii_lowercase();
    let password = required(&cmd.password, "password")?;

    if directory.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::validation("email", "이미 가입된 이메일입니다."));
    }

    let user = directory
        .create_user(NewUser {
            name: name.to_string(),
            email,
            password_hash: hash_password(password)?,
            role: Role::User,
        })
        .await?;
    info!("{:<12} --> 회원 가입 완료 id: {}", "Auth", user.id);
    Ok(user)
}

/// 자격 증명 확인
pub async fn authenticate(directory: &dyn UserDirectory, credentials: &Credentials) -> AppResult<User> {
    let email = required(&credentials.email, "email")?.to_ascii_lowercase();
    let password = required(&credentials.password, "password")?;

    match directory.find_user_by_email(&email).await? {
        Some(user) if verify_password(password, &user.password_hash) => Ok(user),
        _ => Err(AppError::Unauthenticated),
    }
}

/// 관리자 계정 보장
/// 이미 있으면 비밀번호와 역할을 재설정한다
pub async fn ensure_admin(directory: &dyn UserDirectory, seed: &AdminSeed) -> AppResult<User> {
    let email = seed.email.trim().to_ascii_lowercase();
    let password_hash = hash_password(&seed.password)?;

    let admin = match directory.find_user_by_email(&email).await? {
        Some(existing) => {
            info!("{:<12} --> 관리자 계정 재설정: {}", "Auth", email);
            directory
                .update_credentials(existing.id, password_hash, Role::Admin)
                .await?
        }
        None => {
            info!("{:<12} --> 관리자 계정 생성: {}", "Auth", email);
            directory
                .create_user(NewUser {
                    name: seed.name.clone(),
                    email,
                    password_hash,
                    role: Role::Admin,
                })
                .await?
        }
    };
    Ok(admin)
}
// endregion: --- Account Commands

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: 42,
            name: "tester".into(),
            email: "tester@example.com".into(),
            password_hash: String::new(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("admin123").unwrap();
        assert!(verify_password("admin123", &hash));
        assert!(!verify_password("admin124", &hash));
        assert!(!verify_password("admin123", "not-a-hash"));
    }

    #[test]
    fn token_carries_subject_and_role() {
        let issuer = TokenIssuer::new("secret", 1);
        let token = issuer.issue(&user(Role::Admin)).unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = TokenIssuer::new("secret", 1).issue(&user(Role::User)).unwrap();
        let err = TokenIssuer::new("other", 1).verify(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated));
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = TokenIssuer::new("secret", -2);
        let token = issuer.issue(&user(Role::User)).unwrap();
        assert!(issuer.verify(&token).is_err());
    }
}
