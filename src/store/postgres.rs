/// Postgres 저장소 구현체
/// 카탈로그, 사용자 디렉터리, 예약, 리뷰 저장소 트레이트를 모두 구현한다.
// region:    --- Imports
use crate::booking::model::{
    Admission, AdminBookingView, Booking, BookingStatus, ItemSummary, NewBooking,
    UserBookingView, UserSummary,
};
use crate::booking::BookingStore;
use crate::catalog::model::{Category, Item, NewItem};
use crate::catalog::Catalog;
use crate::database::DatabaseManager;
use crate::directory::model::{NewUser, Role, User};
use crate::directory::UserDirectory;
use crate::error::{AppError, AppResult};
use crate::query::queries;
use crate::review::model::{NewReview, ReviewView};
use crate::review::ReviewStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

// endregion: --- Imports

// 일시적 오류(직렬화 실패, 데드락, 타임아웃) 최대 재시도 횟수
const MAX_RETRIES: u32 = 3;

// region:    --- Rows
#[derive(FromRow)]
struct UserBookingRow {
    #[sqlx(flatten)]
    booking: Booking,
    item_name: String,
    #[sqlx(try_from = "String")]
    item_category: Category,
    item_price: i64,
    item_location: String,
    item_image: String,
}

impl UserBookingRow {
    fn into_view(self) -> UserBookingView {
        UserBookingView {
            booking: self.booking,
            item: ItemSummary {
                name: self.item_name,
                category: self.item_category,
                price: self.item_price,
                location: self.item_location,
                image: self.item_image,
            },
        }
    }
}

#[derive(FromRow)]
struct AdminBookingRow {
    #[sqlx(flatten)]
    inner: UserBookingRow,
    user_name: String,
    user_email: String,
}
// endregion: --- Rows

// region:    --- Postgres Store
pub struct PostgresStore {
    db: Arc<DatabaseManager>,
}

impl PostgresStore {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// 상품 행 잠금 -> 겹치는 예약 조회 -> 삽입을 하나의 트랜잭션으로 실행
    async fn try_admit(&self, booking: NewBooking) -> AppResult<Admission> {
        self.db
            .transaction::<_, Admission, AppError>(|tx| {
                Box::pin(async move {
                    let locked = sqlx::query_scalar::<_, i64>(queries::LOCK_ITEM)
                        .bind(booking.item_id)
                        .fetch_optional(&mut **tx)
                        .await?;
                    if locked.is_none() {
                        return Err(AppError::not_found(
                            "itemId",
                            format!("상품을 찾을 수 없습니다. itemId: {}", booking.item_id),
                        ));
                    }

                    let user = sqlx::query_scalar::<_, i64>(queries::LOCK_USER)
                        .bind(booking.user_id)
                        .fetch_optional(&mut **tx)
                        .await?;
                    if user.is_none() {
                        return Err(AppError::not_found(
                            "userId",
                            format!("사용자를 찾을 수 없습니다. userId: {}", booking.user_id),
                        ));
                    }

                    let overlapping =
                        sqlx::query_as::<_, Booking>(queries::FIND_OVERLAPPING_BOOKING)
                            .bind(booking.item_id)
                            .bind(booking.range.start())
                            .bind(booking.range.end())
                            .fetch_optional(&mut **tx)
                            .await?;
                    if let Some(existing) = overlapping {
                        return Ok(Admission::Rejected(existing));
                    }

                    let created = sqlx::query_as::<_, Booking>(queries::INSERT_BOOKING)
                        .bind(booking.item_id)
                        .bind(booking.user_id)
                        .bind(booking.range.start())
                        .bind(booking.range.end())
                        .bind(booking.total_price)
                        .bind(booking.status.as_str())
                        .bind(booking.created_at)
                        .fetch_one(&mut **tx)
                        .await?;
                    Ok(Admission::Admitted(created))
                })
            })
            .await
    }
}

#[async_trait]
impl Catalog for PostgresStore {
    async fn find_item_by_id(&self, item_id: i64) -> AppResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(queries::GET_ITEM)
            .bind(item_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(item)
    }

    async fn list_items(&self, category: Option<Category>) -> AppResult<Vec<Item>> {
        let items = match category {
            Some(category) => {
                sqlx::query_as::<_, Item>(queries::GET_ITEMS_BY_CATEGORY)
                    .bind(category.as_str())
                    .fetch_all(self.db.pool())
                    .await?
            }
            None => {
                sqlx::query_as::<_, Item>(queries::GET_ALL_ITEMS)
                    .fetch_all(self.db.pool())
                    .await?
            }
        };
        Ok(items)
    }

    async fn create_item(&self, item: NewItem) -> AppResult<Item> {
        let created = sqlx::query_as::<_, Item>(queries::INSERT_ITEM)
            .bind(&item.name)
            .bind(item.category.as_str())
            .bind(item.price)
            .bind(&item.location)
            .bind(&item.description)
            .bind(&item.owner_name)
            .bind(&item.owner_contact)
            .bind(&item.image)
            .fetch_one(self.db.pool())
            .await?;
        Ok(created)
    }

    async fn delete_item(&self, item_id: i64) -> AppResult<bool> {
        let result = sqlx::query(queries::DELETE_ITEM)
            .bind(item_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserDirectory for PostgresStore {
    async fn find_user_by_id(&self, user_id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(queries::GET_USER)
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(queries::GET_USER_BY_EMAIL)
            .bind(email)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(queries::INSERT_USER)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| AppError::validation("email", "이미 가입된 이메일입니다."))
    }

    async fn update_credentials(
        &self,
        user_id: i64,
        password_hash: String,
        role: Role,
    ) -> AppResult<User> {
        sqlx::query_as::<_, User>(queries::UPDATE_USER_CREDENTIALS)
            .bind(user_id)
            .bind(password_hash)
            .bind(role.as_str())
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| {
                AppError::not_found(
                    "userId",
                    format!("사용자를 찾을 수 없습니다. userId: {}", user_id),
                )
            })
    }

    async fn list_users(&self, role: Option<Role>) -> AppResult<Vec<User>> {
        let users = match role {
            Some(role) => {
                sqlx::query_as::<_, User>(queries::GET_USERS_BY_ROLE)
                    .bind(role.as_str())
                    .fetch_all(self.db.pool())
                    .await?
            }
            None => {
                sqlx::query_as::<_, User>(queries::GET_ALL_USERS)
                    .fetch_all(self.db.pool())
                    .await?
            }
        };
        Ok(users)
    }
}

#[async_trait]
impl BookingStore for PostgresStore {
    async fn insert_if_available(&self, booking: NewBooking) -> AppResult<Admission> {
        let mut attempt = 0;
        loop {
            match self.try_admit(booking.clone()).await {
                Err(e) if e.is_transient() && attempt + 1 < MAX_RETRIES => {
                    attempt += 1;
                    warn!(
                        "{:<12} --> 예약 트랜잭션 일시적 오류, 재시도 {}/{}: {:?}",
                        "Store", attempt, MAX_RETRIES, e
                    );
                    tokio::time::sleep(Duration::from_millis(50 * u64::from(attempt))).await;
                }
                result => return result,
            }
        }
    }

    async fn find_booking(&self, booking_id: i64) -> AppResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>(queries::GET_BOOKING)
            .bind(booking_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(booking)
    }

    async fn update_status(
        &self,
        booking_id: i64,
        from: &[BookingStatus],
        to: BookingStatus,
    ) -> AppResult<Option<Booking>> {
        let from: Vec<&str> = from.iter().map(BookingStatus::as_str).collect();
        let booking = sqlx::query_as::<_, Booking>(queries::UPDATE_BOOKING_STATUS)
            .bind(booking_id)
            .bind(from)
            .bind(to.as_str())
            .fetch_optional(self.db.pool())
            .await?;
        Ok(booking)
    }

    async fn delete_booking(&self, booking_id: i64) -> AppResult<bool> {
        let result = sqlx::query(queries::DELETE_BOOKING)
            .bind(booking_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_bookings_for_user(&self, user_id: i64) -> AppResult<Vec<UserBookingView>> {
        let rows = sqlx::query_as::<_, UserBookingRow>(queries::GET_USER_BOOKINGS)
            .bind(user_id)
            .fetch_all(self.db.pool())
            .await?;
        Ok(rows.into_iter().map(UserBookingRow::into_view).collect())
    }

    async fn list_all_bookings(&self) -> AppResult<Vec<AdminBookingView>> {
        let rows = sqlx::query_as::<_, AdminBookingRow>(queries::GET_ALL_BOOKINGS)
            .fetch_all(self.db.pool())
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let view = row.inner.into_view();
                AdminBookingView {
                    booking: view.booking,
                    item: view.item,
                    user: UserSummary {
                        name: row.user_name,
                        email: row.user_email,
                    },
                }
            })
            .collect())
    }

    async fn complete_elapsed(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(queries::COMPLETE_ELAPSED_BOOKINGS)
            .bind(now)
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() > 0 {
            info!(
                "{:<12} --> 완료 처리된 예약 수: {}",
                "Store",
                result.rows_affected()
            );
        }
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ReviewStore for PostgresStore {
    async fn create_review(&self, review: NewReview) -> AppResult<ReviewView> {
        let created = sqlx::query_as::<_, ReviewView>(queries::INSERT_REVIEW)
            .bind(review.item_id)
            .bind(review.user_id)
            .bind(review.rating)
            .bind(&review.comment)
            .bind(review.created_at)
            .fetch_one(self.db.pool())
            .await?;
        Ok(created)
    }

    async fn list_reviews_for_item(&self, item_id: i64) -> AppResult<Vec<ReviewView>> {
        let reviews = sqlx::query_as::<_, ReviewView>(queries::GET_ITEM_REVIEWS)
            .bind(item_id)
            .fetch_all(self.db.pool())
            .await?;
        Ok(reviews)
    }
}
// endregion: --- Postgres Store
