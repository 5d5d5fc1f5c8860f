/// 인메모리 저장소 구현체
/// 테스트와 STORE_BACKEND=memory 실행용. 충돌 검사와 삽입은 하나의 쓰기 잠금 안에서 수행한다.
// region:    --- Imports
use crate::booking::conflict::find_conflict;
use crate::booking::model::{
    Admission, AdminBookingView, Booking, BookingStatus, ItemSummary, NewBooking,
    UserBookingView, UserSummary,
};
use crate::booking::BookingStore;
use crate::catalog::model::{Category, Item, NewItem};
use crate::catalog::Catalog;
use crate::directory::model::{NewUser, Role, User};
use crate::directory::UserDirectory;
use crate::error::{AppError, AppResult};
use crate::review::model::{NewReview, Review, ReviewView};
use crate::review::ReviewStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

// endregion: --- Imports

#[derive(Default)]
struct Tables {
    next_id: i64,
    items: BTreeMap<i64, Item>,
    users: BTreeMap<i64, User>,
    bookings: BTreeMap<i64, Booking>,
    reviews: BTreeMap<i64, Review>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn item_summary(&self, item_id: i64) -> AppResult<ItemSummary> {
        let item = self.items.get(&item_id).ok_or_else(|| {
            AppError::Internal(format!("예약이 참조하는 상품이 없습니다: {}", item_id))
        })?;
        Ok(ItemSummary {
            name: item.name.clone(),
            category: item.category,
            price: item.price,
            location: item.location.clone(),
            image: item.image.clone(),
        })
    }

    /// 최신순 (생성 시각, id 역순)
    fn bookings_newest_first(&self) -> Vec<&Booking> {
        let mut bookings: Vec<&Booking> = self.bookings.values().collect();
        bookings.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        bookings
    }

    fn review_view(&self, review: &Review) -> ReviewView {
        ReviewView {
            review: review.clone(),
            user_name: self
                .users
                .get(&review.user_id)
                .map(|u| u.name.clone())
                .unwrap_or_default(),
        }
    }
}

// region:    --- Memory Store
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Catalog for MemoryStore {
    async fn find_item_by_id(&self, item_id: i64) -> AppResult<Option<Item>> {
        Ok(self.tables.read().await.items.get(&item_id).cloned())
    }

    async fn list_items(&self, category: Option<Category>) -> AppResult<Vec<Item>> {
        let tables = self.tables.read().await;
        let mut items: Vec<Item> = tables
            .items
            .values()
            .filter(|item| category.map_or(true, |c| item.category == c))
            .cloned()
            .collect();
        items.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(items)
    }

    async fn create_item(&self, item: NewItem) -> AppResult<Item> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let created = Item {
            id,
            name: item.name,
            category: item.category,
            price: item.price,
            location: item.location,
            description: item.description,
            owner_name: item.owner_name,
            owner_contact: item.owner_contact,
            image: item.image,
            created_at: Utc::now(),
        };
        tables.items.insert(id, created.clone());
        Ok(created)
    }

    async fn delete_item(&self, item_id: i64) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.items.remove(&item_id).is_none() {
            return Ok(false);
        }
        tables.bookings.retain(|_, b| b.item_id != item_id);
        tables.reviews.retain(|_, r| r.item_id != item_id);
        Ok(true)
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_user_by_id(&self, user_id: i64) -> AppResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(AppError::validation("email", "이미 가입된 이메일입니다."));
        }
        let id = tables.next_id();
        let created = User {
            id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        tables.users.insert(id, created.clone());
        Ok(created)
    }

    async fn update_credentials(
        &self,
        user_id: i64,
        password_hash: String,
        role: Role,
    ) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        let user = tables.users.get_mut(&user_id).ok_or_else(|| {
            AppError::not_found(
                "userId",
                format!("사용자를 찾을 수 없습니다. userId: {}", user_id),
            )
        })?;
        user.password_hash = password_hash;
        user.role = role;
        Ok(user.clone())
    }

    async fn list_users(&self, role: Option<Role>) -> AppResult<Vec<User>> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|u| role.map_or(true, |r| u.role == r))
            .cloned()
            .collect();
        users.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(users)
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn insert_if_available(&self, booking: NewBooking) -> AppResult<Admission> {
        let mut tables = self.tables.write().await;
        if !tables.items.contains_key(&booking.item_id) {
            return Err(AppError::not_found(
                "itemId",
                format!("상품을 찾을 수 없습니다. itemId: {}", booking.item_id),
            ));
        }
        if !tables.users.contains_key(&booking.user_id) {
            return Err(AppError::not_found(
                "userId",
                format!("사용자를 찾을 수 없습니다. userId: {}", booking.user_id),
            ));
        }

        if let Some(existing) =
            find_conflict(tables.bookings.values(), booking.item_id, &booking.range)
        {
            return Ok(Admission::Rejected(existing.clone()));
        }

        let id = tables.next_id();
        let created = Booking {
            id,
            item_id: booking.item_id,
            user_id: booking.user_id,
            start_date: booking.range.start(),
            end_date: booking.range.end(),
            total_price: booking.total_price,
            status: booking.status,
            created_at: booking.created_at,
        };
        tables.bookings.insert(id, created.clone());
        Ok(Admission::Admitted(created))
    }

    async fn find_booking(&self, booking_id: i64) -> AppResult<Option<Booking>> {
        Ok(self.tables.read().await.bookings.get(&booking_id).cloned())
    }

    async fn update_status(
        &self,
        booking_id: i64,
        from: &[BookingStatus],
        to: BookingStatus,
    ) -> AppResult<Option<Booking>> {
        let mut tables = self.tables.write().await;
        match tables.bookings.get_mut(&booking_id) {
            Some(booking) if from.contains(&booking.status) => {
                booking.status = to;
                Ok(Some(booking.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_booking(&self, booking_id: i64) -> AppResult<bool> {
        Ok(self
            .tables
            .write()
            .await
            .bookings
            .remove(&booking_id)
            .is_some())
    }

    async fn list_bookings_for_user(&self, user_id: i64) -> AppResult<Vec<UserBookingView>> {
        let tables = self.tables.read().await;
        tables
            .bookings_newest_first()
            .into_iter()
            .filter(|b| b.user_id == user_id)
            .map(|b| {
                Ok(UserBookingView {
                    booking: b.clone(),
                    item: tables.item_summary(b.item_id)?,
                })
            })
            .collect()
    }

    async fn list_all_bookings(&self) -> AppResult<Vec<AdminBookingView>> {
        let tables = self.tables.read().await;
        tables
            .bookings_newest_first()
            .into_iter()
            .map(|b| {
                let user = tables.users.get(&b.user_id).ok_or_else(|| {
                    AppError::Internal(format!("예약이 참조하는 사용자가 없습니다: {}", b.user_id))
                })?;
                Ok(AdminBookingView {
                    booking: b.clone(),
                    item: tables.item_summary(b.item_id)?,
                    user: UserSummary {
                        name: user.name.clone(),
                        email: user.email.clone(),
                    },
                })
            })
            .collect()
    }

    async fn complete_elapsed(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let mut completed = 0;
        for booking in tables.bookings.values_mut() {
            if booking.status == BookingStatus::Confirmed && booking.end_date <= now {
                booking.status = BookingStatus::Completed;
                completed += 1;
            }
        }
        Ok(completed)
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn create_review(&self, review: NewReview) -> AppResult<ReviewView> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let created = Review {
            id,
            item_id: review.item_id,
            user_id: review.user_id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
        };
        tables.reviews.insert(id, created.clone());
        Ok(tables.review_view(&created))
    }

    async fn list_reviews_for_item(&self, item_id: i64) -> AppResult<Vec<ReviewView>> {
        let tables = self.tables.read().await;
        let mut reviews: Vec<&Review> = tables
            .reviews
            .values()
            .filter(|r| r.item_id == item_id)
            .collect();
        reviews.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(reviews.into_iter().map(|r| tables.review_view(r)).collect())
    }
}
// endregion: --- Memory Store
