/// 상품 리뷰
// region:    --- Imports
use crate::auth::ActingUser;
use crate::catalog::Catalog;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::Utc;
use model::{AddReviewCommand, NewReview, ReviewView};
use tracing::info;

// endregion: --- Imports

pub mod model;

// region:    --- Review Store Trait
#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn create_review(&self, review: NewReview) -> AppResult<ReviewView>;
    /// 최신순
    async fn list_reviews_for_item(&self, item_id: i64) -> AppResult<Vec<ReviewView>>;
}
// endregion: --- Review Store Trait

// region:    --- Commands
/// 리뷰 작성. 평점은 1~5, 코멘트는 필수
pub async fn add_review(
    catalog: &dyn Catalog,
    store: &dyn ReviewStore,
    actor: &ActingUser,
    cmd: AddReviewCommand,
) -> AppResult<ReviewView> {
    let item_id = cmd
        .item_id
        .ok_or_else(|| AppError::validation("itemId", "itemId 항목은 필수입니다."))?;
    let rating = match cmd.rating {
        Some(r) if (1..=5).contains(&r) => r,
        Some(_) => {
            return Err(AppError::validation(
                "rating",
                "평점은 1에서 5 사이여야 합니다.",
            ))
        }
        None => return Err(AppError::validation("rating", "rating 항목은 필수입니다.")),
    };
    let comment = cmd
        .comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::validation("comment", "comment 항목은 필수입니다."))?;

    if catalog.find_item_by_id(item_id).await?.is_none() {
        return Err(AppError::not_found(
            "itemId",
            format!("상품을 찾을 수 없습니다. itemId: {}", item_id),
        ));
    }

    let review = store
        .create_review(NewReview {
            item_id,
            user_id: actor.id,
            rating,
            comment,
            created_at: Utc::now(),
        })
        .await?;
    info!(
        "{:<12} --> 리뷰 등록 id: {}, 상품: {}",
        "Command", review.review.id, item_id
    );
    Ok(review)
}

/// 상품 리뷰 목록. 상품이 없으면 NotFound
pub async fn list_reviews(
    catalog: &dyn Catalog,
    store: &dyn ReviewStore,
    item_id: i64,
) -> AppResult<Vec<ReviewView>> {
    if catalog.find_item_by_id(item_id).await?.is_none() {
        return Err(AppError::not_found(
            "itemId",
            format!("상품을 찾을 수 없습니다. itemId: {}", item_id),
        ));
    }
    store.list_reviews_for_item(item_id).await
}
// endregion: --- Commands
