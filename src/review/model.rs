use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 리뷰 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub item_id: i64,
    pub user_id: i64,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

// 작성자 이름을 포함한 리뷰 조회 결과
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub review: Review,
    pub user_name: String,
}

// 리뷰 작성 요청
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddReviewCommand {
    pub item_id: Option<i64>,
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub item_id: i64,
    pub user_id: i64,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}
