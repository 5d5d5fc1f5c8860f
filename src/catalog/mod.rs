/// 상품 카탈로그
/// 예약 엔진 입장에서는 읽기 전용이며, 상품 등록은 관리자만 수행한다.
// region:    --- Imports
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use model::{Category, CreateItemCommand, Item, NewItem};

// endregion: --- Imports

pub mod model;

// 이미지가 없는 상품에 사용하는 기본 이미지
const DEFAULT_IMAGE: &str = "https://cdn-icons-png.flaticon.com/512/1048/1048953.png";

// region:    --- Catalog Trait
/// 상품 카탈로그 트레이트
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn find_item_by_id(&self, item_id: i64) -> AppResult<Option<Item>>;
    async fn list_items(&self, category: Option<Category>) -> AppResult<Vec<Item>>;
    async fn create_item(&self, item: NewItem) -> AppResult<Item>;
    /// 상품 삭제. 해당 상품의 예약과 리뷰도 함께 삭제된다
    async fn delete_item(&self, item_id: i64) -> AppResult<bool>;
}
// endregion: --- Catalog Trait

// region:    --- Validation
fn required(value: Option<String>, field: &'static str) -> AppResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(AppError::validation(
            field,
            format!("{} 항목은 필수입니다.", field),
        )),
    }
}

impl CreateItemCommand {
    /// 상품 등록 요청 검증
    pub fn validate(self) -> AppResult<NewItem> {
        let name = required(self.name, "name")?;
        let category = required(self.category, "category")?
            .parse::<Category>()
            .map_err(|e| AppError::validation("category", e.to_string()))?;
        let price = match self.price {
            Some(p) if p > 0 => p,
            Some(_) => {
                return Err(AppError::validation(
                    "price",
                    "일일 가격은 0보다 커야 합니다.",
                ))
            }
            None => return Err(AppError::validation("price", "price 항목은 필수입니다.")),
        };
        let location = required(self.location, "location")?;
        let description = required(self.description, "description")?;
        let owner_name = required(self.owner_name, "ownerName")?;

        Ok(NewItem {
            name,
            category,
            price,
            location,
            description,
            owner_name,
            owner_contact: self.owner_contact.unwrap_or_default(),
            image: self
                .image
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
        })
    }
}
// endregion: --- Validation
