use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// 상품 카테고리
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Equipment,
    Vehicle,
    Room,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Equipment => "equipment",
            Category::Vehicle => "vehicle",
            Category::Room => "room",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("알 수 없는 카테고리입니다: {0}")]
pub struct UnknownCategory(pub String);

/// 복수형/대문자 표기("Vehicles")도 허용
impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equipment" | "equipments" => Ok(Category::Equipment),
            "vehicle" | "vehicles" => Ok(Category::Vehicle),
            "room" | "rooms" => Ok(Category::Room),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

impl TryFrom<String> for Category {
    type Error = UnknownCategory;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// 상품 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub category: Category,
    pub price: i64,
    pub location: String,
    pub description: String,
    pub owner_name: String,
    pub owner_contact: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

// 상품 등록 요청
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemCommand {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<i64>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub owner_name: Option<String>,
    pub owner_contact: Option<String>,
    pub image: Option<String>,
}

// 검증을 통과한 상품 등록 정보
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub category: Category,
    pub price: i64,
    pub location: String,
    pub description: String,
    pub owner_name: String,
    pub owner_contact: String,
    pub image: String,
}
