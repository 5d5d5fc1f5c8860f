// region:    --- Items
/// 상품 조회
pub const GET_ITEM: &str = "SELECT id, name, category, price, location, description, owner_name, owner_contact, image, created_at FROM items WHERE id = $1";

/// 모든 상품 조회
pub const GET_ALL_ITEMS: &str =
    "SELECT id, name, category, price, location, description, owner_name, owner_contact, image, created_at FROM items ORDER BY created_at DESC, id DESC";

/// 카테고리별 상품 조회
pub const GET_ITEMS_BY_CATEGORY: &str =
    "SELECT id, name, category, price, location, description, owner_name, owner_contact, image, created_at FROM items WHERE category = $1 ORDER BY created_at DESC, id DESC";

/// 상품 등록
pub const INSERT_ITEM: &str = r#"
    INSERT INTO items (name, category, price, location, description, owner_name, owner_contact, image)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
    RETURNING id, name, category, price, location, description, owner_name, owner_contact, image, created_at
"#;

/// 상품 삭제 (예약, 리뷰는 ON DELETE CASCADE)
pub const DELETE_ITEM: &str = "DELETE FROM items WHERE id = $1";

/// 예약 접수 중 같은 상품에 대한 동시 접수를 직렬화하기 위한 행 잠금
pub const LOCK_ITEM: &str = "SELECT id FROM items WHERE id = $1 FOR UPDATE";
// endregion: --- Items

// region:    --- Users
/// 사용자 조회
pub const GET_USER: &str =
    "SELECT id, name, email, password_hash, role, created_at FROM users WHERE id = $1";

/// 이메일로 사용자 조회
pub const GET_USER_BY_EMAIL: &str =
    "SELECT id, name, email, password_hash, role, created_at FROM users WHERE email = $1";

/// 모든 사용자 조회
pub const GET_ALL_USERS: &str =
    "SELECT id, name, email, password_hash, role, created_at FROM users ORDER BY created_at DESC, id DESC";

/// 역할별 사용자 조회
pub const GET_USERS_BY_ROLE: &str =
    "SELECT id, name, email, password_hash, role, created_at FROM users WHERE role = $1 ORDER BY created_at DESC, id DESC";

/// 사용자 등록 (이메일 중복 시 행 없음)
pub const INSERT_USER: &str = r#"
    INSERT INTO users (name, email, password_hash, role)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (email) DO NOTHING
    RETURNING id, name, email, password_hash, role, created_at
"#;

/// 비밀번호/역할 재설정
pub const UPDATE_USER_CREDENTIALS: &str = r#"
    UPDATE users SET password_hash = $2, role = $3
    WHERE id = $1
    RETURNING id, name, email, password_hash, role, created_at
"#;

/// 예약 접수 트랜잭션 동안 사용자 삭제를 막는 공유 잠금
pub const LOCK_USER: &str = "SELECT id FROM users WHERE id = $1 FOR KEY SHARE";
// endregion: --- Users

// region:    --- Bookings
/// 예약 조회
pub const GET_BOOKING: &str = "SELECT id, item_id, user_id, start_date, end_date, total_price, status, created_at FROM bookings WHERE id = $1";

/// 기간이 겹치는 취소되지 않은 예약 조회 ([start, end) 반개구간)
pub const FIND_OVERLAPPING_BOOKING: &str = r#"
    SELECT id, item_id, user_id, start_date, end_date, total_price, status, created_at
    FROM bookings
    WHERE item_id = $1
      AND status <> 'cancelled'
      AND start_date < $3
      AND $2 < end_date
    ORDER BY start_date, id
    LIMIT 1
"#;

/// 예약 등록
pub const INSERT_BOOKING: &str = r#"
    INSERT INTO bookings (item_id, user_id, start_date, end_date, total_price, status, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    RETURNING id, item_id, user_id, start_date, end_date, total_price, status, created_at
"#;

/// 조건부 상태 변경
pub const UPDATE_BOOKING_STATUS: &str = r#"
    UPDATE bookings SET status = $3
    WHERE id = $1 AND status = ANY($2)
    RETURNING id, item_id, user_id, start_date, end_date, total_price, status, created_at
"#;

/// 예약 삭제
pub const DELETE_BOOKING: &str = "DELETE FROM bookings WHERE id = $1";

/// 종료된 확정 예약 완료 처리
pub const COMPLETE_ELAPSED_BOOKINGS: &str =
    "UPDATE bookings SET status = 'completed' WHERE status = 'confirmed' AND end_date <= $1";

/// 사용자별 예약 조회
pub const GET_USER_BOOKINGS: &str = r#"
    SELECT b.id, b.item_id, b.user_id, b.start_date, b.end_date, b.total_price, b.status, b.created_at,
           i.name AS item_name, i.category AS item_category, i.price AS item_price,
           i.location AS item_location, i.image AS item_image
    FROM bookings b
    JOIN items i ON i.id = b.item_id
    WHERE b.user_id = $1
    ORDER BY b.created_at DESC, b.id DESC
"#;

/// 전체 예약 조회
pub const GET_ALL_BOOKINGS: &str = r#"
    SELECT b.id, b.item_id, b.user_id, b.start_date, b.end_date, b.total_price, b.status, b.created_at,
           i.name AS item_name, i.category AS item_category, i.price AS item_price,
           i.location AS item_location, i.image AS item_image,
           u.name AS user_name, u.email AS user_email
    FROM bookings b
    JOIN items i ON i.id = b.item_id
    JOIN users u ON u.id = b.user_id
    ORDER BY b.created_at DESC, b.id DESC
"#;
// endregion: --- Bookings

// region:    --- Reviews
/// 리뷰 등록
pub const INSERT_REVIEW: &str = r#"
    WITH inserted AS (
        INSERT INTO reviews (item_id, user_id, rating, comment, created_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, item_id, user_id, rating, comment, created_at
    )
    SELECT r.id, r.item_id, r.user_id, r.rating, r.comment, r.created_at, u.name AS user_name
    FROM inserted r
    JOIN users u ON u.id = r.user_id
"#;

/// 상품별 리뷰 조회
pub const GET_ITEM_REVIEWS: &str = r#"
    SELECT r.id, r.item_id, r.user_id, r.rating, r.comment, r.created_at, u.name AS user_name
    FROM reviews r
    JOIN users u ON u.id = r.user_id
    WHERE r.item_id = $1
    ORDER BY r.created_at DESC, r.id DESC
"#;
// endregion: --- Reviews
