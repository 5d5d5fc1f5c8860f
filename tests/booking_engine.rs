use chrono::{Duration, Utc};
use rental_service::auth::ActingUser;
use rental_service::booking::commands::BookingEngine;
use rental_service::booking::model::{BookingStatus, DateRange, NewBooking, SubmitBookingCommand};
use rental_service::booking::BookingStore;
use rental_service::catalog::model::{Category, Item, NewItem};
use rental_service::catalog::Catalog;
use rental_service::directory::model::{NewUser, Role, User};
use rental_service::directory::UserDirectory;
use rental_service::error::AppError;
use rental_service::query;
use rental_service::store::MemoryStore;
use std::sync::Arc;

struct Fixture {
    store: Arc<MemoryStore>,
    engine: Arc<BookingEngine>,
}

/// 인메모리 저장소 기반 엔진 구성
fn setup() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let engine = Arc::new(BookingEngine::new(
        store.clone(),
        store.clone(),
        store.clone(),
    ));
    Fixture { store, engine }
}

/// 테스트용 상품 생성
async fn create_test_item(store: &MemoryStore, price: i64) -> Item {
    store
        .create_item(NewItem {
            name: "Honda Activa 6G".to_string(),
            category: Category::Vehicle,
            price,
            location: "Mumbai".to_string(),
            description: "도심 주행용 스쿠터".to_string(),
            owner_name: "Waman".to_string(),
            owner_contact: "010-0000-0000".to_string(),
            image: String::new(),
        })
        .await
        .unwrap()
}

/// 테스트용 사용자 생성
async fn create_test_user(store: &MemoryStore, email: &str, role: Role) -> User {
    store
        .create_user(NewUser {
            name: email.split('@').next().unwrap_or_default().to_string(),
            email: email.to_string(),
            password_hash: String::new(),
            role,
        })
        .await
        .unwrap()
}

fn request(item_id: i64, user_id: i64, start: &str, end: &str) -> SubmitBookingCommand {
    SubmitBookingCommand {
        item_id: Some(item_id),
        user_id: Some(user_id),
        start_date: Some(start.to_string()),
        end_date: Some(end.to_string()),
    }
}

/// 400/일 상품 2일 예약 -> 800
#[tokio::test]
async fn test_submit_prices_two_day_stay() {
    let f = setup();
    let item = create_test_item(&f.store, 400).await;
    let user = create_test_user(&f.store, "renter@example.com", Role::User).await;

    let booking = f
        .engine
        .submit_booking(request(item.id, user.id, "2024-03-01", "2024-03-03"))
        .await
        .unwrap();

    assert_eq!(booking.total_price, 800);
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert_eq!(booking.item_id, item.id);
    assert_eq!(booking.user_id, user.id);
}

/// 하루 미만의 나머지는 하루로 올림
#[tokio::test]
async fn test_submit_rounds_partial_day_up() {
    let f = setup();
    let item = create_test_item(&f.store, 300).await;
    let user = create_test_user(&f.store, "renter@example.com", Role::User).await;

    let booking = f
        .engine
        .submit_booking(request(
            item.id,
            user.id,
            "2024-03-01T09:00:00Z",
            "2024-03-03T10:30:00Z",
        ))
        .await
        .unwrap();

    assert_eq!(booking.total_price, 900);
}

/// 시작일 >= 종료일이면 ValidationError, 예약 미생성
#[tokio::test]
async fn test_submit_rejects_empty_or_reversed_range() {
    let f = setup();
    let item = create_test_item(&f.store, 400).await;
    let user = create_test_user(&f.store, "renter@example.com", Role::User).await;

    for (start, end) in [("2024-03-03", "2024-03-03"), ("2024-03-05", "2024-03-01")] {
        let err = f
            .engine
            .submit_booking(request(item.id, user.id, start, end))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "endDate", .. }));
    }

    let bookings = f.store.list_bookings_for_user(user.id).await.unwrap();
    assert!(bookings.is_empty());
}

/// 누락 필드는 해당 필드 이름으로 ValidationError
#[tokio::test]
async fn test_submit_names_missing_field() {
    let f = setup();
    let item = create_test_item(&f.store, 400).await;

    let mut cmd = request(item.id, 1, "2024-03-01", "2024-03-03");
    cmd.user_id = None;
    let err = f.engine.submit_booking(cmd).await.unwrap_err();
    assert!(matches!(err, AppError::Validation { field: "userId", .. }));

    let mut cmd = request(item.id, 1, "2024-03-01", "2024-03-03");
    cmd.start_date = Some("03/01/2024".to_string());
    let err = f.engine.submit_booking(cmd).await.unwrap_err();
    assert!(matches!(err, AppError::Validation { field: "startDate", .. }));

    let err = f
        .engine
        .submit_booking(SubmitBookingCommand::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { field: "itemId", .. }));
}

/// 존재하지 않는 itemId / userId
#[tokio::test]
async fn test_submit_unknown_references() {
    let f = setup();
    let item = create_test_item(&f.store, 400).await;
    let user = create_test_user(&f.store, "renter@example.com", Role::User).await;

    let err = f
        .engine
        .submit_booking(request(9_999, user.id, "2024-03-01", "2024-03-03"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound { field: "itemId", .. }));

    let err = f
        .engine
        .submit_booking(request(item.id, 9_999, "2024-03-01", "2024-03-03"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound { field: "userId", .. }));
}

/// 겹치는 예약은 기존 예약을 가리키는 ConflictError
#[tokio::test]
async fn test_overlapping_booking_conflicts() {
    let f = setup();
    let item = create_test_item(&f.store, 400).await;
    let user = create_test_user(&f.store, "renter@example.com", Role::User).await;

    let a = f
        .engine
        .submit_booking(request(item.id, user.id, "2024-03-01", "2024-03-05"))
        .await
        .unwrap();

    let err = f
        .engine
        .submit_booking(request(item.id, user.id, "2024-03-04", "2024-03-06"))
        .await
        .unwrap_err();
    match err {
        AppError::Conflict {
            booking_id,
            start_date,
            end_date,
        } => {
            assert_eq!(booking_id, a.id);
            assert_eq!(start_date, a.start_date);
            assert_eq!(end_date, a.end_date);
        }
        other => panic!("ConflictError 예상, 실제: {:?}", other),
    }

    assert_eq!(f.store.list_bookings_for_user(user.id).await.unwrap().len(), 1);
}

/// 종료일과 시작일이 맞닿은 예약은 충돌하지 않음
#[tokio::test]
async fn test_adjacent_bookings_are_accepted() {
    let f = setup();
    let item = create_test_item(&f.store, 400).await;
    let user = create_test_user(&f.store, "renter@example.com", Role::User).await;

    f.engine
        .submit_booking(request(item.id, user.id, "2024-03-01", "2024-03-05"))
        .await
        .unwrap();
    f.engine
        .submit_booking(request(item.id, user.id, "2024-03-05", "2024-03-06"))
        .await
        .unwrap();
}

/// 취소된 예약은 기간을 막지 않음
#[tokio::test]
async fn test_cancelled_booking_does_not_block() {
    let f = setup();
    let item = create_test_item(&f.store, 400).await;
    let user = create_test_user(&f.store, "renter@example.com", Role::User).await;
    let actor = ActingUser::from(&user);

    let a = f
        .engine
        .submit_booking(request(item.id, user.id, "2024-03-01", "2024-03-05"))
        .await
        .unwrap();
    f.engine.cancel_booking(a.id, &actor).await.unwrap();

    let b = f
        .engine
        .submit_booking(request(item.id, user.id, "2024-03-04", "2024-03-06"))
        .await
        .unwrap();
    assert_eq!(b.status, BookingStatus::Confirmed);
}

/// 다른 상품의 예약은 서로 영향 없음
#[tokio::test]
async fn test_different_items_do_not_conflict() {
    let f = setup();
    let first = create_test_item(&f.store, 400).await;
    let second = create_test_item(&f.store, 500).await;
    let user = create_test_user(&f.store, "renter@example.com", Role::User).await;

    f.engine
        .submit_booking(request(first.id, user.id, "2024-03-01", "2024-03-05"))
        .await
        .unwrap();
    f.engine
        .submit_booking(request(second.id, user.id, "2024-03-01", "2024-03-05"))
        .await
        .unwrap();
}

/// 동시 예약 요청 중 하나만 성공
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_overlapping_submissions() {
    let f = setup();
    let item = create_test_item(&f.store, 400).await;
    let user = create_test_user(&f.store, "renter@example.com", Role::User).await;

    let mut handles = vec![];
    for i in 0..20u32 {
        let engine = Arc::clone(&f.engine);
        let cmd = request(
            item.id,
            user.id,
            &format!("2024-03-{:02}", 1 + i % 3),
            &format!("2024-03-{:02}", 6 + i % 3),
        );
        handles.push(tokio::spawn(async move { engine.submit_booking(cmd).await }));
    }

    let mut accepted = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(AppError::Conflict { .. }) => conflicts += 1,
            Err(e) => panic!("예상하지 못한 오류: {:?}", e),
        }
    }
    assert_eq!(accepted, 1);
    assert_eq!(conflicts, 19);

    // 취소되지 않은 예약끼리 기간이 겹치지 않음
    let bookings = f.store.list_bookings_for_user(user.id).await.unwrap();
    for (i, a) in bookings.iter().enumerate() {
        for b in bookings.iter().skip(i + 1) {
            let overlap = a.booking.start_date < b.booking.end_date
                && b.booking.start_date < a.booking.end_date;
            assert!(!overlap);
        }
    }
}

/// 취소는 멱등
#[tokio::test]
async fn test_cancel_twice_is_noop() {
    let f = setup();
    let item = create_test_item(&f.store, 400).await;
    let user = create_test_user(&f.store, "renter@example.com", Role::User).await;
    let actor = ActingUser::from(&user);

    let booking = f
        .engine
        .submit_booking(request(item.id, user.id, "2024-03-01", "2024-03-03"))
        .await
        .unwrap();

    let first = f.engine.cancel_booking(booking.id, &actor).await.unwrap();
    let second = f.engine.cancel_booking(booking.id, &actor).await.unwrap();
    assert_eq!(first.status, BookingStatus::Cancelled);
    assert_eq!(second.status, BookingStatus::Cancelled);
}

/// 다른 사용자의 예약 취소 불가, 관리자는 가능
#[tokio::test]
async fn test_cancel_requires_owner_or_admin() {
    let f = setup();
    let item = create_test_item(&f.store, 400).await;
    let owner = create_test_user(&f.store, "owner@example.com", Role::User).await;
    let stranger = create_test_user(&f.store, "stranger@example.com", Role::User).await;
    let admin = create_test_user(&f.store, "admin@example.com", Role::Admin).await;

    let booking = f
        .engine
        .submit_booking(request(item.id, owner.id, "2024-03-01", "2024-03-03"))
        .await
        .unwrap();

    let err = f
        .engine
        .cancel_booking(booking.id, &ActingUser::from(&stranger))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)));

    let cancelled = f
        .engine
        .cancel_booking(booking.id, &ActingUser::from(&admin))
        .await
        .unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
}

/// 완료된 예약 취소는 InvalidStateError
#[tokio::test]
async fn test_cancel_completed_booking_fails() {
    let f = setup();
    let item = create_test_item(&f.store, 400).await;
    let user = create_test_user(&f.store, "renter@example.com", Role::User).await;

    let booking = f
        .engine
        .submit_booking(request(item.id, user.id, "2024-03-01", "2024-03-03"))
        .await
        .unwrap();
    let completed = f.engine.complete_booking(booking.id).await.unwrap();
    assert_eq!(completed.status, BookingStatus::Completed);

    let err = f
        .engine
        .cancel_booking(booking.id, &ActingUser::from(&user))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
}

/// 취소된 예약은 완료 처리 불가
#[tokio::test]
async fn test_complete_cancelled_booking_fails() {
    let f = setup();
    let item = create_test_item(&f.store, 400).await;
    let user = create_test_user(&f.store, "renter@example.com", Role::User).await;

    let booking = f
        .engine
        .submit_booking(request(item.id, user.id, "2024-03-01", "2024-03-03"))
        .await
        .unwrap();
    f.engine
        .cancel_booking(booking.id, &ActingUser::from(&user))
        .await
        .unwrap();

    let err = f.engine.complete_booking(booking.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
}

/// 관리자만 삭제 가능, 삭제 후 조회하면 NotFound
#[tokio::test]
async fn test_delete_booking_admin_only() {
    let f = setup();
    let item = create_test_item(&f.store, 400).await;
    let user = create_test_user(&f.store, "renter@example.com", Role::User).await;
    let admin = create_test_user(&f.store, "admin@example.com", Role::Admin).await;
    let admin_actor = ActingUser::from(&admin);

    let booking = f
        .engine
        .submit_booking(request(item.id, user.id, "2024-03-01", "2024-03-03"))
        .await
        .unwrap();

    let err = f
        .engine
        .delete_booking(booking.id, &ActingUser::from(&user))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)));

    f.engine
        .delete_booking(booking.id, &admin_actor)
        .await
        .unwrap();

    let err = f
        .engine
        .get_booking(booking.id, &admin_actor)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound { field: "bookingId", .. }));

    let err = f
        .engine
        .delete_booking(booking.id, &admin_actor)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound { .. }));
}

/// 종료일이 지난 확정 예약만 완료 처리
#[tokio::test]
async fn test_complete_elapsed_only_moves_finished_confirmed() {
    let f = setup();
    let item = create_test_item(&f.store, 400).await;
    let user = create_test_user(&f.store, "renter@example.com", Role::User).await;
    let actor = ActingUser::from(&user);

    let past = f
        .engine
        .submit_booking(request(item.id, user.id, "2024-03-01", "2024-03-03"))
        .await
        .unwrap();
    let cancelled = f
        .engine
        .submit_booking(request(item.id, user.id, "2024-03-05", "2024-03-07"))
        .await
        .unwrap();
    f.engine.cancel_booking(cancelled.id, &actor).await.unwrap();

    let tomorrow = (Utc::now() + Duration::days(1)).to_rfc3339();
    let next_week = (Utc::now() + Duration::days(7)).to_rfc3339();
    let future = f
        .engine
        .submit_booking(request(item.id, user.id, &tomorrow, &next_week))
        .await
        .unwrap();

    let moved = f.engine.complete_elapsed(Utc::now()).await.unwrap();
    assert_eq!(moved, 1);

    let status = |id| {
        let store = Arc::clone(&f.store);
        async move { store.find_booking(id).await.unwrap().unwrap().status }
    };
    assert_eq!(status(past.id).await, BookingStatus::Completed);
    assert_eq!(status(cancelled.id).await, BookingStatus::Cancelled);
    assert_eq!(status(future.id).await, BookingStatus::Confirmed);
}

/// 사용자별 예약 조회는 최신순, 상품 정보 포함
#[tokio::test]
async fn test_user_bookings_newest_first() {
    let f = setup();
    let item = create_test_item(&f.store, 400).await;
    let user = create_test_user(&f.store, "renter@example.com", Role::User).await;
    let other = create_test_user(&f.store, "other@example.com", Role::User).await;

    let first = f
        .engine
        .submit_booking(request(item.id, user.id, "2024-03-01", "2024-03-03"))
        .await
        .unwrap();
    let second = f
        .engine
        .submit_booking(request(item.id, user.id, "2024-04-01", "2024-04-03"))
        .await
        .unwrap();

    let bookings = query::handlers::get_user_bookings(f.store.as_ref(), f.store.as_ref(), user.id)
        .await
        .unwrap();
    let ids: Vec<i64> = bookings.iter().map(|b| b.booking.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert_eq!(bookings[0].item.name, item.name);
    assert_eq!(bookings[0].item.price, 400);

    // 예약이 없는 사용자는 빈 목록
    let empty = query::handlers::get_user_bookings(f.store.as_ref(), f.store.as_ref(), other.id)
        .await
        .unwrap();
    assert!(empty.is_empty());

    // 존재하지 않는 사용자는 NotFound
    let err = query::handlers::get_user_bookings(f.store.as_ref(), f.store.as_ref(), 9_999)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound { field: "userId", .. }));
}

/// 전체 예약 조회는 관리자 전용
#[tokio::test]
async fn test_all_bookings_admin_only() {
    let f = setup();
    let item = create_test_item(&f.store, 400).await;
    let user = create_test_user(&f.store, "renter@example.com", Role::User).await;
    let admin = create_test_user(&f.store, "admin@example.com", Role::Admin).await;

    f.engine
        .submit_booking(request(item.id, user.id, "2024-03-01", "2024-03-03"))
        .await
        .unwrap();

    let err = query::handlers::get_all_bookings(f.store.as_ref(), &ActingUser::from(&user))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)));

    let all = query::handlers::get_all_bookings(f.store.as_ref(), &ActingUser::from(&admin))
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].user.email, "renter@example.com");
    assert_eq!(all[0].item.category, Category::Vehicle);
}

/// 검증 이후 사용자가 사라진 경우 저장소가 NotFound(userId)로 거절
#[tokio::test]
async fn test_store_rejects_missing_user_at_admission() {
    let f = setup();
    let item = create_test_item(&f.store, 400).await;
    let start = Utc::now();
    let booking = NewBooking {
        item_id: item.id,
        user_id: 9_999,
        range: DateRange::new(start, start + Duration::days(2)).unwrap(),
        total_price: 800,
        status: BookingStatus::Confirmed,
        created_at: start,
    };

    let err = f.store.insert_if_available(booking).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound { field: "userId", .. }));
}
