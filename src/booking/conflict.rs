/// 예약 기간 충돌 검사
/// 두 구간 [s1, e1), [s2, e2)는 s1 < e2 AND s2 < e1 일 때 겹친다.
// region:    --- Imports
use super::model::{Booking, DateRange};

// endregion: --- Imports

pub fn overlaps(a: &DateRange, b: &DateRange) -> bool {
    a.start() < b.end() && b.start() < a.end()
}

/// 같은 상품의 기존 예약 중 요청 기간과 겹치는 첫 번째 예약
/// 취소된 예약은 무시한다
pub fn find_conflict<'a, I>(existing: I, item_id: i64, requested: &DateRange) -> Option<&'a Booking>
where
    I: IntoIterator<Item = &'a Booking>,
{
    existing
        .into_iter()
        .filter(|b| b.item_id == item_id && b.status.blocks_dates())
        .filter(|b| overlaps(&b.range(), requested))
        .min_by_key(|b| (b.start_date, b.id))
}
