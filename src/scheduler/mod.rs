/// 예약 완료 처리 스케줄러
/// 대여 기간이 끝난 confirmed 예약을 주기적으로 completed로 변경한다.
// region:    --- Imports
use crate::booking::commands::BookingEngine;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, info};

// endregion: --- Imports

// region:    --- Completion Scheduler
/// 예약 완료 처리 스케줄러
pub struct CompletionScheduler {
    engine: Arc<BookingEngine>,
    period: Duration,
}

impl CompletionScheduler {
    pub fn new(engine: Arc<BookingEngine>, period: Duration) -> Self {
        Self { engine, period }
    }

    /// 예약 완료 처리 스케줄러 시작
    pub fn start(&self) -> JoinHandle<()> {
        let engine = Arc::clone(&self.engine);
        let period = self.period;
        tokio::spawn(async move {
            let mut interval = interval(period);
            loop {
                interval.tick().await;
                Self::run_once(&engine).await;
            }
        })
    }

    /// 예약 완료 처리 1회 실행
    pub async fn run_once(engine: &BookingEngine) {
        match engine.complete_elapsed(Utc::now()).await {
            Ok(0) => debug!("{:<12} --> 완료 처리할 예약 없음", "Scheduler"),
            Ok(count) => info!("{:<12} --> 예약 {}건 완료 처리", "Scheduler", count),
            Err(e) => error!(
                "{:<12} --> 예약 완료 처리 중 오류 발생: {:?}",
                "Scheduler", e
            ),
        }
    }
}
// endregion: --- Completion Scheduler
