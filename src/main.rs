// region:    --- Imports
use rental_service::auth::{self, TokenIssuer};
use rental_service::config::{Config, StoreBackend};
use rental_service::database::DatabaseManager;
use rental_service::handlers::AppState;
use rental_service::routes;
use rental_service::scheduler::CompletionScheduler;
use rental_service::store::{MemoryStore, PostgresStore};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    // 설정 로드
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{:<12} --> 설정 로드 실패: {}", "Main", e);
            return Err(e.into());
        }
    };

    let tokens = TokenIssuer::new(&config.jwt_secret, config.token_ttl_hours);

    // 저장소 생성
    let state = match config.store_backend {
        StoreBackend::Postgres => {
            let db_manager = Arc::new(DatabaseManager::new(&config).await?);

            // 데이터베이스 초기화
            if let Err(e) = db_manager.initialize_database(config.db_recreate).await {
                error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
                return Err(e.into());
            }
            info!("{:<12} --> 데이터베이스 초기화 성공", "Main");

            AppState::new(Arc::new(PostgresStore::new(db_manager)), tokens)
        }
        StoreBackend::Memory => {
            info!("{:<12} --> 인메모리 저장소 사용", "Main");
            AppState::new(Arc::new(MemoryStore::new()), tokens)
        }
    };

    // 관리자 계정 시드
    if let Some(seed) = &config.admin_seed {
        if let Err(e) = auth::ensure_admin(state.directory.as_ref(), seed).await {
            error!("{:<12} --> 관리자 계정 생성 실패: {}", "Main", e);
            return Err(e.into());
        }
    }

    // 예약 완료 처리 스케줄러
    let scheduler = CompletionScheduler::new(Arc::clone(&state.engine), config.completion_interval);
    scheduler.start();

    // 라우터 설정
    let routes_all = routes::create_router(state, routes::cors_layer(&config.cors_origins));

    // 리스너 생성
    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
