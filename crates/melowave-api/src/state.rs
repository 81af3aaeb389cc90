//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 `Arc`로 래핑되어 여러 요청 간에 공유됩니다.

use std::sync::Arc;

use melowave_core::AppConfig;

use crate::auth::{Authorizer, TokenService};
use crate::repository::{PgSongRepository, PgUserRepository, SongRepository, UserRepository};
use crate::services::{SongService, UserService};

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 곡 서비스
    pub songs: SongService,

    /// 사용자 서비스 (로그인 포함)
    pub users: UserService,

    /// Access Token 발급/검증
    pub tokens: TokenService,

    /// 데이터베이스 연결 풀 (메모리 저장소로 구성된 경우 `None`)
    pub db_pool: Option<sqlx::PgPool>,

    /// 로드된 설정
    pub config: Arc<AppConfig>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 저장소 구현을 직접 지정하여 상태 생성.
    pub fn new(
        config: AppConfig,
        song_repo: Arc<dyn SongRepository>,
        user_repo: Arc<dyn UserRepository>,
    ) -> Self {
        let tokens = TokenService::from_config(&config.auth);

        Self {
            songs: SongService::new(song_repo),
            users: UserService::new(user_repo, tokens.clone()),
            tokens,
            db_pool: None,
            config: Arc::new(config),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// PostgreSQL 저장소로 상태 생성.
    pub fn with_db_pool(config: AppConfig, pool: sqlx::PgPool) -> Self {
        let mut state = Self::new(
            config,
            Arc::new(PgSongRepository::new(pool.clone())),
            Arc::new(PgUserRepository::new(pool.clone())),
        );
        state.db_pool = Some(pool);
        state
    }

    /// 인가 미들웨어 상태.
    pub fn authorizer(&self) -> Authorizer {
        Authorizer::new(self.tokens.clone(), self.config.server.login_path())
    }
}

/// 테스트용 AppState 생성 헬퍼.
///
/// 실제 DB 연결 없이 메모리 저장소로 상태를 구성합니다.
/// 저장소 핸들을 함께 반환하므로 테스트에서 데이터를 직접 준비할 수 있습니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> (
    AppState,
    Arc<crate::repository::memory::InMemorySongRepository>,
    Arc<crate::repository::memory::InMemoryUserRepository>,
) {
    use crate::repository::memory::{InMemorySongRepository, InMemoryUserRepository};

    let songs = Arc::new(InMemorySongRepository::new());
    let users = Arc::new(InMemoryUserRepository::new());
    let state = AppState::new(AppConfig::default(), songs.clone(), users.clone());
    (state, songs, users)
}
