//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/login` - 로그인 (Access Token 발급)
//! - `/user` - 회원 가입, 본인 정보, 사용자 조회
//! - `/song` - 곡 조회/검색/스트리밍, 곡 관리
//!
//! 모든 경로는 `server.base_path` 아래에 마운트됩니다.

pub mod login;
pub mod songs;
pub mod users;

pub use login::LoginRequest;
pub use songs::{songs_router, SearchQuery};
pub use users::users_router;

use axum::{middleware, routing::post, Router};
use std::sync::Arc;

use crate::auth::authorization_middleware;
use crate::state::AppState;

/// 전체 API 라우터 생성 (기본 경로 미적용).
///
/// `max_upload_bytes`는 곡 등록 요청 본문의 최대 크기입니다.
pub fn create_api_router(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(login::login))
        .nest("/user", users_router())
        .nest("/song", songs_router(max_upload_bytes))
}

/// 기본 경로에 마운트하고 인가 미들웨어를 적용한 애플리케이션 라우터.
///
/// 인가 미들웨어는 모든 역할 추출기보다 먼저 실행됩니다.
pub fn create_app(state: Arc<AppState>) -> Router {
    let base_path = state.config.server.normalized_base_path();
    let authorizer = state.authorizer();
    let max_upload_bytes = state.config.server.max_upload_bytes;

    let api = create_api_router(max_upload_bytes).with_state(state);
    let mounted = if base_path.is_empty() {
        api
    } else {
        Router::new().nest(&base_path, api)
    };

    mounted.layer(middleware::from_fn_with_state(
        authorizer,
        authorization_middleware,
    ))
}
