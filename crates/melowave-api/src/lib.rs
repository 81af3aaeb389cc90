//! MeloWave REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 곡/사용자 REST API
//! - JWT 인증과 역할 기반 인가
//! - 오디오 스트리밍 및 다운로드
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: JWT 발급/검증, 비밀번호 해싱, 인가 미들웨어
//! - [`services`]: 곡/사용자 비즈니스 규칙
//! - [`repository`]: PostgreSQL 저장소
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어
//! - [`openapi`]: OpenAPI 문서 및 Swagger UI

pub mod auth;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use auth::{
    hash_password, verify_password, AdminAuth, AuthError, AuthenticatedUser, Authorizer,
    TokenService, UserAuth,
};
pub use error::{ApiErrorResponse, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use routes::{create_api_router, create_app};
pub use services::{ServiceError, SongService, UserService};
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;
