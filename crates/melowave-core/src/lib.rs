//! # MeloWave Core
//!
//! 음악 카탈로그 백엔드의 핵심 도메인 타입을 제공합니다.
//!
//! 이 크레이트는 API 서버 전반에서 사용되는 기본 타입을 제공합니다:
//! - 사용자 역할 (`ROLE_USER`, `ROLE_ADMIN`)
//! - 곡 검색 필터 및 페이지 요청
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
