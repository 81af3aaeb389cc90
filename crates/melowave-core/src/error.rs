//! MeloWave 공통 에러 타입.
//!
//! 설정 로드, 로깅 초기화 등 서버 부트스트랩 단계에서 사용되는 에러를 정의합니다.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum MelowaveError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 로깅 초기화 에러
    #[error("로깅 에러: {0}")]
    Logging(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 알 수 없는 역할 이름
    #[error("알 수 없는 역할: {0}")]
    UnknownRole(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type MelowaveResult<T> = Result<T, MelowaveError>;

impl From<config::ConfigError> for MelowaveError {
    fn from(err: config::ConfigError) -> Self {
        MelowaveError::Config(err.to_string())
    }
}
