//! 비즈니스 로직 서비스.
//!
//! 라우트 핸들러와 저장소 사이에서 존재 여부/중복 검사와
//! 비밀번호 해싱, 토큰 발급을 담당합니다.

pub mod songs;
pub mod users;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::auth::{AuthError, PasswordError, TokenError};
use crate::error::ApiErrorResponse;
use crate::repository::RepositoryError;

pub use songs::SongService;
pub use users::{CreateUserRequest, TokenResponse, UpdateUserRequest, UserResponse, UserService};

/// 서비스 계층 에러.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("사용자 이름 또는 비밀번호가 올바르지 않습니다")]
    BadCredentials,
    #[error(transparent)]
    Repository(RepositoryError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Token(#[from] TokenError),
    /// 블로킹 작업(비밀번호 해싱) 실행 실패
    #[error("백그라운드 작업 실패: {0}")]
    Blocking(#[from] tokio::task::JoinError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // 서비스 검사와 INSERT 사이의 경합은 DB 제약 조건이 잡아냄
            RepositoryError::UniqueViolation(constraint) => {
                ServiceError::Conflict(format!("이미 존재하는 항목입니다 ({})", constraint))
            }
            other => ServiceError::Repository(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// HTTP 상태 코드.
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::BadCredentials => StatusCode::UNAUTHORIZED,
            ServiceError::Repository(_)
            | ServiceError::Password(_)
            | ServiceError::Token(_)
            | ServiceError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 응답 에러 코드.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::Conflict(_) => "CONFLICT",
            ServiceError::BadCredentials => "BAD_CREDENTIALS",
            ServiceError::Repository(_) => "DATABASE_ERROR",
            ServiceError::Password(_) | ServiceError::Token(_) | ServiceError::Blocking(_) => {
                "INTERNAL_ERROR"
            }
        }
    }
}

impl From<ServiceError> for (StatusCode, Json<ApiErrorResponse>) {
    fn from(err: ServiceError) -> Self {
        let status = err.status();
        if status.is_server_error() {
            error!(error = %err, "Request failed");
            (status, Json(ApiErrorResponse::new(err.code(), "내부 서버 오류")))
        } else {
            (status, Json(ApiErrorResponse::new(err.code(), err.to_string())))
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match self {
            ServiceError::BadCredentials => AuthError::BadCredentials.into_response(),
            other => <(StatusCode, Json<ApiErrorResponse>)>::from(other).into_response(),
        }
    }
}
