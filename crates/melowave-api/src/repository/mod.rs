//! 데이터베이스 저장소.
//!
//! 곡/사용자 테이블에 대한 영속화 연산을 트레이트로 정의하고
//! PostgreSQL 구현을 제공합니다. 테스트 빌드에서는 같은 트레이트의
//! 메모리 구현([`memory`])을 함께 제공합니다.

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod songs;
pub mod users;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use melowave_core::{PageRequest, SongFilter};

pub use songs::PgSongRepository;
pub use users::PgUserRepository;

// ================================================================================================
// Errors
// ================================================================================================

/// 저장소 에러.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("데이터베이스 오류: {0}")]
    Database(sqlx::Error),
    /// 고유 제약 조건 위반 (중복 곡/사용자 이름)
    #[error("고유 제약 조건 위반: {0}")]
    UniqueViolation(String),
    #[error("역할을 찾을 수 없습니다: {0}")]
    RoleNotFound(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::UniqueViolation(
                    db.constraint().unwrap_or("unknown").to_string(),
                )
            }
            _ => RepositoryError::Database(err),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

// ================================================================================================
// Types
// ================================================================================================

/// 곡 레코드.
///
/// 오디오는 JSON에서 Base64 문자열로 표현됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct Song {
    pub id: i64,
    pub title: String,
    pub artist: String,
    #[sqlx(default)]
    pub genre: Option<String>,
    #[serde(with = "crate::utils::serde_base64")]
    #[schema(value_type = String, format = Byte)]
    pub audio: Vec<u8>,
}

/// 새 곡 입력
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewSong {
    #[validate(length(min = 1, max = 255, message = "제목은 1-255자여야 합니다"))]
    pub title: String,
    #[validate(length(min = 1, max = 255, message = "아티스트는 1-255자여야 합니다"))]
    pub artist: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(with = "crate::utils::serde_base64")]
    #[schema(value_type = String, format = Byte)]
    pub audio: Vec<u8>,
}

/// 곡 메타데이터 수정 입력 (오디오는 변경하지 않음)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SongUpdate {
    #[validate(length(min = 1, max = 255, message = "제목은 1-255자여야 합니다"))]
    pub title: String,
    #[validate(length(min = 1, max = 255, message = "아티스트는 1-255자여야 합니다"))]
    pub artist: String,
    #[serde(default)]
    pub genre: Option<String>,
}

/// 역할 레코드
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RoleRecord {
    pub id: i64,
    pub name: String,
}

/// 사용자 레코드 (역할 조인 포함).
///
/// `password`는 Argon2 PHC 해시이며 응답으로 직렬화하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub role_id: i64,
    pub role_name: String,
}

impl UserRecord {
    /// 사용자의 역할 레코드.
    pub fn role(&self) -> RoleRecord {
        RoleRecord {
            id: self.role_id,
            name: self.role_name.clone(),
        }
    }
}

// ================================================================================================
// Traits
// ================================================================================================

/// 곡 저장소.
#[async_trait]
pub trait SongRepository: Send + Sync {
    /// 전체 곡 (id 순)
    async fn find_all(&self) -> RepositoryResult<Vec<Song>>;

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Song>>;

    async fn exists_by_id(&self, id: i64) -> RepositoryResult<bool>;

    /// (제목, 아티스트) 쌍을 가진 곡의 id.
    async fn find_id_by_title_and_artist(
        &self,
        title: &str,
        artist: &str,
    ) -> RepositoryResult<Option<i64>>;

    async fn insert(&self, song: &NewSong) -> RepositoryResult<Song>;

    /// 메타데이터 수정. 대상이 없으면 `None`.
    async fn update(&self, id: i64, update: &SongUpdate) -> RepositoryResult<Option<Song>>;

    /// 삭제. 실제로 삭제되었으면 `true`.
    async fn delete(&self, id: i64) -> RepositoryResult<bool>;

    /// 필터와 일치하는 곡 한 페이지 (id 순).
    async fn search(&self, filter: &SongFilter, page: PageRequest) -> RepositoryResult<Vec<Song>>;

    /// 필터와 일치하는 곡 수 (페이지 무시).
    async fn count(&self, filter: &SongFilter) -> RepositoryResult<i64>;

    async fn distinct_artists(&self) -> RepositoryResult<Vec<String>>;

    async fn distinct_genres(&self) -> RepositoryResult<Vec<String>>;
}

/// 사용자 저장소.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_all(&self) -> RepositoryResult<Vec<UserRecord>>;

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<UserRecord>>;

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<UserRecord>>;

    async fn exists_by_username(&self, username: &str) -> RepositoryResult<bool>;

    async fn find_role_by_name(&self, name: &str) -> RepositoryResult<Option<RoleRecord>>;

    /// 사용자 생성. `password_hash`는 이미 해싱된 값입니다.
    async fn insert(
        &self,
        username: &str,
        password_hash: &str,
        role_id: i64,
    ) -> RepositoryResult<UserRecord>;

    /// 사용자 이름/비밀번호 해시 갱신. 대상이 없으면 `None`.
    async fn update(
        &self,
        id: i64,
        username: &str,
        password_hash: &str,
    ) -> RepositoryResult<Option<UserRecord>>;
}
