//! User Repository
//!
//! `app_user` 테이블 연산. 모든 조회는 `role` 테이블을 조인하여
//! [`UserRecord`]에 역할 이름을 함께 채웁니다.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use super::{RepositoryResult, RoleRecord, UserRecord, UserRepository};

const USER_SELECT: &str = r#"
    SELECT u.id, u.username, u.password, r.id AS role_id, r.name AS role_name
    FROM app_user u
    JOIN role r ON r.id = u.role_id
"#;

/// PostgreSQL 사용자 저장소.
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_all(&self) -> RepositoryResult<Vec<UserRecord>> {
        let users = sqlx::query_as::<_, UserRecord>(&format!("{} ORDER BY u.id", USER_SELECT))
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!("{} WHERE u.id = $1", USER_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<UserRecord>> {
        let user =
            sqlx::query_as::<_, UserRecord>(&format!("{} WHERE u.username = $1", USER_SELECT))
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        Ok(user)
    }

    async fn exists_by_username(&self, username: &str) -> RepositoryResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM app_user WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn find_role_by_name(&self, name: &str) -> RepositoryResult<Option<RoleRecord>> {
        let role = sqlx::query_as::<_, RoleRecord>("SELECT id, name FROM role WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(role)
    }

    async fn insert(
        &self,
        username: &str,
        password_hash: &str,
        role_id: i64,
    ) -> RepositoryResult<UserRecord> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            WITH inserted AS (
                INSERT INTO app_user (username, password, role_id)
                VALUES ($1, $2, $3)
                RETURNING id, username, password, role_id
            )
            SELECT i.id, i.username, i.password, r.id AS role_id, r.name AS role_name
            FROM inserted i
            JOIN role r ON r.id = i.role_id
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(role_id)
        .fetch_one(&self.pool)
        .await?;

        info!(id = user.id, username = %user.username, "User inserted");
        Ok(user)
    }

    async fn update(
        &self,
        id: i64,
        username: &str,
        password_hash: &str,
    ) -> RepositoryResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            WITH updated AS (
                UPDATE app_user
                SET username = $2, password = $3
                WHERE id = $1
                RETURNING id, username, password, role_id
            )
            SELECT u.id, u.username, u.password, r.id AS role_id, r.name AS role_name
            FROM updated u
            JOIN role r ON r.id = u.role_id
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
