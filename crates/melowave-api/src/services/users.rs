//! 사용자 서비스.
//!
//! 회원 가입, 본인 정보 수정, 로그인 자격 증명 확인을 담당합니다.
//! 비밀번호는 Argon2 해시로만 저장되며 응답에 포함되지 않습니다.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;
use validator::Validate;

use melowave_core::RoleName;

use super::{ServiceError, ServiceResult};
use crate::auth::{hash_password, verify_password, TokenService, MISSING_USER_HASH};
use crate::metrics::record_login;
use crate::repository::{RepositoryError, RoleRecord, UserRecord, UserRepository};

/// 회원 가입 요청
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100, message = "사용자 이름은 1-100자여야 합니다"))]
    pub username: String,
    #[validate(length(min = 1, max = 128, message = "비밀번호는 1-128자여야 합니다"))]
    pub password: String,
}

/// 본인 정보 수정 요청. 비어 있는 필드는 변경하지 않습니다.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[serde(default)]
    #[validate(length(max = 100, message = "사용자 이름은 100자 이하여야 합니다"))]
    pub username: Option<String>,
    #[serde(default)]
    #[validate(length(max = 128, message = "비밀번호는 128자 이하여야 합니다"))]
    pub password: Option<String>,
}

/// 사용자 응답 (비밀번호 해시 제외)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub role: RoleRecord,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            role: user.role(),
            id: user.id,
            username: user.username,
        }
    }
}

/// Access Token 응답
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Argon2 해싱을 블로킹 스레드 풀에서 실행.
async fn hash_off_thread(password: String) -> ServiceResult<String> {
    Ok(tokio::task::spawn_blocking(move || hash_password(&password)).await??)
}

/// Argon2 검증을 블로킹 스레드 풀에서 실행. 일치하면 `true`.
async fn verify_off_thread(password: String, hash: String) -> ServiceResult<bool> {
    let result = tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await?;
    Ok(result.is_ok())
}

/// 사용자 관리와 로그인.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    tokens: TokenService,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, tokens: TokenService) -> Self {
        Self { repo, tokens }
    }

    pub async fn find_all(&self) -> ServiceResult<Vec<UserResponse>> {
        let users = self.repo.find_all().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn find_by_id(&self, id: i64) -> ServiceResult<UserResponse> {
        self.repo
            .find_by_id(id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| ServiceError::NotFound(format!("사용자를 찾을 수 없습니다: {}", id)))
    }

    pub async fn find_by_username(&self, username: &str) -> ServiceResult<UserResponse> {
        self.repo
            .find_by_username(username)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| {
                ServiceError::NotFound(format!("사용자를 찾을 수 없습니다: {}", username))
            })
    }

    /// 회원 가입. `ROLE_USER` 역할이 부여됩니다.
    pub async fn create(&self, request: CreateUserRequest) -> ServiceResult<UserResponse> {
        if self.repo.exists_by_username(&request.username).await? {
            warn!(username = %request.username, "Duplicate username rejected");
            return Err(ServiceError::Conflict(format!(
                "이미 사용 중인 사용자 이름입니다: {}",
                request.username
            )));
        }

        let authority = RoleName::User.authority();
        let role = self
            .repo
            .find_role_by_name(authority)
            .await?
            .ok_or_else(|| RepositoryError::RoleNotFound(authority.to_string()))?;

        let hash = hash_off_thread(request.password).await?;
        let user = self.repo.insert(&request.username, &hash, role.id).await?;

        info!(id = user.id, username = %user.username, "User created");
        Ok(user.into())
    }

    /// 호출자 본인의 사용자 이름/비밀번호 수정.
    ///
    /// 바뀐 사용자 이름으로 새 Access Token을 발급해 반환합니다.
    pub async fn update(
        &self,
        current_username: &str,
        request: UpdateUserRequest,
    ) -> ServiceResult<TokenResponse> {
        let user = self
            .repo
            .find_by_username(current_username)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("사용자를 찾을 수 없습니다: {}", current_username))
            })?;

        let username = request
            .username
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| user.username.clone());

        if username != user.username && self.repo.exists_by_username(&username).await? {
            return Err(ServiceError::Conflict(format!(
                "이미 사용 중인 사용자 이름입니다: {}",
                username
            )));
        }

        let password_hash = match request.password.filter(|p| !p.is_empty()) {
            Some(password) => hash_off_thread(password).await?,
            None => user.password.clone(),
        };

        let updated = self
            .repo
            .update(user.id, &username, &password_hash)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("사용자를 찾을 수 없습니다: {}", current_username))
            })?;

        info!(id = updated.id, username = %updated.username, "User updated");
        let access_token = self
            .tokens
            .issue(&updated.username, &[updated.role_name.clone()])?;
        Ok(TokenResponse { access_token })
    }

    /// 자격 증명 확인 후 Access Token 발급.
    ///
    /// 알 수 없는 사용자와 틀린 비밀번호는 구분 없이 `BadCredentials`입니다.
    /// 알 수 없는 사용자도 [`MISSING_USER_HASH`]로 같은 비용의 검증을 거칩니다.
    pub async fn login(&self, username: &str, password: &str) -> ServiceResult<TokenResponse> {
        let user = self.repo.find_by_username(username).await?;
        let stored_hash = user
            .as_ref()
            .map_or(MISSING_USER_HASH, |u| u.password.as_str())
            .to_string();
        let verified = verify_off_thread(password.to_string(), stored_hash).await?;

        let user = match user {
            Some(user) if verified => user,
            Some(_) => {
                warn!(username, "Login failed: wrong password");
                record_login("failure");
                return Err(ServiceError::BadCredentials);
            }
            None => {
                warn!(username, "Login failed: unknown user");
                record_login("failure");
                return Err(ServiceError::BadCredentials);
            }
        };

        let access_token = self.tokens.issue(&user.username, &[user.role_name.clone()])?;
        info!(username, role = %user.role_name, "Login succeeded");
        record_login("success");
        Ok(TokenResponse { access_token })
    }
}
