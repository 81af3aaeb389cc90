//! User API 라우트
//!
//! # 엔드포인트
//!
//! - `POST /user/create` - 회원 가입
//! - `PUT /user/update` - 본인 정보 수정, 새 토큰 반환 (USER/ADMIN)
//! - `GET /user/all` - 전체 사용자 (ADMIN)
//! - `GET /user/{id}` - 사용자 조회 (ADMIN)
//! - `GET /user/username/{username}` - 사용자 이름으로 조회 (ADMIN)
//! - `GET /user/me` - 현재 사용자 (USER/ADMIN)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tracing::debug;

use crate::auth::{AdminAuth, UserAuth};
use crate::error::{validate_request, ApiErrorResponse, ApiResult};
use crate::services::{CreateUserRequest, TokenResponse, UpdateUserRequest, UserResponse};
use crate::state::AppState;

/// POST /user/create - 회원 가입
#[utoipa::path(
    post,
    path = "/user/create",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "생성된 사용자", body = UserResponse),
        (status = 400, description = "입력 오류", body = ApiErrorResponse),
        (status = 409, description = "이미 사용 중인 사용자 이름", body = ApiErrorResponse)
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    validate_request(&request)?;
    let user = state.users.create(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /user/update - 본인 정보 수정
#[utoipa::path(
    put,
    path = "/user/update",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "새 Access Token", body = TokenResponse),
        (status = 401, description = "인증 필요"),
        (status = 409, description = "이미 사용 중인 사용자 이름", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    UserAuth(user): UserAuth,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<Json<TokenResponse>> {
    validate_request(&request)?;
    debug!(username = %user.username, "사용자 정보 수정");
    Ok(Json(state.users.update(&user.username, request).await?))
}

/// GET /user/all - 전체 사용자
#[utoipa::path(
    get,
    path = "/user/all",
    responses(
        (status = 200, description = "전체 사용자", body = Vec<UserResponse>),
        (status = 403, description = "권한 부족")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AdminAuth(_admin): AdminAuth,
) -> ApiResult<Json<Vec<UserResponse>>> {
    Ok(Json(state.users.find_all().await?))
}

/// GET /user/{id} - 사용자 조회
#[utoipa::path(
    get,
    path = "/user/{id}",
    params(("id" = i64, Path, description = "사용자 ID")),
    responses(
        (status = 200, description = "사용자", body = UserResponse),
        (status = 404, description = "사용자 없음", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    AdminAuth(_admin): AdminAuth,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserResponse>> {
    Ok(Json(state.users.find_by_id(id).await?))
}

/// GET /user/username/{username} - 사용자 이름으로 조회
#[utoipa::path(
    get,
    path = "/user/username/{username}",
    params(("username" = String, Path, description = "사용자 이름")),
    responses(
        (status = 200, description = "사용자", body = UserResponse),
        (status = 404, description = "사용자 없음", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_user_by_username(
    State(state): State<Arc<AppState>>,
    AdminAuth(_admin): AdminAuth,
    Path(username): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    Ok(Json(state.users.find_by_username(&username).await?))
}

/// GET /user/me - 현재 사용자
#[utoipa::path(
    get,
    path = "/user/me",
    responses(
        (status = 200, description = "현재 사용자", body = UserResponse),
        (status = 401, description = "인증 필요")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn current_user(
    State(state): State<Arc<AppState>>,
    UserAuth(user): UserAuth,
) -> ApiResult<Json<UserResponse>> {
    Ok(Json(state.users.find_by_username(&user.username).await?))
}

/// User 라우터 생성.
pub fn users_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(create_user))
        .route("/update", put(update_user))
        .route("/all", get(list_users))
        .route("/me", get(current_user))
        .route("/username/{username}", get(get_user_by_username))
        .route("/{id}", get(get_user))
}
