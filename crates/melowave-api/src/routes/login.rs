//! 로그인 라우트.
//!
//! `POST /login`만 허용합니다. 본문은 `application/x-www-form-urlencoded` 또는
//! JSON(`{"username", "password"}`)이며, 성공 시 `{"access_token": ...}`를 반환합니다.
//! 인가 미들웨어는 이 경로의 Bearer 토큰을 검사하지 않습니다.

use axum::{
    extract::{FromRequest, Request, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::services::TokenResponse;
use crate::state::AppState;

/// 로그인 자격 증명
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

fn is_json(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"))
}

/// 요청 본문에서 자격 증명 추출 (JSON 또는 폼).
async fn credentials(request: Request) -> Result<LoginRequest, Response> {
    if is_json(&request) {
        Json::<LoginRequest>::from_request(request, &())
            .await
            .map(|Json(c)| c)
            .map_err(IntoResponse::into_response)
    } else {
        Form::<LoginRequest>::from_request(request, &())
            .await
            .map(|Form(c)| c)
            .map_err(IntoResponse::into_response)
    }
}

/// POST /login - Access Token 발급
#[utoipa::path(
    post,
    path = "/login",
    request_body(
        content = LoginRequest,
        content_type = "application/x-www-form-urlencoded",
        description = "JSON 본문도 허용"
    ),
    responses(
        (status = 200, description = "로그인 성공", body = TokenResponse),
        (status = 401, description = "사용자 이름 또는 비밀번호 불일치")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<TokenResponse>, Response> {
    let LoginRequest { username, password } = credentials(request).await?;

    state
        .users
        .login(&username, &password)
        .await
        .map(Json)
        .map_err(IntoResponse::into_response)
}
