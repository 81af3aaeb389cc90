//! Axum용 JWT 인가 미들웨어와 역할 추출기.
//!
//! 요청 처리 순서:
//!
//! 1. [`authorization_middleware`]가 모든 요청에서 Bearer 토큰을 검증하고
//!    성공 시 [`AuthenticatedUser`]를 요청 extensions에 넣습니다.
//! 2. 핸들러의 [`UserAuth`] / [`AdminAuth`] 추출기가
//!    extensions의 사용자와 역할을 확인합니다.
//!
//! 로그인 경로와 토큰이 없는 요청은 인증 없이 통과하며,
//! 보호된 핸들러의 추출기가 401을 반환합니다.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, warn};

use melowave_core::RoleName;

use super::jwt::{AuthenticatedUser, TokenError, TokenService};
use crate::metrics::record_token_rejection;

const BEARER_PREFIX: &str = "Bearer ";

/// 인증/인가 에러.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("인증이 필요합니다")]
    MissingToken,
    #[error("{0}")]
    InvalidToken(#[from] TokenError),
    #[error("권한이 부족합니다")]
    InsufficientRole,
    #[error("사용자 이름 또는 비밀번호가 올바르지 않습니다")]
    BadCredentials,
}

impl AuthError {
    /// `error` 응답 헤더에 실리는 에러 코드.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::InvalidToken(TokenError::Expired) => "TOKEN_EXPIRED",
            AuthError::InvalidToken(TokenError::InvalidSignature) => "INVALID_SIGNATURE",
            AuthError::InvalidToken(_) => "INVALID_TOKEN",
            AuthError::InsufficientRole => "INSUFFICIENT_ROLE",
            AuthError::BadCredentials => "BAD_CREDENTIALS",
        }
    }

    /// HTTP 상태 코드.
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::BadCredentials => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken(_) | AuthError::InsufficientRole => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error_message": self.to_string() }));

        let mut response = (status, body).into_response();
        response
            .headers_mut()
            .insert("error", HeaderValue::from_static(self.code()));
        response
    }
}

/// 인가 미들웨어 상태.
#[derive(Clone)]
pub struct Authorizer {
    tokens: TokenService,
    login_path: String,
}

impl Authorizer {
    /// 새 인가 상태 생성.
    ///
    /// # Arguments
    ///
    /// * `tokens` - 토큰 검증 서비스
    /// * `login_path` - 검증을 건너뛸 로그인 경로 (기본 경로 포함)
    pub fn new(tokens: TokenService, login_path: impl Into<String>) -> Self {
        Self {
            tokens,
            login_path: login_path.into(),
        }
    }
}

/// `Authorization: Bearer <token>` 헤더에서 토큰 추출.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_PREFIX))
}

/// 모든 요청에 적용되는 JWT 인가 미들웨어.
///
/// 토큰 검증 실패 시 403과 `{"error_message": ...}` 본문으로 체인을 중단합니다.
pub async fn authorization_middleware(
    State(authorizer): State<Authorizer>,
    mut request: Request,
    next: Next,
) -> Response {
    if request.uri().path() == authorizer.login_path {
        return next.run(request).await;
    }

    let Some(token) = bearer_token(request.headers()) else {
        return next.run(request).await;
    };

    match authorizer.tokens.verify(token) {
        Ok(user) => {
            debug!(username = %user.username, roles = ?user.roles, "Bearer token accepted");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            warn!(path = %request.uri().path(), error = %e, "Rejected bearer token");
            let err = AuthError::from(e);
            record_token_rejection(err.code());
            err.into_response()
        }
    }
}

fn authenticated(parts: &Parts) -> Result<AuthenticatedUser, AuthError> {
    parts
        .extensions
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or(AuthError::MissingToken)
}

/// 주어진 역할 중 하나를 요구.
pub fn require_any_role(
    user: &AuthenticatedUser,
    required: &[RoleName],
) -> Result<(), AuthError> {
    if user.has_any_role(required) {
        Ok(())
    } else {
        Err(AuthError::InsufficientRole)
    }
}

/// `ROLE_USER` 또는 `ROLE_ADMIN`을 요구하는 추출기.
#[derive(Debug, Clone)]
pub struct UserAuth(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for UserAuth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;
        require_any_role(&user, &[RoleName::User, RoleName::Admin])?;
        Ok(UserAuth(user))
    }
}

/// `ROLE_ADMIN`을 요구하는 추출기.
#[derive(Debug, Clone)]
pub struct AdminAuth(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AdminAuth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;
        require_any_role(&user, &[RoleName::Admin])?;
        Ok(AdminAuth(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, middleware, routing::get, Router};
    use chrono::{Duration, Utc};
    use secrecy::SecretString;
    use tower::ServiceExt;

    fn tokens() -> TokenService {
        TokenService::new(
            &SecretString::from("middleware-test-secret-minimum-32-chars"),
            Duration::hours(12),
        )
    }

    async fn admin_only(AdminAuth(user): AdminAuth) -> String {
        user.username
    }

    async fn user_only(UserAuth(user): UserAuth) -> String {
        user.username
    }

    async fn open() -> &'static str {
        "open"
    }

    fn app() -> Router {
        Router::new()
            .route("/login", get(open))
            .route("/open", get(open))
            .route("/me", get(user_only))
            .route("/admin", get(admin_only))
            .route("/user", get(user_only))
            .layer(middleware::from_fn_with_state(
                Authorizer::new(tokens(), "/login"),
                authorization_middleware,
            ))
    }

    fn get_with(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_no_token_passes_through() {
        let response = app().oneshot(get_with("/open", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_anonymous_on_protected_route_is_unauthorized() {
        let response = app().oneshot(get_with("/me", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_token_populates_identity() {
        let token = tokens().issue("alice", &["ROLE_USER".to_string()]).unwrap();
        let response = app().oneshot(get_with("/me", Some(&token))).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"alice");
    }

    #[tokio::test]
    async fn test_invalid_token_is_rejected_with_error_message() {
        let response = app()
            .oneshot(get_with("/open", Some("not-a-token")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(response.headers().get("error").unwrap(), "INVALID_TOKEN");
        let body = body_json(response).await;
        assert!(body["error_message"].is_string());
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let token = tokens()
            .issue_at("bob", &["ROLE_USER".to_string()], Utc::now() - Duration::hours(13))
            .unwrap();
        let response = app().oneshot(get_with("/me", Some(&token))).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(response.headers().get("error").unwrap(), "TOKEN_EXPIRED");
    }

    #[tokio::test]
    async fn test_login_path_skips_verification() {
        let response = app()
            .oneshot(get_with("/login", Some("not-a-token")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_non_bearer_scheme_passes_through() {
        let request = Request::builder()
            .uri("/me")
            .header(AUTHORIZATION, "Basic YWxpY2U6c2VjcmV0")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_role_checks() {
        let user_token = tokens().issue("user", &["ROLE_USER".to_string()]).unwrap();
        let admin_token = tokens().issue("admin", &["ROLE_ADMIN".to_string()]).unwrap();

        let response = app().oneshot(get_with("/admin", Some(&user_token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app().oneshot(get_with("/admin", Some(&admin_token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app().oneshot(get_with("/user", Some(&admin_token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app().oneshot(get_with("/user", Some(&user_token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_auth_error_statuses() {
        assert_eq!(AuthError::MissingToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::BadCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::InsufficientRole.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::InvalidToken(TokenError::Expired).status(),
            StatusCode::FORBIDDEN
        );
    }
}
