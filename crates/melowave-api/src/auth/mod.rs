//! 인증 및 권한 부여.
//!
//! JWT 기반 인증 및 역할 기반 접근 제어를 제공합니다.
//!
//! # 구성 요소
//!
//! - [`TokenService`]: Access Token 발급/검증 (HS256, 12시간)
//! - [`authorization_middleware`]: Bearer 토큰 검증 후 요청에 사용자 주입
//! - [`UserAuth`] / [`AdminAuth`]: 핸들러용 역할 추출기
//! - 비밀번호 해싱/검증 함수 (Argon2)
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! async fn protected_handler(AdminAuth(user): AdminAuth) -> impl IntoResponse {
//!     format!("Hello, {}!", user.username)
//! }
//! ```

mod jwt;
mod middleware;
mod password;

pub use jwt::{AuthenticatedUser, Claims, TokenError, TokenService};
pub use middleware::{
    authorization_middleware, require_any_role, AdminAuth, AuthError, Authorizer, UserAuth,
};
pub use password::{hash_password, verify_password, PasswordError, MISSING_USER_HASH};
