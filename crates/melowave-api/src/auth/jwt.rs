//! JWT 토큰 처리.
//!
//! HS256 Access Token 발급/검증 로직. Refresh Token은 없으며
//! 토큰은 발급 시점부터 고정 시간(기본 12시간) 동안 유효합니다.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use melowave_core::{AuthConfig, RoleName};

/// JWT Access Token 페이로드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 사용자 이름
    pub sub: String,
    /// 권한 문자열 목록 (예: `["ROLE_USER"]`)
    pub roles: Vec<String>,
    /// Issued At - 토큰 발급 시간 (Unix timestamp)
    pub iat: i64,
    /// Expiration - 토큰 만료 시간 (Unix timestamp)
    pub exp: i64,
}

/// 검증된 토큰에서 복원한 요청 주체.
///
/// 인가 미들웨어가 요청 extensions에 넣고, 역할 추출기가 꺼내 씁니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// 사용자 이름
    pub username: String,
    /// 권한 문자열 목록
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    /// 주어진 역할 중 하나라도 가지는지 확인.
    pub fn has_any_role(&self, required: &[RoleName]) -> bool {
        required
            .iter()
            .any(|role| self.roles.iter().any(|r| r == role.authority()))
    }
}

/// JWT 토큰 에러.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("토큰 인코딩 실패: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
    #[error("토큰 서명이 유효하지 않습니다")]
    InvalidSignature,
    #[error("토큰이 만료되었습니다")]
    Expired,
    #[error("잘못된 토큰 형식")]
    Malformed,
}

/// 토큰 발급/검증 서비스.
///
/// 프로세스 전역 비밀 키와 만료 정책만 보유합니다.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// 새 토큰 서비스 생성.
    ///
    /// # Arguments
    ///
    /// * `secret` - HMAC 비밀 키
    /// * `ttl` - 토큰 유효 시간
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let key = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(key),
            decoding_key: DecodingKey::from_secret(key),
            validation,
            ttl,
        }
    }

    /// 인증 설정에서 토큰 서비스 생성.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret, Duration::hours(config.token_ttl_hours))
    }

    /// 토큰 유효 시간.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 현재 시각 기준으로 토큰 발급.
    pub fn issue(&self, username: &str, roles: &[String]) -> Result<String, TokenError> {
        self.issue_at(username, roles, Utc::now())
    }

    /// 지정한 발급 시각으로 토큰 발급.
    ///
    /// 만료 시각은 `issued_at + ttl`입니다.
    pub fn issue_at(
        &self,
        username: &str,
        roles: &[String],
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: username.to_string(),
            roles: roles.to_vec(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(TokenError::from)
    }

    /// 토큰 검증 후 사용자 이름과 역할 반환.
    ///
    /// 서명 검증이 만료 검사보다 먼저 수행됩니다.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;

        Ok(AuthenticatedUser {
            username: data.claims.sub,
            roles: data.claims.roles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

    fn service() -> TokenService {
        TokenService::new(&SecretString::from(TEST_SECRET), Duration::hours(12))
    }

    fn roles(names: &[RoleName]) -> Vec<String> {
        names.iter().map(|r| r.authority().to_string()).collect()
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let svc = service();
        let granted = roles(&[RoleName::User, RoleName::Admin]);

        let token = svc.issue("alice", &granted).unwrap();
        assert!(!token.is_empty());

        let user = svc.verify(&token).unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.roles, granted);
    }

    #[test]
    fn test_expiry_is_twelve_hours() {
        let svc = service();
        let now = Utc::now();
        let token = svc.issue_at("bob", &roles(&[RoleName::User]), now).unwrap();

        let data = decode::<Claims>(&token, &svc.decoding_key, &svc.validation).unwrap();
        assert_eq!(data.claims.exp - data.claims.iat, 12 * 60 * 60);
        assert_eq!(data.claims.iat, now.timestamp());
    }

    #[test]
    fn test_token_older_than_ttl_is_expired() {
        let svc = service();
        let issued = Utc::now() - Duration::hours(13);
        let token = svc.issue_at("bob", &roles(&[RoleName::User]), issued).unwrap();

        assert!(matches!(svc.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_token_within_ttl_is_valid() {
        let svc = service();
        let issued = Utc::now() - Duration::hours(11);
        let token = svc.issue_at("bob", &roles(&[RoleName::User]), issued).unwrap();

        assert!(svc.verify(&token).is_ok());
    }

    #[test]
    fn test_wrong_secret_is_invalid_signature() {
        let token = service().issue("carol", &roles(&[RoleName::Admin])).unwrap();

        let other = TokenService::new(
            &SecretString::from("wrong-secret-key-for-testing-minimum-32-chars"),
            Duration::hours(12),
        );
        assert!(matches!(other.verify(&token), Err(TokenError::InvalidSignature)));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(service().verify("invalid.token.here"), Err(TokenError::Malformed)));
        assert!(matches!(service().verify(""), Err(TokenError::Malformed)));
    }

    #[test]
    fn test_has_any_role() {
        let user = AuthenticatedUser {
            username: "dave".to_string(),
            roles: roles(&[RoleName::User]),
        };
        assert!(user.has_any_role(&[RoleName::User, RoleName::Admin]));
        assert!(!user.has_any_role(&[RoleName::Admin]));

        let nobody = AuthenticatedUser {
            username: "eve".to_string(),
            roles: vec!["ROLE_GUEST".to_string()],
        };
        assert!(!nobody.has_any_role(&RoleName::all()));
    }
}
