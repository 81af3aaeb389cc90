//! 역할 기반 접근 제어 (RBAC) 역할 정의.
//!
//! 역할은 `role` 테이블의 참조 데이터이며 JWT `roles` 클레임에 권한 문자열
//! (`ROLE_USER`, `ROLE_ADMIN`)로 실립니다.

use serde::{Deserialize, Serialize};

use crate::error::MelowaveError;

/// 사용자 역할.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub enum RoleName {
    /// 일반 사용자 - 다운로드, 본인 정보 수정
    #[serde(rename = "ROLE_USER")]
    User,
    /// 관리자 - 곡 관리, 사용자 조회
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl RoleName {
    /// 토큰과 DB에 저장되는 권한 문자열.
    pub fn authority(&self) -> &'static str {
        match self {
            RoleName::User => "ROLE_USER",
            RoleName::Admin => "ROLE_ADMIN",
        }
    }

    /// 권한 문자열에서 역할 파싱. 정확히 일치해야 합니다.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ROLE_USER" => Some(RoleName::User),
            "ROLE_ADMIN" => Some(RoleName::Admin),
            _ => None,
        }
    }

    /// 모든 역할.
    pub fn all() -> [RoleName; 2] {
        [RoleName::User, RoleName::Admin]
    }
}

impl std::str::FromStr for RoleName {
    type Err = MelowaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| MelowaveError::UnknownRole(s.to_string()))
    }
}

impl std::fmt::Display for RoleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.authority())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authority_round_trip() {
        for role in RoleName::all() {
            assert_eq!(RoleName::parse(role.authority()), Some(role));
            assert_eq!(role.authority().parse::<RoleName>().unwrap(), role);
        }
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!(RoleName::parse("role_admin"), None);
        assert_eq!(RoleName::parse("ADMIN"), None);
        assert!("ROLE_GUEST".parse::<RoleName>().is_err());
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&RoleName::Admin).unwrap();
        assert_eq!(json, "\"ROLE_ADMIN\"");

        let parsed: RoleName = serde_json::from_str("\"ROLE_USER\"").unwrap();
        assert_eq!(parsed, RoleName::User);
    }
}
