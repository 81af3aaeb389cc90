//! 비밀번호 해싱 유틸리티.
//!
//! Argon2 기반 비밀번호 해싱 및 검증. 검증은 `password-hash`의
//! 상수 시간 비교를 사용합니다.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// 존재하지 않는 사용자의 로그인 시도에 대신 검증할 해시.
///
/// `Argon2::default()`와 같은 파라미터(m=19456, t=2, p=1)라서 검증 비용이
/// 실제 계정과 같습니다. 어떤 비밀번호와도 일치하지 않습니다.
pub const MISSING_USER_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$XK8OiLZXvCE7EdwpQfnkBA$EjAO2hjZ/ttoOQ6yKSUSTy/oDNAYbnDUgmpz4WaFNHk";

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("비밀번호 검증 실패")]
    VerificationFailed,
    #[error("잘못된 해시 형식")]
    InvalidHashFormat,
}

/// 비밀번호 해싱.
///
/// Argon2id 알고리즘을 사용하여 비밀번호를 해싱합니다.
/// 솔트는 자동으로 생성됩니다.
///
/// # Returns
///
/// PHC 형식의 해시 문자열 (솔트 포함)
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| PasswordError::HashingFailed)?;

    Ok(hash.to_string())
}

/// 비밀번호 검증.
///
/// 비밀번호가 일치하면 Ok(()), 불일치하면 `VerificationFailed`.
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| PasswordError::VerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let password = "TestPassword123!";
        let hash = hash_password(password).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(password, &hash).is_ok());
        assert!(matches!(
            verify_password("WrongPassword123!", &hash),
            Err(PasswordError::VerificationFailed)
        ));
    }

    #[test]
    fn test_different_salts() {
        let hash1 = hash_password("Password1").unwrap();
        let hash2 = hash_password("Password1").unwrap();

        // 같은 비밀번호라도 솔트가 다르므로 해시가 다름
        assert_ne!(hash1, hash2);
        assert!(verify_password("Password1", &hash1).is_ok());
        assert!(verify_password("Password1", &hash2).is_ok());
    }

    #[test]
    fn test_plaintext_is_not_a_hash() {
        let result = verify_password("password", "password");
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat)));
    }

    #[test]
    fn test_missing_user_hash_costs_a_full_verification() {
        // 형식 오류로 즉시 끝나지 않고 해시 계산 후 불일치로 끝나야 함
        assert!(matches!(
            verify_password("", MISSING_USER_HASH),
            Err(PasswordError::VerificationFailed)
        ));
        assert!(matches!(
            verify_password("melowave", MISSING_USER_HASH),
            Err(PasswordError::VerificationFailed)
        ));
    }

    #[test]
    fn test_unicode_password() {
        let password = "한글패스워드123";
        let hash = hash_password(password).unwrap();
        assert!(verify_password(password, &hash).is_ok());
    }
}
