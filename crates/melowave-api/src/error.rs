//! 통합 API 에러 응답 타입.
//!
//! 곡/사용자 엔드포인트의 에러 본문 형식을 정의합니다.
//! 인가 미들웨어의 `{"error_message": ...}` 본문은 [`crate::auth::AuthError`]가 담당합니다.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "SONG_NOT_FOUND",
///   "message": "곡을 찾을 수 없습니다: 42"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "NOT_FOUND", "CONFLICT", "VALIDATION_ERROR")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 추가 에러 상세 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// 상세 정보 포함 에러 생성.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details),
        }
    }

    /// `validator` 검증 실패를 필드별 메시지로 변환.
    ///
    /// `message`는 전체 메시지를 `; `로 이은 문자열이고,
    /// `details`는 `{필드: [메시지, ...]}` 객체입니다.
    pub fn validation(errors: &ValidationErrors) -> Self {
        let mut fields = serde_json::Map::new();
        let mut messages = Vec::new();

        let mut field_errors: Vec<_> = errors.field_errors().into_iter().collect();
        field_errors.sort_by(|a, b| a.0.cmp(&b.0));

        for (field, errors) in field_errors {
            let field_messages: Vec<String> = errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{}: 유효하지 않은 값", field))
                })
                .collect();
            messages.extend(field_messages.iter().cloned());
            fields.insert(field.to_string(), Value::from(field_messages));
        }

        Self::with_details("VALIDATION_ERROR", messages.join("; "), Value::Object(fields))
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

/// 요청 본문 검증. 실패 시 400 응답.
pub fn validate_request<T: validator::Validate>(
    request: &T,
) -> Result<(), (StatusCode, Json<ApiErrorResponse>)> {
    request
        .validate()
        .map_err(|errors| (StatusCode::BAD_REQUEST, Json(ApiErrorResponse::validation(&errors))))
}
