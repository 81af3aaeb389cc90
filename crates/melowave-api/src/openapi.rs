//! OpenAPI 문서화 설정.
//!
//! utoipa로 REST API의 OpenAPI 3.0 문서를 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.
//!
//! 새 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use melowave_core::RoleName;

use crate::error::ApiErrorResponse;
use crate::repository::{NewSong, RoleRecord, Song, SongUpdate};
use crate::routes::login::LoginRequest;
use crate::services::{CreateUserRequest, TokenResponse, UpdateUserRequest, UserResponse};

/// `bearer_auth` 보안 스키마 등록.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

// ==================== OpenAPI 문서 정의 ====================

/// MeloWave API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "MeloWave API",
        version = "0.1.0",
        description = r#"
# MeloWave 음악 카탈로그 REST API

곡 메타데이터와 오디오를 관리하고 스트리밍하는 API입니다.

## 인증

`POST /login`으로 Access Token을 받은 뒤
`Authorization: Bearer <token>` 헤더를 포함하세요.

- 공개: 곡 조회/검색, 아티스트/장르 목록, 회원 가입
- USER: 스트리밍/다운로드, 본인 정보
- ADMIN: 곡 등록/수정/삭제, 사용자 관리
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "로컬 개발 서버"),
    ),
    tags(
        (name = "auth", description = "인증 - Access Token 발급"),
        (name = "songs", description = "곡 - 조회, 검색, 스트리밍, 관리"),
        (name = "users", description = "사용자 - 회원 가입 및 관리")
    ),
    modifiers(&SecurityAddon),
    // ==================== 스키마 등록 ====================
    components(
        schemas(
            // ===== Common =====
            ApiErrorResponse,

            // ===== Auth =====
            LoginRequest,
            TokenResponse,

            // ===== Songs =====
            Song,
            NewSong,
            SongUpdate,

            // ===== Users =====
            UserResponse,
            CreateUserRequest,
            UpdateUserRequest,
            RoleRecord,
            RoleName,
        )
    ),
    // ==================== 경로 등록 ====================
    paths(
        // ===== Auth =====
        crate::routes::login::login,

        // ===== Songs =====
        crate::routes::songs::list_songs,
        crate::routes::songs::find_song,
        crate::routes::songs::search_songs,
        crate::routes::songs::count_songs,
        crate::routes::songs::stream_song,
        crate::routes::songs::download_song,
        crate::routes::songs::list_artists,
        crate::routes::songs::list_genres,
        crate::routes::songs::status,
        crate::routes::songs::create_song,
        crate::routes::songs::update_song,
        crate::routes::songs::delete_song,

        // ===== Users =====
        crate::routes::users::create_user,
        crate::routes::users::update_user,
        crate::routes::users::list_users,
        crate::routes::users::get_user,
        crate::routes::users::get_user_by_username,
        crate::routes::users::current_user,
    )
)]
pub struct ApiDoc;

// ==================== Swagger UI 라우터 ====================

/// Swagger UI 라우터 생성.
///
/// - `/swagger-ui` - Swagger UI 대화형 문서
/// - `/api-docs/openapi.json` - OpenAPI JSON
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}
