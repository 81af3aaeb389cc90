//! Song API 라우트
//!
//! 곡 조회/검색/스트리밍과 관리자용 곡 관리 API를 제공합니다.
//!
//! # 엔드포인트
//!
//! - `GET /song/all` - 전체 곡 (ADMIN)
//! - `GET /song/find/{id}` - 곡 조회
//! - `GET /song/search?title&artist&genre&page` - 곡 검색 (페이지당 5곡)
//! - `GET /song/search/count?title&artist&genre` - 검색 결과 수
//! - `GET /song/stream/{id}` - 오디오 바이트 스트리밍
//! - `GET /song/download/{id}` - 오디오 다운로드 (USER/ADMIN)
//! - `GET /song/artists` - 아티스트 목록
//! - `GET /song/genres` - 장르 목록
//! - `GET /song/status` - 상태 확인
//! - `POST /song/create` - 곡 생성 (ADMIN)
//! - `PUT /song/update/{id}` - 곡 정보 수정 (ADMIN)
//! - `DELETE /song/delete/{id}` - 곡 삭제 (ADMIN)

use axum::{
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use melowave_core::{PageRequest, SongFilter};

use crate::auth::{AdminAuth, UserAuth};
use crate::error::{validate_request, ApiErrorResponse, ApiResult};
use crate::metrics::record_audio_served;
use crate::repository::{NewSong, Song, SongUpdate};
use crate::state::AppState;

// ================================================================================================
// Request/Response Types
// ================================================================================================

/// 검색 쿼리. 빈 문자열 조건은 무시됩니다.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    /// 0부터 시작하는 페이지 번호
    #[serde(default)]
    pub page: u32,
}

impl SearchQuery {
    fn filter(&self) -> SongFilter {
        SongFilter::new(self.title.clone(), self.artist.clone(), self.genre.clone())
    }
}

const STATUS_TEXT: &str = "Looks good !";

// ================================================================================================
// Handlers
// ================================================================================================

/// GET /song/all - 전체 곡
#[utoipa::path(
    get,
    path = "/song/all",
    responses(
        (status = 200, description = "전체 곡 목록", body = Vec<Song>),
        (status = 401, description = "인증 필요"),
        (status = 403, description = "권한 부족")
    ),
    security(("bearer_auth" = [])),
    tag = "songs"
)]
pub async fn list_songs(
    State(state): State<Arc<AppState>>,
    AdminAuth(_admin): AdminAuth,
) -> ApiResult<Json<Vec<Song>>> {
    Ok(Json(state.songs.find_all().await?))
}

/// GET /song/find/{id} - 곡 조회
#[utoipa::path(
    get,
    path = "/song/find/{id}",
    params(("id" = i64, Path, description = "곡 ID")),
    responses(
        (status = 200, description = "곡", body = Song),
        (status = 404, description = "곡 없음", body = ApiErrorResponse)
    ),
    tag = "songs"
)]
pub async fn find_song(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Song>> {
    Ok(Json(state.songs.find_by_id(id).await?))
}

/// GET /song/search - 곡 검색
#[utoipa::path(
    get,
    path = "/song/search",
    params(
        ("title" = Option<String>, Query, description = "제목 부분 문자열"),
        ("artist" = Option<String>, Query, description = "아티스트 (정확히 일치)"),
        ("genre" = Option<String>, Query, description = "장르 (정확히 일치)"),
        ("page" = Option<u32>, Query, description = "페이지 번호 (0부터, 기본 0)")
    ),
    responses((status = 200, description = "검색 결과 한 페이지", body = Vec<Song>)),
    tag = "songs"
)]
pub async fn search_songs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Song>>> {
    let filter = query.filter();
    debug!(?filter, page = query.page, "곡 검색");

    let songs = state
        .songs
        .search(&filter, PageRequest::new(query.page))
        .await?;
    Ok(Json(songs))
}

/// GET /song/search/count - 검색 결과 수
#[utoipa::path(
    get,
    path = "/song/search/count",
    params(
        ("title" = Option<String>, Query, description = "제목 부분 문자열"),
        ("artist" = Option<String>, Query, description = "아티스트 (정확히 일치)"),
        ("genre" = Option<String>, Query, description = "장르 (정확히 일치)")
    ),
    responses((status = 200, description = "일치하는 곡 수", body = i64)),
    tag = "songs"
)]
pub async fn count_songs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<i64>> {
    Ok(Json(state.songs.count(&query.filter()).await?))
}

/// GET /song/stream/{id} - 오디오 스트리밍
#[utoipa::path(
    get,
    path = "/song/stream/{id}",
    params(("id" = i64, Path, description = "곡 ID")),
    responses(
        (status = 200, description = "오디오 바이트 (application/octet-stream)"),
        (status = 404, description = "곡 없음", body = ApiErrorResponse)
    ),
    tag = "songs"
)]
pub async fn stream_song(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    let song = state.songs.find_by_id(id).await?;
    debug!(id, bytes = song.audio.len(), "Streaming song");
    record_audio_served("stream", song.audio.len());
    Ok(audio_response(song.audio, None))
}

/// GET /song/download/{id} - 오디오 다운로드
#[utoipa::path(
    get,
    path = "/song/download/{id}",
    params(("id" = i64, Path, description = "곡 ID")),
    responses(
        (status = 200, description = "첨부 파일 (application/octet-stream)"),
        (status = 401, description = "인증 필요"),
        (status = 404, description = "곡 없음", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "songs"
)]
pub async fn download_song(
    State(state): State<Arc<AppState>>,
    UserAuth(user): UserAuth,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    let song = state.songs.find_by_id(id).await?;
    info!(id, username = %user.username, "Song download");
    record_audio_served("download", song.audio.len());

    let disposition = attachment_header(&song.title);
    Ok(audio_response(song.audio, Some(disposition)))
}

/// GET /song/artists - 아티스트 목록
#[utoipa::path(
    get,
    path = "/song/artists",
    responses((status = 200, description = "중복 없는 아티스트 목록", body = Vec<String>)),
    tag = "songs"
)]
pub async fn list_artists(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.songs.distinct_artists().await?))
}

/// GET /song/genres - 장르 목록
#[utoipa::path(
    get,
    path = "/song/genres",
    responses((status = 200, description = "중복 없는 장르 목록", body = Vec<String>)),
    tag = "songs"
)]
pub async fn list_genres(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.songs.distinct_genres().await?))
}

/// GET /song/status - 상태 확인
#[utoipa::path(
    get,
    path = "/song/status",
    responses((status = 200, description = "서비스 정상", body = String)),
    tag = "songs"
)]
pub async fn status() -> &'static str {
    STATUS_TEXT
}

/// POST /song/create - 곡 생성
#[utoipa::path(
    post,
    path = "/song/create",
    request_body = NewSong,
    responses(
        (status = 201, description = "생성된 곡", body = Song),
        (status = 400, description = "입력 오류", body = ApiErrorResponse),
        (status = 409, description = "같은 제목/아티스트의 곡 존재", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "songs"
)]
pub async fn create_song(
    State(state): State<Arc<AppState>>,
    AdminAuth(_admin): AdminAuth,
    Json(input): Json<NewSong>,
) -> ApiResult<(StatusCode, Json<Song>)> {
    validate_request(&input)?;
    let song = state.songs.create(input).await?;
    Ok((StatusCode::CREATED, Json(song)))
}

/// PUT /song/update/{id} - 곡 정보 수정
#[utoipa::path(
    put,
    path = "/song/update/{id}",
    params(("id" = i64, Path, description = "곡 ID")),
    request_body = SongUpdate,
    responses(
        (status = 200, description = "수정된 곡", body = Song),
        (status = 404, description = "곡 없음", body = ApiErrorResponse),
        (status = 409, description = "같은 제목/아티스트의 곡 존재", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "songs"
)]
pub async fn update_song(
    State(state): State<Arc<AppState>>,
    AdminAuth(_admin): AdminAuth,
    Path(id): Path<i64>,
    Json(input): Json<SongUpdate>,
) -> ApiResult<Json<Song>> {
    validate_request(&input)?;
    Ok(Json(state.songs.update(id, input).await?))
}

/// DELETE /song/delete/{id} - 곡 삭제
#[utoipa::path(
    delete,
    path = "/song/delete/{id}",
    params(("id" = i64, Path, description = "곡 ID")),
    responses(
        (status = 204, description = "삭제됨"),
        (status = 404, description = "곡 없음", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "songs"
)]
pub async fn delete_song(
    State(state): State<Arc<AppState>>,
    AdminAuth(_admin): AdminAuth,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.songs.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ================================================================================================
// Helpers
// ================================================================================================

fn audio_response(audio: Vec<u8>, disposition: Option<HeaderValue>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(CONTENT_LENGTH, HeaderValue::from(audio.len()));
    if let Some(disposition) = disposition {
        headers.insert(CONTENT_DISPOSITION, disposition);
    }

    (headers, audio).into_response()
}

/// `attachment; filename="<title>.mp3"` 헤더 값.
///
/// 헤더에 쓸 수 없는 문자(ASCII 외 문자, 제어 문자, `"`, `\`)는 `_`로 바꿉니다.
fn attachment_header(title: &str) -> HeaderValue {
    let safe: String = title
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() || c == ' ') && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    HeaderValue::from_str(&format!("attachment; filename=\"{}.mp3\"", safe))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

// ================================================================================================
// Router
// ================================================================================================

/// Song 라우터 생성.
///
/// 곡 등록은 오디오를 본문에 싣기 때문에 `max_upload_bytes`까지 허용합니다.
pub fn songs_router(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/all", get(list_songs))
        .route("/find/{id}", get(find_song))
        .route("/search", get(search_songs))
        .route("/search/count", get(count_songs))
        .route("/stream/{id}", get(stream_song))
        .route("/download/{id}", get(download_song))
        .route("/artists", get(list_artists))
        .route("/genres", get(list_genres))
        .route("/status", get(status))
        .route(
            "/create",
            post(create_song).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/update/{id}", put(update_song))
        .route("/delete/{id}", delete(delete_song))
}
