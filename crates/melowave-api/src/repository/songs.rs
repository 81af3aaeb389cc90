//! Song Repository
//!
//! `song` 테이블 연산. 검색은 [`SongFilter`]가 만든 조건을
//! `WHERE 1=1` 뒤에 이어 붙이는 방식으로 동적 쿼리를 구성합니다.

use async_trait::async_trait;
use sqlx::{PgPool, QueryBuilder};
use tracing::{debug, info};

use melowave_core::{PageRequest, SongFilter};

use super::{NewSong, RepositoryResult, Song, SongRepository, SongUpdate};

const SONG_COLUMNS: &str = "id, title, artist, genre, audio";

/// PostgreSQL 곡 저장소.
#[derive(Debug, Clone)]
pub struct PgSongRepository {
    pool: PgPool,
}

impl PgSongRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 필터 조건이 붙은 SELECT 빌더.
    fn filtered(select: &str, filter: &SongFilter) -> QueryBuilder<'static, sqlx::Postgres> {
        let mut builder = QueryBuilder::<sqlx::Postgres>::new(format!(
            "SELECT {} FROM song WHERE 1=1",
            select
        ));
        filter.push_conditions(&mut builder);
        builder
    }
}

#[async_trait]
impl SongRepository for PgSongRepository {
    async fn find_all(&self) -> RepositoryResult<Vec<Song>> {
        let songs = sqlx::query_as::<_, Song>(&format!(
            "SELECT {} FROM song ORDER BY id",
            SONG_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(songs)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Song>> {
        let song = sqlx::query_as::<_, Song>(&format!(
            "SELECT {} FROM song WHERE id = $1",
            SONG_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(song)
    }

    async fn exists_by_id(&self, id: i64) -> RepositoryResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM song WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn find_id_by_title_and_artist(
        &self,
        title: &str,
        artist: &str,
    ) -> RepositoryResult<Option<i64>> {
        let id = sqlx::query_scalar("SELECT id FROM song WHERE title = $1 AND artist = $2")
            .bind(title)
            .bind(artist)
            .fetch_optional(&self.pool)
            .await?;

        Ok(id)
    }

    async fn insert(&self, song: &NewSong) -> RepositoryResult<Song> {
        let record = sqlx::query_as::<_, Song>(&format!(
            r#"
            INSERT INTO song (title, artist, genre, audio)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            SONG_COLUMNS
        ))
        .bind(&song.title)
        .bind(&song.artist)
        .bind(&song.genre)
        .bind(&song.audio)
        .fetch_one(&self.pool)
        .await?;

        info!(id = record.id, title = %record.title, "Song inserted");
        Ok(record)
    }

    async fn update(&self, id: i64, update: &SongUpdate) -> RepositoryResult<Option<Song>> {
        let record = sqlx::query_as::<_, Song>(&format!(
            r#"
            UPDATE song
            SET title = $2, artist = $3, genre = $4
            WHERE id = $1
            RETURNING {}
            "#,
            SONG_COLUMNS
        ))
        .bind(id)
        .bind(&update.title)
        .bind(&update.artist)
        .bind(&update.genre)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM song WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn search(&self, filter: &SongFilter, page: PageRequest) -> RepositoryResult<Vec<Song>> {
        debug!(?filter, page = page.page, "Searching songs");

        let mut builder = Self::filtered(SONG_COLUMNS, filter);
        builder.push(" ORDER BY id LIMIT ");
        builder.push_bind(page.limit());
        builder.push(" OFFSET ");
        builder.push_bind(page.offset());

        let songs = builder
            .build_query_as::<Song>()
            .fetch_all(&self.pool)
            .await?;

        Ok(songs)
    }

    async fn count(&self, filter: &SongFilter) -> RepositoryResult<i64> {
        let mut builder = Self::filtered("COUNT(*)", filter);
        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn distinct_artists(&self) -> RepositoryResult<Vec<String>> {
        let artists = sqlx::query_scalar(
            "SELECT DISTINCT artist FROM song WHERE artist IS NOT NULL ORDER BY artist",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(artists)
    }

    async fn distinct_genres(&self) -> RepositoryResult<Vec<String>> {
        let genres = sqlx::query_scalar(
            "SELECT DISTINCT genre FROM song WHERE genre IS NOT NULL ORDER BY genre",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(genres)
    }
}
