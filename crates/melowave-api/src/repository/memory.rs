//! 메모리 저장소 (테스트 전용).
//!
//! PostgreSQL 스키마의 고유 제약 조건(곡의 (제목, 아티스트), 사용자 이름)과
//! id 순 정렬을 그대로 흉내 냅니다. 검색은 [`SongFilter::matches`]를 사용하므로
//! SQL 구현과 같은 조건 정의를 공유합니다.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use melowave_core::{PageRequest, RoleName, SongFilter};

use super::{
    NewSong, RepositoryError, RepositoryResult, RoleRecord, Song, SongRepository, SongUpdate,
    UserRecord, UserRepository,
};

const SONG_UNIQUE: &str = "song_title_artist_key";
const USER_UNIQUE: &str = "app_user_username_key";

struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// 메모리 곡 저장소.
#[derive(Default)]
pub struct InMemorySongRepository {
    table: RwLock<Table<Song>>,
}

impl InMemorySongRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장된 곡 수.
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn pair_taken(table: &Table<Song>, title: &str, artist: &str, except: Option<i64>) -> bool {
    table
        .rows
        .values()
        .any(|s| s.title == title && s.artist == artist && Some(s.id) != except)
}

#[async_trait]
impl SongRepository for InMemorySongRepository {
    async fn find_all(&self) -> RepositoryResult<Vec<Song>> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Song>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn exists_by_id(&self, id: i64) -> RepositoryResult<bool> {
        Ok(self.table.read().await.rows.contains_key(&id))
    }

    async fn find_id_by_title_and_artist(
        &self,
        title: &str,
        artist: &str,
    ) -> RepositoryResult<Option<i64>> {
        Ok(self
            .table
            .read()
            .await
            .rows
            .values()
            .find(|s| s.title == title && s.artist == artist)
            .map(|s| s.id))
    }

    async fn insert(&self, song: &NewSong) -> RepositoryResult<Song> {
        let mut table = self.table.write().await;
        if pair_taken(&table, &song.title, &song.artist, None) {
            return Err(RepositoryError::UniqueViolation(SONG_UNIQUE.to_string()));
        }

        let record = Song {
            id: table.allocate_id(),
            title: song.title.clone(),
            artist: song.artist.clone(),
            genre: song.genre.clone(),
            audio: song.audio.clone(),
        };
        table.rows.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, id: i64, update: &SongUpdate) -> RepositoryResult<Option<Song>> {
        let mut table = self.table.write().await;
        if !table.rows.contains_key(&id) {
            return Ok(None);
        }
        if pair_taken(&table, &update.title, &update.artist, Some(id)) {
            return Err(RepositoryError::UniqueViolation(SONG_UNIQUE.to_string()));
        }

        Ok(table.rows.get_mut(&id).map(|song| {
            song.title = update.title.clone();
            song.artist = update.artist.clone();
            song.genre = update.genre.clone();
            song.clone()
        }))
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }

    async fn search(&self, filter: &SongFilter, page: PageRequest) -> RepositoryResult<Vec<Song>> {
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);

        Ok(self
            .table
            .read()
            .await
            .rows
            .values()
            .filter(|s| filter.matches(&s.title, &s.artist, s.genre.as_deref()))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &SongFilter) -> RepositoryResult<i64> {
        let count = self
            .table
            .read()
            .await
            .rows
            .values()
            .filter(|s| filter.matches(&s.title, &s.artist, s.genre.as_deref()))
            .count();
        Ok(count as i64)
    }

    async fn distinct_artists(&self) -> RepositoryResult<Vec<String>> {
        let table = self.table.read().await;
        let mut artists: Vec<String> = table.rows.values().map(|s| s.artist.clone()).collect();
        artists.sort();
        artists.dedup();
        Ok(artists)
    }

    async fn distinct_genres(&self) -> RepositoryResult<Vec<String>> {
        let table = self.table.read().await;
        let mut genres: Vec<String> = table.rows.values().filter_map(|s| s.genre.clone()).collect();
        genres.sort();
        genres.dedup();
        Ok(genres)
    }
}

/// 메모리 사용자 저장소.
///
/// 마이그레이션과 같은 역할 참조 데이터(`ROLE_USER`=1, `ROLE_ADMIN`=2)로 시작합니다.
pub struct InMemoryUserRepository {
    roles: Vec<RoleRecord>,
    table: RwLock<Table<UserRecord>>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        let roles = RoleName::all()
            .iter()
            .zip(1..)
            .map(|(role, id)| RoleRecord {
                id,
                name: role.authority().to_string(),
            })
            .collect();

        Self {
            roles,
            table: RwLock::new(Table::default()),
        }
    }

    /// 지정 역할로 사용자를 직접 추가 (관리자 계정 준비용).
    pub async fn seed(
        &self,
        username: &str,
        password_hash: &str,
        role: RoleName,
    ) -> RepositoryResult<UserRecord> {
        let role = self
            .find_role_by_name(role.authority())
            .await?
            .ok_or_else(|| RepositoryError::RoleNotFound(role.authority().to_string()))?;
        self.insert(username, password_hash, role.id).await
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_all(&self) -> RepositoryResult<Vec<UserRecord>> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<UserRecord>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<UserRecord>> {
        Ok(self
            .table
            .read()
            .await
            .rows
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn exists_by_username(&self, username: &str) -> RepositoryResult<bool> {
        Ok(self.find_by_username(username).await?.is_some())
    }

    async fn find_role_by_name(&self, name: &str) -> RepositoryResult<Option<RoleRecord>> {
        Ok(self.roles.iter().find(|r| r.name == name).cloned())
    }

    async fn insert(
        &self,
        username: &str,
        password_hash: &str,
        role_id: i64,
    ) -> RepositoryResult<UserRecord> {
        let role = self
            .roles
            .iter()
            .find(|r| r.id == role_id)
            .cloned()
            .ok_or_else(|| RepositoryError::RoleNotFound(role_id.to_string()))?;

        let mut table = self.table.write().await;
        if table.rows.values().any(|u| u.username == username) {
            return Err(RepositoryError::UniqueViolation(USER_UNIQUE.to_string()));
        }

        let user = UserRecord {
            id: table.allocate_id(),
            username: username.to_string(),
            password: password_hash.to_string(),
            role_id: role.id,
            role_name: role.name,
        };
        table.rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(
        &self,
        id: i64,
        username: &str,
        password_hash: &str,
    ) -> RepositoryResult<Option<UserRecord>> {
        let mut table = self.table.write().await;
        if table
            .rows
            .values()
            .any(|u| u.username == username && u.id != id)
        {
            return Err(RepositoryError::UniqueViolation(USER_UNIQUE.to_string()));
        }

        Ok(table.rows.get_mut(&id).map(|user| {
            user.username = username.to_string();
            user.password = password_hash.to_string();
            user.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_song(title: &str, artist: &str, genre: Option<&str>) -> NewSong {
        NewSong {
            title: title.to_string(),
            artist: artist.to_string(),
            genre: genre.map(str::to_string),
            audio: vec![1, 2, 3],
        }
    }

    #[tokio::test]
    async fn test_song_ids_are_sequential() {
        let repo = InMemorySongRepository::new();
        let a = repo.insert(&new_song("A", "X", None)).await.unwrap();
        let b = repo.insert(&new_song("B", "X", None)).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn test_duplicate_title_artist_is_rejected() {
        let repo = InMemorySongRepository::new();
        repo.insert(&new_song("A", "B", None)).await.unwrap();

        let result = repo.insert(&new_song("A", "B", Some("Pop"))).await;
        assert!(matches!(result, Err(RepositoryError::UniqueViolation(_))));
        assert_eq!(repo.len().await, 1);

        // 같은 제목이라도 아티스트가 다르면 허용
        repo.insert(&new_song("A", "C", None)).await.unwrap();
        assert_eq!(repo.len().await, 2);
    }

    #[tokio::test]
    async fn test_update_keeps_audio_and_checks_uniqueness() {
        let repo = InMemorySongRepository::new();
        let first = repo.insert(&new_song("A", "B", None)).await.unwrap();
        repo.insert(&new_song("C", "D", None)).await.unwrap();

        let update = SongUpdate {
            title: "C".to_string(),
            artist: "D".to_string(),
            genre: None,
        };
        let result = repo.update(first.id, &update).await;
        assert!(matches!(result, Err(RepositoryError::UniqueViolation(_))));

        let update = SongUpdate {
            title: "A2".to_string(),
            artist: "B".to_string(),
            genre: Some("Jazz".to_string()),
        };
        let updated = repo.update(first.id, &update).await.unwrap().unwrap();
        assert_eq!(updated.title, "A2");
        assert_eq!(updated.audio, vec![1, 2, 3]);

        assert!(repo.update(99, &update).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_pages_by_id() {
        let repo = InMemorySongRepository::new();
        for i in 0..7 {
            repo.insert(&new_song(&format!("Song {}", i), "Band", None))
                .await
                .unwrap();
        }

        let filter = SongFilter::default();
        let first = repo.search(&filter, PageRequest::new(0)).await.unwrap();
        let ids: Vec<i64> = first.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);

        let second = repo.search(&filter, PageRequest::new(1)).await.unwrap();
        assert_eq!(second.len(), 2);

        let beyond = repo.search(&filter, PageRequest::new(5)).await.unwrap();
        assert!(beyond.is_empty());

        assert_eq!(repo.count(&filter).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_distinct_artists_and_genres() {
        let repo = InMemorySongRepository::new();
        repo.insert(&new_song("1", "Queen", Some("Rock"))).await.unwrap();
        repo.insert(&new_song("2", "Queen", Some("Rock"))).await.unwrap();
        repo.insert(&new_song("3", "Abba", None)).await.unwrap();

        assert_eq!(repo.distinct_artists().await.unwrap(), vec!["Abba", "Queen"]);
        assert_eq!(repo.distinct_genres().await.unwrap(), vec!["Rock"]);
    }

    #[tokio::test]
    async fn test_user_roles_and_uniqueness() {
        let repo = InMemoryUserRepository::new();
        let role = repo.find_role_by_name("ROLE_USER").await.unwrap().unwrap();
        assert_eq!(role.id, 1);

        let user = repo.insert("kim", "hash", role.id).await.unwrap();
        assert_eq!(user.role_name, "ROLE_USER");

        let dup = repo.insert("kim", "hash2", role.id).await;
        assert!(matches!(dup, Err(RepositoryError::UniqueViolation(_))));

        let admin = repo.seed("root", "hash", RoleName::Admin).await.unwrap();
        assert_eq!(admin.role_name, "ROLE_ADMIN");

        let rename = repo.update(admin.id, "kim", "hash").await;
        assert!(matches!(rename, Err(RepositoryError::UniqueViolation(_))));

        let renamed = repo.update(user.id, "lee", "new").await.unwrap().unwrap();
        assert_eq!(renamed.username, "lee");
        assert!(repo.exists_by_username("lee").await.unwrap());
        assert!(!repo.exists_by_username("kim").await.unwrap());
    }
}
