//! 곡 서비스.

use std::sync::Arc;

use tracing::{debug, info, warn};

use melowave_core::{PageRequest, SongFilter};

use super::{ServiceError, ServiceResult};
use crate::repository::{NewSong, Song, SongRepository, SongUpdate};

/// 곡 CRUD와 검색.
#[derive(Clone)]
pub struct SongService {
    repo: Arc<dyn SongRepository>,
}

impl SongService {
    pub fn new(repo: Arc<dyn SongRepository>) -> Self {
        Self { repo }
    }

    pub async fn find_all(&self) -> ServiceResult<Vec<Song>> {
        Ok(self.repo.find_all().await?)
    }

    /// id로 곡 조회. 없으면 `NotFound`.
    pub async fn find_by_id(&self, id: i64) -> ServiceResult<Song> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("곡을 찾을 수 없습니다: {}", id)))
    }

    /// 필터와 일치하는 곡 한 페이지.
    pub async fn search(&self, filter: &SongFilter, page: PageRequest) -> ServiceResult<Vec<Song>> {
        Ok(self.repo.search(filter, page).await?)
    }

    /// 필터와 일치하는 곡 수.
    pub async fn count(&self, filter: &SongFilter) -> ServiceResult<i64> {
        Ok(self.repo.count(filter).await?)
    }

    pub async fn distinct_artists(&self) -> ServiceResult<Vec<String>> {
        Ok(self.repo.distinct_artists().await?)
    }

    pub async fn distinct_genres(&self) -> ServiceResult<Vec<String>> {
        Ok(self.repo.distinct_genres().await?)
    }

    /// 곡 생성. (제목, 아티스트)가 이미 있으면 `Conflict`.
    pub async fn create(&self, song: NewSong) -> ServiceResult<Song> {
        if self
            .repo
            .find_id_by_title_and_artist(&song.title, &song.artist)
            .await?
            .is_some()
        {
            warn!(title = %song.title, artist = %song.artist, "Duplicate song rejected");
            return Err(conflict(&song.title, &song.artist));
        }

        let created = self.repo.insert(&song).await?;
        info!(id = created.id, title = %created.title, artist = %created.artist, "Song created");
        Ok(created)
    }

    /// 곡 메타데이터 수정.
    ///
    /// 대상이 없으면 `NotFound`, 새 (제목, 아티스트)가 다른 곡의 것이면 `Conflict`.
    pub async fn update(&self, id: i64, update: SongUpdate) -> ServiceResult<Song> {
        if !self.repo.exists_by_id(id).await? {
            return Err(ServiceError::NotFound(format!("곡을 찾을 수 없습니다: {}", id)));
        }

        if let Some(other) = self
            .repo
            .find_id_by_title_and_artist(&update.title, &update.artist)
            .await?
        {
            if other != id {
                return Err(conflict(&update.title, &update.artist));
            }
        }

        let updated = self
            .repo
            .update(id, &update)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("곡을 찾을 수 없습니다: {}", id)))?;
        info!(id, title = %updated.title, "Song updated");
        Ok(updated)
    }

    /// 곡 삭제. 존재 여부를 먼저 확인합니다.
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.repo.exists_by_id(id).await? {
            debug!(id, "Delete of missing song");
            return Err(ServiceError::NotFound(format!("곡을 찾을 수 없습니다: {}", id)));
        }

        self.repo.delete(id).await?;
        info!(id, "Song deleted");
        Ok(())
    }
}

fn conflict(title: &str, artist: &str) -> ServiceError {
    ServiceError::Conflict(format!(
        "이미 존재하는 곡입니다: {} - {}",
        artist, title
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::memory::InMemorySongRepository;

    fn service() -> (SongService, Arc<InMemorySongRepository>) {
        let repo = Arc::new(InMemorySongRepository::new());
        (SongService::new(repo.clone()), repo)
    }

    fn song(title: &str, artist: &str) -> NewSong {
        NewSong {
            title: title.to_string(),
            artist: artist.to_string(),
            genre: Some("Pop".to_string()),
            audio: vec![0x49, 0x44, 0x33],
        }
    }

    #[tokio::test]
    async fn test_create_twice_conflicts_and_stores_once() {
        let (svc, repo) = service();
        svc.create(song("A", "B")).await.unwrap();

        let result = svc.create(song("A", "B")).await;
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let (svc, _) = service();
        let update = SongUpdate {
            title: "T".to_string(),
            artist: "A".to_string(),
            genre: None,
        };
        let result = svc.update(7, update).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_to_other_songs_pair_conflicts() {
        let (svc, _) = service();
        let first = svc.create(song("A", "B")).await.unwrap();
        svc.create(song("C", "D")).await.unwrap();

        let result = svc
            .update(
                first.id,
                SongUpdate {
                    title: "C".to_string(),
                    artist: "D".to_string(),
                    genre: None,
                },
            )
            .await;
        assert!(matches!(result, Err(ServiceError::Conflict(_))));

        // 자기 자신의 (제목, 아티스트) 유지는 허용
        let same = svc
            .update(
                first.id,
                SongUpdate {
                    title: "A".to_string(),
                    artist: "B".to_string(),
                    genre: Some("Rock".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(same.genre.as_deref(), Some("Rock"));
    }

    #[tokio::test]
    async fn test_delete_missing_leaves_store_unchanged() {
        let (svc, repo) = service();
        svc.create(song("A", "B")).await.unwrap();

        let result = svc.delete(42).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
        assert_eq!(repo.len().await, 1);

        svc.delete(1).await.unwrap();
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_search_and_count_share_filter() {
        let (svc, _) = service();
        for i in 0..6 {
            svc.create(song(&format!("Love {}", i), "Band")).await.unwrap();
        }
        svc.create(song("Other", "Band")).await.unwrap();

        let filter = SongFilter::new(Some("Love".to_string()), None, None);
        let page = svc.search(&filter, PageRequest::new(0)).await.unwrap();
        assert_eq!(page.len(), 5);
        assert_eq!(svc.count(&filter).await.unwrap(), 6);

        let all = SongFilter::default();
        assert_eq!(svc.count(&all).await.unwrap(), 7);
    }
}
