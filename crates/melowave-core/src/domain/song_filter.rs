//! 곡 검색 조건 조합.
//!
//! 제목(부분 일치), 아티스트(정확히 일치), 장르(정확히 일치) 조건 중
//! 주어진 것만 AND로 결합합니다. 조건이 하나도 없으면 모든 곡과 일치합니다.
//!
//! 같은 [`SongFilter`] 값이 SQL 조건 생성(`push_conditions`)과 메모리 내 매칭
//! (`matches`) 양쪽에 쓰이므로 목록 조회와 개수 조회가 항상 같은 조건을 공유합니다.

use serde::Deserialize;

/// 검색 결과 한 페이지의 곡 수.
pub const SONG_PAGE_SIZE: u32 = 5;

/// 곡 검색 필터.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SongFilter {
    /// 제목 부분 문자열
    #[serde(default)]
    pub title: Option<String>,
    /// 아티스트 (정확히 일치)
    #[serde(default)]
    pub artist: Option<String>,
    /// 장르 (정확히 일치)
    #[serde(default)]
    pub genre: Option<String>,
}

impl SongFilter {
    /// 새 필터 생성. 빈 문자열 조건은 없는 것으로 취급합니다.
    pub fn new(title: Option<String>, artist: Option<String>, genre: Option<String>) -> Self {
        Self {
            title: non_empty(title),
            artist: non_empty(artist),
            genre: non_empty(genre),
        }
    }

    /// 조건 없이 모든 곡과 일치하는 필터인지 확인.
    pub fn is_match_all(&self) -> bool {
        self.title().is_none() && self.artist().is_none() && self.genre().is_none()
    }

    /// 유효한 제목 조건.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|s| !s.is_empty())
    }

    /// 유효한 아티스트 조건.
    pub fn artist(&self) -> Option<&str> {
        self.artist.as_deref().filter(|s| !s.is_empty())
    }

    /// 유효한 장르 조건.
    pub fn genre(&self) -> Option<&str> {
        self.genre.as_deref().filter(|s| !s.is_empty())
    }

    /// 곡 속성이 모든 조건을 만족하는지 확인.
    ///
    /// 장르 조건이 있으면 장르가 없는 곡은 일치하지 않습니다.
    pub fn matches(&self, title: &str, artist: &str, genre: Option<&str>) -> bool {
        if let Some(needle) = self.title() {
            if !title.contains(needle) {
                return false;
            }
        }
        if let Some(expected) = self.artist() {
            if artist != expected {
                return false;
            }
        }
        if let Some(expected) = self.genre() {
            if genre != Some(expected) {
                return false;
            }
        }
        true
    }

    /// `WHERE 1=1` 뒤에 이어 붙일 조건을 생성합니다.
    ///
    /// 제목 조건의 `%`, `_`, `\`는 이스케이프되어 문자 그대로 비교됩니다.
    #[cfg(feature = "sqlx-support")]
    pub fn push_conditions(&self, builder: &mut sqlx::QueryBuilder<'_, sqlx::Postgres>) {
        if let Some(title) = self.title() {
            builder.push(" AND title LIKE ");
            builder.push_bind(format!("%{}%", escape_like(title)));
            builder.push(" ESCAPE '\\'");
        }
        if let Some(artist) = self.artist() {
            builder.push(" AND artist = ");
            builder.push_bind(artist.to_string());
        }
        if let Some(genre) = self.genre() {
            builder.push(" AND genre = ");
            builder.push_bind(genre.to_string());
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// LIKE 패턴 메타 문자 이스케이프.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// 0부터 시작하는 페이지 요청 (페이지 크기 고정).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// 페이지 번호 (0부터)
    pub page: u32,
}

impl PageRequest {
    /// 새 페이지 요청.
    pub fn new(page: u32) -> Self {
        Self { page }
    }

    /// 페이지 크기.
    pub fn limit(&self) -> i64 {
        i64::from(SONG_PAGE_SIZE)
    }

    /// 건너뛸 행 수.
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(SONG_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_matches_all() {
        let filter = SongFilter::default();
        assert!(filter.is_match_all());
        assert!(filter.matches("Anything", "Anyone", None));
        assert!(filter.matches("Other", "Someone", Some("Jazz")));
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let filter = SongFilter::new(Some(String::new()), Some(String::new()), None);
        assert!(filter.is_match_all());

        // 역직렬화된 빈 값도 조건으로 쓰이지 않음
        let filter = SongFilter {
            artist: Some(String::new()),
            ..Default::default()
        };
        assert!(filter.matches("Song", "Artist", None));
    }

    #[test]
    fn test_title_is_substring_match() {
        let filter = SongFilter::new(Some("ove".to_string()), None, None);
        assert!(filter.matches("Love Song", "A", None));
        assert!(!filter.matches("Hate Song", "A", None));
        // 대소문자 구분
        assert!(!filter.matches("OVERTURE", "A", None));
    }

    #[test]
    fn test_artist_and_genre_are_exact() {
        let filter = SongFilter::new(None, Some("Queen".to_string()), Some("Rock".to_string()));
        assert!(filter.matches("Bohemian Rhapsody", "Queen", Some("Rock")));
        assert!(!filter.matches("Bohemian Rhapsody", "Queen II", Some("Rock")));
        assert!(!filter.matches("Bohemian Rhapsody", "Queen", Some("Rock and Roll")));
        assert!(!filter.matches("Bohemian Rhapsody", "Queen", None));
    }

    #[test]
    fn test_conditions_are_conjunction() {
        let filter = SongFilter::new(Some("A".to_string()), Some("B".to_string()), None);
        assert!(filter.matches("A", "B", None));
        assert!(!filter.matches("A", "C", None));
        assert!(!filter.matches("X", "B", None));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_page_request_offset() {
        assert_eq!(PageRequest::new(0).offset(), 0);
        assert_eq!(PageRequest::new(3).offset(), 15);
        assert_eq!(PageRequest::new(3).limit(), 5);
    }

    #[cfg(feature = "sqlx-support")]
    mod sql {
        use super::super::*;
        use sqlx::QueryBuilder;

        fn conditions(filter: &SongFilter) -> String {
            let mut builder: QueryBuilder<sqlx::Postgres> =
                QueryBuilder::new("SELECT COUNT(*) FROM song WHERE 1=1");
            filter.push_conditions(&mut builder);
            builder.sql().to_string()
        }

        #[test]
        fn test_no_filters_add_no_conditions() {
            assert_eq!(
                conditions(&SongFilter::default()),
                "SELECT COUNT(*) FROM song WHERE 1=1"
            );
        }

        #[test]
        fn test_all_filters_bind_in_order() {
            let filter = SongFilter::new(
                Some("Love".to_string()),
                Some("Queen".to_string()),
                Some("Rock".to_string()),
            );
            let sql = conditions(&filter);
            assert!(sql.contains("AND title LIKE $1 ESCAPE '\\'"));
            assert!(sql.contains("AND artist = $2"));
            assert!(sql.contains("AND genre = $3"));
        }

        #[test]
        fn test_only_present_filters_are_pushed() {
            let filter = SongFilter::new(None, None, Some("Jazz".to_string()));
            let sql = conditions(&filter);
            assert!(!sql.contains("title"));
            assert!(!sql.contains("artist"));
            assert!(sql.ends_with("AND genre = $1"));
        }
    }
}
