//! 도메인 타입.
//!
//! - [`role`]: 사용자 역할과 권한 이름
//! - [`song_filter`]: 곡 검색 조건 조합 및 페이지 요청

pub mod role;
pub mod song_filter;

pub use role::RoleName;
pub use song_filter::{PageRequest, SongFilter, SONG_PAGE_SIZE};
