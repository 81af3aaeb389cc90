//! 공용 유틸리티.

pub mod serde_base64;
