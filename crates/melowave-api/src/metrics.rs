//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! HTTP 요청 메트릭과 인증/스트리밍 메트릭을 수집하고 `/metrics` 엔드포인트로 노출합니다.

use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

/// Prometheus 메트릭 레코더를 설정하고 핸들을 반환합니다.
///
/// # Errors
///
/// 버킷 설정이 잘못되었거나 레코더가 이미 설치되어 있으면 `BuildError`.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )?
        .install_recorder()
}

// ============================================================================
// HTTP 메트릭 헬퍼 함수
// ============================================================================

/// 라우터 경로 패턴에 매칭되지 않은 요청의 `route` 라벨.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// HTTP 요청 수신 기록.
///
/// `route`는 라우터 경로 패턴(`/song/find/{id}`)이어야 하며 원본 URI가 아닙니다.
pub fn record_http_request(method: &str, route: &str) {
    counter!("http_requests_total", "method" => method.to_owned(), "route" => route.to_owned())
        .increment(1);
}

/// HTTP 응답 상태와 처리 시간 기록.
pub fn record_http_completion(method: &str, route: &str, status: u16, elapsed: Duration) {
    let method = method.to_owned();
    let route = route.to_owned();

    counter!(
        "http_responses_total",
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "route" => route)
        .record(elapsed.as_secs_f64());
}

// ============================================================================
// 도메인 메트릭 헬퍼 함수
// ============================================================================

/// 로그인 시도 결과 기록 (`success` | `failure`).
pub fn record_login(outcome: &'static str) {
    counter!("auth_logins_total", "outcome" => outcome).increment(1);
}

/// 거부된 Bearer 토큰 기록 (에러 코드 라벨).
pub fn record_token_rejection(code: &'static str) {
    counter!("auth_token_rejections_total", "code" => code).increment(1);
}

/// 전송한 오디오 바이트 수 기록 (`stream` | `download`).
pub fn record_audio_served(kind: &'static str, bytes: usize) {
    counter!("audio_bytes_served_total", "kind" => kind).increment(bytes as u64);
}
