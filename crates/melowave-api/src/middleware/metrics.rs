//! HTTP 요청 metrics middleware.
//!
//! 경로 라벨은 원본 URI가 아니라 라우터가 매칭한 경로 패턴([`MatchedPath`])입니다.
//! 매칭되지 않은 요청은 모두 [`UNMATCHED_ROUTE`] 하나로 묶여 라벨 수가 라우트 수로 제한됩니다.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use crate::metrics::{record_http_completion, record_http_request, UNMATCHED_ROUTE};

/// 요청의 `route` 라벨.
pub fn route_label(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map_or(UNMATCHED_ROUTE, MatchedPath::as_str)
        .to_owned()
}

/// HTTP 메트릭을 수집하는 미들웨어 레이어.
///
/// - `http_requests_total`: 요청 수 (method, route)
/// - `http_responses_total`: 응답 수 (method, route, status)
/// - `http_request_duration_seconds`: 처리 시간 히스토그램
///
/// `MatchedPath`가 채워지도록 `Router::layer`로 적용해야 합니다.
pub async fn metrics_layer(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let route = route_label(&request);
    record_http_request(method.as_str(), &route);

    let started = Instant::now();
    let response = next.run(request).await;
    record_http_completion(
        method.as_str(),
        &route,
        response.status().as_u16(),
        started.elapsed(),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{HeaderValue, Method, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    async fn ok() -> &'static str {
        "OK"
    }

    /// 계산된 라벨을 `x-route` 헤더로 돌려주는 라우터.
    fn labelled_app() -> Router {
        async fn echo_route(request: Request, next: Next) -> Response {
            let route = route_label(&request);
            let mut response = next.run(request).await;
            if let Ok(value) = HeaderValue::from_str(&route) {
                response.headers_mut().insert("x-route", value);
            }
            response
        }

        Router::new()
            .route("/song/find/{id}", get(ok))
            .route("/song/status", get(ok))
            .fallback(|| async { StatusCode::NOT_FOUND })
            .layer(middleware::from_fn(echo_route))
    }

    async fn route_of(app: Router, uri: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let route = response
            .headers()
            .get("x-route")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        (response.status(), route)
    }

    #[test]
    fn test_route_label_without_match_is_unmatched() {
        let first = Request::builder()
            .uri("/song/find/abc")
            .body(Body::empty())
            .unwrap();
        let second = Request::builder()
            .uri("/x/7f3a9c")
            .body(Body::empty())
            .unwrap();

        assert_eq!(route_label(&first), UNMATCHED_ROUTE);
        assert_eq!(route_label(&second), route_label(&first));
    }

    #[tokio::test]
    async fn test_route_label_uses_path_pattern() {
        let (status, route) = route_of(labelled_app(), "/song/find/42").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(route, "/song/find/{id}");

        let (_, route) = route_of(labelled_app(), "/song/find/43").await;
        assert_eq!(route, "/song/find/{id}");
    }

    #[tokio::test]
    async fn test_unknown_paths_share_one_label() {
        let (status, first) = route_of(labelled_app(), "/x/random-1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, second) = route_of(labelled_app(), "/totally/different/path").await;
        assert_eq!(first, UNMATCHED_ROUTE);
        assert_eq!(second, UNMATCHED_ROUTE);
    }

    #[tokio::test]
    async fn test_metrics_middleware_passes_response_through() {
        let app = Router::new()
            .route("/song/status", get(ok))
            .layer(middleware::from_fn(metrics_layer));

        let (status, _) = route_of(app.clone(), "/song/status").await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = route_of(app, "/song/unknown/7").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
