pub mod calendar;
pub mod health;
pub mod lunar;

use std::sync::Arc;

use axum::{http::Uri, routing::get, Router};
use tower_http::services::{ServeDir, ServeFile};

use crate::error::AppError;
use crate::middleware;
use crate::AppState;

/// All `/api/v1` endpoints, without rate limiting.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(lunar::router())
        .merge(calendar::router())
}

/// Full application: static front end, health check and `api` nested under
/// `/api/v1`. Callers pass the API router so they can layer it first.
pub fn app(api: Router<Arc<AppState>>, state: Arc<AppState>) -> Router {
    let assets = state.config.server.asset_dir.clone();

    Router::new()
        // Front end
        .route_service("/", ServeFile::new(assets.join("html").join("index.html")))
        .nest_service("/assets", ServeDir::new(&assets))
        // Health check
        .route("/health", get(health::health_check))
        // Lunar calendar API
        .nest("/api/v1", api)
        .fallback(not_found)
        .with_state(state)
        // CSP middleware: set Content-Security-Policy headers
        .layer(axum::middleware::from_fn(middleware::csp::csp_middleware))
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::path::PathBuf;
    use tower::ServiceExt;

    use crate::config::Config;

    fn test_app() -> Router {
        let mut config = Config::default();
        config.server.asset_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets");
        config.calendar.prodid = "-//test//EN".to_string();
        app(api_router(), Arc::new(AppState { config }))
    }

    async fn post_json(path: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn lunar_birthday_for_year_not_leap_year() {
        let (status, body) = post_json(
            "/api/v1/lunar-birthday-for-year/",
            json!({
                "lunar_birth_date": "1958-11-06T00:00:00Z",
                "is_leap_month": false,
                "year": 2020
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"year": 2020, "month": 12, "day": 20}));
    }

    #[tokio::test]
    async fn lunar_birthday_for_year_ignores_leap_flag_of_regular_birth_month() {
        let (status, body) = post_json(
            "/api/v1/lunar-birthday-for-year/",
            json!({"lunar_birth_date": "2019-04-01", "is_leap_month": true, "year": 2020}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"year": 2020, "month": 4, "day": 23}));
    }

    #[tokio::test]
    async fn lunar_birthday_for_year_before_birth_is_bad_request() {
        let (status, body) = post_json(
            "/api/v1/lunar-birthday-for-year/",
            json!({"lunar_birth_date": "1958-11-06", "is_leap_month": false, "year": 1950}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn solar_to_lunar_leap_month() {
        let (status, body) = post_json(
            "/api/v1/solar-to-lunar/",
            json!({"solar_birth_date": "2020-05-23T00:00:00.000Z"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"year": 2020, "month": 4, "day": 1, "is_leap": true})
        );
    }

    #[tokio::test]
    async fn solar_to_lunar_out_of_range_reports_supported_years() {
        let (status, body) = post_json(
            "/api/v1/solar-to-lunar/",
            json!({"solar_birth_date": "1850-01-01"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_DATE");
        assert_eq!(body["error"]["details"]["min_year"], 1900);
        assert_eq!(body["error"]["details"]["max_year"], 2100);
    }

    #[tokio::test]
    async fn solar_to_lunar_rejects_impossible_solar_date() {
        let (status, _) = post_json(
            "/api/v1/solar-to-lunar/",
            json!({"solar_birth_date": "2021-02-30"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn leap_month_possible() {
        let (status, body) = post_json(
            "/api/v1/leap-month-possible/",
            json!({"year": 2020, "month": 4}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"possible": true, "leap_month": 4}));

        let (_, body) = post_json(
            "/api/v1/leap-month-possible/",
            json!({"year": 2019, "month": 3}),
        )
        .await;
        assert_eq!(body, json!({"possible": false, "leap_month": null}));
    }

    #[tokio::test]
    async fn generate_calendar() {
        let (status, body) = post_json(
            "/api/v1/lunar-birthday-calendar/",
            json!({
                "lunar_birth_date": "2020-11-06T00:00:00.000Z",
                "is_leap_month": false,
                "last_year": 2022,
                "title": "test-title",
                "description": "test-description",
                "notifications": [
                    {"duration": "9h", "forward": true},
                    {"duration": 54000000000000i64}
                ]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let ics = body["calendar"].as_str().unwrap();
        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.contains("PRODID:-//test//EN\r\n"));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 3);
        assert!(ics.contains("UID:test-title-2020-12-20\r\n"));
        assert!(ics.contains("TRIGGER:P0DT9H0M0S\r\n"));
        assert!(ics.contains("TRIGGER:-P0DT15H0M0S\r\n"));
    }

    #[tokio::test]
    async fn generate_calendar_rejects_bad_duration() {
        let (status, body) = post_json(
            "/api/v1/lunar-birthday-calendar/",
            json!({
                "lunar_birth_date": "2020-11-06",
                "last_year": 2022,
                "title": "t",
                "notifications": [{"duration": "6d"}]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/lunar-birthday-for-year/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_on_api_endpoint_is_method_not_allowed() {
        let request = Request::builder()
            .uri("/api/v1/lunar-birthday-for-year/")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn unknown_path_is_json_not_found() {
        let request = Request::builder()
            .uri("/api/v1/nope")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn serves_front_end_with_security_headers() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("content-security-policy"));

        let request = Request::builder()
            .uri("/assets/js/script.js")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn lunar_birth_date_is_a_text_input() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains(r#"<input type="text" id="lunar-birth-date""#));
        assert!(!html.contains(r#"type="date" id="lunar-birth-date""#));
    }

    #[tokio::test]
    async fn lunar_only_birth_date_is_accepted() {
        // Lunar month 2 has 30 days in 2020; February 30 is not a solar date.
        let (status, body) = post_json(
            "/api/v1/lunar-birthday-for-year/",
            json!({"lunar_birth_date": "2020-02-30", "is_leap_month": false, "year": 2021}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"year": 2021, "month": 4, "day": 11}));
    }

    #[tokio::test]
    async fn health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["supported_years"], json!([1900, 2100]));
    }
}
