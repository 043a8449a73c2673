//! In-process router tests for the routes that answer before touching the database

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use localibrary_server::{
    api,
    config::AppConfig,
    models::{auth::Claims, enums::Role},
    repository::Repository,
    services::{geocoding::FixedGeocoder, Services},
    AppState,
};

const SECRET: &str = "router-test-secret";

fn app() -> Router {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = SECRET.to_string();

    // Never connects: every request below is answered before a query runs
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database.url)
        .unwrap();

    let geocoder = Arc::new(FixedGeocoder::new(config.geocoding.default_coordinate()));
    let services = Services::with_geocoder(Repository::new(pool), &config, geocoder);

    api::router(AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    })
}

fn token(role: Role, id: i64) -> String {
    Claims::new("someone@localibrary.com.br", id, role, 1)
        .create_token(SECRET)
        .unwrap()
}

fn request(method: Method, uri: &str, bearer: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match bearer {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {}", token)),
        None => builder,
    }
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn get(uri: &str, bearer: Option<&str>) -> (StatusCode, Value) {
    send(request(Method::GET, uri, bearer).body(Body::empty()).unwrap()).await
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get("/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "UP");
    assert_eq!(body["service"], "localibrary");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_welcome() {
    let (status, body) = get("/api/v1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Localibrary API");
    assert_eq!(body["documentation"], "/swagger-ui");
    assert!(body["links"].as_array().unwrap().len() >= 4);
}

#[tokio::test]
async fn test_openapi_document() {
    let (status, body) = get("/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);

    let paths = body["paths"].as_object().unwrap();
    for path in [
        "/books/{id}/libraries",
        "/libraries/{id}/books/{book_id}/quantity",
        "/admin/moderators/{id}/status",
        "/uploads/{kind}",
    ] {
        assert!(paths.contains_key(path), "missing {}", path);
    }
    assert!(body["components"]["securitySchemes"]["bearer_auth"].is_object());
}

#[tokio::test]
async fn test_own_area_requires_token() {
    let (status, body) = get("/api/v1/libraries/1/profile", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NotAuthenticated");
    assert_eq!(body["code"], 2);

    let (status, _) = get("/api/v1/libraries/1/profile", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let foreign = Claims::new("x@y.com", 1, Role::Library, 1)
        .create_token("another-secret")
        .unwrap();
    let (status, _) = get("/api/v1/libraries/1/profile", Some(&foreign)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_library_cannot_touch_another_library() {
    let other = token(Role::Library, 2);

    let (status, body) = get("/api/v1/libraries/1/profile", Some(&other)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "NotAuthorized");

    let (status, _) = get("/api/v1/libraries/1/books/10", Some(&other)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        request(Method::DELETE, "/api/v1/libraries/1/books/10", Some(&other))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Staff have no access to a library's own area either
    let (status, _) = get("/api/v1/libraries/1/books", Some(&token(Role::Admin, 1))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_back_office_roles() {
    let (status, _) = get("/api/v1/admin/dashboard", Some(&token(Role::Library, 1))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let moderator = token(Role::Moderator, 5);

    let (status, _) = get("/api/v1/admin/moderators", Some(&moderator)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        request(Method::DELETE, "/api/v1/admin/libraries/1", Some(&moderator))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        request(Method::DELETE, "/api/v1/admin/moderators/3", Some(&moderator))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_login_rejects_malformed_email() {
    let (status, body) = send(
        request(Method::POST, "/api/v1/auth/login", None)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"email": "not-an-email", "password": "secret"}"#))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0], "email: must be a valid email");
}

#[tokio::test]
async fn test_register_reports_nested_address_errors() {
    let payload = r#"{
        "trade_name": "Biblioteca Teste",
        "legal_name": "Biblioteca Teste LTDA",
        "cnpj": "12345678000190",
        "category": "PUBLIC",
        "email": "biblioteca@example.com",
        "password": "segredo123",
        "address": {
            "cep": "01310-100",
            "street": "",
            "number": "1578",
            "district": "Bela Vista",
            "city": "São Paulo",
            "state": "SP"
        }
    }"#;

    let (status, body) = send(
        request(Method::POST, "/api/v1/auth/register", None)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"], serde_json::json!(["address.street: length"]));
}

fn multipart(content_type: &str, file_name: &str, data: &str) -> (String, String) {
    let boundary = "localibrary-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: {c}\r\n\r\n{d}\r\n--{b}--\r\n",
        b = boundary,
        f = file_name,
        c = content_type,
        d = data
    );
    (format!("multipart/form-data; boundary={}", boundary), body)
}

#[tokio::test]
async fn test_upload_rules() {
    let library = token(Role::Library, 1);

    let (content_type, body) = multipart("image/gif", "capa.gif", "GIF89a");
    let (status, response) = send(
        request(Method::POST, "/api/v1/uploads/cover", Some(&library))
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "Only JPEG and PNG images are accepted");

    let (content_type, body) = multipart("image/png", "../../capa.png", "png");
    let (status, _) = send(
        request(Method::POST, "/api/v1/uploads/cover", Some(&library))
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (content_type, body) = multipart("image/png", "capa.png", "png");
    let (status, _) = send(
        request(Method::POST, "/api/v1/uploads/poster", Some(&library))
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (content_type, body) = multipart("image/png", "capa.png", "png");
    let (status, _) = send(
        request(Method::POST, "/api/v1/uploads/cover", None)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
