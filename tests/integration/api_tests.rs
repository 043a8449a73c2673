//! API integration tests
//!
//! Need a running server with the fixed geocoder and a bootstrap administrator:
//! LOCALIBRARY_AUTH__BOOTSTRAP_ADMIN_EMAIL / LOCALIBRARY_AUTH__BOOTSTRAP_ADMIN_PASSWORD
//! matching ADMIN_EMAIL / ADMIN_PASSWORD below.

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:8080/api/v1";
const ADMIN_EMAIL: &str = "admin@localibrary.com.br";
const ADMIN_PASSWORD: &str = "admin123";

async fn login(client: &Client, email: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// 14 random digits, unique enough per run
fn random_cnpj() -> String {
    Uuid::new_v4()
        .as_u128()
        .to_string()
        .chars()
        .take(14)
        .collect()
}

fn random_isbn() -> String {
    format!("978{}", &Uuid::new_v4().as_u128().to_string()[..10])
}

/// Register a library, approve it and log in as it. Returns (library id, token).
async fn active_library(client: &Client, admin_token: &str) -> (i64, String) {
    let email = format!("biblioteca-{}@example.com", Uuid::new_v4());
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "trade_name": "Biblioteca Teste",
            "legal_name": "Biblioteca Teste LTDA",
            "cnpj": random_cnpj(),
            "phone": "(11) 3333-4444",
            "category": "PUBLIC",
            "email": email,
            "password": "segredo123",
            "address": {
                "cep": "01310-100",
                "street": "Avenida Paulista",
                "number": "1578",
                "district": "Bela Vista",
                "city": "São Paulo",
                "state": "SP"
            }
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let library: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(library["status"], "PENDING");
    let id = library["id"].as_i64().expect("No id");

    let response = client
        .patch(format!("{}/admin/libraries/{}/status", BASE_URL, id))
        .bearer_auth(admin_token)
        .json(&json!({ "status": "ACTIVE" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    (id, login(client, &email, "segredo123").await)
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "UP");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 24 * 3600);
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": ADMIN_EMAIL, "password": "wrong-password" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
#[ignore]
async fn test_register_rejects_other_cities() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "trade_name": "Biblioteca Campinas",
            "legal_name": "Biblioteca Campinas LTDA",
            "cnpj": random_cnpj(),
            "category": "SCHOOL",
            "email": format!("campinas-{}@example.com", Uuid::new_v4()),
            "password": "segredo123",
            "address": {
                "cep": "13010-000",
                "street": "Rua Barão de Jaguara",
                "number": "100",
                "district": "Centro",
                "city": "Campinas",
                "state": "SP"
            }
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_collection_and_proximity() {
    let client = Client::new();
    let admin_token = login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (library_id, token) = active_library(&client, &admin_token).await;

    // Add a book
    let response = client
        .post(format!("{}/libraries/{}/books", BASE_URL, library_id))
        .bearer_auth(&token)
        .json(&json!({
            "isbn": random_isbn(),
            "title": "Dom Casmurro",
            "author": "Machado de Assis",
            "publication_year": 1899,
            "genre_ids": [1],
            "quantity": 3
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let entry: Value = response.json().await.expect("Failed to parse response");
    let book_id = entry["id"].as_i64().expect("No book id");
    assert_eq!(entry["quantity"], 3);

    // Find it near Paulista
    let response = client
        .get(format!("{}/books/{}/libraries?lat=-23.5614&lon=-46.6560", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let libraries: Value = response.json().await.expect("Failed to parse response");
    let found = libraries
        .as_array()
        .expect("Expected an array")
        .iter()
        .find(|l| l["id"] == library_id)
        .expect("Library not listed");
    assert!(found["distance_km"].is_number());
    assert_ne!(found["formatted_distance"], "N/A");

    // Quantity 0 drops the entry
    let response = client
        .patch(format!("{}/libraries/{}/books/{}/quantity", BASE_URL, library_id, book_id))
        .bearer_auth(&token)
        .json(&json!({ "quantity": 0 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .get(format!("{}/libraries/{}/books/{}", BASE_URL, library_id, book_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_moderator_lifecycle() {
    let client = Client::new();
    let admin_token = login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let email = format!("moderador-{}@localibrary.com.br", Uuid::new_v4());

    let response = client
        .post(format!("{}/admin/moderators", BASE_URL))
        .bearer_auth(&admin_token)
        .json(&json!({
            "first_name": "Maria",
            "last_name": "Silva",
            "email": email,
            "password": "moderador1"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let moderator: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(moderator["role"], "MODERATOR");
    let id = moderator["id"].as_i64().expect("No id");

    let moderator_token = login(&client, &email, "moderador1").await;
    let response = client
        .get(format!("{}/admin/dashboard", BASE_URL))
        .bearer_auth(&moderator_token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .patch(format!("{}/admin/moderators/{}/status", BASE_URL, id))
        .bearer_auth(&admin_token)
        .json(&json!({ "status": "INACTIVE" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "moderador1" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .delete(format!("{}/admin/moderators/{}", BASE_URL, id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
