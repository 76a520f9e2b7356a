#![allow(dead_code)]

use sea_orm::{ConnectOptions, Database};
use serde_json::json;
use std::sync::Arc;

use storefront_api::api::create_api_router;
use storefront_api::entities::{ensure_admin, setup_schema};
use storefront_api::payment::{InstantCapture, PaymentGateway};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "AdminPass123";

//Boots the full router against a fresh in-memory database on an ephemeral
//port, so the tests drive it over HTTP like a real client.
pub async fn spawn_app() -> String {
    std::env::set_var("SECRET", "integration-test-secret");
    std::env::set_var("ADMIN_USERNAME", ADMIN_USERNAME);
    std::env::set_var("ADMIN_PASSWORD", ADMIN_PASSWORD);

    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1);

    let db = Database::connect(options)
        .await
        .expect("Failed to connect to in-memory database");
    setup_schema(&db).await;
    ensure_admin(&db).await;

    let shared_db = Arc::new(db);
    let gateway: Arc<dyn PaymentGateway> = Arc::new(InstantCapture);
    let app = create_api_router(shared_db, gateway);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server error");
    });

    format!("http://{}", addr)
}

pub async fn register_and_login(
    client: &reqwest::Client,
    base: &str,
    username: &str,
    email: &str,
    password: &str,
) -> String {
    let response = client
        .post(format!("{base}/register"))
        .json(&json!({
            "username": username,
            "email": email,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);

    let response = client
        .post(format!("{base}/login"))
        .json(&json!({
            "email": email,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send login request");
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse login response JSON");
    body["access_token"]
        .as_str()
        .expect("access_token not found in login response")
        .to_string()
}

pub async fn admin_token(client: &reqwest::Client, base: &str) -> String {
    let response = client
        .post(format!("{base}/admin/login"))
        .json(&json!({
            "username": ADMIN_USERNAME,
            "password": ADMIN_PASSWORD
        }))
        .send()
        .await
        .expect("Failed to send admin login request");
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse admin login response JSON");
    body["access"]
        .as_str()
        .expect("access token not found in admin login response")
        .to_string()
}

//Seeds a category + product through the admin console, returns their ids.
pub async fn seed_product(
    client: &reqwest::Client,
    base: &str,
    token: &str,
    name: &str,
    price: &str,
) -> (i64, i64) {
    let response = client
        .post(format!("{base}/admin/categories"))
        .bearer_auth(token)
        .json(&json!({ "name": format!("{name}-category") }))
        .send()
        .await
        .expect("Failed to create category");
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    let category = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse category response JSON");
    let category_id = category["id"].as_i64().expect("category id missing");

    let response = client
        .post(format!("{base}/admin/products"))
        .bearer_auth(token)
        .json(&json!({
            "name": name,
            "price": price,
            "category": category_id,
            "image": "https://example.com/image.png",
            "description": "test product"
        }))
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    let product = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse product response JSON");
    let product_id = product["id"].as_i64().expect("product id missing");

    (category_id, product_id)
}
