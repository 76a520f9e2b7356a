mod common;

use reqwest::StatusCode;
use serde_json::json;

use common::spawn_app;

#[tokio::test]
async fn contact_intake_is_open_and_echoes_the_message() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/contact"))
        .json(&json!({
            "name": "Vera",
            "email": "vera@example.com",
            "message": "Where is my order?"
        }))
        .send()
        .await
        .expect("Failed to send contact request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse contact response JSON");
    assert!(body["id"].is_i64());
    assert_eq!(body["name"], "Vera");
    assert_eq!(body["email"], "vera@example.com");
    assert_eq!(body["message"], "Where is my order?");
    assert!(body["created_at"].is_string());
}
