mod common;

use reqwest::StatusCode;
use serde_json::json;

use common::{admin_token, register_and_login, seed_product, spawn_app};

#[tokio::test]
async fn get_cart_before_any_activity_returns_404() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let token = register_and_login(&client, &base, "frank", "frank@example.com", "Passw0rd1").await;

    let response = client
        .get(format!("{base}/carts"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send get cart request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse get cart response JSON");
    assert_eq!(body["error"], "Cart not found.");
}

#[tokio::test]
async fn repeated_adds_merge_into_one_row() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let staff = admin_token(&client, &base).await;
    let (_, product_id) = seed_product(&client, &base, &staff, "bagel", "2.50").await;

    let token = register_and_login(&client, &base, "grace", "grace@example.com", "Hopper42").await;

    for quantity in [2, 3] {
        let response = client
            .post(format!("{base}/cart/items"))
            .bearer_auth(&token)
            .json(&json!({
                "product_id": product_id,
                "quantity": quantity
            }))
            .send()
            .await
            .expect("Failed to send add item request");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = client
        .get(format!("{base}/carts"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send get cart request");
    assert_eq!(response.status(), StatusCode::OK);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse get cart response JSON");
    let items = body["items"].as_array().expect("items not an array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 5);
    assert_eq!(items[0]["product"]["id"], product_id);
}

#[tokio::test]
async fn add_item_defaults_quantity_to_one() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let staff = admin_token(&client, &base).await;
    let (_, product_id) = seed_product(&client, &base, &staff, "pretzel", "1.25").await;

    let token = register_and_login(&client, &base, "heidi", "heidi@example.com", "Klum1234").await;

    let response = client
        .post(format!("{base}/cart/items"))
        .bearer_auth(&token)
        .json(&json!({ "product_id": product_id }))
        .send()
        .await
        .expect("Failed to send add item request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = client
        .get(format!("{base}/carts"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send get cart request")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse get cart response JSON");
    assert_eq!(body["items"][0]["quantity"], 1);
}

#[tokio::test]
async fn add_item_rejects_zero_quantity_and_unknown_product() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let staff = admin_token(&client, &base).await;
    let (_, product_id) = seed_product(&client, &base, &staff, "rye", "3.00").await;

    let token = register_and_login(&client, &base, "ivan4", "ivan@example.com", "Terrible9").await;

    let response = client
        .post(format!("{base}/cart/items"))
        .bearer_auth(&token)
        .json(&json!({
            "product_id": product_id,
            "quantity": 0
        }))
        .send()
        .await
        .expect("Failed to send add item request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(format!("{base}/cart/items"))
        .bearer_auth(&token)
        .json(&json!({
            "product_id": 9999,
            "quantity": 1
        }))
        .send()
        .await
        .expect("Failed to send add item request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn removing_an_item_requires_ownership() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let staff = admin_token(&client, &base).await;
    let (_, product_id) = seed_product(&client, &base, &staff, "brioche", "4.75").await;

    let owner = register_and_login(&client, &base, "judy7", "judy@example.com", "Garland8").await;
    let intruder =
        register_and_login(&client, &base, "mallory", "mallory@example.com", "Sneaky77").await;

    let response = client
        .post(format!("{base}/cart/items"))
        .bearer_auth(&owner)
        .json(&json!({
            "product_id": product_id,
            "quantity": 1
        }))
        .send()
        .await
        .expect("Failed to send add item request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let cart = client
        .get(format!("{base}/carts"))
        .bearer_auth(&owner)
        .send()
        .await
        .expect("Failed to send get cart request")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse get cart response JSON");
    let item_id = cart["items"][0]["id"].as_i64().expect("item id missing");

    //A bare id in someone else's hands must not delete the row.
    let response = client
        .delete(format!("{base}/cart/items/{item_id}"))
        .bearer_auth(&intruder)
        .send()
        .await
        .expect("Failed to send delete request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client
        .delete(format!("{base}/cart/items/{item_id}"))
        .bearer_auth(&owner)
        .send()
        .await
        .expect("Failed to send delete request");
    assert_eq!(response.status(), StatusCode::OK);

    let cart = client
        .get(format!("{base}/carts"))
        .bearer_auth(&owner)
        .send()
        .await
        .expect("Failed to send get cart request")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse get cart response JSON");
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn creating_a_second_cart_conflicts() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let token = register_and_login(&client, &base, "kevin", "kevin@example.com", "Home4lone").await;

    let response = client
        .post(format!("{base}/cart"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send create cart request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .post(format!("{base}/cart"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send create cart request");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
