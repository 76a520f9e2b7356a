mod common;

use reqwest::StatusCode;
use serde_json::json;

use common::{admin_token, seed_product, spawn_app};

#[tokio::test]
async fn public_catalog_lists_products_with_their_category() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let staff = admin_token(&client, &base).await;
    let (category_id, product_id) = seed_product(&client, &base, &staff, "donut", "0.99").await;

    let response = client
        .get(format!("{base}/product"))
        .send()
        .await
        .expect("Failed to send product list request");
    assert_eq!(response.status(), StatusCode::OK);

    let products = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse product list JSON");
    let products = products.as_array().expect("products not an array");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["id"], product_id);
    assert_eq!(products[0]["price"], "0.99");
    assert_eq!(products[0]["category"]["id"], category_id);
    assert_eq!(products[0]["category"]["name"], "donut-category");

    let response = client
        .get(format!("{base}/product/{product_id}"))
        .send()
        .await
        .expect("Failed to send product request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(format!("{base}/product/9999"))
        .send()
        .await
        .expect("Failed to send product request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn public_category_listing_is_open() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let staff = admin_token(&client, &base).await;
    seed_product(&client, &base, &staff, "scone", "2.20").await;

    let response = client
        .get(format!("{base}/category"))
        .send()
        .await
        .expect("Failed to send category list request");
    assert_eq!(response.status(), StatusCode::OK);

    let categories = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse category list JSON");
    assert_eq!(categories.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn admin_product_responses_carry_category_name() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let staff = admin_token(&client, &base).await;
    let (_, product_id) = seed_product(&client, &base, &staff, "tart", "7.30").await;

    let response = client
        .get(format!("{base}/admin/products/{product_id}"))
        .bearer_auth(&staff)
        .send()
        .await
        .expect("Failed to send admin product request");
    assert_eq!(response.status(), StatusCode::OK);

    let product = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse admin product JSON");
    assert_eq!(product["category_name"], "tart-category");
}

#[tokio::test]
async fn product_creation_rejects_unknown_category() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let staff = admin_token(&client, &base).await;

    let response = client
        .post(format!("{base}/admin/products"))
        .bearer_auth(&staff)
        .json(&json!({
            "name": "orphan",
            "price": "1.00",
            "category": 9999,
            "image": "https://example.com/orphan.png",
            "description": "no category"
        }))
        .send()
        .await
        .expect("Failed to send product create request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
