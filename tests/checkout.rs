mod common;

use reqwest::StatusCode;
use serde_json::json;

use common::{admin_token, register_and_login, seed_product, spawn_app};

#[tokio::test]
async fn checkout_with_no_lines_returns_400_and_creates_nothing() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let token = register_and_login(&client, &base, "laura", "laura@example.com", "Palmer11").await;

    let response = client
        .post(format!("{base}/checkout"))
        .bearer_auth(&token)
        .json(&json!({
            "cart_items": [],
            "shipping_details": {},
            "payment_method": "card"
        }))
        .send()
        .await
        .expect("Failed to send checkout request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse checkout response JSON");
    assert_eq!(body["error"], "Cart is empty");

    let staff = admin_token(&client, &base).await;
    let orders = client
        .get(format!("{base}/admin/orders"))
        .bearer_auth(&staff)
        .send()
        .await
        .expect("Failed to send orders request")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse orders response JSON");
    assert_eq!(orders.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn checkout_totals_and_snapshots_current_prices() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let staff = admin_token(&client, &base).await;
    let (_, product_id) = seed_product(&client, &base, &staff, "sourdough", "9.99").await;

    let token = register_and_login(&client, &base, "nancy", "nancy@example.com", "Drew1930").await;

    let response = client
        .post(format!("{base}/checkout"))
        .bearer_auth(&token)
        .json(&json!({
            "cart_items": [{ "product": { "id": product_id }, "quantity": 2 }],
            "shipping_details": {
                "fullName": "Nancy Drew",
                "address": "1 River Heights",
                "city": "Chicago",
                "state": "IL",
                "postalCode": "60601",
                "country": "USA",
                "phone": "555-0100"
            },
            "payment_method": "card"
        }))
        .send()
        .await
        .expect("Failed to send checkout request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let order = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse checkout response JSON");
    assert_eq!(order["total_price"], "19.98");
    assert_eq!(order["is_paid"], true);
    assert_eq!(order["payment_method"], "card");

    let items = order["items"].as_array().expect("items not an array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 2);
    assert_eq!(items[0]["price"], "9.99");
    assert_eq!(items[0]["product"]["id"], product_id);

    assert_eq!(order["shipping_address"]["full_name"], "Nancy Drew");
    assert_eq!(order["shipping_address"]["postal_code"], "60601");
    assert_eq!(order["shipping_address"]["payment_status"], "Success");
    assert_eq!(order["shipping_address"]["order_status"], "Pending");

    //A later catalog price change must not reach the stored snapshot.
    let order_id = order["id"].as_i64().expect("order id missing");
    let response = client
        .patch(format!("{base}/admin/products/{product_id}"))
        .bearer_auth(&staff)
        .json(&json!({ "price": "14.99" }))
        .send()
        .await
        .expect("Failed to send product patch request");
    assert_eq!(response.status(), StatusCode::OK);

    let detail = client
        .get(format!("{base}/admin/orders/{order_id}"))
        .bearer_auth(&staff)
        .send()
        .await
        .expect("Failed to send order detail request")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse order detail response JSON");
    assert_eq!(detail["items"][0]["price"], "9.99");
    assert_eq!(detail["total_price"], "19.98");
}

#[tokio::test]
async fn checkout_empties_the_stored_cart_but_keeps_it() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let staff = admin_token(&client, &base).await;
    let (_, product_id) = seed_product(&client, &base, &staff, "croissant", "3.20").await;

    let token = register_and_login(&client, &base, "oscar", "oscar@example.com", "Grouch55").await;

    let response = client
        .post(format!("{base}/cart/items"))
        .bearer_auth(&token)
        .json(&json!({
            "product_id": product_id,
            "quantity": 4
        }))
        .send()
        .await
        .expect("Failed to send add item request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .post(format!("{base}/checkout"))
        .bearer_auth(&token)
        .json(&json!({
            "cart_items": [{ "product": { "id": product_id }, "quantity": 4 }],
            "shipping_details": { "fullName": "Oscar" },
            "payment_method": "card"
        }))
        .send()
        .await
        .expect("Failed to send checkout request");
    assert_eq!(response.status(), StatusCode::CREATED);

    //The cart row survives, only its items are gone.
    let response = client
        .get(format!("{base}/carts"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send get cart request");
    assert_eq!(response.status(), StatusCode::OK);

    let cart = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse get cart response JSON");
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn missing_shipping_fields_default_to_empty_strings() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let staff = admin_token(&client, &base).await;
    let (_, product_id) = seed_product(&client, &base, &staff, "baguette", "2.10").await;

    let token = register_and_login(&client, &base, "peggy", "peggy@example.com", "Carter45").await;

    let response = client
        .post(format!("{base}/checkout"))
        .bearer_auth(&token)
        .json(&json!({
            "cart_items": [{ "product": { "id": product_id }, "quantity": 1 }],
            "shipping_details": { "fullName": "Peggy Carter" }
        }))
        .send()
        .await
        .expect("Failed to send checkout request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let order = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse checkout response JSON");
    assert_eq!(order["payment_method"], "card");
    assert_eq!(order["shipping_address"]["full_name"], "Peggy Carter");
    assert_eq!(order["shipping_address"]["city"], "");
    assert_eq!(order["shipping_address"]["country"], "");
    assert_eq!(order["shipping_address"]["phone"], "");
}

#[tokio::test]
async fn checkout_fails_whole_request_on_unknown_product() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let staff = admin_token(&client, &base).await;
    let (_, product_id) = seed_product(&client, &base, &staff, "ciabatta", "5.40").await;

    let token = register_and_login(&client, &base, "quinn", "quinn@example.com", "Harley23").await;

    let response = client
        .post(format!("{base}/checkout"))
        .bearer_auth(&token)
        .json(&json!({
            "cart_items": [
                { "product": { "id": product_id }, "quantity": 1 },
                { "product": { "id": 9999 }, "quantity": 1 }
            ],
            "shipping_details": {},
            "payment_method": "card"
        }))
        .send()
        .await
        .expect("Failed to send checkout request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    //Nothing may survive the rollback, not even the valid first line.
    let orders = client
        .get(format!("{base}/admin/orders"))
        .bearer_auth(&staff)
        .send()
        .await
        .expect("Failed to send orders request")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse orders response JSON");
    assert_eq!(orders.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn checkout_requires_authentication() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/checkout"))
        .json(&json!({
            "cart_items": [{ "product": { "id": 1 }, "quantity": 1 }],
            "shipping_details": {},
            "payment_method": "card"
        }))
        .send()
        .await
        .expect("Failed to send checkout request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
