use axum::{
    extract::Extension, http::StatusCode, response::IntoResponse, routing::post, Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::api::public::product::ProductResponse;
use crate::entities::cart::{self, Entity as CartEntity};
use crate::entities::cart_item::{self, Entity as CartItemEntity};
use crate::entities::category::Entity as CategoryEntity;
use crate::entities::order;
use crate::entities::order_item;
use crate::entities::product::Entity as ProductEntity;
use crate::entities::shipping_address;
use crate::middleware::auth::Claims;
use crate::payment::PaymentGateway;

pub fn checkout_router(db: Arc<DatabaseConnection>, gateway: Arc<dyn PaymentGateway>) -> Router {
    Router::new()
        .route("/checkout", post(checkout))
        .layer(Extension(db))
        .layer(Extension(gateway))
}

//The whole flow is one transaction: totals, the order row, its items, the
//shipping address and the cart cleanup either all land or none do.
async fn checkout(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(gateway): Extension<Arc<dyn PaymentGateway>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CheckoutPayload>,
) -> impl IntoResponse {
    debug!(
        "Called `checkout` for user {} with {} line(s)",
        claims.user_id,
        payload.cart_items.len()
    );

    if payload.cart_items.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Cart is empty"
            })),
        )
            .into_response();
    }

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            )
                .into_response();
        }
    };

    //Totals come from the catalog price at this moment, never from the
    //client payload.
    let mut total_price = Decimal::ZERO;
    let mut lines = Vec::with_capacity(payload.cart_items.len());

    for item in &payload.cart_items {
        if item.quantity < 1 {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Quantity should be greater than 0"
                })),
            )
                .into_response();
        }

        let (product, category) = match ProductEntity::find_by_id(item.product.id)
            .find_also_related(CategoryEntity)
            .one(&txn)
            .await
        {
            Ok(Some(row)) => row,
            Ok(None) => {
                let _ = txn.rollback().await;
                return (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "error": format!("No product with {} id was found.", item.product.id)
                    })),
                )
                    .into_response();
            }
            Err(_) => {
                let _ = txn.rollback().await;
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error."
                    })),
                )
                    .into_response();
            }
        };

        total_price += product.price * Decimal::from(item.quantity);
        lines.push((product, category, item.quantity));
    }

    let outcome = gateway.charge(total_price, &payload.payment_method);

    let new_order = order::ActiveModel {
        user_id: Set(Some(claims.user_id)),
        total_price: Set(total_price),
        payment_method: Set(payload.payment_method.clone()),
        is_paid: Set(outcome.is_paid()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let order_model = match new_order.insert(&txn).await {
        Ok(model) => model,
        Err(_) => {
            let _ = txn.rollback().await;
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            )
                .into_response();
        }
    };

    let mut items = Vec::with_capacity(lines.len());
    for (product, category, quantity) in lines {
        let new_item = order_item::ActiveModel {
            order_id: Set(order_model.id),
            product_id: Set(product.id),
            quantity: Set(quantity),
            price: Set(product.price),
            ..Default::default()
        };

        match new_item.insert(&txn).await {
            Ok(model) => items.push(OrderItemResponse {
                id: model.id,
                product: Some(ProductResponse::new(product, category)),
                quantity: model.quantity,
                price: model.price,
            }),
            Err(_) => {
                let _ = txn.rollback().await;
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                )
                    .into_response();
            }
        }
    }

    let shipping = &payload.shipping_details;
    let new_shipping = shipping_address::ActiveModel {
        order_id: Set(order_model.id),
        full_name: Set(shipping.full_name.clone()),
        address: Set(shipping.address.clone()),
        city: Set(shipping.city.clone()),
        state: Set(shipping.state.clone()),
        postal_code: Set(shipping.postal_code.clone()),
        country: Set(shipping.country.clone()),
        phone: Set(shipping.phone.clone()),
        payment_status: Set("Success".to_string()),
        order_status: Set("Pending".to_string()),
        ..Default::default()
    };

    let shipping_model = match new_shipping.insert(&txn).await {
        Ok(model) => model,
        Err(_) => {
            let _ = txn.rollback().await;
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            )
                .into_response();
        }
    };

    //The stored cart is emptied, the cart row itself stays behind.
    match CartEntity::find()
        .filter(cart::Column::UserId.eq(claims.user_id))
        .one(&txn)
        .await
    {
        Ok(Some(stored_cart)) => {
            if CartItemEntity::delete_many()
                .filter(cart_item::Column::CartId.eq(stored_cart.id))
                .exec(&txn)
                .await
                .is_err()
            {
                let _ = txn.rollback().await;
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                )
                    .into_response();
            }
        }
        Ok(None) => {}
        Err(_) => {
            let _ = txn.rollback().await;
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            )
                .into_response();
        }
    }

    if txn.commit().await.is_err() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error"
            })),
        )
            .into_response();
    }

    let response = OrderResponse {
        id: order_model.id,
        user: order_model.user_id,
        total_price: order_model.total_price,
        payment_method: order_model.payment_method,
        is_paid: order_model.is_paid,
        items,
        shipping_address: shipping_model,
        created_at: order_model.created_at,
    };

    (StatusCode::CREATED, Json(response)).into_response()
}

//Structs
#[derive(Deserialize, Clone, Debug)]
struct CheckoutPayload {
    #[serde(default)]
    cart_items: Vec<CheckoutLine>,
    #[serde(default)]
    shipping_details: ShippingDetails,
    #[serde(default = "default_payment_method")]
    payment_method: String,
}

fn default_payment_method() -> String {
    "card".to_string()
}

#[derive(Deserialize, Clone, Debug)]
struct CheckoutLine {
    product: ProductRef,
    quantity: i32,
}

#[derive(Deserialize, Clone, Debug)]
struct ProductRef {
    id: i32,
}

//Fields the client leaves out default to empty strings.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
struct ShippingDetails {
    full_name: String,
    address: String,
    city: String,
    state: String,
    postal_code: String,
    country: String,
    phone: String,
}

#[derive(Serialize)]
struct OrderResponse {
    id: i32,
    user: Option<i32>,
    total_price: Decimal,
    payment_method: String,
    is_paid: bool,
    items: Vec<OrderItemResponse>,
    shipping_address: shipping_address::Model,
    created_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct OrderItemResponse {
    id: i32,
    product: Option<ProductResponse>,
    quantity: i32,
    price: Decimal,
}
