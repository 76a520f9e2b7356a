use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::entities::order::{self, Entity as OrderEntity};
use crate::entities::order_item::{self, Entity as OrderItemEntity};
use crate::entities::product::Entity as ProductEntity;
use crate::entities::shipping_address::{self, Entity as ShippingEntity};
use crate::entities::user::Entity as UserEntity;

//ROUTERS
pub fn admin_order_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/orders", get(get_orders).post(create_order))
        .route(
            "/orders/:id",
            get(get_order).patch(patch_order).delete(delete_order),
        )
        .route("/orders/:id/update_status", patch(update_status))
        .layer(Extension(db))
}

//ROUTES
async fn get_orders(Extension(db): Extension<Arc<DatabaseConnection>>) -> impl IntoResponse {
    match OrderEntity::find()
        .order_by_desc(order::Column::CreatedAt)
        .find_also_related(UserEntity)
        .all(&*db)
        .await
    {
        Ok(rows) => {
            let response: Vec<OrderSummary> = rows
                .into_iter()
                .map(|(order, user)| OrderSummary {
                    id: order.id,
                    user_name: user.map(|u| u.username),
                    total_price: order.total_price,
                    payment_method: order.payment_method,
                    is_paid: order.is_paid,
                    created_at: order.created_at,
                })
                .collect();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error."
            })),
        )
            .into_response(),
    }
}

async fn get_order(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let (order_model, user) = match OrderEntity::find_by_id(id)
        .find_also_related(UserEntity)
        .one(&*db)
        .await
    {
        Ok(Some(row)) => row,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": format!("No order with {} id was found.", id)
                })),
            )
                .into_response();
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error."
                })),
            )
                .into_response();
        }
    };

    let items = match OrderItemEntity::find()
        .filter(order_item::Column::OrderId.eq(order_model.id))
        .find_also_related(ProductEntity)
        .all(&*db)
        .await
    {
        Ok(rows) => rows
            .into_iter()
            .map(|(item, prod)| OrderItemDetail {
                id: item.id,
                product_name: prod.map(|p| p.name),
                quantity: item.quantity,
                price: item.price,
            })
            .collect::<Vec<OrderItemDetail>>(),
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error."
                })),
            )
                .into_response();
        }
    };

    let shipping = match ShippingEntity::find()
        .filter(shipping_address::Column::OrderId.eq(order_model.id))
        .one(&*db)
        .await
    {
        Ok(shipping) => shipping,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error."
                })),
            )
                .into_response();
        }
    };

    let response = OrderDetail {
        id: order_model.id,
        user_name: user.map(|u| u.username),
        total_price: order_model.total_price,
        payment_method: order_model.payment_method,
        is_paid: order_model.is_paid,
        created_at: order_model.created_at,
        items,
        shipping_address: shipping,
    };

    (StatusCode::OK, Json(response)).into_response()
}

async fn create_order(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateOrder>,
) -> impl IntoResponse {
    let new_order = order::ActiveModel {
        user_id: Set(payload.user_id),
        total_price: Set(payload.total_price),
        payment_method: Set(payload.payment_method),
        is_paid: Set(payload.is_paid.unwrap_or(false)),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    match new_order.insert(&*db).await {
        Ok(model) => (StatusCode::CREATED, Json(model)).into_response(),
        Err(_) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Failed to create this resource"
            })),
        )
            .into_response(),
    }
}

async fn patch_order(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchOrder>,
) -> impl IntoResponse {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            );
        }
    };

    match OrderEntity::find_by_id(id).one(&txn).await {
        Ok(Some(model)) => {
            let mut model: order::ActiveModel = model.into();

            if let Some(payment_method) = payload.payment_method {
                model.payment_method = Set(payment_method);
            }
            if let Some(is_paid) = payload.is_paid {
                model.is_paid = Set(is_paid);
            }
            if let Some(total_price) = payload.total_price {
                model.total_price = Set(total_price);
            }

            match model.update(&txn).await {
                Ok(_) => {
                    let _ = txn.commit().await;
                    (
                        StatusCode::OK,
                        Json(json!({
                            "message": "Resource patched successfully"
                        })),
                    )
                }
                Err(_) => {
                    let _ = txn.rollback().await;
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({
                            "error": "Failed to patch this resource"
                        })),
                    )
                }
            }
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("No order with {} id was found.", id)
            })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error."
            })),
        ),
    }
}

async fn delete_order(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            );
        }
    };

    match OrderEntity::find_by_id(id).one(&txn).await {
        Ok(Some(model)) => {
            let model: order::ActiveModel = model.into();
            match model.delete(&txn).await {
                Ok(_) => {
                    let _ = txn.commit().await;
                    (
                        StatusCode::OK,
                        Json(json!({
                            "message": "Resource deleted successfully"
                        })),
                    )
                }
                Err(_) => {
                    let _ = txn.rollback().await;
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({
                            "error": "Failed to delete this resource"
                        })),
                    )
                }
            }
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("No order with {} id was found.", id)
            })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error."
            })),
        ),
    }
}

//Partially updates the shipping/payment/order-status fields; everything the
//payload leaves out keeps its stored value.
async fn update_status(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<UpdateStatusPayload>,
) -> impl IntoResponse {
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

    match OrderEntity::find_by_id(id).one(&txn).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": format!("No order with {} id was found.", id)
                })),
            )
                .into_response();
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error."
                })),
            )
                .into_response();
        }
    }

    let shipping = match ShippingEntity::find()
        .filter(shipping_address::Column::OrderId.eq(id))
        .one(&txn)
        .await
    {
        Ok(Some(shipping)) => shipping,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "No shipping address found"
                })),
            )
                .into_response();
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error."
                })),
            )
                .into_response();
        }
    };

    let mut shipping: shipping_address::ActiveModel = shipping.into();

    if let Some(full_name) = payload.full_name {
        shipping.full_name = Set(full_name);
    }
    if let Some(address) = payload.address {
        shipping.address = Set(address);
    }
    if let Some(city) = payload.city {
        shipping.city = Set(city);
    }
    if let Some(state) = payload.state {
        shipping.state = Set(state);
    }
    if let Some(postal_code) = payload.postal_code {
        shipping.postal_code = Set(postal_code);
    }
    if let Some(country) = payload.country {
        shipping.country = Set(country);
    }
    if let Some(phone) = payload.phone {
        shipping.phone = Set(phone);
    }
    if let Some(payment_status) = payload.payment_status {
        shipping.payment_status = Set(payment_status);
    }
    if let Some(order_status) = payload.order_status {
        shipping.order_status = Set(order_status);
    }

    match shipping.update(&txn).await {
        Ok(model) => {
            let _ = txn.commit().await;
            (StatusCode::OK, Json(model)).into_response()
        }
        Err(_) => {
            let _ = txn.rollback().await;
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Failed to patch this resource"
                })),
            )
                .into_response()
        }
    }
}

//Structs
#[derive(Deserialize, Clone, Debug)]
struct CreateOrder {
    user_id: Option<i32>,
    total_price: Decimal,
    payment_method: String,
    is_paid: Option<bool>,
}

#[derive(Deserialize)]
struct PatchOrder {
    payment_method: Option<String>,
    is_paid: Option<bool>,
    total_price: Option<Decimal>,
}

#[derive(Deserialize)]
struct UpdateStatusPayload {
    full_name: Option<String>,
    address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    postal_code: Option<String>,
    country: Option<String>,
    phone: Option<String>,
    payment_status: Option<String>,
    order_status: Option<String>,
}

#[derive(Serialize)]
struct OrderSummary {
    id: i32,
    user_name: Option<String>,
    total_price: Decimal,
    payment_method: String,
    is_paid: bool,
    created_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct OrderDetail {
    id: i32,
    user_name: Option<String>,
    total_price: Decimal,
    payment_method: String,
    is_paid: bool,
    created_at: DateTime<Utc>,
    items: Vec<OrderItemDetail>,
    shipping_address: Option<shipping_address::Model>,
}

#[derive(Serialize)]
struct OrderItemDetail {
    id: i32,
    product_name: Option<String>,
    quantity: i32,
    price: Decimal,
}
