use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::entities::cart::{self, Entity as CartEntity};
use crate::entities::cart_item::{self, Entity as CartItemEntity};
use crate::entities::product::{self, Entity as ProductEntity};
use crate::middleware::auth::Claims;

//ROUTERS
pub fn cart_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/cart", get(list_carts).post(create_cart))
        .route("/carts", get(get_cart))
        .route("/cart/items", post(add_item))
        .route("/cart/items/:id", delete(remove_item))
        .layer(Extension(db))
}

//ROUTES
async fn list_carts(Extension(db): Extension<Arc<DatabaseConnection>>) -> impl IntoResponse {
    match CartEntity::find()
        .find_with_related(CartItemEntity)
        .all(&*db)
        .await
    {
        Ok(rows) => {
            let response: Vec<CartSummary> = rows
                .into_iter()
                .map(|(cart, items)| CartSummary {
                    id: cart.id,
                    items: items.into_iter().map(CartItemSummary::new).collect(),
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

async fn create_cart(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    let new_cart = cart::ActiveModel {
        user_id: Set(claims.user_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    match new_cart.insert(&*db).await {
        Ok(model) => (
            StatusCode::CREATED,
            Json(json!({
                "id": model.id,
                "items": []
            })),
        )
            .into_response(),
        Err(err) => {
            debug!("Cart insert failed: {:?}", err);
            (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "Cart already exists"
                })),
            )
                .into_response()
        }
    }
}

async fn get_cart(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    let cart = match CartEntity::find()
        .filter(cart::Column::UserId.eq(claims.user_id))
        .one(&*db)
        .await
    {
        Ok(Some(cart)) => cart,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "Cart not found."
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

    match CartItemEntity::find()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .find_also_related(ProductEntity)
        .all(&*db)
        .await
    {
        Ok(rows) => {
            let items: Vec<CartItemResponse> = rows
                .into_iter()
                .map(|(item, prod)| CartItemResponse::new(item, prod))
                .collect();
            (
                StatusCode::OK,
                Json(json!({
                    "id": cart.id,
                    "items": items
                })),
            )
                .into_response()
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

async fn add_item(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AddItemPayload>,
) -> impl IntoResponse {
    debug!("Called `add_item` with payload: {:?}", payload);

    if payload.quantity < 1 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Quantity should be greater than 0"
            })),
        );
    }

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

    match ProductEntity::find_by_id(payload.product_id).one(&txn).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": format!("No product with {} id was found", payload.product_id)
                })),
            );
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error."
                })),
            );
        }
    }

    let cart = match get_or_create_cart(&txn, claims.user_id).await {
        Ok(cart) => cart,
        Err(_) => {
            let _ = txn.rollback().await;
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            );
        }
    };

    //Repeat adds merge into the existing row instead of inserting a sibling.
    let result = match CartItemEntity::find()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .filter(cart_item::Column::ProductId.eq(payload.product_id))
        .one(&txn)
        .await
    {
        Ok(Some(entry)) => {
            let quantity = entry.quantity + payload.quantity;
            let mut entry: cart_item::ActiveModel = entry.into();
            entry.quantity = Set(quantity);
            entry.update(&txn).await.map(|_| ())
        }
        Ok(None) => {
            let new_entry = cart_item::ActiveModel {
                cart_id: Set(cart.id),
                product_id: Set(payload.product_id),
                quantity: Set(payload.quantity),
                ..Default::default()
            };
            new_entry.insert(&txn).await.map(|_| ())
        }
        Err(_) => {
            let _ = txn.rollback().await;
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error."
                })),
            );
        }
    };

    match result {
        Ok(()) => match txn.commit().await {
            Ok(_) => (
                StatusCode::CREATED,
                Json(json!({
                    "message": "Added successfully"
                })),
            ),
            Err(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            ),
        },
        Err(_) => {
            let _ = txn.rollback().await;
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            )
        }
    }
}

async fn remove_item(
    Path(id): Path<i32>,
    Extension(claims): Extension<Claims>,
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

    let cart = match CartEntity::find()
        .filter(cart::Column::UserId.eq(claims.user_id))
        .one(&txn)
        .await
    {
        Ok(Some(cart)) => cart,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": format!("No related entry with {} id was found.", id)
                })),
            );
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error."
                })),
            );
        }
    };

    //The item must sit in the caller's own cart, a bare id is not enough.
    match CartItemEntity::find_by_id(id)
        .filter(cart_item::Column::CartId.eq(cart.id))
        .one(&txn)
        .await
    {
        Ok(Some(entry)) => {
            let entry: cart_item::ActiveModel = entry.into();
            match entry.delete(&txn).await {
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
                "error": format!("No related entry with {} id was found.", id)
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

pub async fn get_or_create_cart(
    txn: &DatabaseTransaction,
    user_id: i32,
) -> Result<cart::Model, DbErr> {
    if let Some(cart) = CartEntity::find()
        .filter(cart::Column::UserId.eq(user_id))
        .one(txn)
        .await?
    {
        return Ok(cart);
    }

    let new_cart = cart::ActiveModel {
        user_id: Set(user_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    new_cart.insert(txn).await
}

//Structs
#[derive(Deserialize, Debug)]
struct AddItemPayload {
    product_id: i32,
    #[serde(default = "default_quantity")]
    quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Serialize)]
struct CartSummary {
    id: i32,
    items: Vec<CartItemSummary>,
}

#[derive(Serialize)]
struct CartItemSummary {
    id: i32,
    product_id: i32,
    quantity: i32,
}

impl CartItemSummary {
    fn new(value: cart_item::Model) -> CartItemSummary {
        CartItemSummary {
            id: value.id,
            product_id: value.product_id,
            quantity: value.quantity,
        }
    }
}

#[derive(Serialize)]
struct CartItemResponse {
    id: i32,
    product: Option<CartProductResponse>,
    quantity: i32,
}

impl CartItemResponse {
    fn new(value: cart_item::Model, prod: Option<product::Model>) -> CartItemResponse {
        CartItemResponse {
            id: value.id,
            product: prod.map(CartProductResponse::new),
            quantity: value.quantity,
        }
    }
}

#[derive(Serialize)]
struct CartProductResponse {
    id: i32,
    category_id: i32,
    name: String,
    description: String,
    price: Decimal,
    image: String,
}

impl CartProductResponse {
    fn new(value: product::Model) -> CartProductResponse {
        CartProductResponse {
            id: value.id,
            category_id: value.category_id,
            name: value.name,
            description: value.description,
            price: value.price,
            image: value.image,
        }
    }
}
