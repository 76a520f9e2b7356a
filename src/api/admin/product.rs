use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::entities::category::{self, Entity as CategoryEntity};
use crate::entities::product::{self, Entity as ProductEntity};

//ROUTERS
pub fn admin_product_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/products", get(get_products).post(create_product))
        .route(
            "/products/:id",
            get(get_product).patch(patch_product).delete(delete_product),
        )
        .layer(Extension(db))
}

//ROUTES
async fn get_products(Extension(db): Extension<Arc<DatabaseConnection>>) -> impl IntoResponse {
    match ProductEntity::find()
        .find_also_related(CategoryEntity)
        .all(&*db)
        .await
    {
        Ok(rows) => {
            let response: Vec<AdminProductResponse> = rows
                .into_iter()
                .map(|(prod, cat)| AdminProductResponse::new(prod, cat))
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

async fn get_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match ProductEntity::find_by_id(id)
        .find_also_related(CategoryEntity)
        .one(&*db)
        .await
    {
        Ok(Some((prod, cat))) => {
            (StatusCode::OK, Json(AdminProductResponse::new(prod, cat))).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("No product with {} id was found.", id)
            })),
        )
            .into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error."
            })),
        )
            .into_response(),
    }
}

async fn create_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateProduct>,
) -> impl IntoResponse {
    debug!("Called `create_product` with payload: {:?}", payload);

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

    //A product cannot point at a category that does not exist.
    let cat = match CategoryEntity::find_by_id(payload.category).one(&txn).await {
        Ok(Some(cat)) => cat,
        Ok(None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": format!("No category with {} id was found", payload.category)
                })),
            )
                .into_response();
        }
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

    let new_product = product::ActiveModel {
        category_id: Set(payload.category),
        name: Set(payload.name),
        description: Set(payload.description),
        price: Set(payload.price),
        image: Set(payload.image),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    match new_product.insert(&txn).await {
        Ok(model) => match txn.commit().await {
            Ok(_) => (
                StatusCode::CREATED,
                Json(AdminProductResponse::new(model, Some(cat))),
            )
                .into_response(),
            Err(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            )
                .into_response(),
        },
        Err(err) => {
            debug!("Product insert failed: {:?}", err);
            let _ = txn.rollback().await;
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Failed to create this resource"
                })),
            )
                .into_response()
        }
    }
}

async fn patch_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchProduct>,
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

    match ProductEntity::find_by_id(id).one(&txn).await {
        Ok(Some(prod)) => {
            let mut prod: product::ActiveModel = prod.into();

            if let Some(category_id) = payload.category {
                match CategoryEntity::find_by_id(category_id).one(&txn).await {
                    Ok(Some(_)) => prod.category_id = Set(category_id),
                    Ok(None) => {
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(json!({
                                "error": format!("No category with {} id was found", category_id)
                            })),
                        );
                    }
                    Err(_) => {
                        return (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({
                                "error": "Internal server error"
                            })),
                        );
                    }
                }
            }

            if let Some(name) = payload.name {
                prod.name = Set(name);
            }
            if let Some(description) = payload.description {
                prod.description = Set(description);
            }
            if let Some(price) = payload.price {
                prod.price = Set(price);
            }
            if let Some(image) = payload.image {
                prod.image = Set(image);
            }

            match prod.update(&txn).await {
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
                "error": format!("No product with {} id was found.", id)
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

async fn delete_product(
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

    match ProductEntity::find_by_id(id).one(&txn).await {
        Ok(Some(prod)) => {
            let prod: product::ActiveModel = prod.into();
            match prod.delete(&txn).await {
                Ok(_) => {
                    let _ = txn.commit().await;
                    (
                        StatusCode::OK,
                        Json(json!({
                            "message": "Resource deleted successfully."
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
                "error": format!("No product with {} id was found.", id)
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

//Structs
#[derive(Deserialize, Clone, Debug)]
struct CreateProduct {
    name: String,
    price: Decimal,
    category: i32,
    image: String,
    description: String,
}

#[derive(Deserialize)]
struct PatchProduct {
    name: Option<String>,
    price: Option<Decimal>,
    category: Option<i32>,
    image: Option<String>,
    description: Option<String>,
}

#[derive(Serialize)]
struct AdminProductResponse {
    id: i32,
    name: String,
    price: Decimal,
    category: i32,
    image: String,
    description: String,
    category_name: Option<String>,
}

impl AdminProductResponse {
    fn new(value: product::Model, cat: Option<category::Model>) -> AdminProductResponse {
        AdminProductResponse {
            id: value.id,
            name: value.name,
            price: value.price,
            category: value.category_id,
            image: value.image,
            description: value.description,
            category_name: cat.map(|c| c.name),
        }
    }
}
