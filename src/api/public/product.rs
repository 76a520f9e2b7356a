use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::entities::category::{self, Entity as CategoryEntity};
use crate::entities::product::{self, Entity as ProductEntity};

pub fn product_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/product", get(get_products))
        .route("/product/:id", get(get_product))
        .layer(Extension(db))
}

async fn get_products(Extension(db): Extension<Arc<DatabaseConnection>>) -> impl IntoResponse {
    match ProductEntity::find()
        .find_also_related(CategoryEntity)
        .all(&*db)
        .await
    {
        Ok(rows) => {
            let response: Vec<ProductResponse> = rows
                .into_iter()
                .map(|(prod, cat)| ProductResponse::new(prod, cat))
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
    let result = ProductEntity::find_by_id(id)
        .find_also_related(CategoryEntity)
        .one(&*db)
        .await;

    match result {
        Ok(Some((prod, cat))) => {
            (StatusCode::OK, Json(ProductResponse::new(prod, cat))).into_response()
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

//Structs
#[derive(Serialize)]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
}

impl CategoryResponse {
    pub fn new(value: category::Model) -> CategoryResponse {
        CategoryResponse {
            id: value.id,
            name: value.name,
        }
    }
}

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: i32,
    pub category: Option<CategoryResponse>,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

impl ProductResponse {
    pub fn new(value: product::Model, cat: Option<category::Model>) -> ProductResponse {
        ProductResponse {
            id: value.id,
            category: cat.map(CategoryResponse::new),
            name: value.name,
            description: value.description,
            price: value.price,
            image: value.image,
            created_at: value.created_at,
        }
    }
}
