use axum::{
    extract::Extension, http::StatusCode, response::IntoResponse, routing::post, Json, Router,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::entities::contact_message;

pub fn contact_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/contact", post(submit_message))
        .layer(Extension(db))
}

//Open intake, nothing beyond the model constraints is enforced.
async fn submit_message(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<ContactPayload>,
) -> impl IntoResponse {
    let new_message = contact_message::ActiveModel {
        name: Set(payload.name),
        email: Set(payload.email),
        message: Set(payload.message),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    match new_message.insert(&*db).await {
        Ok(model) => (StatusCode::CREATED, Json(model)).into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error"
            })),
        )
            .into_response(),
    }
}

//Structs
#[derive(Deserialize, Clone, Debug)]
struct ContactPayload {
    name: String,
    email: String,
    message: String,
}
