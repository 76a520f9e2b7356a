use axum::{
    extract::Extension, http::StatusCode, response::IntoResponse, routing::post, Json, Router,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::entities::user::{self, Entity as UserEntity};
use crate::middleware::auth::{generate_token, TokenKind};

pub fn admin_auth_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/login", post(admin_login))
        .layer(Extension(db))
}

//Bad credentials and a valid non-staff account answer identically.
async fn admin_login(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<AdminLoginPayload>,
) -> impl IntoResponse {
    let result = UserEntity::find()
        .filter(user::Column::Username.eq(&payload.username))
        .one(&*db)
        .await;

    let model = match result {
        Ok(Some(model)) => model,
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "detail": "Invalid credentials or not admin"
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
    };

    if model.check_hash(&payload.password).is_err() || !model.is_staff {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "detail": "Invalid credentials or not admin"
            })),
        );
    }

    match generate_token(model.id, model.is_staff, TokenKind::Access) {
        Ok(token) => (
            StatusCode::OK,
            Json(json!({
                "access": token
            })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error"
            })),
        ),
    }
}

//Structs
#[derive(Deserialize, Clone, Debug)]
struct AdminLoginPayload {
    username: String,
    password: String,
}
