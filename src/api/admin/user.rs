use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::entities::user::{self, Entity as UserEntity};

//ROUTERS
pub fn admin_user_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/users", get(get_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).patch(patch_user).delete(delete_user),
        )
        .layer(Extension(db))
}

//ROUTES
async fn get_users(Extension(db): Extension<Arc<DatabaseConnection>>) -> impl IntoResponse {
    match UserEntity::find().all(&*db).await {
        Ok(users) => {
            let response: Vec<AdminUserResponse> =
                users.into_iter().map(AdminUserResponse::new).collect();
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

async fn get_user(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match UserEntity::find_by_id(id).one(&*db).await {
        Ok(Some(model)) => (StatusCode::OK, Json(AdminUserResponse::new(model))).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("No user with {} id was found.", id)
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

async fn create_user(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<AdminCreateUser>,
) -> impl IntoResponse {
    debug!("Called `create_user` for username {:?}", payload.username);

    let password = match user::hash_password(&payload.password) {
        Ok(password) => password,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "An internal server error occured"
                })),
            )
                .into_response();
        }
    };

    let new_user = user::ActiveModel {
        username: Set(payload.username),
        email: Set(payload.email),
        password: Set(password),
        is_staff: Set(payload.is_staff.unwrap_or(false)),
        ..Default::default()
    };

    match new_user.insert(&*db).await {
        Ok(model) => (StatusCode::CREATED, Json(AdminUserResponse::new(model))).into_response(),
        Err(err) => {
            debug!("User insert failed: {:?}", err);
            (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "A user with these credentials already exists"
                })),
            )
                .into_response()
        }
    }
}

async fn patch_user(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchUser>,
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

    match UserEntity::find_by_id(id).one(&txn).await {
        Ok(Some(model)) => {
            let mut model: user::ActiveModel = model.into();

            if let Some(username) = payload.username {
                if !username.is_empty() {
                    model.username = Set(username);
                }
            }

            if let Some(email) = payload.email {
                if !email.is_empty() {
                    model.email = Set(email);
                }
            }

            if let Some(password) = payload.password {
                if !password.is_empty() {
                    let password = match user::hash_password(&password) {
                        Ok(password) => password,
                        Err(_) => {
                            return (
                                StatusCode::INTERNAL_SERVER_ERROR,
                                Json(json!({
                                    "error": "An internal server error occured"
                                })),
                            );
                        }
                    };
                    model.password = Set(password);
                }
            }

            if let Some(is_staff) = payload.is_staff {
                model.is_staff = Set(is_staff);
            }

            let result: Result<(), DbErr> = model.update(&txn).await.map(|_| ());

            match result {
                Ok(()) => match txn.commit().await {
                    Ok(_) => (
                        StatusCode::OK,
                        Json(json!({
                            "message": "Resource patched successfully"
                        })),
                    ),
                    Err(_) => (
                        StatusCode::CONFLICT,
                        Json(json!({
                            "error": "Username unique constraint failed"
                        })),
                    ),
                },
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
                "error": format!("No user with {} id was found.", id)
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

async fn delete_user(
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

    match UserEntity::find_by_id(id).one(&txn).await {
        Ok(Some(model)) => {
            let model: user::ActiveModel = model.into();
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
                "error": format!("No user with {} id was found.", id)
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
struct AdminCreateUser {
    username: String,
    email: String,
    password: String,
    is_staff: Option<bool>,
}

#[derive(Deserialize)]
struct PatchUser {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    is_staff: Option<bool>,
}

//Password material never leaves the server.
#[derive(Serialize)]
struct AdminUserResponse {
    id: i32,
    username: String,
    email: String,
    is_staff: bool,
}

impl AdminUserResponse {
    fn new(value: user::Model) -> AdminUserResponse {
        AdminUserResponse {
            id: value.id,
            username: value.username,
            email: value.email,
            is_staff: value.is_staff,
        }
    }
}
