use axum::{
    extract::Extension, http::StatusCode, response::IntoResponse, routing::post, Json, Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::entities::user::{self, Entity as UserEntity};
use crate::middleware::auth::issue_token_pair;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex"));
static LETTER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]").expect("letter regex"));
static DIGIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]").expect("digit regex"));

//ROUTERS
pub fn auth_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .layer(Extension(db))
}

//ROUTES
async fn register(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<RegisterPayload>,
) -> impl IntoResponse {
    debug!("Called `register` for username {:?}", payload.username);

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

    let mut details: BTreeMap<&str, Vec<String>> = BTreeMap::new();

    if !EMAIL_RE.is_match(&payload.email) {
        details
            .entry("email")
            .or_default()
            .push("Enter a valid email address.".to_string());
    } else {
        match UserEntity::find()
            .filter(user::Column::Email.eq(&payload.email))
            .one(&txn)
            .await
        {
            Ok(Some(_)) => {
                details
                    .entry("email")
                    .or_default()
                    .push("A user with this email already exists.".to_string());
            }
            Ok(None) => {}
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

    if payload.username.chars().count() < 4 {
        details
            .entry("username")
            .or_default()
            .push("Username must contain at least 4 characters.".to_string());
    } else {
        match UserEntity::find()
            .filter(user::Column::Username.eq(&payload.username))
            .one(&txn)
            .await
        {
            Ok(Some(_)) => {
                details
                    .entry("username")
                    .or_default()
                    .push("A user with that username already exists.".to_string());
            }
            Ok(None) => {}
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

    if payload.password.chars().count() < 8 {
        details
            .entry("password")
            .or_default()
            .push("Password must be at least 8 characters long.".to_string());
    }
    if !LETTER_RE.is_match(&payload.password) || !DIGIT_RE.is_match(&payload.password) {
        details
            .entry("password")
            .or_default()
            .push("Password must be alphanumeric (letters and numbers).".to_string());
    }

    if !details.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Registration failed",
                "details": details
            })),
        );
    }

    let password = match user::hash_password(&payload.password) {
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

    let new_user = user::ActiveModel {
        username: Set(payload.username),
        email: Set(payload.email),
        password: Set(password),
        is_staff: Set(false),
        ..Default::default()
    };

    match new_user.insert(&txn).await {
        Ok(_) => match txn.commit().await {
            Ok(_) => (
                StatusCode::CREATED,
                Json(json!({
                    "message": "Account successfully created."
                })),
            ),
            Err(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            ),
        },
        Err(err) => {
            debug!("Register insert failed: {:?}", err);
            let _ = txn.rollback().await;
            (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "A user with these credentials already exists"
                })),
            )
        }
    }
}

async fn login(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<LoginPayload>,
) -> impl IntoResponse {
    let result = UserEntity::find()
        .filter(user::Column::Email.eq(&payload.email))
        .one(&*db)
        .await;

    //Unknown email and wrong password answer identically, so the endpoint
    //cannot be used to enumerate accounts.
    match result {
        Ok(Some(model)) => match model.check_hash(&payload.password) {
            Ok(()) => match issue_token_pair(model.id, model.is_staff) {
                Ok(tokens) => (
                    StatusCode::OK,
                    Json(json!({
                        "message": "Login successful",
                        "username": model.username,
                        "access_token": tokens.access
                    })),
                ),
                Err(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                ),
            },
            Err(_) => (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "Invalid email or password"
                })),
            ),
        },
        Ok(None) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "Invalid email or password"
            })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "An internal server error occured"
            })),
        ),
    }
}

//Structs
#[derive(Deserialize, Clone, Debug)]
struct RegisterPayload {
    username: String,
    email: String,
    password: String,
}

#[derive(Deserialize, Clone, Debug)]
struct LoginPayload {
    email: String,
    password: String,
}
