pub mod account;
pub mod cart;
pub mod checkout;

use axum::{middleware::from_fn_with_state, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::middleware::auth::{auth_middleware, AuthState};
use crate::payment::PaymentGateway;

use account::account_router;
use cart::cart_router;
use checkout::checkout_router;

pub fn user_api_router(db: Arc<DatabaseConnection>, gateway: Arc<dyn PaymentGateway>) -> Router {
    Router::new()
        .nest("/", account_router())
        .nest("/", cart_router(db.clone()))
        .nest("/", checkout_router(db.clone(), gateway))
        .layer(from_fn_with_state(
            AuthState {
                db: db.clone(),
                require_staff: false,
            },
            auth_middleware,
        ))
}
