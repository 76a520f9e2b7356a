pub mod admin;
pub mod public;
pub mod user;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::middleware::logging::logging_middleware;
use crate::payment::PaymentGateway;

use admin::admin_api_router;
use public::public_api_router;
use user::user_api_router;

pub fn create_api_router(
    shared_db: Arc<DatabaseConnection>,
    gateway: Arc<dyn PaymentGateway>,
) -> Router {
    Router::new()
        .nest("/", public_api_router(shared_db.clone()))
        .nest("/", user_api_router(shared_db.clone(), gateway))
        .nest("/admin", admin_api_router(shared_db))
        .layer(axum::middleware::from_fn(logging_middleware))
}
