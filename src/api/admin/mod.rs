pub mod auth;
pub mod category;
pub mod order;
pub mod product;
pub mod user;

use axum::{middleware::from_fn_with_state, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::middleware::auth::{auth_middleware, AuthState};

use auth::admin_auth_router;
use category::admin_category_router;
use order::admin_order_router;
use product::admin_product_router;
use user::admin_user_router;

//Every console route sits behind the staff gate, orders included. Only the
//admin login stays outside it.
pub fn admin_api_router(db: Arc<DatabaseConnection>) -> Router {
    let gated = Router::new()
        .nest("/", admin_category_router(db.clone()))
        .nest("/", admin_product_router(db.clone()))
        .nest("/", admin_user_router(db.clone()))
        .nest("/", admin_order_router(db.clone()))
        .layer(from_fn_with_state(
            AuthState {
                db: db.clone(),
                require_staff: true,
            },
            auth_middleware,
        ));

    Router::new()
        .nest("/", admin_auth_router(db))
        .nest("/", gated)
}
