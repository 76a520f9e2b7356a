use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use storefront_api::api::create_api_router;
use storefront_api::entities::{ensure_admin, setup_schema};
use storefront_api::payment::{InstantCapture, PaymentGateway};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db: DatabaseConnection = Database::connect(&database_url)
        .await
        .expect("Failed to connect to the database");
    setup_schema(&db).await;
    ensure_admin(&db).await;

    let shared_db = Arc::new(db);
    let gateway: Arc<dyn PaymentGateway> = Arc::new(InstantCapture);

    let app = create_api_router(shared_db, gateway).layer(TraceLayer::new_for_http());

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!("Listening on {}", bind_addr);
    axum::serve(listener, app).await.expect("Server error");
}
