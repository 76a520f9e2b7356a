use axum::{http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use serde_json::json;

pub fn account_router() -> Router {
    Router::new().route("/logout", post(logout))
}

//There is no server-side session to tear down and no token revocation list,
//the client just drops its tokens. The endpoint only confirms the intent.
async fn logout() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "message": "Logged out successfully"
        })),
    )
}
