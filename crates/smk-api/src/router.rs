use axum::{Router, http::StatusCode, response::IntoResponse, routing::get};
use smk_db::ProgressStore;

use crate::{state::ApiState, v1};

pub fn router<S: ProgressStore>() -> Router<ApiState<S>> {
    Router::new()
        .route("/health", get(health))
        .nest("/v1", v1::routes())
        .fallback(handler_404)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        "The requested resource was not found",
    )
}
