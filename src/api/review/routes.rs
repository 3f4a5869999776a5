use crate::api::models::AppState;
use crate::api::review::handlers::{
    create_review_handler, delete_review_handler, get_review_handler, update_review_handler,
};
use axum::{
    routing::{get, post},
    Router,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/review", post(create_review_handler))
        .route(
            "/review/{id}",
            get(get_review_handler)
                .put(update_review_handler)
                .delete(delete_review_handler),
        )
}
