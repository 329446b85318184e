use axum::{Router, middleware::from_fn, routing::get};
use service_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use service_core::observability::extract_request_id;
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::handlers::{
    app::{health_check, metrics},
    movies::{
        create_movie_handler, delete_movie_handler, get_movie_handler, list_movies_handler,
        update_movie_handler,
    },
    user::user_info_handler,
};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/userinfo", get(user_info_handler))
        .route("/movies", get(list_movies_handler).post(create_movie_handler))
        .route(
            "/movies/:id",
            get(get_movie_handler)
                .put(update_movie_handler)
                .delete(delete_movie_handler),
        )
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id =
                    extract_request_id(request.headers()).unwrap_or_else(|| "-".to_string());

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Outermost, so the span above already sees the request id
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
