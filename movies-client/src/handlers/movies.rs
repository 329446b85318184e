use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use service_core::error::AppError;

use crate::AppState;
use crate::models::Movie;
use crate::services::{BearerToken, MovieApiService};

pub async fn list_movies_handler(
    State(state): State<AppState>,
    token: BearerToken,
) -> Result<Json<Vec<Movie>>, AppError> {
    let movies = state.movie_service(token).get_movies().await?;
    Ok(Json(movies))
}

pub async fn get_movie_handler(
    State(state): State<AppState>,
    token: BearerToken,
    Path(id): Path<i32>,
) -> Result<Json<Movie>, AppError> {
    let movie = state.movie_service(token).get_movie_by_id(id).await?;
    Ok(Json(movie))
}

/// The body is optional: a missing or unreadable payload still reaches the
/// catalog client, which decides the outcome.
pub async fn create_movie_handler(
    State(state): State<AppState>,
    token: BearerToken,
    body: Option<Json<Movie>>,
) -> Result<(StatusCode, Json<Movie>), AppError> {
    let movie = body.map(|Json(movie)| movie).unwrap_or_default();
    let movie = state.movie_service(token).create_movie(movie).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

pub async fn update_movie_handler(
    State(state): State<AppState>,
    token: BearerToken,
    Path(id): Path<i32>,
    body: Option<Json<Movie>>,
) -> Result<Json<Movie>, AppError> {
    let mut movie = body.map(|Json(movie)| movie).unwrap_or_default();
    movie.id = id;
    let movie = state.movie_service(token).update_movie(movie).await?;
    Ok(Json(movie))
}

pub async fn delete_movie_handler(
    State(state): State<AppState>,
    token: BearerToken,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    state.movie_service(token).delete_movie(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
