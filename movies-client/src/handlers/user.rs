use axum::{Json, extract::State};
use service_core::error::AppError;

use crate::AppState;
use crate::models::ClaimSet;
use crate::services::{BearerToken, MovieApiService};

/// Claims of the caller identified by the forwarded bearer token.
pub async fn user_info_handler(
    State(state): State<AppState>,
    token: BearerToken,
) -> Result<Json<ClaimSet>, AppError> {
    let claims = state.movie_service(token).get_user_info().await?;
    Ok(Json(claims))
}
