// Comment creation.
//
// POST /api/comments — bumps the parent article's commentCount when it exists.
// Listing lives under the article: GET /api/articles/{id}/comments.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::db::models::{Comment, NewComment};
use crate::web::error::ApiError;
use crate::web::extract::ValidatedJson;
use crate::web::AppState;

/// POST /api/comments
pub async fn create_comment(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<NewComment>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let comment = state
        .store
        .create_comment(input)
        .await
        .map_err(|e| ApiError::store("Failed to create comment", e))?;
    Ok((StatusCode::CREATED, Json(comment)))
}
