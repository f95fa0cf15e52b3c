// User handlers. The password never leaves the server: User skips it when
// serializing.
//
// GET  /api/users/{id}
// PUT  /api/users/{id}           — partial update, 409 on a taken username/email
// POST /api/users                — 409 on a taken username/email
// GET  /api/users/{id}/articles  — author's published articles, newest first

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::db::models::{Article, NewUser, User, UserPatch};
use crate::web::error::ApiError;
use crate::web::extract::ValidatedJson;
use crate::web::AppState;

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    state
        .store
        .get_user(&id)
        .await
        .map_err(|e| ApiError::store("Failed to fetch user", e))?
        .map(Json)
        .ok_or(ApiError::NotFound("User not found"))
}

/// PUT /api/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(patch): ValidatedJson<UserPatch>,
) -> Result<Json<User>, ApiError> {
    state
        .store
        .update_user(&id, patch)
        .await
        .map_err(|e| ApiError::store("Failed to update user", e))?
        .map(Json)
        .ok_or(ApiError::NotFound("User not found"))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state
        .store
        .create_user(input)
        .await
        .map_err(|e| ApiError::store("Failed to create user", e))?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users/{id}/articles
pub async fn user_articles(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Article>>, ApiError> {
    let articles = state
        .store
        .get_articles_by_author(&id)
        .await
        .map_err(|e| ApiError::store("Failed to fetch user articles", e))?;
    Ok(Json(articles))
}
