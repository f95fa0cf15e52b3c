// Likes, bookmarks and follows.
//
// POST/DELETE /api/articles/{id}/like      body: { userId }
// POST/DELETE /api/comments/{id}/like      body: { userId }
// POST/DELETE /api/articles/{id}/bookmark  body: { userId }
// GET         /api/users/{id}/bookmarks
// POST/DELETE /api/users/{id}/follow       body: { followerId }
// GET         /api/users/{id}/followers
// GET         /api/users/{id}/following
//
// There is no session, so the acting user arrives in the body. A missing,
// empty or unreadable body is a 400. Undo operations answer 404 when nothing
// matched.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::{articles_with_authors, ArticleWithAuthor};
use crate::db::models::{Bookmark, Follow, Like, User};
use crate::web::error::ApiError;
use crate::web::AppState;

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ActorBody {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub follower_id: Option<String>,
}

type Body = Result<Json<ActorBody>, JsonRejection>;

fn required_user_id(body: Body) -> Result<String, ApiError> {
    body.ok()
        .and_then(|Json(b)| b.user_id)
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::BadRequest("User ID is required"))
}

fn required_follower_id(body: Body) -> Result<String, ApiError> {
    body.ok()
        .and_then(|Json(b)| b.follower_id)
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::BadRequest("Follower ID is required"))
}

// --- Likes ---

/// POST /api/articles/{id}/like
pub async fn like_article(
    State(state): State<AppState>,
    Path(article_id): Path<String>,
    body: Body,
) -> Result<(StatusCode, Json<Like>), ApiError> {
    let user_id = required_user_id(body)?;
    let like = state
        .store
        .like_article(&user_id, &article_id)
        .await
        .map_err(|e| ApiError::store("Failed to like article", e))?;
    Ok((StatusCode::CREATED, Json(like)))
}

/// DELETE /api/articles/{id}/like
pub async fn unlike_article(
    State(state): State<AppState>,
    Path(article_id): Path<String>,
    body: Body,
) -> Result<StatusCode, ApiError> {
    let user_id = required_user_id(body)?;
    let removed = state
        .store
        .unlike_article(&user_id, &article_id)
        .await
        .map_err(|e| ApiError::store("Failed to unlike article", e))?;
    if !removed {
        return Err(ApiError::NotFound("Like not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/comments/{id}/like
pub async fn like_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    body: Body,
) -> Result<(StatusCode, Json<Like>), ApiError> {
    let user_id = required_user_id(body)?;
    let like = state
        .store
        .like_comment(&user_id, &comment_id)
        .await
        .map_err(|e| ApiError::store("Failed to like comment", e))?;
    Ok((StatusCode::CREATED, Json(like)))
}

/// DELETE /api/comments/{id}/like
pub async fn unlike_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    body: Body,
) -> Result<StatusCode, ApiError> {
    let user_id = required_user_id(body)?;
    let removed = state
        .store
        .unlike_comment(&user_id, &comment_id)
        .await
        .map_err(|e| ApiError::store("Failed to unlike comment", e))?;
    if !removed {
        return Err(ApiError::NotFound("Like not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

// --- Bookmarks ---

/// POST /api/articles/{id}/bookmark
pub async fn bookmark_article(
    State(state): State<AppState>,
    Path(article_id): Path<String>,
    body: Body,
) -> Result<(StatusCode, Json<Bookmark>), ApiError> {
    let user_id = required_user_id(body)?;
    let bookmark = state
        .store
        .bookmark_article(&user_id, &article_id)
        .await
        .map_err(|e| ApiError::store("Failed to bookmark article", e))?;
    Ok((StatusCode::CREATED, Json(bookmark)))
}

/// DELETE /api/articles/{id}/bookmark
pub async fn unbookmark_article(
    State(state): State<AppState>,
    Path(article_id): Path<String>,
    body: Body,
) -> Result<StatusCode, ApiError> {
    let user_id = required_user_id(body)?;
    let removed = state
        .store
        .unbookmark_article(&user_id, &article_id)
        .await
        .map_err(|e| ApiError::store("Failed to unbookmark article", e))?;
    if !removed {
        return Err(ApiError::NotFound("Bookmark not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/users/{id}/bookmarks — bookmarked articles in bookmark order.
pub async fn list_bookmarks(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<ArticleWithAuthor>>, ApiError> {
    const FAILED: &str = "Failed to fetch bookmarks";
    let articles = state
        .store
        .get_bookmarks(&user_id)
        .await
        .map_err(|e| ApiError::store(FAILED, e))?;
    let rows = articles_with_authors(state.store.as_ref(), articles)
        .await
        .map_err(|e| ApiError::store(FAILED, e))?;
    Ok(Json(rows))
}

// --- Follows ---

/// POST /api/users/{id}/follow — body.followerId follows {id}.
pub async fn follow_user(
    State(state): State<AppState>,
    Path(following_id): Path<String>,
    body: Body,
) -> Result<(StatusCode, Json<Follow>), ApiError> {
    let follower_id = required_follower_id(body)?;
    let follow = state
        .store
        .follow_user(&follower_id, &following_id)
        .await
        .map_err(|e| ApiError::store("Failed to follow user", e))?;
    Ok((StatusCode::CREATED, Json(follow)))
}

/// DELETE /api/users/{id}/follow
pub async fn unfollow_user(
    State(state): State<AppState>,
    Path(following_id): Path<String>,
    body: Body,
) -> Result<StatusCode, ApiError> {
    let follower_id = required_follower_id(body)?;
    let removed = state
        .store
        .unfollow_user(&follower_id, &following_id)
        .await
        .map_err(|e| ApiError::store("Failed to unfollow user", e))?;
    if !removed {
        return Err(ApiError::NotFound("Follow relationship not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/users/{id}/followers
pub async fn list_followers(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = state
        .store
        .get_followers(&user_id)
        .await
        .map_err(|e| ApiError::store("Failed to fetch followers", e))?;
    Ok(Json(users))
}

/// GET /api/users/{id}/following
pub async fn list_following(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = state
        .store
        .get_following(&user_id)
        .await
        .map_err(|e| ApiError::store("Failed to fetch following", e))?;
    Ok(Json(users))
}
