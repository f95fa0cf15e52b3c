// Article handlers.
//
// GET    /api/articles              — published, newest first, ?limit=&offset=&category=
// GET    /api/articles/featured     — top 6 by likes
// GET    /api/articles/{id}         — counts a view
// POST   /api/articles
// PUT    /api/articles/{id}         — partial update
// DELETE /api/articles/{id}
// GET    /api/articles/{id}/comments
//
// limit/offset are taken as raw strings: a value that doesn't parse falls back
// to the default instead of rejecting the request.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::{articles_with_authors, comments_with_authors, ArticleWithAuthor, CommentWithAuthor};
use crate::db::models::{Article, ArticlePatch, NewArticle};
use crate::db::traits::DEFAULT_PAGE_LIMIT;
use crate::web::error::ApiError;
use crate::web::extract::ValidatedJson;
use crate::web::AppState;

#[derive(Deserialize, Default)]
pub struct ArticlesQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    /// Case-insensitive exact match; empty means no filter
    pub category: Option<String>,
}

/// Page size from the query string. Missing, unparseable or zero → default.
fn parse_limit(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_PAGE_LIMIT)
}

fn parse_offset(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok()).unwrap_or(0)
}

/// GET /api/articles — published articles with their authors.
pub async fn list_articles(
    State(state): State<AppState>,
    Query(params): Query<ArticlesQuery>,
) -> Result<Json<Vec<ArticleWithAuthor>>, ApiError> {
    const FAILED: &str = "Failed to fetch articles";
    let limit = parse_limit(params.limit.as_deref());
    let offset = parse_offset(params.offset.as_deref());
    let category = params.category.as_deref().filter(|c| !c.is_empty());

    let articles = state
        .store
        .get_articles(limit, offset, category)
        .await
        .map_err(|e| ApiError::store(FAILED, e))?;
    let rows = articles_with_authors(state.store.as_ref(), articles)
        .await
        .map_err(|e| ApiError::store(FAILED, e))?;
    Ok(Json(rows))
}

/// GET /api/articles/featured
pub async fn featured_articles(
    State(state): State<AppState>,
) -> Result<Json<Vec<ArticleWithAuthor>>, ApiError> {
    const FAILED: &str = "Failed to fetch featured articles";
    let articles = state
        .store
        .get_featured_articles()
        .await
        .map_err(|e| ApiError::store(FAILED, e))?;
    let rows = articles_with_authors(state.store.as_ref(), articles)
        .await
        .map_err(|e| ApiError::store(FAILED, e))?;
    Ok(Json(rows))
}

/// GET /api/articles/{id} — records one view.
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ArticleWithAuthor>, ApiError> {
    const FAILED: &str = "Failed to fetch article";
    let article = state
        .store
        .get_article(&id)
        .await
        .map_err(|e| ApiError::store(FAILED, e))?
        .ok_or(ApiError::NotFound("Article not found"))?;
    let author = state
        .store
        .get_user(&article.author_id)
        .await
        .map_err(|e| ApiError::store(FAILED, e))?;
    Ok(Json(ArticleWithAuthor { article, author }))
}

/// POST /api/articles
pub async fn create_article(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<NewArticle>,
) -> Result<(StatusCode, Json<Article>), ApiError> {
    let article = state
        .store
        .create_article(input)
        .await
        .map_err(|e| ApiError::store("Failed to create article", e))?;
    Ok((StatusCode::CREATED, Json(article)))
}

/// PUT /api/articles/{id}
pub async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(patch): ValidatedJson<ArticlePatch>,
) -> Result<Json<Article>, ApiError> {
    state
        .store
        .update_article(&id, patch)
        .await
        .map_err(|e| ApiError::store("Failed to update article", e))?
        .map(Json)
        .ok_or(ApiError::NotFound("Article not found"))
}

/// DELETE /api/articles/{id}
pub async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .store
        .delete_article(&id)
        .await
        .map_err(|e| ApiError::store("Failed to delete article", e))?;
    if !deleted {
        return Err(ApiError::NotFound("Article not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/articles/{id}/comments — oldest first.
pub async fn article_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<CommentWithAuthor>>, ApiError> {
    const FAILED: &str = "Failed to fetch comments";
    let comments = state
        .store
        .get_comments_by_article(&id)
        .await
        .map_err(|e| ApiError::store(FAILED, e))?;
    let rows = comments_with_authors(state.store.as_ref(), comments)
        .await
        .map_err(|e| ApiError::store(FAILED, e))?;
    Ok(Json(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_falls_back_to_default() {
        assert_eq!(parse_limit(None), DEFAULT_PAGE_LIMIT);
        assert_eq!(parse_limit(Some("abc")), DEFAULT_PAGE_LIMIT);
        assert_eq!(parse_limit(Some("0")), DEFAULT_PAGE_LIMIT);
        assert_eq!(parse_limit(Some("-5")), DEFAULT_PAGE_LIMIT);
        assert_eq!(parse_limit(Some("3")), 3);
    }

    #[test]
    fn offset_falls_back_to_zero() {
        assert_eq!(parse_offset(None), 0);
        assert_eq!(parse_offset(Some("x")), 0);
        assert_eq!(parse_offset(Some("4")), 4);
    }
}
