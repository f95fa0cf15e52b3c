// GET /api/search?q= — case-insensitive substring match over published
// articles' title, content, excerpt and tags.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use super::{articles_with_authors, ArticleWithAuthor};
use crate::web::error::ApiError;
use crate::web::AppState;

#[derive(Deserialize, Default)]
pub struct SearchQuery {
    pub q: Option<String>,
}

pub async fn search_articles(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<ArticleWithAuthor>>, ApiError> {
    const FAILED: &str = "Search failed";
    let query = params
        .q
        .filter(|q| !q.is_empty())
        .ok_or(ApiError::BadRequest("Search query is required"))?;

    let articles = state
        .store
        .search_articles(&query)
        .await
        .map_err(|e| ApiError::store(FAILED, e))?;
    let rows = articles_with_authors(state.store.as_ref(), articles)
        .await
        .map_err(|e| ApiError::store(FAILED, e))?;
    Ok(Json(rows))
}
