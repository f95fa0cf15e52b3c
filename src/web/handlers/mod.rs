// Route handlers, grouped by resource.
//
// List endpoints attach each row's author so the client can render bylines
// without a second round-trip. Authors that no longer resolve are omitted
// from the JSON rather than sent as null.

pub mod articles;
pub mod comments;
pub mod engagement;
pub mod search;
pub mod users;

use std::collections::HashMap;

use serde::Serialize;

use crate::db::models::{Article, Comment, User};
use crate::db::{DataStore, StoreResult};

#[derive(Debug, Serialize)]
pub struct ArticleWithAuthor {
    #[serde(flatten)]
    pub article: Article,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
}

#[derive(Debug, Serialize)]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    pub comment: Comment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
}

/// Look each author up once, however many rows they wrote.
async fn resolve_authors<'a>(
    store: &dyn DataStore,
    author_ids: impl Iterator<Item = &'a str>,
) -> StoreResult<HashMap<String, User>> {
    let mut authors = HashMap::new();
    for id in author_ids {
        if authors.contains_key(id) {
            continue;
        }
        if let Some(user) = store.get_user(id).await? {
            authors.insert(id.to_string(), user);
        }
    }
    Ok(authors)
}

pub async fn articles_with_authors(
    store: &dyn DataStore,
    articles: Vec<Article>,
) -> StoreResult<Vec<ArticleWithAuthor>> {
    let authors = resolve_authors(store, articles.iter().map(|a| a.author_id.as_str())).await?;
    Ok(articles
        .into_iter()
        .map(|article| ArticleWithAuthor {
            author: authors.get(&article.author_id).cloned(),
            article,
        })
        .collect())
}

pub async fn comments_with_authors(
    store: &dyn DataStore,
    comments: Vec<Comment>,
) -> StoreResult<Vec<CommentWithAuthor>> {
    let authors = resolve_authors(store, comments.iter().map(|c| c.author_id.as_str())).await?;
    Ok(comments
        .into_iter()
        .map(|comment| CommentWithAuthor {
            author: authors.get(&comment.author_id).cloned(),
            comment,
        })
        .collect())
}
