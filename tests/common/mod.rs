// Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use quillspace::db::models::{NewArticle, NewComment, NewUser};
use quillspace::db::{DataStore, MemStore};

/// Every backend compiled in, each seeded with the sample data.
pub async fn stores() -> Vec<(&'static str, Arc<dyn DataStore>)> {
    let mut out: Vec<(&'static str, Arc<dyn DataStore>)> =
        vec![("memory", Arc::new(MemStore::seeded()))];

    #[cfg(feature = "sqlite")]
    {
        let sqlite: Arc<dyn DataStore> =
            Arc::new(quillspace::db::SqliteStore::open_in_memory().unwrap());
        quillspace::db::seed::seed_if_empty(sqlite.as_ref())
            .await
            .unwrap();
        out.push(("sqlite", sqlite));
    }

    out
}

pub fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password: "secret123".to_string(),
        name: username.to_string(),
        bio: None,
        avatar: None,
    }
}

pub fn new_article(author_id: &str, title: &str, category: &str, published: bool) -> NewArticle {
    NewArticle {
        title: title.to_string(),
        content: format!("Body of {title}"),
        excerpt: format!("About {title}"),
        author_id: author_id.to_string(),
        category: category.to_string(),
        tags: None,
        read_time: 5,
        is_published: Some(published),
        featured_image: None,
    }
}

pub fn new_comment(author_id: &str, article_id: &str, content: &str) -> NewComment {
    NewComment {
        content: content.to_string(),
        author_id: author_id.to_string(),
        article_id: article_id.to_string(),
        parent_id: None,
    }
}
