// SqliteStore — rusqlite backend implementing the DataStore trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Sync.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.
// Holding the lock for the whole operation is what makes each compound
// row-plus-counter change atomic with respect to other requests.

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::error::StoreResult;
use super::models::{
    Article, ArticlePatch, Bookmark, Comment, Follow, Like, LikeTarget, NewArticle, NewComment,
    NewUser, StoreStats, User, UserPatch,
};
use super::queries;
use super::traits::DataStore;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// A fresh in-memory database with the schema applied.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        super::schema::configure(&conn)?;
        super::schema::create_tables(&conn)?;
        Ok(Self::new(conn))
    }
}

#[async_trait]
impl DataStore for SqliteStore {
    async fn stats(&self) -> StoreResult<StoreStats> {
        let conn = self.conn.lock().await;
        queries::stats(&conn)
    }

    async fn insert_user_record(&self, user: &User) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        queries::insert_user(&conn, user)
    }

    async fn insert_article_record(&self, article: &Article) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        queries::insert_article(&conn, article)
    }

    async fn get_user(&self, id: &str) -> StoreResult<Option<User>> {
        let conn = self.conn.lock().await;
        queries::get_user(&conn, id)
    }

    async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let conn = self.conn.lock().await;
        queries::get_user_by_username(&conn, username)
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let conn = self.conn.lock().await;
        queries::get_user_by_email(&conn, email)
    }

    async fn create_user(&self, input: NewUser) -> StoreResult<User> {
        let mut conn = self.conn.lock().await;
        queries::create_user(&mut conn, input)
    }

    async fn update_user(&self, id: &str, patch: UserPatch) -> StoreResult<Option<User>> {
        let mut conn = self.conn.lock().await;
        queries::update_user(&mut conn, id, patch)
    }

    async fn find_article(&self, id: &str) -> StoreResult<Option<Article>> {
        let conn = self.conn.lock().await;
        queries::get_article(&conn, id)
    }

    async fn record_article_view(&self, id: &str) -> StoreResult<Option<Article>> {
        let mut conn = self.conn.lock().await;
        queries::record_article_view(&mut conn, id)
    }

    async fn get_articles(
        &self,
        limit: usize,
        offset: usize,
        category: Option<&str>,
    ) -> StoreResult<Vec<Article>> {
        let conn = self.conn.lock().await;
        queries::get_articles(&conn, limit, offset, category)
    }

    async fn get_articles_by_author(&self, author_id: &str) -> StoreResult<Vec<Article>> {
        let conn = self.conn.lock().await;
        queries::get_articles_by_author(&conn, author_id)
    }

    async fn get_featured_articles(&self) -> StoreResult<Vec<Article>> {
        let conn = self.conn.lock().await;
        queries::get_featured_articles(&conn)
    }

    async fn create_article(&self, input: NewArticle) -> StoreResult<Article> {
        let conn = self.conn.lock().await;
        queries::create_article(&conn, input)
    }

    async fn update_article(&self, id: &str, patch: ArticlePatch) -> StoreResult<Option<Article>> {
        let mut conn = self.conn.lock().await;
        queries::update_article(&mut conn, id, patch)
    }

    async fn delete_article(&self, id: &str) -> StoreResult<bool> {
        let conn = self.conn.lock().await;
        queries::delete_article(&conn, id)
    }

    async fn get_comments_by_article(&self, article_id: &str) -> StoreResult<Vec<Comment>> {
        let conn = self.conn.lock().await;
        queries::get_comments_by_article(&conn, article_id)
    }

    async fn create_comment(&self, input: NewComment) -> StoreResult<Comment> {
        let mut conn = self.conn.lock().await;
        queries::create_comment(&mut conn, input)
    }

    async fn follow_user(&self, follower_id: &str, following_id: &str) -> StoreResult<Follow> {
        let mut conn = self.conn.lock().await;
        queries::follow_user(&mut conn, follower_id, following_id)
    }

    async fn unfollow_user(&self, follower_id: &str, following_id: &str) -> StoreResult<bool> {
        let mut conn = self.conn.lock().await;
        queries::unfollow_user(&mut conn, follower_id, following_id)
    }

    async fn get_followers(&self, user_id: &str) -> StoreResult<Vec<User>> {
        let conn = self.conn.lock().await;
        queries::get_followers(&conn, user_id)
    }

    async fn get_following(&self, user_id: &str) -> StoreResult<Vec<User>> {
        let conn = self.conn.lock().await;
        queries::get_following(&conn, user_id)
    }

    async fn bookmark_article(&self, user_id: &str, article_id: &str) -> StoreResult<Bookmark> {
        let conn = self.conn.lock().await;
        queries::bookmark_article(&conn, user_id, article_id)
    }

    async fn unbookmark_article(&self, user_id: &str, article_id: &str) -> StoreResult<bool> {
        let conn = self.conn.lock().await;
        queries::unbookmark_article(&conn, user_id, article_id)
    }

    async fn get_bookmarks(&self, user_id: &str) -> StoreResult<Vec<Article>> {
        let conn = self.conn.lock().await;
        queries::get_bookmarks(&conn, user_id)
    }

    async fn like_article(&self, user_id: &str, article_id: &str) -> StoreResult<Like> {
        let mut conn = self.conn.lock().await;
        queries::like(&mut conn, user_id, LikeTarget::Article(article_id.to_string()))
    }

    async fn unlike_article(&self, user_id: &str, article_id: &str) -> StoreResult<bool> {
        let mut conn = self.conn.lock().await;
        queries::unlike(&mut conn, user_id, &LikeTarget::Article(article_id.to_string()))
    }

    async fn like_comment(&self, user_id: &str, comment_id: &str) -> StoreResult<Like> {
        let mut conn = self.conn.lock().await;
        queries::like(&mut conn, user_id, LikeTarget::Comment(comment_id.to_string()))
    }

    async fn unlike_comment(&self, user_id: &str, comment_id: &str) -> StoreResult<bool> {
        let mut conn = self.conn.lock().await;
        queries::unlike(&mut conn, user_id, &LikeTarget::Comment(comment_id.to_string()))
    }

    async fn search_articles(&self, query: &str) -> StoreResult<Vec<Article>> {
        let conn = self.conn.lock().await;
        queries::search_articles(&conn, query)
    }
}
