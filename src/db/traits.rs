// DataStore trait — backend-agnostic async interface for every store operation.
//
// Implementors: MemStore (in-process tables behind an RwLock) and SqliteStore
// (wraps rusqlite). Each method is one critical section: a row insert or
// delete and the counter updates it implies are never observed separately.
//
// Lookups by id return Ok(None) when the row is absent. Create operations do
// not check that referenced ids exist.

use async_trait::async_trait;

use super::error::StoreResult;
use super::models::{
    Article, ArticlePatch, Bookmark, Comment, Follow, Like, NewArticle, NewComment, NewUser,
    StoreStats, User, UserPatch,
};

/// Default page size for `get_articles`.
pub const DEFAULT_PAGE_LIMIT: usize = 10;

/// Maximum number of articles returned by `get_featured_articles`.
pub const FEATURED_LIMIT: usize = 6;

#[async_trait]
pub trait DataStore: Send + Sync {
    // --- Lifecycle ---

    /// Row counts per collection.
    async fn stats(&self) -> StoreResult<StoreStats>;

    /// Insert a fully-formed user as-is (fixed id and counters). Used for seeding.
    async fn insert_user_record(&self, user: &User) -> StoreResult<()>;

    /// Insert a fully-formed article as-is. Used for seeding.
    async fn insert_article_record(&self, article: &Article) -> StoreResult<()>;

    // --- Users ---

    async fn get_user(&self, id: &str) -> StoreResult<Option<User>>;

    async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Create a user. Fails with `DuplicateKey` if the username or email is taken.
    async fn create_user(&self, input: NewUser) -> StoreResult<User>;

    /// Shallow-merge `patch` into the user. `created_at` is never touched.
    async fn update_user(&self, id: &str, patch: UserPatch) -> StoreResult<Option<User>>;

    // --- Articles ---

    /// Pure read: no view is recorded.
    async fn find_article(&self, id: &str) -> StoreResult<Option<Article>>;

    /// Increment the article's view count and return the updated row.
    async fn record_article_view(&self, id: &str) -> StoreResult<Option<Article>>;

    /// Fetch an article for a reader. Every successful call counts one view.
    async fn get_article(&self, id: &str) -> StoreResult<Option<Article>> {
        self.record_article_view(id).await
    }

    /// Published articles, newest first, optionally filtered by category
    /// (case-insensitive exact match), then sliced to `[offset, offset + limit)`.
    async fn get_articles(
        &self,
        limit: usize,
        offset: usize,
        category: Option<&str>,
    ) -> StoreResult<Vec<Article>>;

    /// An author's published articles, newest first.
    async fn get_articles_by_author(&self, author_id: &str) -> StoreResult<Vec<Article>>;

    /// Up to six published articles with the most likes.
    async fn get_featured_articles(&self) -> StoreResult<Vec<Article>>;

    async fn create_article(&self, input: NewArticle) -> StoreResult<Article>;

    /// Shallow-merge `patch` and refresh `updated_at`, even if nothing changed.
    async fn update_article(&self, id: &str, patch: ArticlePatch) -> StoreResult<Option<Article>>;

    /// Remove the article. Its comments, likes and bookmarks are left in place.
    async fn delete_article(&self, id: &str) -> StoreResult<bool>;

    // --- Comments ---

    /// Every comment on the article (top-level and replies), oldest first.
    async fn get_comments_by_article(&self, article_id: &str) -> StoreResult<Vec<Comment>>;

    /// Create a comment and bump the article's comment count if the article exists.
    async fn create_comment(&self, input: NewComment) -> StoreResult<Comment>;

    // --- Follows ---

    async fn follow_user(&self, follower_id: &str, following_id: &str) -> StoreResult<Follow>;

    /// Remove the first matching edge. Returns false if there was none.
    async fn unfollow_user(&self, follower_id: &str, following_id: &str) -> StoreResult<bool>;

    async fn get_followers(&self, user_id: &str) -> StoreResult<Vec<User>>;

    async fn get_following(&self, user_id: &str) -> StoreResult<Vec<User>>;

    // --- Bookmarks ---

    async fn bookmark_article(&self, user_id: &str, article_id: &str) -> StoreResult<Bookmark>;

    async fn unbookmark_article(&self, user_id: &str, article_id: &str) -> StoreResult<bool>;

    /// Bookmarked articles in bookmark order.
    async fn get_bookmarks(&self, user_id: &str) -> StoreResult<Vec<Article>>;

    // --- Likes ---

    async fn like_article(&self, user_id: &str, article_id: &str) -> StoreResult<Like>;

    async fn unlike_article(&self, user_id: &str, article_id: &str) -> StoreResult<bool>;

    async fn like_comment(&self, user_id: &str, comment_id: &str) -> StoreResult<Like>;

    async fn unlike_comment(&self, user_id: &str, comment_id: &str) -> StoreResult<bool>;

    // --- Search ---

    /// Published articles whose title, content, excerpt or a tag contains
    /// `query` (case-insensitive), newest first.
    async fn search_articles(&self, query: &str) -> StoreResult<Vec<Article>>;
}
