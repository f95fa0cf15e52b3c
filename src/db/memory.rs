// MemStore — the in-process reference store.
//
// All six collections live in one `Tables` value behind a tokio RwLock. Any
// operation that writes (including the view-counting article read) takes the
// write guard for its whole duration, so a row change and the counter updates
// it implies are one atomic step to every other caller.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::error::{StoreError, StoreResult};
use super::models::{
    new_id, now, Article, ArticlePatch, Bookmark, Comment, Follow, Like, LikeTarget, NewArticle,
    NewComment, NewUser, StoreStats, User, UserPatch,
};
use super::seed;
use super::table::Table;
use super::traits::{DataStore, FEATURED_LIMIT};

#[derive(Debug, Default)]
struct Tables {
    users: Table<User>,
    articles: Table<Article>,
    comments: Table<Comment>,
    follows: Table<Follow>,
    bookmarks: Table<Bookmark>,
    likes: Table<Like>,
}

impl Tables {
    /// Published articles, newest first. Ties keep the later insert first.
    fn published_newest_first(&self, mut keep: impl FnMut(&Article) -> bool) -> Vec<Article> {
        let mut articles: Vec<Article> = self
            .articles
            .iter()
            .rev()
            .filter(|a| a.is_published && keep(a))
            .cloned()
            .collect();
        articles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        articles
    }

    /// Check username/email uniqueness, ignoring the row `except_id`.
    fn check_unique(&self, username: &str, email: &str, except_id: Option<&str>) -> StoreResult<()> {
        let other = |u: &&User| Some(u.id.as_str()) != except_id;
        if self.users.iter().filter(other).any(|u| u.username == username) {
            return Err(StoreError::DuplicateKey {
                field: "username",
                value: username.to_string(),
            });
        }
        if self.users.iter().filter(other).any(|u| u.email == email) {
            return Err(StoreError::DuplicateKey {
                field: "email",
                value: email.to_string(),
            });
        }
        Ok(())
    }

    /// Resolve ids to users in order, dropping unknown and repeated ids.
    fn resolve_users<'a>(&self, ids: impl Iterator<Item = &'a str>) -> Vec<User> {
        let mut seen = std::collections::HashSet::new();
        ids.filter(|id| seen.insert(*id))
            .filter_map(|id| self.users.get(id).cloned())
            .collect()
    }

    fn insert_like(&mut self, user_id: &str, target: LikeTarget) -> Like {
        let like = Like {
            id: new_id(),
            user_id: user_id.to_string(),
            target,
            created_at: now(),
        };
        self.likes.insert(like.clone());
        like
    }

    fn remove_like(&mut self, user_id: &str, target: &LikeTarget) -> bool {
        let Some(id) = self
            .likes
            .find(|l| l.user_id == user_id && &l.target == target)
            .map(|l| l.id.clone())
        else {
            return false;
        };
        self.likes.remove(&id).is_some()
    }
}

pub struct MemStore {
    tables: RwLock<Tables>,
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStore {
    /// An empty store.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    /// A store pre-loaded with the sample users and articles.
    pub fn seeded() -> Self {
        let mut tables = Tables::default();
        for user in seed::sample_users() {
            tables.users.insert(user);
        }
        for article in seed::sample_articles() {
            tables.articles.insert(article);
        }
        Self {
            tables: RwLock::new(tables),
        }
    }
}

#[async_trait]
impl DataStore for MemStore {
    async fn stats(&self) -> StoreResult<StoreStats> {
        let t = self.tables.read().await;
        Ok(StoreStats {
            users: t.users.len() as u64,
            articles: t.articles.len() as u64,
            published_articles: t.articles.iter().filter(|a| a.is_published).count() as u64,
            comments: t.comments.len() as u64,
            follows: t.follows.len() as u64,
            bookmarks: t.bookmarks.len() as u64,
            likes: t.likes.len() as u64,
        })
    }

    async fn insert_user_record(&self, user: &User) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        t.check_unique(&user.username, &user.email, Some(user.id.as_str()))?;
        t.users.insert(user.clone());
        Ok(())
    }

    async fn insert_article_record(&self, article: &Article) -> StoreResult<()> {
        self.tables.write().await.articles.insert(article.clone());
        Ok(())
    }

    // --- Users ---

    async fn get_user(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.find(|u| u.username == username).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, input: NewUser) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        t.check_unique(&input.username, &input.email, None)?;
        let user = input.into_user();
        t.users.insert(user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: &str, patch: UserPatch) -> StoreResult<Option<User>> {
        let mut t = self.tables.write().await;
        let Some(mut user) = t.users.get(id).cloned() else {
            return Ok(None);
        };
        patch.apply(&mut user);
        t.check_unique(&user.username, &user.email, Some(id))?;
        t.users.insert(user.clone());
        Ok(Some(user))
    }

    // --- Articles ---

    async fn find_article(&self, id: &str) -> StoreResult<Option<Article>> {
        Ok(self.tables.read().await.articles.get(id).cloned())
    }

    async fn record_article_view(&self, id: &str) -> StoreResult<Option<Article>> {
        let mut t = self.tables.write().await;
        Ok(t.articles.get_mut(id).map(|article| {
            article.views = article.views.saturating_add(1);
            article.clone()
        }))
    }

    async fn get_articles(
        &self,
        limit: usize,
        offset: usize,
        category: Option<&str>,
    ) -> StoreResult<Vec<Article>> {
        let t = self.tables.read().await;
        let category = category.filter(|c| !c.is_empty());
        let articles = t.published_newest_first(|a| category.map_or(true, |c| a.in_category(c)));
        Ok(articles.into_iter().skip(offset).take(limit).collect())
    }

    async fn get_articles_by_author(&self, author_id: &str) -> StoreResult<Vec<Article>> {
        let t = self.tables.read().await;
        Ok(t.published_newest_first(|a| a.author_id == author_id))
    }

    async fn get_featured_articles(&self) -> StoreResult<Vec<Article>> {
        let t = self.tables.read().await;
        let mut articles: Vec<Article> = t
            .articles
            .iter()
            .filter(|a| a.is_published)
            .cloned()
            .collect();
        // Stable sort: equal like counts keep insertion order.
        articles.sort_by(|a, b| b.likes.cmp(&a.likes));
        articles.truncate(FEATURED_LIMIT);
        Ok(articles)
    }

    async fn create_article(&self, input: NewArticle) -> StoreResult<Article> {
        let article = input.into_article();
        self.tables.write().await.articles.insert(article.clone());
        Ok(article)
    }

    async fn update_article(&self, id: &str, patch: ArticlePatch) -> StoreResult<Option<Article>> {
        let mut t = self.tables.write().await;
        Ok(t.articles.get_mut(id).map(|article| {
            patch.apply(article);
            article.updated_at = now();
            article.clone()
        }))
    }

    async fn delete_article(&self, id: &str) -> StoreResult<bool> {
        Ok(self.tables.write().await.articles.remove(id).is_some())
    }

    // --- Comments ---

    async fn get_comments_by_article(&self, article_id: &str) -> StoreResult<Vec<Comment>> {
        let t = self.tables.read().await;
        let mut comments: Vec<Comment> = t
            .comments
            .iter()
            .filter(|c| c.article_id == article_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    async fn create_comment(&self, input: NewComment) -> StoreResult<Comment> {
        let mut t = self.tables.write().await;
        let comment = input.into_comment();
        t.comments.insert(comment.clone());
        match t.articles.get_mut(&comment.article_id) {
            Some(article) => {
                article.comment_count = article.comment_count.saturating_add(1);
                debug!(article_id = %article.id, count = article.comment_count, "comment count incremented");
            }
            None => warn!(article_id = %comment.article_id, "comment created on missing article"),
        }
        Ok(comment)
    }

    // --- Follows ---

    async fn follow_user(&self, follower_id: &str, following_id: &str) -> StoreResult<Follow> {
        let mut t = self.tables.write().await;
        let follow = Follow {
            id: new_id(),
            follower_id: follower_id.to_string(),
            following_id: following_id.to_string(),
            created_at: now(),
        };
        t.follows.insert(follow.clone());
        if let Some(follower) = t.users.get_mut(follower_id) {
            follower.following_count = follower.following_count.saturating_add(1);
        }
        if let Some(followee) = t.users.get_mut(following_id) {
            followee.follower_count = followee.follower_count.saturating_add(1);
        }
        debug!(follower_id, following_id, "follow recorded");
        Ok(follow)
    }

    async fn unfollow_user(&self, follower_id: &str, following_id: &str) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        let Some(id) = t
            .follows
            .find(|f| f.follower_id == follower_id && f.following_id == following_id)
            .map(|f| f.id.clone())
        else {
            return Ok(false);
        };
        t.follows.remove(&id);
        if let Some(follower) = t.users.get_mut(follower_id) {
            follower.following_count = follower.following_count.saturating_sub(1);
        }
        if let Some(followee) = t.users.get_mut(following_id) {
            followee.follower_count = followee.follower_count.saturating_sub(1);
        }
        debug!(follower_id, following_id, "follow removed");
        Ok(true)
    }

    async fn get_followers(&self, user_id: &str) -> StoreResult<Vec<User>> {
        let t = self.tables.read().await;
        let ids = t
            .follows
            .iter()
            .filter(|f| f.following_id == user_id)
            .map(|f| f.follower_id.as_str());
        Ok(t.resolve_users(ids))
    }

    async fn get_following(&self, user_id: &str) -> StoreResult<Vec<User>> {
        let t = self.tables.read().await;
        let ids = t
            .follows
            .iter()
            .filter(|f| f.follower_id == user_id)
            .map(|f| f.following_id.as_str());
        Ok(t.resolve_users(ids))
    }

    // --- Bookmarks ---

    async fn bookmark_article(&self, user_id: &str, article_id: &str) -> StoreResult<Bookmark> {
        let bookmark = Bookmark {
            id: new_id(),
            user_id: user_id.to_string(),
            article_id: article_id.to_string(),
            created_at: now(),
        };
        self.tables.write().await.bookmarks.insert(bookmark.clone());
        Ok(bookmark)
    }

    async fn unbookmark_article(&self, user_id: &str, article_id: &str) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        let Some(id) = t
            .bookmarks
            .find(|b| b.user_id == user_id && b.article_id == article_id)
            .map(|b| b.id.clone())
        else {
            return Ok(false);
        };
        Ok(t.bookmarks.remove(&id).is_some())
    }

    async fn get_bookmarks(&self, user_id: &str) -> StoreResult<Vec<Article>> {
        let t = self.tables.read().await;
        let mut seen = std::collections::HashSet::new();
        Ok(t
            .bookmarks
            .iter()
            .filter(|b| b.user_id == user_id)
            .filter(|b| seen.insert(b.article_id.as_str()))
            .filter_map(|b| t.articles.get(&b.article_id).cloned())
            .collect())
    }

    // --- Likes ---

    async fn like_article(&self, user_id: &str, article_id: &str) -> StoreResult<Like> {
        let mut t = self.tables.write().await;
        let like = t.insert_like(user_id, LikeTarget::Article(article_id.to_string()));
        match t.articles.get_mut(article_id) {
            Some(article) => article.likes = article.likes.saturating_add(1),
            None => warn!(article_id, "like recorded on missing article"),
        }
        Ok(like)
    }

    async fn unlike_article(&self, user_id: &str, article_id: &str) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        if !t.remove_like(user_id, &LikeTarget::Article(article_id.to_string())) {
            return Ok(false);
        }
        if let Some(article) = t.articles.get_mut(article_id) {
            article.likes = article.likes.saturating_sub(1);
        }
        Ok(true)
    }

    async fn like_comment(&self, user_id: &str, comment_id: &str) -> StoreResult<Like> {
        let mut t = self.tables.write().await;
        let like = t.insert_like(user_id, LikeTarget::Comment(comment_id.to_string()));
        match t.comments.get_mut(comment_id) {
            Some(comment) => comment.likes = comment.likes.saturating_add(1),
            None => warn!(comment_id, "like recorded on missing comment"),
        }
        Ok(like)
    }

    async fn unlike_comment(&self, user_id: &str, comment_id: &str) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        if !t.remove_like(user_id, &LikeTarget::Comment(comment_id.to_string())) {
            return Ok(false);
        }
        if let Some(comment) = t.comments.get_mut(comment_id) {
            comment.likes = comment.likes.saturating_sub(1);
        }
        Ok(true)
    }

    // --- Search ---

    async fn search_articles(&self, query: &str) -> StoreResult<Vec<Article>> {
        let needle = query.to_lowercase();
        let t = self.tables.read().await;
        Ok(t.published_newest_first(|a| a.matches_search(&needle)))
    }
}
