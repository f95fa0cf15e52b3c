// Data models — the entities owned by the store and the inputs that create or
// patch them.
//
// Entities serialize in the camelCase shape the client expects. Inputs carry
// `validator` rules so the web layer can reject bad bodies before the store
// is called; the store itself trusts what it is given.

use chrono::{DateTime, SubsecRound, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;
use validator::Validate;

/// Current time truncated to microseconds, the precision the SQLite backend
/// stores. Both backends stamp rows with this so a created row compares equal
/// to the same row read back.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Generate a fresh opaque record id.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// A registered user. The password is stored but never serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub name: String,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub is_verified: bool,
    pub follower_count: u32,
    pub following_count: u32,
    pub created_at: DateTime<Utc>,
}

/// An article. `likes`, `views` and `comment_count` are denormalized counters
/// maintained by the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub author_id: String,
    pub category: String,
    pub tags: Option<Vec<String>>,
    pub read_time: u32,
    pub likes: u32,
    pub views: u32,
    pub comment_count: u32,
    pub is_published: bool,
    pub featured_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    /// Case-insensitive exact match on the category name.
    pub fn in_category(&self, category: &str) -> bool {
        self.category.to_lowercase() == category.to_lowercase()
    }

    /// True if `needle` (already lowercased) occurs in the title, content,
    /// excerpt, or any tag.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.content.to_lowercase().contains(needle)
            || self.excerpt.to_lowercase().contains(needle)
            || self
                .tags
                .as_ref()
                .is_some_and(|tags| tags.iter().any(|t| t.to_lowercase().contains(needle)))
    }
}

/// A comment on an article. `parent_id` points at another comment for
/// one-level threaded replies.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub content: String,
    pub author_id: String,
    pub article_id: String,
    pub parent_id: Option<String>,
    pub likes: u32,
    pub created_at: DateTime<Utc>,
}

/// Directed "follower follows following" edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Follow {
    pub id: String,
    pub follower_id: String,
    pub following_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub user_id: String,
    pub article_id: String,
    pub created_at: DateTime<Utc>,
}

/// What a like points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikeTarget {
    Article(String),
    Comment(String),
}

impl LikeTarget {
    pub fn article_id(&self) -> Option<&str> {
        match self {
            LikeTarget::Article(id) => Some(id),
            LikeTarget::Comment(_) => None,
        }
    }

    pub fn comment_id(&self) -> Option<&str> {
        match self {
            LikeTarget::Comment(id) => Some(id),
            LikeTarget::Article(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Like {
    pub id: String,
    pub user_id: String,
    pub target: LikeTarget,
    pub created_at: DateTime<Utc>,
}

// Wire shape keeps both keys, with the unused one null.
impl Serialize for Like {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Like", 5)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("userId", &self.user_id)?;
        s.serialize_field("articleId", &self.target.article_id())?;
        s.serialize_field("commentId", &self.target.comment_id())?;
        s.serialize_field("createdAt", &self.created_at)?;
        s.end()
    }
}

/// Row counts per collection, shown by `quillspace status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub users: u64,
    pub articles: u64,
    pub published_articles: u64,
    pub comments: u64,
    pub follows: u64,
    pub bookmarks: u64,
    pub likes: u64,
}

// --- Inputs ---

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[validate(length(min = 1, max = 50, message = "Username is required"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 500, message = "Bio too long"))]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(url(message = "Avatar must be a URL"))]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewArticle {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    #[validate(length(min = 1, max = 500, message = "Excerpt must be 1-500 characters"))]
    pub excerpt: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author_id: String,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    pub read_time: u32,
    #[serde(default)]
    pub is_published: Option<bool>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(url(message = "Featured image must be a URL"))]
    pub featured_image: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    #[validate(length(min = 1, max = 1000, message = "Comment must be 1-1000 characters"))]
    pub content: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author_id: String,
    #[validate(length(min = 1, message = "Article is required"))]
    pub article_id: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub parent_id: Option<String>,
}

/// Partial article update. Counters and timestamps are not patchable; the
/// store owns them. For nullable fields, an explicit `null` clears the value
/// while an absent key leaves it alone.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePatch {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: Option<String>,
    #[validate(length(min = 1, max = 500, message = "Excerpt must be 1-500 characters"))]
    pub excerpt: Option<String>,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub tags: Option<Option<Vec<String>>>,
    pub read_time: Option<u32>,
    pub is_published: Option<bool>,
    #[serde(default, deserialize_with = "empty_as_null")]
    #[validate(url(message = "Featured image must be a URL"))]
    pub featured_image: Option<Option<String>>,
}

impl ArticlePatch {
    /// Shallow-merge into `article`. Does not touch `updated_at`; callers stamp it.
    pub fn apply(self, article: &mut Article) {
        if let Some(title) = self.title {
            article.title = title;
        }
        if let Some(content) = self.content {
            article.content = content;
        }
        if let Some(excerpt) = self.excerpt {
            article.excerpt = excerpt;
        }
        if let Some(category) = self.category {
            article.category = category;
        }
        if let Some(tags) = self.tags {
            article.tags = tags;
        }
        if let Some(read_time) = self.read_time {
            article.read_time = read_time;
        }
        if let Some(is_published) = self.is_published {
            article.is_published = is_published;
        }
        if let Some(featured_image) = self.featured_image {
            article.featured_image = featured_image.filter(|s| !s.is_empty());
        }
    }
}

/// Partial user update. Follower counts are store-owned and not patchable.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[validate(length(min = 1, max = 50, message = "Username is required"))]
    pub username: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_null")]
    #[validate(length(max = 500, message = "Bio too long"))]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "empty_as_null")]
    #[validate(url(message = "Avatar must be a URL"))]
    pub avatar: Option<Option<String>>,
    pub is_verified: Option<bool>,
}

impl UserPatch {
    pub fn apply(self, user: &mut User) {
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(password) = self.password {
            user.password = password;
        }
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(bio) = self.bio {
            user.bio = bio.filter(|s| !s.is_empty());
        }
        if let Some(avatar) = self.avatar {
            user.avatar = avatar.filter(|s| !s.is_empty());
        }
        if let Some(is_verified) = self.is_verified {
            user.is_verified = is_verified;
        }
    }
}

// --- Record builders shared by both backends ---

impl NewUser {
    pub fn into_user(self) -> User {
        User {
            id: new_id(),
            username: self.username,
            email: self.email,
            password: self.password,
            name: self.name,
            bio: self.bio.filter(|s| !s.is_empty()),
            avatar: self.avatar.filter(|s| !s.is_empty()),
            is_verified: false,
            follower_count: 0,
            following_count: 0,
            created_at: now(),
        }
    }
}

impl NewArticle {
    pub fn into_article(self) -> Article {
        let created_at = now();
        Article {
            id: new_id(),
            title: self.title,
            content: self.content,
            excerpt: self.excerpt,
            author_id: self.author_id,
            category: self.category,
            tags: self.tags,
            read_time: self.read_time,
            likes: 0,
            views: 0,
            comment_count: 0,
            is_published: self.is_published.unwrap_or(false),
            featured_image: self.featured_image.filter(|s| !s.is_empty()),
            created_at,
            updated_at: created_at,
        }
    }
}

impl NewComment {
    pub fn into_comment(self) -> Comment {
        Comment {
            id: new_id(),
            content: self.content,
            author_id: self.author_id,
            article_id: self.article_id,
            parent_id: self.parent_id,
            likes: 0,
            created_at: now(),
        }
    }
}

// --- serde helpers ---

/// Treat `""` the same as a missing optional string.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// Distinguish an explicit `null` (Some(None)) from an absent key (None).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// `double_option` for nullable strings, where `""` clears like `null`.
fn empty_as_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    empty_as_none(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article() -> Article {
        NewArticle {
            title: "The Art of Mindful Writing".to_string(),
            content: "Slow down and listen.".to_string(),
            excerpt: "On voice".to_string(),
            author_id: "user-1".to_string(),
            category: "Writing".to_string(),
            tags: Some(vec!["Creativity".to_string()]),
            read_time: 8,
            is_published: None,
            featured_image: None,
        }
        .into_article()
    }

    #[test]
    fn new_article_defaults() {
        let a = article();
        assert!(!a.is_published);
        assert_eq!((a.likes, a.views, a.comment_count), (0, 0, 0));
        assert_eq!(a.created_at, a.updated_at);
        assert!(!a.id.is_empty());
    }

    #[test]
    fn search_matches_any_field_case_insensitively() {
        let a = article();
        assert!(a.matches_search("mindful"));
        assert!(a.matches_search("listen"));
        assert!(a.matches_search("voice"));
        assert!(a.matches_search("creativ"));
        assert!(!a.matches_search("gardening"));
    }

    #[test]
    fn category_match_ignores_case_but_not_substrings() {
        let a = article();
        assert!(a.in_category("writing"));
        assert!(a.in_category("WRITING"));
        assert!(!a.in_category("writ"));
    }

    #[test]
    fn patch_distinguishes_null_from_absent() {
        let mut a = article();
        a.featured_image = Some("https://example.com/a.png".to_string());

        let keep: ArticlePatch = serde_json::from_str(r#"{"title": "New"}"#).unwrap();
        keep.apply(&mut a);
        assert_eq!(a.title, "New");
        assert!(a.featured_image.is_some());
        assert!(a.tags.is_some());

        let clear: ArticlePatch =
            serde_json::from_str(r#"{"featuredImage": null, "tags": null}"#).unwrap();
        clear.apply(&mut a);
        assert!(a.featured_image.is_none());
        assert!(a.tags.is_none());
    }

    #[test]
    fn user_password_is_never_serialized() {
        let user = NewUser {
            username: "sarahchen".to_string(),
            email: "sarah@example.com".to_string(),
            password: "hunter22".to_string(),
            name: "Sarah Chen".to_string(),
            bio: None,
            avatar: None,
        }
        .into_user();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["followerCount"], 0);
        assert_eq!(json["isVerified"], false);
    }

    #[test]
    fn like_serializes_both_target_keys() {
        let like = Like {
            id: "like-1".to_string(),
            user_id: "user-1".to_string(),
            target: LikeTarget::Comment("comment-9".to_string()),
            created_at: now(),
        };
        let json = serde_json::to_value(&like).unwrap();
        assert_eq!(json["commentId"], "comment-9");
        assert!(json["articleId"].is_null());
        assert_eq!(json["userId"], "user-1");
    }

    #[test]
    fn empty_optional_strings_become_none() {
        let body = r#"{"username":"a","email":"a@example.com","password":"secret1",
                       "name":"A","bio":"","avatar":""}"#;
        let user: NewUser = serde_json::from_str(body).unwrap();
        assert!(user.bio.is_none());
        assert!(user.avatar.is_none());
        assert!(user.validate().is_ok());
    }

    #[test]
    fn validation_rejects_bad_inputs() {
        let body = r#"{"username":"","email":"nope","password":"123","name":"A"}"#;
        let user: NewUser = serde_json::from_str(body).unwrap();
        let errors = user.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(!fields.contains_key("name"));
    }

    #[test]
    fn patches_check_urls_and_bio_length() {
        let article: ArticlePatch =
            serde_json::from_str(r#"{"featuredImage": "not a url"}"#).unwrap();
        let errors = article.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("featured_image"));

        let body = serde_json::json!({ "avatar": "not a url", "bio": "x".repeat(501) });
        let user: UserPatch = serde_json::from_value(body).unwrap();
        let errors = user.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("avatar"));
        assert!(fields.contains_key("bio"));

        let cleared: UserPatch = serde_json::from_str(r#"{"avatar": "", "bio": null}"#).unwrap();
        assert!(cleared.validate().is_ok());
        assert_eq!(cleared.avatar, Some(None));
        assert_eq!(cleared.bio, Some(None));
    }
}
