// Database queries — every SQLite statement the store runs.
//
// Read-only helpers take `&Connection`. Operations that touch a row and a
// counter take `&mut Connection` and run inside one transaction, so the
// counter change commits with the row or not at all.
//
// Ordering mirrors the memory store: newest-first listings break timestamp
// ties by descending rowid, comment threads and the featured list by
// ascending rowid.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, warn};

use super::error::{StoreError, StoreResult};
use super::models::{
    new_id, now, Article, ArticlePatch, Bookmark, Comment, Follow, Like, LikeTarget, NewArticle,
    NewComment, NewUser, StoreStats, User, UserPatch,
};
use super::traits::FEATURED_LIMIT;

const USER_COLUMNS: &str = "id, username, email, password, name, bio, avatar, is_verified,
     follower_count, following_count, created_at";

const ARTICLE_COLUMNS: &str = "id, title, content, excerpt, author_id, category, tags, read_time,
     likes, views, comment_count, is_published, featured_image, created_at, updated_at";

const COMMENT_COLUMNS: &str = "id, content, author_id, article_id, parent_id, likes, created_at";

/// `col = excluded.col` for every column but `id`, so an upsert keeps the
/// existing row (and its rowid) in place.
fn upsert_assignments(columns: &str) -> String {
    columns
        .split(',')
        .map(str::trim)
        .filter(|c| *c != "id")
        .map(|c| format!("{c} = excluded.{c}"))
        .collect::<Vec<_>>()
        .join(", ")
}

// --- Row mapping ---

fn ts(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_tags(idx: usize, raw: Option<String>) -> rusqlite::Result<Option<Vec<String>>> {
    raw.map(|json| serde_json::from_str(&json))
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        name: row.get(4)?,
        bio: row.get(5)?,
        avatar: row.get(6)?,
        is_verified: row.get(7)?,
        follower_count: row.get(8)?,
        following_count: row.get(9)?,
        created_at: parse_ts(10, row.get(10)?)?,
    })
}

fn article_from_row(row: &Row<'_>) -> rusqlite::Result<Article> {
    Ok(Article {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        excerpt: row.get(3)?,
        author_id: row.get(4)?,
        category: row.get(5)?,
        tags: parse_tags(6, row.get(6)?)?,
        read_time: row.get(7)?,
        likes: row.get(8)?,
        views: row.get(9)?,
        comment_count: row.get(10)?,
        is_published: row.get(11)?,
        featured_image: row.get(12)?,
        created_at: parse_ts(13, row.get(13)?)?,
        updated_at: parse_ts(14, row.get(14)?)?,
    })
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        content: row.get(1)?,
        author_id: row.get(2)?,
        article_id: row.get(3)?,
        parent_id: row.get(4)?,
        likes: row.get(5)?,
        created_at: parse_ts(6, row.get(6)?)?,
    })
}

fn tags_json(article: &Article) -> StoreResult<Option<String>> {
    Ok(article.tags.as_ref().map(serde_json::to_string).transpose()?)
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

// --- Stats ---

fn count(conn: &Connection, sql: &str) -> StoreResult<u64> {
    let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
    u64::try_from(n).map_err(|_| StoreError::Corrupt(format!("negative count from `{sql}`")))
}

pub fn stats(conn: &Connection) -> StoreResult<StoreStats> {
    Ok(StoreStats {
        users: count(conn, "SELECT COUNT(*) FROM users")?,
        articles: count(conn, "SELECT COUNT(*) FROM articles")?,
        published_articles: count(conn, "SELECT COUNT(*) FROM articles WHERE is_published = 1")?,
        comments: count(conn, "SELECT COUNT(*) FROM comments")?,
        follows: count(conn, "SELECT COUNT(*) FROM follows")?,
        bookmarks: count(conn, "SELECT COUNT(*) FROM bookmarks")?,
        likes: count(conn, "SELECT COUNT(*) FROM likes")?,
    })
}

// --- Users ---

/// Fail with DuplicateKey if another row (not `except_id`) holds the username or email.
fn check_unique(
    conn: &Connection,
    username: &str,
    email: &str,
    except_id: Option<&str>,
) -> StoreResult<()> {
    for (field, value) in [("username", username), ("email", email)] {
        let taken = conn
            .query_row(
                &format!("SELECT 1 FROM users WHERE {field} = ?1 AND id IS NOT ?2"),
                params![value, except_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if taken {
            return Err(StoreError::DuplicateKey {
                field,
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

pub fn insert_user(conn: &Connection, user: &User) -> StoreResult<()> {
    check_unique(conn, &user.username, &user.email, Some(user.id.as_str()))?;
    conn.execute(
        &format!(
            "INSERT INTO users ({USER_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(id) DO UPDATE SET {}",
            upsert_assignments(USER_COLUMNS)
        ),
        params![
            user.id,
            user.username,
            user.email,
            user.password,
            user.name,
            user.bio,
            user.avatar,
            user.is_verified,
            user.follower_count,
            user.following_count,
            ts(&user.created_at),
        ],
    )?;
    Ok(())
}

fn find_user(conn: &Connection, column: &str, value: &str) -> StoreResult<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1 ORDER BY rowid LIMIT 1"),
            params![value],
            user_from_row,
        )
        .optional()?;
    Ok(user)
}

pub fn get_user(conn: &Connection, id: &str) -> StoreResult<Option<User>> {
    find_user(conn, "id", id)
}

pub fn get_user_by_username(conn: &Connection, username: &str) -> StoreResult<Option<User>> {
    find_user(conn, "username", username)
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> StoreResult<Option<User>> {
    find_user(conn, "email", email)
}

pub fn create_user(conn: &mut Connection, input: NewUser) -> StoreResult<User> {
    let tx = conn.transaction()?;
    check_unique(&tx, &input.username, &input.email, None)?;
    let user = input.into_user();
    insert_user(&tx, &user)?;
    tx.commit()?;
    Ok(user)
}

pub fn update_user(conn: &mut Connection, id: &str, patch: UserPatch) -> StoreResult<Option<User>> {
    let tx = conn.transaction()?;
    let Some(mut user) = get_user(&tx, id)? else {
        return Ok(None);
    };
    patch.apply(&mut user);
    check_unique(&tx, &user.username, &user.email, Some(id))?;
    tx.execute(
        "UPDATE users SET username = ?2, email = ?3, password = ?4, name = ?5, bio = ?6,
                avatar = ?7, is_verified = ?8
         WHERE id = ?1",
        params![
            id,
            user.username,
            user.email,
            user.password,
            user.name,
            user.bio,
            user.avatar,
            user.is_verified,
        ],
    )?;
    tx.commit()?;
    Ok(Some(user))
}

/// Resolve user ids in order, skipping unknown and repeated ids.
fn resolve_users(conn: &Connection, ids: Vec<String>) -> StoreResult<Vec<User>> {
    let mut seen = std::collections::HashSet::new();
    let mut users = Vec::new();
    for id in ids {
        if !seen.insert(id.clone()) {
            continue;
        }
        if let Some(user) = get_user(conn, &id)? {
            users.push(user);
        }
    }
    Ok(users)
}

// --- Articles ---

pub fn insert_article(conn: &Connection, article: &Article) -> StoreResult<()> {
    conn.execute(
        &format!(
            "INSERT INTO articles ({ARTICLE_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
             ON CONFLICT(id) DO UPDATE SET {}",
            upsert_assignments(ARTICLE_COLUMNS)
        ),
        params![
            article.id,
            article.title,
            article.content,
            article.excerpt,
            article.author_id,
            article.category,
            tags_json(article)?,
            article.read_time,
            article.likes,
            article.views,
            article.comment_count,
            article.is_published,
            article.featured_image,
            ts(&article.created_at),
            ts(&article.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_article(conn: &Connection, id: &str) -> StoreResult<Option<Article>> {
    let article = conn
        .query_row(
            &format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = ?1"),
            params![id],
            article_from_row,
        )
        .optional()?;
    Ok(article)
}

pub fn record_article_view(conn: &mut Connection, id: &str) -> StoreResult<Option<Article>> {
    let tx = conn.transaction()?;
    let changed = tx.execute(
        "UPDATE articles SET views = views + 1 WHERE id = ?1",
        params![id],
    )?;
    if changed == 0 {
        return Ok(None);
    }
    let article = get_article(&tx, id)?;
    tx.commit()?;
    Ok(article)
}

/// Published articles, optionally for one author, newest first.
fn published_articles(conn: &Connection, author_id: Option<&str>) -> StoreResult<Vec<Article>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ARTICLE_COLUMNS} FROM articles
         WHERE is_published = 1 AND (?1 IS NULL OR author_id = ?1)
         ORDER BY created_at DESC, rowid DESC"
    ))?;
    let rows = stmt.query_map(params![author_id], article_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn get_articles(
    conn: &Connection,
    limit: usize,
    offset: usize,
    category: Option<&str>,
) -> StoreResult<Vec<Article>> {
    // Category matching uses Rust's Unicode lowercasing, so it is filtered
    // here rather than with SQLite's ASCII-only lower().
    if let Some(category) = category.filter(|c| !c.is_empty()) {
        return Ok(published_articles(conn, None)?
            .into_iter()
            .filter(|a| a.in_category(category))
            .skip(offset)
            .take(limit)
            .collect());
    }

    let mut stmt = conn.prepare(&format!(
        "SELECT {ARTICLE_COLUMNS} FROM articles
         WHERE is_published = 1
         ORDER BY created_at DESC, rowid DESC
         LIMIT ?1 OFFSET ?2"
    ))?;
    let rows = stmt.query_map(params![to_i64(limit), to_i64(offset)], article_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn get_articles_by_author(conn: &Connection, author_id: &str) -> StoreResult<Vec<Article>> {
    published_articles(conn, Some(author_id))
}

pub fn get_featured_articles(conn: &Connection) -> StoreResult<Vec<Article>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ARTICLE_COLUMNS} FROM articles
         WHERE is_published = 1
         ORDER BY likes DESC, rowid ASC
         LIMIT ?1"
    ))?;
    let rows = stmt.query_map(params![to_i64(FEATURED_LIMIT)], article_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn create_article(conn: &Connection, input: NewArticle) -> StoreResult<Article> {
    let article = input.into_article();
    insert_article(conn, &article)?;
    Ok(article)
}

pub fn update_article(
    conn: &mut Connection,
    id: &str,
    patch: ArticlePatch,
) -> StoreResult<Option<Article>> {
    let tx = conn.transaction()?;
    let Some(mut article) = get_article(&tx, id)? else {
        return Ok(None);
    };
    patch.apply(&mut article);
    article.updated_at = now();
    tx.execute(
        "UPDATE articles SET title = ?2, content = ?3, excerpt = ?4, category = ?5, tags = ?6,
                read_time = ?7, is_published = ?8, featured_image = ?9, updated_at = ?10
         WHERE id = ?1",
        params![
            id,
            article.title,
            article.content,
            article.excerpt,
            article.category,
            tags_json(&article)?,
            article.read_time,
            article.is_published,
            article.featured_image,
            ts(&article.updated_at),
        ],
    )?;
    tx.commit()?;
    Ok(Some(article))
}

pub fn delete_article(conn: &Connection, id: &str) -> StoreResult<bool> {
    let deleted = conn.execute("DELETE FROM articles WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

pub fn search_articles(conn: &Connection, query: &str) -> StoreResult<Vec<Article>> {
    let needle = query.to_lowercase();
    Ok(published_articles(conn, None)?
        .into_iter()
        .filter(|a| a.matches_search(&needle))
        .collect())
}

// --- Comments ---

pub fn get_comments_by_article(conn: &Connection, article_id: &str) -> StoreResult<Vec<Comment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COMMENT_COLUMNS} FROM comments
         WHERE article_id = ?1
         ORDER BY created_at ASC, rowid ASC"
    ))?;
    let rows = stmt.query_map(params![article_id], comment_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn create_comment(conn: &mut Connection, input: NewComment) -> StoreResult<Comment> {
    let comment = input.into_comment();
    let tx = conn.transaction()?;
    tx.execute(
        &format!("INSERT INTO comments ({COMMENT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
        params![
            comment.id,
            comment.content,
            comment.author_id,
            comment.article_id,
            comment.parent_id,
            comment.likes,
            ts(&comment.created_at),
        ],
    )?;
    let bumped = tx.execute(
        "UPDATE articles SET comment_count = comment_count + 1 WHERE id = ?1",
        params![comment.article_id],
    )?;
    tx.commit()?;
    if bumped == 0 {
        warn!(article_id = %comment.article_id, "comment created on missing article");
    }
    Ok(comment)
}

// --- Follows ---

pub fn follow_user(conn: &mut Connection, follower_id: &str, following_id: &str) -> StoreResult<Follow> {
    let follow = Follow {
        id: new_id(),
        follower_id: follower_id.to_string(),
        following_id: following_id.to_string(),
        created_at: now(),
    };
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO follows (id, follower_id, following_id, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![follow.id, follower_id, following_id, ts(&follow.created_at)],
    )?;
    tx.execute(
        "UPDATE users SET following_count = following_count + 1 WHERE id = ?1",
        params![follower_id],
    )?;
    tx.execute(
        "UPDATE users SET follower_count = follower_count + 1 WHERE id = ?1",
        params![following_id],
    )?;
    tx.commit()?;
    debug!(follower_id, following_id, "follow recorded");
    Ok(follow)
}

pub fn unfollow_user(conn: &mut Connection, follower_id: &str, following_id: &str) -> StoreResult<bool> {
    let tx = conn.transaction()?;
    let id: Option<String> = tx
        .query_row(
            "SELECT id FROM follows WHERE follower_id = ?1 AND following_id = ?2
             ORDER BY rowid LIMIT 1",
            params![follower_id, following_id],
            |row| row.get(0),
        )
        .optional()?;
    let Some(id) = id else {
        return Ok(false);
    };
    tx.execute("DELETE FROM follows WHERE id = ?1", params![id])?;
    tx.execute(
        "UPDATE users SET following_count = MAX(following_count - 1, 0) WHERE id = ?1",
        params![follower_id],
    )?;
    tx.execute(
        "UPDATE users SET follower_count = MAX(follower_count - 1, 0) WHERE id = ?1",
        params![following_id],
    )?;
    tx.commit()?;
    debug!(follower_id, following_id, "follow removed");
    Ok(true)
}

fn select_ids(conn: &Connection, sql: &str, key: &str) -> StoreResult<Vec<String>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params![key], |row| row.get(0))?;
    Ok(rows.collect::<rusqlite::Result<Vec<String>>>()?)
}

pub fn get_followers(conn: &Connection, user_id: &str) -> StoreResult<Vec<User>> {
    let ids = select_ids(
        conn,
        "SELECT follower_id FROM follows WHERE following_id = ?1 ORDER BY rowid",
        user_id,
    )?;
    resolve_users(conn, ids)
}

pub fn get_following(conn: &Connection, user_id: &str) -> StoreResult<Vec<User>> {
    let ids = select_ids(
        conn,
        "SELECT following_id FROM follows WHERE follower_id = ?1 ORDER BY rowid",
        user_id,
    )?;
    resolve_users(conn, ids)
}

// --- Bookmarks ---

pub fn bookmark_article(conn: &Connection, user_id: &str, article_id: &str) -> StoreResult<Bookmark> {
    let bookmark = Bookmark {
        id: new_id(),
        user_id: user_id.to_string(),
        article_id: article_id.to_string(),
        created_at: now(),
    };
    conn.execute(
        "INSERT INTO bookmarks (id, user_id, article_id, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![bookmark.id, user_id, article_id, ts(&bookmark.created_at)],
    )?;
    Ok(bookmark)
}

pub fn unbookmark_article(conn: &Connection, user_id: &str, article_id: &str) -> StoreResult<bool> {
    let deleted = conn.execute(
        "DELETE FROM bookmarks WHERE id = (
             SELECT id FROM bookmarks WHERE user_id = ?1 AND article_id = ?2
             ORDER BY rowid LIMIT 1
         )",
        params![user_id, article_id],
    )?;
    Ok(deleted > 0)
}

pub fn get_bookmarks(conn: &Connection, user_id: &str) -> StoreResult<Vec<Article>> {
    let ids = select_ids(
        conn,
        "SELECT article_id FROM bookmarks WHERE user_id = ?1 ORDER BY rowid",
        user_id,
    )?;
    let mut seen = std::collections::HashSet::new();
    let mut articles = Vec::new();
    for id in ids {
        if !seen.insert(id.clone()) {
            continue;
        }
        if let Some(article) = get_article(conn, &id)? {
            articles.push(article);
        }
    }
    Ok(articles)
}

// --- Likes ---

/// Counter table and like column for a target kind.
fn like_columns(target: &LikeTarget) -> (&'static str, &'static str, &str) {
    match target {
        LikeTarget::Article(id) => ("articles", "article_id", id),
        LikeTarget::Comment(id) => ("comments", "comment_id", id),
    }
}

pub fn like(conn: &mut Connection, user_id: &str, target: LikeTarget) -> StoreResult<Like> {
    let like = Like {
        id: new_id(),
        user_id: user_id.to_string(),
        target,
        created_at: now(),
    };
    let (table, _, target_id) = like_columns(&like.target);
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO likes (id, user_id, article_id, comment_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            like.id,
            user_id,
            like.target.article_id(),
            like.target.comment_id(),
            ts(&like.created_at),
        ],
    )?;
    let bumped = tx.execute(
        &format!("UPDATE {table} SET likes = likes + 1 WHERE id = ?1"),
        params![target_id],
    )?;
    tx.commit()?;
    if bumped == 0 {
        warn!(target_id, table, "like recorded on missing row");
    }
    Ok(like)
}

pub fn unlike(conn: &mut Connection, user_id: &str, target: &LikeTarget) -> StoreResult<bool> {
    let (table, column, target_id) = like_columns(target);
    let tx = conn.transaction()?;
    let deleted = tx.execute(
        &format!(
            "DELETE FROM likes WHERE id = (
                 SELECT id FROM likes WHERE user_id = ?1 AND {column} = ?2
                 ORDER BY rowid LIMIT 1
             )"
        ),
        params![user_id, target_id],
    )?;
    if deleted == 0 {
        return Ok(false);
    }
    tx.execute(
        &format!("UPDATE {table} SET likes = MAX(likes - 1, 0) WHERE id = ?1"),
        params![target_id],
    )?;
    tx.commit()?;
    Ok(true)
}
