// Database schema — table creation for the SQLite backend.
//
// Timestamps are stored as RFC 3339 text with microsecond precision in UTC,
// which sorts lexicographically in time order. Tags are a JSON array (or NULL).
// Rows may reference ids that don't exist (or no longer do), so the tables
// carry no foreign key constraints and `configure` switches enforcement off for
// databases created before that.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Per-connection settings, applied every time a connection is opened.
pub fn configure(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", "OFF")
        .context("Failed to disable foreign key enforcement")?;
    Ok(())
}

/// Create all tables if they don't exist yet.
///
/// This is idempotent — safe to call on every startup.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            name TEXT NOT NULL,
            bio TEXT,
            avatar TEXT,
            is_verified INTEGER NOT NULL DEFAULT 0,
            follower_count INTEGER NOT NULL DEFAULT 0,
            following_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS articles (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            excerpt TEXT NOT NULL,
            author_id TEXT NOT NULL,
            category TEXT NOT NULL,
            tags TEXT,                          -- JSON array of strings
            read_time INTEGER NOT NULL,
            likes INTEGER NOT NULL DEFAULT 0,
            views INTEGER NOT NULL DEFAULT 0,
            comment_count INTEGER NOT NULL DEFAULT 0,
            is_published INTEGER NOT NULL DEFAULT 0,
            featured_image TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS comments (
            id TEXT PRIMARY KEY,
            content TEXT NOT NULL,
            author_id TEXT NOT NULL,
            article_id TEXT NOT NULL,
            parent_id TEXT,
            likes INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );

        -- Directed edges; duplicate pairs are allowed
        CREATE TABLE IF NOT EXISTS follows (
            id TEXT PRIMARY KEY,
            follower_id TEXT NOT NULL,
            following_id TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS bookmarks (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            article_id TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        -- Exactly one of article_id / comment_id is set
        CREATE TABLE IF NOT EXISTS likes (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            article_id TEXT,
            comment_id TEXT,
            created_at TEXT NOT NULL,
            CHECK ((article_id IS NULL) <> (comment_id IS NULL))
        );

        CREATE INDEX IF NOT EXISTS idx_articles_published
            ON articles(is_published, created_at);

        CREATE INDEX IF NOT EXISTS idx_articles_author
            ON articles(author_id);

        CREATE INDEX IF NOT EXISTS idx_comments_article
            ON comments(article_id);

        CREATE INDEX IF NOT EXISTS idx_follows_pair
            ON follows(follower_id, following_id);

        CREATE INDEX IF NOT EXISTS idx_bookmarks_user
            ON bookmarks(user_id);

        CREATE INDEX IF NOT EXISTS idx_likes_user
            ON likes(user_id);
        ",
    )
    .context("Failed to create database tables")?;

    Ok(())
}

/// Count user-created tables (excludes sqlite internals).
#[cfg(test)]
fn table_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}
