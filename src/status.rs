// System status display — backend, row counts, sample data presence.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;

use crate::config::{Config, StorageBackend};
use crate::db::DataStore;

/// Display system status to the terminal.
pub async fn show(config: &Config, store: &Arc<dyn DataStore>) -> Result<()> {
    match config.storage {
        StorageBackend::Memory => {
            println!("Storage: {} (data is lost on exit)", "memory".bold());
        }
        StorageBackend::Sqlite => {
            let file_size = std::fs::metadata(Path::new(&config.db_path))
                .map(|m| format_bytes(m.len()))
                .unwrap_or_else(|_| "unknown".to_string());
            println!("Storage: {} at {} ({})", "sqlite".bold(), config.db_path, file_size);
        }
    }

    let stats = store.stats().await?;
    println!(
        "Users: {}   Articles: {} ({} published)   Comments: {}",
        stats.users, stats.articles, stats.published_articles, stats.comments
    );
    println!(
        "Follows: {}   Bookmarks: {}   Likes: {}",
        stats.follows, stats.bookmarks, stats.likes
    );

    if stats.users == 0 {
        println!("{}", "Store is empty. Sample data loads on the next `serve`.".dimmed());
    }

    let featured = store.get_featured_articles().await?;
    if !featured.is_empty() {
        println!("Featured articles:");
        for article in &featured {
            println!(
                "  {} ({} likes, {} views)",
                article.title, article.likes, article.views
            );
        }
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
