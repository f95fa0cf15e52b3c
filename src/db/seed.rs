// Sample data — two authors and one published article each.
//
// The follower counts on the sample users are display values; no Follow rows
// back them.

use chrono::{DateTime, TimeZone, Utc};
use tracing::info;

use super::error::StoreResult;
use super::models::{now, Article, User};
use super::traits::DataStore;

fn seed_date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .earliest()
        .unwrap_or_default()
}

pub fn sample_users() -> Vec<User> {
    let created_at = now();
    vec![
        User {
            id: "user-1".to_string(),
            username: "sarahchen".to_string(),
            email: "sarah@example.com".to_string(),
            password: "hashed_password".to_string(),
            name: "Sarah Chen".to_string(),
            bio: Some("Mindful writer & digital wellness advocate".to_string()),
            avatar: Some(
                "https://images.unsplash.com/photo-1494790108755-2616b9c96c0d?w=150&h=150&fit=crop&crop=face"
                    .to_string(),
            ),
            is_verified: true,
            follower_count: 2400,
            following_count: 847,
            created_at,
        },
        User {
            id: "user-2".to_string(),
            username: "marcusrodriguez".to_string(),
            email: "marcus@example.com".to_string(),
            password: "hashed_password".to_string(),
            name: "Marcus Rodriguez".to_string(),
            bio: Some("Building a Sustainable Creative Practice".to_string()),
            avatar: Some(
                "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=150&h=150&fit=crop&crop=face"
                    .to_string(),
            ),
            is_verified: true,
            follower_count: 1800,
            following_count: 423,
            created_at,
        },
    ]
}

pub fn sample_articles() -> Vec<Article> {
    vec![
        Article {
            id: "article-1".to_string(),
            title: "The Art of Mindful Writing: Finding Your Voice in the Digital Age".to_string(),
            content: "In today's fast-paced digital world, the art of mindful writing has become \
                      more important than ever. As we navigate through countless distractions and \
                      information overload, finding moments of clarity and authentic expression \
                      through writing can serve as both a creative outlet and a form of meditation.\n\n\
                      Writing mindfully isn't just about putting words on paper; it's about creating \
                      a deeper connection with our thoughts, emotions, and the stories we want to \
                      tell. It requires us to slow down, breathe, and truly listen to our inner voice.\n\n\
                      When we approach writing with mindfulness, we begin to notice the subtle rhythms \
                      of our language, the weight of our words, and the spaces between our thoughts. \
                      This awareness transforms not only how we write, but what we choose to write about."
                .to_string(),
            excerpt: "In a world saturated with content, discovering your authentic voice as a \
                      writer has become both more challenging and more essential than ever..."
                .to_string(),
            author_id: "user-1".to_string(),
            category: "Writing".to_string(),
            tags: Some(vec![
                "writing".to_string(),
                "mindfulness".to_string(),
                "creativity".to_string(),
            ]),
            read_time: 8,
            likes: 247,
            views: 1234,
            comment_count: 18,
            is_published: true,
            featured_image: Some(
                "https://images.unsplash.com/photo-1455390582262-044cdead277a?w=800&h=500&fit=crop"
                    .to_string(),
            ),
            created_at: seed_date(2024, 12, 15),
            updated_at: seed_date(2024, 12, 15),
        },
        Article {
            id: "article-2".to_string(),
            title: "Building a Sustainable Creative Practice in Remote Work Era".to_string(),
            content: "The shift to remote work has fundamentally changed how creatives approach \
                      their craft. Here's how to build habits that actually stick and create \
                      meaningful work from anywhere."
                .to_string(),
            excerpt: "The shift to remote work has fundamentally changed how creatives approach \
                      their craft. Here's how to build habits that actually stick..."
                .to_string(),
            author_id: "user-2".to_string(),
            category: "Productivity".to_string(),
            tags: Some(vec![
                "productivity".to_string(),
                "remote work".to_string(),
                "creativity".to_string(),
            ]),
            read_time: 12,
            likes: 189,
            views: 892,
            comment_count: 24,
            is_published: true,
            featured_image: Some(
                "https://images.unsplash.com/photo-1519389950473-47ba0277781c?w=800&h=500&fit=crop"
                    .to_string(),
            ),
            created_at: seed_date(2024, 12, 14),
            updated_at: seed_date(2024, 12, 14),
        },
    ]
}

/// Load the sample data into `store` unless it already holds users.
///
/// Returns true if rows were inserted.
pub async fn seed_if_empty(store: &dyn DataStore) -> StoreResult<bool> {
    if store.stats().await?.users > 0 {
        return Ok(false);
    }
    for user in sample_users() {
        store.insert_user_record(&user).await?;
    }
    for article in sample_articles() {
        store.insert_article_record(&article).await?;
    }
    info!("Seeded sample users and articles");
    Ok(true)
}
