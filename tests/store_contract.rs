// Store contract tests — the observable behavior every DataStore backend
// must share. Each test runs against all compiled-in backends, starting from
// the sample data (two users, two published articles).

mod common;

use std::collections::HashSet;

use common::{new_article, new_comment, new_user, stores};
use quillspace::db::models::{ArticlePatch, UserPatch};
use quillspace::db::StoreError;

// ============================================================
// Articles: views, pagination, featured, category, search
// ============================================================

#[tokio::test]
async fn each_fetch_counts_exactly_one_view() {
    for (name, store) in stores().await {
        let before = store.find_article("article-1").await.unwrap().unwrap().views;
        let first = store.get_article("article-1").await.unwrap().unwrap();
        assert_eq!(first.views, before + 1, "{name}");
        let second = store.get_article("article-1").await.unwrap().unwrap();
        assert_eq!(second.views, before + 2, "{name}");
        // find_article is a pure read
        let peek = store.find_article("article-1").await.unwrap().unwrap();
        assert_eq!(peek.views, before + 2, "{name}");
        assert!(store.get_article("nope").await.unwrap().is_none(), "{name}");
    }
}

#[tokio::test]
async fn pages_reconstruct_the_published_set_newest_first() {
    for (name, store) in stores().await {
        for i in 0..5 {
            store
                .create_article(new_article("user-1", &format!("Post {i}"), "Writing", true))
                .await
                .unwrap();
        }
        store
            .create_article(new_article("user-1", "Draft", "Writing", false))
            .await
            .unwrap();

        let all = store.get_articles(100, 0, None).await.unwrap();
        assert_eq!(all.len(), 7, "{name}");
        assert!(all.iter().all(|a| a.is_published), "{name}");
        assert!(
            all.windows(2).all(|w| w[0].created_at >= w[1].created_at),
            "{name}: not newest first"
        );

        let mut paged = Vec::new();
        let mut offset = 0;
        loop {
            let page = store.get_articles(3, offset, None).await.unwrap();
            if page.is_empty() {
                break;
            }
            assert!(page.len() <= 3, "{name}");
            offset += page.len();
            paged.extend(page);
        }
        let ids = |v: &[quillspace::db::models::Article]| -> Vec<String> {
            v.iter().map(|a| a.id.clone()).collect()
        };
        assert_eq!(ids(&paged), ids(&all), "{name}");

        assert!(store.get_articles(10, 50, None).await.unwrap().is_empty(), "{name}");
    }
}

#[tokio::test]
async fn equal_timestamps_list_later_insert_first() {
    for (name, store) in stores().await {
        let mut older = quillspace::db::seed::sample_articles().remove(0);
        older.id = "twin-a".to_string();
        let mut newer = older.clone();
        newer.id = "twin-b".to_string();
        store.insert_article_record(&older).await.unwrap();
        store.insert_article_record(&newer).await.unwrap();

        let by_author = store.get_articles_by_author("user-1").await.unwrap();
        let ids: Vec<&str> = by_author.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["twin-b", "twin-a", "article-1"], "{name}");
    }
}

#[tokio::test]
async fn reinserting_a_record_keeps_its_place() {
    for (name, store) in stores().await {
        let mut older = quillspace::db::seed::sample_articles().remove(0);
        older.id = "twin-a".to_string();
        let mut newer = older.clone();
        newer.id = "twin-b".to_string();
        store.insert_article_record(&older).await.unwrap();
        store.insert_article_record(&newer).await.unwrap();

        older.title = "Rewritten".to_string();
        store.insert_article_record(&older).await.unwrap();

        let by_author = store.get_articles_by_author("user-1").await.unwrap();
        let ids: Vec<&str> = by_author.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["twin-b", "twin-a", "article-1"], "{name}");
        assert_eq!(by_author[1].title, "Rewritten", "{name}");
    }
}

#[tokio::test]
async fn featured_is_top_six_by_likes() {
    for (name, store) in stores().await {
        for i in 0..6 {
            store
                .create_article(new_article("user-2", &format!("Extra {i}"), "Design", true))
                .await
                .unwrap();
        }
        let featured = store.get_featured_articles().await.unwrap();
        assert_eq!(featured.len(), 6, "{name}");
        assert!(
            featured.windows(2).all(|w| w[0].likes >= w[1].likes),
            "{name}: not sorted by likes"
        );
        assert_eq!(featured[0].id, "article-1", "{name}");
        assert_eq!(featured[1].id, "article-2", "{name}");
    }
}

#[tokio::test]
async fn featured_ties_keep_insertion_order() {
    for (name, store) in stores().await {
        let a = store
            .create_article(new_article("user-1", "Tie A", "Misc", true))
            .await
            .unwrap();
        let b = store
            .create_article(new_article("user-1", "Tie B", "Misc", true))
            .await
            .unwrap();
        let featured = store.get_featured_articles().await.unwrap();
        let ids: Vec<&str> = featured.iter().map(|x| x.id.as_str()).collect();
        assert_eq!(ids, vec!["article-1", "article-2", a.id.as_str(), b.id.as_str()], "{name}");
    }
}

#[tokio::test]
async fn category_filter_is_case_insensitive_exact() {
    for (name, store) in stores().await {
        store
            .create_article(new_article("user-1", "Hidden", "Writing", false))
            .await
            .unwrap();
        store
            .create_article(new_article("user-1", "Near miss", "Writings", true))
            .await
            .unwrap();

        for category in ["writing", "WRITING", "Writing"] {
            let found = store.get_articles(10, 0, Some(category)).await.unwrap();
            let ids: Vec<&str> = found.iter().map(|a| a.id.as_str()).collect();
            assert_eq!(ids, vec!["article-1"], "{name}: {category}");
        }
        let unfiltered = store.get_articles(10, 0, Some("")).await.unwrap();
        assert_eq!(unfiltered.len(), 3, "{name}");
    }
}

#[tokio::test]
async fn search_matches_title_and_tags_but_not_drafts() {
    for (name, store) in stores().await {
        let mut draft = new_article("user-1", "Mindful drafts", "Writing", false);
        draft.tags = Some(vec!["mindfulness".to_string()]);
        store.create_article(draft).await.unwrap();

        let by_title = store.search_articles("MINDFUL WRITING").await.unwrap();
        let ids: Vec<&str> = by_title.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["article-1"], "{name}");

        let mut tagged = new_article("user-2", "Garden notes", "Nature", true);
        tagged.tags = Some(vec!["Quillwort".to_string()]);
        let tagged = store.create_article(tagged).await.unwrap();
        let by_tag = store.search_articles("quillwort").await.unwrap();
        let ids: Vec<&str> = by_tag.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec![tagged.id.as_str()], "{name}");

        let shared = store.search_articles("creativity").await.unwrap();
        let ids: Vec<&str> = shared.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["article-1", "article-2"], "{name}");

        assert!(store.search_articles("zzzz").await.unwrap().is_empty(), "{name}");
    }
}

#[tokio::test]
async fn create_article_applies_defaults() {
    for (name, store) in stores().await {
        let mut input = new_article("user-1", "Defaults", "Writing", false);
        input.is_published = None;
        let article = store.create_article(input).await.unwrap();
        assert!(!article.is_published, "{name}");
        assert_eq!((article.likes, article.views, article.comment_count), (0, 0, 0), "{name}");
        assert!(article.tags.is_none(), "{name}");
        assert!(article.featured_image.is_none(), "{name}");
        assert_eq!(article.created_at, article.updated_at, "{name}");
    }
}

#[tokio::test]
async fn update_article_merges_and_refreshes_updated_at() {
    for (name, store) in stores().await {
        let before = store.find_article("article-2").await.unwrap().unwrap();
        let patch = ArticlePatch {
            title: Some("Renamed".to_string()),
            featured_image: Some(None),
            ..ArticlePatch::default()
        };
        let after = store.update_article("article-2", patch).await.unwrap().unwrap();
        assert_eq!(after.title, "Renamed", "{name}");
        assert!(after.featured_image.is_none(), "{name}");
        assert_eq!(after.content, before.content, "{name}");
        assert_eq!(after.likes, before.likes, "{name}");
        assert_eq!(after.created_at, before.created_at, "{name}");
        assert!(after.updated_at > before.updated_at, "{name}");
        assert_eq!(store.find_article("article-2").await.unwrap().unwrap(), after, "{name}");

        let missing = store
            .update_article("nope", ArticlePatch::default())
            .await
            .unwrap();
        assert!(missing.is_none(), "{name}");
    }
}

#[tokio::test]
async fn delete_article_reports_whether_it_removed() {
    for (name, store) in stores().await {
        assert!(store.delete_article("article-2").await.unwrap(), "{name}");
        assert!(!store.delete_article("article-2").await.unwrap(), "{name}");
        assert!(store.find_article("article-2").await.unwrap().is_none(), "{name}");
    }
}

#[tokio::test]
async fn delete_article_with_engagement_rows() {
    for (name, store) in stores().await {
        store
            .create_comment(new_comment("user-2", "article-1", "Keeper"))
            .await
            .unwrap();
        store.like_article("user-2", "article-1").await.unwrap();
        store.bookmark_article("user-2", "article-1").await.unwrap();

        assert!(store.delete_article("article-1").await.unwrap(), "{name}");
        assert!(store.find_article("article-1").await.unwrap().is_none(), "{name}");

        // Rows pointing at the article outlive it
        let thread = store.get_comments_by_article("article-1").await.unwrap();
        assert_eq!(thread.len(), 1, "{name}");
        assert!(store.get_bookmarks("user-2").await.unwrap().is_empty(), "{name}");
    }
}

#[tokio::test]
async fn engagement_with_unknown_ids_succeeds() {
    for (name, store) in stores().await {
        store.follow_user("ghost", "user-1").await.unwrap();
        store.bookmark_article("ghost", "missing").await.unwrap();
        store.like_article("ghost", "missing").await.unwrap();
        store.like_comment("ghost", "missing").await.unwrap();
        assert!(store.unlike_article("ghost", "missing").await.unwrap(), "{name}");
    }
}

// ============================================================
// Comments
// ============================================================

#[tokio::test]
async fn comments_bump_count_and_list_oldest_first() {
    for (name, store) in stores().await {
        let before = store.find_article("article-1").await.unwrap().unwrap().comment_count;
        let first = store
            .create_comment(new_comment("user-2", "article-1", "First!"))
            .await
            .unwrap();
        let second = store
            .create_comment(new_comment("user-1", "article-1", "Thanks"))
            .await
            .unwrap();
        let after = store.find_article("article-1").await.unwrap().unwrap().comment_count;
        assert_eq!(after, before + 2, "{name}");

        let thread = store.get_comments_by_article("article-1").await.unwrap();
        let ids: Vec<&str> = thread.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec![first.id.as_str(), second.id.as_str()], "{name}");
        assert!(first.parent_id.is_none(), "{name}");
        assert_eq!(first.likes, 0, "{name}");
    }
}

#[tokio::test]
async fn comment_on_missing_article_is_stored_without_counter() {
    for (name, store) in stores().await {
        let comment = store
            .create_comment(new_comment("user-1", "ghost", "Hello?"))
            .await
            .unwrap();
        let thread = store.get_comments_by_article("ghost").await.unwrap();
        assert_eq!(thread.len(), 1, "{name}");
        assert_eq!(thread[0].id, comment.id, "{name}");
    }
}

// ============================================================
// Follows
// ============================================================

#[tokio::test]
async fn follow_and_unfollow_move_both_counters() {
    for (name, store) in stores().await {
        let a0 = store.get_user("user-1").await.unwrap().unwrap();
        let b0 = store.get_user("user-2").await.unwrap().unwrap();

        store.follow_user("user-1", "user-2").await.unwrap();
        let a1 = store.get_user("user-1").await.unwrap().unwrap();
        let b1 = store.get_user("user-2").await.unwrap().unwrap();
        assert_eq!(a1.following_count, a0.following_count + 1, "{name}");
        assert_eq!(b1.follower_count, b0.follower_count + 1, "{name}");

        assert!(store.unfollow_user("user-1", "user-2").await.unwrap(), "{name}");
        let a2 = store.get_user("user-1").await.unwrap().unwrap();
        let b2 = store.get_user("user-2").await.unwrap().unwrap();
        assert_eq!(a2.following_count, a0.following_count, "{name}");
        assert_eq!(b2.follower_count, b0.follower_count, "{name}");

        assert!(!store.unfollow_user("user-1", "user-2").await.unwrap(), "{name}");
    }
}

#[tokio::test]
async fn unfollow_floors_counters_at_zero() {
    for (name, store) in stores().await {
        let a = store.create_user(new_user("alice")).await.unwrap();
        let b = store.create_user(new_user("bob")).await.unwrap();
        store.follow_user(&a.id, &b.id).await.unwrap();
        // Reset the counters underneath the edge
        let mut reset = store.get_user(&a.id).await.unwrap().unwrap();
        reset.following_count = 0;
        store.insert_user_record(&reset).await.unwrap();

        assert!(store.unfollow_user(&a.id, &b.id).await.unwrap(), "{name}");
        let a1 = store.get_user(&a.id).await.unwrap().unwrap();
        let b1 = store.get_user(&b.id).await.unwrap().unwrap();
        assert_eq!(a1.following_count, 0, "{name}");
        assert_eq!(b1.follower_count, 0, "{name}");
    }
}

#[tokio::test]
async fn followers_and_following_resolve_users() {
    for (name, store) in stores().await {
        let carol = store.create_user(new_user("carol")).await.unwrap();
        store.follow_user(&carol.id, "user-1").await.unwrap();
        store.follow_user("user-2", "user-1").await.unwrap();
        store.follow_user(&carol.id, "user-1").await.unwrap();
        store.follow_user("ghost", "user-1").await.unwrap();

        let followers = store.get_followers("user-1").await.unwrap();
        let ids: Vec<&str> = followers.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec![carol.id.as_str(), "user-2"], "{name}");

        let following = store.get_following(&carol.id).await.unwrap();
        let ids: Vec<&str> = following.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["user-1"], "{name}");

        // Duplicate edges each count
        let sarah = store.get_user("user-1").await.unwrap().unwrap();
        assert_eq!(sarah.follower_count, 2400 + 3, "{name}");
    }
}

// ============================================================
// Likes and bookmarks
// ============================================================

#[tokio::test]
async fn like_unlike_round_trip() {
    for (name, store) in stores().await {
        let before = store.find_article("article-2").await.unwrap().unwrap().likes;
        let like = store.like_article("user-1", "article-2").await.unwrap();
        assert_eq!(like.target.article_id(), Some("article-2"), "{name}");
        assert_eq!(
            store.find_article("article-2").await.unwrap().unwrap().likes,
            before + 1,
            "{name}"
        );

        assert!(store.unlike_article("user-1", "article-2").await.unwrap(), "{name}");
        assert_eq!(
            store.find_article("article-2").await.unwrap().unwrap().likes,
            before,
            "{name}"
        );
        assert!(!store.unlike_article("user-1", "article-2").await.unwrap(), "{name}");
    }
}

#[tokio::test]
async fn comment_likes_are_separate_from_article_likes() {
    for (name, store) in stores().await {
        let comment = store
            .create_comment(new_comment("user-2", "article-1", "Nice"))
            .await
            .unwrap();
        let article_likes = store.find_article("article-1").await.unwrap().unwrap().likes;

        let like = store.like_comment("user-1", &comment.id).await.unwrap();
        assert_eq!(like.target.comment_id(), Some(comment.id.as_str()), "{name}");
        let thread = store.get_comments_by_article("article-1").await.unwrap();
        assert_eq!(thread[0].likes, 1, "{name}");
        assert_eq!(
            store.find_article("article-1").await.unwrap().unwrap().likes,
            article_likes,
            "{name}"
        );

        // An article like with the same id does not undo a comment like
        assert!(!store.unlike_article("user-1", &comment.id).await.unwrap(), "{name}");
        assert!(store.unlike_comment("user-1", &comment.id).await.unwrap(), "{name}");
        let thread = store.get_comments_by_article("article-1").await.unwrap();
        assert_eq!(thread[0].likes, 0, "{name}");
    }
}

#[tokio::test]
async fn bookmarks_resolve_in_order_without_repeats() {
    for (name, store) in stores().await {
        store.bookmark_article("user-1", "article-2").await.unwrap();
        store.bookmark_article("user-1", "ghost").await.unwrap();
        store.bookmark_article("user-1", "article-1").await.unwrap();
        store.bookmark_article("user-1", "article-2").await.unwrap();

        let saved = store.get_bookmarks("user-1").await.unwrap();
        let ids: Vec<&str> = saved.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["article-2", "article-1"], "{name}");

        assert!(store.unbookmark_article("user-1", "article-2").await.unwrap(), "{name}");
        assert!(store.unbookmark_article("user-1", "article-2").await.unwrap(), "{name}");
        assert!(!store.unbookmark_article("user-1", "article-2").await.unwrap(), "{name}");
        assert!(store.get_bookmarks("user-2").await.unwrap().is_empty(), "{name}");
    }
}

// ============================================================
// Users
// ============================================================

#[tokio::test]
async fn create_user_defaults_and_lookups() {
    for (name, store) in stores().await {
        let mut input = new_user("dana");
        input.bio = Some(String::new());
        let user = store.create_user(input).await.unwrap();
        assert!(!user.is_verified, "{name}");
        assert!(user.bio.is_none(), "{name}");
        assert_eq!((user.follower_count, user.following_count), (0, 0), "{name}");

        let by_name = store.get_user_by_username("dana").await.unwrap().unwrap();
        let by_email = store.get_user_by_email("dana@example.com").await.unwrap().unwrap();
        assert_eq!(by_name, user, "{name}");
        assert_eq!(by_email, user, "{name}");
        assert!(store.get_user_by_username("nobody").await.unwrap().is_none(), "{name}");
    }
}

#[tokio::test]
async fn duplicate_username_or_email_is_rejected() {
    for (name, store) in stores().await {
        let err = store.create_user(new_user("sarahchen")).await.unwrap_err();
        assert!(
            matches!(err, StoreError::DuplicateKey { field: "username", .. }),
            "{name}: {err}"
        );

        let mut input = new_user("someone");
        input.email = "marcus@example.com".to_string();
        let err = store.create_user(input).await.unwrap_err();
        assert!(
            matches!(err, StoreError::DuplicateKey { field: "email", .. }),
            "{name}: {err}"
        );

        let patch = UserPatch {
            username: Some("marcusrodriguez".to_string()),
            ..UserPatch::default()
        };
        let err = store.update_user("user-1", patch).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }), "{name}: {err}");

        // Keeping your own username is fine
        let patch = UserPatch {
            username: Some("sarahchen".to_string()),
            ..UserPatch::default()
        };
        assert!(store.update_user("user-1", patch).await.unwrap().is_some(), "{name}");
        assert!(
            store
                .update_user("nope", UserPatch::default())
                .await
                .unwrap()
                .is_none(),
            "{name}"
        );
    }
}

#[tokio::test]
async fn ids_are_unique_across_creates() {
    for (name, store) in stores().await {
        let mut seen = HashSet::new();
        for i in 0..20 {
            let a = store
                .create_article(new_article("user-1", &format!("Id {i}"), "Misc", true))
                .await
                .unwrap();
            assert!(seen.insert(a.id), "{name}");
        }
    }
}

#[tokio::test]
async fn stats_reflect_rows() {
    for (name, store) in stores().await {
        store.follow_user("user-1", "user-2").await.unwrap();
        store.bookmark_article("user-2", "article-1").await.unwrap();
        store
            .create_comment(new_comment("user-2", "article-1", "Hi"))
            .await
            .unwrap();
        let stats = store.stats().await.unwrap();
        assert_eq!(stats.users, 2, "{name}");
        assert_eq!(stats.articles, 2, "{name}");
        assert_eq!(stats.comments, 1, "{name}");
        assert_eq!(stats.follows, 1, "{name}");
        assert_eq!(stats.bookmarks, 1, "{name}");
        assert_eq!(stats.likes, 0, "{name}");
    }
}

// ============================================================
// Concurrency
// ============================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_likes_are_all_counted() {
    for (name, store) in stores().await {
        let before = store.find_article("article-1").await.unwrap().unwrap().likes;
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .like_article(&format!("reader-{i}"), "article-1")
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        let after = store.find_article("article-1").await.unwrap().unwrap().likes;
        assert_eq!(after, before + 32, "{name}");
    }
}
