// Web server — Axum JSON API over the DataStore.
//
// Every /api/* route answers JSON. There is no authentication: the acting
// user for likes, bookmarks and follows is named in the request body.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{header, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::db::DataStore;

pub mod error;
pub mod extract;
pub mod handlers;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DataStore>,
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(store: Arc<dyn DataStore>, port: u16, bind: &str) -> Result<()> {
    let app = build_router(AppState { store });

    let addr = format!("{bind}:{port}");
    info!("QuillSpace API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    use handlers::{articles, comments, engagement, search, users};

    let api = Router::new()
        .route(
            "/api/articles",
            get(articles::list_articles).post(articles::create_article),
        )
        .route("/api/articles/featured", get(articles::featured_articles))
        .route(
            "/api/articles/{id}",
            get(articles::get_article)
                .put(articles::update_article)
                .delete(articles::delete_article),
        )
        .route("/api/articles/{id}/comments", get(articles::article_comments))
        .route(
            "/api/articles/{id}/like",
            post(engagement::like_article).delete(engagement::unlike_article),
        )
        .route(
            "/api/articles/{id}/bookmark",
            post(engagement::bookmark_article).delete(engagement::unbookmark_article),
        )
        .route("/api/comments", post(comments::create_comment))
        .route(
            "/api/comments/{id}/like",
            post(engagement::like_comment).delete(engagement::unlike_comment),
        )
        .route("/api/users", post(users::create_user))
        .route(
            "/api/users/{id}",
            get(users::get_user).put(users::update_user),
        )
        .route("/api/users/{id}/articles", get(users::user_articles))
        .route("/api/users/{id}/bookmarks", get(engagement::list_bookmarks))
        .route(
            "/api/users/{id}/follow",
            post(engagement::follow_user).delete(engagement::unfollow_user),
        )
        .route("/api/users/{id}/followers", get(engagement::list_followers))
        .route("/api/users/{id}/following", get(engagement::list_following))
        .route("/api/search", get(search::search_articles));

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness check, always 200 OK.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({ "status": "ok" })),
    )
}
