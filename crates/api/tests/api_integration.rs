//! API integration tests.
//!
//! These drive the full router against an in-memory database with the real
//! migrations applied.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use social_api::{AppState, app};
use social_common::config::ApiConfig;
use social_db::{entities::user, test_utils::TestDatabase};
use tower::ServiceExt;

async fn create_test_app() -> (TestDatabase, Router) {
    let db = TestDatabase::new().await.unwrap();
    let router = app(AppState::new(db.shared(), ApiConfig::default()));
    (db, router)
}

fn token(user: &user::Model) -> String {
    format!("Token {}", user.token.as_deref().unwrap())
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(auth) = auth {
        builder = builder.header("Authorization", auth);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_register_then_login() {
    let (_db, app) = create_test_app().await;

    let (status, registered) = send(
        &app,
        "POST",
        "/api/register",
        None,
        Some(json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "correct horse"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(registered["username"], "alice");
    assert!(registered.get("password").is_none());

    let (status, login) = send(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({"username": "alice", "password": "correct horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["token"], registered["token"]);
    assert_eq!(login["userId"], registered["id"]);

    let (status, _) = send(
        &app,
        "POST",
        "/api/register",
        None,
        Some(json!({
            "username": "alice",
            "email": "other@example.com",
            "password": "correct horse"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_with_bad_credentials() {
    let (_db, app) = create_test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({"username": "nobody", "password": "whatever"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid credentials");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let (_db, app) = create_test_app().await;

    for uri in ["/api/feed", "/api/notifications", "/api/profile", "/api/posts"] {
        let (status, body) = send(&app, "GET", uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    let (status, _) = send(&app, "GET", "/api/feed", Some("Token bogus"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_follow_toggle_and_notification() {
    let (db, app) = create_test_app().await;
    let alice = db.create_user("alice").await.unwrap();
    let bob = db.create_user("bob").await.unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/follow/{}", bob.id),
        Some(&token(&alice)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["action"], "followed");
    assert_eq!(body["detail"], "You are now following bob.");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/unfollow/{}", bob.id),
        Some(&token(&alice)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["action"], "unfollowed");

    let (status, notifications) =
        send(&app, "GET", "/api/notifications", Some(&token(&bob)), None).await;
    assert_eq!(status, StatusCode::OK);
    let notifications = notifications.as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["verb"], "followed");
    assert_eq!(notifications[0]["actorUsername"], "alice");
    assert_eq!(notifications[0]["targetType"], "user");
    assert_eq!(notifications[0]["read"], false);

    // Listing marked it read
    let (_, notifications) =
        send(&app, "GET", "/api/notifications", Some(&token(&bob)), None).await;
    assert_eq!(notifications[0]["read"], true);
}

#[tokio::test]
async fn test_follow_errors() {
    let (db, app) = create_test_app().await;
    let alice = db.create_user("alice").await.unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/follow/{}", alice.id),
        Some(&token(&alice)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "You cannot follow yourself.");

    let (status, _) = send(
        &app,
        "POST",
        "/api/follow/missing",
        Some(&token(&alice)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_like_toggle_status_codes() {
    let (db, app) = create_test_app().await;
    let alice = db.create_user("alice").await.unwrap();
    let bob = db.create_user("bob").await.unwrap();
    let post = db.create_post(&bob.id, "Hello", db.at(0)).await.unwrap();
    let uri = format!("/api/posts/{}/like", post.id);

    let (status, body) = send(&app, "POST", &uri, Some(&token(&alice)), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["detail"], "Post liked.");

    let (_, shown) = send(
        &app,
        "GET",
        &format!("/api/posts/{}", post.id),
        Some(&token(&alice)),
        None,
    )
    .await;
    assert_eq!(shown["likesCount"], 1);

    let (status, body) = send(&app, "POST", &uri, Some(&token(&alice)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detail"], "Post unliked.");

    let (status, _) = send(
        &app,
        "POST",
        "/api/posts/missing/like",
        Some(&token(&alice)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_post_crud_and_ownership() {
    let (db, app) = create_test_app().await;
    let alice = db.create_user("alice").await.unwrap();
    let bob = db.create_user("bob").await.unwrap();

    let (status, created) = send(
        &app,
        "POST",
        "/api/posts",
        Some(&token(&alice)),
        Some(json!({"title": "First", "content": "Hello world"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["authorUsername"], "alice");
    assert_eq!(created["likesCount"], 0);
    let post_uri = format!("/api/posts/{}", created["id"].as_str().unwrap());

    let (status, body) = send(
        &app,
        "PATCH",
        &post_uri,
        Some(&token(&bob)),
        Some(json!({"title": "Hijacked"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["detail"],
        "You do not have permission to perform this action."
    );

    let (status, updated) = send(
        &app,
        "PATCH",
        &post_uri,
        Some(&token(&alice)),
        Some(json!({"title": "Edited"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Edited");
    assert_eq!(updated["content"], "Hello world");

    let (status, _) = send(&app, "DELETE", &post_uri, Some(&token(&alice)), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &post_uri, Some(&token(&alice)), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_body_gets_json_error() {
    let (db, app) = create_test_app().await;
    let alice = db.create_user("alice").await.unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/posts",
        Some(&token(&alice)),
        Some(json!({"content": "no title"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["detail"].as_str().unwrap().contains("title"));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/register")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_post_listing_filters() {
    let (db, app) = create_test_app().await;
    let alice = db.create_user("alice").await.unwrap();
    let bob = db.create_user("bob").await.unwrap();
    db.create_post(&alice.id, "Apples", db.at(0)).await.unwrap();
    db.create_post(&bob.id, "Bananas", db.at(1)).await.unwrap();
    db.create_post(&alice.id, "Cherries", db.at(2)).await.unwrap();
    let auth = token(&alice);

    let titles = |body: &Value| -> Vec<String> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|p| p["title"].as_str().unwrap().to_string())
            .collect()
    };

    let (_, body) = send(&app, "GET", "/api/posts", Some(&auth), None).await;
    assert_eq!(titles(&body), vec!["Cherries", "Bananas", "Apples"]);

    let (_, body) = send(&app, "GET", "/api/posts?author=alice", Some(&auth), None).await;
    assert_eq!(titles(&body), vec!["Cherries", "Apples"]);

    let (_, body) = send(&app, "GET", "/api/posts?search=nan", Some(&auth), None).await;
    assert_eq!(titles(&body), vec!["Bananas"]);

    let (_, body) = send(&app, "GET", "/api/posts?ordering=title", Some(&auth), None).await;
    assert_eq!(titles(&body), vec!["Apples", "Bananas", "Cherries"]);

    let (_, body) = send(&app, "GET", "/api/posts?limit=1&offset=1", Some(&auth), None).await;
    assert_eq!(titles(&body), vec!["Bananas"]);

    let (_, body) = send(&app, "GET", "/api/posts?author=nobody", Some(&auth), None).await;
    assert!(titles(&body).is_empty());
}

#[tokio::test]
async fn test_comment_flow() {
    let (db, app) = create_test_app().await;
    let alice = db.create_user("alice").await.unwrap();
    let bob = db.create_user("bob").await.unwrap();
    let post = db.create_post(&bob.id, "Hello", db.at(0)).await.unwrap();

    let (status, comment) = send(
        &app,
        "POST",
        "/api/comments",
        Some(&token(&alice)),
        Some(json!({"post": post.id, "content": "Nice post"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["authorUsername"], "alice");
    assert_eq!(comment["post"], post.id.as_str());

    let (_, listed) = send(
        &app,
        "GET",
        &format!("/api/comments?post={}", post.id),
        Some(&token(&bob)),
        None,
    )
    .await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (_, shown) = send(
        &app,
        "GET",
        &format!("/api/posts/{}", post.id),
        Some(&token(&bob)),
        None,
    )
    .await;
    assert_eq!(shown["comments"][0]["content"], "Nice post");

    let (_, notifications) =
        send(&app, "GET", "/api/notifications", Some(&token(&bob)), None).await;
    assert_eq!(notifications[0]["verb"], "commented");
    assert_eq!(notifications[0]["targetType"], "comment");
    assert_eq!(notifications[0]["targetId"], comment["id"]);

    let comment_uri = format!("/api/comments/{}", comment["id"].as_str().unwrap());
    let (status, _) = send(&app, "DELETE", &comment_uri, Some(&token(&bob)), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "DELETE", &comment_uri, Some(&token(&alice)), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "POST",
        "/api/comments",
        Some(&token(&alice)),
        Some(json!({"post": "missing", "content": "Hi"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_feed_shows_followed_authors_only() {
    let (db, app) = create_test_app().await;
    let alice = db.create_user("alice").await.unwrap();
    let bob = db.create_user("bob").await.unwrap();
    let carol = db.create_user("carol").await.unwrap();
    db.create_post(&bob.id, "From bob", db.at(0)).await.unwrap();
    db.create_post(&carol.id, "From carol", db.at(1)).await.unwrap();
    db.create_post(&alice.id, "From alice", db.at(2)).await.unwrap();

    let (_, feed) = send(&app, "GET", "/api/feed", Some(&token(&alice)), None).await;
    assert!(feed.as_array().unwrap().is_empty());

    send(
        &app,
        "POST",
        &format!("/api/follow/{}", bob.id),
        Some(&token(&alice)),
        None,
    )
    .await;

    let (status, feed) = send(&app, "GET", "/api/feed", Some(&token(&alice)), None).await;
    assert_eq!(status, StatusCode::OK);
    let feed = feed.as_array().unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["title"], "From bob");
    assert_eq!(feed[0]["authorUsername"], "bob");
}

#[tokio::test]
async fn test_profile_update() {
    let (db, app) = create_test_app().await;
    let alice = db.create_user("alice").await.unwrap();
    let bob = db.create_user("bob").await.unwrap();

    send(
        &app,
        "POST",
        &format!("/api/follow/{}", alice.id),
        Some(&token(&bob)),
        None,
    )
    .await;

    let (status, profile) = send(
        &app,
        "PATCH",
        "/api/profile",
        Some(&token(&alice)),
        Some(json!({"bio": "Hello", "profilePicture": "https://example.com/a.png"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["bio"], "Hello");
    assert_eq!(profile["profilePicture"], "https://example.com/a.png");
    assert_eq!(profile["followers"], json!([bob.id]));

    let (status, _) = send(
        &app,
        "PATCH",
        "/api/profile",
        Some(&token(&alice)),
        Some(json!({"profilePicture": "not a url"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let (_db, app) = create_test_app().await;

    let (status, _) = send(&app, "GET", "/api/nonexistent", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
