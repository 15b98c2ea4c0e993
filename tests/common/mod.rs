#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response};
use moviereviews::db;
use moviereviews::models::{director, genre, movie, movie_genres, review, user};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

// Helper to create a test database
pub async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

pub async fn create_test_user(db: &DatabaseConnection, username: &str, role: &str) -> i32 {
    create_test_user_with_hash(db, username, role, "hash".to_string()).await
}

pub async fn create_test_user_with_password(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> i32 {
    let hash = moviereviews::auth::hash_password(password).expect("Failed to hash password");
    create_test_user_with_hash(db, username, "user", hash).await
}

async fn create_test_user_with_hash(
    db: &DatabaseConnection,
    username: &str,
    role: &str,
    password_hash: String,
) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let account = user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(password_hash),
        role: Set(role.to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    account.insert(db).await.expect("Failed to create user").id
}

pub async fn create_test_genre(db: &DatabaseConnection, name: &str) -> i32 {
    genre::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create genre")
    .id
}

pub async fn create_test_director(db: &DatabaseConnection, name: &str) -> i32 {
    director::ActiveModel {
        name: Set(name.to_string()),
        bio: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create director")
    .id
}

pub async fn create_test_movie(
    db: &DatabaseConnection,
    title: &str,
    year: i32,
    director_id: Option<i32>,
    genre_ids: &[i32],
) -> i32 {
    let created = movie::ActiveModel {
        title: Set(title.to_string()),
        description: Set(format!("About {}", title)),
        year: Set(year),
        director_id: Set(director_id),
        imdb_id: Set(None),
        image: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create movie");

    for &genre_id in genre_ids {
        movie_genres::ActiveModel {
            movie_id: Set(created.id),
            genre_id: Set(genre_id),
        }
        .insert(db)
        .await
        .expect("Failed to link genre");
    }

    created.id
}

pub async fn create_test_review(
    db: &DatabaseConnection,
    user_id: i32,
    movie_id: i32,
    title: &str,
    rating: i32,
) -> i32 {
    review::ActiveModel {
        user_id: Set(user_id),
        movie_id: Set(movie_id),
        title: Set(title.to_string()),
        content: Set("Worth watching".to_string()),
        rating: Set(rating),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        approved: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create review")
    .id
}

/// Session cookie header value for an existing account
pub fn session_for(user_id: i32, username: &str, role: &str) -> String {
    let token = moviereviews::auth::create_jwt(user_id, username, role)
        .expect("Failed to create token");
    format!("{}={}", moviereviews::auth::SESSION_COOKIE, token)
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri).method("GET");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .uri(uri)
        .method("POST")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}
