mod common;

use axum::http::{header, StatusCode};
use common::*;
use moviereviews::domain::{CatalogRepository, ReviewRepository};
use moviereviews::infrastructure::AppState;
use moviereviews::models::{movie, reaction, review};
use moviereviews::modules::integrations::ImdbClient;
use moviereviews::views;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
use tower::util::ServiceExt; // for `oneshot`
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_root_redirects_to_movies() {
    let db = setup_test_db().await;
    let app = views::router(AppState::new(db));

    let response = app.oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(location(&response), "/movies/");
}

#[tokio::test]
async fn test_movie_list_ignores_malformed_filters() {
    let db = setup_test_db().await;
    let drama = create_test_genre(&db, "Drama").await;
    create_test_movie(&db, "Heat", 1995, None, &[drama]).await;
    create_test_movie(&db, "Clerks", 1994, None, &[]).await;
    let app = views::router(AppState::new(db));

    let response = app
        .clone()
        .oneshot(get("/movies/?genre=abc&year=", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Heat"));
    assert!(html.contains("Clerks"));

    let response = app
        .oneshot(get(&format!("/movies/?genre={}", drama), None))
        .await
        .unwrap();
    let html = body_text(response).await;
    assert!(html.contains("Heat"));
    assert!(!html.contains("Clerks"));
}

#[tokio::test]
async fn test_unknown_movie_is_404() {
    let db = setup_test_db().await;
    let app = views::router(AppState::new(db));

    let response = app.clone().oneshot(get("/movies/77/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get("/no/such/page/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_page() {
    let db = setup_test_db().await;
    create_test_movie(&db, "The Matrix", 1999, None, &[]).await;
    create_test_movie(&db, "Alien", 1979, None, &[]).await;
    let app = views::router(AppState::new(db));

    let response = app
        .oneshot(get("/search/?search_text=MATRIX", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("The Matrix"));
    assert!(!html.contains("Alien"));
}

#[tokio::test]
async fn test_anonymous_user_redirected_to_login() {
    let db = setup_test_db().await;
    let movie_id = create_test_movie(&db, "Alien", 1979, None, &[]).await;
    let app = views::router(AppState::new(db.clone()));

    let uri = format!("/movies/{}/review/", movie_id);
    let response = app
        .clone()
        .oneshot(post_form(&uri, "title=t&content=c&rating=3", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        format!("/accounts/login/?next=%2Fmovies%2F{}%2Freview%2F", movie_id)
    );

    let response = app.oneshot(get("/my-reviews/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/accounts/login/"));

    assert_eq!(review::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_register_login_and_review() {
    let db = setup_test_db().await;
    let movie_id = create_test_movie(&db, "Alien", 1979, None, &[]).await;
    let app = views::router(AppState::new(db.clone()));

    // 1. Register
    let response = app
        .clone()
        .oneshot(post_form(
            "/accounts/register/",
            "username=ellen&password1=nostromo79&password2=nostromo79",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/accounts/login/");

    // 2. Wrong password re-renders the form
    let response = app
        .clone()
        .oneshot(post_form(
            "/accounts/login/",
            "username=ellen&password=wrong-one&next=",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    // 3. Login honours `next`
    let next = format!("%2Fmovies%2F{}%2F", movie_id);
    let response = app
        .clone()
        .oneshot(post_form(
            "/accounts/login/",
            &format!("username=ellen&password=nostromo79&next={}", next),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/movies/{}/", movie_id));

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("session cookie");
    assert!(set_cookie.contains("HttpOnly"));
    let cookie = set_cookie.split(';').next().unwrap().to_string();

    // 4. Post a review
    let response = app
        .clone()
        .oneshot(post_form(
            &format!("/movies/{}/review/", movie_id),
            "title=In+space&content=No+one+can+hear+you+scream&rating=5",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/movies/{}/", movie_id));

    let response = app
        .oneshot(get(&format!("/movies/{}/", movie_id), Some(&cookie)))
        .await
        .unwrap();
    let html = body_text(response).await;
    assert!(html.contains("In space"));
    assert!(html.contains("ellen"));
}

#[tokio::test]
async fn test_duplicate_registration_shows_error() {
    let db = setup_test_db().await;
    create_test_user(&db, "ellen", "user").await;
    let app = views::router(AppState::new(db));

    let response = app
        .oneshot(post_form(
            "/accounts/register/",
            "username=ellen&password1=nostromo79&password2=nostromo79",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("A user with that username already exists."));
}

#[tokio::test]
async fn test_invalid_rating_rerenders_form() {
    let db = setup_test_db().await;
    let user_id = create_test_user(&db, "alice", "user").await;
    let movie_id = create_test_movie(&db, "Alien", 1979, None, &[]).await;
    let cookie = session_for(user_id, "alice", "user");
    let app = views::router(AppState::new(db.clone()));

    for rating in ["0", "6", "five"] {
        let response = app
            .clone()
            .oneshot(post_form(
                &format!("/movies/{}/review/", movie_id),
                &format!("title=Bad&content=Bad&rating={}", rating),
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "rating {}", rating);
        let html = body_text(response).await;
        assert!(html.contains("Select a valid choice."));
    }

    assert_eq!(review::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_reaction_route_overwrites_previous_vote() {
    let db = setup_test_db().await;
    let author = create_test_user(&db, "alice", "user").await;
    let voter = create_test_user(&db, "bob", "user").await;
    let movie_id = create_test_movie(&db, "Alien", 1979, None, &[]).await;
    let review_id = create_test_review(&db, author, movie_id, "Scary", 5).await;
    let cookie = session_for(voter, "bob", "user");
    let app = views::router(AppState::new(db.clone()));

    for kind in ["like", "dislike", "meh"] {
        let response = app
            .clone()
            .oneshot(post_form(
                &format!("/reviews/{}/reaction/{}/", review_id, kind),
                "",
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), format!("/movies/{}/", movie_id));
    }

    let reactions = reaction::Entity::find().all(&db).await.unwrap();
    assert_eq!(reactions.len(), 1);
    assert_eq!(reactions[0].reaction_type, "dislike");
}

#[tokio::test]
async fn test_comment_route() {
    let db = setup_test_db().await;
    let author = create_test_user(&db, "alice", "user").await;
    let movie_id = create_test_movie(&db, "Alien", 1979, None, &[]).await;
    let review_id = create_test_review(&db, author, movie_id, "Scary", 5).await;
    let cookie = session_for(author, "alice", "user");
    let state = AppState::new(db);
    let app = views::router(state.clone());

    let uri = format!("/reviews/{}/comment/", review_id);
    let response = app
        .clone()
        .oneshot(post_form(&uri, "content=", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(post_form(&uri, "content=Still+scary", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let view = &state.reviews.list_for_movie(movie_id).await.unwrap()[0];
    assert_eq!(view.comments.len(), 1);
    assert_eq!(view.comments[0].content, "Still scary");
}

#[tokio::test]
async fn test_admin_pages_require_admin_role() {
    let db = setup_test_db().await;
    let user_id = create_test_user(&db, "alice", "user").await;
    let admin_id = create_test_user(&db, "boss", "admin").await;
    let app = views::router(AppState::new(db));

    let response = app
        .clone()
        .oneshot(get("/admin/", Some(&session_for(user_id, "alice", "user"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let html = body_text(response).await;
    assert!(html.contains("You do not have permission to open this page."));

    let response = app
        .oneshot(get("/admin/", Some(&session_for(admin_id, "boss", "admin"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_deletes_director_and_movie() {
    let db = setup_test_db().await;
    let admin_id = create_test_user(&db, "boss", "admin").await;
    let director_id = create_test_director(&db, "Ridley Scott").await;
    let movie_id = create_test_movie(&db, "Alien", 1979, Some(director_id), &[]).await;
    let cookie = session_for(admin_id, "boss", "admin");
    let state = AppState::new(db.clone());
    let app = views::router(state.clone());

    let response = app
        .clone()
        .oneshot(post_form(
            &format!("/admin/directors/{}/delete/", director_id),
            "",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let detail = state.catalog.find_movie(movie_id).await.unwrap().unwrap();
    assert!(detail.director.is_none());

    let response = app
        .oneshot(post_form(
            &format!("/admin/movies/{}/delete/", movie_id),
            "",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(movie::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_movie_detail_shows_imdb_rating() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("i", "tt0078748"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Response": "True",
            "Title": "Alien",
            "imdbRating": "8.5"
        })))
        .mount(&mock_server)
        .await;

    let db = setup_test_db().await;
    let created = movie::ActiveModel {
        title: Set("Alien".to_string()),
        description: Set("In space".to_string()),
        year: Set(1979),
        director_id: Set(None),
        imdb_id: Set(Some("tt0078748".to_string())),
        image: Set(None),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();

    let client = ImdbClient::new(&mock_server.uri(), "test-key").unwrap();
    let app = views::router(AppState::new(db).with_imdb(client));

    let response = app
        .oneshot(get(&format!("/movies/{}/", created.id), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("IMDb rating: 8.5"));
}

#[tokio::test]
async fn test_login_ignores_next_with_control_characters() {
    let db = setup_test_db().await;
    create_test_user_with_password(&db, "ellen", "nostromo79").await;
    let app = views::router(AppState::new(db));

    for next in ["%2Fmovies%0A%2F", "%2F%09%2Fevil.example"] {
        let response = app
            .clone()
            .oneshot(post_form(
                "/accounts/login/",
                &format!("username=ellen&password=nostromo79&next={}", next),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "next {}", next);
        assert_eq!(location(&response), "/movies/");
    }
}

#[tokio::test]
async fn test_malformed_ids_render_404_page() {
    let db = setup_test_db().await;
    let user_id = create_test_user(&db, "alice", "user").await;
    let cookie = session_for(user_id, "alice", "user");
    let app = views::router(AppState::new(db));

    for uri in ["/movies/abc/", "/movies/99999999999/"] {
        let response = app.clone().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("text/html"), "{}", content_type);
    }

    let response = app
        .oneshot(post_form("/reviews/x/reaction/like/", "", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_profile_page() {
    let db = setup_test_db().await;
    let user_id = create_test_user(&db, "alice", "user").await;
    let movie_id = create_test_movie(&db, "Alien", 1979, None, &[]).await;
    create_test_review(&db, user_id, movie_id, "Scary", 5).await;
    create_test_review(&db, user_id, movie_id, "Still scary", 4).await;
    let app = views::router(AppState::new(db));

    let response = app
        .clone()
        .oneshot(get("/profile/", Some(&session_for(user_id, "alice", "user"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<h1>alice</h1>"));
    assert!(html.contains("<dd>user</dd>"));
    assert!(html.contains(">2</a>"));

    let response = app.oneshot(get("/profile/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/accounts/login/"));
}

#[tokio::test]
async fn test_profile_of_deleted_account_clears_session() {
    let db = setup_test_db().await;
    let app = views::router(AppState::new(db));

    let response = app
        .oneshot(get("/profile/", Some(&session_for(4242, "ghost", "user"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/accounts/login/");
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(set_cookie.starts_with("session=;"));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let db = setup_test_db().await;
    let user_id = create_test_user(&db, "alice", "user").await;
    let cookie = session_for(user_id, "alice", "user");
    let app = views::router(AppState::new(db));

    for request in [
        post_form("/accounts/logout/", "", Some(&cookie)),
        get("/accounts/logout/", Some(&cookie)),
    ] {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/movies/");
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(set_cookie.starts_with("session=;"));
        assert!(set_cookie.contains("Max-Age=0"));
    }
}

#[tokio::test]
async fn test_review_list_newest_first() {
    let db = setup_test_db().await;
    let user_id = create_test_user(&db, "alice", "user").await;
    let movie_id = create_test_movie(&db, "Alien", 1979, None, &[]).await;
    create_test_review(&db, user_id, movie_id, "Older take", 3).await;
    create_test_review(&db, user_id, movie_id, "Newer take", 5).await;
    let app = views::router(AppState::new(db));

    let response = app.oneshot(get("/reviews/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    let newer = html.find("Newer take").expect("newer review listed");
    let older = html.find("Older take").expect("older review listed");
    assert!(newer < older);
    assert!(html.contains(&format!("/movies/{}/", movie_id)));
}

#[tokio::test]
async fn test_my_reviews_shows_only_own_reviews() {
    let db = setup_test_db().await;
    let alice = create_test_user(&db, "alice", "user").await;
    let bob = create_test_user(&db, "bob", "user").await;
    let movie_id = create_test_movie(&db, "Alien", 1979, None, &[]).await;
    create_test_review(&db, alice, movie_id, "Alice thinks", 5).await;
    create_test_review(&db, bob, movie_id, "Bob disagrees", 1).await;
    let app = views::router(AppState::new(db));

    let response = app
        .oneshot(get("/my-reviews/", Some(&session_for(alice, "alice", "user"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Alice thinks"));
    assert!(!html.contains("Bob disagrees"));
}
