//! HTML page handlers and the routing table

pub mod accounts;
pub mod admin;
pub mod error;
pub mod movies;
pub mod reviews;

use axum::{
    response::Redirect,
    routing::{get, post},
    Router,
};

use crate::infrastructure::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::permanent("/movies/") }))
        // Movies
        .route("/movies/", get(movies::movie_list))
        .route("/movies/:id/", get(movies::movie_detail))
        .route(
            "/movies/:id/review/",
            get(reviews::review_form).post(reviews::add_review),
        )
        .route("/search/", get(movies::search))
        // Reviews
        .route("/reviews/", get(reviews::review_list))
        .route("/my-reviews/", get(reviews::my_reviews))
        .route(
            "/reviews/:id/comment/",
            get(reviews::comment_form).post(reviews::add_comment),
        )
        .route(
            "/reviews/:id/reaction/:reaction_type/",
            post(reviews::add_reaction),
        )
        // Accounts
        .route(
            "/accounts/register/",
            get(accounts::register_form).post(accounts::register),
        )
        .route(
            "/accounts/login/",
            get(accounts::login_form).post(accounts::login),
        )
        .route(
            "/accounts/logout/",
            get(accounts::logout).post(accounts::logout),
        )
        .route("/profile/", get(accounts::profile))
        // Catalog admin
        .route("/admin/", get(admin::dashboard))
        .route("/admin/genres/", post(admin::create_genre))
        .route("/admin/directors/", post(admin::create_director))
        .route(
            "/admin/directors/:id/delete/",
            post(admin::delete_director),
        )
        .route("/admin/movies/", post(admin::create_movie))
        .route("/admin/movies/:id/delete/", post(admin::delete_movie))
        .route(
            "/admin/reviews/:id/approve/",
            post(admin::approve_review),
        )
        .fallback(error::not_found)
        .with_state(state)
}
