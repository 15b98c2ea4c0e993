//! Catalog administration pages (admin role only)

use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
    Form,
};
use minijinja::context;

use super::error::{page, PagePath, PageResult};
use crate::auth::{AdminUser, Claims};
use crate::domain::{DomainError, MovieFilter};
use crate::forms::{DirectorForm, FormErrors, GenreForm, MovieForm, NON_FIELD};
use crate::infrastructure::AppState;

const DASHBOARD: &str = "/admin/";

async fn render_dashboard(state: &AppState, claims: Claims, errors: FormErrors) -> PageResult {
    let genres = state.catalog.list_genres().await?;
    let directors = state.catalog.list_directors().await?;
    let movies = state.catalog.list_movies(MovieFilter::default()).await?;
    let pending_reviews: Vec<_> = state
        .reviews
        .list_all()
        .await?
        .into_iter()
        .filter(|r| !r.approved)
        .collect();

    page(
        "admin.html",
        context! {
            user => claims,
            genres,
            directors,
            movies,
            pending_reviews,
            errors,
        },
    )
}

fn back_to_dashboard() -> PageResult {
    Ok(Redirect::to(DASHBOARD).into_response())
}

pub async fn dashboard(State(state): State<AppState>, AdminUser(claims): AdminUser) -> PageResult {
    render_dashboard(&state, claims, FormErrors::default()).await
}

pub async fn create_genre(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    Form(form): Form<GenreForm>,
) -> PageResult {
    let name = match form.validate() {
        Ok(name) => name,
        Err(errors) => return render_dashboard(&state, claims, errors).await,
    };

    match state.catalog.create_genre(name).await {
        Ok(_) => back_to_dashboard(),
        Err(DomainError::Conflict(_)) => {
            let errors = FormErrors::single("name", "Genre with this name already exists.");
            render_dashboard(&state, claims, errors).await
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn create_director(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    Form(form): Form<DirectorForm>,
) -> PageResult {
    let (name, bio) = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => return render_dashboard(&state, claims, errors).await,
    };

    state.catalog.create_director(name, bio).await?;
    back_to_dashboard()
}

pub async fn create_movie(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    Form(form): Form<MovieForm>,
) -> PageResult {
    let movie = match form.validate() {
        Ok(movie) => movie,
        Err(errors) => return render_dashboard(&state, claims, errors).await,
    };

    match state.catalog.create_movie(movie).await {
        Ok(_) => back_to_dashboard(),
        Err(DomainError::Conflict(_)) => {
            let errors = FormErrors::single("imdb_id", "Movie with this IMDb id already exists.");
            render_dashboard(&state, claims, errors).await
        }
        Err(DomainError::Validation(msg)) => {
            render_dashboard(&state, claims, FormErrors::single(NON_FIELD, msg)).await
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn delete_director(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    PagePath(director_id): PagePath<i32>,
) -> PageResult {
    tracing::info!("{} deletes director {}", claims.sub, director_id);
    state.catalog.delete_director(director_id).await?;
    back_to_dashboard()
}

pub async fn delete_movie(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    PagePath(movie_id): PagePath<i32>,
) -> PageResult {
    tracing::info!("{} deletes movie {}", claims.sub, movie_id);
    state.catalog.delete_movie(movie_id).await?;
    back_to_dashboard()
}

pub async fn approve_review(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    PagePath(review_id): PagePath<i32>,
) -> PageResult {
    state.reviews.approve(review_id).await?;
    back_to_dashboard()
}
