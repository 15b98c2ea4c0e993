use axum::extract::{Query, State};
use minijinja::context;
use serde::Deserialize;

use super::error::{page, PagePath, PageResult};
use crate::auth::CurrentUser;
use crate::domain::{DomainError, MovieFilter};
use crate::infrastructure::AppState;

#[derive(Debug, Deserialize)]
pub struct MovieListQuery {
    pub genre: Option<String>,
    pub year: Option<String>,
}

/// Movie list, optionally filtered by genre id and year. Malformed filter
/// values are dropped, so `?genre=abc` shows every movie.
pub async fn movie_list(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    Query(params): Query<MovieListQuery>,
) -> PageResult {
    let filter = MovieFilter::from_params(params.genre.as_deref(), params.year.as_deref());

    let movies = state.catalog.list_movies(filter.clone()).await?;
    let genres = state.catalog.list_genres().await?;
    let years = state.catalog.list_years().await?;

    page(
        "movie_list.html",
        context! {
            user => user.map(|u| u.0),
            movies,
            genres,
            years,
            selected_genre => filter.genre_id,
            selected_year => filter.year,
        },
    )
}

pub async fn movie_detail(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    PagePath(movie_id): PagePath<i32>,
) -> PageResult {
    let movie = state
        .catalog
        .find_movie(movie_id)
        .await?
        .ok_or(DomainError::NotFound)?;

    let reviews = state.reviews.list_for_movie(movie_id).await?;

    let imdb_rating = match (&state.imdb, &movie.imdb_id) {
        (Some(client), Some(imdb_id)) => client.rating_or_none(imdb_id).await,
        _ => None,
    };

    page(
        "movie_detail.html",
        context! {
            user => user.map(|u| u.0),
            movie,
            reviews,
            imdb_rating,
        },
    )
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub search_text: Option<String>,
}

pub async fn search(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    Query(params): Query<SearchQuery>,
) -> PageResult {
    let query = params.search_text.unwrap_or_default().trim().to_string();
    let results = state.catalog.search_movies(&query).await?;
    tracing::debug!("Search '{}' returned {} movies", query, results.len());

    page(
        "search_results.html",
        context! {
            user => user.map(|u| u.0),
            results,
            query,
        },
    )
}
