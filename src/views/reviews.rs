use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
    Form,
};
use minijinja::context;

use super::error::{page, PagePath, PageResult};
use crate::auth::CurrentUser;
use crate::domain::DomainError;
use crate::forms::{CommentForm, FormErrors, ReviewForm};
use crate::infrastructure::AppState;
use crate::models::ReactionKind;

fn movie_url(movie_id: i32) -> String {
    format!("/movies/{}/", movie_id)
}

/// All reviews, newest first
pub async fn review_list(State(state): State<AppState>, user: Option<CurrentUser>) -> PageResult {
    let reviews = state.reviews.list_all().await?;
    page(
        "review_list.html",
        context! { user => user.map(|u| u.0), reviews },
    )
}

pub async fn my_reviews(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> PageResult {
    let reviews = state.reviews.list_by_user(claims.uid).await?;
    page("my_reviews.html", context! { user => claims, reviews })
}

pub async fn review_form(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    PagePath(movie_id): PagePath<i32>,
) -> PageResult {
    let movie = state
        .catalog
        .find_movie(movie_id)
        .await?
        .ok_or(DomainError::NotFound)?;

    page(
        "review_form.html",
        context! {
            user => claims,
            movie,
            form => ReviewForm::default(),
            errors => FormErrors::default(),
        },
    )
}

pub async fn add_review(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    PagePath(movie_id): PagePath<i32>,
    Form(form): Form<ReviewForm>,
) -> PageResult {
    let movie = state
        .catalog
        .find_movie(movie_id)
        .await?
        .ok_or(DomainError::NotFound)?;

    let review = match form.validate() {
        Ok(review) => review,
        Err(errors) => {
            tracing::debug!("Review form for movie {} rejected: {:?}", movie_id, errors);
            return page(
                "review_form.html",
                context! { user => claims, movie, form, errors },
            );
        }
    };

    state
        .reviews
        .create_review(claims.uid, movie.id, review)
        .await?;

    Ok(Redirect::to(&movie_url(movie.id)).into_response())
}

pub async fn comment_form(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    PagePath(review_id): PagePath<i32>,
) -> PageResult {
    let review = state
        .reviews
        .find_review(review_id)
        .await?
        .ok_or(DomainError::NotFound)?;

    page(
        "comment_form.html",
        context! {
            user => claims,
            review,
            form => CommentForm::default(),
            errors => FormErrors::default(),
        },
    )
}

pub async fn add_comment(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    PagePath(review_id): PagePath<i32>,
    Form(form): Form<CommentForm>,
) -> PageResult {
    let review = state
        .reviews
        .find_review(review_id)
        .await?
        .ok_or(DomainError::NotFound)?;

    let content = match form.validate() {
        Ok(content) => content,
        Err(errors) => {
            return page(
                "comment_form.html",
                context! { user => claims, review, form, errors },
            );
        }
    };

    state
        .reviews
        .create_comment(claims.uid, review.id, content)
        .await?;

    Ok(Redirect::to(&movie_url(review.movie_id)).into_response())
}

/// Like or dislike a review. Voting again overwrites the earlier vote; an
/// unknown reaction type changes nothing.
pub async fn add_reaction(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    PagePath((review_id, reaction_type)): PagePath<(i32, String)>,
) -> PageResult {
    let review = state
        .reviews
        .find_review(review_id)
        .await?
        .ok_or(DomainError::NotFound)?;

    match reaction_type.parse::<ReactionKind>() {
        Ok(kind) => {
            state.reviews.react(claims.uid, review.id, kind).await?;
        }
        Err(e) => tracing::debug!("Reaction ignored for review {}: {}", review.id, e),
    }

    Ok(Redirect::to(&movie_url(review.movie_id)).into_response())
}
