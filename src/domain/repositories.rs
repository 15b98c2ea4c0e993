//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;
use serde::Serialize;

use super::DomainError;
use crate::models::ReactionKind;

/// Parses a query-string filter value the way the movie list expects:
/// only a non-empty run of ASCII digits that fits an `i32` counts.
fn parse_numeric_filter(raw: Option<&str>) -> Option<i32> {
    let raw = raw?;
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Filter criteria for the movie list
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MovieFilter {
    pub genre_id: Option<i32>,
    pub year: Option<i32>,
}

impl MovieFilter {
    /// Build a filter from raw query parameters. Values that are not
    /// plain non-negative integers are ignored rather than rejected.
    pub fn from_params(genre: Option<&str>, year: Option<&str>) -> Self {
        Self {
            genre_id: parse_numeric_filter(genre),
            year: parse_numeric_filter(year),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Director {
    pub id: i32,
    pub name: String,
    pub bio: Option<String>,
}

/// Movie row for list and search pages
#[derive(Debug, Clone, Serialize)]
pub struct MovieSummary {
    pub id: i32,
    pub title: String,
    pub year: i32,
    pub image: Option<String>,
    pub director_name: Option<String>,
    /// First three genre names, comma separated
    pub display_genres: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MovieDetail {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub year: i32,
    pub imdb_id: Option<String>,
    pub image: Option<String>,
    pub director: Option<Director>,
    pub genres: Vec<Genre>,
}

/// Input for creating a movie from the admin pages
#[derive(Debug, Clone, Default)]
pub struct NewMovie {
    pub title: String,
    pub description: String,
    pub year: i32,
    pub director_id: Option<i32>,
    pub genre_ids: Vec<i32>,
    pub imdb_id: Option<String>,
    pub image: Option<String>,
}

/// Repository trait for the administrator-managed catalog
/// (movies, genres, directors)
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Movies matching the filter, in insertion order
    async fn list_movies(&self, filter: MovieFilter) -> Result<Vec<MovieSummary>, DomainError>;

    /// Case-insensitive substring match on title; empty query returns all movies
    async fn search_movies(&self, query: &str) -> Result<Vec<MovieSummary>, DomainError>;

    async fn find_movie(&self, id: i32) -> Result<Option<MovieDetail>, DomainError>;

    async fn list_genres(&self) -> Result<Vec<Genre>, DomainError>;

    /// Distinct release years, newest first
    async fn list_years(&self) -> Result<Vec<i32>, DomainError>;

    async fn list_directors(&self) -> Result<Vec<Director>, DomainError>;

    async fn create_genre(&self, name: String) -> Result<Genre, DomainError>;

    async fn create_director(&self, name: String, bio: Option<String>)
    -> Result<Director, DomainError>;

    async fn create_movie(&self, movie: NewMovie) -> Result<MovieDetail, DomainError>;

    /// Delete a director; their movies stay with no director
    async fn delete_director(&self, id: i32) -> Result<(), DomainError>;

    /// Delete a movie together with its reviews, comments and reactions
    async fn delete_movie(&self, id: i32) -> Result<(), DomainError>;
}

/// Validated review input
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub title: String,
    pub content: String,
    pub rating: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: i32,
    pub username: String,
    pub content: String,
    pub created_at: String,
}

/// Review enriched with its author, movie, reaction counts and comments
#[derive(Debug, Clone, Serialize)]
pub struct ReviewView {
    pub id: i32,
    pub movie_id: i32,
    pub movie_title: String,
    pub user_id: i32,
    pub username: String,
    pub title: String,
    pub content: String,
    pub rating: i32,
    pub created_at: String,
    pub approved: bool,
    pub likes_count: u64,
    pub dislikes_count: u64,
    pub comments: Vec<CommentView>,
}

/// Minimal review lookup used by the comment and reaction handlers
#[derive(Debug, Clone, Serialize)]
pub struct ReviewRef {
    pub id: i32,
    pub movie_id: i32,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reaction {
    pub id: i32,
    pub user_id: i32,
    pub review_id: i32,
    pub kind: ReactionKind,
}

/// Repository trait for user-generated content (reviews, comments, reactions)
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Reviews of one movie, oldest first
    async fn list_for_movie(&self, movie_id: i32) -> Result<Vec<ReviewView>, DomainError>;

    /// All reviews, newest first
    async fn list_all(&self) -> Result<Vec<ReviewView>, DomainError>;

    /// Reviews written by one user, newest first
    async fn list_by_user(&self, user_id: i32) -> Result<Vec<ReviewView>, DomainError>;

    async fn count_by_user(&self, user_id: i32) -> Result<u64, DomainError>;

    async fn find_review(&self, id: i32) -> Result<Option<ReviewRef>, DomainError>;

    /// Create a review; fails with `NotFound` when the movie does not exist
    /// and `Validation` when the rating is outside 1-5
    async fn create_review(
        &self,
        user_id: i32,
        movie_id: i32,
        review: NewReview,
    ) -> Result<ReviewRef, DomainError>;

    async fn create_comment(
        &self,
        user_id: i32,
        review_id: i32,
        content: String,
    ) -> Result<CommentView, DomainError>;

    /// Insert or overwrite the single reaction of `user_id` on `review_id`
    async fn react(
        &self,
        user_id: i32,
        review_id: i32,
        kind: ReactionKind,
    ) -> Result<Reaction, DomainError>;

    async fn approve(&self, review_id: i32) -> Result<(), DomainError>;
}

/// Account data exposed to views (never carries the password hash)
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: i32,
    pub username: String,
    pub role: String,
    pub created_at: String,
}

impl Account {
    pub fn is_admin(&self) -> bool {
        self.role == crate::models::user::ROLE_ADMIN
    }
}

/// Repository trait for user accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Account>, DomainError>;

    /// Account plus stored password hash, for login
    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<(Account, String)>, DomainError>;

    /// Create an account; `Conflict` when the username is taken
    async fn create(
        &self,
        username: String,
        password_hash: String,
        role: &str,
    ) -> Result<Account, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_filters_are_parsed() {
        let filter = MovieFilter::from_params(Some("3"), Some("1999"));
        assert_eq!(filter.genre_id, Some(3));
        assert_eq!(filter.year, Some(1999));
    }

    #[test]
    fn non_numeric_filters_are_ignored() {
        let filter = MovieFilter::from_params(Some("drama"), Some("19x9"));
        assert_eq!(filter, MovieFilter::default());

        let filter = MovieFilter::from_params(Some(""), Some("-1"));
        assert_eq!(filter, MovieFilter::default());

        let filter = MovieFilter::from_params(None, Some(" 2001"));
        assert_eq!(filter, MovieFilter::default());
    }

    #[test]
    fn overflowing_filter_is_ignored() {
        let filter = MovieFilter::from_params(Some("99999999999999"), None);
        assert_eq!(filter.genre_id, None);
    }
}
