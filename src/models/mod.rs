pub mod comment;
pub mod director;
pub mod genre;
pub mod movie;
pub mod movie_genres;
pub mod reaction;
pub mod review;
pub mod user;

pub use reaction::ReactionKind;
