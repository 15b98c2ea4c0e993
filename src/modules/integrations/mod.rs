pub mod imdb;

pub use imdb::ImdbClient;
