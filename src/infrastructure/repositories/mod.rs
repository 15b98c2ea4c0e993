//! Repository implementations using SeaORM

pub mod catalog_repository;
pub mod review_repository;
pub mod user_repository;

pub use catalog_repository::SeaOrmCatalogRepository;
pub use review_repository::SeaOrmReviewRepository;
pub use user_repository::SeaOrmUserRepository;
