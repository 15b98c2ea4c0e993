//! SeaORM implementation of CatalogRepository

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, LikeExpr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;

use crate::domain::{
    CatalogRepository, Director, DomainError, Genre, MovieDetail, MovieFilter, MovieSummary,
    NewMovie,
};
use crate::models::{director, genre, movie, movie_genres};

/// How many genre names the list pages show per movie
const DISPLAY_GENRES: usize = 3;

/// SeaORM-based implementation of CatalogRepository
pub struct SeaOrmCatalogRepository {
    db: DatabaseConnection,
}

impl SeaOrmCatalogRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Attach director names and the first genres to a page of movies
    /// with two batched lookups.
    async fn summarize(&self, movies: Vec<movie::Model>) -> Result<Vec<MovieSummary>, DomainError> {
        if movies.is_empty() {
            return Ok(vec![]);
        }

        let director_ids: Vec<i32> = movies.iter().filter_map(|m| m.director_id).collect();
        let directors: HashMap<i32, String> = if director_ids.is_empty() {
            HashMap::new()
        } else {
            director::Entity::find()
                .filter(director::Column::Id.is_in(director_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|d| (d.id, d.name))
                .collect()
        };

        let movie_ids: Vec<i32> = movies.iter().map(|m| m.id).collect();
        let links = movie_genres::Entity::find()
            .filter(movie_genres::Column::MovieId.is_in(movie_ids))
            .order_by_asc(movie_genres::Column::GenreId)
            .find_also_related(genre::Entity)
            .all(&self.db)
            .await?;

        let mut genre_names: HashMap<i32, Vec<String>> = HashMap::new();
        for (link, genre) in links {
            if let Some(genre) = genre {
                genre_names.entry(link.movie_id).or_default().push(genre.name);
            }
        }

        Ok(movies
            .into_iter()
            .map(|m| {
                let display_genres = genre_names
                    .get(&m.id)
                    .map(|names| {
                        names
                            .iter()
                            .take(DISPLAY_GENRES)
                            .cloned()
                            .collect::<Vec<_>>()
                            .join(", ")
                    })
                    .unwrap_or_default();

                MovieSummary {
                    director_name: m.director_id.and_then(|id| directors.get(&id).cloned()),
                    id: m.id,
                    title: m.title,
                    year: m.year,
                    image: m.image,
                    display_genres,
                }
            })
            .collect())
    }
}

fn to_genre(g: genre::Model) -> Genre {
    Genre {
        id: g.id,
        name: g.name,
    }
}

fn to_director(d: director::Model) -> Director {
    Director {
        id: d.id,
        name: d.name,
        bio: d.bio,
    }
}

/// Escape LIKE wildcards so user input is matched literally
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl CatalogRepository for SeaOrmCatalogRepository {
    async fn list_movies(&self, filter: MovieFilter) -> Result<Vec<MovieSummary>, DomainError> {
        let mut query = movie::Entity::find();

        if let Some(genre_id) = filter.genre_id {
            query = query.filter(
                movie::Column::Id.in_subquery(
                    Query::select()
                        .column(movie_genres::Column::MovieId)
                        .from(movie_genres::Entity)
                        .and_where(movie_genres::Column::GenreId.eq(genre_id))
                        .to_owned(),
                ),
            );
        }

        if let Some(year) = filter.year {
            query = query.filter(movie::Column::Year.eq(year));
        }

        let movies = query.order_by_asc(movie::Column::Id).all(&self.db).await?;
        tracing::debug!("Movie list {:?} matched {} movies", filter, movies.len());

        self.summarize(movies).await
    }

    async fn search_movies(&self, query: &str) -> Result<Vec<MovieSummary>, DomainError> {
        let mut select = movie::Entity::find();

        let query = query.trim();
        if !query.is_empty() {
            // SQLite LIKE folds case
            select = select.filter(
                Expr::col(movie::Column::Title).like(LikeExpr::new(like_pattern(query)).escape('\\')),
            );
        }

        let movies = select.order_by_asc(movie::Column::Title).all(&self.db).await?;
        self.summarize(movies).await
    }

    async fn find_movie(&self, id: i32) -> Result<Option<MovieDetail>, DomainError> {
        let Some(model) = movie::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let director = model
            .find_related(director::Entity)
            .one(&self.db)
            .await?
            .map(to_director);

        let genres = model
            .find_related(genre::Entity)
            .order_by_asc(genre::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(to_genre)
            .collect();

        Ok(Some(MovieDetail {
            id: model.id,
            title: model.title,
            description: model.description,
            year: model.year,
            imdb_id: model.imdb_id,
            image: model.image,
            director,
            genres,
        }))
    }

    async fn list_genres(&self) -> Result<Vec<Genre>, DomainError> {
        let genres = genre::Entity::find()
            .order_by_asc(genre::Column::Name)
            .all(&self.db)
            .await?;
        Ok(genres.into_iter().map(to_genre).collect())
    }

    async fn list_years(&self) -> Result<Vec<i32>, DomainError> {
        let years = movie::Entity::find()
            .select_only()
            .column(movie::Column::Year)
            .distinct()
            .order_by_desc(movie::Column::Year)
            .into_tuple::<i32>()
            .all(&self.db)
            .await?;
        Ok(years)
    }

    async fn list_directors(&self) -> Result<Vec<Director>, DomainError> {
        let directors = director::Entity::find()
            .order_by_asc(director::Column::Name)
            .all(&self.db)
            .await?;
        Ok(directors.into_iter().map(to_director).collect())
    }

    async fn create_genre(&self, name: String) -> Result<Genre, DomainError> {
        let genre = genre::ActiveModel {
            name: Set(name),
            ..Default::default()
        };

        let result = genre.insert(&self.db).await?;
        tracing::info!("Genre created: {}", result.name);
        Ok(to_genre(result))
    }

    async fn create_director(
        &self,
        name: String,
        bio: Option<String>,
    ) -> Result<Director, DomainError> {
        let director = director::ActiveModel {
            name: Set(name),
            bio: Set(bio),
            ..Default::default()
        };

        let result = director.insert(&self.db).await?;
        tracing::info!("Director created: {}", result.name);
        Ok(to_director(result))
    }

    async fn create_movie(&self, input: NewMovie) -> Result<MovieDetail, DomainError> {
        if let Some(director_id) = input.director_id
            && director::Entity::find_by_id(director_id)
                .one(&self.db)
                .await?
                .is_none()
        {
            return Err(DomainError::Validation(format!(
                "Director {} does not exist",
                director_id
            )));
        }

        if !input.genre_ids.is_empty() {
            let known = genre::Entity::find()
                .filter(genre::Column::Id.is_in(input.genre_ids.clone()))
                .count(&self.db)
                .await?;
            if known != input.genre_ids.len() as u64 {
                return Err(DomainError::Validation(
                    "One or more genres do not exist".to_string(),
                ));
            }
        }

        let txn = self.db.begin().await?;

        let movie = movie::ActiveModel {
            title: Set(input.title),
            description: Set(input.description),
            year: Set(input.year),
            director_id: Set(input.director_id),
            imdb_id: Set(input.imdb_id),
            image: Set(input.image),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        for genre_id in &input.genre_ids {
            movie_genres::ActiveModel {
                movie_id: Set(movie.id),
                genre_id: Set(*genre_id),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        tracing::info!("Movie created: {} ({})", movie.title, movie.year);

        self.find_movie(movie.id)
            .await?
            .ok_or_else(|| DomainError::Internal("Created movie vanished".to_string()))
    }

    async fn delete_director(&self, id: i32) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;

        let detached = movie::Entity::update_many()
            .col_expr(movie::Column::DirectorId, Expr::value(Option::<i32>::None))
            .filter(movie::Column::DirectorId.eq(id))
            .exec(&txn)
            .await?;

        let result = director::Entity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        txn.commit().await?;
        tracing::info!(
            "Director {} deleted, {} movies left without director",
            id,
            detached.rows_affected
        );
        Ok(())
    }

    async fn delete_movie(&self, id: i32) -> Result<(), DomainError> {
        let result = movie::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        tracing::info!("Movie {} deleted", id);
        Ok(())
    }
}
