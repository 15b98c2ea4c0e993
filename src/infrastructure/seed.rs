//! Demo data and admin bootstrap

use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::*;

use crate::auth::hash_password;
use crate::models::user::{ROLE_ADMIN, ROLE_USER};
use crate::models::{director, genre, movie, movie_genres, user};

const DEMO_GENRES: &[&str] = &["Drama", "Science Fiction", "Crime", "Comedy", "Thriller"];

struct DemoMovie {
    title: &'static str,
    description: &'static str,
    year: i32,
    director: &'static str,
    imdb_id: &'static str,
    genres: &'static [&'static str],
}

const DEMO_MOVIES: &[DemoMovie] = &[
    DemoMovie {
        title: "Alien",
        description: "The crew of a commercial spacecraft meets a deadly lifeform.",
        year: 1979,
        director: "Ridley Scott",
        imdb_id: "tt0078748",
        genres: &["Science Fiction", "Thriller"],
    },
    DemoMovie {
        title: "Blade Runner",
        description: "A blade runner must pursue and terminate four replicants.",
        year: 1982,
        director: "Ridley Scott",
        imdb_id: "tt0083658",
        genres: &["Science Fiction", "Drama", "Thriller"],
    },
    DemoMovie {
        title: "Pulp Fiction",
        description: "The lives of two mob hitmen, a boxer and a pair of bandits intertwine.",
        year: 1994,
        director: "Quentin Tarantino",
        imdb_id: "tt0110912",
        genres: &["Crime", "Drama"],
    },
    DemoMovie {
        title: "Jackie Brown",
        description: "A flight attendant is caught smuggling money for an arms dealer.",
        year: 1997,
        director: "Quentin Tarantino",
        imdb_id: "tt0119396",
        genres: &["Crime", "Thriller"],
    },
    DemoMovie {
        title: "Groundhog Day",
        description: "A weatherman relives the same day again and again.",
        year: 1993,
        director: "Harold Ramis",
        imdb_id: "tt0107048",
        genres: &["Comedy", "Drama"],
    },
];

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn new_user(username: &str, password_hash: String, role: &str) -> user::ActiveModel {
    user::ActiveModel {
        username: Set(username.to_owned()),
        password_hash: Set(password_hash),
        role: Set(role.to_owned()),
        created_at: Set(now()),
        updated_at: Set(now()),
        ..Default::default()
    }
}

async fn insert_user_if_missing(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
    role: &str,
) -> Result<u64, DbErr> {
    let password_hash = hash_password(password).map_err(DbErr::Custom)?;

    user::Entity::insert(new_user(username, password_hash, role))
        .on_conflict(
            OnConflict::column(user::Column::Username)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await
}

/// Seed demo users and a small catalog. Safe to run on every startup.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    // 1. Users
    insert_user_if_missing(db, "admin", "admin", ROLE_ADMIN).await?;
    insert_user_if_missing(db, "user", "user", ROLE_USER).await?;

    // 2. Genres
    for name in DEMO_GENRES {
        genre::Entity::insert(genre::ActiveModel {
            name: Set((*name).to_owned()),
            ..Default::default()
        })
        .on_conflict(OnConflict::column(genre::Column::Name).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;
    }

    // 3. Directors and movies, skipped once the catalog has content
    if movie::Entity::find().count(db).await? > 0 {
        tracing::debug!("Catalog already populated, skipping demo movies");
        return Ok(());
    }

    let txn = db.begin().await?;

    for demo in DEMO_MOVIES {
        let director_id = match director::Entity::find()
            .filter(director::Column::Name.eq(demo.director))
            .one(&txn)
            .await?
        {
            Some(existing) => existing.id,
            None => {
                director::ActiveModel {
                    name: Set(demo.director.to_owned()),
                    bio: Set(None),
                    ..Default::default()
                }
                .insert(&txn)
                .await?
                .id
            }
        };

        let created = movie::ActiveModel {
            title: Set(demo.title.to_owned()),
            description: Set(demo.description.to_owned()),
            year: Set(demo.year),
            director_id: Set(Some(director_id)),
            imdb_id: Set(Some(demo.imdb_id.to_owned())),
            image: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let genre_ids: Vec<i32> = genre::Entity::find()
            .filter(genre::Column::Name.is_in(demo.genres.iter().copied()))
            .all(&txn)
            .await?
            .into_iter()
            .map(|g| g.id)
            .collect();

        for genre_id in genre_ids {
            movie_genres::ActiveModel {
                movie_id: Set(created.id),
                genre_id: Set(genre_id),
            }
            .insert(&txn)
            .await?;
        }
    }

    txn.commit().await?;
    Ok(())
}

/// Make sure an admin account with this username exists. An existing
/// account keeps its password but is promoted to admin.
pub async fn ensure_admin(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<(), DbErr> {
    let inserted = insert_user_if_missing(db, username, password, ROLE_ADMIN).await?;
    if inserted > 0 {
        tracing::info!("Created admin account '{}'", username);
        return Ok(());
    }

    let promoted = user::Entity::update_many()
        .col_expr(user::Column::Role, Expr::value(ROLE_ADMIN))
        .col_expr(user::Column::UpdatedAt, Expr::value(now()))
        .filter(user::Column::Username.eq(username))
        .filter(user::Column::Role.ne(ROLE_ADMIN))
        .exec(db)
        .await?;

    if promoted.rows_affected > 0 {
        tracing::info!("Promoted '{}' to admin", username);
    }
    Ok(())
}
