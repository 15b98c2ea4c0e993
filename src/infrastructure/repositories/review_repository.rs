//! SeaORM implementation of ReviewRepository

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use std::collections::HashMap;

use crate::domain::{
    CommentView, DomainError, NewReview, Reaction, ReviewRef, ReviewRepository, ReviewView,
};
use crate::models::review::{MAX_RATING, MIN_RATING};
use crate::models::{comment, movie, reaction, review, user, ReactionKind};

/// SeaORM-based implementation of ReviewRepository
pub struct SeaOrmReviewRepository {
    db: DatabaseConnection,
}

impl SeaOrmReviewRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn usernames(&self, ids: Vec<i32>) -> Result<HashMap<i32, String>, DomainError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(user::Entity::find()
            .filter(user::Column::Id.is_in(ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect())
    }

    /// Enrich review rows with author, movie title, reaction counts and
    /// comments using one batched query per relation.
    async fn enrich(&self, reviews: Vec<review::Model>) -> Result<Vec<ReviewView>, DomainError> {
        if reviews.is_empty() {
            return Ok(vec![]);
        }

        let review_ids: Vec<i32> = reviews.iter().map(|r| r.id).collect();
        let movie_ids: Vec<i32> = reviews.iter().map(|r| r.movie_id).collect();

        let movie_titles: HashMap<i32, String> = movie::Entity::find()
            .filter(movie::Column::Id.is_in(movie_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| (m.id, m.title))
            .collect();

        let mut counts: HashMap<i32, (u64, u64)> = HashMap::new();
        let reactions = reaction::Entity::find()
            .filter(reaction::Column::ReviewId.is_in(review_ids.clone()))
            .all(&self.db)
            .await?;
        for r in reactions {
            let entry = counts.entry(r.review_id).or_default();
            match r.reaction_type.parse::<ReactionKind>() {
                Ok(ReactionKind::Like) => entry.0 += 1,
                Ok(ReactionKind::Dislike) => entry.1 += 1,
                Err(e) => tracing::warn!("Reaction {} skipped: {}", r.id, e),
            }
        }

        let comments = comment::Entity::find()
            .filter(comment::Column::ReviewId.is_in(review_ids))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await?;

        let mut user_ids: Vec<i32> = reviews.iter().map(|r| r.user_id).collect();
        user_ids.extend(comments.iter().map(|c| c.user_id));
        user_ids.sort_unstable();
        user_ids.dedup();
        let usernames = self.usernames(user_ids).await?;
        let username_of = |id: i32| usernames.get(&id).cloned().unwrap_or_default();

        let mut comments_by_review: HashMap<i32, Vec<CommentView>> = HashMap::new();
        for c in comments {
            comments_by_review
                .entry(c.review_id)
                .or_default()
                .push(CommentView {
                    id: c.id,
                    username: username_of(c.user_id),
                    content: c.content,
                    created_at: c.created_at,
                });
        }

        Ok(reviews
            .into_iter()
            .map(|r| {
                let (likes_count, dislikes_count) = counts.get(&r.id).copied().unwrap_or_default();
                ReviewView {
                    movie_title: movie_titles.get(&r.movie_id).cloned().unwrap_or_default(),
                    username: username_of(r.user_id),
                    comments: comments_by_review.remove(&r.id).unwrap_or_default(),
                    id: r.id,
                    movie_id: r.movie_id,
                    user_id: r.user_id,
                    title: r.title,
                    content: r.content,
                    rating: r.rating,
                    created_at: r.created_at,
                    approved: r.approved,
                    likes_count,
                    dislikes_count,
                }
            })
            .collect())
    }
}

fn to_ref(r: &review::Model) -> ReviewRef {
    ReviewRef {
        id: r.id,
        movie_id: r.movie_id,
        title: r.title.clone(),
    }
}

#[async_trait]
impl ReviewRepository for SeaOrmReviewRepository {
    async fn list_for_movie(&self, movie_id: i32) -> Result<Vec<ReviewView>, DomainError> {
        let reviews = review::Entity::find()
            .filter(review::Column::MovieId.eq(movie_id))
            .order_by_asc(review::Column::Id)
            .all(&self.db)
            .await?;
        self.enrich(reviews).await
    }

    async fn list_all(&self) -> Result<Vec<ReviewView>, DomainError> {
        let reviews = review::Entity::find()
            .order_by_desc(review::Column::CreatedAt)
            .order_by_desc(review::Column::Id)
            .all(&self.db)
            .await?;
        self.enrich(reviews).await
    }

    async fn list_by_user(&self, user_id: i32) -> Result<Vec<ReviewView>, DomainError> {
        let reviews = review::Entity::find()
            .filter(review::Column::UserId.eq(user_id))
            .order_by_desc(review::Column::CreatedAt)
            .order_by_desc(review::Column::Id)
            .all(&self.db)
            .await?;
        self.enrich(reviews).await
    }

    async fn count_by_user(&self, user_id: i32) -> Result<u64, DomainError> {
        let count = review::Entity::find()
            .filter(review::Column::UserId.eq(user_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn find_review(&self, id: i32) -> Result<Option<ReviewRef>, DomainError> {
        let review = review::Entity::find_by_id(id).one(&self.db).await?;
        Ok(review.as_ref().map(to_ref))
    }

    async fn create_review(
        &self,
        user_id: i32,
        movie_id: i32,
        input: NewReview,
    ) -> Result<ReviewRef, DomainError> {
        if !(MIN_RATING..=MAX_RATING).contains(&input.rating) {
            return Err(DomainError::Validation(format!(
                "Rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            )));
        }

        if movie::Entity::find_by_id(movie_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(DomainError::NotFound);
        }

        let review = review::ActiveModel {
            user_id: Set(user_id),
            movie_id: Set(movie_id),
            title: Set(input.title),
            content: Set(input.content),
            rating: Set(input.rating),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            approved: Set(false),
            ..Default::default()
        };

        let result = review.insert(&self.db).await?;
        tracing::info!(
            "Review {} created by user {} for movie {}",
            result.id,
            user_id,
            movie_id
        );
        Ok(to_ref(&result))
    }

    async fn create_comment(
        &self,
        user_id: i32,
        review_id: i32,
        content: String,
    ) -> Result<CommentView, DomainError> {
        if review::Entity::find_by_id(review_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(DomainError::NotFound);
        }

        let comment = comment::ActiveModel {
            review_id: Set(review_id),
            user_id: Set(user_id),
            content: Set(content),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let result = comment.insert(&self.db).await?;
        let username = self
            .usernames(vec![user_id])
            .await?
            .remove(&user_id)
            .unwrap_or_default();

        Ok(CommentView {
            id: result.id,
            username,
            content: result.content,
            created_at: result.created_at,
        })
    }

    async fn react(
        &self,
        user_id: i32,
        review_id: i32,
        kind: ReactionKind,
    ) -> Result<Reaction, DomainError> {
        if review::Entity::find_by_id(review_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(DomainError::NotFound);
        }

        // Single statement upsert: the (user_id, review_id) unique key makes a
        // second vote overwrite the first instead of adding a row.
        let reaction = reaction::ActiveModel {
            user_id: Set(user_id),
            review_id: Set(review_id),
            reaction_type: Set(kind.as_str().to_string()),
            ..Default::default()
        };

        reaction::Entity::insert(reaction)
            .on_conflict(
                OnConflict::columns([reaction::Column::UserId, reaction::Column::ReviewId])
                    .update_column(reaction::Column::ReactionType)
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        let stored = reaction::Entity::find()
            .filter(reaction::Column::UserId.eq(user_id))
            .filter(reaction::Column::ReviewId.eq(review_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::Internal("Reaction missing after upsert".to_string()))?;

        tracing::info!("User {} reacted '{}' to review {}", user_id, kind, review_id);

        let kind = stored
            .reaction_type
            .parse::<ReactionKind>()
            .map_err(DomainError::Internal)?;

        Ok(Reaction {
            id: stored.id,
            user_id: stored.user_id,
            review_id: stored.review_id,
            kind,
        })
    }

    async fn approve(&self, review_id: i32) -> Result<(), DomainError> {
        let result = review::Entity::update_many()
            .col_expr(review::Column::Approved, Expr::value(true))
            .filter(review::Column::Id.eq(review_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        tracing::info!("Review {} approved", review_id);
        Ok(())
    }
}
