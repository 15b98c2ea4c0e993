//! SeaORM implementation of UserRepository

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::domain::{Account, DomainError, UserRepository};
use crate::models::user::{self, ActiveModel, Entity as UserEntity};

/// SeaORM-based implementation of UserRepository
pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_account(u: user::Model) -> Account {
    Account {
        id: u.id,
        username: u.username,
        role: u.role,
        created_at: u.created_at,
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Account>, DomainError> {
        let user = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(user.map(to_account))
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<(Account, String)>, DomainError> {
        let user = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?;

        Ok(user.map(|u| {
            let hash = u.password_hash.clone();
            (to_account(u), hash)
        }))
    }

    async fn create(
        &self,
        username: String,
        password_hash: String,
        role: &str,
    ) -> Result<Account, DomainError> {
        let now = chrono::Utc::now().to_rfc3339();

        let user = ActiveModel {
            username: Set(username),
            password_hash: Set(password_hash),
            role: Set(role.to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = user.insert(&self.db).await?;
        tracing::info!("User created: {} ({})", result.username, result.role);
        Ok(to_account(result))
    }
}
