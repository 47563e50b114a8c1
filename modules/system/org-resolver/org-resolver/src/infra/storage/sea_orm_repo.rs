use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue, DatabaseConnection, EntityTrait};

use crate::domain::error::DomainError;
use crate::domain::ports::UserDirectory;

use super::entity::{self, Entity as UserEntity};

pub struct SeaOrmUserDirectory {
    db: DatabaseConnection,
}

impl SeaOrmUserDirectory {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert or refresh a user row.
    ///
    /// # Errors
    /// Returns [`DomainError::Database`] if the write fails.
    pub async fn upsert_user(
        &self,
        id: &str,
        email: &str,
        org_id: Option<&str>,
    ) -> Result<(), DomainError> {
        let active_model = entity::ActiveModel {
            id: ActiveValue::Set(id.to_owned()),
            email: ActiveValue::Set(email.to_owned()),
            org_id: ActiveValue::Set(org_id.map(str::to_owned)),
        };

        UserEntity::insert(active_model)
            .on_conflict(
                OnConflict::column(entity::Column::Id)
                    .update_columns([entity::Column::Email, entity::Column::OrgId])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for SeaOrmUserDirectory {
    async fn get_org_id(&self, identity_id: &str) -> Result<Option<String>, DomainError> {
        let row = UserEntity::find_by_id(identity_id.to_owned())
            .one(&self.db)
            .await?;
        Ok(row.and_then(|user| user.org_id))
    }
}
