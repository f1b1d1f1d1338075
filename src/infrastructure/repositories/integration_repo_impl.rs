// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::integration::{DestinationConfig, Integration};
use crate::domain::models::source_config::SourceConfig;
use crate::domain::repositories::integration_repository::IntegrationRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::integration;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::*;
use std::sync::Arc;
use uuid::Uuid;

/// 集成仓库实现
#[derive(Clone)]
pub struct IntegrationRepoImpl {
    db: Arc<DatabaseConnection>,
}

impl IntegrationRepoImpl {
    /// 创建新的集成仓库实现
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn to_active_model(integration: &Integration) -> Result<integration::ActiveModel, RepositoryError> {
        let destination_config = serde_json::to_value(&integration.destination_config)
            .map_err(|e| RepositoryError::Corrupt(e.to_string()))?;

        Ok(integration::ActiveModel {
            id: Set(integration.id),
            user_id: Set(integration.user_id.clone()),
            name: Set(integration.name.clone()),
            source_type: Set(integration.source_type.to_string()),
            source_config: Set(integration.source_config.to_value()),
            destination_type: Set(integration.destination_type.as_str().to_string()),
            destination_config: Set(destination_config),
            is_active: Set(integration.is_active),
            created_at: Set(integration.created_at.into()),
            updated_at: Set(integration.updated_at.into()),
        })
    }
}

#[async_trait]
impl IntegrationRepository for IntegrationRepoImpl {
    async fn create(&self, integration: &Integration) -> Result<Integration, RepositoryError> {
        let model = Self::to_active_model(integration)?;
        model.insert(self.db.as_ref()).await?;
        Ok(integration.clone())
    }

    async fn update(&self, integration: &Integration) -> Result<Integration, RepositoryError> {
        let mut updated = integration.clone();
        updated.updated_at = Utc::now();

        let model = Self::to_active_model(&updated)?;
        let result = integration::Entity::update_many()
            .set(model)
            .filter(integration::Column::Id.eq(updated.id))
            .filter(integration::Column::UserId.eq(updated.user_id.clone()))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(updated)
    }

    async fn delete(&self, id: Uuid, user_id: &str) -> Result<(), RepositoryError> {
        let result = integration::Entity::delete_many()
            .filter(integration::Column::Id.eq(id))
            .filter(integration::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Integration>, RepositoryError> {
        let model = integration::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        model.map(Integration::try_from).transpose()
    }

    async fn find_by_id_and_user(
        &self,
        id: Uuid,
        user_id: &str,
    ) -> Result<Option<Integration>, RepositoryError> {
        let model = integration::Entity::find_by_id(id)
            .filter(integration::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await?;

        model.map(Integration::try_from).transpose()
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Integration>, RepositoryError> {
        let models = integration::Entity::find()
            .filter(integration::Column::UserId.eq(user_id))
            .order_by_desc(integration::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;

        models.into_iter().map(Integration::try_from).collect()
    }
}

impl TryFrom<integration::Model> for Integration {
    type Error = RepositoryError;

    fn try_from(model: integration::Model) -> Result<Self, Self::Error> {
        let source_type = model.source_type.parse().map_err(RepositoryError::Corrupt)?;
        let source_config = SourceConfig::parse(source_type, &model.source_config)
            .map_err(|e| RepositoryError::Corrupt(e.to_string()))?;
        let destination_type = model
            .destination_type
            .parse()
            .map_err(RepositoryError::Corrupt)?;
        let destination_config: DestinationConfig =
            serde_json::from_value(model.destination_config)
                .map_err(|e| RepositoryError::Corrupt(format!("destination_config: {}", e)))?;

        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            source_type,
            source_config,
            destination_type,
            destination_config,
            is_active: model.is_active,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }
}
