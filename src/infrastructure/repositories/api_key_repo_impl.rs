// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::api_key::ApiKey;
use crate::domain::repositories::api_key_repository::ApiKeyRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::api_key;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::*;
use std::sync::Arc;
use uuid::Uuid;

/// API 密钥仓库实现
#[derive(Clone)]
pub struct ApiKeyRepoImpl {
    db: Arc<DatabaseConnection>,
}

impl ApiKeyRepoImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ApiKeyRepository for ApiKeyRepoImpl {
    async fn create(&self, key: &ApiKey) -> Result<ApiKey, RepositoryError> {
        let model = api_key::ActiveModel {
            id: Set(key.id),
            user_id: Set(key.user_id.clone()),
            key_hash: Set(key.key_hash.clone()),
            name: Set(key.name.clone()),
            last_used_at: Set(key.last_used_at.map(Into::into)),
            created_at: Set(key.created_at.into()),
            expires_at: Set(key.expires_at.map(Into::into)),
        };

        model.insert(self.db.as_ref()).await?;
        Ok(key.clone())
    }

    async fn find_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, RepositoryError> {
        let model = api_key::Entity::find()
            .filter(api_key::Column::KeyHash.eq(key_hash))
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn touch(&self, id: Uuid) -> Result<(), RepositoryError> {
        let model = api_key::ActiveModel {
            id: Unchanged(id),
            last_used_at: Set(Some(Utc::now().into())),
            ..Default::default()
        };
        model.update(self.db.as_ref()).await?;
        Ok(())
    }
}

impl From<api_key::Model> for ApiKey {
    fn from(model: api_key::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            key_hash: model.key_hash,
            name: model.name,
            last_used_at: model.last_used_at.map(Into::into),
            created_at: model.created_at.into(),
            expires_at: model.expires_at.map(Into::into),
        }
    }
}
